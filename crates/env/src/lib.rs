//! Nebula Env - application environment and property resolution
//!
//! This crate provides the runtime environment of a Nebula application:
//! layered property sources with precedence, typed property resolution,
//! configuration include/exclude gating, resource lookup and type discovery,
//! all behind a start/stop lifecycle.
//!
//! # Example
//!
//! ```rust,no_run
//! use nebula_env::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> EnvResult<()> {
//!     let env = EnvironmentBuilder::new("dev")
//!         .with_source(SourceKind::Application { dir: "config".into() })
//!         .with_source(SourceKind::EnvWithPrefix("APP".into()))
//!         .with_source(SourceKind::CommandLine(std::env::args().collect()))
//!         .with_resource_root("resources")
//!         .build()
//!         .await?;
//!     env.start();
//!
//!     let port: u16 = env.resolve_or("server.port", 8080)?;
//!     let hosts: Option<Vec<String>> = env.resolve("cluster.hosts")?;
//!
//!     env.stop();
//!     Ok(())
//! }
//! ```

#![deny(unused_must_use)]
#![warn(missing_docs)]

pub mod builder;
pub mod convert;
pub mod environment;
pub mod error;
pub mod format;
pub mod gate;
pub mod key;
pub mod lifecycle;
pub mod loaders;
pub mod resolver;
pub mod resource;
pub mod scan;
pub mod source;

pub use builder::EnvironmentBuilder;
pub use convert::{ConversionService, DefaultConversionService};
pub use environment::Environment;
pub use error::{EnvError, EnvResult, ErrorCategory};
pub use format::SourceFormat;
pub use gate::{BeanConfiguration, ConfigurationGate};
pub use lifecycle::{Lifecycle, LifecycleState};
pub use loaders::{ArgsLoader, CompositeLoader, EnvLoader, FileLoader, PropertySourceLoader};
pub use resolver::PropertyResolver;
pub use resource::{ClasspathLoader, ResourceLoader, ResourceLocator, Resources};
pub use scan::{AnnotationScanner, TypeDescriptor, TypeLoader, TypeRegistry};
pub use source::{EnvVarPropertySource, MapPropertySource, PropertySource, SourceKind};

/// Prelude module for convenient imports
pub mod prelude {
    //! Prelude for common imports
    //!
    //! # Example
    //! ```rust
    //! use nebula_env::prelude::*;
    //! ```

    pub use crate::builder::EnvironmentBuilder;
    pub use crate::environment::Environment;
    pub use crate::error::{EnvError, EnvResult};
    pub use crate::format::SourceFormat;
    pub use crate::gate::BeanConfiguration;
    pub use crate::lifecycle::{Lifecycle, LifecycleState};
    pub use crate::source::{MapPropertySource, PropertySource, SourceKind, order};
}
