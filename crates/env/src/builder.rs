//! Environment builder

use crate::convert::ConversionService;
use crate::environment::Environment;
use crate::error::EnvResult;
use crate::loaders::{CompositeLoader, PropertySourceLoader};
use crate::resource::{ClasspathLoader, ResourceLoader};
use crate::scan::{AnnotationScanner, TypeLoader};
use crate::source::{PropertySource, SourceKind};
use futures::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;

/// A source as declared on the builder
enum Declared {
    Kind(SourceKind),
    Ready(Arc<dyn PropertySource>),
}

/// Builds an [`Environment`] from declared sources.
///
/// Declared [`SourceKind`]s are loaded concurrently, then registered in
/// declaration order, so ties in order are broken the same way as with
/// manual registration.
pub struct EnvironmentBuilder {
    name: String,
    sources: Vec<Declared>,
    packages: Vec<String>,
    includes: Vec<String>,
    excludes: Vec<String>,
    resource_roots: Vec<PathBuf>,
    resource_loader: Option<Arc<dyn ResourceLoader>>,
    conversion: Option<Arc<dyn ConversionService>>,
    scanner: Option<Arc<dyn AnnotationScanner>>,
    types: Option<Arc<dyn TypeLoader>>,
    loader: Option<Arc<dyn PropertySourceLoader>>,
    fail_on_missing: bool,
}

impl EnvironmentBuilder {
    /// Create a builder for the environment named `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sources: Vec::new(),
            packages: Vec::new(),
            includes: Vec::new(),
            excludes: Vec::new(),
            resource_roots: Vec::new(),
            resource_loader: None,
            conversion: None,
            scanner: None,
            types: None,
            loader: None,
            fail_on_missing: false,
        }
    }

    /// Declare a source to load
    #[must_use = "builder methods must be chained or built"]
    pub fn with_source(mut self, source: SourceKind) -> Self {
        self.sources.push(Declared::Kind(source));
        self
    }

    /// Declare multiple sources to load
    #[must_use = "builder methods must be chained or built"]
    pub fn with_sources(mut self, sources: impl IntoIterator<Item = SourceKind>) -> Self {
        self.sources.extend(sources.into_iter().map(Declared::Kind));
        self
    }

    /// Register an already constructed property source
    #[must_use = "builder methods must be chained or built"]
    pub fn with_property_source(mut self, source: Arc<dyn PropertySource>) -> Self {
        self.sources.push(Declared::Ready(source));
        self
    }

    /// Add an application package
    #[must_use = "builder methods must be chained or built"]
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.packages.push(package.into());
        self
    }

    /// Include configurations by name
    #[must_use = "builder methods must be chained or built"]
    pub fn with_configuration_includes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.includes.extend(names.into_iter().map(Into::into));
        self
    }

    /// Exclude configurations by name
    #[must_use = "builder methods must be chained or built"]
    pub fn with_configuration_excludes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add a filesystem resource root. Ignored if a resource loader is set.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_resource_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.resource_roots.push(root.into());
        self
    }

    /// Set the resource loader
    #[must_use = "builder methods must be chained or built"]
    pub fn with_resource_loader(mut self, loader: Arc<dyn ResourceLoader>) -> Self {
        self.resource_loader = Some(loader);
        self
    }

    /// Set the conversion service
    #[must_use = "builder methods must be chained or built"]
    pub fn with_conversion_service(mut self, conversion: Arc<dyn ConversionService>) -> Self {
        self.conversion = Some(conversion);
        self
    }

    /// Set the annotation scanner
    #[must_use = "builder methods must be chained or built"]
    pub fn with_scanner(mut self, scanner: Arc<dyn AnnotationScanner>) -> Self {
        self.scanner = Some(scanner);
        self
    }

    /// Set the type loader
    #[must_use = "builder methods must be chained or built"]
    pub fn with_type_loader(mut self, types: Arc<dyn TypeLoader>) -> Self {
        self.types = Some(types);
        self
    }

    /// Set the property source loader
    #[must_use = "builder methods must be chained or built"]
    pub fn with_loader(mut self, loader: Arc<dyn PropertySourceLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Set whether to fail on missing optional sources
    #[must_use = "builder methods must be chained or built"]
    pub fn with_fail_on_missing(mut self, fail: bool) -> Self {
        self.fail_on_missing = fail;
        self
    }

    /// Load every declared source and assemble the environment.
    ///
    /// The environment is returned stopped. A failing source aborts the
    /// build unless it is optional and `fail_on_missing` is off, in which
    /// case it is skipped with a warning.
    pub async fn build(self) -> EnvResult<Environment> {
        let loader = self
            .loader
            .unwrap_or_else(|| Arc::new(CompositeLoader::default()));
        let env_name = self.name.as_str();

        let loads = self.sources.iter().map(|declared| {
            let loader = Arc::clone(&loader);
            async move {
                match declared {
                    Declared::Kind(kind) => loader.load(kind, env_name).await,
                    Declared::Ready(source) => Ok(vec![Arc::clone(source)]),
                }
            }
        });
        let results = join_all(loads).await;

        let mut env = Environment::new(self.name.clone());
        for (declared, result) in self.sources.iter().zip(results) {
            match result {
                Ok(sources) => {
                    for source in sources {
                        env.add_shared_property_source(source);
                    }
                }
                Err(e) => {
                    let Declared::Kind(kind) = declared else {
                        return Err(e);
                    };
                    if self.fail_on_missing || !kind.is_optional() {
                        return Err(e);
                    }
                    tracing::warn!(
                        env = %self.name,
                        source = %kind,
                        error = %e,
                        "Failed to load optional property source"
                    );
                }
            }
        }

        for package in self.packages {
            env.add_package(package);
        }
        env.add_configuration_includes(self.includes)
            .add_configuration_excludes(self.excludes);

        if let Some(conversion) = self.conversion {
            env.set_conversion_service(conversion);
        }
        match self.resource_loader {
            Some(resource_loader) => {
                env.set_resource_loader(resource_loader);
            }
            None if !self.resource_roots.is_empty() => {
                env.set_resource_loader(Arc::new(ClasspathLoader::new(self.resource_roots)));
            }
            None => {}
        }
        if let Some(scanner) = self.scanner {
            env.set_scanner(scanner);
        }
        if let Some(types) = self.types {
            env.set_type_loader(types);
        }

        tracing::debug!(
            env = %env.name(),
            sources = env.property_sources().len(),
            "Environment built"
        );
        Ok(env)
    }
}

impl std::fmt::Debug for EnvironmentBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvironmentBuilder")
            .field("name", &self.name)
            .field("sources", &self.sources.len())
            .field("packages", &self.packages)
            .field("resource_roots", &self.resource_roots)
            .field("has_resource_loader", &self.resource_loader.is_some())
            .field("has_conversion_service", &self.conversion.is_some())
            .field("has_loader", &self.loader.is_some())
            .field("fail_on_missing", &self.fail_on_missing)
            .finish()
    }
}
