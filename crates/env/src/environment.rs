//! The application environment
//!
//! [`Environment`] composes a [`PropertyResolver`], a [`ConfigurationGate`],
//! a [`ResourceLocator`] and the type discovery collaborators behind one
//! API. It is populated during bootstrap through `&mut self` methods and
//! then shared (usually as `Arc<Environment>`) with everything that needs
//! configuration. Reads take `&self` and are safe from any number of
//! threads.

use crate::convert::ConversionService;
use crate::error::EnvResult;
use crate::gate::{BeanConfiguration, ConfigurationGate};
use crate::lifecycle::{Lifecycle, LifecycleState};
use crate::resolver::PropertyResolver;
use crate::resource::{ClasspathLoader, ResourceLoader, ResourceLocator, Resources};
use crate::scan::{AnnotationScanner, TypeDescriptor, TypeLoader, TypeRegistry};
use crate::source::PropertySource;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::Read;
use std::sync::Arc;
use url::Url;

/// The current application environment
pub struct Environment {
    name: String,
    resolver: PropertyResolver,
    packages: BTreeSet<String>,
    gate: ConfigurationGate,
    resources: ResourceLocator,
    scanner: Arc<dyn AnnotationScanner>,
    types: Arc<dyn TypeLoader>,
    state: Mutex<LifecycleState>,
}

impl Environment {
    /// The test environment
    pub const TEST: &'static str = "test";

    /// The development environment
    pub const DEVELOPMENT: &'static str = "dev";

    /// Create a stopped environment named `name` with no sources, no
    /// resource roots and an empty type registry
    pub fn new(name: impl Into<String>) -> Self {
        let registry = Arc::new(TypeRegistry::new());
        let resources = ResourceLocator::new(Arc::new(ClasspathLoader::default()));
        resources.set_caching(false);
        Self {
            name: name.into(),
            resolver: PropertyResolver::new(),
            packages: BTreeSet::new(),
            gate: ConfigurationGate::new(),
            resources,
            scanner: registry.clone(),
            types: registry,
            state: Mutex::new(LifecycleState::Stopped),
        }
    }

    /// Name of the environment (the active profile label)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if this is the [`TEST`](Self::TEST) environment
    pub fn is_test(&self) -> bool {
        self.name == Self::TEST
    }

    /// Check if this is the [`DEVELOPMENT`](Self::DEVELOPMENT) environment
    pub fn is_development(&self) -> bool {
        self.name == Self::DEVELOPMENT
    }

    // ==================== Registration ====================

    /// Add a property source, replacing any source with the same name
    pub fn add_property_source<S>(&mut self, source: S) -> &mut Self
    where
        S: PropertySource + 'static,
    {
        self.add_shared_property_source(Arc::new(source))
    }

    /// Add an already shared property source, replacing any source with the
    /// same name
    pub fn add_shared_property_source(&mut self, source: Arc<dyn PropertySource>) -> &mut Self {
        let name = source.name().to_string();
        let order = source.order();
        if self.resolver.add_source(source).is_some() {
            tracing::debug!(env = %self.name, source = %name, order, "Replaced property source");
        } else {
            tracing::debug!(env = %self.name, source = %name, order, "Added property source");
        }
        self
    }

    /// Add an application package.
    ///
    /// Application packages are the roots searched by [`scan`](Self::scan).
    pub fn add_package(&mut self, package: impl Into<String>) -> &mut Self {
        self.packages.insert(package.into());
        self
    }

    /// Add the module containing `T` as an application package
    pub fn add_package_of<T: ?Sized>(&mut self) -> &mut Self {
        let full = std::any::type_name::<T>();
        let path = full.split('<').next().unwrap_or(full);
        match path.rsplit_once("::") {
            Some((module, _)) => self.add_package(module),
            None => {
                tracing::debug!(type_name = full, "Type has no module path, no package added");
                self
            }
        }
    }

    /// Exclude configurations by name
    pub fn add_configuration_excludes<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.gate.add_excludes(names);
        self
    }

    /// Include configurations by name
    pub fn add_configuration_includes<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.gate.add_includes(names);
        self
    }

    /// Replace the conversion service used for typed reads
    pub fn set_conversion_service(&mut self, conversion: Arc<dyn ConversionService>) -> &mut Self {
        self.resolver.set_conversion_service(conversion);
        self
    }

    /// Replace the resource loader
    pub fn set_resource_loader(&mut self, loader: Arc<dyn ResourceLoader>) -> &mut Self {
        let resources = ResourceLocator::new(loader);
        resources.set_caching(self.is_running());
        self.resources = resources;
        self
    }

    /// Replace the annotation scanner
    pub fn set_scanner(&mut self, scanner: Arc<dyn AnnotationScanner>) -> &mut Self {
        self.scanner = scanner;
        self
    }

    /// Replace the type loader
    pub fn set_type_loader(&mut self, types: Arc<dyn TypeLoader>) -> &mut Self {
        self.types = types;
        self
    }

    // ==================== Properties ====================

    /// Resolve `key` as `T`; `Ok(None)` when no source holds it
    pub fn resolve<T>(&self, key: &str) -> EnvResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        self.resolver.resolve(key)
    }

    /// Resolve `key` as `T`, falling back to `default` when absent
    pub fn resolve_or<T>(&self, key: &str, default: T) -> EnvResult<T>
    where
        T: DeserializeOwned,
    {
        self.resolver.resolve_or(key, default)
    }

    /// Raw value of `key` with placeholders expanded
    pub fn resolve_raw(&self, key: &str) -> EnvResult<Option<Value>> {
        self.resolver.resolve_raw(key)
    }

    /// Whether any property source holds `key`
    pub fn contains_property(&self, key: &str) -> bool {
        self.resolver.contains(key)
    }

    /// Normalized keys under `prefix`
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.resolver.keys_with_prefix(prefix)
    }

    /// Winning raw values under `prefix`, keyed by the rest of the key
    pub fn properties_under(&self, prefix: &str) -> EnvResult<BTreeMap<String, Value>> {
        self.resolver.properties_under(prefix)
    }

    /// Property source registered under `name`
    pub fn property_source(&self, name: &str) -> Option<&Arc<dyn PropertySource>> {
        self.resolver.source(name)
    }

    /// Property sources in resolution order
    pub fn property_sources(&self) -> &[Arc<dyn PropertySource>] {
        self.resolver.sources()
    }

    /// The underlying resolver
    pub fn resolver(&self) -> &PropertyResolver {
        &self.resolver
    }

    // ==================== Configurations ====================

    /// Whether the given configuration is active in this environment
    pub fn is_active<C>(&self, configuration: &C) -> bool
    where
        C: BeanConfiguration + ?Sized,
    {
        self.gate.is_active(configuration.name())
    }

    /// The include/exclude rules
    pub fn configuration_gate(&self) -> &ConfigurationGate {
        &self.gate
    }

    // ==================== Types ====================

    /// The application packages
    pub fn packages(&self) -> &BTreeSet<String> {
        &self.packages
    }

    /// Scan the application packages for types annotated with `annotation`.
    ///
    /// Every call repeats the full scan; avoid calling it repeatedly. Scan
    /// failures yield no types.
    pub fn scan(&self, annotation: &str) -> std::vec::IntoIter<TypeDescriptor> {
        let found = match self.scanner.scan(annotation, &self.packages) {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(annotation, error = %e, "Annotation scan failed, returning no types");
                Vec::new()
            }
        };
        tracing::debug!(
            annotation,
            packages = self.packages.len(),
            found = found.len(),
            "Annotation scan completed"
        );
        found.into_iter()
    }

    /// Whether the named type is present
    pub fn is_present(&self, type_name: &str) -> bool {
        self.types.is_present(type_name)
    }

    // ==================== Resources ====================

    /// Open the resource at `path`
    pub fn get_resource_as_stream(&self, path: &str) -> Option<Box<dyn Read + Send>> {
        self.resources.get_resource_as_stream(path)
    }

    /// Locate the resource at `path`
    pub fn get_resource(&self, path: &str) -> Option<Url> {
        self.resources.get_resource(path)
    }

    /// Locate every resource named `name`
    pub fn get_resources(&self, name: &str) -> Resources {
        self.resources.get_resources(name)
    }

    /// The resource locator
    pub fn resource_locator(&self) -> &ResourceLocator {
        &self.resources
    }
}

impl Lifecycle for Environment {
    fn state(&self) -> LifecycleState {
        *self.state.lock()
    }

    fn start(&self) -> bool {
        let mut state = self.state.lock();
        if state.is_running() {
            return false;
        }
        self.resources.set_caching(true);
        *state = LifecycleState::Running;
        tracing::info!(
            env = %self.name,
            sources = self.resolver.sources().len(),
            packages = self.packages.len(),
            "Environment started"
        );
        true
    }

    fn stop(&self) -> bool {
        let mut state = self.state.lock();
        if !state.is_running() {
            return false;
        }
        self.resources.set_caching(false);
        self.resources.release();
        *state = LifecycleState::Stopped;
        tracing::info!(env = %self.name, "Environment stopped");
        true
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("resolver", &self.resolver)
            .field("packages", &self.packages)
            .field("gate", &self.gate)
            .finish()
    }
}
