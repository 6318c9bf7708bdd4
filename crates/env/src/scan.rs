//! Type discovery collaborators
//!
//! The environment does not walk code itself. It hands annotation scans to
//! an [`AnnotationScanner`] constrained to the registered packages, and asks
//! a [`TypeLoader`] whether optional types are present.

use std::collections::BTreeSet;
use std::io;

/// A discoverable type and the markers attached to it
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeDescriptor {
    /// Fully qualified type name (`app::model::Book` or `com.example.Book`)
    pub name: String,

    /// Marker annotations on the type
    pub annotations: BTreeSet<String>,
}

impl TypeDescriptor {
    /// Create a descriptor without annotations
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotations: BTreeSet::new(),
        }
    }

    /// Descriptor for a Rust type, named by its full path
    pub fn of<T: ?Sized>() -> Self {
        Self::new(std::any::type_name::<T>())
    }

    /// Add a marker annotation
    #[must_use = "builder methods must be chained or built"]
    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.insert(annotation.into());
        self
    }

    /// Whether the type carries `annotation`
    pub fn has_annotation(&self, annotation: &str) -> bool {
        self.annotations.contains(annotation)
    }

    /// Whether the type lives in `package` or one of its sub-packages.
    ///
    /// Both `::` and `.` separate path segments.
    pub fn in_package(&self, package: &str) -> bool {
        match self.name.strip_prefix(package) {
            Some(rest) => rest.starts_with("::") || rest.starts_with('.'),
            None => false,
        }
    }
}

/// Finds annotated types within a set of packages
pub trait AnnotationScanner: Send + Sync {
    /// Every type annotated with `annotation` in any of `packages`.
    ///
    /// Expensive; callers should not repeat scans needlessly.
    fn scan(&self, annotation: &str, packages: &BTreeSet<String>)
    -> io::Result<Vec<TypeDescriptor>>;
}

/// Answers whether a named type is available
pub trait TypeLoader: Send + Sync {
    /// Whether `type_name` can be loaded
    fn is_present(&self, type_name: &str) -> bool;
}

/// Fixed catalogue of known types.
///
/// Serves as both scanner and type loader for applications that register
/// their types at startup.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: BTreeSet<TypeDescriptor>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type
    #[must_use = "builder methods must be chained or built"]
    pub fn with_type(mut self, descriptor: TypeDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    /// Register a type
    pub fn register(&mut self, descriptor: TypeDescriptor) {
        self.types.insert(descriptor);
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl AnnotationScanner for TypeRegistry {
    fn scan(
        &self,
        annotation: &str,
        packages: &BTreeSet<String>,
    ) -> io::Result<Vec<TypeDescriptor>> {
        Ok(self
            .types
            .iter()
            .filter(|t| t.has_annotation(annotation))
            .filter(|t| packages.iter().any(|p| t.in_package(p)))
            .cloned()
            .collect())
    }
}

impl TypeLoader for TypeRegistry {
    fn is_present(&self, type_name: &str) -> bool {
        self.types.iter().any(|t| t.name == type_name)
    }
}
