//! Resource lookup relative to the application's resource roots
//!
//! Resource roots play the part of a classpath: a logical name such as
//! `META-INF/services/plugins.txt` may exist under several roots, the first
//! root wins for single lookups and every root contributes to
//! [`ResourceLocator::get_resources`].
//!
//! Discovery is best-effort. Not-found is reported as absence and I/O
//! failures degrade to absence or an empty result; neither is an error.

use dashmap::DashMap;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use url::Url;

/// Host-side access to named resources
pub trait ResourceLoader: Send + Sync + fmt::Debug {
    /// Open the first resource named `path`
    fn open(&self, path: &str) -> io::Result<Option<Box<dyn Read + Send>>>;

    /// Locate the first resource named `path`
    fn find(&self, path: &str) -> io::Result<Option<Url>>;

    /// Locate every resource named `name`, in root order
    fn find_all(&self, name: &str) -> io::Result<Vec<Url>>;
}

/// Resource loader over a list of filesystem roots
#[derive(Debug, Clone, Default)]
pub struct ClasspathLoader {
    roots: Vec<PathBuf>,
}

impl ClasspathLoader {
    /// Create a loader over `roots`, searched in order
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// Append a root
    pub fn add_root(&mut self, root: impl Into<PathBuf>) {
        self.roots.push(root.into());
    }

    /// Configured roots
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn candidates<'a>(&'a self, path: &str) -> impl Iterator<Item = PathBuf> + 'a {
        let relative = relative_path(path);
        self.roots
            .iter()
            .filter_map(move |root| relative.as_ref().map(|rel| root.join(rel)))
    }
}

/// Turn a resource name into a path confined to a root.
///
/// A leading `/` is ignored; names escaping the root are rejected.
fn relative_path(path: &str) -> Option<PathBuf> {
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    let relative = Path::new(trimmed);
    relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        .then(|| relative.to_path_buf())
}

fn to_url(path: &Path) -> io::Result<Url> {
    let absolute = std::fs::canonicalize(path)?;
    Url::from_file_path(&absolute).map_err(|()| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("cannot express {} as a URL", absolute.display()),
        )
    })
}

impl ResourceLoader for ClasspathLoader {
    fn open(&self, path: &str) -> io::Result<Option<Box<dyn Read + Send>>> {
        for candidate in self.candidates(path) {
            if candidate.is_file() {
                let file = File::open(&candidate)?;
                return Ok(Some(Box::new(file)));
            }
        }
        Ok(None)
    }

    fn find(&self, path: &str) -> io::Result<Option<Url>> {
        for candidate in self.candidates(path) {
            if candidate.exists() {
                return to_url(&candidate).map(Some);
            }
        }
        Ok(None)
    }

    fn find_all(&self, name: &str) -> io::Result<Vec<Url>> {
        self.candidates(name)
            .filter(|candidate| candidate.exists())
            .map(|candidate| to_url(&candidate))
            .collect()
    }
}

/// Realized set of resource locations.
///
/// Backed by a collection, so it can be iterated any number of times.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resources(Vec<Url>);

impl Resources {
    /// Iterate the locations
    pub fn iter(&self) -> std::slice::Iter<'_, Url> {
        self.0.iter()
    }

    /// Number of locations
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was found
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the underlying vector
    pub fn into_vec(self) -> Vec<Url> {
        self.0
    }
}

impl IntoIterator for Resources {
    type Item = Url;
    type IntoIter = std::vec::IntoIter<Url>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Resources {
    type Item = &'a Url;
    type IntoIter = std::slice::Iter<'a, Url>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Resource lookups with absence semantics and a location cache.
///
/// Caching can be switched off; the owning environment only caches while
/// it is running.
#[derive(Debug)]
pub struct ResourceLocator {
    loader: Arc<dyn ResourceLoader>,
    cache: DashMap<String, Option<Url>>,
    caching: AtomicBool,
}

impl ResourceLocator {
    /// Create a caching locator over `loader`
    pub fn new(loader: Arc<dyn ResourceLoader>) -> Self {
        Self {
            loader,
            cache: DashMap::new(),
            caching: AtomicBool::new(true),
        }
    }

    /// Underlying loader
    pub fn loader(&self) -> &Arc<dyn ResourceLoader> {
        &self.loader
    }

    /// Enable or disable the location cache
    pub fn set_caching(&self, enabled: bool) {
        self.caching.store(enabled, Ordering::Release);
    }

    /// Open the best match for `path` as a byte stream
    pub fn get_resource_as_stream(&self, path: &str) -> Option<Box<dyn Read + Send>> {
        match self.loader.open(path) {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!(path, error = %e, "Failed to open resource");
                None
            }
        }
    }

    /// Location of the best match for `path`
    pub fn get_resource(&self, path: &str) -> Option<Url> {
        let caching = self.caching.load(Ordering::Acquire);
        if caching && let Some(cached) = self.cache.get(path) {
            return cached.value().clone();
        }
        match self.loader.find(path) {
            Ok(found) => {
                if caching {
                    self.cache.insert(path.to_string(), found.clone());
                    // caching may have been switched off and released meanwhile
                    if !self.caching.load(Ordering::Acquire) {
                        self.cache.remove(path);
                    }
                }
                found
            }
            Err(e) => {
                tracing::warn!(path, error = %e, "Failed to locate resource");
                None
            }
        }
    }

    /// Every location of `name`; empty when enumeration fails
    pub fn get_resources(&self, name: &str) -> Resources {
        match self.loader.find_all(name) {
            Ok(urls) => Resources(urls),
            Err(e) => {
                tracing::warn!(name, error = %e, "Resource enumeration failed, returning no resources");
                Resources::default()
            }
        }
    }

    /// Number of cached lookups
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Drop cached lookups
    pub fn release(&self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::{OnceLock, Weak};
    use tempfile::TempDir;

    fn roots() -> (TempDir, TempDir) {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        fs::create_dir_all(a.path().join("META-INF")).unwrap();
        fs::create_dir_all(b.path().join("META-INF")).unwrap();
        fs::write(a.path().join("META-INF/plugins.txt"), "from-a").unwrap();
        fs::write(b.path().join("META-INF/plugins.txt"), "from-b").unwrap();
        fs::write(b.path().join("only-b.txt"), "b").unwrap();
        (a, b)
    }

    fn locator(a: &TempDir, b: &TempDir) -> ResourceLocator {
        ResourceLocator::new(Arc::new(ClasspathLoader::new([a.path(), b.path()])))
    }

    #[test]
    fn test_first_root_wins_for_single_lookups() {
        let (a, b) = roots();
        let locator = locator(&a, &b);

        let mut content = String::new();
        locator
            .get_resource_as_stream("META-INF/plugins.txt")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "from-a");

        let url = locator.get_resource("/META-INF/plugins.txt").unwrap();
        assert!(url.path().ends_with("META-INF/plugins.txt"));
        assert!(locator.get_resource("only-b.txt").is_some());
    }

    #[test]
    fn test_missing_resources_are_absent() {
        let (a, b) = roots();
        let locator = locator(&a, &b);

        assert!(locator.get_resource("missing.txt").is_none());
        assert!(locator.get_resource_as_stream("missing.txt").is_none());
        assert!(locator.get_resources("missing.txt").is_empty());
        assert!(locator.get_resource("").is_none());
    }

    #[test]
    fn test_names_cannot_escape_roots() {
        let (a, b) = roots();
        let locator = locator(&a, &b);
        assert!(locator.get_resource("../etc/passwd").is_none());
        assert!(locator.get_resource_as_stream("META-INF/../../x").is_none());
    }

    #[test]
    fn test_get_resources_is_restartable() {
        let (a, b) = roots();
        let locator = locator(&a, &b);

        let found = locator.get_resources("META-INF/plugins.txt");
        assert_eq!(found.len(), 2);

        let first: Vec<_> = found.iter().cloned().collect();
        let second: Vec<_> = (&found).into_iter().cloned().collect();
        assert_eq!(first, second);
        assert_eq!(found.into_vec(), first);
    }

    #[test]
    fn test_release_clears_cache() {
        let (a, b) = roots();
        let locator = locator(&a, &b);

        locator.get_resource("only-b.txt");
        locator.get_resource("missing.txt");
        assert_eq!(locator.cached(), 2);

        locator.release();
        assert_eq!(locator.cached(), 0);
    }

    #[test]
    fn test_disabled_cache_still_resolves() {
        let (a, b) = roots();
        let locator = locator(&a, &b);
        locator.set_caching(false);

        assert!(locator.get_resource("only-b.txt").is_some());
        assert_eq!(locator.cached(), 0);
    }

    #[derive(Debug)]
    struct FailingLoader;

    impl ResourceLoader for FailingLoader {
        fn open(&self, _path: &str) -> io::Result<Option<Box<dyn Read + Send>>> {
            Err(io::Error::other("disk on fire"))
        }

        fn find(&self, _path: &str) -> io::Result<Option<Url>> {
            Err(io::Error::other("disk on fire"))
        }

        fn find_all(&self, _name: &str) -> io::Result<Vec<Url>> {
            Err(io::Error::other("disk on fire"))
        }
    }

    /// Switches its locator's cache off in the middle of a lookup
    #[derive(Debug, Default)]
    struct ReleasingLoader {
        locator: OnceLock<Weak<ResourceLocator>>,
    }

    impl ResourceLoader for ReleasingLoader {
        fn open(&self, _path: &str) -> io::Result<Option<Box<dyn Read + Send>>> {
            Ok(None)
        }

        fn find(&self, _path: &str) -> io::Result<Option<Url>> {
            if let Some(locator) = self.locator.get().and_then(Weak::upgrade) {
                locator.set_caching(false);
                locator.release();
            }
            Ok(Some(Url::parse("file:///srv/app/banner.txt").unwrap()))
        }

        fn find_all(&self, _name: &str) -> io::Result<Vec<Url>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_release_during_lookup_leaves_no_entry() {
        let loader = Arc::new(ReleasingLoader::default());
        let locator = Arc::new(ResourceLocator::new(loader.clone()));
        loader.locator.set(Arc::downgrade(&locator)).unwrap();

        assert!(locator.get_resource("banner.txt").is_some());
        assert_eq!(locator.cached(), 0);
    }

    #[test]
    fn test_io_failures_degrade_to_absence() {
        let locator = ResourceLocator::new(Arc::new(FailingLoader));

        assert!(locator.get_resource_as_stream("a").is_none());
        assert!(locator.get_resource("a").is_none());
        assert!(locator.get_resources("a").is_empty());
        assert_eq!(locator.cached(), 0);
    }
}
