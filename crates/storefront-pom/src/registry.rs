//! Declarative locator registry.
//!
//! Each page has one locator document mapping element keys to descriptors:
//!
//! ```json
//! { "usernameField": { "type": "css", "value": "*[data-test='username']" } }
//! ```
//!
//! Documents come from a [`LocatorSource`]. Loading validates every entry, so a
//! page object either gets a complete [`PageLocatorSet`] or fails at
//! construction.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use crate::locator::{LocatorDescriptor, LocatorStrategy};
use crate::result::{PomError, PomResult};

// =============================================================================
// SOURCES
// =============================================================================

/// Where locator documents are read from
pub trait LocatorSource: Send + Sync + fmt::Debug {
    /// Raw document for a page, or `LocatorSourceNotFound`
    fn read(&self, page: &str) -> PomResult<String>;

    /// Human-readable location of a page's document
    fn location(&self, page: &str) -> String;
}

/// Reads `<dir>/<page>.json`
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    /// Create a source rooted at `dir`
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, page: &str) -> PathBuf {
        self.dir.join(format!("{page}.json"))
    }
}

impl LocatorSource for DirectorySource {
    fn read(&self, page: &str) -> PomResult<String> {
        let path = self.path_for(page);
        match std::fs::read_to_string(&path) {
            Ok(doc) => Ok(doc),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PomError::LocatorSourceNotFound {
                    page: page.to_string(),
                    location: path.display().to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn location(&self, page: &str) -> String {
        self.path_for(page).display().to_string()
    }
}

/// In-memory documents keyed by page name
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    documents: HashMap<String, String>,
}

impl StaticSource {
    /// Create an empty source
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locator documents shipped with the crate
    #[must_use]
    pub fn builtin() -> Self {
        Self::new()
            .with_page("login", include_str!("../locators/login.json"))
            .with_page("inventory", include_str!("../locators/inventory.json"))
            .with_page("cart", include_str!("../locators/cart.json"))
            .with_page("checkout", include_str!("../locators/checkout.json"))
            .with_page("summary", include_str!("../locators/summary.json"))
    }

    /// Add or replace a page document
    #[must_use]
    pub fn with_page(mut self, page: impl Into<String>, document: impl Into<String>) -> Self {
        let _ = self.documents.insert(page.into(), document.into());
        self
    }
}

impl LocatorSource for StaticSource {
    fn read(&self, page: &str) -> PomResult<String> {
        self.documents
            .get(page)
            .cloned()
            .ok_or_else(|| PomError::LocatorSourceNotFound {
                page: page.to_string(),
                location: self.location(page),
            })
    }

    fn location(&self, page: &str) -> String {
        format!("builtin:{page}")
    }
}

// =============================================================================
// PAGE LOCATOR SET
// =============================================================================

/// Immutable key → descriptor map for one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocatorSet {
    page: String,
    locators: BTreeMap<String, LocatorDescriptor>,
}

impl PageLocatorSet {
    /// Page name
    #[must_use]
    pub fn page(&self) -> &str {
        &self.page
    }

    /// Descriptor for `key`
    pub fn lookup(&self, key: &str) -> PomResult<&LocatorDescriptor> {
        self.locators
            .get(key)
            .ok_or_else(|| PomError::LocatorKeyNotFound {
                page: self.page.clone(),
                key: key.to_string(),
            })
    }

    /// Whether `key` is defined
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.locators.contains_key(key)
    }

    /// Keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.locators.keys().map(String::as_str)
    }

    /// Number of locators
    #[must_use]
    pub fn len(&self) -> usize {
        self.locators.len()
    }

    /// Whether the set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }

    /// Parse a locator document
    pub fn parse(page: &str, document: &str) -> PomResult<Self> {
        let raw: BTreeMap<String, RawDescriptor> =
            serde_json::from_str(document).map_err(|e| PomError::LocatorParse {
                page: page.to_string(),
                message: e.to_string(),
            })?;

        let mut locators = BTreeMap::new();
        for (key, entry) in raw {
            let strategy: LocatorStrategy =
                entry
                    .strategy
                    .parse()
                    .map_err(|_| PomError::UnsupportedLocatorStrategy {
                        page: page.to_string(),
                        key: key.clone(),
                        strategy: entry.strategy.clone(),
                    })?;
            let descriptor =
                LocatorDescriptor::new(key.clone(), strategy, entry.value).map_err(|_| {
                    PomError::LocatorParse {
                        page: page.to_string(),
                        message: format!("locator '{key}' has an empty value"),
                    }
                })?;
            let _ = locators.insert(key, descriptor);
        }

        Ok(Self {
            page: page.to_string(),
            locators,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawDescriptor {
    #[serde(rename = "type")]
    strategy: String,
    value: String,
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Loads page locator sets from a source
pub struct LocatorRegistry {
    source: Arc<dyn LocatorSource>,
    cache: Option<RwLock<HashMap<String, Arc<PageLocatorSet>>>>,
}

impl fmt::Debug for LocatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocatorRegistry")
            .field("source", &self.source)
            .field("cached", &self.cache.is_some())
            .finish()
    }
}

impl LocatorRegistry {
    /// Registry over an arbitrary source; loads on every call
    #[must_use]
    pub fn new(source: impl LocatorSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
            cache: None,
        }
    }

    /// Registry over the shipped locator documents
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(StaticSource::builtin())
    }

    /// Registry over `<dir>/<page>.json`
    #[must_use]
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(DirectorySource::new(dir))
    }

    /// Memoise loaded pages for the lifetime of the registry
    #[must_use]
    pub fn cached(mut self) -> Self {
        self.cache = Some(RwLock::new(HashMap::new()));
        self
    }

    /// Whether loaded pages are memoised
    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    /// Load and validate the locator set for `page`
    pub fn load(&self, page: &str) -> PomResult<Arc<PageLocatorSet>> {
        if let Some(cache) = &self.cache {
            let hit = cache
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .get(page)
                .cloned();
            if let Some(set) = hit {
                tracing::debug!(page, "locator set served from cache");
                return Ok(set);
            }
        }

        let document = self.source.read(page)?;
        let set = Arc::new(PageLocatorSet::parse(page, &document)?);
        tracing::debug!(
            page,
            location = %self.source.location(page),
            locators = set.len(),
            "loaded locator set"
        );

        if let Some(cache) = &self.cache {
            let _ = cache
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(page.to_string(), Arc::clone(&set));
        }
        Ok(set)
    }

    /// Load every page eagerly, stopping at the first failure
    pub fn validate<S: AsRef<str>>(&self, pages: &[S]) -> PomResult<Vec<Arc<PageLocatorSet>>> {
        pages.iter().map(|p| self.load(p.as_ref())).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    const LOGIN_DOC: &str = r#"{
        "usernameField": { "type": "css", "value": "*[data-test='username']" },
        "loginButton": { "type": "id", "value": "login-button" }
    }"#;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_parse_valid_document() {
            let set = PageLocatorSet::parse("login", LOGIN_DOC).unwrap();
            assert_eq!(set.page(), "login");
            assert_eq!(set.len(), 2);
            let d = set.lookup("loginButton").unwrap();
            assert_eq!(d.strategy(), LocatorStrategy::Id);
            assert_eq!(d.value(), "login-button");
        }

        #[test]
        fn test_lookup_miss() {
            let set = PageLocatorSet::parse("login", LOGIN_DOC).unwrap();
            let err = set.lookup("nonExistentKey").unwrap_err();
            assert!(matches!(
                err,
                PomError::LocatorKeyNotFound { ref page, ref key }
                    if page == "login" && key == "nonExistentKey"
            ));
        }

        #[test]
        fn test_unknown_strategy() {
            let err = PageLocatorSet::parse(
                "login",
                r#"{ "usernameField": { "type": "foo", "value": "x" } }"#,
            )
            .unwrap_err();
            assert!(matches!(
                err,
                PomError::UnsupportedLocatorStrategy { ref page, ref key, ref strategy }
                    if page == "login" && key == "usernameField" && strategy == "foo"
            ));
        }

        #[test]
        fn test_empty_value() {
            let err = PageLocatorSet::parse(
                "login",
                r#"{ "usernameField": { "type": "css", "value": "" } }"#,
            )
            .unwrap_err();
            assert!(matches!(err, PomError::LocatorParse { .. }));
        }

        #[test]
        fn test_malformed_documents() {
            for doc in [
                "not json",
                "[]",
                r#"{ "k": "css" }"#,
                r#"{ "k": { "value": "x" } }"#,
                r#"{ "k": { "type": "css" } }"#,
            ] {
                let err = PageLocatorSet::parse("login", doc).unwrap_err();
                assert!(
                    matches!(err, PomError::LocatorParse { .. }),
                    "expected parse error for {doc}, got {err:?}"
                );
            }
        }

        #[test]
        fn test_mixed_case_strategy_names() {
            let set = PageLocatorSet::parse(
                "p",
                r#"{ "a": { "type": "linkText", "value": "Home" },
                     "b": { "type": "PARTIALLINKTEXT", "value": "Ho" } }"#,
            )
            .unwrap();
            assert_eq!(set.lookup("a").unwrap().strategy(), LocatorStrategy::LinkText);
            assert_eq!(
                set.lookup("b").unwrap().strategy(),
                LocatorStrategy::PartialLinkText
            );
        }
    }

    mod source_tests {
        use super::*;

        #[test]
        fn test_directory_source_reads_page_file() {
            let dir = tempfile::tempdir().unwrap();
            let mut file = std::fs::File::create(dir.path().join("login.json")).unwrap();
            file.write_all(LOGIN_DOC.as_bytes()).unwrap();

            let registry = LocatorRegistry::from_dir(dir.path());
            let set = registry.load("login").unwrap();
            assert!(set.contains("usernameField"));
        }

        #[test]
        fn test_directory_source_missing_file() {
            let dir = tempfile::tempdir().unwrap();
            let registry = LocatorRegistry::from_dir(dir.path());
            let err = registry.load("checkout").unwrap_err();
            match err {
                PomError::LocatorSourceNotFound { page, location } => {
                    assert_eq!(page, "checkout");
                    assert!(location.ends_with("checkout.json"));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[test]
        fn test_builtin_pages_all_load() {
            let registry = LocatorRegistry::builtin();
            let sets = registry
                .validate(&["login", "inventory", "cart", "checkout", "summary"])
                .unwrap();
            assert_eq!(sets.len(), 5);
            assert!(sets.iter().all(|s| !s.is_empty()));
        }

        #[test]
        fn test_static_source_unknown_page() {
            let err = LocatorRegistry::new(StaticSource::new())
                .load("login")
                .unwrap_err();
            assert!(matches!(err, PomError::LocatorSourceNotFound { .. }));
        }
    }

    mod cache_tests {
        use super::*;

        #[test]
        fn test_uncached_registry_loads_fresh_sets() {
            let registry =
                LocatorRegistry::new(StaticSource::new().with_page("login", LOGIN_DOC));
            let a = registry.load("login").unwrap();
            let b = registry.load("login").unwrap();
            assert!(!Arc::ptr_eq(&a, &b));
            assert_eq!(a, b);
        }

        #[test]
        fn test_cached_registry_shares_sets() {
            let registry =
                LocatorRegistry::new(StaticSource::new().with_page("login", LOGIN_DOC)).cached();
            assert!(registry.is_cached());
            let a = registry.load("login").unwrap();
            let b = registry.load("login").unwrap();
            assert!(Arc::ptr_eq(&a, &b));
        }

        #[test]
        fn test_cache_does_not_memoise_failures() {
            let registry = LocatorRegistry::new(
                StaticSource::new().with_page("bad", r#"{ "k": { "type": "foo", "value": "x" } }"#),
            )
            .cached();
            assert!(registry.load("bad").is_err());
            assert!(registry.load("bad").is_err());
        }

        #[test]
        fn test_validate_reports_first_failure() {
            let registry = LocatorRegistry::new(
                StaticSource::new()
                    .with_page("good", r#"{ "k": { "type": "id", "value": "x" } }"#)
                    .with_page("bad", r#"{ "k": { "type": "foo", "value": "x" } }"#),
            );
            let sets = registry.validate(&["good"]).unwrap();
            assert_eq!(sets[0].page(), "good");

            let err = registry.validate(&["good", "missing", "bad"]).unwrap_err();
            assert!(matches!(err, PomError::LocatorSourceNotFound { ref page, .. } if page == "missing"));
        }
    }
}
