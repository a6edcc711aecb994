//! String-keyed configuration surface shared with the harness.
//!
//! The harness fills a [`Properties`] map from flags and environment; the
//! page-object layer only ever reads [`keys::DEFAULT_TIMEOUT`].

use std::collections::BTreeMap;
use std::time::Duration;

/// Property keys understood by the harness and the core
pub mod keys {
    /// Run the browser without a window
    pub const HEADLESS_MODE: &str = "headless_mode";
    /// Browser family (`chrome`, `edge`, ...)
    pub const BROWSER: &str = "browser";
    /// Storefront entry URL
    pub const TEST_URL: &str = "test_url";
    /// Login user name
    pub const USERNAME: &str = "username";
    /// Login password
    pub const PASSWORD: &str = "password";
    /// Chrome executable or driver path
    pub const CHROMEDRIVER_PATH: &str = "chromedriver_path";
    /// Edge executable or driver path
    pub const EDGEDRIVER_PATH: &str = "edgedriver_path";
    /// Default wait timeout in whole seconds
    pub const DEFAULT_TIMEOUT: &str = "defaultTimeout";
}

/// Fallback when `defaultTimeout` is absent or unusable (seconds)
pub const FALLBACK_TIMEOUT_SECS: u64 = 10;

/// Ordered string-keyed property map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    values: BTreeMap<String, String>,
}

impl Properties {
    /// Create an empty property map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, builder style
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a property
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let _ = self.values.insert(key.into(), value.into());
    }

    /// Get a property
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Get a property or a default
    #[must_use]
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Interpret a property as a boolean (`true`/`false`, case-insensitive)
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.get(key)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }

    /// Iterate over all properties in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Default wait timeout.
    ///
    /// Missing, non-numeric and zero values fall back to
    /// [`FALLBACK_TIMEOUT_SECS`] with a warning.
    #[must_use]
    pub fn default_timeout(&self) -> Duration {
        let Some(raw) = self.get(keys::DEFAULT_TIMEOUT) else {
            return Duration::from_secs(FALLBACK_TIMEOUT_SECS);
        };
        match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            Ok(_) => {
                tracing::warn!(
                    value = raw,
                    fallback = FALLBACK_TIMEOUT_SECS,
                    "defaultTimeout must be positive, using fallback"
                );
                Duration::from_secs(FALLBACK_TIMEOUT_SECS)
            }
            Err(e) => {
                tracing::warn!(
                    value = raw,
                    error = %e,
                    fallback = FALLBACK_TIMEOUT_SECS,
                    "defaultTimeout is not a number, using fallback"
                );
                Duration::from_secs(FALLBACK_TIMEOUT_SECS)
            }
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Self::new();
        for (k, v) in iter {
            props.set(k, v);
        }
        props
    }
}
