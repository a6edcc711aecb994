//! Result and error types for the page-object layer.

use std::time::Duration;
use thiserror::Error;

/// Result type for page-object operations
pub type PomResult<T> = Result<T, PomError>;

/// Errors that can occur while resolving locators, waiting or interacting
#[derive(Debug, Error)]
pub enum PomError {
    /// No locator document exists for the page
    #[error("Locator source for page '{page}' not found at {location}")]
    LocatorSourceNotFound {
        /// Page name
        page: String,
        /// Where the source was looked up
        location: String,
    },

    /// Locator document exists but is malformed
    #[error("Malformed locator source for page '{page}': {message}")]
    LocatorParse {
        /// Page name
        page: String,
        /// Error message
        message: String,
    },

    /// Key absent from a loaded page locator set
    #[error("Locator key '{key}' not found for page '{page}'")]
    LocatorKeyNotFound {
        /// Page name
        page: String,
        /// Missing key
        key: String,
    },

    /// Descriptor names a strategy outside the supported set
    #[error("Unsupported locator strategy '{strategy}' for key '{key}' on page '{page}'")]
    UnsupportedLocatorStrategy {
        /// Page name (empty when parsed outside a page)
        page: String,
        /// Locator key (empty when parsed outside a page)
        key: String,
        /// Offending strategy name
        strategy: String,
    },

    /// Condition did not hold before the deadline
    #[error("Timed out after {elapsed:?} waiting for {condition}{}", .last_error.as_ref().map(|e| format!(" (last error: {e})")).unwrap_or_default())]
    WaitTimeout {
        /// Condition description
        condition: String,
        /// Time spent waiting
        elapsed: Duration,
        /// Last transient failure observed while polling
        last_error: Option<String>,
    },

    /// No element matched the selector (yet)
    #[error("Element not found: {selector}")]
    ElementNotFound {
        /// Selector description
        selector: String,
    },

    /// Element handle outlived the document it belonged to
    #[error("Stale element reference: {message}")]
    StaleElement {
        /// Error message
        message: String,
    },

    /// No alert is currently open
    #[error("No alert present")]
    NoAlert,

    /// Browser driver failure
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Operation called in the wrong journey state
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Error message
        message: String,
    },

    /// Configuration value could not be used
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Page interaction failed; carries page and key for failure reports
    #[error("{action} '{key}' on page '{page}' failed: {source}")]
    Interaction {
        /// Page name
        page: String,
        /// Locator key
        key: String,
        /// Primitive that failed (click, type, read, ...)
        action: &'static str,
        /// Underlying error
        #[source]
        source: Box<PomError>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PomError {
    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create a stale element error
    #[must_use]
    pub fn stale(message: impl Into<String>) -> Self {
        Self::StaleElement {
            message: message.into(),
        }
    }

    /// Create an invalid state error
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create an assertion error
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Failures the wait loop retries instead of surfacing.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ElementNotFound { .. } | Self::StaleElement { .. } | Self::NoAlert => true,
            Self::Interaction { source, .. } => source.is_transient(),
            _ => false,
        }
    }

    /// Whether this error (or the error it wraps) is a wait timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::WaitTimeout { .. } => true,
            Self::Interaction { source, .. } => source.is_timeout(),
            _ => false,
        }
    }

    /// Locator configuration problems; never retried.
    #[must_use]
    pub fn is_locator_error(&self) -> bool {
        match self {
            Self::LocatorSourceNotFound { .. }
            | Self::LocatorParse { .. }
            | Self::LocatorKeyNotFound { .. }
            | Self::UnsupportedLocatorStrategy { .. } => true,
            Self::Interaction { source, .. } => source.is_locator_error(),
            _ => false,
        }
    }
}
