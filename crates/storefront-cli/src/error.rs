//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Scenario ran and failed
    #[error("Scenario '{name}' failed: {message}")]
    ScenarioFailed {
        /// Scenario name
        name: String,
        /// Error message
        message: String,
    },

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Page-object library error
    #[error("{0}")]
    Pom(#[from] storefront_pom::PomError),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a scenario failure
    #[must_use]
    pub fn scenario_failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ScenarioFailed {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use storefront_pom::PomError;

    #[test]
    fn test_error_display() {
        let err = CliError::config("missing username");
        assert_eq!(err.to_string(), "Configuration error: missing username");

        let err = CliError::scenario_failed("checkout", "total mismatch");
        assert!(err.to_string().contains("'checkout'"));
        assert!(err.to_string().contains("total mismatch"));

        let err = CliError::invalid_argument("--item");
        assert!(err.to_string().contains("--item"));
    }

    #[test]
    fn test_from_pom_error() {
        let err: CliError = PomError::NoAlert.into();
        assert!(matches!(err, CliError::Pom(_)));
        assert_eq!(err.to_string(), "No alert present");
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: CliError = io.into();
        assert!(err.to_string().contains("gone"));
    }
}
