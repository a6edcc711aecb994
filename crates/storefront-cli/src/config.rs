//! CLI configuration

use storefront_pom::config::{keys, Properties};
use tracing_subscriber::EnvFilter;

use crate::commands::{CheckoutArgs, Cli, LogFormat};

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Quiet - errors only
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - extra output
    Verbose,
    /// Debug - maximum output
    Debug,
}

impl Verbosity {
    /// Derive from `-v` count and `-q`
    #[must_use]
    pub const fn from_flags(verbose: u8, quiet: bool) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Default tracing filter directive
    #[must_use]
    pub const fn filter(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "info",
            Self::Debug => "debug",
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Log line format
    pub log_format: LogFormat,
}

impl CliConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from parsed global flags
    #[must_use]
    pub const fn from_cli(cli: &Cli) -> Self {
        Self {
            verbosity: Verbosity::from_flags(cli.verbose, cli.quiet),
            log_format: cli.log_format,
        }
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set log format
    #[must_use]
    pub const fn with_log_format(mut self, log_format: LogFormat) -> Self {
        self.log_format = log_format;
        self
    }

    /// Install the global tracing subscriber on stderr.
    ///
    /// `RUST_LOG` wins over the verbosity flags when set.
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.verbosity.filter()));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false);
        // a second init (tests) keeps the first subscriber
        let _ = match self.log_format {
            LogFormat::Text => builder.try_init(),
            LogFormat::Json => builder.json().try_init(),
        };
    }
}

/// Harness properties from checkout flags and environment
#[must_use]
pub fn checkout_properties(args: &CheckoutArgs) -> Properties {
    let mut props = Properties::new();
    let mut put = |key: &str, value: Option<String>| {
        if let Some(value) = value {
            props.set(key, value);
        }
    };
    put(keys::TEST_URL, args.url.clone());
    put(keys::USERNAME, args.username.clone());
    put(keys::PASSWORD, args.password.clone());
    put(keys::HEADLESS_MODE, args.headless.map(|h| h.to_string()));
    put(keys::BROWSER, args.browser.clone());
    put(keys::DEFAULT_TIMEOUT, args.default_timeout.clone());
    put(
        keys::CHROMEDRIVER_PATH,
        args.chromedriver_path
            .as_ref()
            .map(|p| p.display().to_string()),
    );
    put(
        keys::EDGEDRIVER_PATH,
        args.edgedriver_path
            .as_ref()
            .map(|p| p.display().to_string()),
    );
    props
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::time::Duration;

    mod verbosity_tests {
        use super::*;

        #[test]
        fn test_from_flags() {
            assert_eq!(Verbosity::from_flags(0, false), Verbosity::Normal);
            assert_eq!(Verbosity::from_flags(1, false), Verbosity::Verbose);
            assert_eq!(Verbosity::from_flags(5, false), Verbosity::Debug);
            assert_eq!(Verbosity::from_flags(3, true), Verbosity::Quiet);
            assert!(Verbosity::Quiet.is_quiet());
        }

        #[test]
        fn test_filter_levels() {
            assert_eq!(Verbosity::Quiet.filter(), "error");
            assert_eq!(Verbosity::Debug.filter(), "debug");
        }

        #[test]
        fn test_config_from_cli() {
            let cli = Cli::try_parse_from(["storefront", "-q", "--log-format", "json", "locators"])
                .unwrap();
            let config = CliConfig::from_cli(&cli);
            assert_eq!(config.verbosity, Verbosity::Quiet);
            assert_eq!(config.log_format, LogFormat::Json);
        }
    }

    mod properties_tests {
        use super::*;
        use crate::commands::Commands;

        fn checkout(args: &[&str]) -> CheckoutArgs {
            let argv = ["storefront", "checkout"].iter().chain(args).copied();
            match Cli::try_parse_from(argv).unwrap().command {
                Commands::Checkout(args) => args,
                Commands::Locators(_) => panic!("expected checkout"),
            }
        }

        #[test]
        fn test_flags_become_properties() {
            let args = checkout(&[
                "--url",
                "https://shop.test/",
                "--username",
                "alice",
                "--password",
                "pw",
                "--headless",
                "true",
                "--browser",
                "edge",
                "--default-timeout",
                "3",
                "--edgedriver-path",
                "/opt/msedge",
            ]);
            let props = checkout_properties(&args);
            assert_eq!(props.get(keys::TEST_URL), Some("https://shop.test/"));
            assert_eq!(props.get(keys::USERNAME), Some("alice"));
            assert_eq!(props.get(keys::PASSWORD), Some("pw"));
            assert!(props.flag(keys::HEADLESS_MODE));
            assert_eq!(props.get(keys::BROWSER), Some("edge"));
            assert_eq!(props.default_timeout(), Duration::from_secs(3));
            assert_eq!(props.get(keys::EDGEDRIVER_PATH), Some("/opt/msedge"));
        }

        #[test]
        fn test_absent_flags_leave_keys_unset() {
            let args = CheckoutArgs {
                url: None,
                username: None,
                password: None,
                headless: None,
                browser: None,
                default_timeout: None,
                chromedriver_path: None,
                edgedriver_path: None,
                ..checkout(&[])
            };
            let props = checkout_properties(&args);
            assert_eq!(props.iter().count(), 0);
        }
    }
}
