//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Storefront: checkout end-to-end scenarios driven through page objects
#[derive(Parser, Debug)]
#[command(name = "storefront")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log line format
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the checkout scenario
    Checkout(CheckoutArgs),

    /// Validate locator files
    Locators(LocatorsArgs),
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Browser driver to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DriverArg {
    /// In-process simulated storefront
    #[default]
    Simulated,
    /// Chromium over the DevTools protocol (feature `browser`)
    Chromium,
}

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    /// Plain text summary
    #[default]
    Text,
    /// JSON object
    Json,
}

/// Arguments for the checkout command
#[derive(Parser, Debug)]
pub struct CheckoutArgs {
    /// Browser driver
    #[arg(long, value_enum, default_value = "simulated")]
    pub driver: DriverArg,

    /// Item to buy (repeatable), e.g. `bike-light`
    #[arg(long = "item", value_name = "SLUG")]
    pub items: Vec<String>,

    /// Expected order total; computed from the standard catalog when omitted
    #[arg(long, value_name = "AMOUNT")]
    pub expected_total: Option<String>,

    /// Directory for failure screenshots
    #[arg(long, default_value = "target/screenshots")]
    pub screenshot_dir: PathBuf,

    /// Storefront entry URL
    #[arg(long, env = "STOREFRONT_TEST_URL")]
    pub url: Option<String>,

    /// Login user name
    #[arg(long, env = "STOREFRONT_USERNAME")]
    pub username: Option<String>,

    /// Login password
    #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Run the browser without a window (default: true)
    #[arg(long, env = "STOREFRONT_HEADLESS")]
    pub headless: Option<bool>,

    /// Browser family (chrome, edge)
    #[arg(long, env = "STOREFRONT_BROWSER")]
    pub browser: Option<String>,

    /// Default wait timeout in seconds
    #[arg(long, env = "STOREFRONT_DEFAULT_TIMEOUT")]
    pub default_timeout: Option<String>,

    /// Chrome executable path
    #[arg(long, env = "CHROMEDRIVER_PATH")]
    pub chromedriver_path: Option<PathBuf>,

    /// Edge executable path
    #[arg(long, env = "EDGEDRIVER_PATH")]
    pub edgedriver_path: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    pub format: ReportFormat,
}

/// Arguments for the locators command
#[derive(Parser, Debug)]
pub struct LocatorsArgs {
    /// Directory of `<page>.json` files; built-in locators when omitted
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Page to validate (repeatable); all pages when omitted
    #[arg(long = "page", value_name = "PAGE")]
    pub pages: Vec<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod cli_parsing_tests {
        use super::*;

        #[test]
        fn test_verify_cli() {
            use clap::CommandFactory;
            Cli::command().debug_assert();
        }

        #[test]
        fn test_checkout_defaults() {
            let cli = Cli::try_parse_from(["storefront", "checkout"]).unwrap();
            let Commands::Checkout(args) = cli.command else {
                panic!("expected checkout");
            };
            assert_eq!(args.driver, DriverArg::Simulated);
            assert!(args.items.is_empty());
            assert_eq!(args.screenshot_dir, PathBuf::from("target/screenshots"));
            assert_eq!(args.format, ReportFormat::Text);
            assert_eq!(cli.log_format, LogFormat::Text);
        }

        #[test]
        fn test_checkout_repeated_items() {
            let cli = Cli::try_parse_from([
                "storefront",
                "checkout",
                "--item",
                "backpack",
                "--item",
                "onesie",
                "--expected-total",
                "41.02",
                "--driver",
                "chromium",
            ])
            .unwrap();
            let Commands::Checkout(args) = cli.command else {
                panic!("expected checkout");
            };
            assert_eq!(args.items, vec!["backpack", "onesie"]);
            assert_eq!(args.expected_total.as_deref(), Some("41.02"));
            assert_eq!(args.driver, DriverArg::Chromium);
        }

        #[test]
        fn test_global_flags_after_subcommand() {
            let cli =
                Cli::try_parse_from(["storefront", "locators", "-vv", "--log-format", "json"])
                    .unwrap();
            assert_eq!(cli.verbose, 2);
            assert_eq!(cli.log_format, LogFormat::Json);
        }

        #[test]
        fn test_locators_pages() {
            let cli = Cli::try_parse_from([
                "storefront",
                "locators",
                "--dir",
                "locators",
                "--page",
                "login",
                "--page",
                "cart",
            ])
            .unwrap();
            let Commands::Locators(args) = cli.command else {
                panic!("expected locators");
            };
            assert_eq!(args.dir, Some(PathBuf::from("locators")));
            assert_eq!(args.pages, vec!["login", "cart"]);
        }

        #[test]
        fn test_unknown_driver_rejected() {
            assert!(Cli::try_parse_from(["storefront", "checkout", "--driver", "firefox"]).is_err());
        }
    }
}
