//! Storefront CLI Library
//!
//! Harness around `storefront-pom`: turns flags and environment into
//! properties, runs the checkout scenario against the chosen driver and
//! validates locator files.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)] // String building is clear and correct

mod commands;
mod config;
mod error;
mod runner;

pub use commands::{
    CheckoutArgs, Cli, Commands, DriverArg, LocatorsArgs, LogFormat, ReportFormat,
};
pub use config::{checkout_properties, CliConfig, Verbosity};
pub use error::{CliError, CliResult};
pub use runner::{
    build_scenario, run_checkout, validate_locators, CheckoutReport, PageSummary,
    CHECKOUT_SCENARIO,
};
