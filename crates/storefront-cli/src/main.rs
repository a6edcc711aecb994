//! Storefront CLI: checkout end-to-end scenarios
//!
//! ## Usage
//!
//! ```bash
//! storefront checkout                             # Simulated storefront
//! storefront checkout --item backpack --item onesie
//! storefront checkout --driver chromium --username u --password p
//! storefront locators --dir locators --page login # Validate locator files
//! ```

use clap::Parser;
use std::process::ExitCode;
use storefront_cli::{
    run_checkout, validate_locators, CheckoutArgs, Cli, CliConfig, CliError, CliResult,
    Commands, LocatorsArgs, ReportFormat, CHECKOUT_SCENARIO,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = CliConfig::from_cli(&cli);
    config.init_tracing();

    match cli.command {
        Commands::Checkout(args) => run_checkout_command(&config, &args),
        Commands::Locators(args) => run_locators_command(&config, &args),
    }
}

fn run_checkout_command(config: &CliConfig, args: &CheckoutArgs) -> CliResult<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let report = runtime.block_on(run_checkout(args))?;

    match args.format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        ReportFormat::Text if !config.verbosity.is_quiet() => print!("{}", report.render_text()),
        ReportFormat::Text => {}
    }

    if report.passed {
        Ok(())
    } else {
        Err(CliError::scenario_failed(
            CHECKOUT_SCENARIO,
            report.error.unwrap_or_default(),
        ))
    }
}

fn run_locators_command(config: &CliConfig, args: &LocatorsArgs) -> CliResult<()> {
    let pages = validate_locators(args)?;
    if !config.verbosity.is_quiet() {
        for page in &pages {
            println!("{}: {} locators ({})", page.page, page.keys.len(), page.keys.join(", "));
        }
        println!("{} page(s) OK", pages.len());
    }
    Ok(())
}
