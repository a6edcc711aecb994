//! Scenario runner implementation

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use storefront_pom::config::{keys, Properties};
use storefront_pom::driver::SessionRef;
use storefront_pom::harness::{FailureHandler, ScenarioResult};
use storefront_pom::page_object::PageFactory;
use storefront_pom::pages::PAGE_NAMES;
use storefront_pom::registry::LocatorRegistry;
use storefront_pom::scenario::CheckoutScenario;
use storefront_pom::simulation::{
    format_cents, Catalog, SimulatedStorefront, DEFAULT_PASSWORD, DEFAULT_USERNAME,
};
use storefront_pom::wait::WaitEngine;

use crate::commands::{CheckoutArgs, DriverArg, LocatorsArgs};
use crate::config::checkout_properties;
use crate::error::{CliError, CliResult};

/// Name the checkout scenario reports under
pub const CHECKOUT_SCENARIO: &str = "checkoutTest";

/// What `storefront checkout` prints
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReport {
    /// Scenario name
    pub scenario: String,
    /// Whether the scenario passed
    pub passed: bool,
    /// Items bought
    pub items: Vec<String>,
    /// Expected order total
    pub expected_total: String,
    /// Observed order total (on success)
    pub total: Option<String>,
    /// Failure message
    pub error: Option<String>,
    /// Failure screenshot
    pub screenshot: Option<String>,
    /// Wall time in milliseconds
    pub duration_ms: u128,
}

impl CheckoutReport {
    fn new(scenario: &CheckoutScenario, result: &ScenarioResult, total: Option<String>) -> Self {
        Self {
            scenario: result.name.clone(),
            passed: result.passed,
            items: scenario.items.clone(),
            expected_total: scenario.expected_total.clone(),
            total,
            error: result.error.clone(),
            screenshot: result
                .screenshot
                .as_ref()
                .map(|p| p.display().to_string()),
            duration_ms: result.duration.as_millis(),
        }
    }

    /// Plain text rendering
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        if self.passed {
            out.push_str(&format!(
                "PASS {} ({} ms)\n",
                self.scenario, self.duration_ms
            ));
        } else {
            out.push_str(&format!(
                "FAIL {} ({} ms)\n",
                self.scenario, self.duration_ms
            ));
        }
        out.push_str(&format!("  items: {}\n", self.items.join(", ")));
        out.push_str(&format!("  expected total: {}\n", self.expected_total));
        if let Some(total) = &self.total {
            out.push_str(&format!("  total: {total}\n"));
        }
        if let Some(error) = &self.error {
            out.push_str(&format!("  error: {error}\n"));
        }
        if let Some(path) = &self.screenshot {
            out.push_str(&format!("  screenshot: {path}\n"));
        }
        out
    }
}

/// Scenario definition from flags and properties.
///
/// The simulated driver falls back to its built-in account. Without
/// `--expected-total` the total is priced from the standard catalog.
pub fn build_scenario(args: &CheckoutArgs, props: &Properties) -> CliResult<CheckoutScenario> {
    let mut props = props.clone();
    if args.driver == DriverArg::Simulated {
        if props.get(keys::USERNAME).is_none() {
            props.set(keys::USERNAME, DEFAULT_USERNAME);
        }
        if props.get(keys::PASSWORD).is_none() {
            props.set(keys::PASSWORD, DEFAULT_PASSWORD);
        }
    }
    let mut scenario = CheckoutScenario::from_properties(&props)?;

    if !args.items.is_empty() {
        let catalog = Catalog::standard();
        if let Some(unknown) = args.items.iter().find(|i| catalog.find(i).is_none()) {
            return Err(CliError::invalid_argument(format!(
                "unknown item '{unknown}'"
            )));
        }
        scenario = scenario.with_items(args.items.iter().cloned());
    }
    let expected = match &args.expected_total {
        Some(total) => total.clone(),
        None => format_cents(Catalog::standard().totals(&scenario.items).total_cents),
    };
    Ok(scenario.with_expected_total(expected))
}

async fn open_session(driver: DriverArg, props: &Properties) -> CliResult<SessionRef> {
    match driver {
        DriverArg::Simulated => Ok(Arc::new(
            SimulatedStorefront::new().with_render_delay(Duration::from_millis(20)),
        )),
        #[cfg(feature = "browser")]
        DriverArg::Chromium => {
            let config = storefront_pom::driver::SessionConfig::from_properties(props)?;
            let session = storefront_pom::browser::CdpSession::launch(&config).await?;
            Ok(Arc::new(session))
        }
        #[cfg(not(feature = "browser"))]
        DriverArg::Chromium => {
            let _ = props;
            Err(CliError::config(
                "chromium driver not enabled. Rebuild with --features browser",
            ))
        }
    }
}

/// Run the checkout scenario and build its report
pub async fn run_checkout(args: &CheckoutArgs) -> CliResult<CheckoutReport> {
    let props = checkout_properties(args);
    let scenario = build_scenario(args, &props)?;
    let session = open_session(args.driver, &props).await?;

    let waits = WaitEngine::from_properties(Arc::clone(&session), &props);
    let factory = PageFactory::new(Arc::new(LocatorRegistry::builtin().cached()), waits);
    let handler = FailureHandler::new(&args.screenshot_dir);

    tracing::info!(driver = ?args.driver, items = ?scenario.items, "running checkout");
    let (result, outcome) = handler
        .run(CHECKOUT_SCENARIO, session.as_ref(), scenario.run(factory))
        .await;
    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "session did not close cleanly");
    }

    Ok(CheckoutReport::new(
        &scenario,
        &result,
        outcome.map(|o| o.total),
    ))
}

/// One validated page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    /// Page name
    pub page: String,
    /// Locator keys on the page
    pub keys: Vec<String>,
}

/// Load and parse every requested locator file; stops at the first failure
pub fn validate_locators(args: &LocatorsArgs) -> CliResult<Vec<PageSummary>> {
    let registry = match &args.dir {
        Some(dir) => {
            if !dir.is_dir() {
                return Err(CliError::invalid_argument(format!(
                    "{} is not a directory",
                    dir.display()
                )));
            }
            LocatorRegistry::from_dir(dir)
        }
        None => LocatorRegistry::builtin(),
    };
    let pages: Vec<&str> = if args.pages.is_empty() {
        PAGE_NAMES.to_vec()
    } else {
        args.pages.iter().map(String::as_str).collect()
    };

    let sets = registry.validate(&pages)?;
    Ok(sets
        .iter()
        .map(|set| PageSummary {
            page: set.page().to_string(),
            keys: set.keys().map(str::to_string).collect(),
        })
        .collect())
}
