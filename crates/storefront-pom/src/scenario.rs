//! Checkout journey.
//!
//! [`CheckoutJourney`] walks the pages in order, one method per step:
//!
//! ```text
//! Unauthenticated -login-> Authenticated -add_item-> ItemInCart -go_to_cart-> AtCart
//!   -checkout-> AtCheckout -enter_details-> DetailsEntered -verify_total-> SummaryVerified
//! ```
//!
//! Steps called out of order fail with `InvalidState` before touching the
//! browser. [`CheckoutScenario`] bundles the inputs of one end-to-end run.

use std::fmt;
use std::time::{Duration, Instant};

use crate::config::{keys, Properties};
use crate::page_object::{PageFactory, PageObject};
use crate::pages::{CartPage, CheckoutPage, InventoryPage, LoginPage, SummaryPage};
use crate::result::{PomError, PomResult};

/// Default storefront entry point
pub const DEFAULT_TEST_URL: &str = "https://www.saucedemo.com/";

/// Where the journey currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JourneyState {
    /// On the login page, not signed in
    Unauthenticated,
    /// Signed in, on the inventory
    Authenticated,
    /// At least one item added
    ItemInCart,
    /// On the cart page
    AtCart,
    /// On the customer information form
    AtCheckout,
    /// Information submitted, on the overview
    DetailsEntered,
    /// Total checked
    SummaryVerified,
}

impl fmt::Display for JourneyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Customer information for the checkout form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDetails {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Zip / postal code
    pub postal_code: String,
}

impl Default for CustomerDetails {
    fn default() -> Self {
        Self::new("Test", "User", "12345")
    }
}

impl CustomerDetails {
    /// Create details
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            postal_code: postal_code.into(),
        }
    }
}

// =============================================================================
// JOURNEY
// =============================================================================

/// Ordered checkout steps over one session
#[derive(Debug)]
pub struct CheckoutJourney {
    factory: PageFactory,
    state: JourneyState,
    items: Vec<String>,
}

impl CheckoutJourney {
    /// Start a journey; the browser must already show the login page
    #[must_use]
    pub fn new(factory: PageFactory) -> Self {
        Self {
            factory,
            state: JourneyState::Unauthenticated,
            items: Vec::new(),
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> JourneyState {
        self.state
    }

    /// Items added so far
    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    fn require(&self, allowed: &[JourneyState], step: &str) -> PomResult<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(PomError::invalid_state(format!(
                "cannot {step} while {}",
                self.state
            )))
        }
    }

    fn advance(&mut self, next: JourneyState) {
        tracing::info!(from = %self.state, to = %next, "journey transition");
        self.state = next;
    }

    fn page<P: PageObject>(&self) -> PomResult<P> {
        self.factory.create()
    }

    /// Sign in; fails with the page's error banner when rejected
    pub async fn login(&mut self, username: &str, password: &str) -> PomResult<()> {
        self.require(&[JourneyState::Unauthenticated], "log in")?;
        let login: LoginPage = self.page()?;
        login.login(username, password).await?;

        let inventory: InventoryPage = self.page()?;
        let rejected = tokio::select! {
            biased;
            loaded = inventory.wait_until_loaded() => unloaded(loaded, "inventory did not load")?,
            Ok(banner) = login.error_message() => Some(banner),
        };
        if let Some(reason) = rejected {
            return Err(PomError::assertion(format!(
                "login as '{username}' failed: {reason}"
            )));
        }
        self.advance(JourneyState::Authenticated);
        Ok(())
    }

    /// Add `item` to the cart
    pub async fn add_item(&mut self, item: &str) -> PomResult<()> {
        self.require(
            &[JourneyState::Authenticated, JourneyState::ItemInCart],
            "add an item",
        )?;
        let inventory: InventoryPage = self.page()?;
        inventory.add_to_cart(item).await?;
        self.items.push(item.to_string());
        self.advance(JourneyState::ItemInCart);
        Ok(())
    }

    /// Open the cart
    pub async fn go_to_cart(&mut self) -> PomResult<()> {
        self.require(&[JourneyState::ItemInCart], "open the cart")?;
        let inventory: InventoryPage = self.page()?;
        inventory.go_to_cart().await?;

        let cart: CartPage = self.page()?;
        for item in &self.items {
            if let Some(reason) = unloaded(cart.wait_for_item(item).await, "not listed")? {
                return Err(PomError::assertion(format!(
                    "cart does not list '{item}': {reason}"
                )));
            }
        }
        self.advance(JourneyState::AtCart);
        Ok(())
    }

    /// Start checkout from the cart
    pub async fn checkout(&mut self) -> PomResult<()> {
        self.require(&[JourneyState::AtCart], "start checkout")?;
        let cart: CartPage = self.page()?;
        cart.click_checkout().await?;
        self.advance(JourneyState::AtCheckout);
        Ok(())
    }

    /// Submit customer information
    pub async fn enter_details(&mut self, details: &CustomerDetails) -> PomResult<()> {
        self.require(&[JourneyState::AtCheckout], "enter details")?;
        let checkout: CheckoutPage = self.page()?;
        checkout
            .enter_details(&details.first_name, &details.last_name, &details.postal_code)
            .await?;
        checkout.click_continue().await?;

        let summary: SummaryPage = self.page()?;
        let rejected = tokio::select! {
            biased;
            loaded = summary.wait_until_loaded() => unloaded(loaded, "overview did not open")?,
            Ok(banner) = checkout.error_message() => Some(banner),
        };
        if let Some(reason) = rejected {
            return Err(PomError::assertion(format!(
                "checkout details rejected: {reason}"
            )));
        }
        self.advance(JourneyState::DetailsEntered);
        Ok(())
    }

    /// Read the order total and compare it with `expected`
    pub async fn verify_total(&mut self, expected: &str) -> PomResult<String> {
        self.require(&[JourneyState::DetailsEntered], "verify the total")?;
        let summary: SummaryPage = self.page()?;
        let total = summary.read_total().await?;
        if total != expected {
            return Err(PomError::assertion(format!(
                "expected total {expected}, found {total}"
            )));
        }
        self.advance(JourneyState::SummaryVerified);
        Ok(total)
    }
}

// A timed-out page wait becomes the failure reason; other errors propagate.
fn unloaded(waited: PomResult<()>, what: &str) -> PomResult<Option<String>> {
    match waited {
        Ok(()) => Ok(None),
        Err(e) if e.is_timeout() => Ok(Some(format!("{what} ({e})"))),
        Err(e) => Err(e),
    }
}

// =============================================================================
// SCENARIO
// =============================================================================

/// Inputs of one end-to-end checkout run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutScenario {
    /// Storefront entry URL
    pub url: String,
    /// Login user name
    pub username: String,
    /// Login password
    pub password: String,
    /// Items to buy
    pub items: Vec<String>,
    /// Checkout form values
    pub details: CustomerDetails,
    /// Expected order total (`10.79`)
    pub expected_total: String,
}

impl CheckoutScenario {
    /// Scenario buying one bike light for 10.79
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            url: DEFAULT_TEST_URL.to_string(),
            username: username.into(),
            password: password.into(),
            items: vec!["bike-light".to_string()],
            details: CustomerDetails::default(),
            expected_total: "10.79".to_string(),
        }
    }

    /// Build from `test_url`, `username` and `password`
    pub fn from_properties(props: &Properties) -> PomResult<Self> {
        let required = |key: &str| {
            props
                .get(key)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| PomError::Config {
                    message: format!("property '{key}' is required"),
                })
        };
        let mut scenario = Self::new(required(keys::USERNAME)?, required(keys::PASSWORD)?);
        if let Some(url) = props.get(keys::TEST_URL).filter(|v| !v.is_empty()) {
            scenario.url = url.to_string();
        }
        Ok(scenario)
    }

    /// Set the entry URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Replace the items to buy
    #[must_use]
    pub fn with_items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.items = items.into_iter().map(Into::into).collect();
        self
    }

    /// Set the expected total
    #[must_use]
    pub fn with_expected_total(mut self, total: impl Into<String>) -> Self {
        self.expected_total = total.into();
        self
    }

    /// Set the checkout form values
    #[must_use]
    pub fn with_details(mut self, details: CustomerDetails) -> Self {
        self.details = details;
        self
    }

    /// Open the storefront and walk the whole journey
    pub async fn run(&self, factory: PageFactory) -> PomResult<ScenarioOutcome> {
        if self.items.is_empty() {
            return Err(PomError::Config {
                message: "a checkout needs at least one item".to_string(),
            });
        }
        let start = Instant::now();
        let waits = factory.waits();
        tracing::info!(url = %self.url, items = ?self.items, "starting checkout scenario");
        waits.session().navigate(&self.url).await?;
        waits.page_ready(None).await?;

        let mut journey = CheckoutJourney::new(factory);
        journey.login(&self.username, &self.password).await?;
        for item in &self.items {
            journey.add_item(item).await?;
        }
        journey.go_to_cart().await?;
        journey.checkout().await?;
        journey.enter_details(&self.details).await?;
        let total = journey.verify_total(&self.expected_total).await?;

        Ok(ScenarioOutcome {
            total,
            items: journey.items().to_vec(),
            duration: start.elapsed(),
        })
    }
}

/// What a successful run observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioOutcome {
    /// Verified order total
    pub total: String,
    /// Items bought
    pub items: Vec<String>,
    /// Wall time of the run
    pub duration: Duration,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::pages::fixtures::{storefront, PASSWORD, USER};
    use crate::simulation::{StorePage, LOGIN_URL};

    mod journey_tests {
        use super::*;

        #[tokio::test]
        async fn test_full_checkout_reaches_expected_total() {
            let (store, factory) = storefront().await;
            let mut journey = CheckoutJourney::new(factory);

            journey.login(USER, PASSWORD).await.unwrap();
            assert_eq!(journey.state(), JourneyState::Authenticated);
            journey.add_item("bike-light").await.unwrap();
            journey.go_to_cart().await.unwrap();
            journey.checkout().await.unwrap();
            journey.enter_details(&CustomerDetails::default()).await.unwrap();
            let total = journey.verify_total("10.79").await.unwrap();

            assert_eq!(total, "10.79");
            assert_eq!(journey.state(), JourneyState::SummaryVerified);
            assert_eq!(store.current_page(), StorePage::Summary);
        }

        #[tokio::test]
        async fn test_out_of_order_steps_are_rejected() {
            let (store, factory) = storefront().await;
            let mut journey = CheckoutJourney::new(factory);

            let err = journey.go_to_cart().await.unwrap_err();
            assert!(matches!(err, PomError::InvalidState { .. }));
            let err = journey.verify_total("10.79").await.unwrap_err();
            assert!(matches!(err, PomError::InvalidState { .. }));

            journey.login(USER, PASSWORD).await.unwrap();
            let err = journey.checkout().await.unwrap_err();
            assert!(matches!(err, PomError::InvalidState { .. }));
            assert_eq!(journey.state(), JourneyState::Authenticated);
            assert_eq!(store.current_page(), StorePage::Inventory);

            let err = journey.login(USER, PASSWORD).await.unwrap_err();
            assert!(err.to_string().contains("Authenticated"));
        }

        #[tokio::test]
        async fn test_rejected_login_keeps_state() {
            let (_store, factory) = storefront().await;
            let mut journey = CheckoutJourney::new(factory);
            let err = journey.login(USER, "nope").await.unwrap_err();
            assert!(matches!(err, PomError::AssertionFailed { .. }));
            assert!(err.to_string().contains("do not match"));
            assert_eq!(journey.state(), JourneyState::Unauthenticated);
        }

        #[tokio::test]
        async fn test_wrong_total_is_assertion_failure() {
            let (_store, factory) = storefront().await;
            let mut journey = CheckoutJourney::new(factory);
            journey.login(USER, PASSWORD).await.unwrap();
            journey.add_item("onesie").await.unwrap();
            journey.go_to_cart().await.unwrap();
            journey.checkout().await.unwrap();
            journey.enter_details(&CustomerDetails::default()).await.unwrap();
            let err = journey.verify_total("10.79").await.unwrap_err();
            assert!(err.to_string().contains("found 8.63"));
            assert_eq!(journey.state(), JourneyState::DetailsEntered);
        }

        #[tokio::test]
        async fn test_blank_details_rejected() {
            let (_store, factory) = storefront().await;
            let mut journey = CheckoutJourney::new(factory);
            journey.login(USER, PASSWORD).await.unwrap();
            journey.add_item("bike-light").await.unwrap();
            journey.go_to_cart().await.unwrap();
            journey.checkout().await.unwrap();
            let err = journey
                .enter_details(&CustomerDetails::new("Ada", "Lovelace", ""))
                .await
                .unwrap_err();
            assert!(err.to_string().contains("Postal Code is required"));
            assert_eq!(journey.state(), JourneyState::AtCheckout);
        }
    }

    mod slow_page_tests {
        use super::*;
        use crate::driver::BrowserSession;
        use crate::registry::LocatorRegistry;
        use crate::simulation::SimulatedStorefront;
        use crate::wait::WaitEngine;
        use std::sync::Arc;

        /// Pages render after the 100 ms presence timeout but well inside
        /// the 2 s default timeout
        async fn slow_storefront(navigation: Duration) -> (Arc<SimulatedStorefront>, PageFactory) {
            let store = Arc::new(
                SimulatedStorefront::new()
                    .with_account(USER, PASSWORD)
                    .with_render_delay(Duration::from_millis(300))
                    .with_navigation_delay(navigation),
            );
            store.navigate(LOGIN_URL).await.unwrap();
            let waits = WaitEngine::new(store.clone(), Duration::from_secs(2))
                .with_poll_interval(Duration::from_millis(10));
            let factory = PageFactory::new(Arc::new(LocatorRegistry::builtin().cached()), waits)
                .with_presence_timeout(Duration::from_millis(100));
            (store, factory)
        }

        #[tokio::test]
        async fn test_login_waits_for_slow_inventory() {
            let (store, factory) = slow_storefront(Duration::ZERO).await;
            let mut journey = CheckoutJourney::new(factory);
            journey.login(USER, PASSWORD).await.unwrap();
            assert!(store.is_logged_in());
            assert_eq!(journey.state(), JourneyState::Authenticated);
        }

        #[tokio::test]
        async fn test_rejected_login_reported_without_full_timeout() {
            let (_store, factory) = slow_storefront(Duration::ZERO).await;
            let mut journey = CheckoutJourney::new(factory);
            let start = Instant::now();
            let err = journey.login(USER, "nope").await.unwrap_err();
            assert!(err.to_string().contains("do not match"));
            assert!(start.elapsed() < Duration::from_secs(2));
        }

        #[tokio::test]
        async fn test_journey_survives_delayed_click_navigation() {
            let (store, factory) = slow_storefront(Duration::from_millis(200)).await;
            let mut journey = CheckoutJourney::new(factory);
            journey.login(USER, PASSWORD).await.unwrap();
            journey.add_item("bike-light").await.unwrap();
            journey.go_to_cart().await.unwrap();
            journey.checkout().await.unwrap();
            journey.enter_details(&CustomerDetails::default()).await.unwrap();
            assert_eq!(journey.state(), JourneyState::DetailsEntered);
            assert_eq!(store.current_page(), StorePage::Summary);
            assert_eq!(journey.verify_total("10.79").await.unwrap(), "10.79");
        }

        #[tokio::test]
        async fn test_blank_details_rejected_on_slow_page() {
            let (_store, factory) = slow_storefront(Duration::from_millis(200)).await;
            let mut journey = CheckoutJourney::new(factory);
            journey.login(USER, PASSWORD).await.unwrap();
            journey.add_item("bike-light").await.unwrap();
            journey.go_to_cart().await.unwrap();
            journey.checkout().await.unwrap();
            let err = journey
                .enter_details(&CustomerDetails::new("", "Lovelace", "12345"))
                .await
                .unwrap_err();
            assert!(err.to_string().contains("First Name is required"));
            assert_eq!(journey.state(), JourneyState::AtCheckout);
        }
    }

    mod scenario_tests {
        use super::*;

        #[tokio::test]
        async fn test_scenario_run() {
            let (_store, factory) = storefront().await;
            let outcome = CheckoutScenario::new(USER, PASSWORD)
                .with_url(LOGIN_URL)
                .run(factory)
                .await
                .unwrap();
            assert_eq!(outcome.total, "10.79");
            assert_eq!(outcome.items, vec!["bike-light"]);
        }

        #[tokio::test]
        async fn test_scenario_with_two_items() {
            let (_store, factory) = storefront().await;
            let outcome = CheckoutScenario::new(USER, PASSWORD)
                .with_items(["bike-light", "backpack"])
                .with_expected_total("43.18")
                .run(factory)
                .await
                .unwrap();
            assert_eq!(outcome.total, "43.18");
        }

        #[tokio::test]
        async fn test_scenario_needs_items() {
            let (_store, factory) = storefront().await;
            let err = CheckoutScenario::new(USER, PASSWORD)
                .with_items(Vec::<String>::new())
                .run(factory)
                .await
                .unwrap_err();
            assert!(matches!(err, PomError::Config { .. }));
        }

        #[test]
        fn test_from_properties() {
            let props = Properties::new()
                .with(keys::USERNAME, "standard_user")
                .with(keys::PASSWORD, "secret")
                .with(keys::TEST_URL, "https://www.saucedemo.com/index.html");
            let scenario = CheckoutScenario::from_properties(&props).unwrap();
            assert_eq!(scenario.username, "standard_user");
            assert_eq!(scenario.url, "https://www.saucedemo.com/index.html");
            assert_eq!(scenario.expected_total, "10.79");

            let err = CheckoutScenario::from_properties(&Properties::new()).unwrap_err();
            assert!(err.to_string().contains("username"));
        }
    }
}
