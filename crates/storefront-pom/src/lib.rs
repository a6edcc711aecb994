//! Storefront POM: Page Objects for Checkout E2E Tests
//!
//! Page objects for a storefront's login, inventory, cart, checkout and
//! order summary pages. Each page reads its element locators from a
//! per-page JSON file, and every interaction goes through explicit
//! condition waits against a [`driver::BrowserSession`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                    STOREFRONT-POM Architecture                     │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐   ┌────────────┐   ┌────────────┐   ┌──────────┐ │
//! │  │ locators/  │──►│ Locator    │──►│ Page       │──►│ Checkout │ │
//! │  │ <page>.json│   │ Registry   │   │ Objects    │   │ Journey  │ │
//! │  └────────────┘   └────────────┘   └─────┬──────┘   └──────────┘ │
//! │                                          │                        │
//! │                                   ┌──────▼──────┐                 │
//! │                                   │ WaitEngine  │                 │
//! │                                   └──────┬──────┘                 │
//! │                       ┌──────────────────┴─────────────┐          │
//! │               ┌───────▼────────┐              ┌────────▼───────┐  │
//! │               │ Simulated      │              │ CDP session    │  │
//! │               │ storefront     │              │ (chromium)     │  │
//! │               └────────────────┘              └────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use storefront_pom::prelude::*;
//!
//! # async fn demo() -> PomResult<()> {
//! let session: SessionRef = Arc::new(SimulatedStorefront::new());
//! let waits = WaitEngine::new(session, std::time::Duration::from_secs(10));
//! let factory = PageFactory::new(Arc::new(LocatorRegistry::builtin()), waits);
//!
//! let outcome = CheckoutScenario::new(DEFAULT_USERNAME, DEFAULT_PASSWORD)
//!     .run(factory)
//!     .await?;
//! assert_eq!(outcome.total, "10.79");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

/// Test configuration properties
pub mod config;

/// Browser session abstraction
pub mod driver;

/// Failure screenshots and scenario results
pub mod harness;

/// Locator strategies and selector resolution
pub mod locator;

/// Page object base and factory
pub mod page_object;

/// Storefront page objects
pub mod pages;

/// Per-page locator files
pub mod registry;

mod result;

/// Checkout journey and end-to-end scenario
pub mod scenario;

/// In-process simulated storefront
pub mod simulation;

/// Condition waits
pub mod wait;

/// Chromium session over the DevTools protocol
#[cfg(feature = "browser")]
pub mod browser;

pub use result::{PomError, PomResult};

/// Commonly used types
pub mod prelude {
    pub use super::config::{keys, Properties};
    pub use super::driver::{
        Alert, BrowserKind, BrowserSession, ElementHandle, ElementRef, ReadyState, SessionConfig,
        SessionRef,
    };
    pub use super::harness::{FailureHandler, ScenarioResult};
    pub use super::locator::{resolve, LocatorDescriptor, LocatorStrategy, Query, Selector};
    pub use super::page_object::{PageContext, PageFactory, PageObject, UrlMatcher};
    pub use super::pages::{CartPage, CheckoutPage, InventoryPage, LoginPage, SummaryPage};
    pub use super::registry::{
        DirectorySource, LocatorRegistry, LocatorSource, PageLocatorSet, StaticSource,
    };
    pub use super::result::{PomError, PomResult};
    pub use super::scenario::{
        CheckoutJourney, CheckoutScenario, CustomerDetails, JourneyState, ScenarioOutcome,
    };
    pub use super::simulation::{SimulatedStorefront, DEFAULT_PASSWORD, DEFAULT_USERNAME};
    pub use super::wait::{Condition, Satisfied, WaitEngine};

    #[cfg(feature = "browser")]
    pub use super::browser::CdpSession;
}
