//! Browser session boundary.
//!
//! Page objects talk to the browser only through [`BrowserSession`] and
//! [`ElementHandle`]. Two implementations ship with the crate:
//!
//! - [`crate::simulation::SimulatedStorefront`]: in-process storefront used by
//!   tests and by `storefront checkout --driver simulated`
//! - `CdpSession` (feature `browser`): Chromium over the DevTools protocol
//!
//! Sessions are shared between the page objects of one scenario, so every
//! method takes `&self`.

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::{keys, Properties};
use crate::locator::Selector;
use crate::result::{PomError, PomResult};

/// Shared handle to a located element
pub type ElementRef = Arc<dyn ElementHandle>;

/// Shared handle to a browser session
pub type SessionRef = Arc<dyn BrowserSession>;

/// `document.readyState`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadyState {
    /// Document still loading
    Loading,
    /// Parsed, sub-resources pending
    Interactive,
    /// Fully loaded
    Complete,
}

impl ReadyState {
    /// JavaScript name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Interactive => "interactive",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadyState {
    type Err = PomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "loading" => Ok(Self::Loading),
            "interactive" => Ok(Self::Interactive),
            "complete" => Ok(Self::Complete),
            other => Err(PomError::driver(format!("unknown document.readyState '{other}'"))),
        }
    }
}

/// An open JavaScript dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    /// Dialog message
    pub text: String,
}

impl Alert {
    /// Create an alert
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Browser automation session
#[async_trait]
pub trait BrowserSession: Send + Sync + fmt::Debug {
    /// Navigate to URL
    async fn navigate(&self, url: &str) -> PomResult<()>;

    /// First element matching the selector; `ElementNotFound` when none
    async fn find_element(&self, selector: &Selector) -> PomResult<ElementRef>;

    /// Current `document.readyState`
    async fn ready_state(&self) -> PomResult<ReadyState>;

    /// Open dialog; `NoAlert` when none
    async fn alert(&self) -> PomResult<Alert>;

    /// Accept the open dialog
    async fn accept_alert(&self) -> PomResult<()>;

    /// Dismiss the open dialog
    async fn dismiss_alert(&self) -> PomResult<()>;

    /// Get current URL
    async fn current_url(&self) -> PomResult<String>;

    /// Go back in history
    async fn go_back(&self) -> PomResult<()>;

    /// Go forward in history
    async fn go_forward(&self) -> PomResult<()>;

    /// Reload page
    async fn refresh(&self) -> PomResult<()>;

    /// PNG screenshot of the viewport
    async fn screenshot(&self) -> PomResult<Vec<u8>>;

    /// Close the session
    async fn close(&self) -> PomResult<()> {
        Ok(())
    }
}

/// Element located in the current document.
///
/// Handles go stale once the document they came from is replaced; every
/// method then fails with `StaleElement`.
#[async_trait]
pub trait ElementHandle: Send + Sync + fmt::Debug {
    /// Click element
    async fn click(&self) -> PomResult<()>;

    /// Append text to the element's value
    async fn send_keys(&self, text: &str) -> PomResult<()>;

    /// Empty the element's value
    async fn clear(&self) -> PomResult<()>;

    /// Rendered text
    async fn text(&self) -> PomResult<String>;

    /// Whether the element is rendered and visible
    async fn is_displayed(&self) -> PomResult<bool>;

    /// Whether the element accepts input
    async fn is_enabled(&self) -> PomResult<bool>;

    /// Attribute (or `value` property) by name
    async fn attribute(&self, name: &str) -> PomResult<Option<String>>;
}

// =============================================================================
// SESSION CONFIG
// =============================================================================

/// Browser family requested by the harness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrowserKind {
    /// Chrome / Chromium
    #[default]
    Chrome,
    /// Microsoft Edge
    Edge,
}

impl FromStr for BrowserKind {
    type Err = PomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chrome" | "chromium" => Ok(Self::Chrome),
            "edge" | "msedge" => Ok(Self::Edge),
            other => Err(PomError::Config {
                message: format!("unsupported browser '{other}'"),
            }),
        }
    }
}

/// Launch options for a real browser session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Run without a window
    pub headless: bool,
    /// Browser family
    pub browser: BrowserKind,
    /// Executable override
    pub executable_path: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            headless: true,
            browser: BrowserKind::Chrome,
            executable_path: None,
        }
    }
}

impl SessionConfig {
    /// Create config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set headless mode
    #[must_use]
    pub const fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set executable path
    #[must_use]
    pub fn executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable_path = Some(path.into());
        self
    }

    /// Build from harness properties.
    ///
    /// Without `headless_mode` the session is headless, as with
    /// [`SessionConfig::default`].
    ///
    /// The executable comes from `chromedriver_path` or `edgedriver_path`
    /// depending on `browser`.
    pub fn from_properties(props: &Properties) -> PomResult<Self> {
        let browser = match props.get(keys::BROWSER) {
            Some(name) => name.parse()?,
            None => BrowserKind::default(),
        };
        let path_key = match browser {
            BrowserKind::Chrome => keys::CHROMEDRIVER_PATH,
            BrowserKind::Edge => keys::EDGEDRIVER_PATH,
        };
        Ok(Self {
            headless: props
                .get(keys::HEADLESS_MODE)
                .map_or(Self::default().headless, |_| props.flag(keys::HEADLESS_MODE)),
            browser,
            executable_path: props
                .get(path_key)
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}
