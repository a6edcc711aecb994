//! Page-object base layer.
//!
//! A page object owns a [`PageContext`]: its page's locator set, a wait engine
//! and, through the engine, the shared browser session. The context turns an
//! element key into a waited-for interaction (`lookup → resolve → wait →
//! act`). Concrete pages only pick keys and format values.
//!
//! ```ignore
//! let waits = WaitEngine::from_properties(session, &props);
//! let factory = PageFactory::new(Arc::new(LocatorRegistry::builtin()), waits);
//! let login: LoginPage = factory.create()?;
//! login.login("standard_user", "secret_sauce").await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::driver::{ElementRef, SessionRef};
use crate::locator::{resolve, Selector};
use crate::registry::{LocatorRegistry, PageLocatorSet};
use crate::result::{PomError, PomResult};
use crate::wait::{WaitEngine, DEFAULT_PRESENCE_TIMEOUT};

// =============================================================================
// PAGE OBJECT TRAIT
// =============================================================================

/// A page or component of the storefront
pub trait PageObject {
    /// Locator file name
    const NAME: &'static str;

    /// URL path pattern (`/cart.html`, `/items/*`)
    const URL_PATTERN: &'static str;

    /// Wrap a loaded context
    fn from_context(context: PageContext) -> Self
    where
        Self: Sized;

    /// Underlying context
    fn context(&self) -> &PageContext;
}

// =============================================================================
// PAGE CONTEXT
// =============================================================================

/// Locators plus waits for one page
#[derive(Debug, Clone)]
pub struct PageContext {
    locators: Arc<PageLocatorSet>,
    waits: WaitEngine,
    url: Option<UrlMatcher>,
    presence_timeout: Duration,
}

impl PageContext {
    /// Create a context from an already loaded locator set
    #[must_use]
    pub fn new(locators: Arc<PageLocatorSet>, waits: WaitEngine) -> Self {
        Self {
            locators,
            waits,
            url: None,
            presence_timeout: DEFAULT_PRESENCE_TIMEOUT,
        }
    }

    /// Load `page` from the registry; fails on any locator problem
    pub fn load(registry: &LocatorRegistry, page: &str, waits: WaitEngine) -> PomResult<Self> {
        Ok(Self::new(registry.load(page)?, waits))
    }

    /// Set the URL pattern used by [`Self::is_current`]
    #[must_use]
    pub fn with_url_pattern(mut self, pattern: &str) -> Self {
        self.url = Some(UrlMatcher::new(pattern));
        self
    }

    /// Set the timeout used by presence probes
    #[must_use]
    pub const fn with_presence_timeout(mut self, timeout: Duration) -> Self {
        self.presence_timeout = timeout;
        self
    }

    /// Page name
    #[must_use]
    pub fn page_name(&self) -> &str {
        self.locators.page()
    }

    /// Locator set
    #[must_use]
    pub fn locators(&self) -> &Arc<PageLocatorSet> {
        &self.locators
    }

    /// Wait engine
    #[must_use]
    pub fn waits(&self) -> &WaitEngine {
        &self.waits
    }

    /// Browser session
    #[must_use]
    pub fn session(&self) -> &SessionRef {
        self.waits.session()
    }

    /// Resolve `key` to a selector
    pub fn selector(&self, key: &str) -> PomResult<Selector> {
        Ok(resolve(self.locators.lookup(key)?))
    }

    /// Resolve `key` after substituting its `{name}` placeholder
    pub fn bound_selector(&self, key: &str, name: &str, value: &str) -> PomResult<Selector> {
        Ok(resolve(&self.locators.lookup(key)?.bind(name, value)))
    }

    fn interaction<'a>(
        &'a self,
        key: &'a str,
        action: &'static str,
    ) -> impl FnOnce(PomError) -> PomError + 'a {
        move |source| PomError::Interaction {
            page: self.page_name().to_string(),
            key: key.to_string(),
            action,
            source: Box::new(source),
        }
    }

    // =========================================================================
    // PRIMITIVES
    // =========================================================================

    /// Wait until clickable, then click
    pub async fn click(&self, key: &str) -> PomResult<()> {
        let selector = self.selector(key)?;
        self.click_selector(key, &selector).await
    }

    /// [`Self::click`] on a parameterised locator
    pub async fn click_bound(&self, key: &str, name: &str, value: &str) -> PomResult<()> {
        let selector = self.bound_selector(key, name, value)?;
        self.click_selector(key, &selector).await
    }

    async fn click_selector(&self, key: &str, selector: &Selector) -> PomResult<()> {
        tracing::info!(page = self.page_name(), key, "click");
        let result: PomResult<()> = async {
            let el = self.waits.clickable(selector, None).await?;
            el.click().await
        }
        .await;
        result.map_err(self.interaction(key, "click"))
    }

    /// Wait until visible, clear, then type `text`
    pub async fn type_into(&self, key: &str, text: &str) -> PomResult<()> {
        let selector = self.selector(key)?;
        tracing::info!(page = self.page_name(), key, chars = text.len(), "type");
        let result: PomResult<()> = async {
            let el = self.waits.visible(&selector, None).await?;
            el.clear().await?;
            el.send_keys(text).await
        }
        .await;
        result.map_err(self.interaction(key, "type into"))
    }

    /// Wait until visible, then read trimmed text
    pub async fn read_text(&self, key: &str) -> PomResult<String> {
        let selector = self.selector(key)?;
        let result: PomResult<String> = async {
            let el = self.waits.visible(&selector, None).await?;
            Ok(el.text().await?.trim().to_string())
        }
        .await;
        let text = result.map_err(self.interaction(key, "read text of"))?;
        tracing::debug!(page = self.page_name(), key, text = %text, "read text");
        Ok(text)
    }

    /// Wait until visible with the default timeout
    pub async fn wait_until_visible(&self, key: &str) -> PomResult<()> {
        let selector = self.selector(key)?;
        self.wait_visible(key, &selector).await
    }

    /// [`Self::wait_until_visible`] on a parameterised locator
    pub async fn wait_until_visible_bound(
        &self,
        key: &str,
        name: &str,
        value: &str,
    ) -> PomResult<()> {
        let selector = self.bound_selector(key, name, value)?;
        self.wait_visible(key, &selector).await
    }

    async fn wait_visible(&self, key: &str, selector: &Selector) -> PomResult<()> {
        self.waits
            .visible(selector, None)
            .await
            .map(|_| ())
            .map_err(self.interaction(key, "wait for"))
    }

    /// Whether the element becomes visible within the presence timeout.
    ///
    /// Every failure, including locator problems, reads as `false`.
    pub async fn is_present(&self, key: &str) -> bool {
        let selector = match self.selector(key) {
            Ok(selector) => selector,
            Err(e) => {
                tracing::debug!(page = self.page_name(), key, error = %e, "presence probe failed");
                return false;
            }
        };
        self.probe(key, &selector).await
    }

    /// [`Self::is_present`] on a parameterised locator
    pub async fn is_present_bound(&self, key: &str, name: &str, value: &str) -> bool {
        match self.bound_selector(key, name, value) {
            Ok(selector) => self.probe(key, &selector).await,
            Err(e) => {
                tracing::debug!(page = self.page_name(), key, error = %e, "presence probe failed");
                false
            }
        }
    }

    async fn probe(&self, key: &str, selector: &Selector) -> bool {
        match self
            .waits
            .visible(selector, Some(self.presence_timeout))
            .await
        {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(page = self.page_name(), key, error = %e, "element not present");
                false
            }
        }
    }

    /// Wait until present, then read an attribute
    pub async fn read_attribute(&self, key: &str, attribute: &str) -> PomResult<Option<String>> {
        let selector = self.selector(key)?;
        let result: PomResult<Option<String>> = async {
            let el: ElementRef = self.waits.present(&selector, None).await?;
            el.attribute(attribute).await
        }
        .await;
        result.map_err(self.interaction(key, "read attribute of"))
    }

    /// Wait until `attribute` contains `needle`; returns the full value
    pub async fn wait_until_attribute_contains(
        &self,
        key: &str,
        attribute: &str,
        needle: &str,
    ) -> PomResult<String> {
        let selector = self.selector(key)?;
        self.waits
            .attribute_contains(&selector, attribute, needle, None)
            .await
            .map_err(self.interaction(key, "wait for attribute of"))
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    /// Open `url` and wait for the document to load
    pub async fn open(&self, url: &str) -> PomResult<()> {
        tracing::info!(page = self.page_name(), url, "open");
        self.session().navigate(url).await?;
        self.wait_for_page_ready().await
    }

    /// Browser back
    pub async fn navigate_back(&self) -> PomResult<()> {
        tracing::info!(page = self.page_name(), "navigate back");
        self.session().go_back().await
    }

    /// Browser forward
    pub async fn navigate_forward(&self) -> PomResult<()> {
        tracing::info!(page = self.page_name(), "navigate forward");
        self.session().go_forward().await
    }

    /// Reload the current page
    pub async fn refresh(&self) -> PomResult<()> {
        tracing::info!(page = self.page_name(), "refresh");
        self.session().refresh().await
    }

    /// Wait for `document.readyState == "complete"`
    pub async fn wait_for_page_ready(&self) -> PomResult<()> {
        self.waits.page_ready(None).await
    }

    /// Wait for a dialog and accept it; returns its text
    pub async fn accept_alert(&self) -> PomResult<String> {
        let alert = self.waits.alert(None).await?;
        self.session().accept_alert().await?;
        tracing::info!(page = self.page_name(), text = %alert.text, "accepted alert");
        Ok(alert.text)
    }

    /// Wait for a dialog and dismiss it; returns its text
    pub async fn dismiss_alert(&self) -> PomResult<String> {
        let alert = self.waits.alert(None).await?;
        self.session().dismiss_alert().await?;
        tracing::info!(page = self.page_name(), text = %alert.text, "dismissed alert");
        Ok(alert.text)
    }

    /// Whether the browser is on this page's URL
    pub async fn is_current(&self) -> PomResult<bool> {
        let Some(matcher) = &self.url else {
            return Ok(false);
        };
        let url = self.session().current_url().await?;
        Ok(matcher.matches(&url))
    }
}

// =============================================================================
// FACTORY
// =============================================================================

/// Builds page objects that share one session and one registry
#[derive(Debug, Clone)]
pub struct PageFactory {
    registry: Arc<LocatorRegistry>,
    waits: WaitEngine,
    presence_timeout: Duration,
}

impl PageFactory {
    /// Create a factory; `waits` is the template every page's engine copies
    #[must_use]
    pub fn new(registry: Arc<LocatorRegistry>, waits: WaitEngine) -> Self {
        Self {
            registry,
            waits,
            presence_timeout: DEFAULT_PRESENCE_TIMEOUT,
        }
    }

    /// Set the presence probe timeout for every page
    #[must_use]
    pub const fn with_presence_timeout(mut self, timeout: Duration) -> Self {
        self.presence_timeout = timeout;
        self
    }

    /// Session shared by every page
    #[must_use]
    pub fn session(&self) -> &SessionRef {
        self.waits.session()
    }

    /// Wait engine template
    #[must_use]
    pub fn waits(&self) -> &WaitEngine {
        &self.waits
    }

    /// Registry shared by every page
    #[must_use]
    pub fn registry(&self) -> &Arc<LocatorRegistry> {
        &self.registry
    }

    /// Construct a page, loading its locators
    pub fn create<P: PageObject>(&self) -> PomResult<P> {
        let context = PageContext::load(&self.registry, P::NAME, self.waits.clone())?
            .with_url_pattern(P::URL_PATTERN)
            .with_presence_timeout(self.presence_timeout);
        tracing::debug!(page = P::NAME, "page object created");
        Ok(P::from_context(context))
    }
}

// =============================================================================
// URL MATCHING
// =============================================================================

/// Matches the path of a URL against a pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMatcher {
    pattern: String,
    segments: Vec<UrlSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum UrlSegment {
    Literal(String),
    Wildcard,
}

impl UrlMatcher {
    /// Create a new matcher; `*` matches exactly one path segment
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = split_path(pattern)
            .map(|s| {
                if s == "*" {
                    UrlSegment::Wildcard
                } else {
                    UrlSegment::Literal(s.to_string())
                }
            })
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// Check the path of `url` (scheme, host, query and fragment ignored)
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        let url_segments: Vec<&str> = split_path(path_of(url)).collect();
        url_segments.len() == self.segments.len()
            && self
                .segments
                .iter()
                .zip(&url_segments)
                .all(|(segment, actual)| match segment {
                    UrlSegment::Literal(lit) => lit == actual,
                    UrlSegment::Wildcard => true,
                })
    }

    /// Get the original pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn path_of(url: &str) -> &str {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = if url.contains("://") {
        without_scheme
            .find('/')
            .map_or("", |i| &without_scheme[i..])
    } else {
        without_scheme
    };
    path.split(['?', '#']).next().unwrap_or_default()
}
