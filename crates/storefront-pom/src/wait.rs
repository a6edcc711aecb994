//! Condition-wait engine.
//!
//! [`WaitEngine::until`] polls a [`Condition`] against the session at a fixed
//! interval until it holds or the deadline passes. Lookups that fail because
//! the page has not caught up yet (element missing, stale handle, no alert)
//! are retried; every other error ends the wait immediately.
//!
//! Waits sleep with `tokio::time::sleep`, so only the calling task is
//! suspended.

use std::fmt;
use std::time::{Duration, Instant};

use crate::config::Properties;
use crate::driver::{Alert, ElementRef, ReadyState, SessionRef};
use crate::locator::Selector;
use crate::result::{PomError, PomResult};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default polling interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Short timeout used by presence probes
pub const DEFAULT_PRESENCE_TIMEOUT: Duration = Duration::from_secs(2);

// =============================================================================
// CONDITIONS
// =============================================================================

/// Predicate over the current page state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Element exists and is displayed
    ElementVisible(Selector),
    /// Element is displayed and enabled
    ElementClickable(Selector),
    /// Element exists in the document
    ElementPresent(Selector),
    /// Element attribute contains a substring
    AttributeContains {
        /// Element selector
        selector: Selector,
        /// Attribute name
        attribute: String,
        /// Expected substring
        substring: String,
    },
    /// `document.readyState == "complete"`
    PageReady,
    /// A JavaScript dialog is open
    AlertPresent,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ElementVisible(s) => write!(f, "element visible: {s}"),
            Self::ElementClickable(s) => write!(f, "element clickable: {s}"),
            Self::ElementPresent(s) => write!(f, "element present: {s}"),
            Self::AttributeContains {
                selector,
                attribute,
                substring,
            } => write!(f, "attribute '{attribute}' of {selector} to contain {substring:?}"),
            Self::PageReady => f.write_str("page ready"),
            Self::AlertPresent => f.write_str("alert present"),
        }
    }
}

/// What a satisfied condition produced
#[derive(Debug, Clone)]
pub enum Satisfied {
    /// Element that satisfied a visibility, clickability or presence check
    Element(ElementRef),
    /// Open dialog
    Alert(Alert),
    /// Page finished loading
    Ready,
    /// Attribute value that contained the substring
    Attribute(String),
}

impl Satisfied {
    /// Element result
    pub fn into_element(self) -> PomResult<ElementRef> {
        match self {
            Self::Element(el) => Ok(el),
            other => Err(PomError::driver(format!(
                "condition produced {other:?}, expected an element"
            ))),
        }
    }

    /// Alert result
    pub fn into_alert(self) -> PomResult<Alert> {
        match self {
            Self::Alert(alert) => Ok(alert),
            other => Err(PomError::driver(format!(
                "condition produced {other:?}, expected an alert"
            ))),
        }
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// Polls conditions against one browser session
#[derive(Debug, Clone)]
pub struct WaitEngine {
    session: SessionRef,
    default_timeout: Duration,
    poll_interval: Duration,
}

impl WaitEngine {
    /// Create an engine with an explicit default timeout
    #[must_use]
    pub fn new(session: SessionRef, default_timeout: Duration) -> Self {
        Self {
            session,
            default_timeout,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Create an engine whose default timeout comes from `defaultTimeout`
    #[must_use]
    pub fn from_properties(session: SessionRef, props: &Properties) -> Self {
        Self::new(session, props.default_timeout())
    }

    /// Set polling interval
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Same settings, different session
    #[must_use]
    pub fn with_session(&self, session: SessionRef) -> Self {
        Self {
            session,
            ..self.clone()
        }
    }

    /// Timeout used when a call passes `None`
    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Polling interval
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Session the engine polls
    #[must_use]
    pub fn session(&self) -> &SessionRef {
        &self.session
    }

    /// Block until `condition` holds or the timeout elapses.
    ///
    /// The condition is always evaluated at least once. The final check runs
    /// at the deadline, so a timeout is reported no later than one poll
    /// interval after it.
    pub async fn until(
        &self,
        condition: &Condition,
        timeout: Option<Duration>,
    ) -> PomResult<Satisfied> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        let start = Instant::now();
        let mut last_error: Option<String> = None;
        let mut polls: u32 = 0;

        loop {
            polls += 1;
            match self.evaluate(condition).await {
                Ok(Some(satisfied)) => {
                    tracing::debug!(
                        %condition,
                        polls,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "condition satisfied"
                    );
                    return Ok(satisfied);
                }
                Ok(None) => {}
                Err(e) if e.is_transient() => {
                    tracing::trace!(%condition, error = %e, "transient failure while polling");
                    last_error = Some(e.to_string());
                }
                Err(e) => return Err(e),
            }

            let elapsed = start.elapsed();
            if elapsed >= timeout {
                tracing::debug!(%condition, polls, ?elapsed, "condition timed out");
                return Err(PomError::WaitTimeout {
                    condition: condition.to_string(),
                    elapsed,
                    last_error,
                });
            }
            tokio::time::sleep(self.poll_interval.min(timeout - elapsed)).await;
        }
    }

    async fn evaluate(&self, condition: &Condition) -> PomResult<Option<Satisfied>> {
        match condition {
            Condition::ElementVisible(selector) => {
                let el = self.session.find_element(selector).await?;
                let shown = el.is_displayed().await?;
                Ok(shown.then_some(Satisfied::Element(el)))
            }
            Condition::ElementClickable(selector) => {
                let el = self.session.find_element(selector).await?;
                let ready = el.is_displayed().await? && el.is_enabled().await?;
                Ok(ready.then_some(Satisfied::Element(el)))
            }
            Condition::ElementPresent(selector) => {
                let el = self.session.find_element(selector).await?;
                Ok(Some(Satisfied::Element(el)))
            }
            Condition::AttributeContains {
                selector,
                attribute,
                substring,
            } => {
                let el = self.session.find_element(selector).await?;
                Ok(el
                    .attribute(attribute)
                    .await?
                    .filter(|v| v.contains(substring.as_str()))
                    .map(Satisfied::Attribute))
            }
            Condition::PageReady => {
                let state = self.session.ready_state().await?;
                Ok((state == ReadyState::Complete).then_some(Satisfied::Ready))
            }
            Condition::AlertPresent => {
                let alert = self.session.alert().await?;
                Ok(Some(Satisfied::Alert(alert)))
            }
        }
    }

    // =========================================================================
    // TYPED HELPERS
    // =========================================================================

    /// Wait for a displayed element
    pub async fn visible(
        &self,
        selector: &Selector,
        timeout: Option<Duration>,
    ) -> PomResult<ElementRef> {
        self.until(&Condition::ElementVisible(selector.clone()), timeout)
            .await?
            .into_element()
    }

    /// Wait for a displayed, enabled element
    pub async fn clickable(
        &self,
        selector: &Selector,
        timeout: Option<Duration>,
    ) -> PomResult<ElementRef> {
        self.until(&Condition::ElementClickable(selector.clone()), timeout)
            .await?
            .into_element()
    }

    /// Wait for an element to exist
    pub async fn present(
        &self,
        selector: &Selector,
        timeout: Option<Duration>,
    ) -> PomResult<ElementRef> {
        self.until(&Condition::ElementPresent(selector.clone()), timeout)
            .await?
            .into_element()
    }

    /// Wait for an attribute to contain `substring`; returns the full value
    pub async fn attribute_contains(
        &self,
        selector: &Selector,
        attribute: &str,
        substring: &str,
        timeout: Option<Duration>,
    ) -> PomResult<String> {
        let condition = Condition::AttributeContains {
            selector: selector.clone(),
            attribute: attribute.to_string(),
            substring: substring.to_string(),
        };
        match self.until(&condition, timeout).await? {
            Satisfied::Attribute(value) => Ok(value),
            other => Err(PomError::driver(format!(
                "condition produced {other:?}, expected an attribute value"
            ))),
        }
    }

    /// Wait for the document to finish loading
    pub async fn page_ready(&self, timeout: Option<Duration>) -> PomResult<()> {
        self.until(&Condition::PageReady, timeout).await.map(|_| ())
    }

    /// Wait for a JavaScript dialog
    pub async fn alert(&self, timeout: Option<Duration>) -> PomResult<Alert> {
        self.until(&Condition::AlertPresent, timeout)
            .await?
            .into_alert()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::keys;
    use crate::driver::{BrowserSession, ElementHandle};
    use crate::simulation::{SimulatedStorefront, INVENTORY_URL, LOGIN_URL};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn username() -> Selector {
        Selector::css("*[data-test='username']")
    }

    async fn login_page(delay: Duration) -> Arc<SimulatedStorefront> {
        let store = Arc::new(SimulatedStorefront::new().with_render_delay(delay));
        store.navigate(LOGIN_URL).await.unwrap();
        store
    }

    /// Session whose first `stale_polls` handles go stale before they can
    /// be inspected, as when a page re-renders under the wait
    #[derive(Debug)]
    struct RerenderingSession {
        stale_polls: u32,
        finds: AtomicU32,
    }

    impl RerenderingSession {
        fn new(stale_polls: u32) -> Self {
            Self {
                stale_polls,
                finds: AtomicU32::new(0),
            }
        }

        fn finds(&self) -> u32 {
            self.finds.load(Ordering::SeqCst)
        }
    }

    #[derive(Debug)]
    struct RerenderedElement {
        stale: bool,
    }

    impl RerenderedElement {
        fn check(&self) -> PomResult<()> {
            if self.stale {
                Err(PomError::stale("element detached by re-render"))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl ElementHandle for RerenderedElement {
        async fn click(&self) -> PomResult<()> {
            self.check()
        }

        async fn send_keys(&self, _text: &str) -> PomResult<()> {
            self.check()
        }

        async fn clear(&self) -> PomResult<()> {
            self.check()
        }

        async fn text(&self) -> PomResult<String> {
            self.check().map(|()| String::new())
        }

        async fn is_displayed(&self) -> PomResult<bool> {
            self.check().map(|()| true)
        }

        async fn is_enabled(&self) -> PomResult<bool> {
            self.check().map(|()| true)
        }

        async fn attribute(&self, _name: &str) -> PomResult<Option<String>> {
            self.check().map(|()| None)
        }
    }

    #[async_trait]
    impl BrowserSession for RerenderingSession {
        async fn navigate(&self, _url: &str) -> PomResult<()> {
            Ok(())
        }

        async fn find_element(&self, _selector: &Selector) -> PomResult<ElementRef> {
            let n = self.finds.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Arc::new(RerenderedElement {
                stale: n <= self.stale_polls,
            }))
        }

        async fn ready_state(&self) -> PomResult<ReadyState> {
            Ok(ReadyState::Complete)
        }

        async fn alert(&self) -> PomResult<Alert> {
            Err(PomError::NoAlert)
        }

        async fn accept_alert(&self) -> PomResult<()> {
            Err(PomError::NoAlert)
        }

        async fn dismiss_alert(&self) -> PomResult<()> {
            Err(PomError::NoAlert)
        }

        async fn current_url(&self) -> PomResult<String> {
            Ok("about:blank".to_string())
        }

        async fn go_back(&self) -> PomResult<()> {
            Ok(())
        }

        async fn go_forward(&self) -> PomResult<()> {
            Ok(())
        }

        async fn refresh(&self) -> PomResult<()> {
            Ok(())
        }

        async fn screenshot(&self) -> PomResult<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    mod until_tests {
        use super::*;

        #[tokio::test]
        async fn test_stale_handles_are_retried() {
            let session = Arc::new(RerenderingSession::new(3));
            let engine = WaitEngine::new(session.clone(), Duration::from_secs(2))
                .with_poll_interval(Duration::from_millis(5));

            let el = engine.visible(&username(), None).await.unwrap();
            assert!(el.is_displayed().await.unwrap());
            assert!(session.finds() > 3);
        }

        #[tokio::test]
        async fn test_stale_until_deadline_reports_last_error() {
            let session = Arc::new(RerenderingSession::new(u32::MAX));
            let engine = WaitEngine::new(session, Duration::from_millis(60))
                .with_poll_interval(Duration::from_millis(5));

            match engine.clickable(&username(), None).await.unwrap_err() {
                PomError::WaitTimeout { last_error, .. } => {
                    assert!(last_error.unwrap().contains("re-render"));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_returns_once_condition_holds() {
            let store = login_page(Duration::from_millis(150)).await;
            let engine = WaitEngine::new(store, Duration::from_secs(2))
                .with_poll_interval(Duration::from_millis(10));

            let start = Instant::now();
            let el = engine.visible(&username(), None).await.unwrap();
            let elapsed = start.elapsed();

            assert!(elapsed >= Duration::from_millis(150));
            assert!(elapsed < Duration::from_secs(2));
            assert!(el.is_displayed().await.unwrap());
        }

        #[tokio::test]
        async fn test_times_out_within_one_poll_interval() {
            let store = login_page(Duration::ZERO).await;
            let poll = Duration::from_millis(20);
            let timeout = Duration::from_millis(200);
            let engine = WaitEngine::new(store, Duration::from_secs(10)).with_poll_interval(poll);

            let start = Instant::now();
            let err = engine
                .visible(&Selector::css("*[data-test='missing']"), Some(timeout))
                .await
                .unwrap_err();
            let elapsed = start.elapsed();

            assert!(err.is_timeout());
            assert!(elapsed >= timeout);
            // generous slack for scheduler jitter on loaded CI machines
            assert!(elapsed < timeout + poll + Duration::from_millis(150));
            match err {
                PomError::WaitTimeout { last_error, .. } => {
                    assert!(last_error.unwrap().contains("Element not found"));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_explicit_timeout_overrides_default() {
            let store = login_page(Duration::ZERO).await;
            let engine = WaitEngine::new(store, Duration::from_secs(30));
            let start = Instant::now();
            let err = engine
                .present(&Selector::Id("nope".into()), Some(Duration::from_millis(60)))
                .await
                .unwrap_err();
            assert!(err.is_timeout());
            assert!(start.elapsed() < Duration::from_secs(5));
        }

        #[tokio::test]
        async fn test_non_transient_error_propagates_immediately() {
            let store = login_page(Duration::ZERO).await;
            store.close().await.unwrap();
            let engine = WaitEngine::new(store, Duration::from_secs(5));

            let start = Instant::now();
            let err = engine.visible(&username(), None).await.unwrap_err();
            assert!(matches!(err, PomError::Driver { .. }));
            assert!(start.elapsed() < Duration::from_secs(1));
        }

        #[tokio::test]
        async fn test_default_timeout_from_properties() {
            let store = login_page(Duration::ZERO).await;
            let props = Properties::new().with(keys::DEFAULT_TIMEOUT, "7");
            let engine = WaitEngine::from_properties(store, &props);
            assert_eq!(engine.default_timeout(), Duration::from_secs(7));
            assert_eq!(engine.poll_interval(), DEFAULT_POLL_INTERVAL);
        }
    }

    mod helper_tests {
        use super::*;

        #[tokio::test]
        async fn test_page_ready_waits_for_load() {
            let store = login_page(Duration::from_millis(80)).await;
            assert_eq!(store.ready_state().await.unwrap(), ReadyState::Loading);
            let engine = WaitEngine::new(store.clone(), Duration::from_secs(2))
                .with_poll_interval(Duration::from_millis(10));
            engine.page_ready(None).await.unwrap();
            assert_eq!(store.ready_state().await.unwrap(), ReadyState::Complete);
        }

        #[tokio::test]
        async fn test_alert_appears_later() {
            let store = login_page(Duration::ZERO).await;
            let engine = WaitEngine::new(store.clone(), Duration::from_secs(2))
                .with_poll_interval(Duration::from_millis(10));

            let trigger = store.clone();
            let handle = tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                trigger.trigger_alert("Session expiring");
            });

            let alert = engine.alert(None).await.unwrap();
            handle.await.unwrap();
            assert_eq!(alert.text, "Session expiring");
        }

        #[tokio::test]
        async fn test_alert_timeout() {
            let store = login_page(Duration::ZERO).await;
            let engine = WaitEngine::new(store, Duration::from_millis(50))
                .with_poll_interval(Duration::from_millis(10));
            let err = engine.alert(None).await.unwrap_err();
            assert!(err.is_timeout());
        }

        #[tokio::test]
        async fn test_clickable_requires_enabled() {
            let store = login_page(Duration::ZERO).await;
            store.set_disabled("login-button", true);
            let engine = WaitEngine::new(store.clone(), Duration::from_millis(80))
                .with_poll_interval(Duration::from_millis(10));
            let button = Selector::css("*[data-test='login-button']");

            assert!(engine.clickable(&button, None).await.unwrap_err().is_timeout());
            // still visible while disabled
            assert!(engine.visible(&button, None).await.is_ok());

            store.set_disabled("login-button", false);
            assert!(engine.clickable(&button, None).await.is_ok());
        }

        #[tokio::test]
        async fn test_attribute_contains() {
            let store = login_page(Duration::ZERO).await;
            let engine = WaitEngine::new(store, Duration::from_millis(100))
                .with_poll_interval(Duration::from_millis(10));
            let field = engine.visible(&username(), None).await.unwrap();
            field.send_keys("standard_user").await.unwrap();

            let value = engine
                .attribute_contains(&username(), "value", "standard", None)
                .await
                .unwrap();
            assert_eq!(value, "standard_user");

            let err = engine
                .attribute_contains(&username(), "value", "locked", None)
                .await
                .unwrap_err();
            assert!(err.is_timeout());
        }

        #[tokio::test]
        async fn test_with_session_keeps_settings() {
            let first = login_page(Duration::ZERO).await;
            let engine = WaitEngine::new(first, Duration::from_secs(3))
                .with_poll_interval(Duration::from_millis(25));
            let second = Arc::new(SimulatedStorefront::new());
            second.navigate(INVENTORY_URL).await.unwrap();
            let copy = engine.with_session(second);
            assert_eq!(copy.default_timeout(), Duration::from_secs(3));
            assert_eq!(copy.poll_interval(), Duration::from_millis(25));
        }
    }
}
