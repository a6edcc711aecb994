//! Chromium session over the DevTools protocol.
//!
//! Only compiled with the `browser` feature. Edge is Chromium based, so
//! both browser kinds launch through chromiumoxide; an executable path
//! from the session config picks the binary.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams, EventJavascriptDialogClosed,
    EventJavascriptDialogOpening, HandleJavaScriptDialogParams,
};
use chromiumoxide::element::Element as CdpElement;
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::driver::{
    Alert, BrowserKind, BrowserSession, ElementHandle, ElementRef, ReadyState, SessionConfig,
};
use crate::locator::{Query, Selector};
use crate::result::{PomError, PomResult};

const CLEAR_JS: &str = "function() { \
    this.value = ''; \
    this.dispatchEvent(new Event('input', { bubbles: true })); \
    this.dispatchEvent(new Event('change', { bubbles: true })); }";

const DISPLAYED_JS: &str = "function() { \
    const s = window.getComputedStyle(this); \
    const r = this.getBoundingClientRect(); \
    return s.display !== 'none' && s.visibility !== 'hidden' && r.width > 0 && r.height > 0; }";

const ENABLED_JS: &str = "function() { return !this.disabled; }";

const VALUE_JS: &str = "function() { return this.value; }";

/// Browser session driving a real Chromium page
pub struct CdpSession {
    config: SessionConfig,
    browser: Mutex<Option<CdpBrowser>>,
    page: CdpPage,
    dialog: Arc<Mutex<Option<Alert>>>,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl fmt::Debug for CdpSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CdpSession")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CdpSession {
    /// Launch a browser and open a blank page
    ///
    /// # Errors
    ///
    /// Returns error if the browser cannot be launched
    pub async fn launch(config: &SessionConfig) -> PomResult<Self> {
        let mut builder = CdpConfig::builder().no_sandbox();
        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(ref path) = config.executable_path {
            builder = builder.chrome_executable(path);
        } else if config.browser == BrowserKind::Edge {
            tracing::warn!("no edge executable configured; using the detected chromium");
        }

        let cdp_config = builder
            .build()
            .map_err(|e| PomError::BrowserLaunch {
                message: e.to_string(),
            })?;

        let (browser, mut handler) =
            CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| PomError::BrowserLaunch {
                    message: e.to_string(),
                })?;

        let mut handles = vec![tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        })];

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| PomError::BrowserLaunch {
                message: e.to_string(),
            })?;

        let dialog = Arc::new(Mutex::new(None));
        let mut opened = page
            .event_listener::<EventJavascriptDialogOpening>()
            .await
            .map_err(cdp_error)?;
        let mut closed = page
            .event_listener::<EventJavascriptDialogClosed>()
            .await
            .map_err(cdp_error)?;

        let slot = Arc::clone(&dialog);
        handles.push(tokio::spawn(async move {
            while let Some(event) = opened.next().await {
                tracing::debug!(message = %event.message, "dialog opened");
                *slot.lock().await = Some(Alert::new(event.message.clone()));
            }
        }));
        let slot = Arc::clone(&dialog);
        handles.push(tokio::spawn(async move {
            while closed.next().await.is_some() {
                *slot.lock().await = None;
            }
        }));

        tracing::info!(headless = config.headless, browser = ?config.browser, "browser launched");
        Ok(Self {
            config: config.clone(),
            browser: Mutex::new(Some(browser)),
            page,
            dialog,
            handles,
        })
    }

    /// Launch configuration
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    async fn handle_dialog(&self, accept: bool) -> PomResult<()> {
        if self.dialog.lock().await.is_none() {
            return Err(PomError::NoAlert);
        }
        self.page
            .execute(HandleJavaScriptDialogParams::new(accept))
            .await
            .map_err(cdp_error)?;
        *self.dialog.lock().await = None;
        Ok(())
    }

    async fn run_script(&self, script: &str) -> PomResult<()> {
        self.page.evaluate(script).await.map_err(cdp_error)?;
        Ok(())
    }
}

impl Drop for CdpSession {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

fn cdp_error(e: chromiumoxide::error::CdpError) -> PomError {
    PomError::driver(e.to_string())
}

// Node ids die with their document; surface those as stale handles.
fn element_error(e: chromiumoxide::error::CdpError) -> PomError {
    let message = e.to_string();
    if message.contains("node") || message.contains("Node") {
        PomError::stale(message)
    } else {
        PomError::driver(message)
    }
}

// An empty match comes back as a missing node or an empty search; anything
// else (closed target, dropped socket) is a real driver failure.
fn lookup_error(selector: &Selector, e: chromiumoxide::error::CdpError) -> PomError {
    let message = e.to_string();
    let lower = message.to_ascii_lowercase();
    if lower.contains("node") || lower.contains("not found") || lower.contains("search result") {
        PomError::ElementNotFound {
            selector: selector.to_string(),
        }
    } else {
        PomError::driver(message)
    }
}

#[async_trait]
impl BrowserSession for CdpSession {
    async fn navigate(&self, url: &str) -> PomResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| PomError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn find_element(&self, selector: &Selector) -> PomResult<ElementRef> {
        let found = match selector.query() {
            Query::Css(css) => self.page.find_element(css).await,
            Query::XPath(xpath) => self.page.find_xpath(xpath).await,
        };
        let element = found.map_err(|e| lookup_error(selector, e))?;
        Ok(Arc::new(CdpHandle { element }))
    }

    async fn ready_state(&self) -> PomResult<ReadyState> {
        let state: String = self
            .page
            .evaluate("document.readyState")
            .await
            .map_err(cdp_error)?
            .into_value()
            .map_err(|e| PomError::driver(e.to_string()))?;
        state.parse()
    }

    async fn alert(&self) -> PomResult<Alert> {
        self.dialog.lock().await.clone().ok_or(PomError::NoAlert)
    }

    async fn accept_alert(&self) -> PomResult<()> {
        self.handle_dialog(true).await
    }

    async fn dismiss_alert(&self) -> PomResult<()> {
        self.handle_dialog(false).await
    }

    async fn current_url(&self) -> PomResult<String> {
        Ok(self.page.url().await.map_err(cdp_error)?.unwrap_or_default())
    }

    async fn go_back(&self) -> PomResult<()> {
        self.run_script("history.back()").await
    }

    async fn go_forward(&self) -> PomResult<()> {
        self.run_script("history.forward()").await
    }

    async fn refresh(&self) -> PomResult<()> {
        self.page.reload().await.map_err(cdp_error)?;
        Ok(())
    }

    async fn screenshot(&self) -> PomResult<Vec<u8>> {
        use base64::Engine;

        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let screenshot = self.page.execute(params).await.map_err(cdp_error)?;
        base64::engine::general_purpose::STANDARD
            .decode(&screenshot.data)
            .map_err(|e| PomError::driver(e.to_string()))
    }

    async fn close(&self) -> PomResult<()> {
        let Some(mut browser) = self.browser.lock().await.take() else {
            return Ok(());
        };
        browser
            .close()
            .await
            .map_err(|e| PomError::driver(e.to_string()))?;
        tracing::info!("browser closed");
        Ok(())
    }
}

// =============================================================================
// ELEMENT
// =============================================================================

struct CdpHandle {
    element: CdpElement,
}

impl fmt::Debug for CdpHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CdpHandle").finish_non_exhaustive()
    }
}

impl CdpHandle {
    async fn call(&self, function: &str) -> PomResult<Option<serde_json::Value>> {
        let returns = self
            .element
            .call_js_fn(function, false)
            .await
            .map_err(element_error)?;
        Ok(returns.result.value)
    }

    async fn call_bool(&self, function: &str) -> PomResult<bool> {
        Ok(self
            .call(function)
            .await?
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }
}

#[async_trait]
impl ElementHandle for CdpHandle {
    async fn click(&self) -> PomResult<()> {
        self.element.click().await.map_err(element_error)?;
        Ok(())
    }

    async fn send_keys(&self, text: &str) -> PomResult<()> {
        self.element.focus().await.map_err(element_error)?;
        self.element.type_str(text).await.map_err(element_error)?;
        Ok(())
    }

    async fn clear(&self) -> PomResult<()> {
        self.call(CLEAR_JS).await.map(|_| ())
    }

    async fn text(&self) -> PomResult<String> {
        Ok(self
            .element
            .inner_text()
            .await
            .map_err(element_error)?
            .unwrap_or_default())
    }

    async fn is_displayed(&self) -> PomResult<bool> {
        self.call_bool(DISPLAYED_JS).await
    }

    async fn is_enabled(&self) -> PomResult<bool> {
        self.call_bool(ENABLED_JS).await
    }

    async fn attribute(&self, name: &str) -> PomResult<Option<String>> {
        if name == "value" {
            return Ok(self
                .call(VALUE_JS)
                .await?
                .and_then(|v| v.as_str().map(str::to_string)));
        }
        self.element.attribute(name).await.map_err(element_error)
    }
}
