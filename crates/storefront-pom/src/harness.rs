//! Scenario results and failure capture.

use chrono::{DateTime, Local};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::driver::BrowserSession;
use crate::result::{PomError, PomResult};

/// Default screenshot directory
pub const DEFAULT_SCREENSHOT_DIR: &str = "target/screenshots";

/// Result of running a single scenario
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario name
    pub name: String,
    /// Whether the scenario passed
    pub passed: bool,
    /// Error message if failed
    pub error: Option<String>,
    /// Screenshot written on failure
    pub screenshot: Option<PathBuf>,
    /// Scenario duration
    pub duration: Duration,
}

impl ScenarioResult {
    /// Create a passing result
    #[must_use]
    pub fn pass(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            error: None,
            screenshot: None,
            duration: Duration::ZERO,
        }
    }

    /// Create a failing result
    #[must_use]
    pub fn fail(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            error: Some(error.into()),
            screenshot: None,
            duration: Duration::ZERO,
        }
    }

    /// Set duration
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Attach a screenshot path
    #[must_use]
    pub fn with_screenshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.screenshot = Some(path.into());
        self
    }
}

/// Logs failures and saves a screenshot of the browser at that moment
#[derive(Debug, Clone)]
pub struct FailureHandler {
    dir: PathBuf,
}

impl Default for FailureHandler {
    fn default() -> Self {
        Self::new(DEFAULT_SCREENSHOT_DIR)
    }
}

impl FailureHandler {
    /// Write screenshots under `dir`
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Screenshot directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<yyyyMMdd_HHmmss>_screenshot_<method>-FAILED.png`
    #[must_use]
    pub fn screenshot_path(&self, method: &str, at: DateTime<Local>) -> PathBuf {
        self.dir.join(format!(
            "{}_screenshot_{method}-FAILED.png",
            at.format("%Y%m%d_%H%M%S")
        ))
    }

    /// Log `error` and save a screenshot; returns the file written
    pub async fn on_failure(
        &self,
        method: &str,
        error: &PomError,
        session: &dyn BrowserSession,
    ) -> PomResult<PathBuf> {
        tracing::error!(method, error = %error, "scenario failed");
        let png = session.screenshot().await?;
        let path = self.screenshot_path(method, Local::now());
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, &png).await?;
        tracing::info!(path = %path.display(), bytes = png.len(), "failure screenshot saved");
        Ok(path)
    }

    /// Run `scenario`, capturing a screenshot if it fails
    pub async fn run<T, F>(
        &self,
        method: &str,
        session: &dyn BrowserSession,
        scenario: F,
    ) -> (ScenarioResult, Option<T>)
    where
        F: Future<Output = PomResult<T>>,
    {
        let start = Instant::now();
        match scenario.await {
            Ok(value) => (
                ScenarioResult::pass(method).with_duration(start.elapsed()),
                Some(value),
            ),
            Err(error) => {
                let mut result =
                    ScenarioResult::fail(method, error.to_string()).with_duration(start.elapsed());
                match self.on_failure(method, &error, session).await {
                    Ok(path) => result = result.with_screenshot(path),
                    Err(e) => tracing::warn!(error = %e, "could not capture failure screenshot"),
                }
                (result, None)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::simulation::SimulatedStorefront;

    #[test]
    fn test_screenshot_path_format() {
        let handler = FailureHandler::new("/tmp/shots");
        let at = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            handler.screenshot_path("checkoutTest", at),
            PathBuf::from("/tmp/shots/20240309_140507_screenshot_checkoutTest-FAILED.png")
        );
    }

    #[tokio::test]
    async fn test_on_failure_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let handler = FailureHandler::new(dir.path().join("screenshots"));
        let store = SimulatedStorefront::new();

        let path = handler
            .on_failure("checkout", &PomError::assertion("boom"), &store)
            .await
            .unwrap();

        assert!(path.starts_with(dir.path()));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.ends_with("_screenshot_checkout-FAILED.png"));
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
    }

    #[tokio::test]
    async fn test_run_records_pass_and_fail() {
        let dir = tempfile::tempdir().unwrap();
        let handler = FailureHandler::new(dir.path());
        let store = SimulatedStorefront::new();

        let (ok, value) = handler.run("passes", &store, async { Ok(42) }).await;
        assert!(ok.passed);
        assert_eq!(value, Some(42));
        assert!(ok.screenshot.is_none());

        let (failed, value) = handler
            .run("fails", &store, async {
                Err::<(), _>(PomError::invalid_state("nope"))
            })
            .await;
        assert!(!failed.passed);
        assert!(value.is_none());
        assert!(failed.error.unwrap().contains("nope"));
        assert!(failed.screenshot.unwrap().exists());
    }

    #[tokio::test]
    async fn test_run_survives_closed_session() {
        let dir = tempfile::tempdir().unwrap();
        let handler = FailureHandler::new(dir.path());
        let store = SimulatedStorefront::new();
        crate::driver::BrowserSession::close(&store).await.unwrap();

        let (failed, _) = handler
            .run("fails", &store, async {
                Err::<(), _>(PomError::driver("gone"))
            })
            .await;
        assert!(!failed.passed);
        assert!(failed.screenshot.is_none());
    }
}
