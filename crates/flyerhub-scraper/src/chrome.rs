//! chromiumoxide-backed browser session.
//!
//! One [`ChromeBrowser`] is launched per aggregation run and torn down on
//! every exit path. Tabs created from it implement [`BrowserSession`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::ScraperError;
use crate::session::{BrowserSession, SessionError};

/// Poll interval for the wait-for-selector loop. CDP has no native
/// "wait until selector" primitive, so readiness is polled.
const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Common Chrome executable paths to check before falling back to `$PATH`.
const CHROME_PATHS: &[&str] = &[
    // Linux
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    // macOS
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    // Common install locations
    "/opt/google/chrome/google-chrome",
];

/// Launch settings for the shared browser.
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Explicit executable; auto-discovered when `None`.
    pub chrome_path: Option<PathBuf>,
    pub headless: bool,
}

/// A launched Chromium process plus its CDP event-handler task.
pub struct ChromeBrowser {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl ChromeBrowser {
    /// Launches a Chromium instance for one aggregation run.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::ChromeNotFound`] when no executable can be
    /// located, or [`ScraperError::BrowserLaunch`] when the process fails
    /// to start.
    pub async fn launch(options: &LaunchOptions) -> Result<Self, ScraperError> {
        let chrome_path = match &options.chrome_path {
            Some(path) => path.clone(),
            None => find_chrome().ok_or(ScraperError::ChromeNotFound)?,
        };
        info!(path = %chrome_path.display(), headless = options.headless, "launching browser");

        let mut builder = BrowserConfig::builder().chrome_executable(chrome_path);
        if !options.headless {
            // with_head means NOT headless, confusingly.
            builder = builder.with_head();
        }
        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--no-sandbox")
            .arg("--disable-gpu");

        let config = builder
            .build()
            .map_err(|reason| ScraperError::BrowserLaunch { reason })?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScraperError::BrowserLaunch {
                reason: e.to_string(),
            })?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser,
            handler_task,
        })
    }

    /// Opens a fresh tab for the run.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Cdp`] when the tab cannot be created.
    pub async fn new_session(&self) -> Result<ChromeSession, SessionError> {
        let page = self.browser.new_page("about:blank").await?;
        Ok(ChromeSession { page })
    }

    /// Tears the browser down. Close failures are logged, not propagated:
    /// teardown runs on every exit path and must not mask the run's result.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!(error = %e, "browser did not close cleanly");
        }
        if let Err(e) = self.browser.wait().await {
            debug!(error = %e, "browser process wait failed");
        }
        self.handler_task.abort();
    }
}

/// A single Chromium tab.
pub struct ChromeSession {
    page: Page,
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        debug!(url, "navigating");
        self.page.goto(url).await?;
        Ok(())
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, SessionError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            // find_element resolves immediately; poll it until the deadline.
            if self.page.find_element(selector).await.is_ok() {
                return Ok(true);
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
        }
    }

    async fn document_height(&self) -> Result<i64, SessionError> {
        self.page
            .evaluate("document.body.scrollHeight")
            .await?
            .into_value::<i64>()
            .map_err(|e| SessionError::Script(e.to_string()))
    }

    async fn scroll_to_bottom(&self) -> Result<(), SessionError> {
        self.page
            .evaluate("window.scrollTo(0, document.body.scrollHeight)")
            .await?;
        Ok(())
    }

    async fn content(&self) -> Result<String, SessionError> {
        Ok(self.page.content().await?)
    }
}

/// Looks for a Chrome/Chromium executable at well-known paths, then on
/// `$PATH` via `which`.
fn find_chrome() -> Option<PathBuf> {
    for path in CHROME_PATHS {
        let p = Path::new(path);
        if p.exists() {
            debug!(path, "found Chrome executable");
            return Some(p.to_path_buf());
        }
    }

    for cmd in &["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"] {
        if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    debug!(path, "found Chrome in PATH");
                    return Some(PathBuf::from(path));
                }
            }
        }
    }

    None
}
