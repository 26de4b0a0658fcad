//! Browser session abstraction consumed by the page fetcher and extractors.
//!
//! The trait is the seam between the scraping logic and chromiumoxide:
//! extractors, pagination loops, and the aggregation runner are written
//! against `dyn BrowserSession` so they can be exercised with in-memory
//! fixture sessions. The production implementation is
//! [`crate::chrome::ChromeSession`].

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Driver-level session failures.
///
/// These abort the current extractor (the runner keeps its partial output);
/// they are never produced for a page that merely failed to render content
/// in time; that case is the soft [`crate::fetch::PageLoad::TimedOut`].
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("browser protocol error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),

    #[error("script evaluation failed: {0}")]
    Script(String),

    #[error("browser session unavailable: {0}")]
    Unavailable(String),
}

/// One exclusively-owned browser tab.
///
/// The aggregation runner owns the session for the whole run and hands it
/// to each extractor by reference; extractors must not retain it beyond
/// their own call.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Navigates the tab to `url`.
    async fn navigate(&self, url: &str) -> Result<(), SessionError>;

    /// Blocks until `selector` matches an element in the rendered page or
    /// `timeout` elapses. Returns `Ok(false)` on timeout, a soft signal
    /// ("page likely has no content"), never an error.
    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, SessionError>;

    /// Current `document.body.scrollHeight`.
    async fn document_height(&self) -> Result<i64, SessionError>;

    /// Scrolls to the bottom of the document to trigger lazy loading.
    async fn scroll_to_bottom(&self) -> Result<(), SessionError>;

    /// Snapshot of the rendered page markup.
    async fn content(&self) -> Result<String, SessionError>;
}
