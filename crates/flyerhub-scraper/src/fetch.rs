//! Shared page fetcher: navigate, wait for a readiness marker, and
//! optionally scroll until lazy-loaded content settles.

use std::time::Duration;

use tracing::{debug, warn};

use crate::session::{BrowserSession, SessionError};

/// Outcome of a page fetch.
///
/// `TimedOut` means the readiness selector never appeared within the bound.
/// Callers treat it as "page likely has no content" and fall through to
/// their pagination-termination logic, not as a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLoad {
    Ready,
    TimedOut,
}

/// Navigates to `url` and blocks until `ready_selector` matches or
/// `timeout` elapses.
///
/// # Errors
///
/// Returns [`SessionError`] only for driver-level failures; a page that
/// never renders the selector yields `Ok(PageLoad::TimedOut)`.
pub async fn fetch_page(
    session: &dyn BrowserSession,
    url: &str,
    ready_selector: &str,
    timeout: Duration,
) -> Result<PageLoad, SessionError> {
    session.navigate(url).await?;
    if session.wait_for_selector(ready_selector, timeout).await? {
        Ok(PageLoad::Ready)
    } else {
        warn!(url, selector = ready_selector, "readiness selector never appeared");
        Ok(PageLoad::TimedOut)
    }
}

/// Repeatedly scrolls to the bottom of the document until its height stops
/// increasing or `max_scrolls` iterations have run.
///
/// Several target sites lazy-load product tiles on scroll; without this,
/// extraction sees only the first viewport's worth of products. `pause` is
/// how long each iteration waits for new content before re-reading the
/// height.
///
/// # Errors
///
/// Returns [`SessionError`] when the scroll script or height query fails.
pub async fn scroll_until_settled(
    session: &dyn BrowserSession,
    max_scrolls: usize,
    pause: Duration,
) -> Result<(), SessionError> {
    let mut last_height = session.document_height().await?;
    for iteration in 0..max_scrolls {
        session.scroll_to_bottom().await?;
        tokio::time::sleep(pause).await;

        let height = session.document_height().await?;
        if height <= last_height {
            debug!(iteration, height, "document height settled");
            return Ok(());
        }
        last_height = height;
    }
    debug!(max_scrolls, "scroll iteration bound reached");
    Ok(())
}
