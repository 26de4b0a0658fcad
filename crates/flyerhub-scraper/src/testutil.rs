//! In-memory [`BrowserSession`] for tests: serves canned HTML per URL,
//! replays a scripted sequence of document heights, and can be told to
//! fail navigation for URLs matching a substring (to exercise per-store
//! fault isolation).

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};

use crate::session::{BrowserSession, SessionError};

pub(crate) struct FixtureSession {
    pages: HashMap<String, String>,
    /// Served for any URL not in `pages`; `None` means an empty document.
    fallback: Option<String>,
    fail_for: Option<String>,
    current: Mutex<String>,
    heights: Mutex<Vec<i64>>,
    scroll_count: AtomicUsize,
}

impl FixtureSession {
    pub(crate) fn new() -> Self {
        Self {
            pages: HashMap::new(),
            fallback: None,
            fail_for: None,
            current: Mutex::new(String::from("<html><body></body></html>")),
            heights: Mutex::new(Vec::new()),
            scroll_count: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_owned(), html.to_owned());
        self
    }

    /// HTML served for every URL without an explicit page. Used to model a
    /// source that never signals pagination termination.
    pub(crate) fn with_fallback(mut self, html: &str) -> Self {
        self.fallback = Some(html.to_owned());
        self
    }

    /// Fail navigation for any URL containing `needle`.
    pub(crate) fn failing_for(mut self, needle: &str) -> Self {
        self.fail_for = Some(needle.to_owned());
        self
    }

    /// Height sequence returned by successive `document_height` calls; the
    /// last value repeats once the script is exhausted.
    pub(crate) fn with_heights(mut self, mut heights: Vec<i64>) -> Self {
        heights.reverse(); // consumed by pop()
        self.heights = Mutex::new(heights);
        self
    }

    pub(crate) fn scrolls(&self) -> usize {
        self.scroll_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrowserSession for FixtureSession {
    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        if let Some(needle) = &self.fail_for {
            if url.contains(needle.as_str()) {
                return Err(SessionError::Unavailable(format!(
                    "injected navigation failure for {url}"
                )));
            }
        }
        let html = self
            .pages
            .get(url)
            .or(self.fallback.as_ref())
            .cloned()
            .unwrap_or_else(|| String::from("<html><body></body></html>"));
        *self.current.lock().unwrap() = html;
        Ok(())
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<bool, SessionError> {
        let selector = Selector::parse(selector)
            .map_err(|e| SessionError::Script(format!("bad selector: {e}")))?;
        let html = self.current.lock().unwrap().clone();
        Ok(Html::parse_document(&html).select(&selector).next().is_some())
    }

    async fn document_height(&self) -> Result<i64, SessionError> {
        let mut heights = self.heights.lock().unwrap();
        match heights.len() {
            0 => Ok(1000),
            1 => Ok(heights[0]),
            _ => Ok(heights.pop().unwrap()),
        }
    }

    async fn scroll_to_bottom(&self) -> Result<(), SessionError> {
        self.scroll_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn content(&self) -> Result<String, SessionError> {
        Ok(self.current.lock().unwrap().clone())
    }
}
