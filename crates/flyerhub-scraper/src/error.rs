use thiserror::Error;

use crate::session::SessionError;

/// Whole-run failures of the aggregation pipeline.
///
/// Per-store extractor failures never surface here: the runner logs them
/// and keeps the store's partial accumulator. These variants cover the
/// faults that make the run as a whole impossible: no browser, no session,
/// or an unwritable artifact.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("no Chrome/Chromium executable found; install one or set FLYERHUB_CHROME_PATH")]
    ChromeNotFound,

    #[error("failed to launch browser: {reason}")]
    BrowserLaunch { reason: String },

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Persist(#[from] flyerhub_core::FlyerStoreError),
}
