//! Full-update orchestration.
//!
//! One Chrome instance serves all four retailers in sequence; a process-wide
//! lock serializes concurrent update requests so two runs never race over
//! the browser or the flyer file.

use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{error, info};

use flyerhub_core::{AppConfig, FlyerCollection, StoreKey};

use crate::chrome::{ChromeBrowser, LaunchOptions};
use crate::error::ScraperError;
use crate::session::BrowserSession;
use crate::stores;

static RUN_LOCK: Mutex<()> = Mutex::const_new(());

/// Runs a full update: launches Chrome, scrapes every retailer, and
/// atomically replaces the flyer file under `config.data_dir`.
///
/// Concurrent callers queue on the run lock rather than failing.
///
/// # Errors
///
/// Returns [`ScraperError`] when Chrome cannot be launched or the result
/// cannot be persisted. Individual retailer failures are logged and do not
/// fail the run.
pub async fn run_update(config: &AppConfig) -> Result<FlyerCollection, ScraperError> {
    let _guard = RUN_LOCK.lock().await;
    info!(data_dir = %config.data_dir.display(), "starting flyer update");

    let browser = ChromeBrowser::launch(&LaunchOptions {
        chrome_path: config.chrome_path.clone(),
        headless: config.headless,
    })
    .await?;

    let timeout = Duration::from_secs(config.page_timeout_secs);
    let outcome = async {
        let session = browser.new_session().await?;
        Ok::<_, ScraperError>(collect_all(&session, timeout).await)
    }
    .await;

    // The browser comes down whether or not extraction succeeded.
    browser.close().await;

    let collection = outcome?;
    collection.save_atomic(&config.data_dir)?;
    info!(total = collection.total_len(), "flyer update persisted");
    Ok(collection)
}

/// Scrapes every retailer through one shared session. A retailer failure is
/// logged and skipped; whatever it extracted before failing is kept.
pub async fn collect_all(session: &dyn BrowserSession, timeout: Duration) -> FlyerCollection {
    let mut collection = FlyerCollection::default();
    for store in StoreKey::ALL {
        let result = stores::extract_store(store, session, timeout, collection.records_mut(store)).await;
        let count = collection.records(store).len();
        match result {
            Ok(()) => info!(store = %store, count, "store extracted"),
            Err(err) => {
                error!(store = %store, error = %err, partial = count, "store extraction failed; keeping partial data");
            }
        }
    }
    collection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FixtureSession;

    const GALLERIA_PAGE: &str = r#"
        <html><body>
        <div class="item">
            <div class="item-title"><a>Kimchi 1kg</a></div>
            <div class="price-box"><span class="price">$8.99</span></div>
        </div>
        </body></html>
    "#;

    const EMPTY_PAGE: &str = "<html><body></body></html>";

    #[tokio::test(start_paused = true)]
    async fn one_failing_store_does_not_sink_the_others() {
        let session = FixtureSession::new()
            .with_page(
                "https://www.galleriasm.com/Home/prodview/dy9MFsYpCkOidpzOUKlHww",
                GALLERIA_PAGE,
            )
            .with_fallback(EMPTY_PAGE)
            .failing_for("nofrills.ca");

        let collection = collect_all(&session, Duration::from_secs(2)).await;

        assert_eq!(collection.records(StoreKey::Galleria).len(), 1);
        assert!(collection.records(StoreKey::Nofrills).is_empty());
        assert!(collection.records(StoreKey::Foodbasics).is_empty());
        assert!(collection.records(StoreKey::TntSupermarket).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn identical_fixtures_yield_identical_collections() {
        let build = || {
            FixtureSession::new()
                .with_page(
                    "https://www.galleriasm.com/Home/prodview/dy9MFsYpCkOidpzOUKlHww",
                    GALLERIA_PAGE,
                )
                .with_fallback(EMPTY_PAGE)
        };

        let first = collect_all(&build(), Duration::from_secs(2)).await;
        let second = collect_all(&build(), Duration::from_secs(2)).await;
        assert_eq!(first, second);
        assert_eq!(first.records(StoreKey::Galleria)[0].name.as_deref(), Some("Kimchi 1kg"));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_pages_everywhere_yield_an_empty_collection() {
        let session = FixtureSession::new().with_fallback(EMPTY_PAGE);
        let collection = collect_all(&session, Duration::from_secs(2)).await;
        assert_eq!(collection.total_len(), 0);
    }
}
