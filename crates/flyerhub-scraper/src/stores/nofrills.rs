//! No Frills digital flyer.
//!
//! Paginated via a `?page=N` query parameter that the site keeps serving
//! past the real end of the flyer, re-rendering the final page instead of
//! returning an empty one. Extraction therefore stops on the first empty
//! page, on a page of nothing but broken tiles, or when a page repeats the
//! previous page's name set, with a hard bound of twenty pages.
//!
//! The tile markup has shipped under several class schemes; every field
//! lookup walks a fallback chain of known selectors.

use std::time::Duration;

use scraper::{Html, Selector};
use tracing::{debug, info, warn};

use flyerhub_core::{ProductRecord, StoreKey};

use crate::dom::{first_attr, first_text, resolve_url, split_price_unit, strip_marketing_token};
use crate::fetch::{fetch_page, scroll_until_settled, PageLoad};
use crate::pagination::{Decision, Paginator};
use crate::session::{BrowserSession, SessionError};

const BASE_URL: &str = "https://www.nofrills.ca/en/deals/flyer";
const TILE_SELECTOR: &str = "div[data-testid=\"product-tile\"], div.product-tile, div.css-yyn1h";
const MAX_PAGES: u32 = 20;

const MAX_SCROLLS: usize = 10;
const SCROLL_PAUSE: Duration = Duration::from_millis(500);

fn page_url(page: u32) -> String {
    if page == 1 {
        BASE_URL.to_owned()
    } else {
        format!("{BASE_URL}?page={page}")
    }
}

/// Scrapes every flyer page into `out`, walking `?page=N` until a stop
/// condition fires.
///
/// # Errors
///
/// Returns [`SessionError`] on driver-level failure.
pub async fn extract(
    session: &dyn BrowserSession,
    timeout: Duration,
    out: &mut Vec<ProductRecord>,
) -> Result<(), SessionError> {
    let mut paginator = Paginator::new(MAX_PAGES)
        .stop_when_all_invalid()
        .stop_on_duplicate_names();

    loop {
        let url = page_url(paginator.page());
        if fetch_page(session, &url, TILE_SELECTOR, timeout).await? == PageLoad::TimedOut {
            warn!(store = %StoreKey::Nofrills, url = %url, "tiles never rendered; parsing page as-is");
        }
        // Tile images and prices hydrate lazily below the fold.
        scroll_until_settled(session, MAX_SCROLLS, SCROLL_PAUSE).await?;

        let html = session.content().await?;
        let records = parse_page(&html, &url);
        debug!(store = %StoreKey::Nofrills, page = paginator.page(), count = records.len(), "page parsed");

        let decision = paginator.advance(&records);
        out.extend(records);

        match decision {
            Decision::Continue(_) => {}
            Decision::Stop(reason) => {
                info!(store = %StoreKey::Nofrills, %reason, total = out.len(), "extraction complete");
                return Ok(());
            }
        }
    }
}

/// Parses every product tile on one flyer page. `url` is recorded on each
/// record so a broken tile can be traced back to the page it came from.
pub fn parse_page(html: &str, url: &str) -> Vec<ProductRecord> {
    let document = Html::parse_document(html);
    let tile_selector = Selector::parse(TILE_SELECTOR).expect("valid selector");

    let mut records = Vec::new();
    for tile in document.select(&tile_selector) {
        let mut record = ProductRecord::new(StoreKey::Nofrills);
        record.page_url = Some(url.to_owned());

        record.name = first_text(
            tile,
            &[
                "h3[data-testid=\"product-title\"]",
                "h3.product-title",
                "div[data-testid=\"product-title\"]",
            ],
        );

        let mut unit_from_price = None;
        if let Some(raw) = first_text(
            tile,
            &[
                "span[data-testid=\"sale-price\"]",
                "span.price__value",
                "span.price-sale",
            ],
        ) {
            // Sale prices render as e.g. "sale$1.99/lb".
            let cleaned = strip_marketing_token(&raw, "sale");
            let (price, unit) = split_price_unit(&cleaned);
            record.price = price;
            unit_from_price = unit;
        }

        if let Some(raw) = first_text(
            tile,
            &[
                "span[data-testid=\"was-price\"]",
                "span.price__was",
                "span.price-was",
            ],
        ) {
            let cleaned = strip_marketing_token(&raw, "was");
            let (price, _) = split_price_unit(&cleaned);
            record.original_price = price;
        }

        record.unit = first_text(
            tile,
            &[
                "p[data-testid=\"product-package-size\"]",
                "p.product-amount",
                "div.product-size",
            ],
        )
        .or(unit_from_price);

        record.image_url = first_attr(
            tile,
            &[
                ("div[data-testid=\"product-image\"] img", "src"),
                ("div.product-image img", "src"),
                ("img.product-img", "src"),
            ],
        )
        .and_then(|src| resolve_url(&src, StoreKey::Nofrills.canonical_origin()));

        records.push(record.finalize());
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::StopReason;
    use crate::testutil::FixtureSession;

    const PAGE_ONE: &str = r#"
        <html><body>
        <div data-testid="product-tile">
            <h3 data-testid="product-title">PC Bacon 500g</h3>
            <span data-testid="sale-price">sale$4.99</span>
            <span data-testid="was-price">was$6.99</span>
            <p data-testid="product-package-size">500 g</p>
            <div data-testid="product-image"><img src="/images/bacon.jpg"></div>
        </div>
        <div data-testid="product-tile">
            <h3 data-testid="product-title">Bananas</h3>
            <span data-testid="sale-price">sale$0.69/lb</span>
        </div>
        </body></html>
    "#;

    const PAGE_TWO: &str = r#"
        <html><body>
        <div class="product-tile">
            <h3 class="product-title">Farmer's Market Eggs</h3>
            <span class="price__value">$3.49</span>
            <img class="product-img" src="https://assets.nofrills.ca/eggs.jpg">
        </div>
        </body></html>
    "#;

    const BROKEN_PAGE: &str = r#"
        <html><body>
        <div data-testid="product-tile"><span data-testid="sale-price">sale</span></div>
        </body></html>
    "#;

    const EMPTY_PAGE: &str = "<html><body><div>no deals</div></body></html>";

    #[test]
    fn sale_and_was_prices_are_stripped_and_split() {
        let records = parse_page(PAGE_ONE, BASE_URL);
        assert_eq!(records.len(), 2);

        let bacon = &records[0];
        assert_eq!(bacon.name.as_deref(), Some("PC Bacon 500g"));
        assert_eq!(bacon.price.as_deref(), Some("$4.99"));
        assert_eq!(bacon.original_price.as_deref(), Some("$6.99"));
        assert_eq!(bacon.unit.as_deref(), Some("500 g"));
        assert_eq!(
            bacon.image_url.as_deref(),
            Some("https://www.nofrills.ca/images/bacon.jpg")
        );
        assert_eq!(bacon.page_url.as_deref(), Some(BASE_URL));
        assert!(bacon.valid);
    }

    #[test]
    fn unit_falls_back_to_price_suffix() {
        let records = parse_page(PAGE_ONE, BASE_URL);
        let bananas = &records[1];
        assert_eq!(bananas.price.as_deref(), Some("$0.69"));
        assert_eq!(bananas.unit.as_deref(), Some("/lb"));
    }

    #[test]
    fn broken_tile_is_kept_but_marked_invalid() {
        let records = parse_page(BROKEN_PAGE, BASE_URL);
        assert_eq!(records.len(), 1);
        assert!(!records[0].valid);
        assert_eq!(records[0].error.as_deref(), Some("missing name, price"));
    }

    #[test]
    fn first_page_url_has_no_query() {
        assert_eq!(page_url(1), BASE_URL);
        assert_eq!(page_url(3), format!("{BASE_URL}?page=3"));
    }

    #[tokio::test(start_paused = true)]
    async fn extraction_stops_on_empty_page() {
        let session = FixtureSession::new()
            .with_page(&page_url(1), PAGE_ONE)
            .with_page(&page_url(2), PAGE_TWO)
            .with_page(&page_url(3), EMPTY_PAGE);
        let mut out = Vec::new();
        extract(&session, Duration::from_secs(5), &mut out)
            .await
            .unwrap();
        assert_eq!(out.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn extraction_stops_when_final_page_repeats() {
        // The site serves page 2 again for every page past the end.
        let session = FixtureSession::new()
            .with_page(&page_url(1), PAGE_ONE)
            .with_fallback(PAGE_TWO);
        let mut out = Vec::new();
        extract(&session, Duration::from_secs(5), &mut out)
            .await
            .unwrap();
        // Pages 1, 2, and the duplicate 3 are all collected before the stop.
        assert_eq!(out.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn extraction_stops_when_a_page_is_all_invalid() {
        let session = FixtureSession::new()
            .with_page(&page_url(1), PAGE_ONE)
            .with_page(&page_url(2), BROKEN_PAGE);
        let mut out = Vec::new();
        extract(&session, Duration::from_secs(5), &mut out)
            .await
            .unwrap();
        assert_eq!(out.len(), 3);
        assert!(!out[2].valid);
    }

    #[test]
    fn paginator_reports_duplicate_reason() {
        let mut paginator = Paginator::new(MAX_PAGES)
            .stop_when_all_invalid()
            .stop_on_duplicate_names();
        let records = parse_page(PAGE_TWO, BASE_URL);
        assert!(matches!(paginator.advance(&records), Decision::Continue(2)));
        assert!(matches!(
            paginator.advance(&records),
            Decision::Stop(StopReason::DuplicatePage)
        ));
    }
}
