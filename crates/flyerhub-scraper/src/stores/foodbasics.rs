//! Food Basics weekly flyer.
//!
//! Discrete pagination through a URL path suffix (`/search-page-N`); the
//! flyer filter rides along as a query string. Pagination ends on the
//! first page with no product tiles, bounded at [`MAX_PAGES`].

use std::time::Duration;

use scraper::{Html, Selector};
use tracing::{debug, info, warn};

use flyerhub_core::{ProductRecord, StoreKey};

use crate::dom::{element_text, first_attr, first_text, resolve_url};
use crate::fetch::{fetch_page, PageLoad};
use crate::pagination::{Decision, Paginator};
use crate::session::{BrowserSession, SessionError};

const BASE_URL: &str = "https://www.foodbasics.ca/search";
const FLYER_QUERY: &str =
    "?sortOrder=relevance&filter=%3Arelevance%3Adeal%3AFlyer+%26+Deals&fromEcomFlyer=true";
const TILE_SELECTOR: &str = ".tile-product";
const MAX_PAGES: u32 = 20;

fn page_url(page: u32) -> String {
    if page == 1 {
        format!("{BASE_URL}{FLYER_QUERY}")
    } else {
        format!("{BASE_URL}-page-{page}{FLYER_QUERY}")
    }
}

/// Scrapes the Food Basics flyer across all pages into `out`.
///
/// # Errors
///
/// Returns [`SessionError`] on driver-level failure; `out` keeps the pages
/// collected so far.
pub async fn extract(
    session: &dyn BrowserSession,
    timeout: Duration,
    out: &mut Vec<ProductRecord>,
) -> Result<(), SessionError> {
    let mut paginator = Paginator::new(MAX_PAGES);
    loop {
        let url = page_url(paginator.page());
        debug!(store = %StoreKey::Foodbasics, page = paginator.page(), url, "fetching flyer page");

        if fetch_page(session, &url, TILE_SELECTOR, timeout).await? == PageLoad::TimedOut {
            // No tiles rendered; parse anyway and let the empty page stop
            // pagination.
            warn!(store = %StoreKey::Foodbasics, page = paginator.page(), "page never rendered tiles");
        }

        let html = session.content().await?;
        let records = parse_page(&html);
        let decision = paginator.advance(&records);
        out.extend(records);

        if let Decision::Stop(reason) = decision {
            info!(store = %StoreKey::Foodbasics, page = paginator.page(), %reason, total = out.len(), "pagination finished");
            return Ok(());
        }
    }
}

/// Parses every `.tile-product` on a rendered search page.
pub fn parse_page(html: &str) -> Vec<ProductRecord> {
    let document = Html::parse_document(html);
    let tile_selector = Selector::parse(TILE_SELECTOR).expect("valid selector");

    let mut records = Vec::new();
    for tile in document.select(&tile_selector) {
        let mut record = ProductRecord::new(StoreKey::Foodbasics);
        record.name = first_text(tile, &[".head__title"]);
        record.price = first_text(tile, &[".pi-price-promo"]);

        // Package size; the site abbreviates single units as " un".
        record.unit = first_text(tile, &[".head__unit-details"])
            .map(|u| u.replace(" un", " each"));

        // The struck-through block carries the pre-sale price and, on
        // per-weight items, a unit abbreviation.
        let before_selector = Selector::parse(".pricing__before-price").expect("valid selector");
        if let Some(before) = tile.select(&before_selector).next() {
            let span_selector = Selector::parse("span").expect("valid selector");
            record.original_price = before
                .select(&span_selector)
                .map(element_text)
                .find(|t| t.contains('$'));
            if record.unit.is_none() {
                record.unit = first_text(before, &["abbr"]).map(|abbr| format!("/{abbr}"));
            }
        }

        record.image_url = first_attr(tile, &[("picture source", "srcset"), ("img", "src")])
            .and_then(|raw| first_srcset_candidate(&raw))
            .and_then(|url| resolve_url(&url, StoreKey::Foodbasics.canonical_origin()));

        let record = record.finalize();
        if !record.valid {
            debug!(store = %StoreKey::Foodbasics, error = record.error.as_deref(), "tile failed validation");
        }
        records.push(record);
    }
    records
}

/// Reduces a `srcset` value to its first candidate URL. Plain `src` values
/// pass through unchanged.
fn first_srcset_candidate(raw: &str) -> Option<String> {
    let first = raw.split(',').next()?.trim();
    let url = first.split_whitespace().next()?;
    if url.is_empty() {
        None
    } else {
        Some(url.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLYER_PAGE: &str = r#"
        <html><body>
        <div class="tile-product">
            <div class="head__title">Selection White Bread</div>
            <div class="head__unit-details">1 un</div>
            <div class="pi-price-promo">$1.99</div>
            <div class="pricing__before-price"><span>was</span><span>$2.99</span></div>
            <picture><source srcset="https://cdn.foodbasics.ca/bread-small.jpg 1x, https://cdn.foodbasics.ca/bread-large.jpg 2x"></picture>
        </div>
        <div class="tile-product">
            <div class="head__title">Chicken Drumsticks</div>
            <div class="pi-price-promo">$2.49</div>
            <div class="pricing__before-price"><span>$5.49</span><abbr>lb</abbr></div>
            <img src="https://cdn.foodbasics.ca/chicken.jpg">
        </div>
        </body></html>
    "#;

    #[test]
    fn parses_name_price_and_before_price() {
        let records = parse_page(FLYER_PAGE);
        assert_eq!(records.len(), 2);

        let bread = &records[0];
        assert_eq!(bread.name.as_deref(), Some("Selection White Bread"));
        assert_eq!(bread.price.as_deref(), Some("$1.99"));
        assert_eq!(bread.original_price.as_deref(), Some("$2.99"));
        assert!(bread.valid);
    }

    #[test]
    fn unit_rewrites_un_to_each_and_falls_back_to_abbr() {
        let records = parse_page(FLYER_PAGE);
        assert_eq!(records[0].unit.as_deref(), Some("1 each"));
        // No package-size element: unit comes from the before-price abbr.
        assert_eq!(records[1].unit.as_deref(), Some("/lb"));
    }

    #[test]
    fn image_prefers_first_srcset_candidate() {
        let records = parse_page(FLYER_PAGE);
        assert_eq!(
            records[0].image_url.as_deref(),
            Some("https://cdn.foodbasics.ca/bread-small.jpg")
        );
        assert_eq!(
            records[1].image_url.as_deref(),
            Some("https://cdn.foodbasics.ca/chicken.jpg")
        );
    }

    #[test]
    fn relative_image_src_resolves_against_canonical_origin() {
        let html = r#"
            <div class="tile-product">
                <div class="head__title">Large White Eggs</div>
                <div class="pi-price-promo">$3.99</div>
                <img src="/img/eggs.png">
            </div>
        "#;
        let records = parse_page(html);
        assert_eq!(
            records[0].image_url.as_deref(),
            Some("https://www.foodbasics.ca/img/eggs.png")
        );
    }

    #[test]
    fn page_without_tiles_yields_no_records() {
        assert!(parse_page("<html><body></body></html>").is_empty());
    }

    #[test]
    fn page_url_suffixes_after_first_page() {
        assert!(page_url(1).starts_with("https://www.foodbasics.ca/search?"));
        assert!(page_url(3).starts_with("https://www.foodbasics.ca/search-page-3?"));
    }

    #[tokio::test(start_paused = true)]
    async fn pagination_stops_on_first_empty_page() {
        let session = crate::testutil::FixtureSession::new()
            .with_page(&page_url(1), FLYER_PAGE)
            .with_page(&page_url(2), FLYER_PAGE)
            .with_page(&page_url(3), "<html><body></body></html>");
        let mut out = Vec::new();
        extract(&session, Duration::from_secs(5), &mut out)
            .await
            .unwrap();
        assert_eq!(out.len(), 4); // two pages of two tiles
    }

    #[tokio::test(start_paused = true)]
    async fn pagination_terminates_on_empty_first_page() {
        let session = crate::testutil::FixtureSession::new();
        let mut out = Vec::new();
        extract(&session, Duration::from_secs(5), &mut out)
            .await
            .unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn pagination_stops_at_max_page_bound() {
        // Every page serves tiles: only the bound can stop the loop.
        let session = crate::testutil::FixtureSession::new().with_fallback(FLYER_PAGE);
        let mut out = Vec::new();
        extract(&session, Duration::from_secs(5), &mut out)
            .await
            .unwrap();
        assert_eq!(out.len(), (MAX_PAGES as usize) * 2);
    }
}
