//! Galleria Supermarket weekly specials.
//!
//! Single static flyer page, no pagination. Product images come from a
//! `background-image` inline style on the tile's anchor rather than an
//! `<img>` tag, and sale items carry two `span.price` elements (original
//! first, sale price last).

use std::time::Duration;

use scraper::{Html, Selector};
use tracing::{debug, info, warn};

use flyerhub_core::{ProductRecord, StoreKey};

use crate::dom::{element_text, first_text, resolve_url, style_background_url};
use crate::fetch::{fetch_page, PageLoad};
use crate::session::{BrowserSession, SessionError};

const FLYER_URL: &str = "https://www.galleriasm.com/Home/prodview/dy9MFsYpCkOidpzOUKlHww";
const READY_SELECTOR: &str = ".item";

/// Scrapes the Galleria flyer page into `out`.
///
/// # Errors
///
/// Returns [`SessionError`] on driver-level failure.
pub async fn extract(
    session: &dyn BrowserSession,
    timeout: Duration,
    out: &mut Vec<ProductRecord>,
) -> Result<(), SessionError> {
    if fetch_page(session, FLYER_URL, READY_SELECTOR, timeout).await? == PageLoad::TimedOut {
        warn!(store = %StoreKey::Galleria, "flyer page never rendered; nothing to extract");
        return Ok(());
    }

    let html = session.content().await?;
    let records = parse_page(&html);
    info!(store = %StoreKey::Galleria, count = records.len(), "extraction complete");
    out.extend(records);
    Ok(())
}

/// Parses every product tile out of a rendered flyer page.
pub fn parse_page(html: &str) -> Vec<ProductRecord> {
    let document = Html::parse_document(html);
    let tile_selector = Selector::parse("div.item").expect("valid selector");
    let price_selector = Selector::parse("span.price").expect("valid selector");

    let mut records = Vec::new();
    for tile in document.select(&tile_selector) {
        let mut record = ProductRecord::new(StoreKey::Galleria);
        record.name = first_text(tile, &["div.item-title a"]);

        let style_selector = Selector::parse("a.product-image").expect("valid selector");
        record.image_url = tile
            .select(&style_selector)
            .next()
            .and_then(|a| a.value().attr("style"))
            .and_then(style_background_url)
            .and_then(|raw| resolve_url(&raw, StoreKey::Galleria.canonical_origin()));

        let box_selector = Selector::parse("div.price-box").expect("valid selector");
        if let Some(price_box) = tile.select(&box_selector).next() {
            let prices: Vec<String> = price_box
                .select(&price_selector)
                .map(element_text)
                .filter(|t| !t.is_empty())
                .collect();
            // Two spans: struck-through original first, sale price last.
            // One span: the regular price.
            match prices.as_slice() {
                [] => {}
                [only] => record.price = Some(only.clone()),
                [first, .., last] => {
                    record.original_price = Some(first.clone());
                    record.price = Some(last.clone());
                }
            }

            record.unit = first_text(price_box, &["small"]).map(|u| format!("/{}", u.to_lowercase()));
        }

        let record = record.finalize();
        if !record.valid {
            debug!(store = %StoreKey::Galleria, error = record.error.as_deref(), "tile failed validation");
        }
        records.push(record);
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALE_AND_REGULAR: &str = r#"
        <html><body>
        <div class="item">
            <div class="item-title"><a>Shin Ramyun 5-pack</a></div>
            <a class="product-image" style="background-image: url('/Upload/ramyun.jpg')"></a>
            <div class="price-box">
                <span class="price">$5.99</span>
                <span class="price">$3.99</span>
                <small>EA</small>
            </div>
        </div>
        <div class="item">
            <div class="item-title"><a>Korean Pear</a></div>
            <a class="product-image" style="background-image: url('https://cdn.galleriasm.com/pear.jpg')"></a>
            <div class="price-box">
                <span class="price">$2.49</span>
            </div>
        </div>
        </body></html>
    "#;

    #[test]
    fn two_price_spans_split_into_original_and_sale_price() {
        let records = parse_page(SALE_AND_REGULAR);
        assert_eq!(records.len(), 2);

        let sale = &records[0];
        assert_eq!(sale.name.as_deref(), Some("Shin Ramyun 5-pack"));
        assert_eq!(sale.price.as_deref(), Some("$3.99"));
        assert_eq!(sale.original_price.as_deref(), Some("$5.99"));
        assert_eq!(sale.unit.as_deref(), Some("/ea"));
        assert!(sale.valid);

        let regular = &records[1];
        assert_eq!(regular.price.as_deref(), Some("$2.49"));
        assert_eq!(regular.original_price, None);
        assert!(regular.valid);
    }

    #[test]
    fn background_image_url_is_resolved_against_origin() {
        let records = parse_page(SALE_AND_REGULAR);
        assert_eq!(
            records[0].image_url.as_deref(),
            Some("https://www.galleriasm.com/Upload/ramyun.jpg")
        );
        // Absolute URLs pass through unchanged.
        assert_eq!(
            records[1].image_url.as_deref(),
            Some("https://cdn.galleriasm.com/pear.jpg")
        );
    }

    #[test]
    fn tile_without_prices_is_kept_but_invalid() {
        let html = r#"<div class="item"><div class="item-title"><a>Mystery Item</a></div></div>"#;
        let records = parse_page(html);
        assert_eq!(records.len(), 1);
        assert!(!records[0].valid);
        assert_eq!(records[0].error.as_deref(), Some("missing price"));
    }

    #[test]
    fn page_without_tiles_yields_no_records() {
        assert!(parse_page("<html><body><p>maintenance</p></body></html>").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn extract_appends_records_from_fixture_session() {
        let session = crate::testutil::FixtureSession::new().with_page(FLYER_URL, SALE_AND_REGULAR);
        let mut out = Vec::new();
        extract(&session, Duration::from_secs(5), &mut out)
            .await
            .unwrap();
        assert_eq!(out.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn extract_yields_nothing_when_page_never_renders() {
        let session = crate::testutil::FixtureSession::new()
            .with_page(FLYER_URL, "<html><body>loading…</body></html>");
        let mut out = Vec::new();
        extract(&session, Duration::from_secs(5), &mut out)
            .await
            .unwrap();
        assert!(out.is_empty());
    }
}
