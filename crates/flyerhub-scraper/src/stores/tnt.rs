//! T&T Supermarket weekly specials.
//!
//! Infinite scroll, no page parameter: the grid lazy-loads tiles as the
//! viewport reaches the bottom, so extraction scrolls until the document
//! height stabilizes and then parses one final snapshot.
//!
//! The price markup interleaves the weight unit with the price digits
//! inside one box; the price is rebuilt by concatenating only the spans
//! NOT tagged with the unit class.

use std::time::Duration;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use flyerhub_core::{ProductRecord, StoreKey};

use crate::dom::{element_text, first_attr, first_text, resolve_url};
use crate::fetch::{fetch_page, scroll_until_settled, PageLoad};
use crate::session::{BrowserSession, SessionError};

const FLYER_URL: &str = "https://www.tntsupermarket.com/eng/weekly-special-er.html";
const READY_SELECTOR: &str = "div.category-grid-44X";
const TILE_SELECTOR: &str = "div.item-root-NyK";
/// Class fragment marking the weight-unit span inside a price box. The
/// site uses hashed class suffixes, so matching is on the stable prefix.
const UNIT_CLASS_FRAGMENT: &str = "item-weightUom-";

const MAX_SCROLLS: usize = 20;
const SCROLL_PAUSE: Duration = Duration::from_secs(2);

/// Scrapes the T&T weekly specials grid into `out`.
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
        warn!(store = %StoreKey::TntSupermarket, "product grid never rendered; nothing to extract");
        return Ok(());
    }

    scroll_until_settled(session, MAX_SCROLLS, SCROLL_PAUSE).await?;

    let html = session.content().await?;
    let records = parse_page(&html);
    info!(store = %StoreKey::TntSupermarket, count = records.len(), "extraction complete");
    out.extend(records);
    Ok(())
}

/// Parses every product tile from a fully-scrolled grid snapshot.
pub fn parse_page(html: &str) -> Vec<ProductRecord> {
    let document = Html::parse_document(html);
    let tile_selector = Selector::parse(TILE_SELECTOR).expect("valid selector");

    let mut records = Vec::new();
    for tile in document.select(&tile_selector) {
        let mut record = ProductRecord::new(StoreKey::TntSupermarket);
        record.name = first_text(tile, &["a.item-name-suo span"]);

        let box_selector = Selector::parse("div.item-priceBox-ObD").expect("valid selector");
        if let Some(price_box) = tile.select(&box_selector).next() {
            let unit_selector = format!("[class*=\"{UNIT_CLASS_FRAGMENT}\"]");
            record.unit = first_text(price_box, &[unit_selector.as_str()])
                .map(|u| format!("/{}", u.to_lowercase().trim_start_matches('/')));

            record.price = price_without_unit(price_box, "div[class^=\"item-hasPrice-\"]");
            record.original_price = price_without_unit(price_box, "div[class^=\"item-wasPrice-\"]");
        }

        record.image_url = first_attr(tile, &[("a.item-images-Or3 img", "src")])
            .and_then(|src| resolve_url(&src, StoreKey::TntSupermarket.canonical_origin()));

        let record = record.finalize();
        if !record.valid {
            debug!(store = %StoreKey::TntSupermarket, error = record.error.as_deref(), "tile failed validation");
        }
        records.push(record);
    }
    records
}

/// Concatenates the text of every span under the first element matching
/// `container_selector`, skipping spans tagged with the unit class; the
/// remainder is the bare price text.
fn price_without_unit(price_box: ElementRef<'_>, container_selector: &str) -> Option<String> {
    let container = Selector::parse(container_selector).expect("valid selector");
    let span = Selector::parse("span").expect("valid selector");

    let element = price_box.select(&container).next()?;
    let price: String = element
        .select(&span)
        .filter(|s| {
            !s.value()
                .attr("class")
                .is_some_and(|c| c.contains(UNIT_CLASS_FRAGMENT))
        })
        .map(element_text)
        .collect();
    let price = price.trim().to_owned();
    if price.is_empty() {
        None
    } else {
        Some(price)
    }
}
