//! Normalized flyer product records shared by the scrapers and the API.
//!
//! ## Observed shapes from the live retailer sites
//!
//! ### Prices
//! Prices stay in the retailer's local currency text form (`"$3.99"`,
//! `"2/$5.00"`, `"$1.49/lb"`). No numeric parsing happens here: the sites mix
//! multi-buy offers, per-weight pricing, and cents-only formats, and the
//! consumers (shopping list, UI) display the text verbatim.
//!
//! ### `original_price`
//! Present only when the item is on sale (the site shows a struck-through
//! "was" price). Absent otherwise, never an empty string or `"0.00"`.
//!
//! ### Placeholder tokens
//! No Frills renders the literal string `null` into some text nodes, and the
//! scrapers historically used `"N/A"` as an in-band sentinel. Both are
//! stripped by [`clean_value`] so persisted records never carry either token.

use serde::{Deserialize, Serialize};

/// The four retailers covered by the pipeline.
///
/// Fixed per extractor and never inferred from page content; the serialized
/// form doubles as the key in the persisted flyer artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKey {
    Galleria,
    TntSupermarket,
    Foodbasics,
    Nofrills,
}

impl StoreKey {
    /// All stores, in the fixed order the aggregation runner visits them.
    pub const ALL: [StoreKey; 4] = [
        StoreKey::Galleria,
        StoreKey::Foodbasics,
        StoreKey::TntSupermarket,
        StoreKey::Nofrills,
    ];

    /// The snake_case key used in the persisted JSON artifact.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::Galleria => "galleria",
            StoreKey::TntSupermarket => "tnt_supermarket",
            StoreKey::Foodbasics => "foodbasics",
            StoreKey::Nofrills => "nofrills",
        }
    }

    /// Canonical origin used to resolve relative asset URLs for this store.
    #[must_use]
    pub fn canonical_origin(self) -> &'static str {
        match self {
            StoreKey::Galleria => "https://www.galleriasm.com",
            StoreKey::TntSupermarket => "https://www.tntsupermarket.com",
            StoreKey::Foodbasics => "https://www.foodbasics.ca",
            StoreKey::Nofrills => "https://www.nofrills.ca",
        }
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized product from a retailer's weekly flyer.
///
/// Extractors build these field by field and then call [`finalize`], which
/// runs the sentinel cleanup pass and computes `valid`/`error`. `page_url`
/// records which flyer page the record came from, for diagnosing markup
/// drift after the fact.
///
/// [`finalize`]: ProductRecord::finalize
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub store: StoreKey,
    pub name: Option<String>,
    pub price: Option<String>,
    pub unit: Option<String>,
    pub original_price: Option<String>,
    pub image_url: Option<String>,
    pub valid: bool,
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,
}

impl ProductRecord {
    /// An empty record for the given store, invalid until fields are filled
    /// in and [`finalize`](Self::finalize) is called.
    #[must_use]
    pub fn new(store: StoreKey) -> Self {
        Self {
            store,
            name: None,
            price: None,
            unit: None,
            original_price: None,
            image_url: None,
            valid: false,
            error: None,
            page_url: None,
        }
    }

    /// Runs the sentinel cleanup pass over every textual field and computes
    /// `valid`/`error`.
    ///
    /// A record is invalid iff `name` is absent, or both `price` and
    /// `original_price` are absent. `error` names the missing field(s);
    /// it is cleared again when the record is valid.
    ///
    /// Idempotent: finalizing an already-finalized record changes nothing.
    #[must_use]
    pub fn finalize(mut self) -> Self {
        self.name = self.name.take().and_then(|v| clean_value(&v));
        self.price = self.price.take().and_then(|v| clean_value(&v));
        self.unit = self.unit.take().and_then(|v| clean_value(&v));
        self.original_price = self.original_price.take().and_then(|v| clean_value(&v));
        self.image_url = self.image_url.take().and_then(|v| clean_value(&v));

        let mut missing = Vec::new();
        if self.name.is_none() {
            missing.push("name");
        }
        if self.price.is_none() && self.original_price.is_none() {
            missing.push("price");
        }

        if missing.is_empty() {
            self.valid = true;
            self.error = None;
        } else {
            self.valid = false;
            self.error = Some(format!("missing {}", missing.join(", ")));
        }
        self
    }
}

/// Strips the in-band placeholder tokens (`null`, `N/A`) from a scraped text
/// value and maps the empty result to `None`.
///
/// No Frills renders the literal `null` into text nodes when its own data is
/// missing; `N/A` is the sentinel older scraper revisions wrote into fields.
#[must_use]
pub fn clean_value(value: &str) -> Option<String> {
    let cleaned = value.replace("null", "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "N/A" {
        return None;
    }
    Some(cleaned.to_owned())
}
