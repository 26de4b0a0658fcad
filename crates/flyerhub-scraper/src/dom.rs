//! DOM helpers shared by the retailer extractors.
//!
//! Retailer markup drifts across site revisions, so field lookup is an
//! ordered chain of selectors tried in sequence, short-circuiting on the
//! first non-empty result.

use scraper::{ElementRef, Selector};

/// Concatenated, trimmed text content of an element.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_owned()
}

/// Tries each selector in order against `root`; returns the first match's
/// non-empty trimmed text.
pub(crate) fn first_text(root: ElementRef<'_>, selectors: &[&str]) -> Option<String> {
    for raw in selectors {
        let selector = Selector::parse(raw).expect("valid selector");
        if let Some(el) = root.select(&selector).next() {
            let text = element_text(el);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// Tries each `(selector, attribute)` pair in order; returns the first
/// non-empty attribute value found.
pub(crate) fn first_attr(root: ElementRef<'_>, chains: &[(&str, &str)]) -> Option<String> {
    for (raw, attr) in chains {
        let selector = Selector::parse(raw).expect("valid selector");
        if let Some(el) = root.select(&selector).next() {
            if let Some(value) = el.value().attr(attr) {
                let value = value.trim();
                if !value.is_empty() {
                    return Some(value.to_owned());
                }
            }
        }
    }
    None
}

/// Resolves a possibly-relative asset URL against the retailer's canonical
/// origin. Absolute URLs pass through unchanged; unresolvable input yields
/// `None`.
pub(crate) fn resolve_url(raw: &str, origin: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Some(raw.to_owned());
    }
    let base = url::Url::parse(origin).ok()?;
    base.join(raw).ok().map(String::from)
}

/// Extracts the URL from a `background-image`-style inline style attribute,
/// e.g. `background-image: url('/images/p1.jpg')`.
pub(crate) fn style_background_url(style: &str) -> Option<String> {
    let re = regex::Regex::new(r"url\('?([^')]+)'?\)").expect("valid regex");
    let url = re.captures(style)?.get(1)?.as_str().trim();
    if url.is_empty() {
        None
    } else {
        Some(url.to_owned())
    }
}

/// Removes an embedded marketing token (`sale`, `was`) from a price blob.
/// Case-insensitive; only ever applied to price strings, never to names.
pub(crate) fn strip_marketing_token(text: &str, token: &str) -> String {
    let needle = token.to_ascii_lowercase();
    let mut remaining = text.to_owned();
    // ASCII lowercasing keeps byte offsets aligned with the original text.
    while let Some(pos) = remaining.to_ascii_lowercase().find(&needle) {
        remaining.replace_range(pos..pos + needle.len(), "");
    }
    remaining.trim().to_owned()
}

/// Weight-unit suffixes a price blob can end in when the site concatenates
/// price and unit into one text node (`"$1.99/lb"`).
const WEIGHT_SUFFIXES: &[&str] = &["lb", "kg", "g", "ea", "each"];

/// Splits a single text blob into `(price, unit)` when it ends in a
/// weight-unit suffix; otherwise the whole blob is the price.
pub(crate) fn split_price_unit(blob: &str) -> (Option<String>, Option<String>) {
    let blob = blob.trim();
    if blob.is_empty() {
        return (None, None);
    }
    if blob.starts_with('$') {
        if let Some(slash) = blob.rfind('/') {
            let suffix = blob[slash + 1..].trim();
            if WEIGHT_SUFFIXES.contains(&suffix.to_lowercase().as_str()) {
                let price = blob[..slash].trim();
                return (
                    Some(price.to_owned()),
                    Some(format!("/{}", suffix.to_lowercase())),
                );
            }
        }
    }
    (Some(blob.to_owned()), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn with_root<R>(html: &str, f: impl FnOnce(ElementRef<'_>) -> R) -> R {
        let doc = Html::parse_fragment(html);
        f(doc.root_element())
    }

    #[test]
    fn first_text_short_circuits_on_first_matching_selector() {
        let html = r#"<div><span class="new">$3.99</span><span class="old">$5.99</span></div>"#;
        with_root(html, |root| {
            assert_eq!(
                first_text(root, &[".missing", ".new", ".old"]).as_deref(),
                Some("$3.99")
            );
        });
    }

    #[test]
    fn first_text_skips_empty_matches() {
        let html = r#"<div><span class="a">  </span><span class="b">Milk</span></div>"#;
        with_root(html, |root| {
            assert_eq!(first_text(root, &[".a", ".b"]).as_deref(), Some("Milk"));
        });
    }

    #[test]
    fn first_text_returns_none_when_nothing_matches() {
        with_root("<div></div>", |root| {
            assert_eq!(first_text(root, &[".a", ".b"]), None);
        });
    }

    #[test]
    fn first_attr_walks_the_chain() {
        let html = r#"<div><img src="/img/x.png"></div>"#;
        with_root(html, |root| {
            assert_eq!(
                first_attr(root, &[("picture source", "srcset"), ("img", "src")]).as_deref(),
                Some("/img/x.png")
            );
        });
    }

    #[test]
    fn resolve_url_joins_relative_against_origin() {
        assert_eq!(
            resolve_url("/img/x.png", "https://www.nofrills.ca").as_deref(),
            Some("https://www.nofrills.ca/img/x.png")
        );
    }

    #[test]
    fn resolve_url_passes_absolute_through() {
        assert_eq!(
            resolve_url("https://cdn.example.com/x.png", "https://www.nofrills.ca").as_deref(),
            Some("https://cdn.example.com/x.png")
        );
    }

    #[test]
    fn style_background_url_extracts_quoted_and_bare_urls() {
        assert_eq!(
            style_background_url("background-image: url('/Upload/p1.jpg');").as_deref(),
            Some("/Upload/p1.jpg")
        );
        assert_eq!(
            style_background_url("background-image:url(/Upload/p2.jpg)").as_deref(),
            Some("/Upload/p2.jpg")
        );
        assert_eq!(style_background_url("color: red"), None);
    }

    #[test]
    fn strip_marketing_token_removes_embedded_token() {
        assert_eq!(strip_marketing_token("sale $2.99", "sale"), "$2.99");
        assert_eq!(strip_marketing_token("was $4.99", "was"), "$4.99");
        assert_eq!(strip_marketing_token("$2.99", "sale"), "$2.99");
    }

    #[test]
    fn strip_marketing_token_removes_every_occurrence() {
        assert_eq!(strip_marketing_token("salesale$1.99", "sale"), "$1.99");
        assert_eq!(strip_marketing_token("SALE sale $1.99", "sale"), "$1.99");
    }

    #[test]
    fn split_price_unit_detects_weight_suffix() {
        assert_eq!(
            split_price_unit("$1.99/lb"),
            (Some("$1.99".to_owned()), Some("/lb".to_owned()))
        );
        assert_eq!(
            split_price_unit("$4.39/KG"),
            (Some("$4.39".to_owned()), Some("/kg".to_owned()))
        );
    }

    #[test]
    fn split_price_unit_leaves_plain_prices_alone() {
        assert_eq!(split_price_unit("$2.49"), (Some("$2.49".to_owned()), None));
        assert_eq!(split_price_unit("2/$5.00"), (Some("2/$5.00".to_owned()), None));
        assert_eq!(split_price_unit(""), (None, None));
    }
}
