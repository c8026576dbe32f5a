use crate::chain::{Lookup, SelectorChain};
use crate::document::{Document, element_text, first_matching};
use crate::error::DocumentError;
use crate::record::{ASIN_NOT_FOUND, Breadcrumb, Price, TITLE_NOT_FOUND};
use crate::site::default_currency;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// URL path shapes that carry an ASIN, most common first
const ASIN_PATH_PATTERNS: [&str; 4] = [
    r"(?i)/dp/([A-Z0-9]{10})(?:/|$)",
    r"(?i)/gp/product/([A-Z0-9]{10})(?:/|$)",
    r"(?i)/exec/obidos/ASIN/([A-Z0-9]{10})(?:/|$)",
    r"(?i)/product/([A-Z0-9]{10})(?:/|$)",
];

/// Compiled [`ASIN_PATH_PATTERNS`], also used for product page detection
pub static ASIN_PATH_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ASIN_PATH_PATTERNS
        .iter()
        .map(|pattern| Regex::new(pattern).expect("valid ASIN path regex"))
        .collect()
});

const BREADCRUMB_SELECTORS: &[&str] = &[
    "#wayfinding-breadcrumbs_feature_div .a-link-normal",
    ".a-breadcrumb .a-link-normal",
];

static ASIN_CHAIN: LazyLock<SelectorChain> = LazyLock::new(|| {
    let mut lookups: Vec<Lookup> = ASIN_PATH_RES.iter().cloned().map(Lookup::UrlPath).collect();
    lookups.push(Lookup::Attr(r#"input[name="ASIN"]"#, "value"));
    lookups.push(Lookup::Attr("[data-asin]", "data-asin"));
    lookups.push(Lookup::StructuredData(|data| {
        product_field(data, "sku").map(str::to_string)
    }));
    lookups.push(Lookup::StructuredData(|data| {
        product_field(data, "productID")
            .and_then(|id| id.split_once(':'))
            .map(|(_, asin)| asin.to_string())
    }));
    SelectorChain::new("asin", lookups)
});

static TITLE_CHAIN: LazyLock<SelectorChain> = LazyLock::new(|| {
    SelectorChain::text(
        "title",
        &[
            "#productTitle",
            "#title",
            ".product-title",
            r#"[data-feature-name="title"]"#,
            ".a-size-large.product-title-word-break",
        ],
    )
});

static PRICE_CHAIN: LazyLock<SelectorChain> = LazyLock::new(|| {
    SelectorChain::text(
        "price",
        &[
            ".a-price .a-offscreen",
            "#price",
            "#priceblock_ourprice",
            "#priceblock_dealprice",
            ".a-price",
            ".a-color-price",
            r#"span.a-price[data-a-size="xl"] .a-offscreen"#,
            "span.a-price-whole",
        ],
    )
});

static AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d.,]*").expect("valid amount regex"));
static CURRENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\d.,]+").expect("valid currency regex"));

/// A string value of a JSON-LD object, looking through arrays and `@graph`
fn product_field<'a>(data: &'a Value, key: &str) -> Option<&'a str> {
    match data {
        Value::Array(items) => items.iter().find_map(|item| product_field(item, key)),
        Value::Object(map) => map.get(key).and_then(Value::as_str).or_else(|| {
            map.get("@graph")
                .and_then(|graph| product_field(graph, key))
        }),
        _ => None,
    }
}

/// Accepts exactly 10 ASCII alphanumerics
pub fn valid_asin(candidate: &str) -> Option<String> {
    (candidate.len() == 10 && candidate.chars().all(|c| c.is_ascii_alphanumeric()))
        .then(|| candidate.to_string())
}

/// The product's ASIN, or [`ASIN_NOT_FOUND`]
pub fn asin<D: Document>(doc: &D) -> Result<String, DocumentError> {
    Ok(ASIN_CHAIN
        .first_map(doc, valid_asin)?
        .unwrap_or_else(|| ASIN_NOT_FOUND.to_string()))
}

/// The product title, or [`TITLE_NOT_FOUND`]
pub fn title<D: Document>(doc: &D) -> Result<String, DocumentError> {
    Ok(TITLE_CHAIN
        .first(doc)?
        .unwrap_or_else(|| TITLE_NOT_FOUND.to_string()))
}

/// Splits displayed price text into its currency symbol and numeric part.
///
/// Returns `None` when the text holds no digits.
pub fn split_price(text: &str) -> Option<(Option<String>, String)> {
    let amount = AMOUNT_RE.find(text)?.as_str().to_string();
    let currency = CURRENCY_RE
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .find(|symbol| !symbol.is_empty())
        .map(str::to_string);
    Some((currency, amount))
}

/// Displayed price; the currency defaults from the domain when no symbol is shown
pub fn price<D: Document>(doc: &D) -> Result<Price, DocumentError> {
    let url = doc.location()?;
    let fallback = default_currency(url.host_str().unwrap_or_default());

    Ok(match PRICE_CHAIN.first_map(doc, split_price)? {
        Some((currency, amount)) => Price {
            amount: Some(amount),
            currency: currency.unwrap_or_else(|| fallback.to_string()),
        },
        None => Price {
            amount: None,
            currency: fallback.to_string(),
        },
    })
}

/// Category trail, with links resolved against the page URL
pub fn breadcrumbs<D: Document>(doc: &D) -> Result<Vec<Breadcrumb>, DocumentError> {
    let base = doc.location()?;
    Ok(first_matching(doc, BREADCRUMB_SELECTORS)?
        .into_iter()
        .filter_map(|link| {
            let text = element_text(link);
            if text.is_empty() {
                return None;
            }
            let url = link
                .value()
                .attr("href")
                .and_then(|href| base.join(href).ok())
                .map(|url| url.to_string())
                .unwrap_or_default();
            Some(Breadcrumb { text, url })
        })
        .collect())
}
