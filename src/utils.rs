use regex::Regex;
use std::sync::LazyLock;

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid number regex"));
static COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,]*").expect("valid count regex"));
static NON_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9A-Za-z_\s-]").expect("valid slug regex"));
static SIZE_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\._[^/]*_\.").expect("valid size token regex"));

/// Collapses every whitespace run to a single space and trims the ends
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First decimal number in the text, e.g. "4.5 out of 5 stars" -> 4.5
pub fn parse_number(text: &str) -> Option<f64> {
    NUMBER_RE
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// First integer in the text with thousands separators stripped, e.g. "1,234 ratings" -> 1234
pub fn parse_count(text: &str) -> Option<u64> {
    COUNT_RE
        .find(text)
        .and_then(|m| m.as_str().replace(',', "").parse::<u64>().ok())
}

/// First integer in the text, clamped to a percentage
pub fn parse_percent(text: &str) -> Option<u8> {
    parse_count(text).map(|n| n.min(100) as u8)
}

/// Lowercase, non-word characters stripped, whitespace runs turned into hyphens,
/// at most 50 characters
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = NON_WORD_RE.replace_all(&lowered, "");
    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .take(50)
        .collect()
}

/// SEO-friendly image filename, e.g. "widget-pro-main-B000000000.jpg"
pub fn seo_filename(title: &str, asin: &str, kind: &str) -> String {
    format!("{}-{}-{}.jpg", slugify(title), kind, asin)
}

pub fn seo_alt_text(title: &str, description: &str) -> String {
    format!("{} - {}", title, description)
}

/// Drops the size token Amazon inserts before the extension, so a thumbnail
/// URL points at the full resolution image
pub fn high_res_image_url(url: &str) -> String {
    SIZE_TOKEN_RE.replace(url, ".").into_owned()
}
