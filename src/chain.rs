//! Ordered fallback lookups for locating a value on a product page.
//!
//! Amazon serves different markup per marketplace and per layout experiment,
//! so every field is found through a list of lookups tried in priority order.
//! The first lookup producing a usable value wins. Lookups that match nothing,
//! produce only blank text, use an invalid selector or hit malformed JSON-LD are
//! skipped. Only a failure of the document itself is returned as an error.

use crate::document::{Document, element_text, parse_selector};
use crate::error::DocumentError;
use crate::utils::normalize_text;
use regex::Regex;
use serde_json::Value;

const STRUCTURED_DATA_SELECTOR: &str = r#"script[type="application/ld+json"]"#;

/// One way of locating candidate values in a document
pub enum Lookup {
    /// Text content of elements matching a CSS selector
    Text(&'static str),
    /// Value of an attribute on elements matching a CSS selector
    Attr(&'static str, &'static str),
    /// `title` attribute of matching elements, falling back to their text
    TitleOrText(&'static str),
    /// First capture group of a pattern matched against the URL path
    UrlPath(Regex),
    /// A projection over each JSON-LD block embedded in the page
    StructuredData(fn(&Value) -> Option<String>),
}

impl Lookup {
    /// Candidate values in document order, normalized, blanks dropped
    fn candidates<D: Document>(&self, doc: &D) -> Result<Vec<String>, DocumentError> {
        let raw: Vec<String> = match self {
            Lookup::Text(css) => {
                let Some(selector) = parse_selector(css) else {
                    return Ok(Vec::new());
                };
                doc.select(&selector)?.into_iter().map(element_text).collect()
            }
            Lookup::Attr(css, attr) => {
                let Some(selector) = parse_selector(css) else {
                    return Ok(Vec::new());
                };
                doc.select(&selector)?
                    .into_iter()
                    .filter_map(|el| el.value().attr(attr).map(normalize_text))
                    .collect()
            }
            Lookup::TitleOrText(css) => {
                let Some(selector) = parse_selector(css) else {
                    return Ok(Vec::new());
                };
                doc.select(&selector)?
                    .into_iter()
                    .map(|el| match el.value().attr("title").map(normalize_text) {
                        Some(title) if !title.is_empty() => title,
                        _ => element_text(el),
                    })
                    .collect()
            }
            Lookup::UrlPath(pattern) => {
                let url = doc.location()?;
                pattern
                    .captures(url.path())
                    .and_then(|caps| caps.get(1))
                    .map(|m| vec![m.as_str().to_string()])
                    .unwrap_or_default()
            }
            Lookup::StructuredData(project) => structured_data(doc)?
                .iter()
                .filter_map(|value| project(value))
                .map(|s| normalize_text(&s))
                .collect(),
        };

        Ok(raw.into_iter().filter(|s| !s.is_empty()).collect())
    }
}

/// Every JSON-LD block on the page that parses, in document order
pub fn structured_data<D: Document>(doc: &D) -> Result<Vec<Value>, DocumentError> {
    let Some(selector) = parse_selector(STRUCTURED_DATA_SELECTOR) else {
        return Ok(Vec::new());
    };
    let mut blocks = Vec::new();
    for script in doc.select(&selector)? {
        let body = script.text().collect::<String>();
        match serde_json::from_str::<Value>(&body) {
            Ok(value) => blocks.push(value),
            Err(e) => ::log::debug!("Skipping malformed JSON-LD block: {}", e),
        }
    }
    Ok(blocks)
}

/// An ordered list of lookups for one field
pub struct SelectorChain {
    name: &'static str,
    lookups: Vec<Lookup>,
}

impl SelectorChain {
    pub fn new(name: &'static str, lookups: Vec<Lookup>) -> Self {
        Self { name, lookups }
    }

    /// Builds a chain of [`Lookup::Text`] lookups
    pub fn text(name: &'static str, selectors: &[&'static str]) -> Self {
        Self::new(name, selectors.iter().copied().map(Lookup::Text).collect())
    }

    /// First non-empty candidate value
    pub fn first<D: Document>(&self, doc: &D) -> Result<Option<String>, DocumentError> {
        self.first_map(doc, |value| Some(value.to_string()))
    }

    /// First candidate value that `parse` accepts
    pub fn first_map<D, T, F>(&self, doc: &D, parse: F) -> Result<Option<T>, DocumentError>
    where
        D: Document,
        F: Fn(&str) -> Option<T>,
    {
        for (index, lookup) in self.lookups.iter().enumerate() {
            for candidate in lookup.candidates(doc)? {
                if let Some(value) = parse(&candidate) {
                    ::log::trace!("{} resolved by lookup {}", self.name, index);
                    return Ok(Some(value));
                }
            }
        }
        ::log::debug!("{} not found", self.name);
        Ok(None)
    }

    /// All values of the first lookup that yields any, deduplicated in order
    pub fn collect<D: Document>(&self, doc: &D) -> Result<Vec<String>, DocumentError> {
        self.collect_where(doc, |_| true)
    }

    /// Like [`collect`](Self::collect), counting only values `keep` accepts
    pub fn collect_where<D, F>(&self, doc: &D, keep: F) -> Result<Vec<String>, DocumentError>
    where
        D: Document,
        F: Fn(&str) -> bool,
    {
        for lookup in &self.lookups {
            let values = dedup(
                lookup
                    .candidates(doc)?
                    .into_iter()
                    .filter(|value| keep(value.as_str()))
                    .collect(),
            );
            if !values.is_empty() {
                return Ok(values);
            }
        }
        ::log::debug!("{} not found", self.name);
        Ok(Vec::new())
    }
}

/// Removes repeated values, keeping the first occurrence
pub fn dedup(values: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::HtmlDocument;

    const PAGE: &str = r#"
        <html><head>
          <script type="application/ld+json">{ broken</script>
          <script type="application/ld+json">{"@type": "Product", "sku": "B0SKU00001"}</script>
        </head><body>
          <span id="empty">   </span>
          <span class="name">First</span>
          <span class="name">Second</span>
          <span class="name">First</span>
          <i id="stars" title="4.5 out of 5 stars"></i>
          <i id="plain">3.0 out of 5</i>
          <input name="ASIN" value="B0INPUT001">
        </body></html>
    "#;

    fn doc() -> HtmlDocument {
        HtmlDocument::parse("https://www.amazon.com/gp/product/B0PATH0001/ref=x", PAGE).unwrap()
    }

    #[test]
    fn test_first_skips_empty_and_invalid() {
        let chain = SelectorChain::text("name", &["#missing", "###", "#empty", ".name"]);
        assert_eq!(chain.first(&doc()).unwrap().as_deref(), Some("First"));
    }

    #[test]
    fn test_first_returns_none_when_exhausted() {
        let chain = SelectorChain::text("name", &["#missing", "#empty"]);
        assert_eq!(chain.first(&doc()).unwrap(), None);
    }

    #[test]
    fn test_first_map_tries_later_candidates() {
        let chain = SelectorChain::text("number", &[".name", "#plain"]);
        let value = chain
            .first_map(&doc(), crate::utils::parse_number)
            .unwrap();
        assert_eq!(value, Some(3.0));
    }

    #[test]
    fn test_collect_dedups_first_source() {
        let chain = SelectorChain::text("names", &["#empty", ".name", "#plain"]);
        assert_eq!(chain.collect(&doc()).unwrap(), vec!["First", "Second"]);
    }

    #[test]
    fn test_collect_where_falls_through_filtered_source() {
        let chain = SelectorChain::text("names", &["#plain", ".name"]);
        let values = chain
            .collect_where(&doc(), |value| !value.starts_with("3.0"))
            .unwrap();
        assert_eq!(values, vec!["First", "Second"]);
    }

    #[test]
    fn test_title_or_text() {
        let chain = SelectorChain::new(
            "rating",
            vec![Lookup::TitleOrText("#stars"), Lookup::TitleOrText("#plain")],
        );
        assert_eq!(
            chain.collect(&doc()).unwrap(),
            vec!["4.5 out of 5 stars".to_string()]
        );
        let plain = SelectorChain::new("rating", vec![Lookup::TitleOrText("#plain")]);
        assert_eq!(plain.first(&doc()).unwrap().as_deref(), Some("3.0 out of 5"));
    }

    #[test]
    fn test_url_attr_and_structured_data_lookups() {
        let doc = doc();
        let by_path = SelectorChain::new(
            "asin",
            vec![Lookup::UrlPath(Regex::new(r"(?i)/gp/product/([A-Z0-9]{10})").unwrap())],
        );
        assert_eq!(by_path.first(&doc).unwrap().as_deref(), Some("B0PATH0001"));

        let by_attr = SelectorChain::new("asin", vec![Lookup::Attr(r#"input[name="ASIN"]"#, "value")]);
        assert_eq!(by_attr.first(&doc).unwrap().as_deref(), Some("B0INPUT001"));

        let by_data = SelectorChain::new(
            "asin",
            vec![Lookup::StructuredData(|v| {
                v.get("sku").and_then(Value::as_str).map(str::to_string)
            })],
        );
        assert_eq!(by_data.first(&doc).unwrap().as_deref(), Some("B0SKU00001"));
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let values = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(dedup(values), vec!["b", "a"]);
    }
}
