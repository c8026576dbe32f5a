pub mod browser;

use crate::error::DocumentError;
use crate::utils::normalize_text;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use url::Url;

pub use browser::BrowserDocument;

/// Disclosure control that reveals the full "About this item" list
pub const SHOW_MORE_SELECTOR: &str = "#feature-bullets #showMore, .a-expander-prompt";

/// A loaded product page that field extractors can query.
///
/// Lookups only read the page. The one exception is [`Document::expand`],
/// which may click the "show more" control on a live page.
#[allow(async_fn_in_trait)]
pub trait Document {
    /// URL of the loaded page
    fn location(&self) -> Result<Url, DocumentError>;

    /// All elements matching `selector`, in document order
    fn select<'a>(&'a self, selector: &Selector) -> Result<Vec<ElementRef<'a>>, DocumentError>;

    /// Clicks the "show more" control if present and waits `delay` for the page
    /// to update. Returns whether anything was clicked.
    async fn expand(&mut self, delay: Duration) -> Result<bool, DocumentError>;
}

/// A parsed HTML snapshot of a page
pub struct HtmlDocument {
    url: Url,
    html: Html,
}

impl HtmlDocument {
    /// Parses `html` as the document served at `url`
    pub fn parse(url: &str, html: &str) -> Result<Self, DocumentError> {
        let url = Url::parse(url).map_err(|source| DocumentError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        Ok(Self::from_parts(url, html))
    }

    pub fn from_parts(url: Url, html: &str) -> Self {
        Self {
            url,
            html: Html::parse_document(html),
        }
    }

    /// Whether the "show more" control exists in this snapshot
    pub fn has_show_more(&self) -> bool {
        Selector::parse(SHOW_MORE_SELECTOR)
            .map(|selector| self.html.select(&selector).next().is_some())
            .unwrap_or(false)
    }
}

impl Document for HtmlDocument {
    fn location(&self) -> Result<Url, DocumentError> {
        Ok(self.url.clone())
    }

    fn select<'a>(&'a self, selector: &Selector) -> Result<Vec<ElementRef<'a>>, DocumentError> {
        Ok(self.html.select(selector).collect())
    }

    async fn expand(&mut self, _delay: Duration) -> Result<bool, DocumentError> {
        if self.has_show_more() {
            ::log::debug!("Static snapshot of {} cannot be expanded", self.url);
        }
        Ok(false)
    }
}

/// Normalized text content of an element
pub fn element_text(element: ElementRef<'_>) -> String {
    normalize_text(&element.text().collect::<String>())
}

/// Parses a CSS selector, logging and discarding invalid ones
pub fn parse_selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            ::log::debug!("Skipping invalid selector {:?}: {:?}", css, e);
            None
        }
    }
}

/// Elements matching `css` inside `element`
pub fn select_within<'a>(element: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match parse_selector(css) {
        Some(selector) => element.select(&selector).collect(),
        None => Vec::new(),
    }
}

/// First element matching `css` inside `element`
pub fn first_within<'a>(element: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    select_within(element, css).into_iter().next()
}

/// Whether `element` has an ancestor carrying `class`
pub fn has_ancestor_class(element: ElementRef<'_>, class: &str) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().classes().any(|c| c == class))
}

/// Elements of the first selector in `selectors` that matches anything
pub fn first_matching<'a, D: Document>(
    doc: &'a D,
    selectors: &[&str],
) -> Result<Vec<ElementRef<'a>>, DocumentError> {
    for css in selectors {
        let Some(selector) = parse_selector(css) else {
            continue;
        };
        let elements = doc.select(&selector)?;
        if !elements.is_empty() {
            return Ok(elements);
        }
    }
    Ok(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <h1 id="productTitle">  Widget
              Pro </h1>
          <div class="videoThumbnail"><ul><li><img id="video" src="v.jpg"></li></ul></div>
          <img id="still" src="s.jpg">
          <span class="a-price"><span class="a-offscreen">$19<span>.99</span></span></span>
        </body></html>
    "#;

    fn doc() -> HtmlDocument {
        HtmlDocument::parse("https://www.amazon.com/dp/B000000000", PAGE).unwrap()
    }

    #[test]
    fn test_parse_rejects_bad_url() {
        assert!(matches!(
            HtmlDocument::parse("not a url", PAGE),
            Err(DocumentError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_element_text_is_normalized() {
        let doc = doc();
        let title = first_matching(&doc, &["#productTitle"]).unwrap();
        assert_eq!(element_text(title[0]), "Widget Pro");

        // Nested text nodes are joined without inserting spaces
        let price = first_matching(&doc, &[".a-price .a-offscreen"]).unwrap();
        assert_eq!(element_text(price[0]), "$19.99");
    }

    #[test]
    fn test_first_matching_skips_invalid_and_empty() {
        let doc = doc();
        let found = first_matching(&doc, &["###", "#missing", "img"]).unwrap();
        assert_eq!(found.len(), 2);
        assert!(first_matching(&doc, &["#missing"]).unwrap().is_empty());
    }

    #[test]
    fn test_has_ancestor_class() {
        let doc = doc();
        let video = first_matching(&doc, &["#video"]).unwrap()[0];
        let still = first_matching(&doc, &["#still"]).unwrap()[0];
        assert!(has_ancestor_class(video, "videoThumbnail"));
        assert!(!has_ancestor_class(still, "videoThumbnail"));
    }

    #[tokio::test]
    async fn test_static_expand_is_a_no_op() {
        let mut doc = HtmlDocument::parse(
            "https://www.amazon.com/dp/B000000000",
            r#"<div id="feature-bullets"><a id="showMore">See more</a></div>"#,
        )
        .unwrap();
        assert!(doc.has_show_more());
        assert!(!doc.expand(Duration::from_millis(0)).await.unwrap());
    }
}
