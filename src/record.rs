use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel stored in `ProductRecord::asin` when no source yields an ASIN
pub const ASIN_NOT_FOUND: &str = "ASIN not found";

/// Sentinel stored in `ProductRecord::title` when no title element matches
pub const TITLE_NOT_FOUND: &str = "Title not found";

/// Normalized snapshot of a scraped product page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    /// URL of the page
    pub url: String,

    /// 10-character product identifier, or [`ASIN_NOT_FOUND`]
    pub asin: String,

    pub title: String,

    pub price: Price,

    pub rating: Rating,

    /// Text of the first breadcrumb
    pub category: Option<String>,

    pub breadcrumbs: Vec<Breadcrumb>,

    /// Marketplace the page belongs to
    pub site: SiteInfo,

    /// Main image first, then additional images; `position` follows this order
    pub images: Vec<ProductImage>,

    pub variations: Variations,

    /// Attribute name to value, first source wins
    pub details: BTreeMap<String, String>,

    /// "About this item" bullets
    pub features: Vec<String>,

    pub description: Option<String>,

    pub reviews: Reviews,

    pub questions: Vec<QuestionAnswer>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliate_url: Option<String>,

    pub meta: Meta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    /// Numeric part as displayed, separators kept (e.g. "1,299.00")
    pub amount: Option<String>,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    /// Average star rating, 0 when unknown
    pub average: f64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteInfo {
    pub domain: String,
    /// Marketplace code such as "US" or "DE", "Unknown" otherwise
    pub locale: String,
    pub full_domain: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Main,
    Additional,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub url: String,
    pub seo_filename: String,
    pub seo_alt_text: String,
    #[serde(rename = "type")]
    pub kind: ImageKind,
    /// 1-based position within `ProductRecord::images`
    pub position: usize,
    /// Inline `data:` URI, `None` when not fetched or the fetch failed
    pub base64: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variations {
    pub colors: Vec<String>,
    pub styles: Vec<String>,
    pub sizes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reviews {
    /// Star level (1..=5) to percentage of ratings
    pub ratings_breakdown: BTreeMap<u8, u8>,
    pub top_reviews: Vec<Review>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub title: String,
    pub text: String,
    pub rating: f64,
    pub author: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub extraction_date: DateTime<Utc>,
    pub success: bool,
    pub error: Option<String>,
}

impl ProductRecord {
    /// Minimal record returned when extraction failed outright
    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        let url = url.into();
        let host = url::Url::parse(&url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(str::to_string))
            .unwrap_or_default();
        Self {
            site: SiteInfo::unknown(&host),
            url,
            asin: ASIN_NOT_FOUND.to_string(),
            title: TITLE_NOT_FOUND.to_string(),
            price: Price {
                amount: None,
                currency: String::new(),
            },
            rating: Rating::default(),
            category: None,
            breadcrumbs: Vec::new(),
            images: Vec::new(),
            variations: Variations::default(),
            details: BTreeMap::new(),
            features: Vec::new(),
            description: None,
            reviews: Reviews::default(),
            questions: Vec::new(),
            affiliate_url: None,
            meta: Meta {
                extraction_date: Utc::now(),
                success: false,
                error: Some(error.into()),
            },
        }
    }

    pub fn has_asin(&self) -> bool {
        self.asin != ASIN_NOT_FOUND
    }

    pub fn main_image(&self) -> Option<&ProductImage> {
        self.images.iter().find(|image| image.kind == ImageKind::Main)
    }
}

impl SiteInfo {
    pub(crate) fn unknown(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            locale: "Unknown".to_string(),
            full_domain: domain.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_record_shape() {
        let record = ProductRecord::failed("https://www.amazon.com/dp/B000000000", "boom");
        assert!(!record.meta.success);
        assert_eq!(record.meta.error.as_deref(), Some("boom"));
        assert!(!record.has_asin());
        assert!(record.images.is_empty());
        assert_eq!(record.site.domain, "www.amazon.com");
        assert_eq!(record.site.locale, "Unknown");
    }

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let mut record = ProductRecord::failed("https://x", "nope");
        record.images.push(ProductImage {
            url: "https://x/a.jpg".to_string(),
            seo_filename: "a-main-B000000000.jpg".to_string(),
            seo_alt_text: "A - main product image".to_string(),
            kind: ImageKind::Main,
            position: 1,
            base64: None,
        });
        record.reviews.ratings_breakdown.insert(5, 70);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["meta"]["success"], false);
        assert!(value["meta"]["extractionDate"].is_string());
        assert_eq!(value["images"][0]["type"], "main");
        assert_eq!(value["images"][0]["seoFilename"], "a-main-B000000000.jpg");
        assert_eq!(value["reviews"]["ratingsBreakdown"]["5"], 70);
        assert!(value.get("affiliateUrl").is_none());

        let back: ProductRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }
}
