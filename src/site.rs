use crate::chain::structured_data;
use crate::document::{Document, first_matching};
use crate::error::DocumentError;
use crate::fields::core::ASIN_PATH_RES;
use crate::record::SiteInfo;
use serde_json::Value;
use url::Url;

/// Amazon storefront hosts and their marketplace codes
const MARKETPLACES: &[(&str, &str)] = &[
    ("www.amazon.com", "US"),
    ("www.amazon.co.uk", "UK"),
    ("www.amazon.de", "DE"),
    ("www.amazon.fr", "FR"),
    ("www.amazon.it", "IT"),
    ("www.amazon.es", "ES"),
    ("www.amazon.co.jp", "JP"),
    ("www.amazon.ca", "CA"),
    ("www.amazon.com.au", "AU"),
    ("www.amazon.in", "IN"),
    ("www.amazon.com.mx", "MX"),
    ("www.amazon.com.br", "BR"),
];

/// Elements that only appear on product detail pages
const PRODUCT_PAGE_MARKERS: &[&str] = &[
    "#productTitle",
    "#title",
    "#dp",
    "#ppd",
    "#centerCol",
    "#buybox",
    "#addToCart",
    "#add-to-cart-button",
    "#productDescription",
    "#feature-bullets",
    "#acrCustomerReviewText",
    "#landingImage",
    "#imgBlkFront",
];

/// Marketplace info for a page host. Unlisted hosts get the "Unknown" locale.
pub fn site_info(url: &Url) -> SiteInfo {
    let domain = url.host_str().unwrap_or_default();
    MARKETPLACES
        .iter()
        .find(|(host, _)| host_matches(domain, host))
        .map(|(host, locale)| SiteInfo {
            domain: domain.to_string(),
            locale: locale.to_string(),
            full_domain: host.to_string(),
        })
        .unwrap_or_else(|| SiteInfo::unknown(domain))
}

/// Currency symbol implied by the host's domain suffix, "$" when unknown
pub fn default_currency(host: &str) -> &'static str {
    let host = host.trim_end_matches('.');
    if host.ends_with(".co.uk") {
        "£"
    } else if host.ends_with(".de")
        || host.ends_with(".fr")
        || host.ends_with(".it")
        || host.ends_with(".es")
    {
        "€"
    } else if host.ends_with(".co.jp") {
        "¥"
    } else if host.ends_with(".ca") {
        "CA$"
    } else if host.ends_with(".com.au") {
        "AU$"
    } else {
        "$"
    }
}

/// Whether the host is one of the known Amazon storefronts
pub fn is_amazon_host(host: &str) -> bool {
    MARKETPLACES
        .iter()
        .any(|(marketplace, _)| host_matches(host, marketplace))
}

/// `host` is the marketplace host or one of its subdomains
fn host_matches(host: &str, marketplace: &str) -> bool {
    let bare = marketplace.trim_start_matches("www.");
    host == bare || host.ends_with(&format!(".{}", bare))
}

/// Whether the document looks like an Amazon product detail page
pub fn is_product_page<D: Document>(doc: &D) -> Result<bool, DocumentError> {
    let url = doc.location()?;
    if !is_amazon_host(url.host_str().unwrap_or_default()) {
        return Ok(false);
    }

    if ASIN_PATH_RES.iter().any(|re| re.is_match(url.path())) {
        return Ok(true);
    }

    for marker in PRODUCT_PAGE_MARKERS {
        if !first_matching(doc, &[*marker])?.is_empty() {
            return Ok(true);
        }
    }

    let asin_inputs = first_matching(doc, &[r#"input[name="ASIN"]"#])?;
    if asin_inputs
        .iter()
        .any(|el| el.value().attr("value").is_some_and(|v| !v.is_empty()))
    {
        return Ok(true);
    }

    let tagged = first_matching(doc, &["[data-asin]"])?;
    if tagged
        .iter()
        .any(|el| el.value().attr("data-asin").is_some_and(|v| v.len() == 10))
    {
        return Ok(true);
    }

    Ok(structured_data(doc)?.iter().any(|data| {
        data.get("@type").and_then(Value::as_str) == Some("Product")
            || data.get("sku").is_some()
            || data.get("productID").is_some()
    }))
}

/// Affiliate link for a product on the given storefront
pub fn affiliate_url(site: &SiteInfo, asin: &str, associate_id: &str) -> String {
    let host = if site.locale == "Unknown" {
        "www.amazon.com"
    } else {
        site.full_domain.as_str()
    };
    format!("https://{}/dp/{}?tag={}", host, asin, associate_id)
}
