use crate::document::{Document, has_ancestor_class, parse_selector};
use crate::error::DocumentError;
use crate::record::{ImageKind, ProductImage};
use crate::utils::{high_res_image_url, seo_alt_text, seo_filename};
use scraper::ElementRef;
use serde_json::{Map, Value};
use url::Url;

const MAIN_IMAGE_SELECTORS: &[&str] = &[
    "#landingImage",
    "#imgBlkFront",
    "#main-image",
    ".a-dynamic-image",
    "#ebooksImgBlkFront",
];

const THUMBNAIL_SELECTORS: &[&str] = &[
    ".imageThumbnail img",
    "#altImages .a-button-thumbnail img",
    ".item-thumbnails img",
    "#imageBlock .image.item img",
    "#imageBlockThumbs .a-list-item img",
];

const VIDEO_THUMBNAIL_CLASS: &str = "videoThumbnail";

/// URL with the largest `width * height` in a `data-a-dynamic-image` map
/// (`{"url": [width, height], ...}`). Ties keep the first URL seen.
pub fn best_dynamic_image(json: &str) -> Option<String> {
    let map: Map<String, Value> = match serde_json::from_str(json) {
        Ok(map) => map,
        Err(e) => {
            ::log::debug!("Ignoring malformed dynamic image map: {}", e);
            return None;
        }
    };

    let mut best: Option<(&str, f64)> = None;
    for (url, dims) in &map {
        let area = match dims.as_array().map(Vec::as_slice) {
            Some([width, height, ..]) => {
                width.as_f64().unwrap_or(0.0) * height.as_f64().unwrap_or(0.0)
            }
            _ => 0.0,
        };
        if best.is_none_or(|(_, best_area)| area > best_area) {
            best = Some((url.as_str(), area));
        }
    }
    best.map(|(url, _)| url.to_string())
}

/// Highest resolution URL an image element offers, resolved against the page URL
fn image_element_url(element: ElementRef<'_>, base: &Url) -> Option<String> {
    let attrs = element.value();
    let url = attrs
        .attr("data-a-dynamic-image")
        .and_then(best_dynamic_image)
        .or_else(|| non_empty(attrs.attr("data-old-hires")))
        .or_else(|| non_empty(attrs.attr("src")))?;
    resolve(base, &url)
}

/// Absolute full resolution form of a possibly relative image URL
fn resolve(base: &Url, url: &str) -> Option<String> {
    match base.join(url) {
        Ok(absolute) => Some(high_res_image_url(absolute.as_str())),
        Err(e) => {
            ::log::debug!("Skipping unresolvable image URL {:?}: {}", url, e);
            None
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Full resolution URL of the main product image
pub fn main_image_url<D: Document>(doc: &D) -> Result<Option<String>, DocumentError> {
    let base = doc.location()?;
    for css in MAIN_IMAGE_SELECTORS {
        let Some(selector) = parse_selector(css) else {
            continue;
        };
        if let Some(url) = doc.select(&selector)?.into_iter()
            .find_map(|element| image_element_url(element, &base))
        {
            return Ok(Some(url));
        }
    }
    ::log::debug!("main image not found");
    Ok(None)
}

/// Full resolution URLs of gallery thumbnails, skipping videos and anything in `seen`
pub fn additional_image_urls<D: Document>(
    doc: &D,
    max: usize,
    seen: &[String],
) -> Result<Vec<String>, DocumentError> {
    let mut urls: Vec<String> = Vec::new();
    if max == 0 {
        return Ok(urls);
    }
    let base = doc.location()?;

    for css in THUMBNAIL_SELECTORS {
        let Some(selector) = parse_selector(css) else {
            continue;
        };
        let thumbnails = doc.select(&selector)?;
        if thumbnails.is_empty() {
            continue;
        }

        for thumbnail in thumbnails {
            if has_ancestor_class(thumbnail, VIDEO_THUMBNAIL_CLASS) {
                continue;
            }
            let Some(url) = non_empty(thumbnail.value().attr("src"))
                .and_then(|src| resolve(&base, &src))
            else {
                continue;
            };
            if seen.contains(&url) || urls.contains(&url) {
                continue;
            }
            urls.push(url);
            if urls.len() >= max {
                break;
            }
        }
        break;
    }
    Ok(urls)
}

/// Builds image records in output order. Positions are 1-based and follow
/// the order of the returned list.
pub fn image_records(
    title: &str,
    asin: &str,
    main: Option<String>,
    additional: Vec<String>,
) -> Vec<ProductImage> {
    let main = main.map(|url| {
        (
            url,
            ImageKind::Main,
            "main".to_string(),
            "main product image".to_string(),
        )
    });
    let additional = additional.into_iter().enumerate().map(|(i, url)| {
        (
            url,
            ImageKind::Additional,
            format!("additional-{}", i + 1),
            format!("additional view {}", i + 1),
        )
    });

    main.into_iter()
        .chain(additional)
        .enumerate()
        .map(|(index, (url, kind, tag, description))| ProductImage {
            url,
            seo_filename: seo_filename(title, asin, &tag),
            seo_alt_text: seo_alt_text(title, &description),
            kind,
            position: index + 1,
            base64: None,
        })
        .collect()
}
