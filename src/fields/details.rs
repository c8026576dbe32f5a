use crate::chain::SelectorChain;
use crate::document::{Document, element_text, first_matching, first_within, select_within};
use crate::error::DocumentError;
use crate::utils::normalize_text;
use scraper::ElementRef;
use std::collections::BTreeMap;
use std::sync::LazyLock;

const OVERVIEW_ROWS: &str = "#productOverview_feature_div table tr";
const DETAIL_BULLETS: &str = "#detailBullets_feature_div .a-list-item";
const TECH_SPEC_ROWS: &str = "#productDetails_techSpec_section_1 tr, \
                              #productDetails_techSpec_section_2 tr, \
                              #prodDetails .a-keyvalue";
const DETAIL_BULLETS_WRAPPER: &str = "#detailBulletsWrapper_feature_div .a-list-item";

static FEATURE_CHAIN: LazyLock<SelectorChain> = LazyLock::new(|| {
    SelectorChain::text(
        "features",
        &[
            "#feature-bullets .a-list-item, #featurebullets_feature_div .a-list-item",
            "#productDescription p",
        ],
    )
});

static DESCRIPTION_CHAIN: LazyLock<SelectorChain> = LazyLock::new(|| {
    SelectorChain::text(
        "description",
        &[
            "#productDescription",
            "#product-description",
            ".product-description",
            r#"[data-feature-name="productDescription"]"#,
        ],
    )
});

/// Text with direction marks removed and whitespace normalized
fn clean_value(value: &str) -> String {
    let stripped: String = value
        .chars()
        .filter(|c| !matches!(c, '\u{200e}' | '\u{200f}'))
        .collect();
    normalize_text(&stripped)
}

/// Like [`clean_value`], also dropping a trailing colon
fn clean_label(label: &str) -> String {
    clean_value(label).trim_end_matches(':').trim_end().to_string()
}

/// Splits "Label : value" at the first colon
fn split_bullet(text: &str) -> Option<(String, String)> {
    let (label, value) = text.split_once(':')?;
    Some((clean_label(label), clean_value(value)))
}

/// Label and value cells of a table row
fn row_pair(row: ElementRef<'_>, label_css: &str, value_css: &str) -> Option<(String, String)> {
    let label = first_within(row, label_css)?;
    let value = first_within(row, value_css)?;
    Some((clean_label(&element_text(label)), clean_value(&element_text(value))))
}

fn overview_pair(row: ElementRef<'_>) -> Option<(String, String)> {
    let mut cells = select_within(row, "td").into_iter();
    let label = cells.next()?;
    let value = cells.next()?;
    Some((clean_label(&element_text(label)), clean_value(&element_text(value))))
}

/// Merges attribute pairs; the first value seen for a label wins
fn merge(details: &mut BTreeMap<String, String>, pairs: impl IntoIterator<Item = (String, String)>) {
    for (label, value) in pairs {
        if label.is_empty() || value.is_empty() {
            continue;
        }
        details.entry(label).or_insert(value);
    }
}

/// Product attributes from the overview table, detail bullets and
/// technical specification tables
pub fn details<D: Document>(doc: &D) -> Result<BTreeMap<String, String>, DocumentError> {
    let mut details = BTreeMap::new();

    let overview = first_matching(doc, &[OVERVIEW_ROWS])?;
    merge(&mut details, overview.into_iter().filter_map(overview_pair));

    let bullets = first_matching(doc, &[DETAIL_BULLETS])?;
    merge(
        &mut details,
        bullets
            .into_iter()
            .filter_map(|bullet| split_bullet(&element_text(bullet))),
    );

    let specs = first_matching(doc, &[TECH_SPEC_ROWS])?;
    merge(
        &mut details,
        specs
            .into_iter()
            .filter_map(|row| row_pair(row, "th, .a-span3", "td, .a-span9")),
    );

    let wrapper = first_matching(doc, &[DETAIL_BULLETS_WRAPPER])?;
    merge(
        &mut details,
        wrapper
            .into_iter()
            .filter_map(|bullet| split_bullet(&element_text(bullet))),
    );

    if details.is_empty() {
        ::log::debug!("details not found");
    }
    Ok(details)
}

/// "About this item" bullets, falling back to description paragraphs
pub fn features<D: Document>(doc: &D) -> Result<Vec<String>, DocumentError> {
    FEATURE_CHAIN.collect(doc)
}

pub fn description<D: Document>(doc: &D) -> Result<Option<String>, DocumentError> {
    DESCRIPTION_CHAIN.first(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_label() {
        assert_eq!(clean_label("Manufacturer \u{200f} : \u{200e}"), "Manufacturer");
        assert_eq!(clean_label("  Item Weight: "), "Item Weight");
    }

    #[test]
    fn test_split_bullet_keeps_later_colons() {
        assert_eq!(
            split_bullet("Date First Available \u{200f} : \u{200e} 12:30 Jan 1"),
            Some(("Date First Available".to_string(), "12:30 Jan 1".to_string()))
        );
        assert_eq!(split_bullet("no separator"), None);
    }

    #[test]
    fn test_merge_first_seen_wins() {
        let mut details = BTreeMap::new();
        merge(
            &mut details,
            vec![
                ("Brand".to_string(), "Acme".to_string()),
                ("Brand".to_string(), "Other".to_string()),
                ("Color".to_string(), String::new()),
                (String::new(), "orphan".to_string()),
            ],
        );
        assert_eq!(details.len(), 1);
        assert_eq!(details["Brand"], "Acme");
    }
}
