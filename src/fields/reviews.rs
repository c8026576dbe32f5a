use crate::chain::{Lookup, SelectorChain};
use crate::document::{Document, element_text, first_matching, first_within};
use crate::error::DocumentError;
use crate::record::{QuestionAnswer, Rating, Review, Reviews};
use crate::utils::{parse_count, parse_number, parse_percent};
use regex::Regex;
use scraper::ElementRef;
use std::collections::BTreeMap;
use std::sync::LazyLock;

const MAX_TOP_REVIEWS: usize = 5;
const MAX_QUESTIONS: usize = 10;
const ANONYMOUS: &str = "Anonymous";

const HISTOGRAM_ROWS: &[&str] = &["#histogramTable .a-histogram-row", "#histogramTable tr"];
const REVIEW_BLOCKS: &str = "#cm-cr-dp-review-list .review, #customer-reviews-content .review";
const QUESTION_BLOCKS: &str =
    "#ask-btf-container .a-fixed-left-grid, .askTeaserQuestions .a-fixed-left-grid";
const ANSWER_TEXT: &str = ".a-fixed-left-grid-col.a-col-right .a-spacing-small:not(.a-text-bold)";

static AVERAGE_CHAIN: LazyLock<SelectorChain> = LazyLock::new(|| {
    SelectorChain::new(
        "average rating",
        vec![
            Lookup::TitleOrText("#acrPopover, .a-star-medium-4"),
            Lookup::Text("#averageCustomerReviews .a-icon-alt"),
        ],
    )
});

static COUNT_CHAIN: LazyLock<SelectorChain> = LazyLock::new(|| {
    SelectorChain::text(
        "rating count",
        &[
            "#acrCustomerReviewText, #ratings-count",
            "#averageCustomerReviews_feature_div .a-size-base",
        ],
    )
});

static STAR_LEVEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([1-5])\s*star").expect("valid star level regex"));
static PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,3})\s*%").expect("valid percent regex"));

/// Average star rating and number of ratings, 0 when not shown
pub fn rating<D: Document>(doc: &D) -> Result<Rating, DocumentError> {
    Ok(Rating {
        average: AVERAGE_CHAIN.first_map(doc, parse_number)?.unwrap_or(0.0),
        count: COUNT_CHAIN.first_map(doc, parse_count)?.unwrap_or(0),
    })
}

/// Star level and percentage of one histogram row, e.g. "4 star 12%"
fn histogram_row(text: &str) -> Option<(u8, u8)> {
    let level = STAR_LEVEL_RE.captures(text)?.get(1)?.as_str().parse::<u8>().ok()?;
    let percent = parse_percent(PERCENT_RE.captures(text)?.get(1)?.as_str())?;
    Some((level, percent))
}

/// Percentage of ratings per star level. All five levels are present, rows
/// the page does not show count as 0.
pub fn ratings_breakdown<D: Document>(doc: &D) -> Result<BTreeMap<u8, u8>, DocumentError> {
    let mut breakdown: BTreeMap<u8, u8> = (1..=5).map(|level| (level, 0)).collect();
    for row in first_matching(doc, HISTOGRAM_ROWS)? {
        if let Some((level, percent)) = histogram_row(&element_text(row)) {
            breakdown.insert(level, percent);
        }
    }
    Ok(breakdown)
}

fn text_of(block: ElementRef<'_>, css: &str) -> Option<String> {
    first_within(block, css)
        .map(element_text)
        .filter(|text| !text.is_empty())
}

fn review(block: ElementRef<'_>) -> Option<Review> {
    let title = text_of(block, ".review-title")?;
    let text = text_of(block, ".review-text")?;
    Some(Review {
        title,
        text,
        rating: text_of(block, ".review-rating")
            .and_then(|r| parse_number(&r))
            .unwrap_or(0.0),
        author: text_of(block, ".a-profile-name").unwrap_or_else(|| ANONYMOUS.to_string()),
        date: text_of(block, ".review-date").unwrap_or_default(),
    })
}

/// Up to five reviews shown on the product page. Reviews missing a title or
/// body are skipped.
pub fn top_reviews<D: Document>(doc: &D) -> Result<Vec<Review>, DocumentError> {
    Ok(first_matching(doc, &[REVIEW_BLOCKS])?
        .into_iter()
        .filter_map(review)
        .take(MAX_TOP_REVIEWS)
        .collect())
}

pub fn reviews<D: Document>(doc: &D) -> Result<Reviews, DocumentError> {
    Ok(Reviews {
        ratings_breakdown: ratings_breakdown(doc)?,
        top_reviews: top_reviews(doc)?,
    })
}

/// Customer questions with their top answer, at most ten
pub fn questions<D: Document>(doc: &D) -> Result<Vec<QuestionAnswer>, DocumentError> {
    let mut found: Vec<QuestionAnswer> = Vec::new();
    for block in first_matching(doc, &[QUESTION_BLOCKS])? {
        let (Some(question), Some(answer)) =
            (text_of(block, ".a-text-bold"), text_of(block, ANSWER_TEXT))
        else {
            continue;
        };
        let pair = QuestionAnswer { question, answer };
        // Question grids nest, so the same pair can match twice
        if !found.contains(&pair) {
            found.push(pair);
        }
        if found.len() >= MAX_QUESTIONS {
            break;
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::HtmlDocument;

    #[test]
    fn test_histogram_row() {
        assert_eq!(histogram_row("5 star 72%"), Some((5, 72)));
        assert_eq!(histogram_row("1 Star 3 %"), Some((1, 3)));
        assert_eq!(histogram_row("5 star"), None);
        assert_eq!(histogram_row("Reviews 40%"), None);
    }

    #[test]
    fn test_breakdown_defaults_missing_rows() {
        let doc = HtmlDocument::parse(
            "https://www.amazon.com/dp/B000000000",
            r#"<table id="histogramTable">
                 <tr class="a-histogram-row"><td class="a-text-left">5 star</td><td class="a-text-right">80%</td></tr>
                 <tr class="a-histogram-row"><td class="a-text-left">1 star</td><td class="a-text-right">20%</td></tr>
               </table>"#,
        )
        .unwrap();
        let breakdown = ratings_breakdown(&doc).unwrap();
        assert_eq!(breakdown.len(), 5);
        assert_eq!(breakdown[&5], 80);
        assert_eq!(breakdown[&4], 0);
        assert_eq!(breakdown[&1], 20);
    }

    #[test]
    fn test_reviews_require_title_and_body() {
        let doc = HtmlDocument::parse(
            "https://www.amazon.com/dp/B000000000",
            r#"<div id="cm-cr-dp-review-list">
                 <div class="review">
                   <span class="review-title">Great</span>
                   <span class="review-text">Works well</span>
                   <i class="review-rating">5.0 out of 5 stars</i>
                 </div>
                 <div class="review"><span class="review-title">No body</span></div>
               </div>"#,
        )
        .unwrap();
        let reviews = top_reviews(&doc).unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].rating, 5.0);
        assert_eq!(reviews[0].author, "Anonymous");
        assert_eq!(reviews[0].date, "");
    }

    #[test]
    fn test_top_reviews_are_capped() {
        let blocks: String = (1..=8)
            .map(|n| {
                format!(
                    r#"<div class="review">
                         <span class="review-title">Review {n}</span>
                         <span class="review-text">Body {n}</span>
                       </div>"#
                )
            })
            .collect();
        let html = format!(r#"<div id="cm-cr-dp-review-list">{blocks}</div>"#);
        let doc = HtmlDocument::parse("https://www.amazon.com/dp/B000000000", &html).unwrap();

        let reviews = top_reviews(&doc).unwrap();
        assert_eq!(reviews.len(), MAX_TOP_REVIEWS);
        assert_eq!(reviews[0].title, "Review 1");
        assert_eq!(reviews[4].title, "Review 5");
    }

    #[test]
    fn test_questions_are_capped() {
        let blocks: String = (1..=12)
            .map(|n| {
                format!(
                    r#"<div class="a-fixed-left-grid">
                         <div class="a-fixed-left-grid-col a-col-right">
                           <div class="a-spacing-small a-text-bold">Question {n}?</div>
                           <div class="a-spacing-small">Answer {n}</div>
                         </div>
                       </div>"#
                )
            })
            .collect();
        let html = format!(r#"<div id="ask-btf-container">{blocks}</div>"#);
        let doc = HtmlDocument::parse("https://www.amazon.com/dp/B000000000", &html).unwrap();

        let found = questions(&doc).unwrap();
        assert_eq!(found.len(), MAX_QUESTIONS);
        assert_eq!(found[0].question, "Question 1?");
        assert_eq!(found[0].answer, "Answer 1");
        assert_eq!(found[9].question, "Question 10?");
    }

    #[test]
    fn test_rating_prefers_title_attribute() {
        let doc = HtmlDocument::parse(
            "https://www.amazon.com/dp/B000000000",
            r#"<span id="acrPopover" title="4.6 out of 5 stars">See all</span>
               <span id="acrCustomerReviewText">12,345 ratings</span>"#,
        )
        .unwrap();
        let rating = rating(&doc).unwrap();
        assert_eq!(rating.average, 4.6);
        assert_eq!(rating.count, 12345);
    }
}
