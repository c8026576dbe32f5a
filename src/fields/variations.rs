use crate::chain::{Lookup, SelectorChain};
use crate::document::Document;
use crate::error::DocumentError;
use crate::record::Variations;
use std::sync::LazyLock;

static COLOR_CHAIN: LazyLock<SelectorChain> = LazyLock::new(|| {
    SelectorChain::new(
        "colors",
        vec![
            Lookup::Attr(
                "#variation_color_name ul li .swatch-image-container img, \
                 #variation_color_name ul li .imgSwatch, \
                 #inline-twister-expander-content-color_name ul li .swatch-image-container img, \
                 #inline-twister-expander-content-color_name ul li .imgSwatch",
                "alt",
            ),
            Lookup::Text("#variation_color_name select option"),
            Lookup::Text("#variation_color_name .selection"),
        ],
    )
});

static STYLE_CHAIN: LazyLock<SelectorChain> = LazyLock::new(|| {
    SelectorChain::new(
        "styles",
        vec![
            Lookup::Text(
                "#variation_style_name ul li, \
                 #inline-twister-expander-content-style_name ul li",
            ),
            Lookup::Text("#variation_style_name select option"),
            Lookup::Text("#variation_style_name .selection"),
        ],
    )
});

static SIZE_CHAIN: LazyLock<SelectorChain> = LazyLock::new(|| {
    SelectorChain::new(
        "sizes",
        vec![
            Lookup::Text(
                "#variation_size_name ul li, \
                 #inline-twister-expander-content-size_name ul li",
            ),
            Lookup::Text("#variation_size_name select option"),
            Lookup::Text("#variation_size_name .selection"),
        ],
    )
});

/// Dropdown placeholder entries such as "Select"
fn is_placeholder(option: &str) -> bool {
    option.eq_ignore_ascii_case("select")
}

/// Color, style and size options offered for the product
pub fn variations<D: Document>(doc: &D) -> Result<Variations, DocumentError> {
    let keep = |value: &str| !is_placeholder(value);
    Ok(Variations {
        colors: COLOR_CHAIN.collect_where(doc, keep)?,
        styles: STYLE_CHAIN.collect_where(doc, keep)?,
        sizes: SIZE_CHAIN.collect_where(doc, keep)?,
    })
}
