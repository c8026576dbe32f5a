pub mod chain;
pub mod config;
pub mod document;
pub mod error;
pub mod extractor;
pub mod fields;
pub mod materialize;
pub mod record;
pub mod site;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::ExtractorConfig;
pub use document::{BrowserDocument, Document, HtmlDocument};
pub use error::Error;
pub use extractor::ProductPageExtractor;
pub use record::ProductRecord;

use std::path::PathBuf;

/// Where a product page is loaded from
#[derive(Debug, Clone)]
pub enum PageSource {
    /// A live page opened through WebDriver
    Web(String),
    /// A saved HTML file, with the URL it was served from
    File { path: PathBuf, url: String },
}

/// Builder that loads a product page and extracts its record
pub struct ProductPage {
    source: PageSource,
    config: ExtractorConfig,
}

impl ProductPage {
    /// Create a new builder for the given page source
    pub fn new(source: PageSource) -> Self {
        Self {
            source,
            config: ExtractorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a file
    pub fn with_config_file(self, path: impl AsRef<std::path::Path>) -> Result<Self, Error> {
        let config = ExtractorConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Load configuration from a string
    pub fn with_config_str(self, config_str: &str) -> Result<Self, Error> {
        let config = ExtractorConfig::from_json(config_str)?;
        Ok(self.with_config(config))
    }

    /// Skip fetching images as base64 data URIs
    pub fn without_images(mut self) -> Self {
        self.config.materialize_images = false;
        self
    }

    /// Build affiliate links with this Amazon Associates tag
    pub fn with_associate_id(mut self, associate_id: impl Into<String>) -> Self {
        self.config.associate_id = Some(associate_id.into());
        self
    }

    /// Load the page and extract its record.
    ///
    /// Errors only cover loading the page. Once loaded, extraction always
    /// yields a record and reports problems in `meta`.
    pub async fn extract(self) -> Result<ProductRecord, Error> {
        let config = self.config.with_env_overrides();
        let extractor = ProductPageExtractor::new(config)?;

        match self.source {
            PageSource::Web(url) => {
                let client = document::browser::connect(&extractor.config().webdriver_url).await?;
                let mut doc = BrowserDocument::open(client, &url).await?;
                let record = extractor.extract(&mut doc).await;
                if let Err(e) = doc.close().await {
                    ::log::warn!("Failed to close WebDriver session: {}", e);
                }
                Ok(record)
            }
            PageSource::File { path, url } => {
                ::log::debug!("Reading {} as {}", path.display(), url);
                let html = std::fs::read_to_string(&path)?;
                let mut doc = HtmlDocument::parse(&url, &html)?;
                Ok(extractor.extract(&mut doc).await)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_extract_from_file() {
        let path = std::env::temp_dir().join(format!("product-page-{}.html", std::process::id()));
        std::fs::write(
            &path,
            r#"<span id="productTitle">Widget Pro</span>
               <span class="a-price"><span class="a-offscreen">$19.99</span></span>"#,
        )
        .unwrap();

        let record = ProductPage::new(PageSource::File {
            path: path.clone(),
            url: "https://www.amazon.com/dp/B000000000".to_string(),
        })
        .without_images()
        .with_associate_id("widgets-20")
        .extract()
        .await
        .unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(record.meta.success);
        assert_eq!(record.title, "Widget Pro");
        assert_eq!(
            record.affiliate_url.as_deref(),
            Some("https://www.amazon.com/dp/B000000000?tag=widgets-20")
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let result = ProductPage::new(PageSource::File {
            path: PathBuf::from("/nonexistent/product-page.html"),
            url: "https://www.amazon.com/dp/B000000000".to_string(),
        })
        .extract()
        .await;
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_with_config_str() {
        let page = ProductPage::new(PageSource::Web("https://www.amazon.com/dp/B000000000".into()))
            .with_config_str(r#"{"expand": false, "max_additional_images": 5}"#)
            .unwrap();
        assert!(!page.config.expand);
        assert_eq!(page.config.max_additional_images, 5);
        assert!(page.config.materialize_images);
    }
}
