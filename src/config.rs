use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Configuration for a product page extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// URL for the WebDriver instance used for live pages
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Whether to click the "show more" control before extracting
    #[serde(default = "default_true")]
    pub expand: bool,

    /// How long to wait after the expansion click, in milliseconds
    #[serde(default = "default_expand_delay_ms")]
    pub expand_delay_ms: u64,

    /// Whether to fetch images and inline them as base64 data URIs
    #[serde(default = "default_true")]
    pub materialize_images: bool,

    /// Timeout for a single image fetch, in seconds
    #[serde(default = "default_image_timeout_secs")]
    pub image_timeout_secs: u64,

    /// Maximum number of thumbnails taken in addition to the main image
    #[serde(default = "default_max_additional_images")]
    pub max_additional_images: usize,

    /// User agent sent with image requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Amazon Associates tag used to build the affiliate link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associate_id: Option<String>,
}

impl ExtractorConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Apply overrides from the environment
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
        self
    }

    pub fn expand_delay(&self) -> Duration {
        Duration::from_millis(self.expand_delay_ms)
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs)
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            expand: true,
            expand_delay_ms: default_expand_delay_ms(),
            materialize_images: true,
            image_timeout_secs: default_image_timeout_secs(),
            max_additional_images: default_max_additional_images(),
            user_agent: default_user_agent(),
            associate_id: None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

/// Time for the page to re-render after the expansion click
fn default_expand_delay_ms() -> u64 {
    500
}

fn default_image_timeout_secs() -> u64 {
    15
}

fn default_max_additional_images() -> usize {
    3
}

fn default_user_agent() -> String {
    concat!("product-page/", env!("CARGO_PKG_VERSION")).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = ExtractorConfig::from_json("{}").unwrap();
        assert_eq!(config.webdriver_url, "http://localhost:4444");
        assert!(config.expand);
        assert_eq!(config.expand_delay(), Duration::from_millis(500));
        assert!(config.materialize_images);
        assert_eq!(config.max_additional_images, 3);
        assert!(config.associate_id.is_none());
    }

    #[test]
    fn test_partial_json_overrides() {
        let json = r#"{
            "materialize_images": false,
            "max_additional_images": 5,
            "associate_id": "mytag-20"
        }"#;
        let config = ExtractorConfig::from_json(json).unwrap();
        assert!(!config.materialize_images);
        assert_eq!(config.max_additional_images, 5);
        assert_eq!(config.associate_id.as_deref(), Some("mytag-20"));
        assert_eq!(config.image_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(
            ExtractorConfig::from_json("{not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
