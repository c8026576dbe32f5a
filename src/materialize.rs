use crate::config::ExtractorConfig;
use crate::error::MaterializeError;
use crate::record::ProductImage;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::future::join_all;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;

/// Content type assumed when the server does not send one
const FALLBACK_CONTENT_TYPE: &str = "image/jpeg";

/// Fetches product images and inlines them as `data:` URIs
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: Client,
}

impl ImageFetcher {
    pub fn new(config: &ExtractorConfig) -> Result<Self, MaterializeError> {
        let client = Client::builder()
            .timeout(config.image_timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }

    /// Fetches `url` once and encodes the body as a base64 data URI
    pub async fn fetch(&self, url: &str) -> Result<String, MaterializeError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MaterializeError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();
        let body = response.bytes().await?;

        ::log::debug!("Fetched {} bytes of {} from {}", body.len(), content_type, url);
        Ok(format!("data:{};base64,{}", content_type, STANDARD.encode(&body)))
    }

    /// Like [`fetch`](Self::fetch), but a failure only logs a warning
    pub async fn materialize(&self, url: &str) -> Option<String> {
        match self.fetch(url).await {
            Ok(data_uri) => Some(data_uri),
            Err(e) => {
                ::log::warn!("Could not inline image {}: {}", url, e);
                None
            }
        }
    }

    /// Inlines every image concurrently. Images keep their order and
    /// failed ones keep `base64: None`.
    pub async fn materialize_all(&self, images: &mut [ProductImage]) {
        let fetched = join_all(images.iter().map(|image| self.materialize(&image.url))).await;
        for (image, base64) in images.iter_mut().zip(fetched) {
            image.base64 = base64;
        }
    }
}
