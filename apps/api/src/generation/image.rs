//! Image fetch and transport encoding for image-bearing generation requests.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use thiserror::Error;

use crate::llm_client::EncodedImage;

const FETCH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Media type sent with every encoded image, regardless of the actual
/// fetched format. Known limitation of the transport contract.
const IMAGE_MEDIA_TYPE: &str = "image/jpeg";

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image download failed: {0}")]
    DownloadFailed(String),
}

/// Seam for retrieving raw image bytes from a caller-supplied URL.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes, ImageError>;
}

/// Fetches over HTTP with a bounded total timeout. No retry at this layer:
/// a failed download means a bad caller-supplied URL, not provider overload.
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

impl Default for HttpImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, ImageError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ImageError::DownloadFailed(e.to_string()))?
            .error_for_status()
            .map_err(|e| ImageError::DownloadFailed(e.to_string()))?;

        response
            .bytes()
            .await
            .map_err(|e| ImageError::DownloadFailed(e.to_string()))
    }
}

/// Converts raw image bytes into the transport encoding for the model call.
pub fn encode_image(bytes: &[u8]) -> EncodedImage {
    EncodedImage {
        data: STANDARD.encode(bytes),
        media_type: IMAGE_MEDIA_TYPE,
    }
}
