//! Gemini client, the single point of entry for all model calls.
//!
//! ARCHITECTURAL RULE: no other module may call the provider API directly.
//! All model interactions MUST go through this module. Retry/backoff lives
//! in [`retry`] and is wrapped around calls by the orchestration layer, not
//! inside the client.

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

pub mod retry;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Generation parameters forwarded to the provider's `generationConfig`.
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 1500,
        }
    }
}

/// Base64 image data plus its transport media type.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub data: String,
    pub media_type: &'static str,
}

/// What gets sent to the model: a single text blob, or the ordered
/// three-part form `[lead text, image, user text]` for image requests.
#[derive(Debug, Clone)]
pub enum PromptPayload {
    Text(String),
    Multipart {
        lead_text: String,
        image: EncodedImage,
        user_text: String,
    },
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("model returned no text content")]
    EmptyContent,
}

/// Seam for the external model call so orchestration can be exercised
/// against scripted implementations in tests.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        payload: &PromptPayload,
        params: &GenerationParams,
    ) -> Result<String, ProviderError>;
}

/// Client for the Gemini `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            model,
        }
    }

    fn api_url(&self) -> String {
        format!("{}/{}:generateContent", GEMINI_API_BASE, self.model)
    }

    /// Builds the JSON request body for the `generateContent` call.
    fn build_request_body(
        payload: &PromptPayload,
        params: &GenerationParams,
    ) -> serde_json::Value {
        let parts = match payload {
            PromptPayload::Text(text) => vec![serde_json::json!({ "text": text })],
            PromptPayload::Multipart {
                lead_text,
                image,
                user_text,
            } => vec![
                serde_json::json!({ "text": lead_text }),
                serde_json::json!({
                    "inlineData": { "mimeType": image.media_type, "data": image.data }
                }),
                serde_json::json!({ "text": user_text }),
            ],
        };

        serde_json::json!({
            "contents": [{ "role": "user", "parts": parts }],
            "generationConfig": {
                "temperature": params.temperature,
                "maxOutputTokens": params.max_output_tokens,
            }
        })
    }

    /// Concatenates the text parts of the first candidate.
    fn parse_response(json: serde_json::Value) -> Result<String, ProviderError> {
        let parts = json["candidates"]
            .as_array()
            .and_then(|c| c.first())
            .and_then(|c| c["content"]["parts"].as_array())
            .cloned()
            .unwrap_or_default();

        let mut text = String::new();
        for part in &parts {
            if let Some(t) = part["text"].as_str() {
                text.push_str(t);
            }
        }

        if text.is_empty() {
            return Err(ProviderError::EmptyContent);
        }
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(
        &self,
        payload: &PromptPayload,
        params: &GenerationParams,
    ) -> Result<String, ProviderError> {
        let body = Self::build_request_body(payload, params);

        debug!(model = %self.model, "Gemini API request");

        let response = self
            .client
            .post(self.api_url())
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let json: serde_json::Value = response.json().await?;
        Self::parse_response(json)
    }
}
