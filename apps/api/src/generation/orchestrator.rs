//! CV generation: orchestrates the end-to-end request flow.
//!
//! Flow: validate -> optional image fetch/encode -> resolve thread (clearing
//! first if asked) -> compose prompt -> model call under retry -> record
//! turn pair -> respond.
//!
//! History is only written after the model call succeeds, so a failed
//! request never leaves a partial turn pair behind.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::conversation::{ConversationStore, Speaker};
use crate::errors::AppError;
use crate::generation::composer::{compose, user_input};
use crate::generation::image::{encode_image, ImageFetcher};
use crate::generation::prompts::CV_SYSTEM_PROMPT;
use crate::llm_client::retry::{transient_overload, RetryPolicy};
use crate::llm_client::{GenerationParams, TextGenerator};

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1500
}

/// Request body for CV generation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCvRequest {
    pub prompt: Option<String>,
    pub cv_data: Option<Value>,
    #[serde(rename = "threadID")]
    pub thread_id: Option<String>,
    pub image_url: Option<String>,
    pub custom_prompt_template: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub clear_history: bool,
}

/// Successful generation response.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateCvResponse {
    pub success: bool,
    pub response: String,
    pub timestamp: String,
    #[serde(rename = "threadID")]
    pub thread_id: String,
}

/// Runs the full generation flow against the given collaborators.
pub async fn generate_cv(
    store: &dyn ConversationStore,
    generator: &dyn TextGenerator,
    images: &dyn ImageFetcher,
    retry: &RetryPolicy,
    request: GenerateCvRequest,
) -> Result<GenerateCvResponse, AppError> {
    // Step 1: Validate. A prompt or CV data must be present.
    let prompt = request.prompt.as_deref().filter(|p| !p.trim().is_empty());
    if prompt.is_none() && request.cv_data.is_none() {
        return Err(AppError::Validation(
            "Either prompt or cvData is required".to_string(),
        ));
    }

    // Step 2: Optional image fetch and encode. Failure short-circuits
    // before the thread is touched and before any model call.
    let image = match &request.image_url {
        Some(url) => {
            let bytes = images
                .fetch(url)
                .await
                .map_err(|e| AppError::ImageProcessing(e.to_string()))?;
            info!("Fetched image ({} bytes) from {url}", bytes.len());
            Some(encode_image(&bytes))
        }
        None => None,
    };

    // Step 3: Resolve the thread, clearing first if asked so the cleared
    // history contributes no context to this request.
    let thread_id = store.get_or_create(request.thread_id.as_deref());
    if request.clear_history {
        info!("Clearing history for thread {thread_id}");
        store.clear(&thread_id);
    }

    // Step 4: Compose the prompt.
    let input = user_input(prompt, request.cv_data.as_ref());
    let context = store.render_context(&thread_id);
    let system_prompt = request.system_prompt.as_deref().unwrap_or(CV_SYSTEM_PROMPT);
    let payload = compose(
        &input,
        &context,
        system_prompt,
        request.custom_prompt_template.as_deref(),
        image,
    );

    // Step 5: Model call under the retry policy. Exhausted overloads map to
    // 503, everything else from the provider to 500.
    let params = GenerationParams {
        temperature: request.temperature,
        max_output_tokens: request.max_tokens,
    };
    let payload = &payload;
    let params = &params;
    let response_text = retry
        .execute(move || generator.generate(payload, params), transient_overload)
        .await
        .map_err(|e| {
            if transient_overload(&e) {
                AppError::Overloaded(e.to_string())
            } else {
                AppError::Generation(e.to_string())
            }
        })?;

    // Step 6: Record the turn pair. The user turn is the raw prompt, or the
    // serialized CV data when no prompt was given.
    let user_turn = match prompt {
        Some(p) => p.to_string(),
        None => request
            .cv_data
            .as_ref()
            .map(|d| d.to_string())
            .unwrap_or_default(),
    };
    store.append(&thread_id, Speaker::User, user_turn);
    store.append(&thread_id, Speaker::Assistant, response_text.clone());

    info!("Generated response for thread {thread_id}");

    Ok(GenerateCvResponse {
        success: true,
        response: response_text,
        timestamp: Utc::now().to_rfc3339(),
        thread_id,
    })
}
