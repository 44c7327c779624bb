//! Axum route handlers for the CV Assistant API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::conversation::Turn;
use crate::errors::AppError;
use crate::generation::orchestrator::{generate_cv, GenerateCvRequest, GenerateCvResponse};
use crate::generation::prompts::{FORMAT_PROMPT_TEMPLATE, IMPROVE_PROMPT_TEMPLATE};
use crate::llm_client::retry::transient_overload;
use crate::llm_client::{GenerationParams, PromptPayload};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatCvRequest {
    pub cv_data: Option<Value>,
    pub style: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImproveCvRequest {
    pub cv_section: Option<String>,
    pub current_content: Option<String>,
    pub job_title: Option<String>,
    pub industry: Option<String>,
}

/// Shared response shape for the stateless helper endpoints.
#[derive(Debug, Serialize)]
pub struct TextResponse {
    pub success: bool,
    pub response: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub success: bool,
    #[serde(rename = "threadID")]
    pub thread_id: String,
    pub history: Vec<Turn>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/generate-cv (also registered at /api/generate)
///
/// Full generation flow with conversation history; see the orchestrator.
pub async fn handle_generate_cv(
    State(state): State<AppState>,
    Json(request): Json<GenerateCvRequest>,
) -> Result<Json<GenerateCvResponse>, AppError> {
    let response = generate_cv(
        state.conversations.as_ref(),
        state.llm.as_ref(),
        state.images.as_ref(),
        &state.retry,
        request,
    )
    .await?;
    Ok(Json(response))
}

/// POST /api/format-cv
///
/// One-shot formatting suggestions for the supplied CV data. Records no
/// conversation history.
pub async fn handle_format_cv(
    State(state): State<AppState>,
    Json(request): Json<FormatCvRequest>,
) -> Result<Json<TextResponse>, AppError> {
    let cv_data = request
        .cv_data
        .ok_or_else(|| AppError::Validation("cvData is required".to_string()))?;
    let style = request.style.unwrap_or_else(|| "professional".to_string());

    let cv_json = serde_json::to_string_pretty(&cv_data).unwrap_or_else(|_| cv_data.to_string());
    let prompt = FORMAT_PROMPT_TEMPLATE
        .replace("{style}", &style)
        .replace("{cv_json}", &cv_json);

    let text = call_model(&state, prompt).await?;

    Ok(Json(TextResponse {
        success: true,
        response: text,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

/// POST /api/improve-cv
///
/// One-shot improvement pass over a single CV section. Records no
/// conversation history.
pub async fn handle_improve_cv(
    State(state): State<AppState>,
    Json(request): Json<ImproveCvRequest>,
) -> Result<Json<TextResponse>, AppError> {
    let cv_section = request
        .cv_section
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::Validation("cvSection is required".to_string()))?;
    let current_content = request
        .current_content
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::Validation("currentContent is required".to_string()))?;

    let prompt = IMPROVE_PROMPT_TEMPLATE
        .replace("{cv_section}", &cv_section)
        .replace("{current_content}", &current_content)
        .replace("{job_title}", request.job_title.as_deref().unwrap_or("not specified"))
        .replace("{industry}", request.industry.as_deref().unwrap_or("not specified"));

    let text = call_model(&state, prompt).await?;

    Ok(Json(TextResponse {
        success: true,
        response: text,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

/// GET /api/conversation/:threadID
pub async fn handle_get_conversation(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
) -> Result<Json<ConversationResponse>, AppError> {
    let history = state
        .conversations
        .read(&thread_id)
        .ok_or_else(|| AppError::NotFound("Conversation not found".to_string()))?;

    Ok(Json(ConversationResponse {
        success: true,
        thread_id,
        history,
    }))
}

/// GET /api/prompt-guide
///
/// Static guidance on prompting the generation endpoints.
pub async fn handle_prompt_guide() -> Json<Value> {
    Json(json!({
        "success": true,
        "guide": {
            "basics": [
                "State the role and seniority you are targeting",
                "Include concrete achievements with numbers where you have them",
                "Mention the industry so terminology can match it"
            ],
            "examples": [
                "Write a professional summary for a senior backend engineer with 8 years of experience in fintech",
                "Turn these bullet points into achievement-focused experience entries",
                "Draft a skills section for a data analyst moving into machine learning"
            ],
            "conversation": {
                "threadID": "Pass the threadID from a previous response to continue refining the same CV",
                "clearHistory": "Set clearHistory to true to start over within the same thread"
            },
            "fields": {
                "cvData": "Free-form JSON with your existing CV content; sent to the model alongside the prompt",
                "imageUrl": "Optional URL of an image (for example an existing CV) to include in the request",
                "customPromptTemplate": "Template with {context}, {system_prompt} and {prompt} placeholders"
            }
        }
    }))
}

/// Fallback for unmatched routes.
pub async fn handle_not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "error": "Endpoint not found" })),
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Shared model invocation for the stateless endpoints
// ────────────────────────────────────────────────────────────────────────────

/// Sends a plain text prompt under the retry policy with default generation
/// parameters.
async fn call_model(state: &AppState, prompt: String) -> Result<String, AppError> {
    let llm = state.llm.as_ref();
    let payload = PromptPayload::Text(prompt);
    let params = GenerationParams::default();
    let payload = &payload;
    let params = &params;

    state
        .retry
        .execute(move || llm.generate(payload, params), transient_overload)
        .await
        .map_err(|e| {
            if transient_overload(&e) {
                AppError::Overloaded(e.to_string())
            } else {
                AppError::Generation(e.to_string())
            }
        })
}
