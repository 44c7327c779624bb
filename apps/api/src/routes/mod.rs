pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/test", get(health::test_handler))
        // Generation API — both route spellings point at the same handler
        .route("/api/generate", post(handlers::handle_generate_cv))
        .route("/api/generate-cv", post(handlers::handle_generate_cv))
        .route("/api/format-cv", post(handlers::handle_format_cv))
        .route("/api/improve-cv", post(handlers::handle_improve_cv))
        .route(
            "/api/conversation/:thread_id",
            get(handlers::handle_get_conversation),
        )
        .route("/api/prompt-guide", get(handlers::handle_prompt_guide))
        .fallback(handlers::handle_not_found)
        .with_state(state)
}
