use std::sync::Arc;

use crate::config::Config;
use crate::conversation::ConversationStore;
use crate::generation::image::ImageFetcher;
use crate::llm_client::retry::RetryPolicy;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable model client. Default: GeminiClient over generateContent.
    pub llm: Arc<dyn TextGenerator>,
    /// Process-wide conversation history. Default: in-memory MemoryStore.
    pub conversations: Arc<dyn ConversationStore>,
    pub images: Arc<dyn ImageFetcher>,
    pub retry: RetryPolicy,
    pub config: Config,
}
