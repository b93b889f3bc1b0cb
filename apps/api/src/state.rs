use std::sync::Arc;

use crate::config::Config;
use crate::handoff::Handoff;
use crate::llm_client::TextGenerator;
use crate::quiz::session::SessionRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Every generation call goes through this seam. `LlmClient` in production.
    pub llm: Arc<dyn TextGenerator>,
    /// Per-client relay for `customTest` and `testResults`. Redis or in-memory.
    pub handoff: Handoff,
    pub sessions: SessionRegistry,
    pub config: Config,
}
