use std::sync::Arc;

use sqlx::PgPool;

use crate::ats::cache::JdCache;
use crate::ats::responsibilities::ResponsibilityMatcher;
use crate::config::Config;
use crate::llm_client::LlmBackend;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Anthropic client in production; scripted backends in tests.
    pub llm: Arc<dyn LlmBackend>,
    /// Pluggable responsibility matcher. Swap via RESPONSIBILITY_MATCHER env.
    pub matcher: Arc<dyn ResponsibilityMatcher>,
    pub jd_cache: JdCache,
    pub config: Config,
}
