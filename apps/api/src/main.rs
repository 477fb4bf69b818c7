mod ats;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::ats::cache::JdCache;
use crate::ats::responsibilities::{
    KeywordResponsibilityMatcher, LlmResponsibilityMatcher, ResponsibilityMatcher,
};
use crate::config::{Config, MatcherKind};
use crate::db::create_pool;
use crate::llm_client::{LlmBackend, LlmClient};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Internly ATS API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs migrations)
    let db = create_pool(&config.database_url).await?;

    // Initialize Redis-backed JD cache
    let redis = redis::Client::open(config.redis_url.clone())?;
    let jd_cache = JdCache::new(redis, config.jd_cache_ttl_secs);
    info!("Redis client initialized (JD cache TTL {}s)", config.jd_cache_ttl_secs);

    // Initialize LLM client
    let llm: Arc<dyn LlmBackend> = Arc::new(LlmClient::new(config.anthropic_api_key.clone())?);
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Responsibility matcher: LLM by default, keyword overlap for offline runs
    let matcher: Arc<dyn ResponsibilityMatcher> = match config.responsibility_matcher {
        MatcherKind::Llm => Arc::new(LlmResponsibilityMatcher::new(llm.clone())),
        MatcherKind::Keyword => Arc::new(KeywordResponsibilityMatcher),
    };
    info!("Responsibility matcher: {}", matcher.backend());

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .frontend_origin
                .parse::<HeaderValue>()
                .context("FRONTEND_ORIGIN is not a valid header value")?,
        )
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    let state = AppState {
        db,
        llm,
        matcher,
        jd_cache,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
