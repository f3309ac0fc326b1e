//! LoanSight Demo Server
//!
//! Backend for the LoanSight loan-document analysis demo. Provides REST API
//! endpoints for:
//!
//! - Session management and document upload (PDF or built-in samples)
//! - Staged mock analysis with pollable progress
//! - Keyword-based question answering over the extracted terms
//! - ROI calculator and dashboard insight data
//!
//! ## Architecture
//!
//! Sessions live in memory only. Each accepted upload spawns one tokio task
//! that walks the analysis stages and installs the fixed result when done.
//!
//! - Rate limiting via tower-governor
//! - Request tracing via tower-http

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use analysis_engine::{DEFAULT_ANSWER_DELAY, DEFAULT_STAGE_DELAY};
use anyhow::anyhow;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;
mod models;
mod state;

use api::{
    handle_ask, handle_create_session, handle_delete_session, handle_get_session, handle_health,
    handle_insights, handle_list_samples, handle_list_stages, handle_reset, handle_roi,
    handle_roi_custom, handle_select_sample, handle_suggested_questions, handle_upload,
};
use state::{SessionStore, DEFAULT_SESSION_TTL};

/// Default request body limit. Uploads are base64, so roughly three quarters
/// of this is file content.
pub const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Command-line arguments for the LoanSight server
#[derive(Parser, Debug)]
#[command(name = "loansight-server")]
#[command(about = "LoanSight demo server for mock loan-document analysis")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "LOANSIGHT_PORT", default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "LOANSIGHT_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Delay before each analysis stage, in milliseconds
    #[arg(
        long,
        env = "LOANSIGHT_STAGE_DELAY_MS",
        default_value_t = DEFAULT_STAGE_DELAY.as_millis() as u64
    )]
    stage_delay_ms: u64,

    /// Delay before an answer is appended, in milliseconds
    #[arg(
        long,
        env = "LOANSIGHT_ANSWER_DELAY_MS",
        default_value_t = DEFAULT_ANSWER_DELAY.as_millis() as u64
    )]
    answer_delay_ms: u64,

    /// Drop sessions idle for this many seconds
    #[arg(
        long,
        env = "LOANSIGHT_SESSION_TTL_SECS",
        default_value_t = DEFAULT_SESSION_TTL.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    session_ttl_secs: u64,

    /// Maximum request body size in bytes
    #[arg(
        long,
        env = "LOANSIGHT_MAX_BODY_BYTES",
        default_value_t = DEFAULT_MAX_BODY_BYTES
    )]
    max_body_bytes: usize,

    /// Rate limit: requests per second per IP
    #[arg(long, env = "LOANSIGHT_RATE_LIMIT", default_value = "10")]
    rate_limit: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub stage_delay: Duration,
    pub answer_delay: Duration,
    pub max_body_bytes: usize,
}

/// All routes, without the rate limiter
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handle_health))
        // Sessions
        .route("/api/sessions", post(handle_create_session))
        .route(
            "/api/sessions/:id",
            get(handle_get_session).delete(handle_delete_session),
        )
        .route("/api/sessions/:id/upload", post(handle_upload))
        .route("/api/sessions/:id/samples/:sample", post(handle_select_sample))
        .route("/api/sessions/:id/reset", post(handle_reset))
        .route("/api/sessions/:id/questions", post(handle_ask))
        // Static data
        .route("/api/pipeline/stages", get(handle_list_stages))
        .route("/api/samples", get(handle_list_samples))
        .route("/api/questions/suggested", get(handle_suggested_questions))
        .route("/api/roi", get(handle_roi).post(handle_roi_custom))
        .route("/api/insights", get(handle_insights))
        .layer(DefaultBodyLimit::max(state.max_body_bytes))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting LoanSight server on {}:{}", args.host, args.port);

    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(args.rate_limit.into())
            .burst_size(args.rate_limit.saturating_mul(2))
            .finish()
            .ok_or_else(|| anyhow!("Invalid rate limit: {}", args.rate_limit))?,
    );

    let sessions = SessionStore::new(Duration::from_secs(args.session_ttl_secs));
    sessions.spawn_sweeper();

    let state = AppState {
        sessions: sessions.clone(),
        stage_delay: Duration::from_millis(args.stage_delay_ms),
        answer_delay: Duration::from_millis(args.answer_delay_ms),
        max_body_bytes: args.max_body_bytes,
    };

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = build_router(state)
        .layer(GovernorLayer {
            config: governor_conf,
        })
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Rate limit: {} requests/second per IP", args.rate_limit);
    info!(
        "Stage delay: {}ms, answer delay: {}ms",
        args.stage_delay_ms, args.answer_delay_ms
    );
    info!(
        "Session TTL: {}s, body limit: {} bytes",
        sessions.ttl().as_secs(),
        args.max_body_bytes
    );

    // The rate limiter keys on the peer address
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
