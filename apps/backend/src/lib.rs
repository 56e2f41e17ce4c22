pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use recall_core::{get_scheduler, Scheduler};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;
use crate::services::rate_limit::{MemoryRateLimitStore, RateLimiter};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub scheduler: Arc<dyn Scheduler>,
    pub rate_limiter: RateLimiter,
    pub config: Arc<Config>,
}

impl AppState {
    /// Assemble state with the in-memory rate-limit store
    pub fn new(db: Database, config: Config) -> anyhow::Result<Self> {
        let scheduler: Arc<dyn Scheduler> = get_scheduler(&config.scheduler)
            .with_context(|| format!("Unknown scheduler: {}", config.scheduler))?
            .into();
        let rate_limiter = RateLimiter::new(
            Arc::new(MemoryRateLimitStore::new(config.rate_limit.window)),
            config.rate_limit,
        );

        Ok(Self {
            db: Arc::new(db),
            scheduler,
            rate_limiter,
            config: Arc::new(config),
        })
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    // Layers run bottom-up: identity is resolved before the rate limiter sees the request
    let api_routes = Router::new()
        .route("/api/study/queue", get(routes::study::queue))
        .route("/api/study/review", post(routes::study::review))
        .route("/api/stats", get(routes::stats::summary))
        .route("/api/cards/:id/reviews", get(routes::cards::reviews))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::rate_limit::rate_limit_middleware,
        ))
        .layer(middleware::from_fn(routes::auth::auth_middleware));

    Router::new()
        .route("/health", get(health_check))
        .merge(api_routes)
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url, config.db_max_connections).await?;

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    let addr = config.bind_addr();
    let state = AppState::new(db, config)?;
    tracing::info!("Using {} scheduler", state.scheduler.name());

    let app = router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
