pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::{Database, MemoryStore, TestStore};
use crate::services::sessions::SessionRegistry;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TestStore>,
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(store: Arc<dyn TestStore>) -> Self {
        Self {
            store,
            sessions: Arc::new(SessionRegistry::new()),
        }
    }
}

/// Build the API router over `state`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Test sessions
        .route("/api/tests", post(routes::test_sessions::start))
        .route(
            "/api/tests/:id",
            get(routes::test_sessions::get).delete(routes::test_sessions::discard),
        )
        .route("/api/tests/:id/answer", post(routes::test_sessions::answer))
        .route("/api/tests/:id/attempt", post(routes::test_sessions::attempt))
        .route("/api/tests/:id/skip", post(routes::test_sessions::skip))
        .route("/api/tests/:id/finish", post(routes::test_sessions::finish))
        .route("/api/tests/:id/save", post(routes::test_sessions::save))
        .route(
            "/api/tests/:id/words/:word_id",
            delete(routes::test_sessions::remove_word),
        )
        // Vocabulary progress and history
        .route(
            "/api/vocabularies/:id/progress",
            get(routes::vocabularies::progress),
        )
        .route(
            "/api/vocabularies/:id/progress/finalize",
            post(routes::vocabularies::finalize),
        )
        .route(
            "/api/vocabularies/:id/results",
            get(routes::vocabularies::results),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn TestStore> = match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let db = Database::connect(url, config.max_connections).await?;

            tracing::info!("Running migrations...");
            db.run_migrations().await?;
            Arc::new(db)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, progress and results are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let app = build_router(AppState::new(store));

    let addr = config.bind_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
