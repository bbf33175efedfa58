//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext for setting up a test server over a store
//! - A store that can be switched into failing writes
//! - Request helpers shared by the API test files
//!
//! Tests run against the in-memory store unless marked as requiring a
//! database, in which case DATABASE_URL must point to PostgreSQL.

#![allow(dead_code)]

pub mod fixtures;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::Router;
use axum_test::TestServer;
use serde_json::{json, Value};
use uuid::Uuid;

use vocab_tester_backend::db::{Database, MemoryStore, TestStore};
use vocab_tester_backend::error::{ApiError, Result};
use vocab_tester_backend::models::{ProgressSnapshot, StoredResult, TestResult};
use vocab_tester_backend::{build_router, AppState};

/// Test context holding the application state and router.
pub struct TestContext {
    pub state: AppState,
    pub store: Arc<FlakyStore>,
    pub db: Option<Arc<Database>>,
    app: Router,
}

impl TestContext {
    /// Create a test context backed by an in-memory store.
    pub fn new() -> Self {
        let store = Arc::new(FlakyStore::new(Arc::new(MemoryStore::new())));
        Self::with_store(store, None)
    }

    /// Create a test context backed by PostgreSQL.
    ///
    /// # Panics
    /// Panics if DATABASE_URL is not set or database connection fails.
    pub async fn with_database() -> Self {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

        let db = Database::connect(&database_url, 5)
            .await
            .expect("Failed to connect to test database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        let db = Arc::new(db);
        let store = Arc::new(FlakyStore::new(db.clone()));
        Self::with_store(store, Some(db))
    }

    fn with_store(store: Arc<FlakyStore>, db: Option<Arc<Database>>) -> Self {
        let state = AppState::new(store.clone());
        let app = build_router(state.clone());
        Self {
            state,
            store,
            db,
            app,
        }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router()).expect("Failed to start test server")
    }

    /// Number of sessions still held by the service.
    pub fn open_sessions(&self) -> usize {
        self.state.sessions.len().expect("session registry poisoned")
    }

    /// Remove stored progress and results of a vocabulary.
    ///
    /// Only needed for the PostgreSQL context; the memory store is dropped
    /// with the test.
    pub async fn cleanup_vocabulary(&self, vocabulary_id: i64) {
        let Some(db) = &self.db else {
            return;
        };

        let _ = sqlx::query("DELETE FROM test_results WHERE vocabulary_id = $1")
            .bind(vocabulary_id)
            .execute(db.pool())
            .await;

        let _ = sqlx::query("DELETE FROM test_progress WHERE vocabulary_id = $1")
            .bind(vocabulary_id)
            .execute(db.pool())
            .await;
    }
}

/// Store wrapper whose writes can be made to fail.
pub struct FlakyStore {
    inner: Arc<dyn TestStore>,
    failing: AtomicBool,
    failing_results: AtomicBool,
}

impl FlakyStore {
    pub fn new(inner: Arc<dyn TestStore>) -> Self {
        Self {
            inner,
            failing: AtomicBool::new(false),
            failing_results: AtomicBool::new(false),
        }
    }

    /// Make every write fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Make only result writes fail.
    pub fn set_failing_results(&self, failing: bool) {
        self.failing_results.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ApiError::Internal("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl TestStore for FlakyStore {
    async fn save_progress(&self, snapshot: &ProgressSnapshot) -> Result<()> {
        self.check()?;
        self.inner.save_progress(snapshot).await
    }

    async fn get_progress(&self, vocabulary_id: i64) -> Result<Option<ProgressSnapshot>> {
        self.inner.get_progress(vocabulary_id).await
    }

    async fn delete_progress(&self, vocabulary_id: i64) -> Result<()> {
        self.check()?;
        self.inner.delete_progress(vocabulary_id).await
    }

    async fn save_result(&self, id: Uuid, result: &TestResult) -> Result<()> {
        self.check()?;
        if self.failing_results.load(Ordering::SeqCst) {
            return Err(ApiError::Internal("results table unavailable".to_string()));
        }
        self.inner.save_result(id, result).await
    }

    async fn list_results(&self, vocabulary_id: i64) -> Result<Vec<StoredResult>> {
        self.inner.list_results(vocabulary_id).await
    }
}

/// POST /api/tests, expecting the session to be created.
pub async fn start(server: &TestServer, body: Value) -> Value {
    let response = server.post("/api/tests").json(&body).await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

pub fn session_id(view: &Value) -> String {
    view["sessionId"].as_str().unwrap().to_string()
}

/// POST /api/tests/:id/answer, expecting success.
pub async fn answer(server: &TestServer, id: &str, text: &str) -> Value {
    let response = server
        .post(&format!("/api/tests/{}/answer", id))
        .json(&json!({ "text": text }))
        .await;
    response.assert_status_ok();
    response.json()
}

/// `(wordId, status)` pairs of a word state list, sorted by id.
pub fn statuses(words: &Value) -> Vec<(i64, String)> {
    let mut statuses: Vec<(i64, String)> = words
        .as_array()
        .unwrap()
        .iter()
        .map(|w| {
            (
                w["wordId"].as_i64().unwrap(),
                w["status"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    statuses.sort();
    statuses
}
