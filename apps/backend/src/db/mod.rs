//! PostgreSQL database operations

pub mod memory;
pub mod store;

pub use memory::MemoryStore;
pub use store::TestStore;

use async_trait::async_trait;
use sqlx::types::Json as SqlJson;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TestStore for Database {
    async fn save_progress(&self, snapshot: &ProgressSnapshot) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO test_progress (vocabulary_id, words, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (vocabulary_id)
            DO UPDATE SET words = EXCLUDED.words, updated_at = NOW()
            "#,
        )
        .bind(snapshot.vocabulary_id)
        .bind(SqlJson(&snapshot.words))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_progress(&self, vocabulary_id: i64) -> Result<Option<ProgressSnapshot>> {
        let progress = sqlx::query_as::<_, DbProgress>(
            r#"
            SELECT vocabulary_id, words, updated_at
            FROM test_progress
            WHERE vocabulary_id = $1
            "#,
        )
        .bind(vocabulary_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(progress.map(DbProgress::into_snapshot))
    }

    async fn delete_progress(&self, vocabulary_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM test_progress WHERE vocabulary_id = $1")
            .bind(vocabulary_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn save_result(&self, id: Uuid, result: &TestResult) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO test_results (id, vocabulary_id, updated_at, done, words)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(result.vocabulary_id)
        .bind(result.updated_at)
        .bind(result.done)
        .bind(SqlJson(&result.words))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_results(&self, vocabulary_id: i64) -> Result<Vec<StoredResult>> {
        let results = sqlx::query_as::<_, DbTestResult>(
            r#"
            SELECT id, vocabulary_id, updated_at, done, words
            FROM test_results
            WHERE vocabulary_id = $1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(vocabulary_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(results.into_iter().map(DbTestResult::into_stored).collect())
    }
}
