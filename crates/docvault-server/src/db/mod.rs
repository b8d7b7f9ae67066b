//! Project and asset record store
//!
//! The ingestion pipeline consumes the store through the [`ProjectStore`]
//! trait: it resolves a project id once per batch and records each accepted
//! asset after its bytes are durably written. [`PgProjectStore`] is the
//! PostgreSQL implementation; tests substitute an in-memory store.

use async_trait::async_trait;
use serde::Serialize;
use sqlx::postgres::PgPool;
use sqlx::Row;
use thiserror::Error;
use uuid::Uuid;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// SQL query or connection error
    #[error("Database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),
}

pub type DbResult<T> = Result<T, DbError>;

/// A project record, read-only to the ingestion pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
}

/// A stored asset record, created exactly once per accepted file after its
/// bytes have been written to project-scoped storage. Never mutated by the
/// ingestion pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct NewAsset {
    pub project_id: i64,
    pub filename: String,
    pub storage_path: String,
}

/// The capabilities the ingestion pipeline needs from the record store.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Resolve a project id to its record, or `None` if it does not exist.
    async fn get_project(&self, project_id: i64) -> DbResult<Option<Project>>;

    /// Record an accepted asset.
    async fn record_asset(&self, asset: NewAsset) -> DbResult<()>;
}

/// PostgreSQL-backed project store
#[derive(Clone)]
pub struct PgProjectStore {
    pool: PgPool,
}

impl PgProjectStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn get_project(&self, project_id: i64) -> DbResult<Option<Project>> {
        let row = sqlx::query("SELECT id, name FROM projects WHERE id = $1")
            .bind(project_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| Project {
            id: row.get("id"),
            name: row.get("name"),
        }))
    }

    async fn record_asset(&self, asset: NewAsset) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO assets (id, project_id, filename, storage_path)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(asset.project_id)
        .bind(&asset.filename)
        .bind(&asset.storage_path)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
