use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::staging::models::StagedFile;

#[async_trait]
pub trait StagedFileRepository: Send + Sync {
    async fn insert(&self, file: &StagedFile) -> Result<()>;
    async fn find(&self, id: Uuid) -> Result<Option<StagedFile>>;
    async fn delete(&self, id: Uuid) -> Result<()>;
    /// Staging records whose expiry is in the past, oldest first
    async fn find_expired(&self, now: DateTime<Utc>) -> Result<Vec<StagedFile>>;
}

/// Postgres-backed staged-file repository
pub struct PgStagedFileRepository {
    pool: PgPool,
}

impl PgStagedFileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StagedFileRepository for PgStagedFileRepository {
    async fn insert(&self, file: &StagedFile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO staged_files
                (id, original_filename, staged_key, content_type, file_size, category, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(file.id)
        .bind(&file.original_filename)
        .bind(&file.staged_key)
        .bind(&file.content_type)
        .bind(file.file_size)
        .bind(file.category)
        .bind(file.created_at)
        .bind(file.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert staged file: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<StagedFile>> {
        sqlx::query_as::<_, StagedFile>(
            r#"
            SELECT id, original_filename, staged_key, content_type, file_size, category, created_at, expires_at
            FROM staged_files
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get staged file: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM staged_files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete staged file: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(())
    }

    async fn find_expired(&self, now: DateTime<Utc>) -> Result<Vec<StagedFile>> {
        sqlx::query_as::<_, StagedFile>(
            r#"
            SELECT id, original_filename, staged_key, content_type, file_size, category, created_at, expires_at
            FROM staged_files
            WHERE expires_at < $1
            ORDER BY expires_at ASC
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list expired staged files: {:?}", e);
            AppError::Database(e)
        })
    }
}
