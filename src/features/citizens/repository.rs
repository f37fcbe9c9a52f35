use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::citizens::model::Citizen;

#[async_trait]
pub trait CitizenRepository: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<Citizen>>;
}

/// Postgres-backed citizen repository
pub struct PgCitizenRepository {
    pool: PgPool,
}

impl PgCitizenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CitizenRepository for PgCitizenRepository {
    async fn find(&self, id: Uuid) -> Result<Option<Citizen>> {
        sqlx::query_as::<_, Citizen>(
            r#"
            SELECT id, display_name, created_at
            FROM citizens
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get citizen: {:?}", e);
            AppError::Database(e)
        })
    }
}
