use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::assignment::models::Role;

#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<Role>>;
}

/// Postgres-backed role repository
pub struct PgRoleRepository {
    pool: PgPool,
}

impl PgRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepository for PgRoleRepository {
    async fn find(&self, id: Uuid) -> Result<Option<Role>> {
        sqlx::query_as::<_, Role>(
            r#"
            SELECT id, name, office_id, created_at
            FROM roles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get role: {:?}", e);
            AppError::Database(e)
        })
    }
}
