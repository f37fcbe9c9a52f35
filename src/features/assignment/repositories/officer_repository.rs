use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::assignment::models::Officer;

#[async_trait]
pub trait OfficerRepository: Send + Sync {
    /// All active officers currently holding the role
    async fn find_active_by_role(&self, role_id: Uuid) -> Result<Vec<Officer>>;

    /// Reserve one more task on the officer's counter.
    ///
    /// Must be a single atomic row increment on the persistence side, never a
    /// read-modify-write pair - two concurrent assignments would otherwise
    /// both increment from the same stale snapshot. Returns the officer as
    /// persisted after the increment.
    async fn increment_active_tasks(&self, id: Uuid) -> Result<Officer>;
}

/// Postgres-backed officer repository
pub struct PgOfficerRepository {
    pool: PgPool,
}

impl PgOfficerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OfficerRepository for PgOfficerRepository {
    async fn find_active_by_role(&self, role_id: Uuid) -> Result<Vec<Officer>> {
        sqlx::query_as::<_, Officer>(
            r#"
            SELECT id, display_name, role_id, is_active, active_tasks, created_at, updated_at
            FROM internal_users
            WHERE role_id = $1 AND is_active = TRUE
            ORDER BY active_tasks ASC, id ASC
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list officers by role: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn increment_active_tasks(&self, id: Uuid) -> Result<Officer> {
        sqlx::query_as::<_, Officer>(
            r#"
            UPDATE internal_users
            SET active_tasks = active_tasks + 1, updated_at = NOW()
            WHERE id = $1
            RETURNING id, display_name, role_id, is_active, active_tasks, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to increment officer task counter: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Officer {} not found", id)))
    }
}
