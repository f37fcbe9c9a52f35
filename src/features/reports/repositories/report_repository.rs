use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::reports::models::{NewReport, Report, ReportStatus};
use crate::shared::types::PaginationQuery;

#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Insert a new report in `pending_approval` with no photos yet
    async fn create(&self, data: &NewReport) -> Result<Report>;

    async fn find(&self, id: Uuid) -> Result<Option<Report>>;

    async fn list_by_citizen(&self, citizen_id: Uuid, page: &PaginationQuery)
        -> Result<Vec<Report>>;

    /// Attach the promoted permanent photo keys to the report row
    async fn set_photo_keys(&self, id: Uuid, keys: &[String]) -> Result<Report>;

    /// Persist status, explanation and (when given) the new assignee as a
    /// single atomic update. `assigned_to = None` leaves the column as-is.
    async fn update_status(
        &self,
        id: Uuid,
        status: ReportStatus,
        explanation: Option<&str>,
        assigned_to: Option<Uuid>,
    ) -> Result<Report>;
}

const REPORT_COLUMNS: &str = "id, citizen_id, title, description, category_id, latitude, longitude, \
     photo_keys, status, explanation, assigned_to, created_at, updated_at";

/// Postgres-backed report repository
pub struct PgReportRepository {
    pool: PgPool,
}

impl PgReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    async fn create(&self, data: &NewReport) -> Result<Report> {
        let report = sqlx::query_as::<_, Report>(&format!(
            r#"
            INSERT INTO reports (citizen_id, title, description, category_id, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(data.citizen_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.category_id)
        .bind(data.latitude)
        .bind(data.longitude)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create report: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Created report: {} for citizen: {}",
            report.id,
            data.citizen_id
        );

        Ok(report)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Report>> {
        sqlx::query_as::<_, Report>(&format!(
            r#"
            SELECT {REPORT_COLUMNS}
            FROM reports
            WHERE id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get report: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn list_by_citizen(
        &self,
        citizen_id: Uuid,
        page: &PaginationQuery,
    ) -> Result<Vec<Report>> {
        sqlx::query_as::<_, Report>(&format!(
            r#"
            SELECT {REPORT_COLUMNS}
            FROM reports
            WHERE citizen_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(citizen_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list reports by citizen: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn set_photo_keys(&self, id: Uuid, keys: &[String]) -> Result<Report> {
        sqlx::query_as::<_, Report>(&format!(
            r#"
            UPDATE reports
            SET photo_keys = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(keys)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to set report photo keys: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ReportStatus,
        explanation: Option<&str>,
        assigned_to: Option<Uuid>,
    ) -> Result<Report> {
        sqlx::query_as::<_, Report>(&format!(
            r#"
            UPDATE reports
            SET
                status = $2,
                explanation = COALESCE($3, explanation),
                assigned_to = COALESCE($4, assigned_to),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .bind(explanation)
        .bind(assigned_to)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update report status: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))
    }
}
