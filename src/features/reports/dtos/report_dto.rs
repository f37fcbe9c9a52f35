use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::features::reports::models::{Report, ReportStatus};

/// Request DTO for filing a report
///
/// `photo_ids` are staging tokens returned by the upload endpoint; the
/// photos themselves are promoted during creation.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReportDto {
    #[validate(length(min = 3, max = 150, message = "title must be 3-150 characters"))]
    pub title: String,

    #[validate(length(min = 10, max = 4000, message = "description must be 10-4000 characters"))]
    pub description: String,

    pub category_id: Uuid,

    #[validate(range(min = -90.0, max = 90.0, message = "latitude must be between -90 and 90"))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0, message = "longitude must be between -180 and 180"))]
    pub longitude: f64,

    #[validate(length(min = 1, max = 3, message = "a report carries 1 to 3 photos"))]
    pub photo_ids: Vec<Uuid>,
}

/// Request DTO for moving a report through its status graph
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateReportStatusDto {
    pub status: ReportStatus,
    /// Staff explanation, kept on rejection/delegation/resolution
    pub explanation: Option<String>,
    /// External maintainer chosen by the current holder when delegating
    pub delegate_to: Option<Uuid>,
}

/// The authenticated actor behind a status update, mapped from the token
/// claims by the HTTP layer
#[derive(Debug, Clone)]
pub struct ActorContext {
    pub user_id: Uuid,
    pub role_name: String,
    pub is_external_maintainer: bool,
}

/// Response DTO for report operations
#[derive(Debug, Serialize)]
pub struct ReportResponseDto {
    pub id: Uuid,
    pub citizen_id: Uuid,
    pub title: String,
    pub description: String,
    pub category_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub status: ReportStatus,
    pub explanation: Option<String>,
    pub assigned_to: Option<Uuid>,
    /// Permanent object-store keys of the report's photos
    pub photo_keys: Vec<String>,
    /// Presigned download URLs, populated on read paths only
    pub photo_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Report> for ReportResponseDto {
    fn from(report: Report) -> Self {
        Self {
            id: report.id,
            citizen_id: report.citizen_id,
            title: report.title,
            description: report.description,
            category_id: report.category_id,
            latitude: report.latitude,
            longitude: report.longitude,
            status: report.status,
            explanation: report.explanation,
            assigned_to: report.assigned_to,
            photo_keys: report.photo_keys,
            photo_urls: Vec::new(),
            created_at: report.created_at,
        }
    }
}
