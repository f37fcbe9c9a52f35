use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Report status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "report_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    PendingApproval,
    Assigned,
    InProgress,
    Suspended,
    Delegated,
    Resolved,
    Rejected,
}

impl ReportStatus {
    /// Every defined status, for table-driven tests and UI affordances
    pub const ALL: [ReportStatus; 7] = [
        ReportStatus::PendingApproval,
        ReportStatus::Assigned,
        ReportStatus::InProgress,
        ReportStatus::Suspended,
        ReportStatus::Delegated,
        ReportStatus::Resolved,
        ReportStatus::Rejected,
    ];
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportStatus::PendingApproval => write!(f, "pending_approval"),
            ReportStatus::Assigned => write!(f, "assigned"),
            ReportStatus::InProgress => write!(f, "in_progress"),
            ReportStatus::Suspended => write!(f, "suspended"),
            ReportStatus::Delegated => write!(f, "delegated"),
            ReportStatus::Resolved => write!(f, "resolved"),
            ReportStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Database model for a citizen-filed report
///
/// Reports are never physically deleted; the status graph is the only
/// lifecycle. `photo_keys` holds permanent object-store keys (at most three),
/// filled in once staged uploads are promoted during creation.
#[derive(Debug, Clone, FromRow)]
pub struct Report {
    pub id: Uuid,
    pub citizen_id: Uuid,
    pub title: String,
    pub description: String,
    pub category_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub photo_keys: Vec<String>,
    pub status: ReportStatus,
    pub explanation: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a new report row (photos attach afterwards)
#[derive(Debug)]
pub struct NewReport {
    pub citizen_id: Uuid,
    pub title: String,
    pub description: String,
    pub category_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
}
