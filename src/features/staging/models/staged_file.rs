use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Which bucket an upload belongs to, matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "upload_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UploadCategory {
    Report,
    Profile,
}

impl std::fmt::Display for UploadCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadCategory::Report => write!(f, "report"),
            UploadCategory::Profile => write!(f, "profile"),
        }
    }
}

/// Database model for an ephemeral upload
///
/// The blob lives under `temp/{id}/{filename}` in the category's bucket
/// until it is either promoted to a permanent key or purged after expiry.
#[derive(Debug, Clone, FromRow)]
pub struct StagedFile {
    pub id: Uuid,
    pub original_filename: String,
    pub staged_key: String,
    pub content_type: String,
    pub file_size: i64,
    pub category: UploadCategory,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl StagedFile {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
