use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::features::staging::models::{StagedFile, UploadCategory};

/// Response DTO for a staged upload
///
/// The `id` is the opaque token the client hands back when attaching the
/// upload to a report. Raw bytes are never returned.
#[derive(Debug, Clone, Serialize)]
pub struct StagedFileDto {
    pub id: Uuid,
    pub original_filename: String,
    pub content_type: String,
    pub file_size: i64,
    pub category: UploadCategory,
    pub expires_at: DateTime<Utc>,
}

impl From<StagedFile> for StagedFileDto {
    fn from(file: StagedFile) -> Self {
        Self {
            id: file.id,
            original_filename: file.original_filename,
            content_type: file.content_type,
            file_size: file.file_size,
            category: file.category,
            expires_at: file.expires_at,
        }
    }
}
