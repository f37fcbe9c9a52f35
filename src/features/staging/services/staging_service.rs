use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::config::StorageConfig;
use crate::core::error::{AppError, Result};
use crate::features::staging::dtos::StagedFileDto;
use crate::features::staging::models::{StagedFile, UploadCategory};
use crate::features::staging::repositories::StagedFileRepository;
use crate::modules::storage::ObjectStore;
use crate::shared::constants::{MAX_PHOTO_SIZE, STAGED_FILE_TTL_HOURS};
use crate::shared::validation::{file_extension, sanitize_filename};

/// Bucket names for the two upload categories
#[derive(Debug, Clone)]
pub struct StagingBuckets {
    pub report: String,
    pub profile: String,
}

impl StagingBuckets {
    pub fn new(report: impl Into<String>, profile: impl Into<String>) -> Self {
        Self {
            report: report.into(),
            profile: profile.into(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.report_bucket, &config.profile_bucket)
    }

    pub fn for_category(&self, category: UploadCategory) -> &str {
        match category {
            UploadCategory::Report => &self.report,
            UploadCategory::Profile => &self.profile,
        }
    }
}

/// One requested promotion: a staged upload and its permanent destination key
#[derive(Debug, Clone)]
pub struct PromoteMove {
    pub id: Uuid,
    pub permanent_key: String,
}

/// Per-move progress within one promotion batch.
///
/// A move advances `Pending -> Copied -> Committed`; any failure sends the
/// whole batch to rollback, which removes the permanent blobs of every move
/// that got past `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MoveState {
    Pending,
    Copied,
    Committed,
}

#[derive(Debug)]
struct MoveProgress {
    id: Uuid,
    bucket: String,
    staged_key: String,
    permanent_key: String,
    state: MoveState,
}

/// Service for ephemeral uploads: validate and store them under temporary
/// keys, promote them to permanent report-linked objects, purge leftovers.
pub struct StagingService {
    staged_files: Arc<dyn StagedFileRepository>,
    store: Arc<dyn ObjectStore>,
    buckets: StagingBuckets,
}

impl StagingService {
    pub fn new(
        staged_files: Arc<dyn StagedFileRepository>,
        store: Arc<dyn ObjectStore>,
        buckets: StagingBuckets,
    ) -> Self {
        Self {
            staged_files,
            store,
            buckets,
        }
    }

    /// Validate and store an upload under a temporary key
    ///
    /// Returns the staging record's metadata; the raw bytes are never echoed
    /// back. The record expires 24 hours after creation unless promoted.
    pub async fn stage_upload(
        &self,
        data: Vec<u8>,
        original_filename: &str,
        content_type: &str,
        category: UploadCategory,
    ) -> Result<StagedFileDto> {
        validate_upload(data.len(), original_filename, content_type)?;

        let id = Uuid::new_v4();
        let sanitized = sanitize_filename(original_filename);
        let staged_key = format!("temp/{}/{}", id, sanitized);
        let bucket = self.buckets.for_category(category);
        let file_size = data.len() as i64;

        self.store
            .put(bucket, &staged_key, data, content_type)
            .await?;

        debug!("Staged upload '{}' at '{}'", original_filename, staged_key);

        let now = Utc::now();
        let file = StagedFile {
            id,
            original_filename: original_filename.to_string(),
            staged_key,
            content_type: content_type.to_string(),
            file_size,
            category,
            created_at: now,
            expires_at: now + Duration::hours(STAGED_FILE_TTL_HOURS),
        };

        // Blob is orphaned if this insert fails; the expiry sweep cannot see
        // it, so remove it before surfacing the error.
        if let Err(e) = self.staged_files.insert(&file).await {
            if let Err(del_err) = self.store.delete(bucket, &file.staged_key).await {
                warn!(
                    "Failed to remove staged blob '{}' after insert failure: {}",
                    file.staged_key, del_err
                );
            }
            return Err(e);
        }

        info!(
            "Staged file created: id={}, key={}, size={}, category={}",
            file.id, file.staged_key, file.file_size, file.category
        );

        Ok(file.into())
    }

    /// Check a batch of staged-file ids is ready for promotion
    ///
    /// All-or-nothing: the first missing, expired, or store-divergent entry
    /// aborts the whole batch.
    pub async fn validate_staged(&self, ids: &[Uuid]) -> Result<Vec<StagedFile>> {
        let now = Utc::now();
        let mut files = Vec::with_capacity(ids.len());

        for id in ids {
            let file = self
                .staged_files
                .find(*id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Staged file {} not found", id)))?;

            if file.is_expired(now) {
                return Err(AppError::Expired(format!(
                    "Staged file {} expired at {}",
                    id, file.expires_at
                )));
            }

            let bucket = self.buckets.for_category(file.category);
            if !self.store.exists(bucket, &file.staged_key).await? {
                return Err(AppError::Storage(format!(
                    "Staged file {} is missing from the object store",
                    id
                )));
            }

            files.push(file);
        }

        Ok(files)
    }

    /// Promote a batch of staged uploads to their permanent keys
    ///
    /// Two passes over the batch: every blob is copied to its permanent key
    /// first, then staged blobs and staging records are retired. A failure in
    /// either pass rolls the batch back (permanent blobs removed best-effort)
    /// and re-raises the original error, so a thrown `promote_many` means no
    /// durable photo-state was committed.
    pub async fn promote_many(&self, moves: &[PromoteMove]) -> Result<Vec<String>> {
        let mut batch: Vec<MoveProgress> = Vec::with_capacity(moves.len());

        // Copy pass: Pending -> Copied
        for mv in moves {
            let file = match self.staged_files.find(mv.id).await {
                Ok(Some(file)) => file,
                Ok(None) => {
                    self.rollback(&batch).await;
                    return Err(AppError::NotFound(format!(
                        "Staged file {} not found",
                        mv.id
                    )));
                }
                Err(e) => {
                    self.rollback(&batch).await;
                    return Err(e);
                }
            };

            batch.push(MoveProgress {
                id: file.id,
                bucket: self.buckets.for_category(file.category).to_string(),
                staged_key: file.staged_key,
                permanent_key: mv.permanent_key.clone(),
                state: MoveState::Pending,
            });
            let idx = batch.len() - 1;

            if let Err(e) = self
                .store
                .copy(&batch[idx].bucket, &batch[idx].staged_key, &batch[idx].permanent_key)
                .await
            {
                self.rollback(&batch).await;
                return Err(e);
            }
            batch[idx].state = MoveState::Copied;
        }

        // Retire pass: Copied -> Committed
        for idx in 0..batch.len() {
            // A staged blob that refuses to delete is an orphan for the
            // sweep's log, not a reason to lose the promotion.
            if let Err(e) = self
                .store
                .delete(&batch[idx].bucket, &batch[idx].staged_key)
                .await
            {
                warn!(
                    "Failed to delete staged blob '{}' after promotion: {}",
                    batch[idx].staged_key, e
                );
            }

            if let Err(e) = self.staged_files.delete(batch[idx].id).await {
                self.rollback(&batch).await;
                return Err(e);
            }
            batch[idx].state = MoveState::Committed;
        }

        let keys: Vec<String> = batch.into_iter().map(|p| p.permanent_key).collect();
        info!("Promoted {} staged file(s)", keys.len());
        Ok(keys)
    }

    /// Best-effort compensation: remove the permanent blobs of every move
    /// that got past `Pending`. Delete failures are logged, never re-raised.
    async fn rollback(&self, batch: &[MoveProgress]) {
        let mut rolled_back = 0usize;
        for progress in batch {
            if progress.state == MoveState::Pending {
                continue;
            }
            match self.store.delete(&progress.bucket, &progress.permanent_key).await {
                Ok(()) => rolled_back += 1,
                Err(e) => warn!(
                    "Rollback: failed to delete promoted blob '{}': {}",
                    progress.permanent_key, e
                ),
            }
        }

        if rolled_back > 0 {
            warn!("Rolled back {} promoted photo blob(s)", rolled_back);
        }
    }

    /// Delete one staged upload: blob best-effort, then the record
    pub async fn delete_staged(&self, id: Uuid) -> Result<()> {
        let file = self
            .staged_files
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Staged file {} not found", id)))?;

        let bucket = self.buckets.for_category(file.category);
        if let Err(e) = self.store.delete(bucket, &file.staged_key).await {
            warn!(
                "Failed to delete staged blob '{}', removing record anyway: {}",
                file.staged_key, e
            );
        }

        self.staged_files.delete(id).await?;

        debug!("Deleted staged file: id={}, key={}", id, file.staged_key);
        Ok(())
    }

    /// Purge every staging record past its expiry
    ///
    /// Per-item failures are logged and skipped so one bad entry cannot stall
    /// the sweep. Returns the number of records purged.
    pub async fn sweep_expired(&self) -> Result<usize> {
        let expired = self.staged_files.find_expired(Utc::now()).await?;
        let mut purged = 0usize;

        for file in expired {
            let bucket = self.buckets.for_category(file.category);
            if let Err(e) = self.store.delete(bucket, &file.staged_key).await {
                warn!(
                    "Sweep: failed to delete staged blob '{}', removing record anyway: {}",
                    file.staged_key, e
                );
            }

            match self.staged_files.delete(file.id).await {
                Ok(()) => purged += 1,
                Err(e) => {
                    tracing::error!("Sweep: failed to delete staging record {}: {:?}", file.id, e)
                }
            }
        }

        if purged > 0 {
            info!("Purged {} expired staged upload(s)", purged);
        }

        Ok(purged)
    }
}

/// Upload limits shared by both upload categories
const ALLOWED_SUBTYPES: &str = "jpeg, jpg, png, gif, webp";

fn allowed_extensions(content_type: &str) -> Option<&'static [&'static str]> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some(&["jpg", "jpeg"]),
        "image/png" => Some(&["png"]),
        "image/gif" => Some(&["gif"]),
        "image/webp" => Some(&["webp"]),
        _ => None,
    }
}

fn validate_upload(size: usize, filename: &str, content_type: &str) -> Result<()> {
    if size > MAX_PHOTO_SIZE {
        return Err(AppError::Validation(format!(
            "File too large. Maximum size is {} bytes ({} MB)",
            MAX_PHOTO_SIZE,
            MAX_PHOTO_SIZE / 1024 / 1024
        )));
    }

    let allowed = allowed_extensions(content_type).ok_or_else(|| {
        AppError::Validation(format!(
            "Unsupported file type '{}'. Allowed types: {}",
            content_type, ALLOWED_SUBTYPES
        ))
    })?;

    let extension = file_extension(filename).ok_or_else(|| {
        AppError::Validation(format!("Filename '{}' has no extension", filename))
    })?;

    if !allowed.contains(&extension.as_str()) {
        return Err(AppError::Validation(format!(
            "File extension '.{}' does not match declared type '{}'",
            extension, content_type
        )));
    }

    Ok(())
}
