use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::assignment::AssignmentService;
use crate::features::categories::CategoryRepository;
use crate::features::citizens::CitizenRepository;
use crate::features::reports::dtos::{
    ActorContext, CreateReportDto, ReportResponseDto, UpdateReportStatusDto,
};
use crate::features::reports::models::{NewReport, Report, ReportStatus};
use crate::features::reports::repositories::ReportRepository;
use crate::features::reports::services::lifecycle;
use crate::features::staging::models::UploadCategory;
use crate::features::staging::{PromoteMove, StagingService};
use crate::modules::storage::ObjectStore;
use crate::shared::types::PaginationQuery;
use crate::shared::validation::sanitize_filename;

/// Use-case layer for the report lifecycle
///
/// Creation stages in two phases (row first, then photo promotion) so the
/// permanent photo keys can embed the report id. Status updates run through
/// the transition rule table; entering `ASSIGNED` additionally reserves an
/// officer through the assignment router.
pub struct ReportService {
    reports: Arc<dyn ReportRepository>,
    citizens: Arc<dyn CitizenRepository>,
    categories: Arc<dyn CategoryRepository>,
    staging: Arc<StagingService>,
    assignment: Arc<AssignmentService>,
    store: Arc<dyn ObjectStore>,
    report_bucket: String,
    presigned_url_expiry_secs: u32,
}

impl ReportService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reports: Arc<dyn ReportRepository>,
        citizens: Arc<dyn CitizenRepository>,
        categories: Arc<dyn CategoryRepository>,
        staging: Arc<StagingService>,
        assignment: Arc<AssignmentService>,
        store: Arc<dyn ObjectStore>,
        report_bucket: impl Into<String>,
        presigned_url_expiry_secs: u32,
    ) -> Self {
        Self {
            reports,
            citizens,
            categories,
            staging,
            assignment,
            store,
            report_bucket: report_bucket.into(),
            presigned_url_expiry_secs,
        }
    }

    /// File a new report for a citizen
    ///
    /// The row is persisted in `pending_approval` before the staged photos
    /// are promoted; when promotion fails, the row stays behind with no
    /// photos and the whole call surfaces `PhotoProcessingFailed`, so the
    /// client can re-upload and retry.
    pub async fn create_report(
        &self,
        citizen_id: Uuid,
        dto: &CreateReportDto,
    ) -> Result<ReportResponseDto> {
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.citizens
            .find(citizen_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Citizen {} not found", citizen_id)))?;

        let category = self
            .categories
            .find(dto.category_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", dto.category_id)))?;

        let report = self
            .reports
            .create(&NewReport {
                citizen_id,
                title: dto.title.clone(),
                description: dto.description.clone(),
                category_id: category.id,
                latitude: dto.latitude,
                longitude: dto.longitude,
            })
            .await?;

        let staged = self
            .staging
            .validate_staged(&dto.photo_ids)
            .await
            .map_err(|e| photo_processing_failed(report.id, e))?;

        for file in &staged {
            if file.category != UploadCategory::Report {
                return Err(AppError::Validation(format!(
                    "Staged file {} is not a report photo upload",
                    file.id
                )));
            }
        }

        let moves: Vec<PromoteMove> = staged
            .iter()
            .map(|file| PromoteMove {
                id: file.id,
                permanent_key: format!(
                    "reports/{}/{}/{}",
                    citizen_id,
                    report.id,
                    sanitize_filename(&file.original_filename)
                ),
            })
            .collect();

        let keys = self
            .staging
            .promote_many(&moves)
            .await
            .map_err(|e| photo_processing_failed(report.id, e))?;

        let report = self
            .reports
            .set_photo_keys(report.id, &keys)
            .await
            .map_err(|e| photo_processing_failed(report.id, e))?;

        tracing::info!(
            "Created report {} for citizen {} with {} photo(s)",
            report.id,
            citizen_id,
            keys.len()
        );

        Ok(report.into())
    }

    /// Move a report through its status graph
    ///
    /// Entering `ASSIGNED` for the first time reserves an officer through the
    /// router; re-asserting the current status is an accepted no-op and must
    /// not reserve twice. `DELEGATED` hands the report to the maintainer the
    /// current holder picked.
    pub async fn update_status(
        &self,
        report_id: Uuid,
        dto: &UpdateReportStatusDto,
        actor: &ActorContext,
    ) -> Result<ReportResponseDto> {
        let report = self
            .reports
            .find(report_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", report_id)))?;

        let is_assigned_actor = report.assigned_to == Some(actor.user_id);
        let check = lifecycle::validate(
            report.status,
            dto.status,
            &actor.role_name,
            actor.is_external_maintainer,
            is_assigned_actor,
        );
        if !check.valid {
            return Err(AppError::TransitionRejected(
                check
                    .error
                    .unwrap_or_else(|| "Transition rejected".to_string()),
            ));
        }

        let assigned_to = if dto.status == ReportStatus::Assigned
            && report.status != ReportStatus::Assigned
        {
            let officer = self.assignment.assign(&report).await?;
            Some(officer.id)
        } else if dto.status == ReportStatus::Delegated {
            dto.delegate_to
        } else {
            None
        };

        let updated = self
            .reports
            .update_status(report_id, dto.status, dto.explanation.as_deref(), assigned_to)
            .await?;

        tracing::info!(
            "Report {} moved from {} to {} by actor {}",
            report_id,
            report.status,
            updated.status,
            actor.user_id
        );

        Ok(updated.into())
    }

    /// Fetch one report with presigned photo URLs
    pub async fn get_report(&self, id: Uuid) -> Result<ReportResponseDto> {
        let report = self
            .reports
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;

        self.to_dto_with_urls(report).await
    }

    /// List a citizen's reports, newest first, with presigned photo URLs
    pub async fn list_by_citizen(
        &self,
        citizen_id: Uuid,
        page: &PaginationQuery,
    ) -> Result<Vec<ReportResponseDto>> {
        let reports = self.reports.list_by_citizen(citizen_id, page).await?;

        let mut dtos = Vec::with_capacity(reports.len());
        for report in reports {
            dtos.push(self.to_dto_with_urls(report).await?);
        }
        Ok(dtos)
    }

    /// Targets the actor could move this report to, for UI affordances
    pub async fn available_transitions(
        &self,
        report_id: Uuid,
        actor: &ActorContext,
    ) -> Result<Vec<ReportStatus>> {
        let report = self
            .reports
            .find(report_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", report_id)))?;

        let is_assigned_actor = report.assigned_to == Some(actor.user_id);
        Ok(lifecycle::valid_next_statuses(
            report.status,
            &actor.role_name,
            actor.is_external_maintainer,
            is_assigned_actor,
        ))
    }

    async fn to_dto_with_urls(&self, report: Report) -> Result<ReportResponseDto> {
        let mut dto = ReportResponseDto::from(report);
        let mut urls = Vec::with_capacity(dto.photo_keys.len());
        for key in &dto.photo_keys {
            urls.push(
                self.store
                    .presign_get(&self.report_bucket, key, self.presigned_url_expiry_secs)
                    .await?,
            );
        }
        dto.photo_urls = urls;
        Ok(dto)
    }
}

fn photo_processing_failed(report_id: Uuid, source: AppError) -> AppError {
    AppError::PhotoProcessingFailed(format!(
        "Photos for report {} could not be processed: {}",
        report_id, source
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uuid::Uuid;

    use super::*;
    use crate::features::staging::StagingBuckets;
    use crate::shared::constants::ROLE_PUBLIC_RELATIONS;
    use crate::shared::test_helpers::{
        sample_category, sample_citizen, sample_officer, sample_report, sample_role,
        InMemoryCategories, InMemoryCitizens, InMemoryObjectStore, InMemoryOfficers,
        InMemoryReports, InMemoryRoles, InMemoryStagedFiles,
    };

    const REPORT_BUCKET: &str = "test-reports";
    const PROFILE_BUCKET: &str = "test-profiles";

    struct TestEnv {
        citizens: Arc<InMemoryCitizens>,
        categories: Arc<InMemoryCategories>,
        roles: Arc<InMemoryRoles>,
        officers: Arc<InMemoryOfficers>,
        reports: Arc<InMemoryReports>,
        staged: Arc<InMemoryStagedFiles>,
        store: Arc<InMemoryObjectStore>,
        staging: Arc<StagingService>,
        service: ReportService,
    }

    fn env() -> TestEnv {
        let citizens = Arc::new(InMemoryCitizens::default());
        let categories = Arc::new(InMemoryCategories::default());
        let roles = Arc::new(InMemoryRoles::default());
        let officers = Arc::new(InMemoryOfficers::default());
        let reports = Arc::new(InMemoryReports::default());
        let staged = Arc::new(InMemoryStagedFiles::default());
        let store = Arc::new(InMemoryObjectStore::default());

        let staging = Arc::new(StagingService::new(
            staged.clone(),
            store.clone(),
            StagingBuckets::new(REPORT_BUCKET, PROFILE_BUCKET),
        ));
        let assignment = Arc::new(AssignmentService::new(
            categories.clone(),
            roles.clone(),
            officers.clone(),
        ));
        let service = ReportService::new(
            reports.clone(),
            citizens.clone(),
            categories.clone(),
            staging.clone(),
            assignment,
            store.clone(),
            REPORT_BUCKET,
            3600,
        );

        TestEnv {
            citizens,
            categories,
            roles,
            officers,
            reports,
            staged,
            store,
            staging,
            service,
        }
    }

    fn create_dto(category_id: Uuid, photo_ids: Vec<Uuid>) -> CreateReportDto {
        CreateReportDto {
            title: "Pothole on Jalan Merdeka".to_string(),
            description: "Deep pothole in front of the market entrance".to_string(),
            category_id,
            latitude: -7.2575,
            longitude: 112.7521,
            photo_ids,
        }
    }

    fn pr_actor() -> ActorContext {
        ActorContext {
            user_id: Uuid::new_v4(),
            role_name: ROLE_PUBLIC_RELATIONS.to_string(),
            is_external_maintainer: false,
        }
    }

    #[tokio::test]
    async fn test_create_report_end_to_end() {
        let env = env();
        let citizen = sample_citizen();
        let category = sample_category(None);
        env.citizens.insert(citizen.clone());
        env.categories.insert(category.clone());

        // Citizen uploads one photo, then files the report with its token
        let staged = env
            .staging
            .stage_upload(
                vec![0u8; 1024],
                "pothole.png",
                "image/png",
                UploadCategory::Report,
            )
            .await
            .unwrap();

        let created = env
            .service
            .create_report(citizen.id, &create_dto(category.id, vec![staged.id]))
            .await
            .unwrap();

        assert_eq!(created.status, ReportStatus::PendingApproval);
        assert_eq!(created.photo_keys.len(), 1);
        let expected_key = format!("reports/{}/{}/pothole.png", citizen.id, created.id);
        assert_eq!(created.photo_keys[0], expected_key);
        assert!(env.store.contains(REPORT_BUCKET, &expected_key));

        // Staging record consumed by the promotion
        let result = env.staging.validate_staged(&[staged.id]).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_report_unknown_citizen() {
        let env = env();
        let category = sample_category(None);
        env.categories.insert(category.clone());

        let result = env
            .service
            .create_report(Uuid::new_v4(), &create_dto(category.id, vec![Uuid::new_v4()]))
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_report_unknown_category() {
        let env = env();
        let citizen = sample_citizen();
        env.citizens.insert(citizen.clone());

        let result = env
            .service
            .create_report(citizen.id, &create_dto(Uuid::new_v4(), vec![Uuid::new_v4()]))
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_report_requires_photos() {
        let env = env();
        let citizen = sample_citizen();
        let category = sample_category(None);
        env.citizens.insert(citizen.clone());
        env.categories.insert(category.clone());

        let result = env
            .service
            .create_report(citizen.id, &create_dto(category.id, vec![]))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_report_rejects_out_of_range_coordinates() {
        let env = env();
        let citizen = sample_citizen();
        let category = sample_category(None);
        env.citizens.insert(citizen.clone());
        env.categories.insert(category.clone());

        let mut dto = create_dto(category.id, vec![Uuid::new_v4()]);
        dto.latitude = 123.0;

        let result = env.service.create_report(citizen.id, &dto).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_report_photo_failure_leaves_pending_row() {
        let env = env();
        let citizen = sample_citizen();
        let category = sample_category(None);
        env.citizens.insert(citizen.clone());
        env.categories.insert(category.clone());

        let staged = env
            .staging
            .stage_upload(
                vec![0u8; 512],
                "broken.png",
                "image/png",
                UploadCategory::Report,
            )
            .await
            .unwrap();

        // Every permanent key for this citizen will refuse to copy
        env.store.fail_copy_to_prefix(&format!("reports/{}/", citizen.id));

        let result = env
            .service
            .create_report(citizen.id, &create_dto(category.id, vec![staged.id]))
            .await;

        assert!(matches!(result, Err(AppError::PhotoProcessingFailed(_))));

        // The two-phase row survives with no photos; the upload stays staged
        let rows = env.reports.all();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, ReportStatus::PendingApproval);
        assert!(rows[0].photo_keys.is_empty());
        assert!(env.staged.contains(staged.id));
    }

    #[tokio::test]
    async fn test_update_status_assign_end_to_end() {
        let env = env();
        let role = sample_role("Road Maintenance Officer");
        let category = sample_category(Some(role.id));
        let officer = sample_officer(role.id, 0);
        env.roles.insert(role);
        env.categories.insert(category.clone());
        env.officers.insert(officer.clone());

        let report = sample_report(
            Uuid::new_v4(),
            category.id,
            ReportStatus::PendingApproval,
            None,
        );
        env.reports.insert(report.clone());

        let dto = UpdateReportStatusDto {
            status: ReportStatus::Assigned,
            explanation: None,
            delegate_to: None,
        };
        let updated = env
            .service
            .update_status(report.id, &dto, &pr_actor())
            .await
            .unwrap();

        assert_eq!(updated.status, ReportStatus::Assigned);
        assert_eq!(updated.assigned_to, Some(officer.id));
        assert_eq!(env.officers.active_tasks(officer.id), 1);
    }

    #[tokio::test]
    async fn test_update_status_rejected_transition_changes_nothing() {
        let env = env();
        let role = sample_role("Road Maintenance Officer");
        let category = sample_category(Some(role.id));
        let officer = sample_officer(role.id, 0);
        env.roles.insert(role);
        env.categories.insert(category.clone());
        env.officers.insert(officer.clone());

        let report = sample_report(
            Uuid::new_v4(),
            category.id,
            ReportStatus::PendingApproval,
            None,
        );
        env.reports.insert(report.clone());

        // Jumping straight to resolved is not an edge
        let dto = UpdateReportStatusDto {
            status: ReportStatus::Resolved,
            explanation: None,
            delegate_to: None,
        };
        let result = env.service.update_status(report.id, &dto, &pr_actor()).await;

        assert!(matches!(result, Err(AppError::TransitionRejected(_))));
        assert_eq!(env.reports.get(report.id).status, ReportStatus::PendingApproval);
        assert_eq!(env.officers.active_tasks(officer.id), 0);
    }

    #[tokio::test]
    async fn test_update_status_reassert_assigned_is_noop() {
        let env = env();
        let role = sample_role("Road Maintenance Officer");
        let category = sample_category(Some(role.id));
        let officer = sample_officer(role.id, 1);
        env.roles.insert(role);
        env.categories.insert(category.clone());
        env.officers.insert(officer.clone());

        let report = sample_report(
            Uuid::new_v4(),
            category.id,
            ReportStatus::Assigned,
            Some(officer.id),
        );
        env.reports.insert(report.clone());

        let dto = UpdateReportStatusDto {
            status: ReportStatus::Assigned,
            explanation: None,
            delegate_to: None,
        };
        let updated = env
            .service
            .update_status(report.id, &dto, &pr_actor())
            .await
            .unwrap();

        // No second reservation on the no-op
        assert_eq!(updated.assigned_to, Some(officer.id));
        assert_eq!(env.officers.active_tasks(officer.id), 1);
    }

    #[tokio::test]
    async fn test_update_status_delegate_hands_to_chosen_maintainer() {
        let env = env();
        let category = sample_category(None);
        env.categories.insert(category.clone());

        let holder = Uuid::new_v4();
        let maintainer = Uuid::new_v4();
        let report = sample_report(
            Uuid::new_v4(),
            category.id,
            ReportStatus::Assigned,
            Some(holder),
        );
        env.reports.insert(report.clone());

        let dto = UpdateReportStatusDto {
            status: ReportStatus::Delegated,
            explanation: Some("Contracted out to the road crew".to_string()),
            delegate_to: Some(maintainer),
        };
        let actor = ActorContext {
            user_id: holder,
            role_name: "Road Maintenance Officer".to_string(),
            is_external_maintainer: false,
        };
        let updated = env.service.update_status(report.id, &dto, &actor).await.unwrap();

        assert_eq!(updated.status, ReportStatus::Delegated);
        assert_eq!(updated.assigned_to, Some(maintainer));
        assert_eq!(
            updated.explanation.as_deref(),
            Some("Contracted out to the road crew")
        );
    }

    #[tokio::test]
    async fn test_update_status_resolve_keeps_explanation() {
        let env = env();
        let category = sample_category(None);
        env.categories.insert(category.clone());

        let holder = Uuid::new_v4();
        let report = sample_report(
            Uuid::new_v4(),
            category.id,
            ReportStatus::InProgress,
            Some(holder),
        );
        env.reports.insert(report.clone());

        let dto = UpdateReportStatusDto {
            status: ReportStatus::Resolved,
            explanation: Some("Repaved on 2025-06-01".to_string()),
            delegate_to: None,
        };
        let actor = ActorContext {
            user_id: holder,
            role_name: "Road Maintenance Officer".to_string(),
            is_external_maintainer: false,
        };
        let updated = env.service.update_status(report.id, &dto, &actor).await.unwrap();

        assert_eq!(updated.status, ReportStatus::Resolved);
        assert_eq!(updated.explanation.as_deref(), Some("Repaved on 2025-06-01"));
        // The holder keeps the report through resolution
        assert_eq!(updated.assigned_to, Some(holder));
    }

    #[tokio::test]
    async fn test_update_status_unknown_report() {
        let env = env();
        let dto = UpdateReportStatusDto {
            status: ReportStatus::Assigned,
            explanation: None,
            delegate_to: None,
        };

        let result = env
            .service
            .update_status(Uuid::new_v4(), &dto, &pr_actor())
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_report_includes_presigned_urls() {
        let env = env();
        let category = sample_category(None);
        env.categories.insert(category.clone());

        let mut report = sample_report(
            Uuid::new_v4(),
            category.id,
            ReportStatus::Assigned,
            Some(Uuid::new_v4()),
        );
        report.photo_keys = vec!["reports/c/r/a.png".to_string()];
        env.reports.insert(report.clone());

        let dto = env.service.get_report(report.id).await.unwrap();

        assert_eq!(dto.photo_urls.len(), 1);
        assert!(dto.photo_urls[0].contains("reports/c/r/a.png"));
    }

    #[tokio::test]
    async fn test_available_transitions_for_assigned_holder() {
        let env = env();
        let category = sample_category(None);
        env.categories.insert(category.clone());

        let holder = Uuid::new_v4();
        let report = sample_report(
            Uuid::new_v4(),
            category.id,
            ReportStatus::Assigned,
            Some(holder),
        );
        env.reports.insert(report.clone());

        let actor = ActorContext {
            user_id: holder,
            role_name: "Road Maintenance Officer".to_string(),
            is_external_maintainer: false,
        };
        let nexts = env
            .service
            .available_transitions(report.id, &actor)
            .await
            .unwrap();

        assert!(nexts.contains(&ReportStatus::InProgress));
        assert!(nexts.contains(&ReportStatus::Delegated));
    }
}
