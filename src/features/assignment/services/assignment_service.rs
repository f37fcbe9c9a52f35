use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::assignment::models::Officer;
use crate::features::assignment::repositories::{OfficerRepository, RoleRepository};
use crate::features::categories::CategoryRepository;
use crate::features::reports::models::Report;

/// Routes a newly-approved report to the internal officer who owns it next.
///
/// Resolution chain: report category -> responsible role -> active officers
/// holding that role -> least-loaded officer. The officer's `active_tasks`
/// counter is the sole load signal; the reservation goes through the
/// repository's atomic increment so concurrent assignments cannot lose
/// updates. The selection itself is a best-effort snapshot - a degree of
/// imbalance under heavy concurrent assignment is acceptable.
pub struct AssignmentService {
    categories: Arc<dyn CategoryRepository>,
    roles: Arc<dyn RoleRepository>,
    officers: Arc<dyn OfficerRepository>,
}

impl AssignmentService {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        roles: Arc<dyn RoleRepository>,
        officers: Arc<dyn OfficerRepository>,
    ) -> Self {
        Self {
            categories,
            roles,
            officers,
        }
    }

    /// Pick and reserve the officer for a report entering `ASSIGNED`
    pub async fn assign(&self, report: &Report) -> Result<Officer> {
        let category = self.categories.find(report.category_id).await?.ok_or_else(|| {
            AppError::NoRoleForCategory(format!(
                "Category {} for report {} no longer exists",
                report.category_id, report.id
            ))
        })?;

        let role_id = category.responsible_role_id.ok_or_else(|| {
            AppError::NoRoleForCategory(format!(
                "No responsible role configured for category '{}'",
                category.name
            ))
        })?;

        let role = self.roles.find(role_id).await?.ok_or_else(|| {
            AppError::NoRoleForCategory(format!(
                "Responsible role for category '{}' no longer exists",
                category.name
            ))
        })?;

        let candidates = self.officers.find_active_by_role(role.id).await?;

        let chosen = Self::least_loaded(&candidates).ok_or_else(|| {
            AppError::NoOfficersAvailable(format!("No active officers hold role '{}'", role.name))
        })?;

        let officer = self.officers.increment_active_tasks(chosen.id).await?;

        tracing::info!(
            "Assigned report {} to officer {} (role '{}', active_tasks now {})",
            report.id,
            officer.id,
            role.name,
            officer.active_tasks
        );

        Ok(officer)
    }

    /// Minimum `active_tasks`, ties broken by officer id ascending so the
    /// choice is deterministic regardless of the query's incidental order
    fn least_loaded(officers: &[Officer]) -> Option<&Officer> {
        officers.iter().min_by(|a, b| {
            a.active_tasks
                .cmp(&b.active_tasks)
                .then_with(|| a.id.cmp(&b.id))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uuid::Uuid;

    use super::*;
    use crate::features::reports::models::ReportStatus;
    use crate::shared::test_helpers::{
        sample_category, sample_officer, sample_report, sample_role, InMemoryCategories,
        InMemoryOfficers, InMemoryRoles,
    };

    fn service(
        categories: &Arc<InMemoryCategories>,
        roles: &Arc<InMemoryRoles>,
        officers: &Arc<InMemoryOfficers>,
    ) -> AssignmentService {
        AssignmentService::new(categories.clone(), roles.clone(), officers.clone())
    }

    #[tokio::test]
    async fn test_assign_fails_without_role_mapping() {
        let categories = Arc::new(InMemoryCategories::default());
        let roles = Arc::new(InMemoryRoles::default());
        let officers = Arc::new(InMemoryOfficers::default());

        let category = sample_category(None);
        categories.insert(category.clone());
        let report = sample_report(
            Uuid::new_v4(),
            category.id,
            ReportStatus::PendingApproval,
            None,
        );

        let result = service(&categories, &roles, &officers).assign(&report).await;

        assert!(matches!(result, Err(AppError::NoRoleForCategory(_))));
    }

    #[tokio::test]
    async fn test_assign_fails_without_officers() {
        let categories = Arc::new(InMemoryCategories::default());
        let roles = Arc::new(InMemoryRoles::default());
        let officers = Arc::new(InMemoryOfficers::default());

        let role = sample_role("Sanitation Officer");
        let category = sample_category(Some(role.id));
        roles.insert(role);
        categories.insert(category.clone());
        let report = sample_report(
            Uuid::new_v4(),
            category.id,
            ReportStatus::PendingApproval,
            None,
        );

        let result = service(&categories, &roles, &officers).assign(&report).await;

        match result {
            Err(AppError::NoOfficersAvailable(msg)) => {
                assert!(msg.contains("Sanitation Officer"));
            }
            other => panic!("Expected NoOfficersAvailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_assign_picks_least_loaded_and_reserves() {
        let categories = Arc::new(InMemoryCategories::default());
        let roles = Arc::new(InMemoryRoles::default());
        let officers = Arc::new(InMemoryOfficers::default());

        let role = sample_role("Road Maintenance Officer");
        let category = sample_category(Some(role.id));
        let busy = sample_officer(role.id, 5);
        let idle = sample_officer(role.id, 1);
        roles.insert(role);
        categories.insert(category.clone());
        officers.insert(busy.clone());
        officers.insert(idle.clone());

        let report = sample_report(
            Uuid::new_v4(),
            category.id,
            ReportStatus::PendingApproval,
            None,
        );

        let assigned = service(&categories, &roles, &officers)
            .assign(&report)
            .await
            .unwrap();

        assert_eq!(assigned.id, idle.id);
        assert_eq!(assigned.active_tasks, 2);
        assert_eq!(officers.active_tasks(busy.id), 5);
    }

    #[test]
    fn test_least_loaded_tie_breaks_by_id() {
        let role_id = Uuid::new_v4();
        let mut a = sample_officer(role_id, 3);
        let mut b = sample_officer(role_id, 3);
        // Force a known id ordering regardless of generation order
        a.id = Uuid::from_u128(2);
        b.id = Uuid::from_u128(1);

        let first = [a.clone(), b.clone()];
        let chosen = AssignmentService::least_loaded(&first).unwrap();
        assert_eq!(chosen.id, b.id);

        // Same winner when the slice order is reversed
        let reversed = [b.clone(), a.clone()];
        let chosen = AssignmentService::least_loaded(&reversed).unwrap();
        assert_eq!(chosen.id, b.id);
    }

    #[test]
    fn test_least_loaded_empty() {
        assert!(AssignmentService::least_loaded(&[]).is_none());
    }

    #[tokio::test]
    async fn test_concurrent_assignments_never_lose_updates() {
        let categories = Arc::new(InMemoryCategories::default());
        let roles = Arc::new(InMemoryRoles::default());
        let officers = Arc::new(InMemoryOfficers::default());

        let role = sample_role("Public Works Officer");
        let category = sample_category(Some(role.id));
        let officer = sample_officer(role.id, 0);
        roles.insert(role);
        categories.insert(category.clone());
        officers.insert(officer.clone());

        let service = Arc::new(service(&categories, &roles, &officers));

        let n = 32;
        let mut handles = Vec::with_capacity(n);
        for _ in 0..n {
            let service = service.clone();
            let report = sample_report(
                Uuid::new_v4(),
                category.id,
                ReportStatus::PendingApproval,
                None,
            );
            handles.push(tokio::spawn(async move {
                service.assign(&report).await.unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(officers.active_tasks(officer.id), n as i32);
    }
}
