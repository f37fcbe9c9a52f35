//! In-memory doubles and fixtures for service tests
//!
//! The doubles implement the same repository and object-store contracts as
//! the Postgres/MinIO implementations, with call counters and failure
//! injection where the tests need to observe side effects.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use fake::faker::name::en::Name;
use fake::Fake;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::assignment::models::{Officer, Role};
use crate::features::assignment::repositories::{OfficerRepository, RoleRepository};
use crate::features::categories::{Category, CategoryRepository};
use crate::features::citizens::{Citizen, CitizenRepository};
use crate::features::reports::models::{NewReport, Report, ReportStatus};
use crate::features::reports::repositories::ReportRepository;
use crate::features::staging::models::{StagedFile, UploadCategory};
use crate::features::staging::repositories::StagedFileRepository;
use crate::modules::storage::ObjectStore;
use crate::shared::constants::STAGED_FILE_TTL_HOURS;
use crate::shared::types::PaginationQuery;

// =============================================================================
// OBJECT STORE DOUBLE
// =============================================================================

#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: Mutex<HashMap<(String, String), (Vec<u8>, String)>>,
    fail_copy_keys: Mutex<HashSet<String>>,
    fail_copy_prefixes: Mutex<Vec<String>>,
    fail_delete_keys: Mutex<HashSet<String>>,
    copy_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl InMemoryObjectStore {
    /// Place an object directly, bypassing the trait
    pub fn seed(&self, bucket: &str, key: &str, data: Vec<u8>, content_type: &str) {
        self.objects.lock().unwrap().insert(
            (bucket.to_string(), key.to_string()),
            (data, content_type.to_string()),
        );
    }

    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.objects
            .lock()
            .unwrap()
            .contains_key(&(bucket.to_string(), key.to_string()))
    }

    pub fn content_type(&self, bucket: &str, key: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .map(|(_, ct)| ct.clone())
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    /// Make every copy targeting exactly `dst_key` fail
    pub fn fail_copy_to(&self, dst_key: &str) {
        self.fail_copy_keys.lock().unwrap().insert(dst_key.to_string());
    }

    /// Make every copy targeting a key under `prefix` fail
    pub fn fail_copy_to_prefix(&self, prefix: &str) {
        self.fail_copy_prefixes.lock().unwrap().push(prefix.to_string());
    }

    /// Make every delete of exactly `key` fail
    pub fn fail_delete_of(&self, key: &str) {
        self.fail_delete_keys.lock().unwrap().insert(key.to_string());
    }

    pub fn copy_count(&self) -> usize {
        self.copy_calls.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    fn copy_should_fail(&self, dst_key: &str) -> bool {
        self.fail_copy_keys.lock().unwrap().contains(dst_key)
            || self
                .fail_copy_prefixes
                .lock()
                .unwrap()
                .iter()
                .any(|p| dst_key.starts_with(p))
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(&self, bucket: &str, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        self.seed(bucket, key, data, content_type);
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .map(|(data, _)| data.clone())
            .ok_or_else(|| {
                AppError::Storage(format!("Object '{}' not found in bucket '{}'", key, bucket))
            })
    }

    async fn copy(&self, bucket: &str, src_key: &str, dst_key: &str) -> Result<()> {
        self.copy_calls.fetch_add(1, Ordering::SeqCst);

        if self.copy_should_fail(dst_key) {
            return Err(AppError::Storage(format!(
                "Injected copy failure for '{}'",
                dst_key
            )));
        }

        let mut objects = self.objects.lock().unwrap();
        let value = objects
            .get(&(bucket.to_string(), src_key.to_string()))
            .cloned()
            .ok_or_else(|| {
                AppError::Storage(format!(
                    "Object '{}' not found in bucket '{}'",
                    src_key, bucket
                ))
            })?;
        objects.insert((bucket.to_string(), dst_key.to_string()), value);
        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_delete_keys.lock().unwrap().contains(key) {
            return Err(AppError::Storage(format!(
                "Injected delete failure for '{}'",
                key
            )));
        }

        self.objects
            .lock()
            .unwrap()
            .remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }

    async fn exists(&self, bucket: &str, key: &str) -> Result<bool> {
        Ok(self.contains(bucket, key))
    }

    async fn presign_get(&self, bucket: &str, key: &str, expiry_secs: u32) -> Result<String> {
        Ok(format!(
            "https://minio.test/{}/{}?expires={}",
            bucket, key, expiry_secs
        ))
    }
}

// =============================================================================
// REPOSITORY DOUBLES
// =============================================================================

#[derive(Default)]
pub struct InMemoryStagedFiles {
    files: Mutex<HashMap<Uuid, StagedFile>>,
    delete_calls: AtomicUsize,
}

impl InMemoryStagedFiles {
    /// Insert or replace a record directly, bypassing the trait
    pub fn insert_sync(&self, file: StagedFile) {
        self.files.lock().unwrap().insert(file.id, file);
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.files.lock().unwrap().contains_key(&id)
    }

    pub fn delete_count(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StagedFileRepository for InMemoryStagedFiles {
    async fn insert(&self, file: &StagedFile) -> Result<()> {
        self.insert_sync(file.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<StagedFile>> {
        Ok(self.files.lock().unwrap().get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.files.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn find_expired(&self, now: DateTime<Utc>) -> Result<Vec<StagedFile>> {
        let mut expired: Vec<StagedFile> = self
            .files
            .lock()
            .unwrap()
            .values()
            .filter(|f| f.expires_at < now)
            .cloned()
            .collect();
        expired.sort_by_key(|f| f.expires_at);
        Ok(expired)
    }
}

#[derive(Default)]
pub struct InMemoryReports {
    reports: Mutex<HashMap<Uuid, Report>>,
}

impl InMemoryReports {
    pub fn insert(&self, report: Report) {
        self.reports.lock().unwrap().insert(report.id, report);
    }

    pub fn get(&self, id: Uuid) -> Report {
        self.reports
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .expect("report should exist")
    }

    pub fn all(&self) -> Vec<Report> {
        self.reports.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl ReportRepository for InMemoryReports {
    async fn create(&self, data: &NewReport) -> Result<Report> {
        let now = Utc::now();
        let report = Report {
            id: Uuid::new_v4(),
            citizen_id: data.citizen_id,
            title: data.title.clone(),
            description: data.description.clone(),
            category_id: data.category_id,
            latitude: data.latitude,
            longitude: data.longitude,
            photo_keys: Vec::new(),
            status: ReportStatus::PendingApproval,
            explanation: None,
            assigned_to: None,
            created_at: now,
            updated_at: now,
        };
        self.insert(report.clone());
        Ok(report)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Report>> {
        Ok(self.reports.lock().unwrap().get(&id).cloned())
    }

    async fn list_by_citizen(
        &self,
        citizen_id: Uuid,
        page: &PaginationQuery,
    ) -> Result<Vec<Report>> {
        let mut reports: Vec<Report> = self
            .reports
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.citizen_id == citizen_id)
            .cloned()
            .collect();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reports
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect())
    }

    async fn set_photo_keys(&self, id: Uuid, keys: &[String]) -> Result<Report> {
        let mut reports = self.reports.lock().unwrap();
        let report = reports
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;
        report.photo_keys = keys.to_vec();
        report.updated_at = Utc::now();
        Ok(report.clone())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ReportStatus,
        explanation: Option<&str>,
        assigned_to: Option<Uuid>,
    ) -> Result<Report> {
        let mut reports = self.reports.lock().unwrap();
        let report = reports
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;
        report.status = status;
        if let Some(explanation) = explanation {
            report.explanation = Some(explanation.to_string());
        }
        if let Some(assigned_to) = assigned_to {
            report.assigned_to = Some(assigned_to);
        }
        report.updated_at = Utc::now();
        Ok(report.clone())
    }
}

#[derive(Default)]
pub struct InMemoryOfficers {
    officers: Mutex<HashMap<Uuid, Officer>>,
}

impl InMemoryOfficers {
    pub fn insert(&self, officer: Officer) {
        self.officers.lock().unwrap().insert(officer.id, officer);
    }

    pub fn active_tasks(&self, id: Uuid) -> i32 {
        self.officers
            .lock()
            .unwrap()
            .get(&id)
            .map(|o| o.active_tasks)
            .expect("officer should exist")
    }
}

#[async_trait]
impl OfficerRepository for InMemoryOfficers {
    async fn find_active_by_role(&self, role_id: Uuid) -> Result<Vec<Officer>> {
        let mut officers: Vec<Officer> = self
            .officers
            .lock()
            .unwrap()
            .values()
            .filter(|o| o.role_id == role_id && o.is_active)
            .cloned()
            .collect();
        officers.sort_by(|a, b| {
            a.active_tasks
                .cmp(&b.active_tasks)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(officers)
    }

    async fn increment_active_tasks(&self, id: Uuid) -> Result<Officer> {
        let mut officers = self.officers.lock().unwrap();
        let officer = officers
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Officer {} not found", id)))?;
        officer.active_tasks += 1;
        officer.updated_at = Utc::now();
        Ok(officer.clone())
    }
}

#[derive(Default)]
pub struct InMemoryCategories {
    categories: Mutex<HashMap<Uuid, Category>>,
}

impl InMemoryCategories {
    pub fn insert(&self, category: Category) {
        self.categories.lock().unwrap().insert(category.id, category);
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategories {
    async fn find(&self, id: Uuid) -> Result<Option<Category>> {
        Ok(self
            .categories
            .lock()
            .unwrap()
            .get(&id)
            .filter(|c| c.is_active)
            .cloned())
    }

    async fn list_active(&self) -> Result<Vec<Category>> {
        let mut categories: Vec<Category> = self
            .categories
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.is_active)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }
}

#[derive(Default)]
pub struct InMemoryRoles {
    roles: Mutex<HashMap<Uuid, Role>>,
}

impl InMemoryRoles {
    pub fn insert(&self, role: Role) {
        self.roles.lock().unwrap().insert(role.id, role);
    }
}

#[async_trait]
impl RoleRepository for InMemoryRoles {
    async fn find(&self, id: Uuid) -> Result<Option<Role>> {
        Ok(self.roles.lock().unwrap().get(&id).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryCitizens {
    citizens: Mutex<HashMap<Uuid, Citizen>>,
}

impl InMemoryCitizens {
    pub fn insert(&self, citizen: Citizen) {
        self.citizens.lock().unwrap().insert(citizen.id, citizen);
    }
}

#[async_trait]
impl CitizenRepository for InMemoryCitizens {
    async fn find(&self, id: Uuid) -> Result<Option<Citizen>> {
        Ok(self.citizens.lock().unwrap().get(&id).cloned())
    }
}

// =============================================================================
// FIXTURES
// =============================================================================

pub fn sample_citizen() -> Citizen {
    Citizen {
        id: Uuid::new_v4(),
        display_name: Name().fake(),
        created_at: Utc::now(),
    }
}

pub fn sample_role(name: &str) -> Role {
    Role {
        id: Uuid::new_v4(),
        name: name.to_string(),
        office_id: Uuid::new_v4(),
        created_at: Utc::now(),
    }
}

pub fn sample_category(responsible_role_id: Option<Uuid>) -> Category {
    Category {
        id: Uuid::new_v4(),
        name: "Road Damage".to_string(),
        responsible_role_id,
        is_active: true,
        created_at: Utc::now(),
    }
}

pub fn sample_officer(role_id: Uuid, active_tasks: i32) -> Officer {
    let now = Utc::now();
    Officer {
        id: Uuid::new_v4(),
        display_name: Name().fake(),
        role_id,
        is_active: true,
        active_tasks,
        created_at: now,
        updated_at: now,
    }
}

pub fn sample_report(
    citizen_id: Uuid,
    category_id: Uuid,
    status: ReportStatus,
    assigned_to: Option<Uuid>,
) -> Report {
    let now = Utc::now();
    Report {
        id: Uuid::new_v4(),
        citizen_id,
        title: "Streetlight out".to_string(),
        description: "The streetlight at the corner has been dark for a week".to_string(),
        category_id,
        latitude: -7.2575,
        longitude: 112.7521,
        photo_keys: Vec::new(),
        status,
        explanation: None,
        assigned_to,
        created_at: now,
        updated_at: now,
    }
}

pub fn sample_staged_file(category: UploadCategory, filename: &str) -> StagedFile {
    let id = Uuid::new_v4();
    let now = Utc::now();
    let content_type = match filename.rsplit('.').next() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/png",
    };
    StagedFile {
        id,
        original_filename: filename.to_string(),
        staged_key: format!("temp/{}/{}", id, filename),
        content_type: content_type.to_string(),
        file_size: 1024,
        category,
        created_at: now,
        expires_at: now + Duration::hours(STAGED_FILE_TTL_HOURS),
    }
}
