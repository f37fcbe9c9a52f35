use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a report category
///
/// The `responsible_role_id` mapping drives assignment routing: each category
/// points at exactly one responsible role. The mapping is editable data, so
/// it can be NULL for a freshly created category that has not been wired up
/// yet - the router treats that as a configuration gap.
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub responsible_role_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
