use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for an assignment-eligible internal user
///
/// `active_tasks` is the sole load-balancing signal. It is incremented when a
/// report is routed to the officer and intentionally never decremented here.
#[derive(Debug, Clone, FromRow)]
pub struct Officer {
    pub id: Uuid,
    pub display_name: String,
    pub role_id: Uuid,
    pub is_active: bool,
    pub active_tasks: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database model for an internal role; a role belongs to exactly one office
#[derive(Debug, Clone, FromRow)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub office_id: Uuid,
    pub created_at: DateTime<Utc>,
}
