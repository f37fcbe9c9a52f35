use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a citizen account
///
/// Profile data (contact details, avatar) lives with the identity provider;
/// this core only needs to know the citizen exists.
#[derive(Debug, Clone, FromRow)]
pub struct Citizen {
    pub id: Uuid,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}
