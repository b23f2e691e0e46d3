use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Authenticated principal. Belongs to at most one company; `company_id` is
/// None only transiently (e.g. mid-signup) and once set never moves to a
/// different company through any association flow.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// Opaque credential hash owned by the authentication subsystem.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub company_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
