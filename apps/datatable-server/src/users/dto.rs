use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::entity;

/// A row of the users table as clients see it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub full_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<entity::Model> for UserDto {
    fn from(m: entity::Model) -> Self {
        Self {
            full_name: m.full_name(),
            is_active: m.is_active(),
            id: m.id,
            first_name: m.first_name,
            last_name: m.last_name,
            email: m.email,
            created_at: m.created_at,
        }
    }
}
