//! User group entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::user_group::UserGroup;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the user_groups table.
#[derive(Debug, Clone, FromRow)]
pub struct UserGroupEntity {
    pub id: Uuid,
    pub key: String,
    pub ngo_id: Uuid,
    pub label: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserGroupEntity> for UserGroup {
    fn from(entity: UserGroupEntity) -> Self {
        Self {
            id: entity.id,
            key: entity.key,
            ngo_id: entity.ngo_id,
            label: entity.label,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
