//! Permission group entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::permission_group::PermissionGroup;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the permission_groups table.
#[derive(Debug, Clone, FromRow)]
pub struct PermissionGroupEntity {
    pub id: Uuid,
    pub key: String,
    pub ngo_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PermissionGroupEntity> for PermissionGroup {
    fn from(entity: PermissionGroupEntity) -> Self {
        Self {
            id: entity.id,
            key: entity.key,
            ngo_id: entity.ngo_id,
            name: entity.name,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
