//! Resource entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::resource::{Resource, ResourceKind};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for resource_kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "resource_kind", rename_all = "lowercase")]
pub enum ResourceKindDb {
    Curriculum,
    Session,
    Registration,
    Benchmark,
    File,
}

impl From<ResourceKindDb> for ResourceKind {
    fn from(db: ResourceKindDb) -> Self {
        match db {
            ResourceKindDb::Curriculum => Self::Curriculum,
            ResourceKindDb::Session => Self::Session,
            ResourceKindDb::Registration => Self::Registration,
            ResourceKindDb::Benchmark => Self::Benchmark,
            ResourceKindDb::File => Self::File,
        }
    }
}

impl From<ResourceKind> for ResourceKindDb {
    fn from(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Curriculum => Self::Curriculum,
            ResourceKind::Session => Self::Session,
            ResourceKind::Registration => Self::Registration,
            ResourceKind::Benchmark => Self::Benchmark,
            ResourceKind::File => Self::File,
        }
    }
}

/// Database row mapping for the resources table.
#[derive(Debug, Clone, FromRow)]
pub struct ResourceEntity {
    pub id: Uuid,
    pub key: String,
    pub ngo_id: Uuid,
    pub label: String,
    pub kind: ResourceKindDb,
    pub data: JsonValue,
    pub is_active: bool,
    pub is_shared: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ResourceEntity> for Resource {
    fn from(entity: ResourceEntity) -> Self {
        Self {
            id: entity.id,
            key: entity.key,
            ngo_id: entity.ngo_id,
            label: entity.label,
            kind: entity.kind.into(),
            data: entity.data,
            is_active: entity.is_active,
            is_shared: entity.is_shared,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Column list shared by every resource query.
pub const RESOURCE_COLUMNS: &str =
    "id, key, ngo_id, label, kind, data, is_active, is_shared, created_at, updated_at";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_conversion() {
        assert_eq!(
            ResourceKind::from(ResourceKindDb::Registration),
            ResourceKind::Registration
        );
        assert_eq!(ResourceKindDb::from(ResourceKind::File), ResourceKindDb::File);
    }
}
