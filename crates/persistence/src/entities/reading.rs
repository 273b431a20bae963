//! Reading entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::reading::{Reading, ReadingResponse};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the user_readings table.
#[derive(Debug, Clone, FromRow)]
pub struct ReadingEntity {
    pub id: Uuid,
    pub key: String,
    pub user_id: Uuid,
    pub ngo_id: Uuid,
    pub by_user_id: Uuid,
    pub entered_by_id: Uuid,
    pub measurement_id: Uuid,
    pub resource_id: Option<Uuid>,
    pub value: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ReadingEntity> for Reading {
    fn from(entity: ReadingEntity) -> Self {
        Self {
            id: entity.id,
            key: entity.key,
            user_id: entity.user_id,
            ngo_id: entity.ngo_id,
            by_user_id: entity.by_user_id,
            entered_by_id: entity.entered_by_id,
            measurement_id: entity.measurement_id,
            resource_id: entity.resource_id,
            value: entity.value,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Reading row joined with the public keys of its related entities,
/// shaped for list responses.
#[derive(Debug, Clone, FromRow)]
pub struct ReadingDetailEntity {
    pub key: String,
    pub user_key: String,
    pub by_user_key: String,
    pub entered_by_key: String,
    pub measurement_key: String,
    pub resource_key: Option<String>,
    pub value: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ReadingDetailEntity> for ReadingResponse {
    fn from(entity: ReadingDetailEntity) -> Self {
        Self {
            key: entity.key,
            user_key: entity.user_key,
            by_user_key: entity.by_user_key,
            entered_by_key: entity.entered_by_key,
            measurement_key: entity.measurement_key,
            resource_key: entity.resource_key,
            value: entity.value,
            is_active: entity.is_active,
            created_at: entity.created_at,
        }
    }
}
