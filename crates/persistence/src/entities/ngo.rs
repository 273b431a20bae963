//! NGO entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the ngos table.
#[derive(Debug, Clone, FromRow)]
pub struct NgoEntity {
    pub id: Uuid,
    pub key: String,
    pub name: String,
    pub logo: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<NgoEntity> for domain::models::ngo::Ngo {
    fn from(entity: NgoEntity) -> Self {
        Self {
            id: entity.id,
            key: entity.key,
            name: entity.name,
            logo: entity.logo,
            description: entity.description,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
