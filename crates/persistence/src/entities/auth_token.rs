//! Auth token entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::auth::AuthToken;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the auth_tokens table.
#[derive(Debug, Clone, FromRow)]
pub struct AuthTokenEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_digest: String,
    pub token_prefix: String,
    pub expiry_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AuthTokenEntity> for AuthToken {
    fn from(entity: AuthTokenEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            token_digest: entity.token_digest,
            token_prefix: entity.token_prefix,
            expiry_date: entity.expiry_date,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
