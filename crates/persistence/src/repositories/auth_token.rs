//! Auth token repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::user::User;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::user::UserEntity;

/// Repository for bearer token database operations.
#[derive(Clone)]
pub struct AuthTokenRepository {
    pool: PgPool,
}

impl AuthTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a freshly issued token digest.
    pub async fn insert(
        &self,
        user_id: Uuid,
        token_digest: &str,
        token_prefix: &str,
        expiry_date: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO auth_tokens (user_id, token_digest, token_prefix, expiry_date)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_id)
        .bind(token_digest)
        .bind(token_prefix)
        .bind(expiry_date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Resolve a token digest to its active owner. Expired tokens and
    /// deactivated users both miss.
    pub async fn find_user_by_digest(
        &self,
        token_digest: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let entity = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT u.id, u.key, u.first_name, u.middle_name, u.last_name, u.ngo_id, u.email,
                   u.password_hash, u.role, u.language, u.is_active, u.must_reset_password,
                   u.created_at, u.updated_at
            FROM auth_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.token_digest = $1
              AND t.expiry_date > NOW()
              AND u.is_active = true
            "#,
        )
        .bind(token_digest)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Revoke the presented token. Returns false when the digest is
    /// unknown.
    pub async fn revoke(&self, token_digest: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE token_digest = $1")
            .bind(token_digest)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Drop expired tokens. Called opportunistically at login.
    pub async fn delete_expired(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE expiry_date <= NOW()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
