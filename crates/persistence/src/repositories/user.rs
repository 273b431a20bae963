//! User repository for database operations.

use domain::models::user::{Language, ListUsersQuery, User, UserRole};
use shared::pagination::PageParams;
use shared::query::{contains_pattern, parse_bool_param};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::user::{LanguageDb, UserEntity, UserRoleDb, USER_COLUMNS};

/// Repository for user database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a user row.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        key: &str,
        first_name: &str,
        middle_name: Option<&str>,
        last_name: &str,
        ngo_id: Option<Uuid>,
        email: Option<&str>,
        password_hash: Option<&str>,
        role: UserRole,
        language: Language,
    ) -> Result<User, sqlx::Error> {
        let entity = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            INSERT INTO users (key, first_name, middle_name, last_name, ngo_id, email, password_hash, role, language)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(key)
        .bind(first_name)
        .bind(middle_name)
        .bind(last_name)
        .bind(ngo_id)
        .bind(email)
        .bind(password_hash)
        .bind(UserRoleDb::from(role))
        .bind(LanguageDb::from(language))
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    /// Find a user by public key.
    pub async fn find_by_key(&self, key: &str) -> Result<Option<User>, sqlx::Error> {
        let entity = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {} FROM users WHERE key = $1",
            USER_COLUMNS
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Find a user by email, hash included, for login.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let entity = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// List users of one NGO with pagination and filtering. `role`
    /// narrows the listing to one role collection.
    pub async fn list(
        &self,
        ngo_id: Uuid,
        role: Option<UserRole>,
        query: &ListUsersQuery,
    ) -> Result<(Vec<User>, i64), sqlx::Error> {
        let params = PageParams::from_query(query.page, query.per_page);

        let mut conditions = vec![format!("ngo_id = '{}'", ngo_id)];
        if let Some(role) = role {
            conditions.push(format!("role = '{}'", role));
        }
        if let Some(ref is_active) = query.is_active {
            conditions.push(format!("is_active = {}", parse_bool_param(is_active)));
        }
        if let Some(ref name) = query.name {
            let pattern = contains_pattern(&name.replace('\'', "''"));
            conditions.push(format!(
                "(first_name ILIKE '{}' OR last_name ILIKE '{}')",
                pattern, pattern
            ));
        }

        let where_clause = format!("WHERE {}", conditions.join(" AND "));

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM users {}", where_clause))
                .fetch_one(&self.pool)
                .await?;

        let entities = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {} FROM users {} ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            USER_COLUMNS, where_clause
        ))
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((entities.into_iter().map(Into::into).collect(), total))
    }

    /// Every active user of an NGO, for group and hierarchy pickers.
    pub async fn list_active_for_ngo(&self, ngo_id: Uuid) -> Result<Vec<User>, sqlx::Error> {
        let entities = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {} FROM users WHERE ngo_id = $1 AND is_active = true ORDER BY first_name",
            USER_COLUMNS
        ))
        .bind(ngo_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Resolve user keys to row ids within one NGO. Keys that do not
    /// belong to the NGO are absent from the result.
    pub async fn resolve_keys(
        &self,
        ngo_id: Uuid,
        keys: &[String],
    ) -> Result<Vec<(String, Uuid)>, sqlx::Error> {
        let rows: Vec<(String, Uuid)> = sqlx::query_as(
            "SELECT key, id FROM users WHERE ngo_id = $1 AND key = ANY($2)",
        )
        .bind(ngo_id)
        .bind(keys)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Update profile fields.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: Uuid,
        first_name: Option<&str>,
        middle_name: Option<&str>,
        last_name: Option<&str>,
        email: Option<&str>,
        language: Option<Language>,
    ) -> Result<Option<User>, sqlx::Error> {
        let entity = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            UPDATE users
            SET
                first_name = COALESCE($2, first_name),
                middle_name = COALESCE($3, middle_name),
                last_name = COALESCE($4, last_name),
                email = COALESCE($5, email),
                language = COALESCE($6, language),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(first_name)
        .bind(middle_name)
        .bind(last_name)
        .bind(email)
        .bind(language.map(LanguageDb::from))
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Flip the active flag.
    pub async fn set_active(&self, id: Uuid, is_active: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET is_active = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(is_active)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Store a fresh password hash. The reset flag forces a change at
    /// the next login.
    pub async fn set_password(
        &self,
        id: Uuid,
        password_hash: &str,
        must_reset_password: bool,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, must_reset_password = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .bind(must_reset_password)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Change the interface language.
    pub async fn set_language(&self, id: Uuid, language: Language) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET language = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(LanguageDb::from(language))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Hard delete. Foreign keys block deletion while readings or
    /// hierarchy rows still reference the user.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
