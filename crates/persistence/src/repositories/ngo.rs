//! NGO repository for database operations.

use domain::models::ngo::{ListNgosQuery, Ngo};
use shared::pagination::PageParams;
use shared::query::{contains_pattern, parse_bool_param};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ngo::NgoEntity;

const NGO_COLUMNS: &str = "id, key, name, logo, description, is_active, created_at, updated_at";

/// Repository for NGO database operations.
#[derive(Clone)]
pub struct NgoRepository {
    pool: PgPool,
}

impl NgoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an NGO by its public key.
    pub async fn find_by_key(&self, key: &str) -> Result<Option<Ngo>, sqlx::Error> {
        let entity = sqlx::query_as::<_, NgoEntity>(&format!(
            "SELECT {} FROM ngos WHERE key = $1",
            NGO_COLUMNS
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Find an NGO by row id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Ngo>, sqlx::Error> {
        let entity = sqlx::query_as::<_, NgoEntity>(&format!(
            "SELECT {} FROM ngos WHERE id = $1",
            NGO_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// List NGOs with pagination and filtering.
    pub async fn list(&self, query: &ListNgosQuery) -> Result<(Vec<Ngo>, i64), sqlx::Error> {
        let params = PageParams::from_query(query.page, query.per_page);

        let mut conditions = Vec::new();
        if let Some(ref is_active) = query.is_active {
            conditions.push(format!("is_active = {}", parse_bool_param(is_active)));
        }
        if let Some(ref name) = query.name {
            let pattern = contains_pattern(&name.replace('\'', "''"));
            conditions.push(format!("name ILIKE '{}'", pattern));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM ngos {}", where_clause))
                .fetch_one(&self.pool)
                .await?;

        let entities = sqlx::query_as::<_, NgoEntity>(&format!(
            "SELECT {} FROM ngos {} ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            NGO_COLUMNS, where_clause
        ))
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((entities.into_iter().map(Into::into).collect(), total))
    }

    /// List every active NGO, for the public listing.
    pub async fn list_active(&self) -> Result<Vec<Ngo>, sqlx::Error> {
        let entities = sqlx::query_as::<_, NgoEntity>(&format!(
            "SELECT {} FROM ngos WHERE is_active = true ORDER BY name",
            NGO_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Update an NGO.
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        logo: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<Ngo>, sqlx::Error> {
        let entity = sqlx::query_as::<_, NgoEntity>(&format!(
            r#"
            UPDATE ngos
            SET
                name = COALESCE($2, name),
                logo = COALESCE($3, logo),
                description = COALESCE($4, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            NGO_COLUMNS
        ))
        .bind(id)
        .bind(name)
        .bind(logo)
        .bind(description)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Flip the active flag.
    pub async fn set_active(&self, id: Uuid, is_active: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE ngos SET is_active = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(is_active)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Hard delete. Foreign keys block deletion while users or catalog
    /// entries still reference the NGO.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM ngos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
