//! Resource repository for database operations.

use domain::models::resource::{ListResourcesQuery, Resource, ResourceKind};
use domain::models::user::UserRole;
use serde_json::Value as JsonValue;
use shared::pagination::PageParams;
use shared::query::{contains_pattern, parse_bool_param};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::resource::{ResourceEntity, ResourceKindDb, RESOURCE_COLUMNS};
use crate::entities::user::UserRoleDb;

/// Repository for resource database operations.
#[derive(Clone)]
pub struct ResourceRepository {
    pool: PgPool,
}

impl ResourceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a resource.
    pub async fn create(
        &self,
        key: &str,
        ngo_id: Uuid,
        label: &str,
        kind: ResourceKind,
        data: &JsonValue,
        is_shared: bool,
    ) -> Result<Resource, sqlx::Error> {
        let entity = sqlx::query_as::<_, ResourceEntity>(&format!(
            r#"
            INSERT INTO resources (key, ngo_id, label, kind, data, is_shared)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            RESOURCE_COLUMNS
        ))
        .bind(key)
        .bind(ngo_id)
        .bind(label)
        .bind(ResourceKindDb::from(kind))
        .bind(data)
        .bind(is_shared)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    /// Find a resource by public key.
    pub async fn find_by_key(&self, key: &str) -> Result<Option<Resource>, sqlx::Error> {
        let entity = sqlx::query_as::<_, ResourceEntity>(&format!(
            "SELECT {} FROM resources WHERE key = $1",
            RESOURCE_COLUMNS
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Resolve resource keys to row ids within one NGO.
    pub async fn resolve_keys(
        &self,
        ngo_id: Uuid,
        keys: &[String],
    ) -> Result<Vec<(String, Uuid)>, sqlx::Error> {
        let rows: Vec<(String, Uuid)> = sqlx::query_as(
            "SELECT key, id FROM resources WHERE ngo_id = $1 AND key = ANY($2)",
        )
        .bind(ngo_id)
        .bind(keys)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// List resources with pagination and filtering.
    pub async fn list(
        &self,
        ngo_id: Uuid,
        query: &ListResourcesQuery,
    ) -> Result<(Vec<Resource>, i64), sqlx::Error> {
        let params = PageParams::from_query(query.page, query.per_page);

        let mut conditions = vec![format!("ngo_id = '{}'", ngo_id)];
        if let Some(ref is_active) = query.is_active {
            conditions.push(format!("is_active = {}", parse_bool_param(is_active)));
        }
        if let Some(kind) = query.kind {
            conditions.push(format!("kind = '{}'", kind));
        }
        if let Some(ref label) = query.label {
            let pattern = contains_pattern(&label.replace('\'', "''"));
            conditions.push(format!("label ILIKE '{}'", pattern));
        }

        let where_clause = format!("WHERE {}", conditions.join(" AND "));

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM resources {}",
            where_clause
        ))
        .fetch_one(&self.pool)
        .await?;

        let entities = sqlx::query_as::<_, ResourceEntity>(&format!(
            "SELECT {} FROM resources {} ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            RESOURCE_COLUMNS, where_clause
        ))
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((entities.into_iter().map(Into::into).collect(), total))
    }

    /// Resources of one kind for the NGO-nested listings.
    pub async fn list_by_kind(
        &self,
        ngo_id: Uuid,
        kind: ResourceKind,
    ) -> Result<Vec<Resource>, sqlx::Error> {
        let entities = sqlx::query_as::<_, ResourceEntity>(&format!(
            "SELECT {} FROM resources WHERE ngo_id = $1 AND kind = $2 ORDER BY label",
            RESOURCE_COLUMNS
        ))
        .bind(ngo_id)
        .bind(ResourceKindDb::from(kind))
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Update a resource.
    pub async fn update(
        &self,
        id: Uuid,
        label: Option<&str>,
        data: Option<&JsonValue>,
        is_shared: Option<bool>,
    ) -> Result<Option<Resource>, sqlx::Error> {
        let entity = sqlx::query_as::<_, ResourceEntity>(&format!(
            r#"
            UPDATE resources
            SET
                label = COALESCE($2, label),
                data = COALESCE($3, data),
                is_shared = COALESCE($4, is_shared),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            RESOURCE_COLUMNS
        ))
        .bind(id)
        .bind(label)
        .bind(data)
        .bind(is_shared)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Flip the active flag.
    pub async fn set_active(&self, id: Uuid, is_active: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE resources SET is_active = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(is_active)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Hard delete.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM resources WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Bind a resource as the NGO's registration form for a role,
    /// replacing any existing binding.
    pub async fn bind_registration_form(
        &self,
        ngo_id: Uuid,
        role: UserRole,
        resource_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO ngo_registration_forms (ngo_id, role, resource_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (ngo_id, role)
            DO UPDATE SET resource_id = EXCLUDED.resource_id, updated_at = NOW()
            "#,
        )
        .bind(ngo_id)
        .bind(UserRoleDb::from(role))
        .bind(resource_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// The resource bound as the registration form for a role, if any.
    pub async fn find_registration_form(
        &self,
        ngo_id: Uuid,
        role: UserRole,
    ) -> Result<Option<Resource>, sqlx::Error> {
        let entity = sqlx::query_as::<_, ResourceEntity>(
            r#"
            SELECT r.id, r.key, r.ngo_id, r.label, r.kind, r.data, r.is_active, r.is_shared,
                   r.created_at, r.updated_at
            FROM ngo_registration_forms f
            JOIN resources r ON r.id = f.resource_id
            WHERE f.ngo_id = $1 AND f.role = $2
            "#,
        )
        .bind(ngo_id)
        .bind(UserRoleDb::from(role))
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }
}
