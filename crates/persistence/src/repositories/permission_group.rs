//! Permission group repository for database operations.

use domain::models::permission_group::{ListPermissionGroupsQuery, PermissionGroup};
use shared::pagination::PageParams;
use shared::query::contains_pattern;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::permission_group::PermissionGroupEntity;

const GROUP_COLUMNS: &str = "id, key, ngo_id, name, created_at, updated_at";

/// Repository for permission group database operations.
#[derive(Clone)]
pub struct PermissionGroupRepository {
    pool: PgPool,
}

impl PermissionGroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a group and its grants in one transaction.
    pub async fn create(
        &self,
        key: &str,
        ngo_id: Uuid,
        name: &str,
        permissions: &[String],
    ) -> Result<PermissionGroup, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let entity = sqlx::query_as::<_, PermissionGroupEntity>(&format!(
            r#"
            INSERT INTO permission_groups (key, ngo_id, name)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            GROUP_COLUMNS
        ))
        .bind(key)
        .bind(ngo_id)
        .bind(name)
        .fetch_one(&mut *tx)
        .await?;

        for permission in permissions {
            sqlx::query(
                "INSERT INTO permission_group_permissions (group_id, permission) VALUES ($1, $2)",
            )
            .bind(entity.id)
            .bind(permission)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(entity.into())
    }

    /// Find a group by public key.
    pub async fn find_by_key(&self, key: &str) -> Result<Option<PermissionGroup>, sqlx::Error> {
        let entity = sqlx::query_as::<_, PermissionGroupEntity>(&format!(
            "SELECT {} FROM permission_groups WHERE key = $1",
            GROUP_COLUMNS
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Resolve group keys to row ids within one NGO.
    pub async fn resolve_keys(
        &self,
        ngo_id: Uuid,
        keys: &[String],
    ) -> Result<Vec<(String, Uuid)>, sqlx::Error> {
        let rows: Vec<(String, Uuid)> = sqlx::query_as(
            "SELECT key, id FROM permission_groups WHERE ngo_id = $1 AND key = ANY($2)",
        )
        .bind(ngo_id)
        .bind(keys)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Codenames granted to a group.
    pub async fn permissions_for_group(&self, group_id: Uuid) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT permission FROM permission_group_permissions WHERE group_id = $1 ORDER BY permission",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
    }

    /// List groups of one NGO with pagination and filtering.
    pub async fn list(
        &self,
        ngo_id: Uuid,
        query: &ListPermissionGroupsQuery,
    ) -> Result<(Vec<PermissionGroup>, i64), sqlx::Error> {
        let params = PageParams::from_query(query.page, query.per_page);

        let mut conditions = vec![format!("ngo_id = '{}'", ngo_id)];
        if let Some(ref name) = query.name {
            let pattern = contains_pattern(&name.replace('\'', "''"));
            conditions.push(format!("name ILIKE '{}'", pattern));
        }

        let where_clause = format!("WHERE {}", conditions.join(" AND "));

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM permission_groups {}",
            where_clause
        ))
        .fetch_one(&self.pool)
        .await?;

        let entities = sqlx::query_as::<_, PermissionGroupEntity>(&format!(
            "SELECT {} FROM permission_groups {} ORDER BY name LIMIT $1 OFFSET $2",
            GROUP_COLUMNS, where_clause
        ))
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((entities.into_iter().map(Into::into).collect(), total))
    }

    /// Every group of an NGO, for the NGO-nested listing.
    pub async fn list_for_ngo(&self, ngo_id: Uuid) -> Result<Vec<PermissionGroup>, sqlx::Error> {
        let entities = sqlx::query_as::<_, PermissionGroupEntity>(&format!(
            "SELECT {} FROM permission_groups WHERE ngo_id = $1 ORDER BY name",
            GROUP_COLUMNS
        ))
        .bind(ngo_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Rename a group and, when a grant set is given, replace the grants
    /// wholesale. Runs in one transaction.
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        permissions: Option<&[String]>,
    ) -> Result<Option<PermissionGroup>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let entity = sqlx::query_as::<_, PermissionGroupEntity>(&format!(
            r#"
            UPDATE permission_groups
            SET name = COALESCE($2, name), updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            GROUP_COLUMNS
        ))
        .bind(id)
        .bind(name)
        .fetch_optional(&mut *tx)
        .await?;

        let entity = match entity {
            Some(e) => e,
            None => return Ok(None),
        };

        if let Some(permissions) = permissions {
            sqlx::query("DELETE FROM permission_group_permissions WHERE group_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for permission in permissions {
                sqlx::query(
                    "INSERT INTO permission_group_permissions (group_id, permission) VALUES ($1, $2)",
                )
                .bind(id)
                .bind(permission)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(Some(entity.into()))
    }

    /// Hard delete; memberships and grants cascade.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM permission_groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Add a user to a group. Existing membership is a no-op.
    pub async fn add_member(&self, user_id: Uuid, group_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO user_permission_groups (user_id, group_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(group_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Every codename a user holds through group memberships.
    pub async fn user_permissions(&self, user_id: Uuid) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT DISTINCT p.permission
            FROM user_permission_groups ug
            JOIN permission_group_permissions p ON p.group_id = ug.group_id
            WHERE ug.user_id = $1
            ORDER BY p.permission
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Whether a user holds a codename through any group.
    pub async fn user_has_permission(
        &self,
        user_id: Uuid,
        permission: &str,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1
                FROM user_permission_groups ug
                JOIN permission_group_permissions p ON p.group_id = ug.group_id
                WHERE ug.user_id = $1 AND p.permission = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(permission)
        .fetch_one(&self.pool)
        .await
    }
}
