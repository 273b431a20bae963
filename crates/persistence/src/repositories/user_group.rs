//! User group repository for database operations.

use domain::models::user_group::{ListUserGroupsQuery, UserGroup};
use shared::pagination::PageParams;
use shared::query::{contains_pattern, parse_bool_param};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::user_group::UserGroupEntity;

const GROUP_COLUMNS: &str = "id, key, ngo_id, label, is_active, created_at, updated_at";

/// Repository for user group database operations.
#[derive(Clone)]
pub struct UserGroupRepository {
    pool: PgPool,
}

impl UserGroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a group with its member and resource links in one
    /// transaction.
    pub async fn create(
        &self,
        key: &str,
        ngo_id: Uuid,
        label: &str,
        member_ids: &[Uuid],
        resource_ids: &[Uuid],
    ) -> Result<UserGroup, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let entity = sqlx::query_as::<_, UserGroupEntity>(&format!(
            r#"
            INSERT INTO user_groups (key, ngo_id, label)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            GROUP_COLUMNS
        ))
        .bind(key)
        .bind(ngo_id)
        .bind(label)
        .fetch_one(&mut *tx)
        .await?;

        for user_id in member_ids {
            sqlx::query("INSERT INTO user_group_members (group_id, user_id) VALUES ($1, $2)")
                .bind(entity.id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }
        for resource_id in resource_ids {
            sqlx::query("INSERT INTO user_group_resources (group_id, resource_id) VALUES ($1, $2)")
                .bind(entity.id)
                .bind(resource_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(entity.into())
    }

    /// Find a group by public key.
    pub async fn find_by_key(&self, key: &str) -> Result<Option<UserGroup>, sqlx::Error> {
        let entity = sqlx::query_as::<_, UserGroupEntity>(&format!(
            "SELECT {} FROM user_groups WHERE key = $1",
            GROUP_COLUMNS
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Keys of a group's member users.
    pub async fn member_keys(&self, group_id: Uuid) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT u.key
            FROM user_group_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.group_id = $1
            ORDER BY u.key
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Keys of a group's shared resources.
    pub async fn resource_keys(&self, group_id: Uuid) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT r.key
            FROM user_group_resources g
            JOIN resources r ON r.id = g.resource_id
            WHERE g.group_id = $1
            ORDER BY r.key
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
    }

    /// List groups of one NGO with pagination and filtering.
    pub async fn list(
        &self,
        ngo_id: Uuid,
        query: &ListUserGroupsQuery,
    ) -> Result<(Vec<UserGroup>, i64), sqlx::Error> {
        let params = PageParams::from_query(query.page, query.per_page);

        let mut conditions = vec![format!("ngo_id = '{}'", ngo_id)];
        if let Some(ref is_active) = query.is_active {
            conditions.push(format!("is_active = {}", parse_bool_param(is_active)));
        }
        if let Some(ref label) = query.label {
            let pattern = contains_pattern(&label.replace('\'', "''"));
            conditions.push(format!("label ILIKE '{}'", pattern));
        }

        let where_clause = format!("WHERE {}", conditions.join(" AND "));

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM user_groups {}",
            where_clause
        ))
        .fetch_one(&self.pool)
        .await?;

        let entities = sqlx::query_as::<_, UserGroupEntity>(&format!(
            "SELECT {} FROM user_groups {} ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            GROUP_COLUMNS, where_clause
        ))
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((entities.into_iter().map(Into::into).collect(), total))
    }

    /// Relabel a group and, when lists are present, replace the member
    /// and resource sets. Runs in one transaction.
    pub async fn update(
        &self,
        id: Uuid,
        label: Option<&str>,
        member_ids: Option<&[Uuid]>,
        resource_ids: Option<&[Uuid]>,
    ) -> Result<Option<UserGroup>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let entity = sqlx::query_as::<_, UserGroupEntity>(&format!(
            r#"
            UPDATE user_groups
            SET label = COALESCE($2, label), updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            GROUP_COLUMNS
        ))
        .bind(id)
        .bind(label)
        .fetch_optional(&mut *tx)
        .await?;

        let entity = match entity {
            Some(e) => e,
            None => return Ok(None),
        };

        if let Some(member_ids) = member_ids {
            sqlx::query("DELETE FROM user_group_members WHERE group_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for user_id in member_ids {
                sqlx::query("INSERT INTO user_group_members (group_id, user_id) VALUES ($1, $2)")
                    .bind(id)
                    .bind(user_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        if let Some(resource_ids) = resource_ids {
            sqlx::query("DELETE FROM user_group_resources WHERE group_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for resource_id in resource_ids {
                sqlx::query(
                    "INSERT INTO user_group_resources (group_id, resource_id) VALUES ($1, $2)",
                )
                .bind(id)
                .bind(resource_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(Some(entity.into()))
    }

    /// Flip the active flag.
    pub async fn set_active(&self, id: Uuid, is_active: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_groups SET is_active = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(is_active)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Hard delete; memberships cascade.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
