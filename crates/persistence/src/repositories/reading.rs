//! Reading repository for database operations.

use domain::models::reading::{ListReadingsQuery, Reading, ReadingResponse};
use shared::pagination::PageParams;
use shared::query::parse_bool_param;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::reading::{ReadingDetailEntity, ReadingEntity};

const READING_COLUMNS: &str = "id, key, user_id, ngo_id, by_user_id, entered_by_id, \
     measurement_id, resource_id, value, is_active, created_at, updated_at";

/// Repository for reading database operations.
#[derive(Clone)]
pub struct ReadingRepository {
    pool: PgPool,
}

impl ReadingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a reading.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        key: &str,
        user_id: Uuid,
        ngo_id: Uuid,
        by_user_id: Uuid,
        entered_by_id: Uuid,
        measurement_id: Uuid,
        resource_id: Option<Uuid>,
        value: &str,
    ) -> Result<Reading, sqlx::Error> {
        let entity = sqlx::query_as::<_, ReadingEntity>(&format!(
            r#"
            INSERT INTO user_readings (key, user_id, ngo_id, by_user_id, entered_by_id, measurement_id, resource_id, value)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            READING_COLUMNS
        ))
        .bind(key)
        .bind(user_id)
        .bind(ngo_id)
        .bind(by_user_id)
        .bind(entered_by_id)
        .bind(measurement_id)
        .bind(resource_id)
        .bind(value)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    /// Find a reading by public key.
    pub async fn find_by_key(&self, key: &str) -> Result<Option<Reading>, sqlx::Error> {
        let entity = sqlx::query_as::<_, ReadingEntity>(&format!(
            "SELECT {} FROM user_readings WHERE key = $1",
            READING_COLUMNS
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Find a reading by public key with related keys joined in.
    pub async fn find_detail_by_key(
        &self,
        key: &str,
    ) -> Result<Option<ReadingResponse>, sqlx::Error> {
        let entity = sqlx::query_as::<_, ReadingDetailEntity>(
            r#"
            SELECT r.key,
                   u.key AS user_key,
                   b.key AS by_user_key,
                   e.key AS entered_by_key,
                   m.key AS measurement_key,
                   res.key AS resource_key,
                   r.value, r.is_active, r.created_at
            FROM user_readings r
            JOIN users u ON u.id = r.user_id
            JOIN users b ON b.id = r.by_user_id
            JOIN users e ON e.id = r.entered_by_id
            JOIN measurements m ON m.id = r.measurement_id
            LEFT JOIN resources res ON res.id = r.resource_id
            WHERE r.key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// List readings of one NGO with related keys joined in.
    pub async fn list(
        &self,
        ngo_id: Uuid,
        query: &ListReadingsQuery,
    ) -> Result<(Vec<ReadingResponse>, i64), sqlx::Error> {
        let params = PageParams::from_query(query.page, query.per_page);

        let mut conditions = vec![format!("r.ngo_id = '{}'", ngo_id)];
        if let Some(ref is_active) = query.is_active {
            conditions.push(format!("r.is_active = {}", parse_bool_param(is_active)));
        }
        if let Some(ref user_key) = query.user {
            conditions.push(format!("u.key = '{}'", user_key.replace('\'', "''")));
        }

        let where_clause = format!("WHERE {}", conditions.join(" AND "));

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM user_readings r JOIN users u ON u.id = r.user_id {}",
            where_clause
        ))
        .fetch_one(&self.pool)
        .await?;

        let entities = sqlx::query_as::<_, ReadingDetailEntity>(&format!(
            r#"
            SELECT r.key,
                   u.key AS user_key,
                   b.key AS by_user_key,
                   e.key AS entered_by_key,
                   m.key AS measurement_key,
                   res.key AS resource_key,
                   r.value, r.is_active, r.created_at
            FROM user_readings r
            JOIN users u ON u.id = r.user_id
            JOIN users b ON b.id = r.by_user_id
            JOIN users e ON e.id = r.entered_by_id
            JOIN measurements m ON m.id = r.measurement_id
            LEFT JOIN resources res ON res.id = r.resource_id
            {}
            ORDER BY r.created_at DESC
            LIMIT $1 OFFSET $2
            "#,
            where_clause
        ))
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((entities.into_iter().map(Into::into).collect(), total))
    }

    /// Hard delete.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_readings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
