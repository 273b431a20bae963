//! Measurement catalog repositories.

use domain::models::measurement::{
    InputType, ListMeasurementsQuery, Measurement, MeasurementType,
};
use shared::pagination::PageParams;
use shared::query::{contains_pattern, parse_bool_param};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::measurement::{InputTypeDb, MeasurementEntity, MeasurementTypeEntity};

const MEASUREMENT_COLUMNS: &str =
    "id, key, ngo_id, label, input_type, uom, is_active, created_at, updated_at";
const TYPE_COLUMNS: &str = "id, key, ngo_id, label, is_active, created_at, updated_at";

/// Repository for measurement database operations.
#[derive(Clone)]
pub struct MeasurementRepository {
    pool: PgPool,
}

impl MeasurementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a measurement and link it to its types in one transaction.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        key: &str,
        ngo_id: Uuid,
        label: &str,
        input_type: InputType,
        uom: Option<&str>,
        type_ids: &[Uuid],
    ) -> Result<Measurement, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let entity = sqlx::query_as::<_, MeasurementEntity>(&format!(
            r#"
            INSERT INTO measurements (key, ngo_id, label, input_type, uom)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            MEASUREMENT_COLUMNS
        ))
        .bind(key)
        .bind(ngo_id)
        .bind(label)
        .bind(InputTypeDb::from(input_type))
        .bind(uom)
        .fetch_one(&mut *tx)
        .await?;

        for type_id in type_ids {
            sqlx::query(
                "INSERT INTO measurement_type_links (measurement_id, type_id) VALUES ($1, $2)",
            )
            .bind(entity.id)
            .bind(type_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(entity.into())
    }

    /// Find a measurement by public key.
    pub async fn find_by_key(&self, key: &str) -> Result<Option<Measurement>, sqlx::Error> {
        let entity = sqlx::query_as::<_, MeasurementEntity>(&format!(
            "SELECT {} FROM measurements WHERE key = $1",
            MEASUREMENT_COLUMNS
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// List measurements with pagination and filtering.
    pub async fn list(
        &self,
        ngo_id: Uuid,
        query: &ListMeasurementsQuery,
    ) -> Result<(Vec<Measurement>, i64), sqlx::Error> {
        let params = PageParams::from_query(query.page, query.per_page);

        let mut conditions = vec![format!("m.ngo_id = '{}'", ngo_id)];
        if let Some(ref is_active) = query.is_active {
            conditions.push(format!("m.is_active = {}", parse_bool_param(is_active)));
        }
        if let Some(ref label) = query.label {
            let pattern = contains_pattern(&label.replace('\'', "''"));
            conditions.push(format!("m.label ILIKE '{}'", pattern));
        }
        if let Some(ref type_key) = query.type_key {
            let escaped = type_key.replace('\'', "''");
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM measurement_type_links l \
                 JOIN measurement_types t ON t.id = l.type_id \
                 WHERE l.measurement_id = m.id AND t.key = '{}')",
                escaped
            ));
        }

        let where_clause = format!("WHERE {}", conditions.join(" AND "));

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM measurements m {}",
            where_clause
        ))
        .fetch_one(&self.pool)
        .await?;

        let entities = sqlx::query_as::<_, MeasurementEntity>(&format!(
            "SELECT {} FROM measurements m {} ORDER BY m.created_at DESC LIMIT $1 OFFSET $2",
            columns_with_alias("m"),
            where_clause
        ))
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((entities.into_iter().map(Into::into).collect(), total))
    }

    /// Active measurements linked to a type label, for the baseline
    /// shortcut listings.
    pub async fn list_by_type_label(
        &self,
        ngo_id: Uuid,
        type_label: &str,
    ) -> Result<Vec<Measurement>, sqlx::Error> {
        let entities = sqlx::query_as::<_, MeasurementEntity>(&format!(
            r#"
            SELECT {}
            FROM measurements m
            JOIN measurement_type_links l ON l.measurement_id = m.id
            JOIN measurement_types t ON t.id = l.type_id
            WHERE m.ngo_id = $1 AND t.label = $2 AND m.is_active = true
            ORDER BY m.label
            "#,
            columns_with_alias("m")
        ))
        .bind(ngo_id)
        .bind(type_label)
        .fetch_all(&self.pool)
        .await?;

        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Update a measurement; a present type list replaces the links.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: Uuid,
        label: Option<&str>,
        input_type: Option<InputType>,
        uom: Option<&str>,
        type_ids: Option<&[Uuid]>,
    ) -> Result<Option<Measurement>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let entity = sqlx::query_as::<_, MeasurementEntity>(&format!(
            r#"
            UPDATE measurements
            SET
                label = COALESCE($2, label),
                input_type = COALESCE($3, input_type),
                uom = COALESCE($4, uom),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            MEASUREMENT_COLUMNS
        ))
        .bind(id)
        .bind(label)
        .bind(input_type.map(InputTypeDb::from))
        .bind(uom)
        .fetch_optional(&mut *tx)
        .await?;

        let entity = match entity {
            Some(e) => e,
            None => return Ok(None),
        };

        if let Some(type_ids) = type_ids {
            sqlx::query("DELETE FROM measurement_type_links WHERE measurement_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for type_id in type_ids {
                sqlx::query(
                    "INSERT INTO measurement_type_links (measurement_id, type_id) VALUES ($1, $2)",
                )
                .bind(id)
                .bind(type_id)
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
            "UPDATE measurements SET is_active = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(is_active)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Hard delete. Readings referencing the measurement block this.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM measurements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn columns_with_alias(alias: &str) -> String {
    MEASUREMENT_COLUMNS
        .split(", ")
        .map(|c| format!("{}.{}", alias, c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Repository for measurement type database operations.
#[derive(Clone)]
pub struct MeasurementTypeRepository {
    pool: PgPool,
}

impl MeasurementTypeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a measurement type.
    pub async fn create(
        &self,
        key: &str,
        ngo_id: Uuid,
        label: &str,
    ) -> Result<MeasurementType, sqlx::Error> {
        let entity = sqlx::query_as::<_, MeasurementTypeEntity>(&format!(
            r#"
            INSERT INTO measurement_types (key, ngo_id, label)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            TYPE_COLUMNS
        ))
        .bind(key)
        .bind(ngo_id)
        .bind(label)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity.into())
    }

    /// Find a measurement type by public key.
    pub async fn find_by_key(&self, key: &str) -> Result<Option<MeasurementType>, sqlx::Error> {
        let entity = sqlx::query_as::<_, MeasurementTypeEntity>(&format!(
            "SELECT {} FROM measurement_types WHERE key = $1",
            TYPE_COLUMNS
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Resolve type keys to row ids within one NGO.
    pub async fn resolve_keys(
        &self,
        ngo_id: Uuid,
        keys: &[String],
    ) -> Result<Vec<(String, Uuid)>, sqlx::Error> {
        let rows: Vec<(String, Uuid)> = sqlx::query_as(
            "SELECT key, id FROM measurement_types WHERE ngo_id = $1 AND key = ANY($2)",
        )
        .bind(ngo_id)
        .bind(keys)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// List measurement types with pagination and filtering.
    pub async fn list(
        &self,
        ngo_id: Uuid,
        page: Option<i32>,
        per_page: Option<i32>,
        is_active: Option<&str>,
        label: Option<&str>,
    ) -> Result<(Vec<MeasurementType>, i64), sqlx::Error> {
        let params = PageParams::from_query(page, per_page);

        let mut conditions = vec![format!("ngo_id = '{}'", ngo_id)];
        if let Some(is_active) = is_active {
            conditions.push(format!("is_active = {}", parse_bool_param(is_active)));
        }
        if let Some(label) = label {
            let pattern = contains_pattern(&label.replace('\'', "''"));
            conditions.push(format!("label ILIKE '{}'", pattern));
        }

        let where_clause = format!("WHERE {}", conditions.join(" AND "));

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM measurement_types {}",
            where_clause
        ))
        .fetch_one(&self.pool)
        .await?;

        let entities = sqlx::query_as::<_, MeasurementTypeEntity>(&format!(
            "SELECT {} FROM measurement_types {} ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            TYPE_COLUMNS, where_clause
        ))
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((entities.into_iter().map(Into::into).collect(), total))
    }

    /// Rename a measurement type.
    pub async fn update(
        &self,
        id: Uuid,
        label: &str,
    ) -> Result<Option<MeasurementType>, sqlx::Error> {
        let entity = sqlx::query_as::<_, MeasurementTypeEntity>(&format!(
            r#"
            UPDATE measurement_types
            SET label = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            TYPE_COLUMNS
        ))
        .bind(id)
        .bind(label)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entity.map(Into::into))
    }

    /// Flip the active flag.
    pub async fn set_active(&self, id: Uuid, is_active: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE measurement_types SET is_active = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(is_active)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Hard delete; linked measurements are unlinked by cascade.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM measurement_types WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_with_alias() {
        let aliased = columns_with_alias("m");
        assert!(aliased.starts_with("m.id, m.key"));
        assert!(aliased.ends_with("m.updated_at"));
    }
}
