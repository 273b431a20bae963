//! User hierarchy repository for database operations.

use domain::hierarchy::HierarchyEdge;
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for supervision edge database operations.
#[derive(Clone)]
pub struct HierarchyRepository {
    pool: PgPool,
}

impl HierarchyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Replace the NGO's entire edge set atomically. Every existing edge
    /// of the NGO is deleted and the resolved pairs inserted; any
    /// failure rolls the whole rebuild back.
    pub async fn rebuild(
        &self,
        ngo_id: Uuid,
        pairs: &[(Option<Uuid>, Uuid)],
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM user_hierarchy WHERE ngo_id = $1")
            .bind(ngo_id)
            .execute(&mut *tx)
            .await?;

        for (parent_id, child_id) in pairs {
            sqlx::query(
                r#"
                INSERT INTO user_hierarchy (ngo_id, parent_user_id, child_user_id)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(ngo_id)
            .bind(parent_id)
            .bind(child_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Every edge of an NGO, expressed in user public keys.
    pub async fn edges_for_ngo(&self, ngo_id: Uuid) -> Result<Vec<HierarchyEdge>, sqlx::Error> {
        let rows: Vec<(Option<String>, String)> = sqlx::query_as(
            r#"
            SELECT p.key, c.key
            FROM user_hierarchy h
            LEFT JOIN users p ON p.id = h.parent_user_id
            JOIN users c ON c.id = h.child_user_id
            WHERE h.ngo_id = $1
            "#,
        )
        .bind(ngo_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(parent, child)| HierarchyEdge { parent, child })
            .collect())
    }
}
