//! Multi-row account creation flows.
//!
//! Creating an admin (user plus group memberships) or a member with
//! baseline readings touches several tables; both run in a single
//! transaction so a half-created account never survives.

use sqlx::PgPool;
use uuid::Uuid;

use domain::models::user::{CreateAdminRequest, CreateMemberRequest, User, UserRole};
use persistence::entities::user::{LanguageDb, UserEntity, UserRoleDb, USER_COLUMNS};
use shared::keys::generate_public_key;
use shared::password::{check_password_policy, hash_password};

use crate::error::ApiError;

/// Creates an admin with credentials and permission group memberships.
///
/// `group_ids` must already be resolved to rows of the target NGO. The
/// account is flagged for a password reset at first login.
pub async fn create_admin(
    pool: &PgPool,
    ngo_id: Uuid,
    req: &CreateAdminRequest,
    group_ids: &[Uuid],
) -> Result<User, ApiError> {
    check_password_policy(&req.password, &req.confirm_password)?;
    let password_hash = hash_password(&req.password)?;

    let mut tx = pool.begin().await?;

    let entity = sqlx::query_as::<_, UserEntity>(&format!(
        r#"
        INSERT INTO users (key, first_name, middle_name, last_name, ngo_id, email,
                           password_hash, role, language)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {}
        "#,
        USER_COLUMNS
    ))
    .bind(generate_public_key())
    .bind(&req.first_name)
    .bind(&req.middle_name)
    .bind(&req.last_name)
    .bind(ngo_id)
    .bind(&req.email)
    .bind(&password_hash)
    .bind(UserRoleDb::from(UserRole::Admin))
    .bind(LanguageDb::from(req.language.unwrap_or_default()))
    .fetch_one(&mut *tx)
    .await?;

    for group_id in group_ids {
        sqlx::query("INSERT INTO user_permission_groups (user_id, group_id) VALUES ($1, $2)")
            .bind(entity.id)
            .bind(group_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(entity.into())
}

/// One validated baseline ready for insertion.
pub struct BaselineRow {
    pub measurement_id: Uuid,
    pub value: String,
}

/// Creates an athlete or coach together with their baseline readings.
///
/// Baselines must already be validated against the measurements'
/// declared input types and carry the canonical stored form.
pub async fn create_member(
    pool: &PgPool,
    ngo_id: Uuid,
    creator_id: Uuid,
    role: UserRole,
    req: &CreateMemberRequest,
    baselines: &[BaselineRow],
) -> Result<User, ApiError> {
    let mut tx = pool.begin().await?;

    let entity = sqlx::query_as::<_, UserEntity>(&format!(
        r#"
        INSERT INTO users (key, first_name, middle_name, last_name, ngo_id, email,
                           role, language)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {}
        "#,
        USER_COLUMNS
    ))
    .bind(generate_public_key())
    .bind(&req.first_name)
    .bind(&req.middle_name)
    .bind(&req.last_name)
    .bind(ngo_id)
    .bind(&req.email)
    .bind(UserRoleDb::from(role))
    .bind(LanguageDb::from(req.language.unwrap_or_default()))
    .fetch_one(&mut *tx)
    .await?;

    for baseline in baselines {
        sqlx::query(
            r#"
            INSERT INTO user_readings (key, user_id, ngo_id, by_user_id, entered_by_id,
                                       measurement_id, value)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(generate_public_key())
        .bind(entity.id)
        .bind(ngo_id)
        .bind(creator_id)
        .bind(creator_id)
        .bind(baseline.measurement_id)
        .bind(&baseline.value)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(entity.into())
}
