//! NGO tenant bootstrap.
//!
//! Creating an NGO seeds the whole tenant in one transaction: the NGO
//! row, its default measurement types, the first admin account, the two
//! seed permission groups and the admin's membership. Any failure rolls
//! the entire chain back.

use sqlx::PgPool;
use uuid::Uuid;

use domain::models::measurement::DEFAULT_MEASUREMENT_TYPES;
use domain::models::ngo::{CreateNgoRequest, Ngo};
use domain::models::user::{User, UserRole};
use domain::permissions::{default_admin_permissions, default_coach_permissions, Permission};
use persistence::entities::ngo::NgoEntity;
use persistence::entities::user::{LanguageDb, UserEntity, UserRoleDb, USER_COLUMNS};
use shared::keys::generate_public_key;
use shared::password::{check_password_policy, hash_password};

use crate::error::ApiError;

/// Creates an NGO together with its first admin and seed data.
pub async fn bootstrap_ngo(pool: &PgPool, req: &CreateNgoRequest) -> Result<(Ngo, User), ApiError> {
    check_password_policy(&req.password, &req.confirm_password)?;
    let password_hash = hash_password(&req.password)?;

    let mut tx = pool.begin().await?;

    let ngo_key = generate_public_key();
    let ngo_entity = sqlx::query_as::<_, NgoEntity>(
        r#"
        INSERT INTO ngos (key, name, logo, description)
        VALUES ($1, $2, $3, $4)
        RETURNING id, key, name, logo, description, is_active, created_at, updated_at
        "#,
    )
    .bind(&ngo_key)
    .bind(&req.name)
    .bind(&req.logo)
    .bind(&req.description)
    .fetch_one(&mut *tx)
    .await?;

    for label in DEFAULT_MEASUREMENT_TYPES {
        sqlx::query("INSERT INTO measurement_types (key, ngo_id, label) VALUES ($1, $2, $3)")
            .bind(generate_public_key())
            .bind(ngo_entity.id)
            .bind(label)
            .execute(&mut *tx)
            .await?;
    }

    // the first admin chose these credentials, no forced reset
    let language = req.language.unwrap_or_default();
    let admin_entity = sqlx::query_as::<_, UserEntity>(&format!(
        r#"
        INSERT INTO users (key, first_name, last_name, ngo_id, email, password_hash,
                           role, language, must_reset_password)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, false)
        RETURNING {}
        "#,
        USER_COLUMNS
    ))
    .bind(generate_public_key())
    .bind(&req.first_name)
    .bind(&req.last_name)
    .bind(ngo_entity.id)
    .bind(&req.email)
    .bind(&password_hash)
    .bind(UserRoleDb::from(UserRole::Admin))
    .bind(LanguageDb::from(language))
    .fetch_one(&mut *tx)
    .await?;

    let admin_group_id = insert_group(
        &mut tx,
        ngo_entity.id,
        &format!("{}_admin", ngo_key),
        &default_admin_permissions(),
    )
    .await?;
    insert_group(
        &mut tx,
        ngo_entity.id,
        &format!("{}_coach", ngo_key),
        &default_coach_permissions(),
    )
    .await?;

    sqlx::query("INSERT INTO user_permission_groups (user_id, group_id) VALUES ($1, $2)")
        .bind(admin_entity.id)
        .bind(admin_group_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(ngo_key = %ngo_key, "NGO bootstrapped");
    Ok((ngo_entity.into(), admin_entity.into()))
}

async fn insert_group(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ngo_id: Uuid,
    name: &str,
    permissions: &[Permission],
) -> Result<Uuid, sqlx::Error> {
    let group_id: Uuid = sqlx::query_scalar(
        "INSERT INTO permission_groups (key, ngo_id, name) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(generate_public_key())
    .bind(ngo_id)
    .bind(name)
    .fetch_one(&mut **tx)
    .await?;

    for permission in permissions {
        sqlx::query(
            "INSERT INTO permission_group_permissions (group_id, permission) VALUES ($1, $2)",
        )
        .bind(group_id)
        .bind(permission.code())
        .execute(&mut **tx)
        .await?;
    }

    Ok(group_id)
}
