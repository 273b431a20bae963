//! Admin collection.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use domain::models::user::{
    CreateAdminRequest, ListUsersQuery, UpdateUserRequest, UserResponse, UserRole,
};
use persistence::repositories::permission_group::PermissionGroupRepository;
use shared::pagination::Page;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::routes::users::{delete_role, gate_for, get_role, list_role, update_role};
use crate::services::accounts;
use crate::services::authz::{require_ngo, require_permission};

/// GET /api/v1/admins
pub async fn list_admins(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Page<UserResponse>>, ApiError> {
    Ok(Json(
        list_role(&state, &caller, Some(UserRole::Admin), &query).await?,
    ))
}

/// POST /api/v1/admins
///
/// Creates the user, hashes the credentials and applies the requested
/// group memberships in one transaction.
pub async fn create_admin(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Json(req): Json<CreateAdminRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    req.validate()?;
    require_permission(&state, &caller, gate_for(Some(UserRole::Admin)).add).await?;
    let ngo_id = require_ngo(&caller)?;

    let groups = PermissionGroupRepository::new(state.pool.clone());
    let resolved = groups.resolve_keys(ngo_id, &req.permission_groups).await?;
    let mut group_ids = Vec::with_capacity(req.permission_groups.len());
    for key in &req.permission_groups {
        match resolved.iter().find(|(k, _)| k == key) {
            Some((_, id)) => group_ids.push(*id),
            None => {
                return Err(ApiError::Validation(format!(
                    "Unknown permission group: {}",
                    key
                )))
            }
        }
    }

    let admin = accounts::create_admin(&state.pool, ngo_id, &req, &group_ids).await?;
    Ok((StatusCode::CREATED, Json(admin.into())))
}

/// GET /api/v1/admins/:key
pub async fn get_admin(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(
        get_role(&state, &caller, &key, Some(UserRole::Admin)).await?,
    ))
}

/// PUT /api/v1/admins/:key
pub async fn update_admin(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(
        update_role(&state, &caller, &key, Some(UserRole::Admin), &req).await?,
    ))
}

/// DELETE /api/v1/admins/:key
pub async fn delete_admin(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    delete_role(&state, &caller, &key, Some(UserRole::Admin)).await
}
