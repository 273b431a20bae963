//! Athlete collection.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use domain::models::user::{CreateMemberRequest, ListUsersQuery, UpdateUserRequest, UserResponse, UserRole};
use shared::pagination::Page;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::routes::users::{create_member_of_role, delete_role, get_role, list_role, update_role};

/// GET /api/v1/athletes
pub async fn list_athletes(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Page<UserResponse>>, ApiError> {
    Ok(Json(
        list_role(&state, &caller, Some(UserRole::Athlete), &query).await?,
    ))
}

/// POST /api/v1/athletes
///
/// The user row and any baseline readings land in one transaction; an
/// invalid baseline aborts the whole creation.
pub async fn create_athlete(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Json(req): Json<CreateMemberRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let athlete = create_member_of_role(&state, &caller, UserRole::Athlete, &req).await?;
    Ok((StatusCode::CREATED, Json(athlete)))
}

/// GET /api/v1/athletes/:key
pub async fn get_athlete(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(
        get_role(&state, &caller, &key, Some(UserRole::Athlete)).await?,
    ))
}

/// PUT /api/v1/athletes/:key
pub async fn update_athlete(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(
        update_role(&state, &caller, &key, Some(UserRole::Athlete), &req).await?,
    ))
}

/// DELETE /api/v1/athletes/:key
pub async fn delete_athlete(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    delete_role(&state, &caller, &key, Some(UserRole::Athlete)).await
}
