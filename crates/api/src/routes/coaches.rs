//! Coach collection.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use std::collections::HashMap;

use domain::hierarchy::collect_descendants;
use domain::models::user::{
    CreateMemberRequest, ListUsersQuery, UpdateUserRequest, UserResponse, UserRole,
};
use persistence::repositories::hierarchy::HierarchyRepository;
use persistence::repositories::user::UserRepository;
use shared::pagination::Page;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::routes::users::{
    create_member_of_role, delete_role, gate_for, get_role, list_role, load_scoped_user,
    update_role,
};
use crate::services::authz::{require_ngo, require_permission};

/// GET /api/v1/coaches
pub async fn list_coaches(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Page<UserResponse>>, ApiError> {
    Ok(Json(
        list_role(&state, &caller, Some(UserRole::Coach), &query).await?,
    ))
}

/// POST /api/v1/coaches
pub async fn create_coach(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Json(req): Json<CreateMemberRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let coach = create_member_of_role(&state, &caller, UserRole::Coach, &req).await?;
    Ok((StatusCode::CREATED, Json(coach)))
}

/// GET /api/v1/coaches/:key
pub async fn get_coach(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(
        get_role(&state, &caller, &key, Some(UserRole::Coach)).await?,
    ))
}

/// PUT /api/v1/coaches/:key
pub async fn update_coach(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(
        update_role(&state, &caller, &key, Some(UserRole::Coach), &req).await?,
    ))
}

/// DELETE /api/v1/coaches/:key
pub async fn delete_coach(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    delete_role(&state, &caller, &key, Some(UserRole::Coach)).await
}

/// GET /api/v1/coaches/:key/athletes
///
/// Every athlete below the coach in the supervision hierarchy, however
/// deep.
pub async fn coach_athletes(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    require_permission(&state, &caller, gate_for(Some(UserRole::Athlete)).view).await?;
    let coach = load_scoped_user(&state, &caller, &key, Some(UserRole::Coach)).await?;
    let ngo_id = require_ngo(&coach)?;

    let edges = HierarchyRepository::new(state.pool.clone())
        .edges_for_ngo(ngo_id)
        .await?;
    let descendant_keys = collect_descendants(&coach.key, &edges);

    let users = UserRepository::new(state.pool.clone())
        .list_active_for_ngo(ngo_id)
        .await?;
    let by_key: HashMap<&str, &domain::models::user::User> =
        users.iter().map(|u| (u.key.as_str(), u)).collect();

    let athletes = descendant_keys
        .iter()
        .filter_map(|k| by_key.get(k.as_str()))
        .filter(|u| u.role == UserRole::Athlete)
        .map(|u| UserResponse::from((*u).clone()))
        .collect();

    Ok(Json(athletes))
}
