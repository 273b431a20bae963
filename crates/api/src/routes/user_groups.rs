//! User group endpoints (ad hoc sharing groups).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use domain::models::user::User;
use domain::models::user_group::{
    CreateUserGroupRequest, ListUserGroupsQuery, UpdateUserGroupRequest, UserGroup,
    UserGroupResponse,
};
use domain::permissions::Permission;
use persistence::repositories::resource::ResourceRepository;
use persistence::repositories::user::UserRepository;
use persistence::repositories::user_group::UserGroupRepository;
use shared::keys::generate_public_key;
use shared::pagination::{Page, PageParams};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::authz::{check_same_ngo, require_ngo, require_permission};

async fn load_scoped_group(
    state: &AppState,
    caller: &User,
    key: &str,
) -> Result<UserGroup, ApiError> {
    let group = UserGroupRepository::new(state.pool.clone())
        .find_by_key(key)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User group {} not found", key)))?;

    check_same_ngo(caller, Some(group.ngo_id))?;
    Ok(group)
}

async fn resolve_member_keys(
    state: &AppState,
    ngo_id: Uuid,
    keys: &[String],
) -> Result<Vec<Uuid>, ApiError> {
    let resolved = UserRepository::new(state.pool.clone())
        .resolve_keys(ngo_id, keys)
        .await?;

    let mut ids = Vec::with_capacity(keys.len());
    for key in keys {
        match resolved.iter().find(|(k, _)| k == key) {
            Some((_, id)) => ids.push(*id),
            None => return Err(ApiError::Validation(format!("Unknown user: {}", key))),
        }
    }
    Ok(ids)
}

async fn resolve_resource_keys(
    state: &AppState,
    ngo_id: Uuid,
    keys: &[String],
) -> Result<Vec<Uuid>, ApiError> {
    let resolved = ResourceRepository::new(state.pool.clone())
        .resolve_keys(ngo_id, keys)
        .await?;

    let mut ids = Vec::with_capacity(keys.len());
    for key in keys {
        match resolved.iter().find(|(k, _)| k == key) {
            Some((_, id)) => ids.push(*id),
            None => return Err(ApiError::Validation(format!("Unknown resource: {}", key))),
        }
    }
    Ok(ids)
}

async fn group_response(
    state: &AppState,
    group: UserGroup,
) -> Result<UserGroupResponse, ApiError> {
    let repo = UserGroupRepository::new(state.pool.clone());
    let members = repo.member_keys(group.id).await?;
    let resources = repo.resource_keys(group.id).await?;

    Ok(UserGroupResponse {
        key: group.key,
        label: group.label,
        is_active: group.is_active,
        members,
        resources,
        created_at: group.created_at,
        updated_at: group.updated_at,
    })
}

/// GET /api/v1/user_groups
pub async fn list_user_groups(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Query(query): Query<ListUserGroupsQuery>,
) -> Result<Json<Page<UserGroupResponse>>, ApiError> {
    require_permission(&state, &caller, Permission::ViewCustomUserGroup).await?;
    let ngo_id = require_ngo(&caller)?;

    let (groups, total) = UserGroupRepository::new(state.pool.clone())
        .list(ngo_id, &query)
        .await?;

    let mut responses = Vec::with_capacity(groups.len());
    for group in groups {
        responses.push(group_response(&state, group).await?);
    }

    let params = PageParams::from_query(query.page, query.per_page);
    Ok(Json(Page::new(responses, params, total)))
}

/// POST /api/v1/user_groups
pub async fn create_user_group(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Json(req): Json<CreateUserGroupRequest>,
) -> Result<(StatusCode, Json<UserGroupResponse>), ApiError> {
    req.validate()?;
    require_permission(&state, &caller, Permission::AddCustomUserGroup).await?;
    let ngo_id = require_ngo(&caller)?;

    let member_ids = resolve_member_keys(&state, ngo_id, &req.members).await?;
    let resource_ids = resolve_resource_keys(&state, ngo_id, &req.resources).await?;

    let group = UserGroupRepository::new(state.pool.clone())
        .create(
            &generate_public_key(),
            ngo_id,
            &req.label,
            &member_ids,
            &resource_ids,
        )
        .await?;

    let response = group_response(&state, group).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/user_groups/:key
pub async fn get_user_group(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<UserGroupResponse>, ApiError> {
    require_permission(&state, &caller, Permission::ViewCustomUserGroup).await?;
    let group = load_scoped_group(&state, &caller, &key).await?;
    Ok(Json(group_response(&state, group).await?))
}

/// PUT /api/v1/user_groups/:key
pub async fn update_user_group(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
    Json(req): Json<UpdateUserGroupRequest>,
) -> Result<Json<UserGroupResponse>, ApiError> {
    req.validate()?;
    require_permission(&state, &caller, Permission::ChangeCustomUserGroup).await?;
    let group = load_scoped_group(&state, &caller, &key).await?;

    let member_ids = match &req.members {
        Some(keys) => Some(resolve_member_keys(&state, group.ngo_id, keys).await?),
        None => None,
    };
    let resource_ids = match &req.resources {
        Some(keys) => Some(resolve_resource_keys(&state, group.ngo_id, keys).await?),
        None => None,
    };

    let updated = UserGroupRepository::new(state.pool.clone())
        .update(
            group.id,
            req.label.as_deref(),
            member_ids.as_deref(),
            resource_ids.as_deref(),
        )
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User group {} not found", key)))?;

    Ok(Json(group_response(&state, updated).await?))
}

/// DELETE /api/v1/user_groups/:key
pub async fn delete_user_group(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_permission(&state, &caller, Permission::DeleteCustomUserGroup).await?;
    let group = load_scoped_group(&state, &caller, &key).await?;

    UserGroupRepository::new(state.pool.clone())
        .delete(group.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/user_groups/:key/activate
pub async fn activate_user_group(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<UserGroupResponse>, ApiError> {
    set_group_active(&state, &caller, &key, true).await
}

/// POST /api/v1/user_groups/:key/deactivate
pub async fn deactivate_user_group(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<UserGroupResponse>, ApiError> {
    set_group_active(&state, &caller, &key, false).await
}

async fn set_group_active(
    state: &AppState,
    caller: &User,
    key: &str,
    is_active: bool,
) -> Result<Json<UserGroupResponse>, ApiError> {
    require_permission(state, caller, Permission::ChangeCustomUserGroup).await?;
    let group = load_scoped_group(state, caller, key).await?;

    let repo = UserGroupRepository::new(state.pool.clone());
    repo.set_active(group.id, is_active).await?;
    let refreshed = repo
        .find_by_key(key)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User group {} not found", key)))?;

    Ok(Json(group_response(state, refreshed).await?))
}
