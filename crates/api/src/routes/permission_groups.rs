//! Permission group endpoints and the grantable-permission catalog.

use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use domain::models::permission_group::{
    CreatePermissionGroupRequest, ListPermissionGroupsQuery, PermissionGroup,
    PermissionGroupResponse, UpdatePermissionGroupRequest,
};
use domain::models::user::User;
use domain::permissions::{grantable_catalog, is_blacklisted, Permission, PermissionInfo};
use persistence::repositories::permission_group::PermissionGroupRepository;
use shared::keys::generate_public_key;
use shared::pagination::{Page, PageParams};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::authz::{check_same_ngo, require_ngo, require_permission};

/// Rejects blacklisted and unknown codenames before anything is stored.
fn check_grantable(codes: &[String]) -> Result<(), ApiError> {
    for code in codes {
        if is_blacklisted(code) {
            return Err(ApiError::Validation(format!(
                "Permission {} cannot be granted",
                code
            )));
        }
        if Permission::from_str(code).is_err() {
            return Err(ApiError::Validation(format!("Unknown permission: {}", code)));
        }
    }
    Ok(())
}

async fn load_scoped_group(
    state: &AppState,
    caller: &User,
    key: &str,
) -> Result<PermissionGroup, ApiError> {
    let group = PermissionGroupRepository::new(state.pool.clone())
        .find_by_key(key)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Permission group {} not found", key)))?;

    check_same_ngo(caller, Some(group.ngo_id))?;
    Ok(group)
}

pub(crate) async fn group_response(
    state: &AppState,
    group: PermissionGroup,
) -> Result<PermissionGroupResponse, ApiError> {
    let codes = PermissionGroupRepository::new(state.pool.clone())
        .permissions_for_group(group.id)
        .await?;

    let permissions = codes
        .iter()
        .filter_map(|c| Permission::from_str(c).ok())
        .collect();

    Ok(PermissionGroupResponse {
        key: group.key,
        name: group.name,
        permissions,
        created_at: group.created_at,
        updated_at: group.updated_at,
    })
}

/// GET /api/v1/permissions
///
/// Static catalog of every codename a group may be granted.
pub async fn list_permissions(
    Extension(AuthUser(_caller)): Extension<AuthUser>,
) -> Json<Vec<PermissionInfo>> {
    Json(grantable_catalog())
}

/// GET /api/v1/permission_groups
pub async fn list_permission_groups(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Query(query): Query<ListPermissionGroupsQuery>,
) -> Result<Json<Page<PermissionGroupResponse>>, ApiError> {
    require_permission(&state, &caller, Permission::ViewPermissionGroup).await?;
    let ngo_id = require_ngo(&caller)?;

    let (groups, total) = PermissionGroupRepository::new(state.pool.clone())
        .list(ngo_id, &query)
        .await?;

    let mut responses = Vec::with_capacity(groups.len());
    for group in groups {
        responses.push(group_response(&state, group).await?);
    }

    let params = PageParams::from_query(query.page, query.per_page);
    Ok(Json(Page::new(responses, params, total)))
}

/// POST /api/v1/permission_groups
pub async fn create_permission_group(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Json(req): Json<CreatePermissionGroupRequest>,
) -> Result<(StatusCode, Json<PermissionGroupResponse>), ApiError> {
    req.validate()?;
    require_permission(&state, &caller, Permission::AddPermissionGroup).await?;
    let ngo_id = require_ngo(&caller)?;
    check_grantable(&req.permissions)?;

    let group = PermissionGroupRepository::new(state.pool.clone())
        .create(&generate_public_key(), ngo_id, &req.name, &req.permissions)
        .await?;

    let response = group_response(&state, group).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/permission_groups/:key
pub async fn get_permission_group(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<PermissionGroupResponse>, ApiError> {
    require_permission(&state, &caller, Permission::ViewPermissionGroup).await?;
    let group = load_scoped_group(&state, &caller, &key).await?;
    Ok(Json(group_response(&state, group).await?))
}

/// PUT /api/v1/permission_groups/:key
pub async fn update_permission_group(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
    Json(req): Json<UpdatePermissionGroupRequest>,
) -> Result<Json<PermissionGroupResponse>, ApiError> {
    req.validate()?;
    require_permission(&state, &caller, Permission::ChangePermissionGroup).await?;
    let group = load_scoped_group(&state, &caller, &key).await?;
    if let Some(ref permissions) = req.permissions {
        check_grantable(permissions)?;
    }

    let updated = PermissionGroupRepository::new(state.pool.clone())
        .update(group.id, req.name.as_deref(), req.permissions.as_deref())
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Permission group {} not found", key)))?;

    Ok(Json(group_response(&state, updated).await?))
}

/// DELETE /api/v1/permission_groups/:key
pub async fn delete_permission_group(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_permission(&state, &caller, Permission::DeletePermissionGroup).await?;
    let group = load_scoped_group(&state, &caller, &key).await?;

    PermissionGroupRepository::new(state.pool.clone())
        .delete(group.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_grantable_accepts_known_codenames() {
        let codes = vec!["view_athlete".to_string(), "add_measurement".to_string()];
        assert!(check_grantable(&codes).is_ok());
    }

    #[test]
    fn test_check_grantable_rejects_unknown() {
        let codes = vec!["fly_to_the_moon".to_string()];
        let err = check_grantable(&codes).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_check_grantable_rejects_blacklisted() {
        let blocked = domain::permissions::PERMISSION_BLACKLIST[0].to_string();
        let err = check_grantable(&[blocked]).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
