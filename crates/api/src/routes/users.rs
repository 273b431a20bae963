//! User collection and targeted account actions.
//!
//! `/users` is the role-agnostic collection; `/admins`, `/athletes` and
//! `/coaches` are role-specialized views over the same table. The
//! helpers here are shared by all four.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use domain::models::user::{
    ChangeLanguageRequest, CreateMemberRequest, CreateUserRequest, ListUsersQuery,
    ResetPasswordRequest, UpdateUserRequest, User, UserResponse, UserRole,
};
use domain::permissions::Permission;
use persistence::repositories::measurement::MeasurementRepository;
use persistence::repositories::user::UserRepository;
use shared::keys::generate_public_key;
use shared::pagination::{Page, PageParams};
use shared::password::{check_password_policy, hash_password};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::accounts;
use crate::services::authz::{check_same_ngo, require_ngo, require_permission};

/// Permission family guarding a role collection.
#[derive(Clone, Copy)]
pub(crate) struct RoleGate {
    pub view: Permission,
    pub add: Permission,
    pub change: Permission,
    pub delete: Permission,
}

pub(crate) fn gate_for(role: Option<UserRole>) -> RoleGate {
    match role {
        None => RoleGate {
            view: Permission::ViewUser,
            add: Permission::AddUser,
            change: Permission::ChangeUser,
            delete: Permission::DeleteUser,
        },
        Some(UserRole::Admin) => RoleGate {
            view: Permission::ViewAdmin,
            add: Permission::AddAdmin,
            change: Permission::ChangeAdmin,
            delete: Permission::DeleteAdmin,
        },
        Some(UserRole::Coach) => RoleGate {
            view: Permission::ViewCoach,
            add: Permission::AddCoach,
            change: Permission::ChangeCoach,
            delete: Permission::DeleteCoach,
        },
        Some(UserRole::Athlete) => RoleGate {
            view: Permission::ViewAthlete,
            add: Permission::AddAthlete,
            change: Permission::ChangeAthlete,
            delete: Permission::DeleteAthlete,
        },
    }
}

/// Loads a user by key, enforcing role membership and NGO ownership.
/// A key of the wrong role collection reads as absent.
pub(crate) async fn load_scoped_user(
    state: &AppState,
    caller: &User,
    key: &str,
    role: Option<UserRole>,
) -> Result<User, ApiError> {
    let target = UserRepository::new(state.pool.clone())
        .find_by_key(key)
        .await?
        .filter(|u| role.map_or(true, |r| u.role == r))
        .ok_or_else(|| ApiError::NotFound(format!("User {} not found", key)))?;

    check_same_ngo(caller, target.ngo_id)?;
    Ok(target)
}

pub(crate) async fn list_role(
    state: &AppState,
    caller: &User,
    role: Option<UserRole>,
    query: &ListUsersQuery,
) -> Result<Page<UserResponse>, ApiError> {
    require_permission(state, caller, gate_for(role).view).await?;
    let ngo_id = require_ngo(caller)?;

    let (users, total) = UserRepository::new(state.pool.clone())
        .list(ngo_id, role, query)
        .await?;

    let params = PageParams::from_query(query.page, query.per_page);
    Ok(Page::new(
        users.into_iter().map(UserResponse::from).collect(),
        params,
        total,
    ))
}

pub(crate) async fn get_role(
    state: &AppState,
    caller: &User,
    key: &str,
    role: Option<UserRole>,
) -> Result<UserResponse, ApiError> {
    require_permission(state, caller, gate_for(role).view).await?;
    let target = load_scoped_user(state, caller, key, role).await?;
    Ok(target.into())
}

pub(crate) async fn update_role(
    state: &AppState,
    caller: &User,
    key: &str,
    role: Option<UserRole>,
    req: &UpdateUserRequest,
) -> Result<UserResponse, ApiError> {
    req.validate()?;
    require_permission(state, caller, gate_for(role).change).await?;
    let target = load_scoped_user(state, caller, key, role).await?;

    let updated = UserRepository::new(state.pool.clone())
        .update(
            target.id,
            req.first_name.as_deref(),
            req.middle_name.as_deref(),
            req.last_name.as_deref(),
            req.email.as_deref(),
            req.language,
        )
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {} not found", key)))?;

    Ok(updated.into())
}

pub(crate) async fn delete_role(
    state: &AppState,
    caller: &User,
    key: &str,
    role: Option<UserRole>,
) -> Result<StatusCode, ApiError> {
    require_permission(state, caller, gate_for(role).delete).await?;
    let target = load_scoped_user(state, caller, key, role).await?;

    UserRepository::new(state.pool.clone()).delete(target.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Shared creation path for athletes and coaches: validates the baseline
/// batch against the measurement catalog, then hands off to the
/// transactional service.
pub(crate) async fn create_member_of_role(
    state: &AppState,
    caller: &User,
    role: UserRole,
    req: &CreateMemberRequest,
) -> Result<UserResponse, ApiError> {
    req.validate()?;
    require_permission(state, caller, gate_for(Some(role)).add).await?;
    let ngo_id = require_ngo(caller)?;

    let measurements = MeasurementRepository::new(state.pool.clone());
    let mut rows = Vec::with_capacity(req.baselines.len());
    for baseline in &req.baselines {
        let measurement = measurements
            .find_by_key(&baseline.measurement_key)
            .await?
            .filter(|m| m.ngo_id == ngo_id)
            .ok_or_else(|| {
                ApiError::Validation(format!(
                    "Unknown measurement: {}",
                    baseline.measurement_key
                ))
            })?;

        if !baseline.value.matches(measurement.input_type) {
            return Err(ApiError::Validation(format!(
                "Value for {} must be of type {}",
                measurement.label, measurement.input_type
            )));
        }

        rows.push(accounts::BaselineRow {
            measurement_id: measurement.id,
            value: baseline.value.canonical(),
        });
    }

    let user = accounts::create_member(&state.pool, ngo_id, caller.id, role, req, &rows).await?;
    Ok(user.into())
}

/// GET /api/v1/users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Page<UserResponse>>, ApiError> {
    Ok(Json(list_role(&state, &caller, None, &query).await?))
}

/// POST /api/v1/users
pub async fn create_user(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    req.validate()?;
    require_permission(&state, &caller, gate_for(None).add).await?;
    let ngo_id = require_ngo(&caller)?;

    let user = UserRepository::new(state.pool.clone())
        .create(
            &generate_public_key(),
            &req.first_name,
            req.middle_name.as_deref(),
            &req.last_name,
            Some(ngo_id),
            req.email.as_deref(),
            None,
            req.role,
            req.language.unwrap_or_default(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /api/v1/users/:key
pub async fn get_user(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(get_role(&state, &caller, &key, None).await?))
}

/// PUT /api/v1/users/:key
pub async fn update_user(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(update_role(&state, &caller, &key, None, &req).await?))
}

/// DELETE /api/v1/users/:key
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    delete_role(&state, &caller, &key, None).await
}

/// POST /api/v1/users/:key/activate
pub async fn activate_user(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    set_user_active(&state, &caller, &key, true).await
}

/// POST /api/v1/users/:key/deactivate
pub async fn deactivate_user(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    set_user_active(&state, &caller, &key, false).await
}

async fn set_user_active(
    state: &AppState,
    caller: &User,
    key: &str,
    is_active: bool,
) -> Result<Json<UserResponse>, ApiError> {
    require_permission(state, caller, Permission::ChangeUser).await?;
    let target = load_scoped_user(state, caller, key, None).await?;

    let repo = UserRepository::new(state.pool.clone());
    repo.set_active(target.id, is_active).await?;
    let refreshed = repo
        .find_by_key(key)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {} not found", key)))?;

    Ok(Json(refreshed.into()))
}

/// POST /api/v1/users/:key/reset_password
pub async fn reset_password(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<StatusCode, ApiError> {
    require_permission(&state, &caller, Permission::ChangeUser).await?;
    let target = load_scoped_user(&state, &caller, &key, None).await?;

    check_password_policy(&req.password, &req.confirm_password)?;
    let hash = hash_password(&req.password)?;

    // the reset flag forces a change at the target's next login
    UserRepository::new(state.pool.clone())
        .set_password(target.id, &hash, true)
        .await?;

    tracing::info!(user_key = %target.key, "Password reset");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/users/:key/change_language
pub async fn change_language(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
    Json(req): Json<ChangeLanguageRequest>,
) -> Result<StatusCode, ApiError> {
    require_permission(&state, &caller, Permission::ChangeUser).await?;
    let target = load_scoped_user(&state, &caller, &key, None).await?;

    UserRepository::new(state.pool.clone())
        .set_language(target.id, req.language)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
