//! NGO endpoints: tenant CRUD, bootstrap, nested listings, the
//! supervision hierarchy and registration form bindings.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use domain::hierarchy::{
    build_overview, flatten_edges, validate_edges, HierarchyMember, HierarchyNodeInput,
    HierarchyNodeView,
};
use domain::models::ngo::{
    BindRegistrationFormRequest, CreateNgoRequest, ListNgosQuery, Ngo, NgoResponse,
    UpdateNgoRequest,
};
use domain::models::resource::{ResourceKind, ResourceResponse};
use domain::models::user::{User, UserResponse, UserRole};
use domain::models::measurement::MeasurementResponse;
use domain::models::permission_group::PermissionGroupResponse;
use domain::permissions::Permission;
use persistence::repositories::hierarchy::HierarchyRepository;
use persistence::repositories::measurement::MeasurementRepository;
use persistence::repositories::ngo::NgoRepository;
use persistence::repositories::permission_group::PermissionGroupRepository;
use persistence::repositories::resource::ResourceRepository;
use persistence::repositories::user::UserRepository;
use shared::pagination::{Page, PageParams};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::routes::permission_groups::group_response;
use crate::services::authz::{check_same_ngo, require_permission, require_platform};
use crate::services::ngo_bootstrap::bootstrap_ngo;

async fn load_ngo(state: &AppState, key: &str) -> Result<Ngo, ApiError> {
    NgoRepository::new(state.pool.clone())
        .find_by_key(key)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("NGO {} not found", key)))
}

async fn load_scoped_ngo(state: &AppState, caller: &User, key: &str) -> Result<Ngo, ApiError> {
    let ngo = load_ngo(state, key).await?;
    check_same_ngo(caller, Some(ngo.id))?;
    Ok(ngo)
}

fn parse_role(role: &str) -> Result<UserRole, ApiError> {
    role.parse()
        .map_err(|_| ApiError::Validation(format!("Unknown role: {}", role)))
}

/// GET /api/v1/ngos
pub async fn list_ngos(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Query(query): Query<ListNgosQuery>,
) -> Result<Json<Page<NgoResponse>>, ApiError> {
    require_platform(&caller)?;

    let (ngos, total) = NgoRepository::new(state.pool.clone()).list(&query).await?;

    let params = PageParams::from_query(query.page, query.per_page);
    Ok(Json(Page::new(
        ngos.into_iter().map(Into::into).collect(),
        params,
        total,
    )))
}

/// POST /api/v1/ngos
///
/// Bootstraps the tenant in one transaction: the NGO row, its default
/// measurement types, the first admin and the seed permission groups.
pub async fn create_ngo(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Json(req): Json<CreateNgoRequest>,
) -> Result<(StatusCode, Json<NgoResponse>), ApiError> {
    require_platform(&caller)?;
    req.validate()?;

    let (ngo, _admin) = bootstrap_ngo(&state.pool, &req).await?;
    Ok((StatusCode::CREATED, Json(ngo.into())))
}

/// GET /api/v1/ngos/active
///
/// Public listing used by registration pages.
pub async fn active_ngos(
    State(state): State<AppState>,
) -> Result<Json<Vec<NgoResponse>>, ApiError> {
    let ngos = NgoRepository::new(state.pool.clone()).list_active().await?;
    Ok(Json(ngos.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/ngos/:key
pub async fn get_ngo(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<NgoResponse>, ApiError> {
    let ngo = load_scoped_ngo(&state, &caller, &key).await?;
    Ok(Json(ngo.into()))
}

/// PUT /api/v1/ngos/:key
pub async fn update_ngo(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
    Json(req): Json<UpdateNgoRequest>,
) -> Result<Json<NgoResponse>, ApiError> {
    require_platform(&caller)?;
    req.validate()?;
    let ngo = load_ngo(&state, &key).await?;

    let updated = NgoRepository::new(state.pool.clone())
        .update(
            ngo.id,
            req.name.as_deref(),
            req.logo.as_deref(),
            req.description.as_deref(),
        )
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("NGO {} not found", key)))?;

    Ok(Json(updated.into()))
}

/// DELETE /api/v1/ngos/:key
pub async fn delete_ngo(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_platform(&caller)?;
    let ngo = load_ngo(&state, &key).await?;

    NgoRepository::new(state.pool.clone()).delete(ngo.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/ngos/:key/activate
pub async fn activate_ngo(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<NgoResponse>, ApiError> {
    set_ngo_active(&state, &caller, &key, true).await
}

/// POST /api/v1/ngos/:key/deactivate
pub async fn deactivate_ngo(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<NgoResponse>, ApiError> {
    set_ngo_active(&state, &caller, &key, false).await
}

async fn set_ngo_active(
    state: &AppState,
    caller: &User,
    key: &str,
    is_active: bool,
) -> Result<Json<NgoResponse>, ApiError> {
    require_platform(caller)?;
    let ngo = load_ngo(state, key).await?;

    let repo = NgoRepository::new(state.pool.clone());
    repo.set_active(ngo.id, is_active).await?;
    let refreshed = repo
        .find_by_key(key)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("NGO {} not found", key)))?;

    Ok(Json(refreshed.into()))
}

/// GET /api/v1/ngos/:key/measurements
pub async fn ngo_measurements(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<Vec<MeasurementResponse>>, ApiError> {
    require_permission(&state, &caller, Permission::ViewMeasurement).await?;
    let ngo = load_scoped_ngo(&state, &caller, &key).await?;

    let (measurements, _) = MeasurementRepository::new(state.pool.clone())
        .list(ngo.id, &Default::default())
        .await?;

    Ok(Json(measurements.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/ngos/:key/permission_groups
pub async fn ngo_permission_groups(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<Vec<PermissionGroupResponse>>, ApiError> {
    require_permission(&state, &caller, Permission::ViewPermissionGroup).await?;
    let ngo = load_scoped_ngo(&state, &caller, &key).await?;

    let groups = PermissionGroupRepository::new(state.pool.clone())
        .list_for_ngo(ngo.id)
        .await?;

    let mut responses = Vec::with_capacity(groups.len());
    for group in groups {
        responses.push(group_response(&state, group).await?);
    }
    Ok(Json(responses))
}

/// GET /api/v1/ngos/:key/files
pub async fn ngo_files(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<Vec<ResourceResponse>>, ApiError> {
    nested_resources(&state, &caller, &key, ResourceKind::File, Permission::ViewFile).await
}

/// GET /api/v1/ngos/:key/curricula
pub async fn ngo_curricula(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<Vec<ResourceResponse>>, ApiError> {
    nested_resources(
        &state,
        &caller,
        &key,
        ResourceKind::Curriculum,
        Permission::ViewCurriculum,
    )
    .await
}

/// GET /api/v1/ngos/:key/training_sessions
pub async fn ngo_training_sessions(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<Vec<ResourceResponse>>, ApiError> {
    nested_resources(
        &state,
        &caller,
        &key,
        ResourceKind::Session,
        Permission::ViewTrainingSession,
    )
    .await
}

async fn nested_resources(
    state: &AppState,
    caller: &User,
    key: &str,
    kind: ResourceKind,
    permission: Permission,
) -> Result<Json<Vec<ResourceResponse>>, ApiError> {
    require_permission(state, caller, permission).await?;
    let ngo = load_scoped_ngo(state, caller, key).await?;

    let resources = ResourceRepository::new(state.pool.clone())
        .list_by_kind(ngo.id, kind)
        .await?;

    Ok(Json(resources.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/ngos/:key/users
///
/// Active users of the NGO, for member pickers.
pub async fn ngo_users(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    require_permission(&state, &caller, Permission::ViewUser).await?;
    let ngo = load_scoped_ngo(&state, &caller, &key).await?;

    let users = UserRepository::new(state.pool.clone())
        .list_active_for_ngo(ngo.id)
        .await?;

    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/ngos/:key/user_hierarchy
pub async fn get_user_hierarchy(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<Vec<HierarchyNodeView>>, ApiError> {
    require_permission(&state, &caller, Permission::ViewUser).await?;
    let ngo = load_scoped_ngo(&state, &caller, &key).await?;

    let users = UserRepository::new(state.pool.clone())
        .list_active_for_ngo(ngo.id)
        .await?;
    let members: Vec<HierarchyMember> = users
        .iter()
        .map(|u| HierarchyMember {
            key: u.key.clone(),
            role: u.role,
            label: u.name(),
        })
        .collect();

    let edges = HierarchyRepository::new(state.pool.clone())
        .edges_for_ngo(ngo.id)
        .await?;

    Ok(Json(build_overview(&members, &edges)))
}

/// POST /api/v1/ngos/:key/user_hierarchy
///
/// Replaces the NGO's whole supervision hierarchy. The submitted trees
/// are flattened and validated in memory first; the edge swap itself is
/// a single transaction.
pub async fn save_user_hierarchy(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
    Json(trees): Json<Vec<HierarchyNodeInput>>,
) -> Result<StatusCode, ApiError> {
    require_permission(&state, &caller, Permission::ChangeUser).await?;
    let ngo = load_scoped_ngo(&state, &caller, &key).await?;

    let edges = flatten_edges(&trees).map_err(|e| ApiError::Validation(e.to_string()))?;
    validate_edges(&edges).map_err(|e| ApiError::Validation(e.to_string()))?;

    let mut keys: Vec<String> = Vec::new();
    for edge in &edges {
        if let Some(parent) = &edge.parent {
            if !keys.contains(parent) {
                keys.push(parent.clone());
            }
        }
        if !keys.contains(&edge.child) {
            keys.push(edge.child.clone());
        }
    }

    let resolved = UserRepository::new(state.pool.clone())
        .resolve_keys(ngo.id, &keys)
        .await?;
    let lookup = |k: &str| -> Result<uuid::Uuid, ApiError> {
        resolved
            .iter()
            .find(|(rk, _)| rk == k)
            .map(|(_, id)| *id)
            .ok_or_else(|| ApiError::Validation(format!("Unknown user: {}", k)))
    };

    let mut pairs = Vec::with_capacity(edges.len());
    for edge in &edges {
        let parent_id = match &edge.parent {
            Some(parent) => Some(lookup(parent)?),
            None => None,
        };
        pairs.push((parent_id, lookup(&edge.child)?));
    }

    HierarchyRepository::new(state.pool.clone())
        .rebuild(ngo.id, &pairs)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/ngos/:key/registration_form/:role
///
/// Binds a resource as the NGO's registration form for a role,
/// replacing any existing binding.
pub async fn bind_registration_form(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path((key, role)): Path<(String, String)>,
    Json(req): Json<BindRegistrationFormRequest>,
) -> Result<StatusCode, ApiError> {
    require_permission(&state, &caller, Permission::ChangeResource).await?;
    req.validate()?;
    let role = parse_role(&role)?;
    let ngo = load_scoped_ngo(&state, &caller, &key).await?;

    let repo = ResourceRepository::new(state.pool.clone());
    let resource = repo
        .find_by_key(&req.resource_key)
        .await?
        .filter(|r| r.ngo_id == ngo.id)
        .ok_or_else(|| {
            ApiError::Validation(format!("Unknown resource: {}", req.resource_key))
        })?;

    repo.bind_registration_form(ngo.id, role, resource.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/ngos/:key/registration_form/:role
///
/// Public fetch used by registration pages. 404 when nothing is bound
/// or the bound resource was deactivated.
pub async fn get_registration_form(
    State(state): State<AppState>,
    Path((key, role)): Path<(String, String)>,
) -> Result<Json<ResourceResponse>, ApiError> {
    let role = parse_role(&role)?;
    let ngo = load_ngo(&state, &key).await?;

    let resource = ResourceRepository::new(state.pool.clone())
        .find_registration_form(ngo.id, role)
        .await?
        .filter(|r| r.is_active)
        .ok_or_else(|| {
            ApiError::NotFound(format!("No registration form bound for {}", role))
        })?;

    Ok(Json(resource.into()))
}
