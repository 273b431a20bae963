//! Measurement type endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use validator::Validate;

use domain::models::measurement::{MeasurementType, MeasurementTypeRequest, MeasurementTypeResponse};
use domain::models::user::User;
use domain::permissions::Permission;
use persistence::repositories::measurement::MeasurementTypeRepository;
use shared::keys::generate_public_key;
use shared::pagination::{Page, PageParams};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::authz::{check_same_ngo, require_ngo, require_permission};

/// Query parameters for measurement type listings.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ListMeasurementTypesQuery {
    pub page: Option<i32>,
    pub per_page: Option<i32>,
    pub is_active: Option<String>,
    pub label: Option<String>,
}

async fn load_scoped_type(
    state: &AppState,
    caller: &User,
    key: &str,
) -> Result<MeasurementType, ApiError> {
    let mt = MeasurementTypeRepository::new(state.pool.clone())
        .find_by_key(key)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Measurement type {} not found", key)))?;

    check_same_ngo(caller, Some(mt.ngo_id))?;
    Ok(mt)
}

/// GET /api/v1/measurement_types
pub async fn list_measurement_types(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Query(query): Query<ListMeasurementTypesQuery>,
) -> Result<Json<Page<MeasurementTypeResponse>>, ApiError> {
    require_permission(&state, &caller, Permission::ViewMeasurementType).await?;
    let ngo_id = require_ngo(&caller)?;

    let (types, total) = MeasurementTypeRepository::new(state.pool.clone())
        .list(
            ngo_id,
            query.page,
            query.per_page,
            query.is_active.as_deref(),
            query.label.as_deref(),
        )
        .await?;

    let params = PageParams::from_query(query.page, query.per_page);
    Ok(Json(Page::new(
        types.into_iter().map(Into::into).collect(),
        params,
        total,
    )))
}

/// POST /api/v1/measurement_types
pub async fn create_measurement_type(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Json(req): Json<MeasurementTypeRequest>,
) -> Result<(StatusCode, Json<MeasurementTypeResponse>), ApiError> {
    req.validate()?;
    require_permission(&state, &caller, Permission::AddMeasurementType).await?;
    let ngo_id = require_ngo(&caller)?;

    let mt = MeasurementTypeRepository::new(state.pool.clone())
        .create(&generate_public_key(), ngo_id, &req.label)
        .await?;

    Ok((StatusCode::CREATED, Json(mt.into())))
}

/// GET /api/v1/measurement_types/:key
pub async fn get_measurement_type(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<MeasurementTypeResponse>, ApiError> {
    require_permission(&state, &caller, Permission::ViewMeasurementType).await?;
    let mt = load_scoped_type(&state, &caller, &key).await?;
    Ok(Json(mt.into()))
}

/// PUT /api/v1/measurement_types/:key
pub async fn update_measurement_type(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
    Json(req): Json<MeasurementTypeRequest>,
) -> Result<Json<MeasurementTypeResponse>, ApiError> {
    req.validate()?;
    require_permission(&state, &caller, Permission::ChangeMeasurementType).await?;
    let mt = load_scoped_type(&state, &caller, &key).await?;

    let updated = MeasurementTypeRepository::new(state.pool.clone())
        .update(mt.id, &req.label)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Measurement type {} not found", key)))?;

    Ok(Json(updated.into()))
}

/// DELETE /api/v1/measurement_types/:key
pub async fn delete_measurement_type(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_permission(&state, &caller, Permission::DeleteMeasurementType).await?;
    let mt = load_scoped_type(&state, &caller, &key).await?;

    MeasurementTypeRepository::new(state.pool.clone())
        .delete(mt.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/measurement_types/:key/activate
pub async fn activate_measurement_type(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<MeasurementTypeResponse>, ApiError> {
    set_type_active(&state, &caller, &key, true).await
}

/// POST /api/v1/measurement_types/:key/deactivate
pub async fn deactivate_measurement_type(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<MeasurementTypeResponse>, ApiError> {
    set_type_active(&state, &caller, &key, false).await
}

async fn set_type_active(
    state: &AppState,
    caller: &User,
    key: &str,
    is_active: bool,
) -> Result<Json<MeasurementTypeResponse>, ApiError> {
    require_permission(state, caller, Permission::ChangeMeasurementType).await?;
    let mt = load_scoped_type(state, caller, key).await?;

    let repo = MeasurementTypeRepository::new(state.pool.clone());
    repo.set_active(mt.id, is_active).await?;
    let refreshed = repo
        .find_by_key(key)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Measurement type {} not found", key)))?;

    Ok(Json(refreshed.into()))
}
