//! Measurement catalog endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use domain::models::measurement::{
    CreateMeasurementRequest, ListMeasurementsQuery, Measurement, MeasurementResponse,
    UpdateMeasurementRequest, ATHLETE_BASELINE_TYPE, COACH_BASELINE_TYPE,
};
use domain::models::user::User;
use domain::permissions::Permission;
use persistence::repositories::measurement::{MeasurementRepository, MeasurementTypeRepository};
use shared::keys::generate_public_key;
use shared::pagination::{Page, PageParams};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::authz::{check_same_ngo, require_ngo, require_permission};

async fn load_scoped_measurement(
    state: &AppState,
    caller: &User,
    key: &str,
) -> Result<Measurement, ApiError> {
    let measurement = MeasurementRepository::new(state.pool.clone())
        .find_by_key(key)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Measurement {} not found", key)))?;

    check_same_ngo(caller, Some(measurement.ngo_id))?;
    Ok(measurement)
}

/// Resolves measurement type keys to ids, rejecting keys of other NGOs.
async fn resolve_type_keys(
    state: &AppState,
    ngo_id: Uuid,
    keys: &[String],
) -> Result<Vec<Uuid>, ApiError> {
    let resolved = MeasurementTypeRepository::new(state.pool.clone())
        .resolve_keys(ngo_id, keys)
        .await?;

    let mut ids = Vec::with_capacity(keys.len());
    for key in keys {
        match resolved.iter().find(|(k, _)| k == key) {
            Some((_, id)) => ids.push(*id),
            None => {
                return Err(ApiError::Validation(format!(
                    "Unknown measurement type: {}",
                    key
                )))
            }
        }
    }
    Ok(ids)
}

/// GET /api/v1/measurements
pub async fn list_measurements(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Query(query): Query<ListMeasurementsQuery>,
) -> Result<Json<Page<MeasurementResponse>>, ApiError> {
    require_permission(&state, &caller, Permission::ViewMeasurement).await?;
    let ngo_id = require_ngo(&caller)?;

    let (measurements, total) = MeasurementRepository::new(state.pool.clone())
        .list(ngo_id, &query)
        .await?;

    let params = PageParams::from_query(query.page, query.per_page);
    Ok(Json(Page::new(
        measurements.into_iter().map(Into::into).collect(),
        params,
        total,
    )))
}

/// POST /api/v1/measurements
pub async fn create_measurement(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Json(req): Json<CreateMeasurementRequest>,
) -> Result<(StatusCode, Json<MeasurementResponse>), ApiError> {
    req.validate()?;
    require_permission(&state, &caller, Permission::AddMeasurement).await?;
    let ngo_id = require_ngo(&caller)?;

    let type_ids = resolve_type_keys(&state, ngo_id, &req.types).await?;

    let measurement = MeasurementRepository::new(state.pool.clone())
        .create(
            &generate_public_key(),
            ngo_id,
            &req.label,
            req.input_type,
            req.uom.as_deref(),
            &type_ids,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(measurement.into())))
}

/// GET /api/v1/measurements/:key
pub async fn get_measurement(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<MeasurementResponse>, ApiError> {
    require_permission(&state, &caller, Permission::ViewMeasurement).await?;
    let measurement = load_scoped_measurement(&state, &caller, &key).await?;
    Ok(Json(measurement.into()))
}

/// PUT /api/v1/measurements/:key
pub async fn update_measurement(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
    Json(req): Json<UpdateMeasurementRequest>,
) -> Result<Json<MeasurementResponse>, ApiError> {
    req.validate()?;
    require_permission(&state, &caller, Permission::ChangeMeasurement).await?;
    let measurement = load_scoped_measurement(&state, &caller, &key).await?;

    let type_ids = match &req.types {
        Some(keys) => Some(resolve_type_keys(&state, measurement.ngo_id, keys).await?),
        None => None,
    };

    let updated = MeasurementRepository::new(state.pool.clone())
        .update(
            measurement.id,
            req.label.as_deref(),
            req.input_type,
            req.uom.as_deref(),
            type_ids.as_deref(),
        )
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Measurement {} not found", key)))?;

    Ok(Json(updated.into()))
}

/// DELETE /api/v1/measurements/:key
pub async fn delete_measurement(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_permission(&state, &caller, Permission::DeleteMeasurement).await?;
    let measurement = load_scoped_measurement(&state, &caller, &key).await?;

    MeasurementRepository::new(state.pool.clone())
        .delete(measurement.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/measurements/:key/activate
pub async fn activate_measurement(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<MeasurementResponse>, ApiError> {
    set_measurement_active(&state, &caller, &key, true).await
}

/// POST /api/v1/measurements/:key/deactivate
pub async fn deactivate_measurement(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<MeasurementResponse>, ApiError> {
    set_measurement_active(&state, &caller, &key, false).await
}

async fn set_measurement_active(
    state: &AppState,
    caller: &User,
    key: &str,
    is_active: bool,
) -> Result<Json<MeasurementResponse>, ApiError> {
    require_permission(state, caller, Permission::ChangeMeasurement).await?;
    let measurement = load_scoped_measurement(state, caller, key).await?;

    let repo = MeasurementRepository::new(state.pool.clone());
    repo.set_active(measurement.id, is_active).await?;
    let refreshed = repo
        .find_by_key(key)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Measurement {} not found", key)))?;

    Ok(Json(refreshed.into()))
}

/// GET /api/v1/measurements/athlete_baseline
pub async fn athlete_baseline(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
) -> Result<Json<Vec<MeasurementResponse>>, ApiError> {
    baseline_listing(&state, &caller, ATHLETE_BASELINE_TYPE).await
}

/// GET /api/v1/measurements/coach_baseline
pub async fn coach_baseline(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
) -> Result<Json<Vec<MeasurementResponse>>, ApiError> {
    baseline_listing(&state, &caller, COACH_BASELINE_TYPE).await
}

async fn baseline_listing(
    state: &AppState,
    caller: &User,
    type_label: &str,
) -> Result<Json<Vec<MeasurementResponse>>, ApiError> {
    require_permission(state, caller, Permission::ViewMeasurement).await?;
    let ngo_id = require_ngo(caller)?;

    let measurements = MeasurementRepository::new(state.pool.clone())
        .list_by_type_label(ngo_id, type_label)
        .await?;

    Ok(Json(measurements.into_iter().map(Into::into).collect()))
}
