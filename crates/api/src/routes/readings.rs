//! Reading endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use domain::models::reading::{CreateReadingRequest, ListReadingsQuery, ReadingResponse};
use domain::permissions::Permission;
use persistence::repositories::measurement::MeasurementRepository;
use persistence::repositories::reading::ReadingRepository;
use persistence::repositories::resource::ResourceRepository;
use persistence::repositories::user::UserRepository;
use shared::keys::generate_public_key;
use shared::pagination::{Page, PageParams};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::authz::{check_same_ngo, require_ngo, require_permission};

/// GET /api/v1/readings
pub async fn list_readings(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Query(query): Query<ListReadingsQuery>,
) -> Result<Json<Page<ReadingResponse>>, ApiError> {
    require_permission(&state, &caller, Permission::ViewUser).await?;
    let ngo_id = require_ngo(&caller)?;

    let (readings, total) = ReadingRepository::new(state.pool.clone())
        .list(ngo_id, &query)
        .await?;

    let params = PageParams::from_query(query.page, query.per_page);
    Ok(Json(Page::new(readings, params, total)))
}

/// POST /api/v1/readings
///
/// The value is checked against the measurement's declared input type
/// before anything is persisted.
pub async fn create_reading(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Json(req): Json<CreateReadingRequest>,
) -> Result<(StatusCode, Json<ReadingResponse>), ApiError> {
    req.validate()?;
    require_permission(&state, &caller, Permission::ChangeUser).await?;
    let ngo_id = require_ngo(&caller)?;

    let subject = UserRepository::new(state.pool.clone())
        .find_by_key(&req.user_key)
        .await?
        .filter(|u| u.ngo_id == Some(ngo_id))
        .ok_or_else(|| ApiError::Validation(format!("Unknown user: {}", req.user_key)))?;

    let measurement = MeasurementRepository::new(state.pool.clone())
        .find_by_key(&req.measurement_key)
        .await?
        .filter(|m| m.ngo_id == ngo_id)
        .ok_or_else(|| {
            ApiError::Validation(format!("Unknown measurement: {}", req.measurement_key))
        })?;

    if !req.value.matches(measurement.input_type) {
        return Err(ApiError::Validation(format!(
            "Value for {} must be of type {}",
            measurement.label, measurement.input_type
        )));
    }

    let resource_id = match &req.resource_key {
        Some(resource_key) => {
            let resource = ResourceRepository::new(state.pool.clone())
                .find_by_key(resource_key)
                .await?
                .filter(|r| r.ngo_id == ngo_id)
                .ok_or_else(|| {
                    ApiError::Validation(format!("Unknown resource: {}", resource_key))
                })?;
            Some(resource.id)
        }
        None => None,
    };

    let reading = ReadingRepository::new(state.pool.clone())
        .create(
            &generate_public_key(),
            subject.id,
            ngo_id,
            caller.id,
            caller.id,
            measurement.id,
            resource_id,
            &req.value.canonical(),
        )
        .await?;

    let response = ReadingResponse {
        key: reading.key,
        user_key: subject.key,
        by_user_key: caller.key.clone(),
        entered_by_key: caller.key.clone(),
        measurement_key: measurement.key,
        resource_key: req.resource_key.clone(),
        value: reading.value,
        is_active: reading.is_active,
        created_at: reading.created_at,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/readings/:key
pub async fn get_reading(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<ReadingResponse>, ApiError> {
    require_permission(&state, &caller, Permission::ViewUser).await?;

    let repo = ReadingRepository::new(state.pool.clone());
    let reading = repo
        .find_by_key(&key)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Reading {} not found", key)))?;
    check_same_ngo(&caller, Some(reading.ngo_id))?;

    let detail = repo
        .find_detail_by_key(&key)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Reading {} not found", key)))?;

    Ok(Json(detail))
}

/// DELETE /api/v1/readings/:key
pub async fn delete_reading(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_permission(&state, &caller, Permission::DeleteUser).await?;

    let repo = ReadingRepository::new(state.pool.clone());
    let reading = repo
        .find_by_key(&key)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Reading {} not found", key)))?;
    check_same_ngo(&caller, Some(reading.ngo_id))?;

    repo.delete(reading.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
