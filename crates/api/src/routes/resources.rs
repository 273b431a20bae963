//! Resource catalog endpoints.
//!
//! Mutations are gated by the permission family the resource kind
//! selects, so a curriculum and an uploaded file with the same shape are
//! guarded differently.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::json;
use validator::Validate;

use domain::models::resource::{
    has_allowed_extension, CreateResourceRequest, ListResourcesQuery, Resource, ResourceKind,
    ResourceResponse, UpdateResourceRequest,
};
use domain::models::user::User;
use domain::permissions::Permission;
use persistence::repositories::ngo::NgoRepository;
use persistence::repositories::resource::ResourceRepository;
use shared::keys::generate_public_key;
use shared::pagination::{Page, PageParams};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::authz::{check_same_ngo, require_ngo, require_permission};
use crate::services::storage::{file_extension, storage_path};

async fn load_scoped_resource(
    state: &AppState,
    caller: &User,
    key: &str,
) -> Result<Resource, ApiError> {
    let resource = ResourceRepository::new(state.pool.clone())
        .find_by_key(key)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Resource {} not found", key)))?;

    check_same_ngo(caller, Some(resource.ngo_id))?;
    Ok(resource)
}

/// GET /api/v1/resources
pub async fn list_resources(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Query(query): Query<ListResourcesQuery>,
) -> Result<Json<Page<ResourceResponse>>, ApiError> {
    require_permission(&state, &caller, Permission::ViewResource).await?;
    let ngo_id = require_ngo(&caller)?;

    let (resources, total) = ResourceRepository::new(state.pool.clone())
        .list(ngo_id, &query)
        .await?;

    let params = PageParams::from_query(query.page, query.per_page);
    Ok(Json(Page::new(
        resources.into_iter().map(Into::into).collect(),
        params,
        total,
    )))
}

/// POST /api/v1/resources
pub async fn create_resource(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Json(req): Json<CreateResourceRequest>,
) -> Result<(StatusCode, Json<ResourceResponse>), ApiError> {
    req.validate()?;
    require_permission(&state, &caller, req.kind.add_permission()).await?;
    let ngo_id = require_ngo(&caller)?;

    let resource = ResourceRepository::new(state.pool.clone())
        .create(
            &generate_public_key(),
            ngo_id,
            &req.label,
            req.kind,
            &req.data,
            req.is_shared,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(resource.into())))
}

/// POST /api/v1/resources/upload
///
/// Multipart creation of a file-kind resource: a `label` field and a
/// `file` field. The file lands in the store under
/// `{ngo_key}/{resource_key}{ext}` and the resource data records its URL.
pub async fn upload_file(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ResourceResponse>), ApiError> {
    require_permission(&state, &caller, ResourceKind::File.add_permission()).await?;
    let ngo_id = require_ngo(&caller)?;

    let mut label: Option<String> = None;
    let mut filename: Option<String> = None;
    let mut bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        match field.name() {
            Some("label") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::Validation(format!("Invalid label field: {}", e)))?;
                label = Some(value);
            }
            Some("file") => {
                filename = field.file_name().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(format!("Invalid file field: {}", e)))?;
                bytes = Some(data.to_vec());
            }
            _ => {}
        }
    }

    let filename =
        filename.ok_or_else(|| ApiError::Validation("A file field is required".to_string()))?;
    let bytes =
        bytes.ok_or_else(|| ApiError::Validation("A file field is required".to_string()))?;
    if !has_allowed_extension(&filename) {
        return Err(ApiError::Validation(format!(
            "File type not allowed: {}",
            filename
        )));
    }
    let ext = file_extension(&filename)
        .ok_or_else(|| ApiError::Validation(format!("File type not allowed: {}", filename)))?;
    let label = label.unwrap_or_else(|| filename.clone());

    let ngo = NgoRepository::new(state.pool.clone())
        .find_by_id(ngo_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("NGO not found".to_string()))?;

    let resource_key = generate_public_key();
    let path = storage_path(&ngo.key, &resource_key, &ext);
    state.store.save(&path, &bytes).await?;
    let url = state.store.url(&path);

    let resource = ResourceRepository::new(state.pool.clone())
        .create(
            &resource_key,
            ngo_id,
            &label,
            ResourceKind::File,
            &json!({ "url": url, "filename": filename }),
            false,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(resource.into())))
}

/// GET /api/v1/resources/:key
pub async fn get_resource(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<ResourceResponse>, ApiError> {
    require_permission(&state, &caller, Permission::ViewResource).await?;
    let resource = load_scoped_resource(&state, &caller, &key).await?;
    Ok(Json(resource.into()))
}

/// PUT /api/v1/resources/:key
pub async fn update_resource(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
    Json(req): Json<UpdateResourceRequest>,
) -> Result<Json<ResourceResponse>, ApiError> {
    req.validate()?;
    let resource = load_scoped_resource(&state, &caller, &key).await?;
    require_permission(&state, &caller, resource.kind.change_permission()).await?;

    let updated = ResourceRepository::new(state.pool.clone())
        .update(
            resource.id,
            req.label.as_deref(),
            req.data.as_ref(),
            req.is_shared,
        )
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Resource {} not found", key)))?;

    Ok(Json(updated.into()))
}

/// DELETE /api/v1/resources/:key
pub async fn delete_resource(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    let resource = load_scoped_resource(&state, &caller, &key).await?;
    require_permission(&state, &caller, resource.kind.delete_permission()).await?;

    ResourceRepository::new(state.pool.clone())
        .delete(resource.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/resources/:key/activate
pub async fn activate_resource(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<ResourceResponse>, ApiError> {
    set_resource_active(&state, &caller, &key, true).await
}

/// POST /api/v1/resources/:key/deactivate
pub async fn deactivate_resource(
    State(state): State<AppState>,
    Extension(AuthUser(caller)): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<ResourceResponse>, ApiError> {
    set_resource_active(&state, &caller, &key, false).await
}

async fn set_resource_active(
    state: &AppState,
    caller: &User,
    key: &str,
    is_active: bool,
) -> Result<Json<ResourceResponse>, ApiError> {
    let resource = load_scoped_resource(state, caller, key).await?;
    require_permission(state, caller, resource.kind.change_permission()).await?;

    let repo = ResourceRepository::new(state.pool.clone());
    repo.set_active(resource.id, is_active).await?;
    let refreshed = repo
        .find_by_key(key)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Resource {} not found", key)))?;

    Ok(Json(refreshed.into()))
}
