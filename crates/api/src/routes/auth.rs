//! Login, logout and session probe.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use chrono::Utc;
use validator::Validate;

use domain::models::auth::{token_expiry, LoginRequest, LoginResponse, SessionResponse};
use domain::permissions::Permission;
use persistence::repositories::auth_token::AuthTokenRepository;
use persistence::repositories::ngo::NgoRepository;
use persistence::repositories::permission_group::PermissionGroupRepository;
use persistence::repositories::user::UserRepository;
use shared::crypto::{sha256_hex, token_prefix};
use shared::keys::generate_token;
use shared::password::verify_password;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::auth::{bearer_token, resolve_token, AuthUser};

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    req.validate()?;

    let users = UserRepository::new(state.pool.clone());
    let user = users
        .find_by_email(&req.email)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| ApiError::Forbidden("Invalid credentials".to_string()))?;

    let hash = user
        .password_hash
        .as_deref()
        .ok_or_else(|| ApiError::Forbidden("Invalid credentials".to_string()))?;
    if !verify_password(&req.password, hash)? {
        return Err(ApiError::Forbidden("Invalid credentials".to_string()));
    }

    let tokens = AuthTokenRepository::new(state.pool.clone());
    // housekeeping piggybacks on login
    tokens.delete_expired().await?;

    let token = generate_token();
    tokens
        .insert(
            user.id,
            &sha256_hex(&token),
            token_prefix(&token).unwrap_or_default(),
            token_expiry(Utc::now()),
        )
        .await?;

    let permissions = if user.is_platform_user() {
        Permission::all().iter().map(|p| p.code().to_string()).collect()
    } else {
        PermissionGroupRepository::new(state.pool.clone())
            .user_permissions(user.id)
            .await?
    };

    let (ngo_key, ngo_name) = match user.ngo_id {
        Some(ngo_id) => {
            let ngo = NgoRepository::new(state.pool.clone()).find_by_id(ngo_id).await?;
            match ngo {
                Some(ngo) => (Some(ngo.key), Some(ngo.name)),
                None => (None, None),
            }
        }
        None => (None, None),
    };

    tracing::info!(user_key = %user.key, "Login succeeded");

    Ok(Json(LoginResponse {
        token,
        key: user.key,
        ngo: ngo_key,
        ngo_name,
        permissions,
        language: user.language,
        first_name: user.first_name,
    }))
}

/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let header = headers.get("Authorization").and_then(|v| v.to_str().ok());
    let token = bearer_token(header)
        .ok_or_else(|| ApiError::Unauthorized("Missing or invalid Authorization header".into()))?;

    AuthTokenRepository::new(state.pool.clone())
        .revoke(&sha256_hex(token))
        .await?;

    tracing::info!(user_key = %user.key, "Logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/session
///
/// Public probe; reports whether the presented token (if any) is still
/// valid.
pub async fn session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>, ApiError> {
    let header = headers.get("Authorization").and_then(|v| v.to_str().ok());
    let is_authenticated = match bearer_token(header) {
        Some(token) => resolve_token(&state, token).await?.is_some(),
        None => false,
    };

    Ok(Json(SessionResponse { is_authenticated }))
}
