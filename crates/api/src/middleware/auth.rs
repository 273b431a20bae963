//! Bearer token authentication middleware.
//!
//! Clients present the opaque token issued at login in the
//! `Authorization: Bearer ...` header. The middleware hashes the token,
//! resolves it to its active owner and stores the user in request
//! extensions for downstream handlers.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use domain::models::user::User;
use persistence::repositories::auth_token::AuthTokenRepository;
use shared::crypto::{sha256_hex, token_prefix};

use crate::app::AppState;

/// The authenticated user, inserted into request extensions.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// Extracts the Bearer token from an Authorization header value.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    header.and_then(|h| h.strip_prefix("Bearer ")).filter(|t| !t.is_empty())
}

/// Resolves a plaintext token to its active owner.
pub async fn resolve_token(state: &AppState, token: &str) -> Result<Option<User>, sqlx::Error> {
    let repo = AuthTokenRepository::new(state.pool.clone());
    repo.find_user_by_digest(&sha256_hex(token)).await
}

/// Middleware that requires a valid bearer token.
///
/// Expired tokens and tokens of deactivated users are rejected the same
/// way as unknown ones.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());

    let token = match bearer_token(header) {
        Some(token) => token,
        None => return unauthorized_response("Missing or invalid Authorization header"),
    };

    match resolve_token(&state, token).await {
        Ok(Some(user)) => {
            req.extensions_mut().insert(AuthUser(user));
            next.run(req).await
        }
        Ok(None) => {
            tracing::debug!(
                token_prefix = token_prefix(token).unwrap_or("<short>"),
                "Token rejected"
            );
            unauthorized_response("Invalid or expired token")
        }
        Err(e) => {
            tracing::error!("Token lookup failed: {}", e);
            internal_error_response("Authentication service unavailable")
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "unauthorized",
            "message": message
        })),
    )
        .into_response()
}

fn internal_error_response(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": message
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(
            bearer_token(Some("Bearer abcdefghij1234567890")),
            Some("abcdefghij1234567890")
        );
        assert_eq!(bearer_token(Some("Token abc")), None);
        assert_eq!(bearer_token(Some("Bearer ")), None);
        assert_eq!(bearer_token(None), None);
    }

    #[test]
    fn test_unauthorized_response() {
        let response = unauthorized_response("Missing or invalid Authorization header");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_internal_error_response() {
        let response = internal_error_response("Authentication service unavailable");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
