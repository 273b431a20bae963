//! Authentication domain models.
//!
//! All clients authenticate with an opaque bearer token issued at login.
//! The plaintext token is returned once; the database keeps its SHA-256
//! digest and a short prefix for log correlation.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::user::Language;

/// Days a token stays valid after issuance.
pub const TOKEN_TTL_DAYS: i64 = 30;

/// Stored bearer credential.
#[derive(Debug, Clone)]
pub struct AuthToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_digest: String,
    pub token_prefix: String,
    pub expiry_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AuthToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date <= now
    }
}

/// Expiry for a token issued at `now`.
pub fn token_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::days(TOKEN_TTL_DAYS)
}

/// Login request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response handed to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoginResponse {
    pub token: String,
    pub key: String,
    pub ngo: Option<String>,
    pub ngo_name: Option<String>,
    pub permissions: Vec<String>,
    pub language: Language,
    pub first_name: String,
}

/// Response for the session probe endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SessionResponse {
    pub is_authenticated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_expiry_is_thirty_days() {
        let now = Utc::now();
        assert_eq!(token_expiry(now) - now, Duration::days(30));
    }

    #[test]
    fn test_token_expiry_boundary() {
        let now = Utc::now();
        let token = AuthToken {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            token_digest: "d".repeat(64),
            token_prefix: "abcdefgh".to_string(),
            expiry_date: now,
            created_at: now,
            updated_at: now,
        };
        // a token expiring exactly now is already invalid
        assert!(token.is_expired(now));
        assert!(!token.is_expired(now - Duration::seconds(1)));
    }

    #[test]
    fn test_login_request_validation() {
        let valid = LoginRequest {
            email: "coach@example.org".to_string(),
            password: "secret".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad = LoginRequest {
            email: "coach".to_string(),
            password: "".to_string(),
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_login_response_shape() {
        let resp = LoginResponse {
            token: "t".repeat(20),
            key: "a1b2c3d4e5".to_string(),
            ngo: Some("q1w2e3r4t5".to_string()),
            ngo_name: Some("Bridges of Sports".to_string()),
            permissions: vec!["view_athlete".to_string()],
            language: Language::English,
            first_name: "Asha".to_string(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"language\":\"en_IN\""));
        assert!(json.contains("\"permissions\":[\"view_athlete\"]"));
    }
}
