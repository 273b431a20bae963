//! NGO domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
use uuid::Uuid;

use crate::models::user::Language;

/// NGO domain model.
#[derive(Debug, Clone)]
pub struct Ngo {
    pub id: Uuid,
    pub key: String,
    pub name: String,
    pub logo: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public representation of an NGO.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NgoResponse {
    pub key: String,
    pub name: String,
    pub logo: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Ngo> for NgoResponse {
    fn from(ngo: Ngo) -> Self {
        Self {
            key: ngo.key,
            name: ngo.name,
            logo: ngo.logo,
            description: ngo.description,
            is_active: ngo.is_active,
            created_at: ngo.created_at,
            updated_at: ngo.updated_at,
        }
    }
}

/// Request to create an NGO together with its first admin.
///
/// Creation bootstraps the tenant: the NGO row, its default measurement
/// types, the admin account and the two seed permission groups all land
/// in one transaction.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateNgoRequest {
    #[validate(length(min = 2, max = 255, message = "Name must be 2-255 characters"))]
    pub name: String,
    pub logo: Option<String>,
    #[validate(length(max = 2048))]
    pub description: Option<String>,

    // first admin
    #[validate(length(min = 1, max = 255, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 255, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub language: Option<Language>,
}

/// Request to update an NGO.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateNgoRequest {
    #[validate(length(min = 2, max = 255, message = "Name must be 2-255 characters"))]
    pub name: Option<String>,
    pub logo: Option<String>,
    #[validate(length(max = 2048))]
    pub description: Option<String>,
}

/// Query parameters for NGO listings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct ListNgosQuery {
    pub page: Option<i32>,
    pub per_page: Option<i32>,
    pub is_active: Option<String>,
    /// Case-insensitive substring over the name.
    pub name: Option<String>,
}

/// Request to bind a resource as an NGO's registration form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct BindRegistrationFormRequest {
    #[validate(length(min = 1, message = "Resource key is required"))]
    pub resource_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ngo_request_validation() {
        let valid: CreateNgoRequest = serde_json::from_str(
            r#"{"name":"Bridges of Sports","first_name":"Asha","last_name":"Rao",
                "email":"asha@example.org","password":"longenough1",
                "confirm_password":"longenough1"}"#,
        )
        .unwrap();
        assert!(valid.validate().is_ok());

        let short_name = CreateNgoRequest {
            name: "B".to_string(),
            ..valid.clone()
        };
        assert!(short_name.validate().is_err());

        let bad_email = CreateNgoRequest {
            email: "nope".to_string(),
            ..valid
        };
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn test_ngo_response_serialization() {
        let ngo = Ngo {
            id: Uuid::nil(),
            key: "q1w2e3r4t5".to_string(),
            name: "Bridges of Sports".to_string(),
            logo: None,
            description: Some("Track and field".to_string()),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&NgoResponse::from(ngo)).unwrap();
        assert!(json.contains("\"key\":\"q1w2e3r4t5\""));
        assert!(json.contains("\"is_active\":true"));
        // internal row id never leaves the API
        assert!(!json.contains("\"id\""));
    }
}
