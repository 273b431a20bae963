//! User domain models.
//!
//! Admins, coaches and athletes all live in one `users` table and are
//! addressed through role-specialized collections in the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Role a user holds inside their NGO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Coach,
    Athlete,
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "coach" => Ok(UserRole::Coach),
            "athlete" => Ok(UserRole::Athlete),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Coach => write!(f, "coach"),
            UserRole::Athlete => write!(f, "athlete"),
        }
    }
}

/// Interface language for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    #[serde(rename = "en_IN")]
    English,
    #[serde(rename = "hi_IN")]
    Hindi,
    #[serde(rename = "ka_IN")]
    Kannada,
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en_IN" => Ok(Language::English),
            "hi_IN" => Ok(Language::Hindi),
            "ka_IN" => Ok(Language::Kannada),
            _ => Err(format!("Unknown language: {}", s)),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::English => write!(f, "en_IN"),
            Language::Hindi => write!(f, "hi_IN"),
            Language::Kannada => write!(f, "ka_IN"),
        }
    }
}

/// User domain model. The password hash never leaves the persistence
/// layer; responses use [`UserResponse`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub key: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub ngo_id: Option<Uuid>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: UserRole,
    pub language: Language,
    pub is_active: bool,
    pub must_reset_password: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Full display name.
    pub fn name(&self) -> String {
        match &self.middle_name {
            Some(middle) => format!("{} {} {}", self.first_name, middle, self.last_name),
            None => format!("{} {}", self.first_name, self.last_name),
        }
    }

    /// Platform admins have no NGO of their own.
    pub fn is_platform_user(&self) -> bool {
        self.ngo_id.is_none()
    }
}

/// Public representation of a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UserResponse {
    pub key: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub email: Option<String>,
    pub role: UserRole,
    pub language: Language,
    pub is_active: bool,
    pub must_reset_password: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            key: user.key,
            first_name: user.first_name,
            middle_name: user.middle_name,
            last_name: user.last_name,
            email: user.email,
            role: user.role,
            language: user.language,
            is_active: user.is_active,
            must_reset_password: user.must_reset_password,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Request to create a user through the role-agnostic collection.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 255, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(max = 255))]
    pub middle_name: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub role: UserRole,
    pub language: Option<Language>,
}

/// Request to create an admin: a user plus credentials and group
/// memberships, applied in one transaction.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateAdminRequest {
    #[validate(length(min = 1, max = 255, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(max = 255))]
    pub middle_name: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub language: Option<Language>,
    /// Keys of permission groups the admin joins; must belong to the
    /// caller's NGO.
    #[serde(default)]
    pub permission_groups: Vec<String>,
}

/// One baseline reading submitted with athlete/coach creation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct BaselineEntry {
    #[validate(length(min = 1, message = "Measurement key is required"))]
    pub measurement_key: String,
    pub value: crate::models::reading::ReadingValue,
}

/// Request to create an athlete or coach with optional baselines.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateMemberRequest {
    #[validate(length(min = 1, max = 255, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(max = 255))]
    pub middle_name: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub language: Option<Language>,
    #[serde(default)]
    #[validate(nested)]
    pub baselines: Vec<BaselineEntry>,
}

/// Request to update a user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 255))]
    pub first_name: Option<String>,
    #[validate(length(max = 255))]
    pub middle_name: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub last_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub language: Option<Language>,
}

/// Request to reset a user's password.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResetPasswordRequest {
    pub password: String,
    pub confirm_password: String,
}

/// Request to change a user's interface language.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ChangeLanguageRequest {
    pub language: Language,
}

/// Query parameters for user listings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct ListUsersQuery {
    pub page: Option<i32>,
    pub per_page: Option<i32>,
    /// Raw boolean filter; only the literal "false" means false.
    pub is_active: Option<String>,
    /// Case-insensitive substring over first or last name.
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::nil(),
            key: "a1b2c3d4e5".to_string(),
            first_name: "Anita".to_string(),
            middle_name: None,
            last_name: "Desai".to_string(),
            ngo_id: Some(Uuid::nil()),
            email: Some("anita@example.org".to_string()),
            password_hash: None,
            role: UserRole::Coach,
            language: Language::English,
            is_active: true,
            must_reset_password: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&UserRole::Athlete).unwrap(), "\"athlete\"");
        let role: UserRole = serde_json::from_str("\"coach\"").unwrap();
        assert_eq!(role, UserRole::Coach);
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!(UserRole::from_str("ADMIN").unwrap(), UserRole::Admin);
        assert!(UserRole::from_str("manager").is_err());
    }

    #[test]
    fn test_language_serialization() {
        assert_eq!(serde_json::to_string(&Language::Hindi).unwrap(), "\"hi_IN\"");
        let lang: Language = serde_json::from_str("\"ka_IN\"").unwrap();
        assert_eq!(lang, Language::Kannada);
        assert_eq!(Language::default(), Language::English);
    }

    #[test]
    fn test_full_name() {
        let mut user = sample_user();
        assert_eq!(user.name(), "Anita Desai");
        user.middle_name = Some("K".to_string());
        assert_eq!(user.name(), "Anita K Desai");
    }

    #[test]
    fn test_platform_user() {
        let mut user = sample_user();
        assert!(!user.is_platform_user());
        user.ngo_id = None;
        assert!(user.is_platform_user());
    }

    #[test]
    fn test_user_response_hides_password_hash() {
        let mut user = sample_user();
        user.password_hash = Some("$argon2id$secret".to_string());
        let json = serde_json::to_string(&UserResponse::from(user)).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(json.contains("\"key\":\"a1b2c3d4e5\""));
    }

    #[test]
    fn test_create_user_request_validation() {
        let valid = CreateUserRequest {
            first_name: "Ravi".to_string(),
            middle_name: None,
            last_name: "Kumar".to_string(),
            email: Some("ravi@example.org".to_string()),
            role: UserRole::Athlete,
            language: None,
        };
        assert!(valid.validate().is_ok());

        let missing_name = CreateUserRequest {
            first_name: "".to_string(),
            middle_name: None,
            last_name: "Kumar".to_string(),
            email: None,
            role: UserRole::Athlete,
            language: None,
        };
        assert!(missing_name.validate().is_err());

        let bad_email = CreateUserRequest {
            first_name: "Ravi".to_string(),
            middle_name: None,
            last_name: "Kumar".to_string(),
            email: Some("not-an-email".to_string()),
            role: UserRole::Coach,
            language: None,
        };
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn test_generated_create_requests_validate() {
        use fake::faker::internet::en::SafeEmail;
        use fake::faker::name::en::{FirstName, LastName};
        use fake::Fake;

        for _ in 0..20 {
            let req = CreateUserRequest {
                first_name: FirstName().fake(),
                middle_name: None,
                last_name: LastName().fake(),
                email: Some(SafeEmail().fake()),
                role: UserRole::Athlete,
                language: None,
            };
            assert!(req.validate().is_ok());
        }
    }

    #[test]
    fn test_create_admin_request_defaults_groups() {
        let req: CreateAdminRequest = serde_json::from_str(
            r#"{"first_name":"A","last_name":"B","email":"a@b.org",
                "password":"longenough1","confirm_password":"longenough1"}"#,
        )
        .unwrap();
        assert!(req.permission_groups.is_empty());
    }
}
