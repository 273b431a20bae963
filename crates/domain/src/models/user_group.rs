//! User group domain models (ad hoc sharing groups).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// User group domain model.
#[derive(Debug, Clone)]
pub struct UserGroup {
    pub id: Uuid,
    pub key: String,
    pub ngo_id: Uuid,
    pub label: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public representation of a user group with its memberships.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UserGroupResponse {
    pub key: String,
    pub label: String,
    pub is_active: bool,
    /// Keys of member users.
    pub members: Vec<String>,
    /// Keys of shared resources.
    pub resources: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a user group.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateUserGroupRequest {
    #[validate(length(min = 1, max = 255, message = "Label is required"))]
    pub label: String,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
}

/// Request to update a user group. Present member/resource lists replace
/// the existing sets.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateUserGroupRequest {
    #[validate(length(min = 1, max = 255))]
    pub label: Option<String>,
    pub members: Option<Vec<String>>,
    pub resources: Option<Vec<String>>,
}

/// Query parameters for user group listings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct ListUserGroupsQuery {
    pub page: Option<i32>,
    pub per_page: Option<i32>,
    pub is_active: Option<String>,
    /// Case-insensitive substring over the label.
    pub label: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_defaults() {
        let req: CreateUserGroupRequest =
            serde_json::from_str(r#"{"label":"U14 squad"}"#).unwrap();
        assert!(req.members.is_empty());
        assert!(req.resources.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_update_request_distinguishes_absent_lists() {
        let absent: UpdateUserGroupRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert!(absent.members.is_none());

        let cleared: UpdateUserGroupRequest =
            serde_json::from_str(r#"{"members":[]}"#).unwrap();
        assert_eq!(cleared.members, Some(vec![]));
    }

    #[test]
    fn test_response_serialization() {
        let resp = UserGroupResponse {
            key: "z9x8c7v6b5".to_string(),
            label: "U14 squad".to_string(),
            is_active: true,
            members: vec!["a1b2c3d4e5".to_string()],
            resources: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"members\":[\"a1b2c3d4e5\"]"));
        assert!(json.contains("\"resources\":[]"));
    }
}
