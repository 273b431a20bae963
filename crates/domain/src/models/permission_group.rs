//! Permission group domain models.
//!
//! A permission group belongs to exactly one NGO; the `(ngo_id, name)`
//! pair is unique, so two NGOs may both have a group called "coaches"
//! without colliding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::permissions::Permission;

/// Permission group domain model.
#[derive(Debug, Clone)]
pub struct PermissionGroup {
    pub id: Uuid,
    pub key: String,
    pub ngo_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public representation of a permission group with its grants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PermissionGroupResponse {
    pub key: String,
    pub name: String,
    pub permissions: Vec<Permission>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a permission group.
///
/// Permission codenames stay raw strings here so blacklisted and unknown
/// codenames can each be rejected with a precise message.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreatePermissionGroupRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Request to update a permission group. When `permissions` is present
/// the grant set is replaced wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdatePermissionGroupRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub permissions: Option<Vec<String>>,
}

/// Query parameters for permission group listings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct ListPermissionGroupsQuery {
    pub page: Option<i32>,
    pub per_page: Option<i32>,
    /// Case-insensitive substring over the name.
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_defaults() {
        let req: CreatePermissionGroupRequest =
            serde_json::from_str(r#"{"name":"field staff"}"#).unwrap();
        assert!(req.permissions.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_request_rejects_empty_name() {
        let req = CreatePermissionGroupRequest {
            name: "".to_string(),
            permissions: vec!["view_athlete".to_string()],
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_response_serializes_codenames() {
        let resp = PermissionGroupResponse {
            key: "g1h2j3k4l5".to_string(),
            name: "field staff".to_string(),
            permissions: vec![Permission::ViewAthlete, Permission::AddMeasurement],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"permissions\":[\"view_athlete\",\"add_measurement\"]"));
    }

    #[test]
    fn test_update_request_distinguishes_absent_permissions() {
        let absent: UpdatePermissionGroupRequest =
            serde_json::from_str(r#"{"name":"renamed"}"#).unwrap();
        assert!(absent.permissions.is_none());

        let cleared: UpdatePermissionGroupRequest =
            serde_json::from_str(r#"{"permissions":[]}"#).unwrap();
        assert_eq!(cleared.permissions, Some(vec![]));
    }
}
