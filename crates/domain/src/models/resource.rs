//! Resource catalog domain models.
//!
//! Resources are typed documents (curricula, training sessions,
//! registration forms, benchmarks, uploaded files) with a free-form JSON
//! body. Which permission family guards a mutation depends on the
//! resource kind.

use crate::permissions::Permission;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Kind of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Curriculum,
    Session,
    Registration,
    Benchmark,
    File,
}

impl ResourceKind {
    /// Permission required to create a resource of this kind.
    pub fn add_permission(&self) -> Permission {
        match self {
            ResourceKind::Curriculum => Permission::AddCurriculum,
            ResourceKind::Session | ResourceKind::Registration => Permission::AddTrainingSession,
            ResourceKind::Benchmark => Permission::AddResource,
            ResourceKind::File => Permission::AddFile,
        }
    }

    /// Permission required to update, activate or deactivate.
    pub fn change_permission(&self) -> Permission {
        match self {
            ResourceKind::Curriculum => Permission::ChangeCurriculum,
            ResourceKind::Session | ResourceKind::Registration => {
                Permission::ChangeTrainingSession
            }
            ResourceKind::Benchmark => Permission::ChangeResource,
            ResourceKind::File => Permission::ChangeFile,
        }
    }

    /// Permission required to destroy.
    pub fn delete_permission(&self) -> Permission {
        match self {
            ResourceKind::Curriculum => Permission::DeleteCurriculum,
            ResourceKind::Session | ResourceKind::Registration => {
                Permission::DeleteTrainingSession
            }
            ResourceKind::Benchmark => Permission::DeleteResource,
            ResourceKind::File => Permission::DeleteFile,
        }
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "curriculum" => Ok(ResourceKind::Curriculum),
            "session" => Ok(ResourceKind::Session),
            "registration" => Ok(ResourceKind::Registration),
            "benchmark" => Ok(ResourceKind::Benchmark),
            "file" => Ok(ResourceKind::File),
            _ => Err(format!("Unknown resource kind: {}", s)),
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Curriculum => write!(f, "curriculum"),
            ResourceKind::Session => write!(f, "session"),
            ResourceKind::Registration => write!(f, "registration"),
            ResourceKind::Benchmark => write!(f, "benchmark"),
            ResourceKind::File => write!(f, "file"),
        }
    }
}

/// File extensions accepted for file-kind resources.
pub const ALLOWED_FILE_EXTENSIONS: [&str; 7] =
    [".png", ".jpeg", ".jpg", ".txt", ".mp4", ".mp3", ".pdf"];

/// Whether a filename carries an accepted extension. The comparison is
/// case-insensitive.
pub fn has_allowed_extension(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    ALLOWED_FILE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Resource domain model.
#[derive(Debug, Clone)]
pub struct Resource {
    pub id: Uuid,
    pub key: String,
    pub ngo_id: Uuid,
    pub label: String,
    pub kind: ResourceKind,
    pub data: JsonValue,
    pub is_active: bool,
    pub is_shared: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public representation of a resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResourceResponse {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub data: JsonValue,
    pub is_active: bool,
    pub is_shared: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Resource> for ResourceResponse {
    fn from(r: Resource) -> Self {
        Self {
            key: r.key,
            label: r.label,
            kind: r.kind,
            data: r.data,
            is_active: r.is_active,
            is_shared: r.is_shared,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Request to create a resource.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateResourceRequest {
    #[validate(length(min = 1, max = 255, message = "Label is required"))]
    pub label: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    #[serde(default)]
    pub data: JsonValue,
    #[serde(default)]
    pub is_shared: bool,
}

/// Request to update a resource.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateResourceRequest {
    #[validate(length(min = 1, max = 255))]
    pub label: Option<String>,
    pub data: Option<JsonValue>,
    pub is_shared: Option<bool>,
}

/// Query parameters for resource listings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct ListResourcesQuery {
    pub page: Option<i32>,
    pub per_page: Option<i32>,
    pub is_active: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<ResourceKind>,
    /// Case-insensitive substring over the label.
    pub label: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&ResourceKind::Curriculum).unwrap(),
            "\"curriculum\""
        );
        let kind: ResourceKind = serde_json::from_str("\"benchmark\"").unwrap();
        assert_eq!(kind, ResourceKind::Benchmark);
        assert!(serde_json::from_str::<ResourceKind>("\"movie\"").is_err());
    }

    #[test]
    fn test_kind_selects_permission_family() {
        assert_eq!(
            ResourceKind::Curriculum.add_permission(),
            Permission::AddCurriculum
        );
        assert_eq!(
            ResourceKind::Session.change_permission(),
            Permission::ChangeTrainingSession
        );
        // registration forms are guarded like training sessions
        assert_eq!(
            ResourceKind::Registration.add_permission(),
            Permission::AddTrainingSession
        );
        assert_eq!(
            ResourceKind::Benchmark.delete_permission(),
            Permission::DeleteResource
        );
        assert_eq!(ResourceKind::File.add_permission(), Permission::AddFile);
    }

    #[test]
    fn test_allowed_extensions() {
        assert!(has_allowed_extension("photo.PNG"));
        assert!(has_allowed_extension("drill.mp4"));
        assert!(has_allowed_extension("form.pdf"));
        assert!(!has_allowed_extension("payload.exe"));
        assert!(!has_allowed_extension("archive.tar.gz"));
        assert!(!has_allowed_extension("noextension"));
    }

    #[test]
    fn test_create_request_defaults() {
        let req: CreateResourceRequest =
            serde_json::from_str(r#"{"label":"U12 curriculum","type":"curriculum"}"#).unwrap();
        assert_eq!(req.kind, ResourceKind::Curriculum);
        assert_eq!(req.data, JsonValue::Null);
        assert!(!req.is_shared);
    }
}
