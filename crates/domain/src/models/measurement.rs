//! Measurement catalog domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Declared shape of a measurement's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Text,
    Numeric,
    Boolean,
}

impl FromStr for InputType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(InputType::Text),
            "numeric" => Ok(InputType::Numeric),
            "boolean" => Ok(InputType::Boolean),
            _ => Err(format!("Unknown input type: {}", s)),
        }
    }
}

impl std::fmt::Display for InputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputType::Text => write!(f, "text"),
            InputType::Numeric => write!(f, "numeric"),
            InputType::Boolean => write!(f, "boolean"),
        }
    }
}

/// Measurement type labels seeded for every new NGO.
pub const DEFAULT_MEASUREMENT_TYPES: [&str; 6] = [
    "Student Baseline",
    "Student Progression",
    "Coach Baseline",
    "Coach Progression",
    "NGO Baseline",
    "NGO Progression",
];

/// Type label backing the athlete baseline shortcut listing.
pub const ATHLETE_BASELINE_TYPE: &str = "Student Baseline";

/// Type label backing the coach baseline shortcut listing.
pub const COACH_BASELINE_TYPE: &str = "Coach Baseline";

/// Measurement domain model.
#[derive(Debug, Clone)]
pub struct Measurement {
    pub id: Uuid,
    pub key: String,
    pub ngo_id: Uuid,
    pub label: String,
    pub input_type: InputType,
    pub uom: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public representation of a measurement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MeasurementResponse {
    pub key: String,
    pub label: String,
    pub input_type: InputType,
    pub uom: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Measurement> for MeasurementResponse {
    fn from(m: Measurement) -> Self {
        Self {
            key: m.key,
            label: m.label,
            input_type: m.input_type,
            uom: m.uom,
            is_active: m.is_active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Measurement type domain model (a named grouping of measurements).
#[derive(Debug, Clone)]
pub struct MeasurementType {
    pub id: Uuid,
    pub key: String,
    pub ngo_id: Uuid,
    pub label: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public representation of a measurement type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MeasurementTypeResponse {
    pub key: String,
    pub label: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MeasurementType> for MeasurementTypeResponse {
    fn from(t: MeasurementType) -> Self {
        Self {
            key: t.key,
            label: t.label,
            is_active: t.is_active,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

/// Request to create a measurement.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateMeasurementRequest {
    #[validate(length(min = 1, max = 255, message = "Label is required"))]
    pub label: String,
    pub input_type: InputType,
    #[validate(length(max = 50))]
    pub uom: Option<String>,
    /// Keys of measurement types this measurement belongs to.
    #[serde(default)]
    pub types: Vec<String>,
}

/// Request to update a measurement.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateMeasurementRequest {
    #[validate(length(min = 1, max = 255))]
    pub label: Option<String>,
    pub input_type: Option<InputType>,
    #[validate(length(max = 50))]
    pub uom: Option<String>,
    pub types: Option<Vec<String>>,
}

/// Request to create or update a measurement type.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct MeasurementTypeRequest {
    #[validate(length(min = 1, max = 255, message = "Label is required"))]
    pub label: String,
}

/// Query parameters for measurement listings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct ListMeasurementsQuery {
    pub page: Option<i32>,
    pub per_page: Option<i32>,
    pub is_active: Option<String>,
    /// Measurement type key filter.
    #[serde(rename = "type")]
    pub type_key: Option<String>,
    /// Case-insensitive substring over the label.
    pub label: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_type_serialization() {
        assert_eq!(serde_json::to_string(&InputType::Numeric).unwrap(), "\"numeric\"");
        let t: InputType = serde_json::from_str("\"boolean\"").unwrap();
        assert_eq!(t, InputType::Boolean);
    }

    #[test]
    fn test_input_type_from_str() {
        assert_eq!(InputType::from_str("TEXT").unwrap(), InputType::Text);
        assert!(InputType::from_str("date").is_err());
    }

    #[test]
    fn test_default_types_cover_baselines() {
        assert!(DEFAULT_MEASUREMENT_TYPES.contains(&ATHLETE_BASELINE_TYPE));
        assert!(DEFAULT_MEASUREMENT_TYPES.contains(&COACH_BASELINE_TYPE));
        assert_eq!(DEFAULT_MEASUREMENT_TYPES.len(), 6);
    }

    #[test]
    fn test_create_measurement_request_validation() {
        let valid: CreateMeasurementRequest = serde_json::from_str(
            r#"{"label":"100m dash time","input_type":"numeric","uom":"seconds"}"#,
        )
        .unwrap();
        assert!(valid.validate().is_ok());
        assert!(valid.types.is_empty());

        let invalid = CreateMeasurementRequest {
            label: "".to_string(),
            input_type: InputType::Text,
            uom: None,
            types: vec![],
        };
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_list_query_type_rename() {
        let q: ListMeasurementsQuery =
            serde_json::from_str(r#"{"type":"abc123","is_active":"false"}"#).unwrap();
        assert_eq!(q.type_key.as_deref(), Some("abc123"));
        assert_eq!(q.is_active.as_deref(), Some("false"));
    }
}
