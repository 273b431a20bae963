//! Reading domain models.
//!
//! A reading records one measurement value for a user. Values arrive as a
//! union of text, numeric and boolean and are checked against the
//! measurement's declared input type before anything is persisted; the
//! database stores the canonical text form.

use crate::models::measurement::InputType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A measurement value in its declared shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReadingValue {
    Boolean(bool),
    Numeric(f64),
    Text(String),
}

impl ReadingValue {
    /// Whether this value matches the measurement's declared input type.
    pub fn matches(&self, input_type: InputType) -> bool {
        matches!(
            (self, input_type),
            (ReadingValue::Text(_), InputType::Text)
                | (ReadingValue::Numeric(_), InputType::Numeric)
                | (ReadingValue::Boolean(_), InputType::Boolean)
        )
    }

    /// Canonical text form stored in the database.
    pub fn canonical(&self) -> String {
        match self {
            ReadingValue::Text(s) => s.clone(),
            ReadingValue::Numeric(n) => n.to_string(),
            ReadingValue::Boolean(b) => b.to_string(),
        }
    }

    /// Reconstructs a typed value from its stored text form.
    pub fn from_stored(value: &str, input_type: InputType) -> Option<Self> {
        match input_type {
            InputType::Text => Some(ReadingValue::Text(value.to_string())),
            InputType::Numeric => value.parse().ok().map(ReadingValue::Numeric),
            InputType::Boolean => value.parse().ok().map(ReadingValue::Boolean),
        }
    }
}

/// Reading domain model.
#[derive(Debug, Clone)]
pub struct Reading {
    pub id: Uuid,
    pub key: String,
    pub user_id: Uuid,
    pub ngo_id: Uuid,
    pub by_user_id: Uuid,
    pub entered_by_id: Uuid,
    pub measurement_id: Uuid,
    pub resource_id: Option<Uuid>,
    pub value: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public representation of a reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReadingResponse {
    pub key: String,
    pub user_key: String,
    pub by_user_key: String,
    pub entered_by_key: String,
    pub measurement_key: String,
    pub resource_key: Option<String>,
    pub value: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Request to record a reading.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateReadingRequest {
    #[validate(length(min = 1, message = "User key is required"))]
    pub user_key: String,
    #[validate(length(min = 1, message = "Measurement key is required"))]
    pub measurement_key: String,
    pub resource_key: Option<String>,
    pub value: ReadingValue,
}

/// Query parameters for reading listings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct ListReadingsQuery {
    pub page: Option<i32>,
    pub per_page: Option<i32>,
    pub user: Option<String>,
    pub is_active: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_deserializes_by_shape() {
        assert_eq!(
            serde_json::from_str::<ReadingValue>("true").unwrap(),
            ReadingValue::Boolean(true)
        );
        assert_eq!(
            serde_json::from_str::<ReadingValue>("12.5").unwrap(),
            ReadingValue::Numeric(12.5)
        );
        assert_eq!(
            serde_json::from_str::<ReadingValue>("\"taluka\"").unwrap(),
            ReadingValue::Text("taluka".to_string())
        );
    }

    #[test]
    fn test_value_matches_input_type() {
        assert!(ReadingValue::Text("x".into()).matches(InputType::Text));
        assert!(ReadingValue::Numeric(3.0).matches(InputType::Numeric));
        assert!(ReadingValue::Boolean(false).matches(InputType::Boolean));
        assert!(!ReadingValue::Text("3".into()).matches(InputType::Numeric));
        assert!(!ReadingValue::Numeric(1.0).matches(InputType::Boolean));
    }

    #[test]
    fn test_canonical_text_form() {
        assert_eq!(ReadingValue::Text("ok".into()).canonical(), "ok");
        assert_eq!(ReadingValue::Numeric(12.5).canonical(), "12.5");
        assert_eq!(ReadingValue::Numeric(4.0).canonical(), "4");
        assert_eq!(ReadingValue::Boolean(true).canonical(), "true");
    }

    #[test]
    fn test_from_stored_round_trip() {
        let v = ReadingValue::Numeric(9.81);
        let back = ReadingValue::from_stored(&v.canonical(), InputType::Numeric).unwrap();
        assert_eq!(back, v);

        assert!(ReadingValue::from_stored("not-a-number", InputType::Numeric).is_none());
        assert_eq!(
            ReadingValue::from_stored("false", InputType::Boolean).unwrap(),
            ReadingValue::Boolean(false)
        );
    }
}
