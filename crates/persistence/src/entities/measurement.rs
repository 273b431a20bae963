//! Measurement catalog entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::measurement::{InputType, Measurement, MeasurementType};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for input_type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "input_type", rename_all = "lowercase")]
pub enum InputTypeDb {
    Text,
    Numeric,
    Boolean,
}

impl From<InputTypeDb> for InputType {
    fn from(db: InputTypeDb) -> Self {
        match db {
            InputTypeDb::Text => Self::Text,
            InputTypeDb::Numeric => Self::Numeric,
            InputTypeDb::Boolean => Self::Boolean,
        }
    }
}

impl From<InputType> for InputTypeDb {
    fn from(input_type: InputType) -> Self {
        match input_type {
            InputType::Text => Self::Text,
            InputType::Numeric => Self::Numeric,
            InputType::Boolean => Self::Boolean,
        }
    }
}

/// Database row mapping for the measurements table.
#[derive(Debug, Clone, FromRow)]
pub struct MeasurementEntity {
    pub id: Uuid,
    pub key: String,
    pub ngo_id: Uuid,
    pub label: String,
    pub input_type: InputTypeDb,
    pub uom: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MeasurementEntity> for Measurement {
    fn from(entity: MeasurementEntity) -> Self {
        Self {
            id: entity.id,
            key: entity.key,
            ngo_id: entity.ngo_id,
            label: entity.label,
            input_type: entity.input_type.into(),
            uom: entity.uom,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Database row mapping for the measurement_types table.
#[derive(Debug, Clone, FromRow)]
pub struct MeasurementTypeEntity {
    pub id: Uuid,
    pub key: String,
    pub ngo_id: Uuid,
    pub label: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MeasurementTypeEntity> for MeasurementType {
    fn from(entity: MeasurementTypeEntity) -> Self {
        Self {
            id: entity.id,
            key: entity.key,
            ngo_id: entity.ngo_id,
            label: entity.label,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_type_conversion() {
        assert_eq!(InputType::from(InputTypeDb::Numeric), InputType::Numeric);
        assert_eq!(InputTypeDb::from(InputType::Boolean), InputTypeDb::Boolean);
    }
}
