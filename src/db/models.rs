use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::ValidationError;

/// Mirrors the `type` column of the `readings` table (stored as `TEXT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SensorType {
    Temperature,
    Humidity,
}

impl SensorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorType::Temperature => "temperature",
            SensorType::Humidity => "humidity",
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "temperature" => Ok(Self::Temperature),
            "humidity" => Ok(Self::Humidity),
            other => Err(ValidationError::SensorType(other.to_owned())),
        }
    }
}

/// One stored observation. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Reading {
    pub device_uuid: String,
    #[sqlx(rename = "type")]
    pub sensor_type: SensorType,
    pub value: i64,
    /// Epoch seconds.
    #[sqlx(rename = "date_created")]
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_type_from_str_roundtrip() {
        for t in [SensorType::Temperature, SensorType::Humidity] {
            assert_eq!(t.as_str().parse::<SensorType>().unwrap(), t);
        }
    }

    #[test]
    fn sensor_type_rejects_unknown_and_wrong_case() {
        assert!("pressure".parse::<SensorType>().is_err());
        assert!("Temperature".parse::<SensorType>().is_err());
    }

    #[test]
    fn sensor_type_serializes_snake_case() {
        let json = serde_json::to_string(&SensorType::Humidity).unwrap();
        assert_eq!(json, "\"humidity\"");
    }
}
