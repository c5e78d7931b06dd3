use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    db::models::{Reading, SensorType},
    error::ValidationError,
    query::{
        aggregator::MetricValue,
        filter::{validate_device_uuid, validate_epoch},
    },
};

/// Accepted reading values, inclusive on both ends.
pub const VALUE_BOUNDS: RangeInclusive<i64> = -100..=100;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadingDto {
    pub device_uuid: String,
    #[serde(rename = "type")]
    pub sensor_type: SensorType,
    pub value: i64,
    /// Epoch seconds.
    pub date_created: i64,
}

impl From<Reading> for ReadingDto {
    fn from(r: Reading) -> Self {
        Self {
            device_uuid: r.device_uuid,
            sensor_type: r.sensor_type,
            value: r.value,
            date_created: r.created_at,
        }
    }
}

/// Request body for `POST /devices/{device_uuid}/readings/`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReadingRequest {
    /// `temperature` or `humidity`.
    #[serde(rename = "type")]
    pub sensor_type: Option<String>,
    /// Integer reading in `[-100, 100]`.
    pub value: i64,
    /// Epoch seconds. Defaults to the time of ingestion.
    pub date_created: Option<i64>,
}

impl CreateReadingRequest {
    /// Validates the body (value bounds, then type, then timestamp) and
    /// stamps it with `now` when no `date_created` was sent.
    pub fn into_reading(self, device_uuid: &str, now: i64) -> Result<Reading, ValidationError> {
        validate_device_uuid(device_uuid)?;
        if !VALUE_BOUNDS.contains(&self.value) {
            return Err(ValidationError::ValueOutOfBounds(self.value));
        }
        let sensor_type = match self.sensor_type.as_deref() {
            Some(raw) => raw.parse::<SensorType>()?,
            None => return Err(ValidationError::MissingSensorType),
        };
        let created_at = match self.date_created {
            Some(secs) => validate_epoch("date_created", secs)?,
            None => now,
        };

        Ok(Reading {
            device_uuid: device_uuid.to_owned(),
            sensor_type,
            value: self.value,
            created_at,
        })
    }
}

/// Response for `GET /devices/{device_uuid}/readings/{metric}/`.
#[derive(Debug, Serialize, ToSchema)]
pub struct MetricResponse {
    /// `null` when no readings match the filter.
    #[schema(value_type = Option<f64>)]
    pub value: Option<MetricValue>,
}
