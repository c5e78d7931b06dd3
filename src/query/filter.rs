use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    db::models::{Reading, SensorType},
    error::ValidationError,
};

/// Request-scoped predicate over readings.
///
/// Matches `device_uuid == device AND (type == sensor_type OR sensor_type absent)
/// AND (created_at > start OR start absent) AND (created_at < end OR end absent)`.
/// Both bounds are exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub device_uuid: String,
    pub sensor_type: Option<SensorType>,
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl Filter {
    /// Unrestricted filter over every reading of `device_uuid`.
    pub fn device(device_uuid: impl Into<String>) -> Self {
        Self {
            device_uuid: device_uuid.into(),
            sensor_type: None,
            start: None,
            end: None,
        }
    }

    pub fn sensor_type(mut self, sensor_type: SensorType) -> Self {
        self.sensor_type = Some(sensor_type);
        self
    }

    pub fn start(mut self, start: i64) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: i64) -> Self {
        self.end = Some(end);
        self
    }

    pub fn matches(&self, reading: &Reading) -> bool {
        reading.device_uuid == self.device_uuid
            && self.sensor_type.is_none_or(|t| reading.sensor_type == t)
            && self.start.is_none_or(|s| reading.created_at > s)
            && self.end.is_none_or(|e| reading.created_at < e)
    }
}

/// The device-independent half of a filter: sensor type and time window.
/// The summary report applies one of these to every known device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Criteria {
    pub sensor_type: Option<SensorType>,
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl Criteria {
    pub fn for_device(&self, device_uuid: impl Into<String>) -> Filter {
        Filter {
            device_uuid: device_uuid.into(),
            sensor_type: self.sensor_type,
            start: self.start,
            end: self.end,
        }
    }
}

/// Whether an endpoint insists on a `type` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorRequirement {
    Optional,
    Required,
}

/// Raw filter parameters exactly as they arrive on the query string.
///
/// Kept as strings so that bad input turns into a `ValidationError` naming
/// the field instead of a generic extractor rejection.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FilterParams {
    /// `temperature` or `humidity`.
    #[serde(rename = "type")]
    pub sensor_type: Option<String>,
    /// Exclusive lower bound on the reading's epoch timestamp.
    pub start: Option<String>,
    /// Exclusive upper bound on the reading's epoch timestamp.
    pub end: Option<String>,
}

impl FilterParams {
    /// Validates `type`, then `start`, then `end`. Empty strings count as absent.
    pub fn criteria(&self, requirement: SensorRequirement) -> Result<Criteria, ValidationError> {
        let sensor_type = match non_empty(&self.sensor_type) {
            Some(raw) => Some(raw.parse::<SensorType>()?),
            None if requirement == SensorRequirement::Required => {
                return Err(ValidationError::MissingSensorType)
            }
            None => None,
        };

        Ok(Criteria {
            sensor_type,
            start: parse_epoch("start", non_empty(&self.start))?,
            end: parse_epoch("end", non_empty(&self.end))?,
        })
    }

    /// Validates the device identifier and the parameters into a full [`Filter`].
    pub fn build(
        &self,
        device_uuid: &str,
        requirement: SensorRequirement,
    ) -> Result<Filter, ValidationError> {
        validate_device_uuid(device_uuid)?;
        Ok(self.criteria(requirement)?.for_device(device_uuid))
    }
}

/// Device identifiers are opaque; the only requirement is that they are non-empty.
pub fn validate_device_uuid(device_uuid: &str) -> Result<(), ValidationError> {
    if device_uuid.is_empty() {
        return Err(ValidationError::DeviceUuid(device_uuid.to_owned()));
    }
    Ok(())
}

/// Rejects epochs that cannot be represented as a calendar timestamp.
pub fn validate_epoch(field: &'static str, secs: i64) -> Result<i64, ValidationError> {
    match DateTime::<Utc>::from_timestamp(secs, 0) {
        Some(_) => Ok(secs),
        None => Err(ValidationError::Epoch {
            field,
            value: secs.to_string(),
        }),
    }
}

fn parse_epoch(field: &'static str, raw: Option<&str>) -> Result<Option<i64>, ValidationError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let secs = raw.trim().parse::<i64>().map_err(|_| ValidationError::Epoch {
        field,
        value: raw.to_owned(),
    })?;
    validate_epoch(field, secs).map(Some)
}

fn non_empty(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().filter(|s| !s.is_empty())
}
