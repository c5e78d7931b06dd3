use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

use super::{
    aggregator::{aggregate, Metric, MetricValue, SortedValues},
    filter::Criteria,
    quartiles::quartiles,
};
use crate::{error::StoreError, store::ReadingStore};

/// One row of the summary report.
///
/// `number_of_readings` is always the device's unfiltered total; every other
/// field is computed over the request's filter and is `null` when nothing
/// matched.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DeviceSummary {
    pub device_uuid: String,
    pub number_of_readings: i64,
    #[schema(value_type = Option<f64>)]
    pub max_reading_value: Option<MetricValue>,
    #[schema(value_type = Option<f64>)]
    pub median_reading_value: Option<MetricValue>,
    #[schema(value_type = Option<f64>)]
    pub mean_reading_value: Option<MetricValue>,
    pub quartile_1_value: Option<i64>,
    pub quartile_3_value: Option<i64>,
}

impl DeviceSummary {
    pub fn new(device_uuid: String, number_of_readings: i64, values: &SortedValues) -> Self {
        let q = quartiles(values);
        Self {
            device_uuid,
            number_of_readings,
            max_reading_value: aggregate(Metric::Max, values).ok(),
            median_reading_value: aggregate(Metric::Median, values).ok(),
            mean_reading_value: aggregate(Metric::Mean, values).ok(),
            quartile_1_value: q.quartile_1,
            quartile_3_value: q.quartile_3,
        }
    }
}

/// Builds the report for every known device, sorted by device identifier.
///
/// Two store round trips per device: the unfiltered count and one filtered
/// scan shared by all aggregates.
pub async fn report(
    store: &dyn ReadingStore,
    criteria: &Criteria,
) -> Result<Vec<DeviceSummary>, StoreError> {
    let devices = store.distinct_device_uuids().await?;
    debug!(devices = devices.len(), criteria = ?criteria, "Building summary report");

    let mut rows = Vec::with_capacity(devices.len());
    for device_uuid in devices {
        let number_of_readings = store.count(&device_uuid).await?;
        let readings = store.scan(&criteria.for_device(device_uuid.as_str())).await?;
        let values = SortedValues::from_readings(&readings);
        rows.push(DeviceSummary::new(device_uuid, number_of_readings, &values));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_values_leave_aggregates_null() {
        let row = DeviceSummary::new("dev1".into(), 4, &SortedValues::default());
        assert_eq!(row.number_of_readings, 4);
        assert_eq!(row.max_reading_value, None);
        assert_eq!(row.median_reading_value, None);
        assert_eq!(row.mean_reading_value, None);
        assert_eq!(row.quartile_1_value, None);
        assert_eq!(row.quartile_3_value, None);
    }

    #[test]
    fn aggregates_share_one_value_set() {
        let values = SortedValues::new(vec![22, 50, 100, 22, 50, 100]);
        let row = DeviceSummary::new("test_device".into(), 6, &values);
        assert_eq!(row.max_reading_value, Some(MetricValue::Integer(100)));
        assert_eq!(row.median_reading_value, Some(MetricValue::Integer(50)));
        assert_eq!(row.mean_reading_value, Some(MetricValue::Decimal(57.33)));
        assert_eq!(row.quartile_1_value, Some(22));
        assert_eq!(row.quartile_3_value, Some(100));
    }

    #[test]
    fn serializes_nulls_for_missing_aggregates() {
        let row = DeviceSummary::new("dev1".into(), 1, &SortedValues::default());
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["device_uuid"], "dev1");
        assert_eq!(json["number_of_readings"], 1);
        assert!(json["max_reading_value"].is_null());
        assert!(json["quartile_3_value"].is_null());
    }
}
