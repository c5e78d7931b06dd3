pub mod aggregator;
pub mod filter;
pub mod quartiles;
pub mod summary;

use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    db::models::Reading,
    error::{QueryError, StoreError},
    store::ReadingStore,
};

use self::{
    aggregator::{aggregate, Metric, MetricValue, SortedValues},
    filter::{Criteria, Filter},
    quartiles::Quartiles,
    summary::DeviceSummary,
};

/// Entry point of the aggregation engine, bound to one reading store.
///
/// Cheap to clone; every request handler gets its own copy.
#[derive(Clone)]
pub struct QueryEngine {
    store: Arc<dyn ReadingStore>,
}

impl QueryEngine {
    pub fn new(store: Arc<dyn ReadingStore>) -> Self {
        Self { store }
    }

    /// Appends a reading unchanged.
    pub async fn record(&self, reading: &Reading) -> Result<(), StoreError> {
        self.store.insert(reading).await?;
        info!(
            device_uuid = %reading.device_uuid,
            sensor_type = %reading.sensor_type,
            value = reading.value,
            created_at = reading.created_at,
            "Reading recorded"
        );
        Ok(())
    }

    pub async fn readings(&self, filter: &Filter) -> Result<Vec<Reading>, StoreError> {
        self.store.scan(filter).await
    }

    /// Fails with [`QueryError::NoData`] when nothing matches `filter`.
    pub async fn metric(&self, filter: &Filter, metric: Metric) -> Result<MetricValue, QueryError> {
        let values = self.values(filter).await?;
        debug!(
            device_uuid = %filter.device_uuid,
            metric = %metric,
            n = values.len(),
            "Computing metric"
        );
        aggregate(metric, &values)
    }

    pub async fn quartiles(&self, filter: &Filter) -> Result<Quartiles, StoreError> {
        let values = self.values(filter).await?;
        Ok(quartiles::quartiles(&values))
    }

    pub async fn summary(&self, criteria: &Criteria) -> Result<Vec<DeviceSummary>, StoreError> {
        summary::report(self.store.as_ref(), criteria).await
    }

    async fn values(&self, filter: &Filter) -> Result<SortedValues, StoreError> {
        let readings = self.store.scan(filter).await?;
        Ok(SortedValues::from_readings(&readings))
    }
}
