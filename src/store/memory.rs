use std::{collections::BTreeSet, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::ReadingStore;
use crate::{db::models::Reading, error::StoreError, query::filter::Filter};

/// In-process reading table.
///
/// Wrapped in `Arc` so it can be cheaply cloned and shared across tasks.
/// Uses `tokio::sync::RwLock` so concurrent readers never block each other.
/// Contents are lost on restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Vec<Reading>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReadingStore for MemoryStore {
    async fn insert(&self, reading: &Reading) -> Result<(), StoreError> {
        self.inner.write().await.push(reading.clone());
        Ok(())
    }

    async fn scan(&self, filter: &Filter) -> Result<Vec<Reading>, StoreError> {
        let mut rows: Vec<Reading> = self
            .inner
            .read()
            .await
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        // Stable sort keeps insertion order among equal timestamps.
        rows.sort_by_key(|r| r.created_at);
        Ok(rows)
    }

    async fn count(&self, device_uuid: &str) -> Result<i64, StoreError> {
        let n = self
            .inner
            .read()
            .await
            .iter()
            .filter(|r| r.device_uuid == device_uuid)
            .count();
        Ok(n as i64)
    }

    async fn distinct_device_uuids(&self) -> Result<Vec<String>, StoreError> {
        let uuids: BTreeSet<String> = self
            .inner
            .read()
            .await
            .iter()
            .map(|r| r.device_uuid.clone())
            .collect();
        Ok(uuids.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::SensorType;

    fn make_reading(
        device_uuid: &str,
        sensor_type: SensorType,
        value: i64,
        created_at: i64,
    ) -> Reading {
        Reading {
            device_uuid: device_uuid.to_owned(),
            sensor_type,
            value,
            created_at,
        }
    }

    #[tokio::test]
    async fn empty_store_returns_nothing() {
        let store = MemoryStore::new();
        assert!(store.scan(&Filter::device("dev1")).await.unwrap().is_empty());
        assert_eq!(store.count("dev1").await.unwrap(), 0);
        assert!(store.distinct_device_uuids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn scan_orders_by_created_at() {
        let store = MemoryStore::new();
        store.insert(&make_reading("dev1", SensorType::Temperature, 3, 300)).await.unwrap();
        store.insert(&make_reading("dev1", SensorType::Temperature, 1, 100)).await.unwrap();
        store.insert(&make_reading("dev1", SensorType::Temperature, 2, 200)).await.unwrap();

        let values: Vec<i64> = store
            .scan(&Filter::device("dev1"))
            .await
            .unwrap()
            .iter()
            .map(|r| r.value)
            .collect();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn scan_applies_filter() {
        let store = MemoryStore::new();
        store.insert(&make_reading("dev1", SensorType::Temperature, 20, 100)).await.unwrap();
        store.insert(&make_reading("dev1", SensorType::Humidity, 60, 150)).await.unwrap();
        store.insert(&make_reading("dev2", SensorType::Humidity, 70, 150)).await.unwrap();

        let rows = store
            .scan(&Filter::device("dev1").sensor_type(SensorType::Humidity))
            .await
            .unwrap();
        assert_eq!(rows, vec![make_reading("dev1", SensorType::Humidity, 60, 150)]);
    }

    #[tokio::test]
    async fn count_and_distinct_devices() {
        let store = MemoryStore::new();
        store.insert(&make_reading("zeta", SensorType::Temperature, 1, 1)).await.unwrap();
        store.insert(&make_reading("alpha", SensorType::Temperature, 1, 1)).await.unwrap();
        store.insert(&make_reading("alpha", SensorType::Humidity, 1, 1)).await.unwrap();

        assert_eq!(store.count("alpha").await.unwrap(), 2);
        assert_eq!(store.distinct_device_uuids().await.unwrap(), vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn clone_shares_state() {
        let store = MemoryStore::new();
        let clone = store.clone();

        store.insert(&make_reading("dev1", SensorType::Humidity, 1, 1)).await.unwrap();

        // Clone sees the same data
        assert_eq!(clone.count("dev1").await.unwrap(), 1);
    }
}
