use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

use super::ReadingStore;
use crate::{db, db::models::Reading, error::StoreError, query::filter::Filter};

/// `ReadingStore` over the SQLite `readings` table.
///
/// Filter values only ever travel as bound parameters.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens the pool and brings the schema up to date.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = db::create_pool(database_url, max_connections).await?;
        db::run_migrations(&pool).await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl ReadingStore for SqliteStore {
    async fn insert(&self, reading: &Reading) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO readings (device_uuid, type, value, date_created) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&reading.device_uuid)
        .bind(reading.sensor_type.as_str())
        .bind(reading.value)
        .bind(reading.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn scan(&self, filter: &Filter) -> Result<Vec<Reading>, StoreError> {
        debug!(filter = ?filter, "Scanning readings");
        let rows = sqlx::query_as::<_, Reading>(
            r#"
            SELECT device_uuid, type, value, date_created
            FROM readings
            WHERE device_uuid = ?1
              AND (?2 IS NULL OR type = ?2)
              AND (?3 IS NULL OR date_created > ?3)
              AND (?4 IS NULL OR date_created < ?4)
            ORDER BY date_created ASC
            "#,
        )
        .bind(&filter.device_uuid)
        .bind(filter.sensor_type.map(|t| t.as_str()))
        .bind(filter.start)
        .bind(filter.end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count(&self, device_uuid: &str) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM readings WHERE device_uuid = ?1")
            .bind(device_uuid)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn distinct_device_uuids(&self) -> Result<Vec<String>, StoreError> {
        let uuids: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT device_uuid FROM readings ORDER BY device_uuid ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(uuids)
    }
}

#[cfg(test)]
mod tests {
    use sqlx::SqlitePool;

    use super::*;
    use crate::db::models::SensorType;

    fn reading(device_uuid: &str, sensor_type: SensorType, value: i64, created_at: i64) -> Reading {
        Reading {
            device_uuid: device_uuid.to_owned(),
            sensor_type,
            value,
            created_at,
        }
    }

    async fn seeded(pool: SqlitePool) -> SqliteStore {
        let store = SqliteStore::new(pool);
        for r in [
            reading("dev1", SensorType::Temperature, 30, 300),
            reading("dev1", SensorType::Temperature, 10, 100),
            reading("dev1", SensorType::Humidity, 60, 200),
            reading("dev0", SensorType::Humidity, 40, 100),
        ] {
            store.insert(&r).await.unwrap();
        }
        store
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn scan_returns_device_readings_in_time_order(pool: SqlitePool) {
        let store = seeded(pool).await;
        let rows = store.scan(&Filter::device("dev1")).await.unwrap();
        let times: Vec<i64> = rows.iter().map(|r| r.created_at).collect();
        assert_eq!(times, vec![100, 200, 300]);
        assert!(rows.iter().all(|r| r.device_uuid == "dev1"));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn scan_applies_sensor_type_and_exclusive_bounds(pool: SqlitePool) {
        let store = seeded(pool).await;

        let rows = store
            .scan(&Filter::device("dev1").sensor_type(SensorType::Temperature))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.sensor_type == SensorType::Temperature));

        let rows = store.scan(&Filter::device("dev1").start(100).end(300)).await.unwrap();
        assert_eq!(rows, vec![reading("dev1", SensorType::Humidity, 60, 200)]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn quoted_device_uuid_is_treated_as_data(pool: SqlitePool) {
        let store = seeded(pool).await;
        let hostile = r#"dev1" OR "1"="1"#;
        assert!(store.scan(&Filter::device(hostile)).await.unwrap().is_empty());
        assert_eq!(store.count(hostile).await.unwrap(), 0);

        store
            .insert(&reading(hostile, SensorType::Humidity, 1, 1))
            .await
            .unwrap();
        assert_eq!(store.count(hostile).await.unwrap(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn count_ignores_filters_and_other_devices(pool: SqlitePool) {
        let store = seeded(pool).await;
        assert_eq!(store.count("dev1").await.unwrap(), 3);
        assert_eq!(store.count("dev0").await.unwrap(), 1);
        assert_eq!(store.count("missing").await.unwrap(), 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn distinct_device_uuids_are_sorted_and_unique(pool: SqlitePool) {
        let store = seeded(pool).await;
        assert_eq!(store.distinct_device_uuids().await.unwrap(), vec!["dev0", "dev1"]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn duplicate_readings_are_kept(pool: SqlitePool) {
        let store = SqliteStore::new(pool);
        let r = reading("dev1", SensorType::Temperature, 20, 100);
        store.insert(&r).await.unwrap();
        store.insert(&r).await.unwrap();
        assert_eq!(store.count("dev1").await.unwrap(), 2);
    }
}
