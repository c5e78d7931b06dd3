pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::{db::models::Reading, error::StoreError, query::filter::Filter};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Append-only table of readings the query engine reads from.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    async fn insert(&self, reading: &Reading) -> Result<(), StoreError>;

    /// Every reading matching `filter`, ordered by `created_at` ascending.
    async fn scan(&self, filter: &Filter) -> Result<Vec<Reading>, StoreError>;

    /// Total readings for `device_uuid`, ignoring sensor type and time.
    async fn count(&self, device_uuid: &str) -> Result<i64, StoreError>;

    /// Every device with at least one reading, sorted ascending.
    async fn distinct_device_uuids(&self) -> Result<Vec<String>, StoreError>;
}
