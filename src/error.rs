use thiserror::Error;

/// Rejected client input. Every message names the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid uuid: {0:?}")]
    DeviceUuid(String),

    #[error("Invalid sensor type: {0}")]
    SensorType(String),

    #[error("Missing sensor type: the `type` parameter is required")]
    MissingSensorType,

    #[error("Invalid {field} time: {value}")]
    Epoch { field: &'static str, value: String },

    #[error("Metric not found: {0}")]
    Metric(String),

    #[error("Value outside of bounds: {0}")]
    ValueOutOfBounds(i64),
}

/// Failure inside the reading store collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

#[derive(Debug, Error)]
pub enum QueryError {
    /// The filtered value set is empty.
    #[error("no readings match the filter")]
    NoData,

    #[error(transparent)]
    Store(#[from] StoreError),
}
