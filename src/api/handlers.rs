use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use utoipa::OpenApi;

use super::{
    dto::{CreateReadingRequest, MetricResponse, ReadingDto},
    errors::AppError,
};
use crate::{
    db::models::SensorType,
    error::QueryError,
    query::{
        aggregator::Metric,
        filter::{FilterParams, SensorRequirement},
        quartiles::Quartiles,
        summary::DeviceSummary,
        QueryEngine,
    },
};

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

/// Record one reading for a device.
#[utoipa::path(
    post,
    path = "/devices/{device_uuid}/readings/",
    params(
        ("device_uuid" = String, Path, description = "Device identifier"),
    ),
    request_body = CreateReadingRequest,
    responses(
        (status = 201, description = "Reading stored", body = String),
        (status = 400, description = "Invalid type, value, timestamp or body"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "readings"
)]
pub async fn create_reading(
    State(engine): State<QueryEngine>,
    Path(device_uuid): Path<String>,
    payload: Bytes,
) -> Result<(StatusCode, Json<&'static str>), AppError> {
    // Decoded by hand: clients are not required to send a JSON content type.
    let body: CreateReadingRequest = serde_json::from_slice(&payload)?;
    let reading = body.into_reading(&device_uuid, Utc::now().timestamp())?;
    engine.record(&reading).await?;
    Ok((StatusCode::CREATED, Json("success")))
}

/// List a device's readings, oldest first. Every filter parameter is optional.
#[utoipa::path(
    get,
    path = "/devices/{device_uuid}/readings/",
    params(
        ("device_uuid" = String, Path, description = "Device identifier"),
        FilterParams,
    ),
    responses(
        (status = 200, description = "Matching readings", body = Vec<ReadingDto>),
        (status = 400, description = "Invalid type or timestamp"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "readings"
)]
pub async fn list_readings(
    State(engine): State<QueryEngine>,
    Path(device_uuid): Path<String>,
    params: Result<Query<FilterParams>, QueryRejection>,
) -> Result<Json<Vec<ReadingDto>>, AppError> {
    let Query(params) = params?;
    let filter = params.build(&device_uuid, SensorRequirement::Optional)?;
    let rows = engine.readings(&filter).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Compute `min`, `max`, `mean`, `median` or `mode` over a device's readings
/// of one sensor type. `value` is `null` when nothing matches.
#[utoipa::path(
    get,
    path = "/devices/{device_uuid}/readings/{metric}/",
    params(
        ("device_uuid" = String, Path, description = "Device identifier"),
        ("metric" = String, Path, description = "One of min, max, mean, median, mode"),
        FilterParams,
    ),
    responses(
        (status = 200, description = "Aggregate value", body = MetricResponse),
        (status = 400, description = "Unknown metric, missing or invalid type, invalid timestamp"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "aggregates"
)]
pub async fn get_metric(
    State(engine): State<QueryEngine>,
    Path((device_uuid, metric)): Path<(String, String)>,
    params: Result<Query<FilterParams>, QueryRejection>,
) -> Result<Json<MetricResponse>, AppError> {
    let Query(params) = params?;
    let metric = metric.parse::<Metric>()?;
    let filter = params.build(&device_uuid, SensorRequirement::Required)?;

    let value = match engine.metric(&filter, metric).await {
        Ok(value) => Some(value),
        Err(QueryError::NoData) => None,
        Err(QueryError::Store(e)) => return Err(e.into()),
    };
    Ok(Json(MetricResponse { value }))
}

/// First and third positional quartile of a device's readings of one sensor type.
#[utoipa::path(
    get,
    path = "/devices/{device_uuid}/readings/quartiles/",
    params(
        ("device_uuid" = String, Path, description = "Device identifier"),
        FilterParams,
    ),
    responses(
        (status = 200, description = "Quartiles, `null` when nothing matches", body = Quartiles),
        (status = 400, description = "Missing or invalid type, invalid timestamp"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "aggregates"
)]
pub async fn get_quartiles(
    State(engine): State<QueryEngine>,
    Path(device_uuid): Path<String>,
    params: Result<Query<FilterParams>, QueryRejection>,
) -> Result<Json<Quartiles>, AppError> {
    let Query(params) = params?;
    let filter = params.build(&device_uuid, SensorRequirement::Required)?;
    Ok(Json(engine.quartiles(&filter).await?))
}

/// Per-device summary over every known device, sorted by device identifier.
#[utoipa::path(
    get,
    path = "/devices/readings/summary/",
    params(FilterParams),
    responses(
        (status = 200, description = "One summary row per device", body = Vec<DeviceSummary>),
        (status = 400, description = "Invalid type or timestamp"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "aggregates"
)]
pub async fn get_summary(
    State(engine): State<QueryEngine>,
    params: Result<Query<FilterParams>, QueryRejection>,
) -> Result<Json<Vec<DeviceSummary>>, AppError> {
    let Query(params) = params?;
    let criteria = params.criteria(SensorRequirement::Optional)?;
    Ok(Json(engine.summary(&criteria).await?))
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Returns `200 OK` with `{"status":"ok"}` when the server is running.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "system"
)]
pub async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// OpenAPI spec
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(create_reading, list_readings, get_metric, get_quartiles, get_summary, health),
    components(schemas(
        ReadingDto,
        CreateReadingRequest,
        MetricResponse,
        Quartiles,
        DeviceSummary,
        SensorType
    )),
    tags(
        (name = "readings",   description = "Recording and listing readings"),
        (name = "aggregates", description = "Statistics over readings"),
        (name = "system",     description = "System endpoints"),
    ),
    info(
        title = "Sensor Readings API",
        version = "0.1.0",
        description = "Records IoT sensor readings and answers aggregate queries over them"
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
