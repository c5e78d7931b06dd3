pub mod dto;
pub mod errors;
pub mod handlers;

use axum::{routing::get, Router};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use handlers::ApiDoc;

use crate::query::QueryEngine;

pub fn router(engine: QueryEngine) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route(
            "/devices/{device_uuid}/readings/",
            get(handlers::list_readings).post(handlers::create_reading),
        )
        .route(
            "/devices/{device_uuid}/readings/quartiles/",
            get(handlers::get_quartiles),
        )
        .route(
            "/devices/{device_uuid}/readings/{metric}/",
            get(handlers::get_metric),
        )
        .route("/devices/readings/summary/", get(handlers::get_summary))
        .with_state(engine)
        .split_for_parts();

    router
        .route("/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
}
