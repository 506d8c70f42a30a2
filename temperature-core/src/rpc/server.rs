use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use std::sync::Arc;
use tracing::debug;

use crate::{
    error::TemperatureError,
    model::{Coordinates, TemperatureReading},
    rpc::{LIST_TEMPERATURE_PATH, RpcFault, SAVE_TEMPERATURE_PATH},
    scraper::TemperatureService,
    sink::TemperatureSink,
};

/// Serve `ListTemperature` from any [`TemperatureService`].
pub fn scraper_router(service: Arc<dyn TemperatureService>) -> Router {
    Router::new().route(LIST_TEMPERATURE_PATH, post(list_temperature)).with_state(service)
}

/// Serve `SaveTemperature` from any [`TemperatureSink`].
pub fn store_router(sink: Arc<dyn TemperatureSink>) -> Router {
    Router::new().route(SAVE_TEMPERATURE_PATH, post(save_temperature)).with_state(sink)
}

async fn list_temperature(
    State(service): State<Arc<dyn TemperatureService>>,
    Json(coords): Json<Coordinates>,
) -> Response {
    debug!(?coords, "ListTemperature");
    match service.list_temperature(coords).await {
        Ok(echo) => Json(echo).into_response(),
        Err(e) => fault(e),
    }
}

async fn save_temperature(
    State(sink): State<Arc<dyn TemperatureSink>>,
    Json(reading): Json<TemperatureReading>,
) -> Response {
    debug!(?reading, "SaveTemperature");
    match sink.save_temperature(&reading).await {
        Ok(echo) => Json(echo).into_response(),
        Err(e) => fault(e),
    }
}

fn fault(error: TemperatureError) -> Response {
    let status = if error.is_client_fault() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (status, Json(RpcFault::from(error))).into_response()
}
