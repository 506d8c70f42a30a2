//! Inbound HTTP query interface.
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/getTemperature?latitude=..&longitude=..` | Record the current temperature |
//!
//! Success replies with the reading echo. Every failure replies with a
//! `{message}` body: malformed queries and bad coordinates get 400 with the
//! validation message, everything else gets 500 with a generic message and the
//! detail only goes to the log. Coordinates are range-checked here, before
//! they are forwarded, so the answer does not depend on where the scraper runs.

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};

use crate::{scraper::TemperatureService, validate};

pub const GENERIC_FAILURE: &str = "Failed to get temperature";

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<dyn TemperatureService>,
}

/// Query string of `/getTemperature`; values stay text until validated.
#[derive(Debug, Deserialize)]
pub struct TemperatureQuery {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

pub fn build_router(service: Arc<dyn TemperatureService>) -> Router {
    Router::new()
        .route("/getTemperature", get(get_temperature))
        .with_state(ApiState { service })
}

fn error_response(message: &str, status: StatusCode) -> Response {
    (status, Json(ErrorBody { message: message.to_string() })).into_response()
}

/// GET /getTemperature
pub async fn get_temperature(
    State(state): State<ApiState>,
    query: Result<Query<TemperatureQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            warn!(error = %rejection, "malformed temperature query");
            return error_response(&rejection.body_text(), StatusCode::BAD_REQUEST);
        }
    };

    let coords = match validate::parse_coordinates(
        query.latitude.as_deref(),
        query.longitude.as_deref(),
    )
    .and_then(|coords| validate::check_coordinates(coords).map(|()| coords))
    {
        Ok(coords) => coords,
        Err(e) => {
            warn!(error = %e, "rejected temperature query");
            return error_response(&e.to_string(), StatusCode::BAD_REQUEST);
        }
    };

    match state.service.list_temperature(coords).await {
        Ok(echo) => Json(echo).into_response(),
        Err(e) if e.is_client_fault() => {
            warn!(error = %e, "rejected temperature query");
            error_response(&e.to_string(), StatusCode::BAD_REQUEST)
        }
        Err(e) => {
            error!(error = %e, "Failed to get temperature");
            error_response(GENERIC_FAILURE, StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
