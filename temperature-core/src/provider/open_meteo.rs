use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::{
    error::{TemperatureError, TemperatureResult},
    model::{Coordinates, Observation},
};

use super::{ForecastProvider, ForecastResponse};

/// Open-Meteo current-weather client.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    url: String,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new(url: impl Into<String>, timeout: Duration) -> TemperatureResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TemperatureError::fetch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { url: url.into(), http })
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrentWeather {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    latitude: f64,
    longitude: f64,
    current_weather: OmCurrentWeather,
}

#[async_trait]
impl ForecastProvider for OpenMeteoProvider {
    #[instrument(skip(self))]
    async fn fetch(&self, coords: Coordinates) -> TemperatureResult<ForecastResponse> {
        let res = self
            .http
            .get(&self.url)
            .query(&[
                ("latitude", coords.latitude.to_string()),
                ("longitude", coords.longitude.to_string()),
                ("current_weather", "true".to_string()),
            ])
            .send()
            .await
            .map_err(TemperatureError::fetch)?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| TemperatureError::fetch(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            warn!(
                %status,
                body = %truncate_body(&body),
                "forecast endpoint returned non-success status"
            );
        }

        Ok(ForecastResponse { status_code: status.as_u16(), body })
    }

    fn parse(&self, response: &ForecastResponse) -> TemperatureResult<Observation> {
        let parsed: OmResponse =
            serde_json::from_str(&response.body).map_err(TemperatureError::parse)?;

        debug!(
            status = response.status_code,
            temperature = parsed.current_weather.temperature,
            "forecast response parsed"
        );

        Ok(Observation {
            latitude: parsed.latitude,
            longitude: parsed.longitude,
            temperature: parsed.current_weather.temperature,
            status_code: response.status_code,
        })
    }
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
