use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

use crate::{
    config::ForecastConfig,
    error::TemperatureResult,
    model::{Coordinates, Observation},
    provider::open_meteo::OpenMeteoProvider,
};

pub mod open_meteo;

/// Raw upstream reply, before its body is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastResponse {
    pub status_code: u16,
    pub body: String,
}

/// Source of current temperature observations.
///
/// [`fetch`](Self::fetch) is one upstream round trip; implementations never
/// retry. A non-success upstream status is reported through
/// [`Observation::status_code`], not as an error.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn fetch(&self, coords: Coordinates) -> TemperatureResult<ForecastResponse>;

    fn parse(&self, response: &ForecastResponse) -> TemperatureResult<Observation>;

    async fn current_temperature(&self, coords: Coordinates) -> TemperatureResult<Observation> {
        let response = self.fetch(coords).await?;
        self.parse(&response)
    }
}

/// Construct the forecast provider described by config.
pub fn provider_from_config(
    config: &ForecastConfig,
) -> TemperatureResult<Arc<dyn ForecastProvider>> {
    let provider = OpenMeteoProvider::new(config.url.clone(), config.timeout())?;
    Ok(Arc::new(provider))
}
