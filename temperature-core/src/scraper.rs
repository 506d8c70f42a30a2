//! Query facade: coordinates in, persisted reading out.
//!
//! A lookup moves through `validating → fetching → parsing → classifying →
//! persisting → done`, one debug event per stage. Any failure stops the lookup
//! where it happened and is returned to the caller; nothing is persisted for
//! validation, fetch or parse failures. A non-success upstream status with a readable body is not a
//! failure: it becomes a reading with `error = true` and is persisted.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use crate::{
    classify::AlertClassifier,
    error::{TemperatureError, TemperatureResult},
    model::{Coordinates, ReadingEcho, TemperatureReading},
    provider::ForecastProvider,
    sink::TemperatureSink,
    validate,
};

/// The `ListTemperature` half of the service contract.
#[async_trait]
pub trait TemperatureService: Send + Sync {
    async fn list_temperature(&self, coords: Coordinates) -> TemperatureResult<ReadingEcho>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Fetching,
    Parsing,
    Classifying,
    Persisting,
    Done,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Validating => "validating",
            Stage::Fetching => "fetching",
            Stage::Parsing => "parsing",
            Stage::Classifying => "classifying",
            Stage::Persisting => "persisting",
            Stage::Done => "done",
        }
    }

    /// Stage a pipeline error was raised in. `None` for errors raised on the
    /// way to the scraper, which never entered the pipeline.
    pub fn of(err: &TemperatureError) -> Option<Stage> {
        match err {
            TemperatureError::OutOfRange { .. } | TemperatureError::InvalidCoordinate { .. } => {
                Some(Stage::Validating)
            }
            TemperatureError::Fetch { .. } => Some(Stage::Fetching),
            TemperatureError::Parse { .. } => Some(Stage::Parsing),
            TemperatureError::Persistence { .. } => Some(Stage::Persisting),
            TemperatureError::Unavailable { .. } => None,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validates, fetches, classifies and persists one reading per call.
pub struct Scraper {
    provider: Arc<dyn ForecastProvider>,
    classifier: Arc<dyn AlertClassifier>,
    sink: Arc<dyn TemperatureSink>,
}

impl Scraper {
    pub fn new(
        provider: Arc<dyn ForecastProvider>,
        classifier: Arc<dyn AlertClassifier>,
        sink: Arc<dyn TemperatureSink>,
    ) -> Self {
        Self { provider, classifier, sink }
    }

    async fn run(&self, coords: Coordinates) -> TemperatureResult<ReadingEcho> {
        debug!(stage = %Stage::Validating);
        validate::check_coordinates(coords)?;

        debug!(stage = %Stage::Fetching);
        let response = self.provider.fetch(coords).await?;

        debug!(stage = %Stage::Parsing, status = response.status_code);
        let observation = self.provider.parse(&response)?;

        debug!(stage = %Stage::Classifying, temperature = observation.temperature);
        let alert = self.classifier.is_alert(observation.temperature);
        let reading = TemperatureReading::from_observation(observation, alert);

        debug!(stage = %Stage::Persisting, alert = reading.alert, error = reading.error);
        let saved = self.sink.save_temperature(&reading).await?;

        debug!(stage = %Stage::Done);
        Ok(saved)
    }
}

#[async_trait]
impl TemperatureService for Scraper {
    #[instrument(skip(self))]
    async fn list_temperature(&self, coords: Coordinates) -> TemperatureResult<ReadingEcho> {
        match self.run(coords).await {
            Ok(saved) => {
                info!(
                    latitude = saved.latitude,
                    longitude = saved.longitude,
                    temperature = saved.temperature,
                    alert = saved.alert,
                    error = saved.error,
                    "temperature recorded"
                );
                Ok(saved)
            }
            Err(e) => {
                let stage = Stage::of(&e).map_or("remote", Stage::as_str);
                error!(stage, error = %e, "temperature lookup failed");
                Err(e)
            }
        }
    }
}
