//! Core library for the temperature alert service.
//!
//! This crate defines:
//! - The coordinate-to-temperature pipeline (validate, fetch, classify, persist)
//! - Abstractions over the forecast provider and the persistence sink
//! - The HTTP query interface and the inter-process RPC transport
//! - Configuration handling
//!
//! It is used by `temperature-cli`, which wires the pieces into processes.

pub mod api;
pub mod classify;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod rpc;
pub mod scraper;
pub mod sink;
pub mod validate;

pub use classify::{AlertClassifier, ThresholdClassifier};
pub use config::Config;
pub use error::{TemperatureError, TemperatureResult};
pub use model::{
    Coordinate, Coordinates, Observation, ReadingEcho, StoredRecord, TemperatureReading,
};
pub use provider::{ForecastProvider, ForecastResponse};
pub use scraper::{Scraper, TemperatureService};
pub use sink::{EmbeddedSink, RecordSet, TemperatureSink};
