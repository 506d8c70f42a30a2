use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Coordinate;

/// Result alias used by every pipeline component.
pub type TemperatureResult<T> = Result<T, TemperatureError>;

/// Failures of the coordinate-to-temperature pipeline.
///
/// The enum is serializable so a fault raised in one process can be carried
/// over the RPC surface and rebuilt unchanged on the calling side.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemperatureError {
    #[error("{coordinate} {value} is out of range [{min}, {max}]")]
    OutOfRange {
        coordinate: Coordinate,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("invalid {coordinate} '{input}': expected a decimal number")]
    InvalidCoordinate { coordinate: Coordinate, input: String },

    #[error("forecast request failed: {reason}")]
    Fetch { reason: String },

    #[error("failed to parse forecast response: {reason}")]
    Parse { reason: String },

    #[error("failed to persist reading: {reason}")]
    Persistence { reason: String },

    #[error("temperature service unavailable: {reason}")]
    Unavailable { reason: String },
}

impl TemperatureError {
    pub fn fetch(reason: impl ToString) -> Self {
        Self::Fetch { reason: reason.to_string() }
    }

    pub fn parse(reason: impl ToString) -> Self {
        Self::Parse { reason: reason.to_string() }
    }

    pub fn persistence(reason: impl ToString) -> Self {
        Self::Persistence { reason: reason.to_string() }
    }

    pub fn unavailable(reason: impl ToString) -> Self {
        Self::Unavailable { reason: reason.to_string() }
    }

    /// True when the caller sent bad input; everything else is a server fault.
    pub fn is_client_fault(&self) -> bool {
        matches!(self, Self::OutOfRange { .. } | Self::InvalidCoordinate { .. })
    }
}
