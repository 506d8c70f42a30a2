//! Persistence of completed readings into append-only record sets.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{
    error::{TemperatureError, TemperatureResult},
    model::{ReadingEcho, TemperatureReading},
};

pub mod embedded;

pub use embedded::EmbeddedSink;

/// Named append-only collection of persisted readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordSet {
    Success,
    Alert,
    Error,
}

impl RecordSet {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordSet::Success => "success",
            RecordSet::Alert => "alert",
            RecordSet::Error => "error",
        }
    }

    pub const fn all() -> &'static [RecordSet] {
        &[RecordSet::Success, RecordSet::Alert, RecordSet::Error]
    }

    /// Record sets a reading is appended to: `success` or `error` by the
    /// error flag, plus `alert` when the alert flag is set.
    pub fn targets(reading: &TemperatureReading) -> Vec<RecordSet> {
        let primary = if reading.error { RecordSet::Error } else { RecordSet::Success };

        let mut sets = vec![primary];
        if reading.alert {
            sets.push(RecordSet::Alert);
        }
        sets
    }
}

impl std::fmt::Display for RecordSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordSet {
    type Err = TemperatureError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "success" => Ok(RecordSet::Success),
            "alert" => Ok(RecordSet::Alert),
            "error" => Ok(RecordSet::Error),
            _ => Err(TemperatureError::persistence(format!(
                "unknown record set '{value}' (expected success, alert or error)"
            ))),
        }
    }
}

/// Insert-only destination for readings; the `SaveTemperature` half of the
/// service contract.
///
/// Every call appends new records; nothing is updated or deduplicated.
#[async_trait]
pub trait TemperatureSink: Send + Sync {
    async fn save_temperature(
        &self,
        reading: &TemperatureReading,
    ) -> TemperatureResult<ReadingEcho>;
}
