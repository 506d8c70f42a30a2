use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which half of a coordinate pair a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coordinate {
    Latitude,
    Longitude,
}

impl Coordinate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Coordinate::Latitude => "latitude",
            Coordinate::Longitude => "longitude",
        }
    }

    /// Accepted inclusive range. Looser than geographic bounds on purpose:
    /// callers already rely on these limits.
    pub const fn bounds(&self) -> (f64, f64) {
        match self {
            Coordinate::Latitude => (-100.0, 100.0),
            Coordinate::Longitude => (-200.0, 200.0),
        }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A latitude/longitude pair as asked for by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// What one round trip to the forecast endpoint produced.
///
/// `latitude`/`longitude` are the values echoed by the upstream body, which
/// may be snapped to the provider's grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub latitude: f64,
    pub longitude: f64,
    pub temperature: f64,
    pub status_code: u16,
}

impl Observation {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// One coordinate's temperature outcome. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReading {
    pub latitude: f64,
    pub longitude: f64,
    pub temperature: f64,
    pub alert: bool,
    pub error: bool,
    pub source_status_code: u16,
}

impl TemperatureReading {
    /// Build a reading from an observation and the classifier's verdict.
    pub fn from_observation(observation: Observation, alert: bool) -> Self {
        Self {
            latitude: observation.latitude,
            longitude: observation.longitude,
            temperature: observation.temperature,
            alert,
            error: !observation.is_success(),
            source_status_code: observation.status_code,
        }
    }

    pub fn echo(&self) -> ReadingEcho {
        ReadingEcho::from(self)
    }
}

/// Fields handed back to callers once a reading has been persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadingEcho {
    pub latitude: f64,
    pub longitude: f64,
    pub temperature: f64,
    pub alert: bool,
    pub error: bool,
}

impl From<&TemperatureReading> for ReadingEcho {
    fn from(reading: &TemperatureReading) -> Self {
        Self {
            latitude: reading.latitude,
            longitude: reading.longitude,
            temperature: reading.temperature,
            alert: reading.alert,
            error: reading.error,
        }
    }
}

/// Document appended to a record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub timestamp: DateTime<Utc>,
    pub request: TemperatureReading,
}

impl StoredRecord {
    pub fn now(request: TemperatureReading) -> Self {
        Self { timestamp: Utc::now(), request }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(status_code: u16) -> Observation {
        Observation { latitude: 52.52, longitude: 13.41, temperature: 21.5, status_code }
    }

    #[test]
    fn reading_flags_error_for_non_success_status() {
        assert!(!TemperatureReading::from_observation(observation(200), false).error);
        assert!(!TemperatureReading::from_observation(observation(204), false).error);
        assert!(TemperatureReading::from_observation(observation(404), false).error);
        assert!(TemperatureReading::from_observation(observation(503), false).error);
    }

    #[test]
    fn echo_keeps_every_caller_visible_field() {
        let reading = TemperatureReading::from_observation(observation(500), true);
        let echo = reading.echo();

        assert_eq!(echo.latitude, reading.latitude);
        assert_eq!(echo.longitude, reading.longitude);
        assert_eq!(echo.temperature, reading.temperature);
        assert_eq!(echo.alert, reading.alert);
        assert_eq!(echo.error, reading.error);
    }

    #[test]
    fn echo_serializes_with_wire_field_names() {
        let reading = TemperatureReading::from_observation(observation(200), false);
        let json = serde_json::to_value(reading.echo()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "latitude": 52.52,
                "longitude": 13.41,
                "temperature": 21.5,
                "alert": false,
                "error": false,
            })
        );
    }
}
