//! Coordinate checks that run before any network access.

use crate::{
    error::{TemperatureError, TemperatureResult},
    model::{Coordinate, Coordinates},
};

/// Reject a coordinate pair outside the accepted bounds.
///
/// Latitude is checked first, so a pair with both values out of range
/// reports the latitude.
pub fn check_coordinates(coords: Coordinates) -> TemperatureResult<()> {
    check(Coordinate::Latitude, coords.latitude)?;
    check(Coordinate::Longitude, coords.longitude)
}

fn check(coordinate: Coordinate, value: f64) -> TemperatureResult<()> {
    let (min, max) = coordinate.bounds();

    // NaN is never contained, so it fails here too.
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(TemperatureError::OutOfRange { coordinate, value, min, max })
    }
}

/// Parse one text-encoded query value.
pub fn parse_coordinate(coordinate: Coordinate, input: Option<&str>) -> TemperatureResult<f64> {
    let raw = input.map(str::trim).unwrap_or_default();

    raw.parse::<f64>()
        .map_err(|_| TemperatureError::InvalidCoordinate { coordinate, input: raw.to_string() })
}

/// Parse both query values into a coordinate pair (bounds are not checked).
pub fn parse_coordinates(
    latitude: Option<&str>,
    longitude: Option<&str>,
) -> TemperatureResult<Coordinates> {
    Ok(Coordinates::new(
        parse_coordinate(Coordinate::Latitude, latitude)?,
        parse_coordinate(Coordinate::Longitude, longitude)?,
    ))
}
