//! Location types: validated coordinates, geocoding results and resolved places.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated geographic position.
///
/// Both values are finite and inside -90..=90 / -180..=180. No fetch is ever
/// issued with a `Coordinate` that did not pass through [`Coordinate::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Validates and builds a coordinate.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` if either value is not finite or out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(AppError::InvalidInput(format!(
                "latitude {} is outside -90..90",
                latitude
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(AppError::InvalidInput(format!(
                "longitude {} is outside -180..180",
                longitude
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parses manually entered latitude and longitude text.
    ///
    /// Empty input is rejected the same way as non-numeric input.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self> {
        let latitude = latitude.trim();
        let longitude = longitude.trim();
        if latitude.is_empty() || longitude.is_empty() {
            return Err(AppError::InvalidInput(
                "latitude and longitude are required".to_string(),
            ));
        }
        let lat = latitude.parse::<f64>().map_err(|_| {
            AppError::InvalidInput(format!("'{}' is not a valid latitude", latitude))
        })?;
        let lon = longitude.parse::<f64>().map_err(|_| {
            AppError::InvalidInput(format!("'{}' is not a valid longitude", longitude))
        })?;
        Self::new(lat, lon)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Element of the `/geo/1.0/direct` response array.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GeoLocation {
    pub name: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

/// A named location the session can fetch data for.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub name: String,
    /// `None` when the coordinate was typed in by hand.
    pub country: Option<String>,
    pub coordinate: Coordinate,
}

impl Place {
    /// A place whose coordinate was entered manually after geocoding failed.
    pub fn manual(name: &str, coordinate: Coordinate) -> Self {
        Self {
            name: name.to_string(),
            country: None,
            coordinate,
        }
    }
}

impl TryFrom<GeoLocation> for Place {
    type Error = AppError;

    fn try_from(geo: GeoLocation) -> Result<Self> {
        let coordinate = Coordinate::new(geo.lat, geo.lon)?;
        Ok(Self {
            name: geo.name,
            country: Some(geo.country),
            coordinate,
        })
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.country {
            Some(country) => write!(f, "{}, {} ({})", self.name, country, self.coordinate),
            None => write!(f, "{} ({})", self.name, self.coordinate),
        }
    }
}
