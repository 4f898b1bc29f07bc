//! Defines data structures for the OpenWeatherMap payloads and their normalized forms.
//!
//! Includes structs for:
//! - Deserializing raw API responses (`Raw*`, `*Response`).
//! - The flat, display-ready records produced by the normalizer (`Normalized*`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// --- Raw API Response Structs ---

/// Envelope shared by the air pollution endpoints (current, forecast, history).
///
/// `list` is optional: a missing list means "no data", not a decoding failure.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AirQualityResponse {
    #[serde(default)]
    pub list: Option<Vec<RawAirQualityRecord>>,
}

/// One hourly reading from the air pollution endpoints.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RawAirQualityRecord {
    /// Unix timestamp, seconds.
    pub dt: i64,
    pub main: RawAqi,
    /// Pollutant code -> concentration in µg/m³.
    #[serde(default)]
    pub components: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct RawAqi {
    pub aqi: u8,
}

/// A weather condition descriptor; the API always sends a list of these.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct RawCondition {
    #[serde(default)]
    pub main: String,
    #[serde(default)]
    pub description: String,
}

/// Payload of `/data/2.5/weather`.
///
/// Every field is required; a snapshot missing any of them fails to decode.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RawWeatherSnapshot {
    pub name: String,
    pub sys: RawSys,
    pub weather: Vec<RawCondition>,
    /// temp, feels_like, temp_min, temp_max, pressure, humidity, sea_level, ...
    pub main: BTreeMap<String, f64>,
    pub visibility: u32,
    pub wind: RawWind,
    pub clouds: RawClouds,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RawSys {
    pub country: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct RawWind {
    pub speed: f64,
    pub deg: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct RawClouds {
    pub all: u8,
}

/// Envelope shared by the forecast endpoints.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ForecastResponse<T> {
    #[serde(default = "Option::default")]
    pub list: Option<Vec<T>>,
}

/// Entry of the hourly and 5-day/3-hour forecasts.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RawForecastRecord {
    pub dt: i64,
    /// Provider-formatted "YYYY-MM-DD HH:MM:SS"; preferred over `dt` when present.
    #[serde(default)]
    pub dt_txt: Option<String>,
    #[serde(default)]
    pub main: RawForecastMain,
    #[serde(default)]
    pub weather: Vec<RawCondition>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq)]
pub struct RawForecastMain {
    #[serde(default)]
    pub temp: Option<f64>,
}

/// Entry of `/data/2.5/forecast/daily`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RawDailyForecastRecord {
    pub dt: i64,
    pub temp: RawDayNight,
    #[serde(default)]
    pub weather: Vec<RawCondition>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct RawDayNight {
    pub day: f64,
    pub night: f64,
}

// --- Normalized (display-ready) Structs ---

/// Category assigned to an air quality index value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AqiCategory {
    Good,
    Fair,
    Moderate,
    Poor,
    #[serde(rename = "Very Poor")]
    VeryPoor,
    Unknown,
}

impl AqiCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Fair => "Fair",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::Poor => "Poor",
            AqiCategory::VeryPoor => "Very Poor",
            AqiCategory::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flat air quality record, one per raw record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedAirQualityRecord {
    /// UTC, "YYYY-MM-DD HH:MM:SS".
    pub date_time: String,
    pub air_quality_index: u8,
    pub air_quality_description: AqiCategory,
    /// Human-readable pollutant label -> concentration.
    pub components: BTreeMap<String, f64>,
}

/// Flat current-conditions record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedWeatherSnapshot {
    pub name: String,
    pub country: String,
    /// Always "<main> - <description>".
    pub condition: String,
    /// Human-readable feature label -> value.
    pub main_features: BTreeMap<String, f64>,
    /// Metres.
    pub visibility: u32,
    pub wind_speed: f64,
    pub wind_direction: f64,
    /// Cloud cover, percent.
    pub cloudiness: u8,
}

/// Which periodic forecast a record sequence came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForecastKind {
    Hourly,
    Daily,
    ThreeHour,
}

/// Forecast temperature: a scalar, or a day/night pair for daily forecasts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Temperature {
    Scalar(Option<f64>),
    DayNight { day: f64, night: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedForecastRecord {
    pub date_time: String,
    pub temperature: Temperature,
    pub condition: String,
}
