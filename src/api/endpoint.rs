//! Typed descriptors for the OpenWeatherMap endpoints the application reads.

use crate::models::{Coordinate, ForecastKind};

/// Which configured host serves an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Host {
    /// `api.openweathermap.org`: geocoding and air pollution.
    Api,
    /// `pro.openweathermap.org`: weather and forecasts.
    Pro,
}

/// How a payload must be decoded and normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    AirQuality,
    CurrentWeather,
    Forecast(ForecastKind),
}

/// A data endpoint plus the request parameters it needs beyond the coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    CurrentAirQuality,
    AirQualityForecast,
    /// Unix seconds, inclusive range.
    AirQualityHistory { start: i64, end: i64 },
    CurrentWeather,
    HourlyForecast,
    /// `count` days are requested (`cnt`).
    DailyForecast { count: u8 },
    ThreeHourForecast,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::CurrentAirQuality => "/data/2.5/air_pollution",
            Endpoint::AirQualityForecast => "/data/2.5/air_pollution/forecast",
            Endpoint::AirQualityHistory { .. } => "/data/2.5/air_pollution/history",
            Endpoint::CurrentWeather => "/data/2.5/weather",
            Endpoint::HourlyForecast => "/data/2.5/forecast/hourly",
            Endpoint::DailyForecast { .. } => "/data/2.5/forecast/daily",
            Endpoint::ThreeHourForecast => "/data/2.5/forecast",
        }
    }

    pub fn host(&self) -> Host {
        match self {
            Endpoint::CurrentAirQuality
            | Endpoint::AirQualityForecast
            | Endpoint::AirQualityHistory { .. } => Host::Api,
            _ => Host::Pro,
        }
    }

    pub fn shape(&self) -> ResponseShape {
        match self {
            Endpoint::CurrentAirQuality
            | Endpoint::AirQualityForecast
            | Endpoint::AirQualityHistory { .. } => ResponseShape::AirQuality,
            Endpoint::CurrentWeather => ResponseShape::CurrentWeather,
            Endpoint::HourlyForecast => ResponseShape::Forecast(ForecastKind::Hourly),
            Endpoint::DailyForecast { .. } => ResponseShape::Forecast(ForecastKind::Daily),
            Endpoint::ThreeHourForecast => ResponseShape::Forecast(ForecastKind::ThreeHour),
        }
    }

    /// True for the air pollution series that may be subsampled by interval.
    ///
    /// The hourly weather forecast is always shown in full.
    pub fn is_hourly(&self) -> bool {
        matches!(
            self,
            Endpoint::AirQualityForecast | Endpoint::AirQualityHistory { .. }
        )
    }

    /// Query parameters for this endpoint at `coord`, without the API key.
    pub fn params(&self, coord: Coordinate) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("lat", coord.latitude.to_string()),
            ("lon", coord.longitude.to_string()),
        ];
        match self {
            Endpoint::CurrentAirQuality | Endpoint::AirQualityForecast => {},
            Endpoint::AirQualityHistory { start, end } => {
                params.push(("start", start.to_string()));
                params.push(("end", end.to_string()));
            },
            Endpoint::DailyForecast { count } => {
                params.push(("units", "metric".to_string()));
                params.push(("cnt", count.to_string()));
            },
            Endpoint::CurrentWeather | Endpoint::HourlyForecast | Endpoint::ThreeHourForecast => {
                params.push(("units", "metric".to_string()));
                params.push(("mode", "json".to_string()));
            },
        }
        params
    }
}
