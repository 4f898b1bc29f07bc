//! The generic fetch-and-normalize pipeline.
//!
//! A [`Dataset`] selected by the operator is turned into an [`Endpoint`] using
//! the session context, fetched once, subsampled if the endpoint is hourly, and
//! normalized according to the endpoint's [`ResponseShape`].

use crate::api::{Endpoint, OpenWeatherClient, ResponseShape};
use crate::error::{AppError, Result};
use crate::models::{
    AirQualityResponse, Coordinate, ForecastKind, ForecastResponse, NormalizedAirQualityRecord,
    NormalizedForecastRecord, NormalizedWeatherSnapshot, RawDailyForecastRecord,
    RawForecastRecord, RawWeatherSnapshot,
};
use crate::normalize::{
    air_quality_records, normalize_air_quality, normalize_current_weather,
    normalize_daily_forecast, normalize_forecast, sample, Interval,
};
use crate::session::Session;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use tracing::{debug, info};

/// The datasets an operator can browse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Dataset {
    AirQuality,
    AirQualityForecast,
    AirQualityHistory,
    Weather,
    HourlyForecast,
    DailyForecast,
    ThreeHourForecast,
}

impl Dataset {
    pub const ALL: [Dataset; 7] = [
        Dataset::AirQuality,
        Dataset::AirQualityForecast,
        Dataset::AirQualityHistory,
        Dataset::Weather,
        Dataset::HourlyForecast,
        Dataset::DailyForecast,
        Dataset::ThreeHourForecast,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Dataset::AirQuality => "Current Air Pollution",
            Dataset::AirQualityForecast => "Air Pollution Forecast",
            Dataset::AirQualityHistory => "Air Pollution History",
            Dataset::Weather => "Current Weather Condition",
            Dataset::HourlyForecast => "Hourly Weather Forecast",
            Dataset::DailyForecast => "Daily Weather Forecast",
            Dataset::ThreeHourForecast => "FiveDays-ThreeHours Weather Forecast",
        }
    }

    /// True if the operator may choose an [`Interval`] for this dataset.
    pub fn is_sampled(&self) -> bool {
        matches!(
            self,
            Dataset::AirQualityForecast | Dataset::AirQualityHistory
        )
    }

    /// Builds the endpoint descriptor, pulling the time range and day count from the session.
    pub fn endpoint(&self, session: &Session) -> Endpoint {
        match self {
            Dataset::AirQuality => Endpoint::CurrentAirQuality,
            Dataset::AirQualityForecast => Endpoint::AirQualityForecast,
            Dataset::AirQualityHistory => Endpoint::AirQualityHistory {
                start: session.range.start.timestamp(),
                end: session.range.end.timestamp(),
            },
            Dataset::Weather => Endpoint::CurrentWeather,
            Dataset::HourlyForecast => Endpoint::HourlyForecast,
            Dataset::DailyForecast => Endpoint::DailyForecast {
                count: session.daily_count,
            },
            Dataset::ThreeHourForecast => Endpoint::ThreeHourForecast,
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Normalized output of one fetch, tagged by response shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Records {
    AirQuality(Vec<NormalizedAirQualityRecord>),
    Weather(Box<NormalizedWeatherSnapshot>),
    Forecast(ForecastKind, Vec<NormalizedForecastRecord>),
}

impl Records {
    pub fn len(&self) -> usize {
        match self {
            Records::AirQuality(r) => r.len(),
            Records::Weather(_) => 1,
            Records::Forecast(_, r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn decode<T: DeserializeOwned>(payload: Value, what: &str) -> Result<T> {
    serde_json::from_value(payload)
        .map_err(|e| AppError::MissingData(format!("{} payload: {}", what, e)))
}

/// Decodes, subsamples and normalizes a raw payload.
///
/// `interval` is applied positionally to the record list before normalization;
/// pass [`Interval::Hourly`] to keep every record.
///
/// # Errors
///
/// Returns `AppError::MissingData` when the payload does not have the fields the
/// shape requires. A payload that is `null` or lacks `list` is not an error for
/// list-shaped data: it yields empty records.
pub fn normalize_payload(shape: ResponseShape, payload: Value, interval: Interval) -> Result<Records> {
    match shape {
        ResponseShape::AirQuality => {
            let parsed: Option<AirQualityResponse> = decode(payload, "air pollution")?;
            let records = sample(air_quality_records(parsed), interval);
            Ok(Records::AirQuality(normalize_air_quality(&records)))
        },
        ResponseShape::CurrentWeather => {
            let raw: RawWeatherSnapshot = decode(payload, "current weather")?;
            Ok(Records::Weather(Box::new(normalize_current_weather(&raw)?)))
        },
        ResponseShape::Forecast(ForecastKind::Daily) => {
            let parsed: Option<ForecastResponse<RawDailyForecastRecord>> =
                decode(payload, "daily forecast")?;
            let records = sample(parsed.and_then(|p| p.list).unwrap_or_default(), interval);
            Ok(Records::Forecast(
                ForecastKind::Daily,
                normalize_daily_forecast(&records),
            ))
        },
        ResponseShape::Forecast(kind) => {
            let parsed: Option<ForecastResponse<RawForecastRecord>> =
                decode(payload, "forecast")?;
            let records = sample(parsed.and_then(|p| p.list).unwrap_or_default(), interval);
            Ok(Records::Forecast(kind, normalize_forecast(&records)))
        },
    }
}

/// Fetches one dataset for `coord` and normalizes it.
///
/// The session interval only applies to hourly endpoints; every other endpoint
/// is normalized in full.
pub async fn fetch_records(
    client: &OpenWeatherClient,
    session: &Session,
    dataset: Dataset,
    coord: Coordinate,
) -> Result<Records> {
    let endpoint = dataset.endpoint(session);
    let interval = if endpoint.is_hourly() {
        session.interval
    } else {
        Interval::Hourly
    };

    let payload = client.fetch(endpoint, coord).await?;
    debug!("Normalizing {} payload at {} interval", dataset, interval);
    let records = normalize_payload(endpoint.shape(), payload, interval)?;
    info!("{}: {} record(s) for {}", dataset, records.len(), coord);
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AqiCategory, Temperature};
    use serde_json::json;

    fn hourly_air_quality(hours: i64) -> Value {
        let list: Vec<Value> = (0..hours)
            .map(|h| {
                json!({
                    "main": {"aqi": 2},
                    "components": {"co": 200.0 + h as f64, "pm10": 3.5},
                    "dt": 1_606_176_000 + h * 3600
                })
            })
            .collect();
        json!({"coord": {"lon": 50.0, "lat": 50.0}, "list": list})
    }

    #[test]
    fn air_quality_payload_is_sampled_then_normalized() {
        let records =
            normalize_payload(ResponseShape::AirQuality, hourly_air_quality(48), Interval::Daily)
                .unwrap();
        let Records::AirQuality(rows) = records else {
            panic!("expected air quality records");
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date_time, "2020-11-24 00:00:00");
        assert_eq!(rows[1].date_time, "2020-11-25 00:00:00");
        assert_eq!(rows[1].components["Carbon Monoxide (CO)"], 224.0);
        assert_eq!(rows[0].air_quality_description, AqiCategory::Fair);
    }

    #[test]
    fn null_or_listless_air_quality_payload_is_empty() {
        let from_null =
            normalize_payload(ResponseShape::AirQuality, Value::Null, Interval::Hourly).unwrap();
        assert!(from_null.is_empty());
        let listless = normalize_payload(
            ResponseShape::AirQuality,
            json!({"coord": {}}),
            Interval::Hourly,
        )
        .unwrap();
        assert!(listless.is_empty());
    }

    #[test]
    fn weather_payload_missing_fields_is_missing_data() {
        let err = normalize_payload(
            ResponseShape::CurrentWeather,
            json!({"name": "Paris", "weather": []}),
            Interval::Hourly,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::MissingData(_)));
    }

    #[test]
    fn daily_forecast_payload_keeps_day_night_pairs() {
        let payload = json!({
            "city": {"name": "Oslo"},
            "cnt": 2,
            "list": [
                {"dt": 1_606_219_200, "temp": {"day": 3.1, "night": -1.2, "min": -2.0},
                 "weather": [{"main": "Snow", "description": "snow"}]},
                {"dt": 1_606_305_600, "temp": {"day": 4.0, "night": 0.5},
                 "weather": [{"main": "Clouds", "description": "overcast clouds"}]}
            ]
        });
        let records = normalize_payload(
            ResponseShape::Forecast(ForecastKind::Daily),
            payload,
            Interval::Hourly,
        )
        .unwrap();
        let Records::Forecast(kind, rows) = records else {
            panic!("expected forecast records");
        };
        assert_eq!(kind, ForecastKind::Daily);
        assert_eq!(rows[0].date_time, "2020-11-24");
        assert_eq!(
            rows[0].temperature,
            Temperature::DayNight {
                day: 3.1,
                night: -1.2
            }
        );
        assert_eq!(rows[1].condition, "Clouds - overcast clouds");
    }

    #[test]
    fn three_hour_forecast_payload_uses_text_timestamps() {
        let payload = json!({
            "cod": "200",
            "list": [
                {"dt": 1_606_230_000, "dt_txt": "2020-11-24 15:00:00",
                 "main": {"temp": 11.2, "humidity": 70},
                 "weather": [{"main": "Rain", "description": "light rain"}]}
            ]
        });
        let records = normalize_payload(
            ResponseShape::Forecast(ForecastKind::ThreeHour),
            payload,
            Interval::Hourly,
        )
        .unwrap();
        assert_eq!(
            records,
            Records::Forecast(
                ForecastKind::ThreeHour,
                vec![NormalizedForecastRecord {
                    date_time: "2020-11-24 15:00:00".into(),
                    temperature: Temperature::Scalar(Some(11.2)),
                    condition: "Rain - light rain".into(),
                }]
            )
        );
    }

    #[test]
    fn history_endpoint_uses_session_range() {
        let session = Session::default();
        let endpoint = Dataset::AirQualityHistory.endpoint(&session);
        assert_eq!(
            endpoint,
            Endpoint::AirQualityHistory {
                start: session.range.start.timestamp(),
                end: session.range.end.timestamp(),
            }
        );
    }

    #[tokio::test]
    async fn hourly_forecast_keeps_every_record() {
        let mut server = mockito::Server::new_async().await;
        let list: Vec<Value> = (0..96)
            .map(|h| {
                json!({
                    "dt": 1_606_176_000 + h * 3600,
                    "main": {"temp": 5.0 + h as f64 / 10.0},
                    "weather": [{"main": "Clear", "description": "clear sky"}]
                })
            })
            .collect();
        let _m = server
            .mock("GET", "/data/2.5/forecast/hourly")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(json!({"cnt": 96, "list": list}).to_string())
            .create_async()
            .await;

        let client = OpenWeatherClient::with_base_urls("k".into(), &server.url(), &server.url());
        let session = Session::default();
        assert_eq!(session.interval, Interval::Daily);

        let coord = Coordinate::new(35.6892, 51.389).unwrap();
        let records = fetch_records(&client, &session, Dataset::HourlyForecast, coord)
            .await
            .unwrap();
        assert_eq!(records.len(), 96);
    }

    #[test]
    fn only_hourly_datasets_offer_intervals() {
        let sampled: Vec<Dataset> = Dataset::ALL.into_iter().filter(Dataset::is_sampled).collect();
        assert_eq!(
            sampled,
            vec![Dataset::AirQualityForecast, Dataset::AirQualityHistory]
        );
        for dataset in Dataset::ALL {
            assert_eq!(dataset.is_sampled(), dataset.endpoint(&Session::default()).is_hourly());
        }
    }
}
