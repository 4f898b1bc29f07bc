use crate::error::{AppError, Result};
use crate::models::{NormalizedWeatherSnapshot, RawCondition, RawWeatherSnapshot};

/// Human-readable label for a key of the current-weather `main` block.
///
/// Keys without a label (e.g. `sea_level`) are returned unchanged.
pub fn weather_feature_label(key: &str) -> &str {
    match key {
        "temp" => "Temperature (°C)",
        "feels_like" => "Feels Like (°C)",
        "temp_min" => "Min Temperature (°C)",
        "temp_max" => "Max Temperature (°C)",
        "pressure" => "Pressure (hPa)",
        "humidity" => "Humidity (%)",
        other => other,
    }
}

/// Joins a primary condition and its description as "Main - description".
///
/// The separator is always present, even if either side is empty.
pub fn condition_text(condition: &RawCondition) -> String {
    format!("{} - {}", condition.main, condition.description)
}

/// Condition text of the first descriptor, or `" - "` when the list is empty.
pub(crate) fn first_condition_text(conditions: &[RawCondition]) -> String {
    conditions
        .first()
        .map(condition_text)
        .unwrap_or_else(|| condition_text(&RawCondition::default()))
}

/// Flattens a current-weather payload.
///
/// # Errors
///
/// Returns `AppError::MissingData` if the payload carries no condition
/// descriptor. All other required fields are enforced when decoding
/// `RawWeatherSnapshot`.
pub fn normalize_current_weather(raw: &RawWeatherSnapshot) -> Result<NormalizedWeatherSnapshot> {
    let primary = raw.weather.first().ok_or_else(|| {
        AppError::MissingData(format!("no weather condition reported for {}", raw.name))
    })?;

    let main_features = raw
        .main
        .iter()
        .map(|(key, value)| (weather_feature_label(key).to_string(), *value))
        .collect();

    Ok(NormalizedWeatherSnapshot {
        name: raw.name.clone(),
        country: raw.sys.country.clone(),
        condition: condition_text(primary),
        main_features,
        visibility: raw.visibility,
        wind_speed: raw.wind.speed,
        wind_direction: raw.wind.deg,
        cloudiness: raw.clouds.all,
    })
}
