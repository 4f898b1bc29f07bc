//! Runtime configuration read from the environment (and `.env` via `dotenv`).

use crate::api::{API_BASE_URL, PRO_BASE_URL};
use crate::error::{AppError, Result};
use crate::session::DEFAULT_DAILY_COUNT;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const API_KEY_VAR: &str = "OPENWEATHER_API_KEY";
pub const GEO_URL_VAR: &str = "OPENWEATHER_GEO_URL";
pub const PRO_URL_VAR: &str = "OPENWEATHER_PRO_URL";
pub const CITIES_DB_VAR: &str = "CITIES_DATABASE_URL";
pub const LOG_DIR_VAR: &str = "WEATHERWISE_LOG_DIR";
pub const LOG_FORMAT_VAR: &str = "WEATHERWISE_LOG_FORMAT";
pub const DAILY_COUNT_VAR: &str = "WEATHERWISE_DAILY_COUNT";

pub const DEFAULT_CITIES_DATABASE_URL: &str = "sqlite://cities.db";

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(AppError::InvalidInput(format!(
                "{}: unknown log format '{}' (expected text or json)",
                LOG_FORMAT_VAR, other
            ))),
        }
    }
}

/// Logging settings. Read separately so logging can start before the API key is checked.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LogSettings {
    pub dir: Option<PathBuf>,
    pub format: LogFormat,
}

impl LogSettings {
    pub fn from_env() -> Result<Self> {
        let dir = optional_var(LOG_DIR_VAR).map(PathBuf::from);
        let format = match optional_var(LOG_FORMAT_VAR) {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        };
        Ok(Self { dir, format })
    }
}

/// Everything the application needs to talk to OpenWeatherMap and the city database.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_key: String,
    pub geo_url: String,
    pub pro_url: String,
    pub cities_database_url: String,
    pub daily_count: u8,
}

impl Settings {
    /// Reads settings from the environment.
    ///
    /// `api_key` takes precedence over `OPENWEATHER_API_KEY` when given.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Env` if no API key is available, or
    /// `AppError::InvalidInput` if the daily count is not in `1..=16`.
    pub fn from_env(api_key: Option<String>) -> Result<Self> {
        let api_key = match api_key.filter(|k| !k.trim().is_empty()) {
            Some(key) => key,
            None => env::var(API_KEY_VAR)?,
        };

        let daily_count = match optional_var(DAILY_COUNT_VAR) {
            Some(raw) => parse_daily_count(&raw)?,
            None => DEFAULT_DAILY_COUNT,
        };

        Ok(Self {
            api_key,
            geo_url: optional_var(GEO_URL_VAR).unwrap_or_else(|| API_BASE_URL.to_string()),
            pro_url: optional_var(PRO_URL_VAR).unwrap_or_else(|| PRO_BASE_URL.to_string()),
            cities_database_url: optional_var(CITIES_DB_VAR)
                .unwrap_or_else(|| DEFAULT_CITIES_DATABASE_URL.to_string()),
            daily_count,
        })
    }

    /// Applies command-line host overrides.
    pub fn with_hosts(mut self, geo_url: Option<String>, pro_url: Option<String>) -> Self {
        if let Some(url) = geo_url {
            self.geo_url = url;
        }
        if let Some(url) = pro_url {
            self.pro_url = url;
        }
        self
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_daily_count(raw: &str) -> Result<u8> {
    match raw.trim().parse::<u8>() {
        Ok(n) if (1..=DEFAULT_DAILY_COUNT).contains(&n) => Ok(n),
        _ => Err(AppError::InvalidInput(format!(
            "{} must be between 1 and {}, got '{}'",
            DAILY_COUNT_VAR, DEFAULT_DAILY_COUNT, raw
        ))),
    }
}
