//! Provides a client for the OpenWeatherMap geocoding, weather and air pollution APIs.
//!
//! Every request carries the static API key as the `appId` query parameter.
//! Responses are returned as raw `serde_json::Value` payloads; decoding into
//! typed records is left to the normalization pipeline.

use super::endpoint::{Endpoint, Host};
use crate::error::{AppError, Result};
use crate::models::{Coordinate, GeoLocation, Place};
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

pub const API_BASE_URL: &str = "http://api.openweathermap.org";
pub const PRO_BASE_URL: &str = "http://pro.openweathermap.org";
const GEOCODE_PATH: &str = "/geo/1.0/direct";

/// An asynchronous client for fetching data from OpenWeatherMap.
///
/// Identical requests (same URL and query) within one process are answered from
/// an in-memory map instead of being sent again.
pub struct OpenWeatherClient {
    client: Client,
    api_key: String,
    api_base_url: String,
    pro_base_url: String,
    memo: Mutex<HashMap<String, Value>>,
}

impl OpenWeatherClient {
    /// Creates a new `OpenWeatherClient` against the public OpenWeatherMap hosts.
    pub fn new(api_key: String) -> Self {
        Self::with_base_urls(api_key, API_BASE_URL, PRO_BASE_URL)
    }

    /// Creates a client with custom hosts (configuration overrides, mock servers).
    pub fn with_base_urls(api_key: String, api_base_url: &str, pro_base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            pro_base_url: pro_base_url.trim_end_matches('/').to_string(),
            memo: Mutex::new(HashMap::new()),
        }
    }

    fn base_url(&self, host: Host) -> &str {
        match host {
            Host::Api => &self.api_base_url,
            Host::Pro => &self.pro_base_url,
        }
    }

    /// Issues one GET and decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// - `AppError::Network` if the request cannot complete.
    /// - `AppError::Upstream` for a non-success status.
    /// - `AppError::JsonParse` if the body is not valid JSON.
    async fn get_json(&self, host: Host, path: &str, params: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url(host), path);

        let mut query: Vec<(&str, String)> = Vec::with_capacity(params.len() + 1);
        query.push(("appId", self.api_key.clone()));
        query.extend(params.iter().cloned());

        let memo_key = memo_key(&url, &query);
        if let Some(hit) = self.memo.lock().ok().and_then(|m| m.get(&memo_key).cloned()) {
            debug!("Answering {} {:?} from session memo", path, params);
            return Ok(hit);
        }

        debug!("GET {} {:?}", url, params);
        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                error!("Error requesting {}: {}", path, e);
                AppError::Network(Arc::new(e))
            })?;

        // Check HTTP status code and handle API errors
        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                let status = e.status().unwrap_or_default();
                error!("API request to {} failed with status {}", path, status);
                if status == reqwest::StatusCode::UNAUTHORIZED {
                    error!("Received 401 Unauthorized. Check OPENWEATHER_API_KEY and its subscription plan.");
                }
                return Err(AppError::Upstream {
                    status: status.as_u16(),
                    url: path.to_string(),
                });
            },
        };

        let body = response.bytes().await.map_err(|e| {
            error!("Error reading response body from {}: {}", path, e);
            AppError::Network(Arc::new(e))
        })?;

        let value: Value = serde_json::from_slice(&body).map_err(|e| {
            error!("Error parsing JSON from {}: {}", path, e);
            AppError::JsonParse(Arc::new(e))
        })?;

        if let Ok(mut memo) = self.memo.lock() {
            memo.insert(memo_key, value.clone());
        }
        Ok(value)
    }

    /// Looks a city name up via `/geo/1.0/direct` (at most one match).
    pub async fn geocode(&self, city: &str) -> Result<Vec<GeoLocation>> {
        let value = self
            .get_json(
                Host::Api,
                GEOCODE_PATH,
                &[("q", city.to_string()), ("limit", "1".to_string())],
            )
            .await?;

        serde_json::from_value::<Vec<GeoLocation>>(value).map_err(|e| {
            error!("Unexpected geocoding payload for {}: {}", city, e);
            AppError::MissingData(format!("geocoding result for '{}': {}", city, e))
        })
    }

    /// Resolves a city name to a place, or `None` if it cannot be resolved.
    ///
    /// Makes exactly one attempt. Empty results, network failures, malformed
    /// payloads and out-of-range coordinates are logged and reported as `None`;
    /// the caller decides whether to fall back to manual entry.
    pub async fn resolve(&self, city: &str) -> Option<Place> {
        let locations = match self.geocode(city).await {
            Ok(locations) => locations,
            Err(e) => {
                warn!("Geocoding failed for {}: {}", city, e);
                return None;
            },
        };

        let Some(first) = locations.into_iter().next() else {
            warn!("No geocoding match for {}", city);
            return None;
        };

        match Place::try_from(first) {
            Ok(place) => {
                info!("Resolved {} to {}", city, place);
                Some(place)
            },
            Err(e) => {
                warn!("Geocoding returned unusable coordinates for {}: {}", city, e);
                None
            },
        }
    }

    /// Fetches the raw payload of a data endpoint for `coord`.
    pub async fn fetch(&self, endpoint: Endpoint, coord: Coordinate) -> Result<Value> {
        info!("Fetching {} for {}", endpoint.path(), coord);
        self.get_json(endpoint.host(), endpoint.path(), &endpoint.params(coord))
            .await
    }
}

fn memo_key(url: &str, query: &[(&str, String)]) -> String {
    let mut pairs: Vec<String> = query.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    pairs.sort();
    format!("{}?{}", url, pairs.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memo_key_ignores_parameter_order() {
        let a = memo_key(
            "http://x/data",
            &[("lat", "1".into()), ("lon", "2".into())],
        );
        let b = memo_key(
            "http://x/data",
            &[("lon", "2".into()), ("lat", "1".into())],
        );
        assert_eq!(a, b);
    }

    #[test]
    fn base_urls_are_trimmed() {
        let client = OpenWeatherClient::with_base_urls("k".into(), "http://a/", "http://b//");
        assert_eq!(client.base_url(Host::Api), "http://a");
        assert_eq!(client.base_url(Host::Pro), "http://b");
    }
}
