//! Best-effort lookup of the operator's current city from their public IP address.

use crate::error::{AppError, Result};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

pub const IP_API_URL: &str = "http://ip-api.com/json/";

/// City used when the IP lookup yields nothing.
pub const FALLBACK_CITY: &str = "Tehran";

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    city: Option<String>,
}

pub struct IpLocator {
    client: Client,
    url: String,
}

impl IpLocator {
    pub fn new() -> Self {
        Self::with_url(IP_API_URL)
    }

    pub fn with_url(url: &str) -> Self {
        Self {
            client: Client::new(),
            url: url.to_string(),
        }
    }

    /// The city ip-api.com associates with this machine, if any.
    pub async fn current_city(&self) -> Result<Option<String>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AppError::Network(Arc::new(e)))?
            .error_for_status()?;

        let body: IpApiResponse = response.json().await?;
        Ok(body
            .city
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()))
    }

    /// The current city, or [`FALLBACK_CITY`] on any failure.
    pub async fn default_city(&self) -> String {
        match self.current_city().await {
            Ok(Some(city)) => {
                info!("Detected current city: {}", city);
                city
            },
            Ok(None) => {
                info!("IP lookup returned no city, using {}", FALLBACK_CITY);
                FALLBACK_CITY.to_string()
            },
            Err(e) => {
                warn!("Error fetching location: {}. Using {}", e, FALLBACK_CITY);
                FALLBACK_CITY.to_string()
            },
        }
    }
}

impl Default for IpLocator {
    fn default() -> Self {
        Self::new()
    }
}
