//! Provides clients and utilities for interacting with external APIs.
//!
//! Includes:
//! - `endpoint`: typed descriptors of the OpenWeatherMap endpoints.
//! - `openweather`: HTTP client, geocoder and raw fetchers.
//! - `iplocate`: current-city lookup used when no city is entered.

mod endpoint;
mod iplocate;
mod openweather;

pub use endpoint::*;
pub use iplocate::*;
pub use openweather::*;
