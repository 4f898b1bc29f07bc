//! Defines the data structures and models used throughout the application.
//!
//! Covers payloads decoded from the OpenWeatherMap API, the flat records produced
//! by the normalizer, and the location types the session carries between requests.

mod location;
mod openweather;

pub use location::*;
pub use openweather::*;
