//! Handles Command Line Interface (CLI) related functionalities.
//!
//! Includes the `clap` argument definitions, the interactive prompts, and the
//! `App` that runs commands against a single session.

mod commands;
pub mod prompts;

pub use commands::*;

use crate::db::Region;
use crate::normalize::Interval;
use crate::pipeline::Dataset;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Browse OpenWeatherMap weather and air quality data by city.
///
/// Runs an interactive menu when no subcommand is given.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// OpenWeatherMap API key (overrides OPENWEATHER_API_KEY)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Host for geocoding and air pollution requests
    #[arg(long, global = true)]
    pub geo_url: Option<String>,

    /// Host for weather and forecast requests
    #[arg(long, global = true)]
    pub pro_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Geocode a city and make it the session location (default: current city)
    Locate {
        city: Option<String>,
    },

    /// Fetch one dataset for one location and print it as a table
    Show(ShowArgs),

    /// Fetch one dataset for every city of a region
    Batch(BatchArgs),

    /// List city regions and how many cities each holds
    Regions,
}

/// Options shared by `show` and `batch`.
#[derive(Args, Debug, Clone, Default)]
pub struct QueryArgs {
    /// Sampling interval for air pollution datasets (default: daily)
    #[arg(short, long, value_enum)]
    pub interval: Option<Interval>,

    /// History start, "YYYY-MM-DD HH:MM:SS" UTC (default: one week ago)
    #[arg(long)]
    pub start: Option<String>,

    /// History end, "YYYY-MM-DD HH:MM:SS" UTC (default: now)
    #[arg(long)]
    pub end: Option<String>,

    /// Write the table to this CSV file
    #[arg(short, long)]
    pub export: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    #[arg(value_enum)]
    pub dataset: Dataset,

    /// City to geocode (default: session location, then current city)
    #[arg(short, long, conflicts_with_all = ["lat", "lon"])]
    pub city: Option<String>,

    /// Latitude in degrees, used instead of geocoding
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<String>,

    /// Longitude in degrees, used instead of geocoding
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<String>,

    #[command(flatten)]
    pub query: QueryArgs,
}

#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    #[arg(value_enum)]
    pub dataset: Dataset,

    /// Region whose cities are collected
    #[arg(short, long, value_enum, default_value = "all")]
    pub region: Region,

    /// Only these cities (comma separated); default is the whole region
    #[arg(long, value_delimiter = ',')]
    pub cities: Vec<String>,

    #[command(flatten)]
    pub query: QueryArgs,
}
