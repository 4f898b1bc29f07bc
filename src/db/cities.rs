//! Read-only city lookup database (SQLite via `sqlx`).
//!
//! Each region is a table with a single name column. The database is never
//! written to; it is only used to pick cities for batch collection.

use crate::error::{AppError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, error, info, warn};

/// A group of cities backed by one table, or the union of the continent tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Region {
    All,
    Asia,
    Africa,
    Europe,
    NorthAmerica,
    SouthAmerica,
    UsStates,
}

impl Region {
    pub const ALL: [Region; 7] = [
        Region::All,
        Region::Asia,
        Region::Africa,
        Region::Europe,
        Region::NorthAmerica,
        Region::SouthAmerica,
        Region::UsStates,
    ];

    /// Continent tables merged by [`Region::All`]. US states are not included.
    pub const CONTINENTS: [Region; 5] = [
        Region::Asia,
        Region::Africa,
        Region::Europe,
        Region::NorthAmerica,
        Region::SouthAmerica,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Region::All => "All",
            Region::Asia => "Asian Cities",
            Region::Africa => "African Cities",
            Region::Europe => "European Cities",
            Region::NorthAmerica => "North American Cities",
            Region::SouthAmerica => "South American Cities",
            Region::UsStates => "US States",
        }
    }

    /// `(table, column)` for a single-table region; `None` for [`Region::All`].
    pub fn source(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Region::All => None,
            Region::Asia => Some(("AsianCities", "cityName")),
            Region::Africa => Some(("AfricanCities", "cityName")),
            Region::Europe => Some(("EuropeanCities", "cityName")),
            Region::NorthAmerica => Some(("NorthAmericanCities", "cityName")),
            Region::SouthAmerica => Some(("SouthAmericanCities", "cityName")),
            Region::UsStates => Some(("USStates", "stateName")),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Text sent to the geocoder for a stored city name.
///
/// Stored names may carry a hyphenated suffix (`"Paris-France"`); only the part
/// before the first hyphen is used.
pub fn geocoder_query(name: &str) -> &str {
    name.split('-').next().unwrap_or(name).trim()
}

pub struct CityDirectory {
    pool: SqlitePool,
}

impl CityDirectory {
    /// Opens the city database read-only.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the URL is invalid or the file cannot be opened.
    pub async fn connect(database_url: &str) -> Result<Self> {
        info!("Opening city database {}", database_url);

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| {
                error!("Invalid city database URL {}: {}", database_url, e);
                AppError::from(e)
            })?
            .read_only(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| {
                error!("Failed to open city database: {}", e);
                AppError::from(e)
            })?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// City names for a region, in table order. Blank names are dropped.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if a backing table is missing or unreadable.
    pub async fn cities(&self, region: Region) -> Result<Vec<String>> {
        match region.source() {
            Some((table, column)) => self.table_names(table, column).await,
            None => {
                let mut all = Vec::new();
                for continent in Region::CONTINENTS {
                    if let Some((table, column)) = continent.source() {
                        all.extend(self.table_names(table, column).await?);
                    }
                }
                debug!("Region All: {} cities", all.len());
                Ok(all)
            },
        }
    }

    async fn table_names(&self, table: &str, column: &str) -> Result<Vec<String>> {
        // Identifiers come from the fixed `Region::source` table, never from input.
        let sql = format!("SELECT {} FROM {}", column, table);
        let names: Vec<Option<String>> = sqlx::query_scalar(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to read {}: {}", table, e);
                AppError::from(e)
            })?;

        Ok(names
            .into_iter()
            .flatten()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect())
    }

    async fn table_exists(&self, table: &str) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(table)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    /// Number of cities per region. Regions whose table is missing report zero.
    pub async fn region_sizes(&self) -> Result<Vec<(Region, usize)>> {
        let mut sizes = Vec::with_capacity(Region::ALL.len());
        let mut continent_total = 0;

        for region in Region::ALL.into_iter().filter(|r| *r != Region::All) {
            let Some((table, column)) = region.source() else {
                continue;
            };
            let size = if self.table_exists(table).await? {
                self.table_names(table, column).await?.len()
            } else {
                warn!("City table {} is missing", table);
                0
            };
            if Region::CONTINENTS.contains(&region) {
                continent_total += size;
            }
            sizes.push((region, size));
        }

        sizes.insert(0, (Region::All, continent_total));
        Ok(sizes)
    }
}
