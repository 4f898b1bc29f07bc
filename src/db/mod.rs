//! Provides database interaction functionalities.
//!
//! The only database is the read-only SQLite city directory in `cities`.

mod cities;

pub use cities::*;
