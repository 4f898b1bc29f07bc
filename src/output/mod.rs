//! Presentation of normalized records: terminal tables and CSV export.

mod export;
mod table;

pub use export::*;
pub use table::*;
