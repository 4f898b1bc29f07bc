//! CSV export of a flattened table.

use super::Table;
use crate::error::Result;
use crate::pipeline::Dataset;
use std::io;
use std::path::Path;
use tracing::info;

/// Default file name for an export, e.g. `Air Pollution History_data.csv`.
pub fn default_export_name(dataset: Dataset) -> String {
    format!("{}_data.csv", dataset.title())
}

/// Writes the header row and every data row.
pub fn write_csv<W: io::Write>(table: &Table, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes `table` to a CSV file at `path`, replacing any existing file.
pub fn export_csv(table: &Table, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv(table, file)?;
    info!("Exported {} row(s) to {}", table.rows.len(), path.display());
    Ok(())
}
