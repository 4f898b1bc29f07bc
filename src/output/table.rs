//! Flattens normalized records into a rectangular table.

use crate::models::{
    NormalizedAirQualityRecord, NormalizedForecastRecord, NormalizedWeatherSnapshot, Temperature,
};
use crate::pipeline::Records;
use comfy_table::presets::UTF8_FULL;
use comfy_table::ContentArrangement;
use rayon::prelude::*;

/// Column name -> cell text, in column order.
type Row = Vec<(String, String)>;

/// Header row plus string cells, one row per normalized record.
///
/// Nested mappings (pollutant components, weather features) become one column
/// per key; the column set is the union of keys across rows, in first-seen order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn from_records(records: &Records) -> Self {
        Self::from_rows(record_rows(records))
    }

    /// Batch table: every row is prefixed with a `City` column.
    pub fn from_city_records(batch: &[(String, Records)]) -> Self {
        let rows = batch
            .iter()
            .flat_map(|(city, records)| {
                record_rows(records).into_iter().map(move |row| {
                    let mut prefixed = Vec::with_capacity(row.len() + 1);
                    prefixed.push(("City".to_string(), city.clone()));
                    prefixed.extend(row);
                    prefixed
                })
            })
            .collect();
        Self::from_rows(rows)
    }

    fn from_rows(rows: Vec<Row>) -> Self {
        let mut headers: Vec<String> = Vec::new();
        for row in &rows {
            for (column, _) in row {
                if !headers.contains(column) {
                    headers.push(column.clone());
                }
            }
        }

        let rows = rows
            .into_iter()
            .map(|row| {
                headers
                    .iter()
                    .map(|h| {
                        row.iter()
                            .find(|(column, _)| column == h)
                            .map(|(_, value)| value.clone())
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect();

        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Terminal rendering via `comfy-table`.
    pub fn render(&self) -> comfy_table::Table {
        let mut table = comfy_table::Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(self.headers.clone());
        for row in &self.rows {
            table.add_row(row.clone());
        }
        table
    }
}

fn record_rows(records: &Records) -> Vec<Row> {
    match records {
        Records::AirQuality(rows) => rows.par_iter().map(air_quality_row).collect(),
        Records::Weather(snapshot) => vec![weather_row(snapshot)],
        Records::Forecast(_, rows) => rows.par_iter().map(forecast_row).collect(),
    }
}

fn air_quality_row(r: &NormalizedAirQualityRecord) -> Row {
    let mut row = vec![
        ("dateTime".to_string(), r.date_time.clone()),
        ("airQualityIndex".to_string(), r.air_quality_index.to_string()),
        (
            "airQualityDescription".to_string(),
            r.air_quality_description.to_string(),
        ),
    ];
    row.extend(r.components.iter().map(|(k, v)| (k.clone(), v.to_string())));
    row
}

fn weather_row(w: &NormalizedWeatherSnapshot) -> Row {
    let mut row = vec![
        ("name".to_string(), w.name.clone()),
        ("country".to_string(), w.country.clone()),
        ("condition".to_string(), w.condition.clone()),
    ];
    row.extend(w.main_features.iter().map(|(k, v)| (k.clone(), v.to_string())));
    row.push(("visibility".to_string(), w.visibility.to_string()));
    row.push(("windSpeed".to_string(), w.wind_speed.to_string()));
    row.push(("windDirection".to_string(), w.wind_direction.to_string()));
    row.push(("cloudiness".to_string(), w.cloudiness.to_string()));
    row
}

fn forecast_row(f: &NormalizedForecastRecord) -> Row {
    let mut row = vec![("dateTime".to_string(), f.date_time.clone())];
    match f.temperature {
        Temperature::Scalar(t) => {
            row.push((
                "temperature".to_string(),
                t.map(|t| t.to_string()).unwrap_or_default(),
            ));
        },
        Temperature::DayNight { day, night } => {
            row.push(("Day Temperature".to_string(), day.to_string()));
            row.push(("Night Temperature".to_string(), night.to_string()));
        },
    }
    row.push(("condition".to_string(), f.condition.clone()));
    row
}
