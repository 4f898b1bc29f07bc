//! Interactive prompts (`dialoguer`).

use crate::db::Region;
use crate::error::Result;
use crate::models::Coordinate;
use crate::normalize::Interval;
use crate::output::default_export_name;
use crate::pipeline::Dataset;
use crate::session::DATE_INPUT_FORMAT;
use chrono::{DateTime, Utc};
use colored::*;
use dialoguer::{theme::ColorfulTheme, Confirm, FuzzySelect, Input, MultiSelect, Select};
use std::path::PathBuf;

/// What to do when a city cannot be geocoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    Manual,
    Skip,
}

fn ask_text(prompt: &str) -> Result<String> {
    Ok(Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?)
}

/// City name; blank means "use the current city".
pub fn prompt_city() -> Result<String> {
    ask_text("City name (leave empty for your current city)")
}

pub fn prompt_interval() -> Result<Interval> {
    let labels: Vec<&str> = Interval::ALL.iter().map(Interval::label).collect();
    let idx = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Sampling interval")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(Interval::ALL[idx])
}

/// Raw date text; blank keeps `default`.
pub fn prompt_date(what: &str, default: DateTime<Utc>) -> Result<String> {
    ask_text(&format!(
        "{} date (YYYY-MM-DD HH:MM:SS, empty for {})",
        what,
        default.format(DATE_INPUT_FORMAT)
    ))
}

pub fn prompt_export(dataset: Dataset) -> Result<Option<PathBuf>> {
    let export = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Export the table to CSV?")
        .default(false)
        .interact()?;
    if !export {
        return Ok(None);
    }

    let name: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("File name")
        .default(default_export_name(dataset))
        .interact_text()?;
    Ok(Some(PathBuf::from(name)))
}

pub fn prompt_dataset() -> Result<Dataset> {
    let titles: Vec<&str> = Dataset::ALL.iter().map(Dataset::title).collect();
    let idx = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Which dataset?")
        .items(&titles)
        .default(0)
        .interact()?;
    Ok(Dataset::ALL[idx])
}

pub fn prompt_region() -> Result<Region> {
    let labels: Vec<&str> = Region::ALL.iter().map(Region::label).collect();
    let idx = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Region")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(Region::ALL[idx])
}

/// Picks cities from `available`. Selecting none means all of them.
pub fn prompt_cities(available: &[String]) -> Result<Vec<String>> {
    let picked = MultiSelect::with_theme(&ColorfulTheme::default())
        .with_prompt("Cities (space to select, enter with none selected for all)")
        .items(available)
        .interact()?;
    if picked.is_empty() {
        return Ok(available.to_vec());
    }
    Ok(picked.into_iter().map(|i| available[i].clone()).collect())
}

/// One city picked with fuzzy search.
pub fn prompt_city_from(available: &[String]) -> Result<Option<String>> {
    let idx = FuzzySelect::with_theme(&ColorfulTheme::default())
        .with_prompt("City")
        .items(available)
        .interact_opt()?;
    Ok(idx.map(|i| available[i].clone()))
}

pub fn prompt_fallback(city: &str) -> Result<Fallback> {
    let options = ["Enter coordinates manually", "Skip"];
    let idx = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Could not locate '{}'", city))
        .items(&options)
        .default(0)
        .interact()?;
    Ok(if idx == 0 {
        Fallback::Manual
    } else {
        Fallback::Skip
    })
}

/// Asks for latitude/longitude until both parse and are in range.
pub fn prompt_coordinates() -> Result<Coordinate> {
    resolve_manual(ask_text)
}

/// Re-prompts through `ask` until a valid coordinate pair is entered.
///
/// Errors from `ask` itself (e.g. a closed terminal) end the loop.
pub fn resolve_manual<F>(mut ask: F) -> Result<Coordinate>
where
    F: FnMut(&str) -> Result<String>,
{
    loop {
        let latitude = ask("Latitude")?;
        let longitude = ask("Longitude")?;
        match Coordinate::parse(&latitude, &longitude) {
            Ok(coord) => return Ok(coord),
            Err(e) => println!("{} {}", "Invalid coordinates:".yellow(), e),
        }
    }
}
