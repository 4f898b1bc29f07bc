use super::prompts::{self, Fallback};
use super::{BatchArgs, Commands, QueryArgs, ShowArgs};
use crate::api::{IpLocator, OpenWeatherClient};
use crate::config::Settings;
use crate::db::{geocoder_query, CityDirectory};
use crate::error::{AppError, Result};
use crate::models::{Coordinate, Place};
use crate::output::{export_csv, Table};
use crate::pipeline::{fetch_records, Dataset, Records};
use crate::session::{parse_date_input, Session, TimeRange, DATE_INPUT_FORMAT};
use chrono::{DateTime, Utc};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Display;
use std::path::Path;
use tracing::{error, info, warn};

/// Name given to a place whose coordinates were passed on the command line.
pub const MANUAL_PLACE_NAME: &str = "Manual Location";

/// CLI application: API clients plus the one session every command reads and updates.
pub struct App {
    client: OpenWeatherClient,
    locator: IpLocator,
    settings: Settings,
    session: Session,
    interactive: bool,
}

impl App {
    /// Creates the application from loaded settings.
    ///
    /// `interactive` enables prompts (manual coordinates, city selection); without
    /// it, anything that would need a prompt is skipped or reported instead.
    pub fn new(settings: Settings, interactive: bool) -> Self {
        let client = OpenWeatherClient::with_base_urls(
            settings.api_key.clone(),
            &settings.geo_url,
            &settings.pro_url,
        );
        Self::with_clients(settings, client, IpLocator::new(), interactive)
    }

    pub fn with_clients(
        settings: Settings,
        client: OpenWeatherClient,
        locator: IpLocator,
        interactive: bool,
    ) -> Self {
        let session = Session::new(settings.daily_count);
        Self {
            client,
            locator,
            settings,
            session,
            interactive,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run one command
    pub async fn run_command(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Locate { city } => {
                if self.locate(city.as_deref()).await?.is_none() && !self.interactive {
                    return Err(AppError::Cli(
                        "location could not be resolved; use `show --lat --lon` instead".into(),
                    ));
                }
            },
            Commands::Show(args) => self.show(args).await?,
            Commands::Batch(args) => self.batch(args).await?,
            Commands::Regions => self.list_regions().await?,
        }

        Ok(())
    }

    /// Geocodes `city` (blank or `None` means the current city) and makes it the session place.
    ///
    /// Returns `None` when the city could not be resolved and no manual
    /// coordinates were given.
    pub async fn locate(&mut self, city: Option<&str>) -> Result<Option<Place>> {
        let city = match city.map(str::trim).filter(|c| !c.is_empty()) {
            Some(city) => city.to_string(),
            None => self.locator.default_city().await,
        };

        let place = match self.client.resolve(&city).await {
            Some(place) => Some(place),
            None => self.fallback_place(&city)?,
        };

        match &place {
            Some(place) => {
                println!("{} {}", "Location:".green().bold(), place);
                self.session.set_place(place.clone());
            },
            None => println!("{} could not locate '{}'", "Warning:".yellow().bold(), city),
        }
        Ok(place)
    }

    /// Uses a manually entered coordinate for the rest of the session.
    pub fn set_coordinates(&mut self, coordinate: Coordinate) -> Place {
        let place = Place::manual(MANUAL_PLACE_NAME, coordinate);
        println!("{} {}", "Location:".green().bold(), place);
        self.session.set_place(place.clone());
        place
    }

    /// Manual entry or skip for a city the geocoder could not resolve.
    fn fallback_place(&self, city: &str) -> Result<Option<Place>> {
        if !self.interactive {
            return Ok(None);
        }
        match prompts::prompt_fallback(city)? {
            Fallback::Manual => {
                let coordinate = prompts::prompt_coordinates()?;
                Ok(Some(Place::manual(city, coordinate)))
            },
            Fallback::Skip => Ok(None),
        }
    }

    async fn target_place(&mut self, args: &ShowArgs) -> Result<Option<Place>> {
        if let (Some(lat), Some(lon)) = (&args.lat, &args.lon) {
            let coordinate = Coordinate::parse(lat, lon)?;
            return Ok(Some(self.set_coordinates(coordinate)));
        }
        if let Some(city) = &args.city {
            return self.locate(Some(city.as_str())).await;
        }
        if let Some(place) = &self.session.place {
            return Ok(Some(place.clone()));
        }
        self.locate(None).await
    }

    /// Applies interval and history range options to the session.
    fn apply_query(&mut self, dataset: Dataset, query: &QueryArgs) -> Result<()> {
        if let Some(interval) = query.interval {
            self.session.interval = interval;
        }
        if dataset == Dataset::AirQualityHistory {
            self.session.range = range_from_input(
                query.start.as_deref().unwrap_or_default(),
                query.end.as_deref().unwrap_or_default(),
                Utc::now(),
            )?;
        }
        Ok(())
    }

    /// Fetch one dataset for one place, print it, optionally export it
    pub async fn show(&mut self, args: ShowArgs) -> Result<()> {
        let Some(place) = self.target_place(&args).await? else {
            return Ok(());
        };
        self.apply_query(args.dataset, &args.query)?;

        println!("{} {} for {}", "Fetching".cyan(), args.dataset, place);
        let records = match fetch_records(&self.client, &self.session, args.dataset, place.coordinate)
            .await
        {
            Ok(records) => records,
            Err(e) if e.is_no_data() => {
                warn_no_data(args.dataset, &place.name, &e);
                return Ok(());
            },
            Err(e) => return Err(e),
        };

        let table = Table::from_records(&records);
        if table.is_empty() {
            warn_no_data(args.dataset, &place.name, &"empty response");
            return Ok(());
        }

        println!("{}", table.render());
        if let Some(path) = &args.query.export {
            export_table(&table, path)?;
        }
        Ok(())
    }

    /// Run one dataset for many cities and merge the results into one table
    pub async fn batch(&mut self, args: BatchArgs) -> Result<()> {
        let cities = if args.cities.is_empty() {
            let directory = CityDirectory::connect(&self.settings.cities_database_url).await?;
            let available = directory.cities(args.region).await?;
            if self.interactive && !available.is_empty() {
                prompts::prompt_cities(&available)?
            } else {
                available
            }
        } else {
            args.cities.clone()
        };

        if cities.is_empty() {
            println!(
                "{} no cities found for {}",
                "Warning:".yellow().bold(),
                args.region
            );
            return Ok(());
        }
        self.apply_query(args.dataset, &args.query)?;

        info!("Collecting {} for {} cities", args.dataset, cities.len());
        let pb = ProgressBar::new(cities.len() as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            )?
            .progress_chars("#>-"),
        );

        let mut collected: Vec<(String, Records)> = Vec::new();
        let mut skipped: Vec<String> = Vec::new();

        for city in &cities {
            pb.set_message(city.clone());
            let query = geocoder_query(city);

            let place = match self.client.resolve(query).await {
                Some(place) => Some(place),
                None => pb.suspend(|| self.fallback_place(query))?,
            };
            let Some(place) = place else {
                pb.println(format!("{} could not locate {}, skipping", "Warning:".yellow(), city));
                skipped.push(city.clone());
                pb.inc(1);
                continue;
            };

            match fetch_records(&self.client, &self.session, args.dataset, place.coordinate).await {
                Ok(records) if !records.is_empty() => collected.push((city.clone(), records)),
                Ok(_) => {
                    pb.println(format!("{} no data for {}", "Warning:".yellow(), city));
                    skipped.push(city.clone());
                },
                Err(e) if e.is_no_data() => {
                    warn!("No {} for {}: {}", args.dataset, city, e);
                    pb.println(format!("{} no data for {}: {}", "Warning:".yellow(), city, e));
                    skipped.push(city.clone());
                },
                Err(e) => {
                    error!("Batch aborted at {}: {}", city, e);
                    pb.abandon();
                    return Err(e);
                },
            }
            pb.inc(1);
        }
        pb.finish_with_message("done");

        if !skipped.is_empty() {
            println!(
                "{} skipped {} of {} cities: {}",
                "Note:".yellow(),
                skipped.len(),
                cities.len(),
                skipped.join(", ")
            );
        }

        let table = Table::from_city_records(&collected);
        if table.is_empty() {
            warn_no_data(args.dataset, args.region.label(), &"no city returned data");
            return Ok(());
        }

        println!("{}", table.render());
        if let Some(path) = &args.query.export {
            export_table(&table, path)?;
        }
        Ok(())
    }

    /// City names stored for a region, for interactive pickers.
    pub async fn region_cities(&self, region: crate::db::Region) -> Result<Vec<String>> {
        CityDirectory::connect(&self.settings.cities_database_url)
            .await?
            .cities(region)
            .await
    }

    async fn list_regions(&self) -> Result<()> {
        let directory = CityDirectory::connect(&self.settings.cities_database_url).await?;
        let sizes = directory.region_sizes().await?;

        let table = Table {
            headers: vec!["Region".to_string(), "Cities".to_string()],
            rows: sizes
                .into_iter()
                .map(|(region, size)| vec![region.label().to_string(), size.to_string()])
                .collect(),
        };
        println!("{}", table.render());
        Ok(())
    }
}

fn export_table(table: &Table, path: &Path) -> Result<()> {
    export_csv(table, path)?;
    println!(
        "{} {}",
        "Data exported to".green(),
        path.display().to_string().green().bold()
    );
    Ok(())
}

fn warn_no_data(dataset: Dataset, place: &str, reason: &dyn Display) {
    warn!("No {} data for {}: {}", dataset, place, reason);
    println!(
        "{} No {} data available for {} ({})",
        "Warning:".yellow().bold(),
        dataset,
        place,
        reason
    );
}

/// Parses entered dates, or keeps the default when blank or invalid.
pub fn date_or_default(input: &str, default: DateTime<Utc>) -> DateTime<Utc> {
    match parse_date_input(input) {
        Ok(Some(date)) => date,
        Ok(None) => default,
        Err(e) => {
            warn!("{}", e);
            println!(
                "{} {}; using {}",
                "Warning:".yellow().bold(),
                e,
                default.format(DATE_INPUT_FORMAT)
            );
            default
        },
    }
}

/// History range from entered text; blank or invalid dates fall back to the last week.
///
/// # Errors
///
/// Returns `AppError::InvalidInput` if the resulting start is after the end.
pub fn range_from_input(start: &str, end: &str, now: DateTime<Utc>) -> Result<TimeRange> {
    let default = TimeRange::last_week(now);
    TimeRange::new(
        date_or_default(start, default.start),
        date_or_default(end, default.end),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::Interval;
    use chrono::{Duration, TimeZone};
    use mockito::{Matcher, ServerGuard};
    use serde_json::json;

    fn settings() -> Settings {
        Settings {
            api_key: "test_key".into(),
            geo_url: String::new(),
            pro_url: String::new(),
            cities_database_url: "sqlite::memory:".into(),
            daily_count: 16,
        }
    }

    fn app_for(server: &ServerGuard) -> App {
        let client = OpenWeatherClient::with_base_urls("test_key".into(), &server.url(), &server.url());
        let locator = IpLocator::with_url(&format!("{}/json/", server.url()));
        App::with_clients(settings(), client, locator, false)
    }

    fn show_args(dataset: Dataset) -> ShowArgs {
        ShowArgs {
            dataset,
            city: None,
            lat: None,
            lon: None,
            query: QueryArgs::default(),
        }
    }

    async fn mock_geocode(server: &mut ServerGuard, city: &str, body: serde_json::Value) -> mockito::Mock {
        server
            .mock("GET", "/geo/1.0/direct")
            .match_query(Matcher::UrlEncoded("q".into(), city.into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    fn weather_body(name: &str) -> serde_json::Value {
        json!({
            "name": name,
            "sys": {"country": "GB"},
            "weather": [{"main": "Clouds", "description": "broken clouds"}],
            "main": {"temp": 12.5, "humidity": 81.0},
            "visibility": 10000,
            "wind": {"speed": 4.1, "deg": 250},
            "clouds": {"all": 75}
        })
    }

    #[test]
    fn invalid_date_falls_back_to_default() {
        let now = Utc.with_ymd_and_hms(2023, 10, 8, 0, 0, 0).unwrap();
        let range = range_from_input("last tuesday", "", now).unwrap();
        assert_eq!(range.start, now - Duration::days(7));
        assert_eq!(range.end, now);
    }

    #[test]
    fn explicit_dates_are_used() {
        let now = Utc.with_ymd_and_hms(2023, 10, 8, 0, 0, 0).unwrap();
        let range = range_from_input("2020-11-24 13:16:42", "2020-11-27 13:16:39", now).unwrap();
        assert_eq!(range.start.timestamp(), 1_606_223_802);
        assert_eq!(range.end.timestamp(), 1_606_482_999);
    }

    #[test]
    fn start_after_default_end_is_rejected() {
        let now = Utc.with_ymd_and_hms(2023, 10, 8, 0, 0, 0).unwrap();
        assert!(matches!(
            range_from_input("2030-01-01 00:00:00", "", now),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn locate_without_city_uses_ip_lookup() {
        let mut server = mockito::Server::new_async().await;
        let _ip = server
            .mock("GET", "/json/")
            .with_status(200)
            .with_body(r#"{"city":"Oslo"}"#)
            .create_async()
            .await;
        let _geo = mock_geocode(
            &mut server,
            "Oslo",
            json!([{"name": "Oslo", "lat": 59.91, "lon": 10.75, "country": "NO"}]),
        )
        .await;

        let mut app = app_for(&server);
        let place = app.locate(None).await.unwrap().unwrap();
        assert_eq!(place.name, "Oslo");
        assert_eq!(app.session().place.as_ref(), Some(&place));
    }

    #[tokio::test]
    async fn locate_subcommand_fails_when_unresolved() {
        let mut server = mockito::Server::new_async().await;
        let _geo = mock_geocode(&mut server, "Atlantis", json!([])).await;

        let mut app = app_for(&server);
        let result = app
            .run_command(Commands::Locate {
                city: Some("Atlantis".into()),
            })
            .await;
        assert!(matches!(result, Err(AppError::Cli(_))));
        assert!(app.session().place.is_none());
    }

    #[tokio::test]
    async fn show_with_coordinates_exports_table() {
        let mut server = mockito::Server::new_async().await;
        let weather = server
            .mock("GET", "/data/2.5/weather")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("lat".into(), "40".into()),
                Matcher::UrlEncoded("lon".into(), "-75".into()),
                Matcher::UrlEncoded("units".into(), "metric".into()),
            ]))
            .with_status(200)
            .with_body(weather_body("Philadelphia").to_string())
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weather.csv");
        let mut args = show_args(Dataset::Weather);
        args.lat = Some("40.0".into());
        args.lon = Some("-75.0".into());
        args.query.export = Some(path.clone());

        let mut app = app_for(&server);
        app.show(args).await.unwrap();
        weather.assert_async().await;

        let place = app.session().place.clone().unwrap();
        assert_eq!(place.name, MANUAL_PLACE_NAME);

        let csv = std::fs::read_to_string(&path).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "name,country,condition,Humidity (%),Temperature (°C),visibility,windSpeed,windDirection,cloudiness"
        );
        assert_eq!(
            lines.next().unwrap(),
            "Philadelphia,GB,Clouds - broken clouds,81,12.5,10000,4.1,250,75"
        );
    }

    #[tokio::test]
    async fn upstream_failure_is_a_warning_not_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _aq = server
            .mock("GET", "/data/2.5/air_pollution")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aq.csv");
        let mut args = show_args(Dataset::AirQuality);
        args.lat = Some("35.6892".into());
        args.lon = Some("51.389".into());
        args.query.export = Some(path.clone());

        let mut app = app_for(&server);
        assert!(app.show(args).await.is_ok());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn show_applies_interval_to_session() {
        let mut server = mockito::Server::new_async().await;
        let list: Vec<_> = (0..48)
            .map(|h| json!({"main": {"aqi": 1}, "components": {"co": 201.9}, "dt": 1_606_176_000 + h * 3600}))
            .collect();
        let _aq = server
            .mock("GET", "/data/2.5/air_pollution/forecast")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({"list": list}).to_string())
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forecast.csv");
        let mut args = show_args(Dataset::AirQualityForecast);
        args.lat = Some("1".into());
        args.lon = Some("2".into());
        args.query.interval = Some(Interval::TwelveHours);
        args.query.export = Some(path.clone());

        let mut app = app_for(&server);
        app.show(args).await.unwrap();
        assert_eq!(app.session().interval, Interval::TwelveHours);

        // header + indices 0, 12, 24, 36
        let csv = std::fs::read_to_string(&path).unwrap();
        assert_eq!(csv.lines().count(), 5);
    }

    #[tokio::test]
    async fn batch_skips_unresolved_cities() {
        let mut server = mockito::Server::new_async().await;
        let _tokyo = mock_geocode(
            &mut server,
            "Tokyo",
            json!([{"name": "Tokyo", "lat": 35.68, "lon": 139.69, "country": "JP"}]),
        )
        .await;
        let _nowhere = mock_geocode(&mut server, "Nowhere", json!([])).await;
        let _weather = server
            .mock("GET", "/data/2.5/weather")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(weather_body("Tokyo").to_string())
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.csv");
        let args = BatchArgs {
            dataset: Dataset::Weather,
            region: crate::db::Region::Asia,
            cities: vec!["Tokyo-Japan".into(), "Nowhere".into()],
            query: QueryArgs {
                export: Some(path.clone()),
                ..QueryArgs::default()
            },
        };

        let mut app = app_for(&server);
        app.batch(args).await.unwrap();

        let csv = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("City,name,country"));
        assert!(lines[1].starts_with("Tokyo-Japan,Tokyo,GB"));
    }
}
