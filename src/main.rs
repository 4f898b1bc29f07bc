mod api;
mod cli;
mod config;
mod db;
mod error;
mod models;
mod normalize;
mod output;
mod pipeline;
mod session;

use clap::Parser;
use cli::{prompts, App, BatchArgs, Cli, Commands, QueryArgs, ShowArgs};
use colored::*;
use config::{LogFormat, LogSettings, Settings};
use dialoguer::{theme::ColorfulTheme, Select};
use error::Result;
use pipeline::Dataset;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the tracing subscriber. The returned guard must live until exit
/// so buffered file logs are flushed.
fn init_logging(settings: &LogSettings) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let json = settings.format == LogFormat::Json;

    let (file_layer, guard) = match &settings.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "weatherwise.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = if json {
                fmt::layer().json().with_writer(writer).boxed()
            } else {
                fmt::layer().with_ansi(false).with_writer(writer).boxed()
            };
            (Some(layer), Some(guard))
        },
        None => (None, None),
    };

    let stderr_layer = if json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let log_settings = match LogSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{} {}", "Warning:".yellow().bold(), e);
            LogSettings::default()
        },
    };
    let _guard = init_logging(&log_settings);

    info!("Initializing WeatherWise...");

    let settings = match Settings::from_env(cli.api_key.clone()) {
        Ok(settings) => settings.with_hosts(cli.geo_url.clone(), cli.pro_url.clone()),
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            println!(
                "{}",
                "Error: set OPENWEATHER_API_KEY (or pass --api-key) and check the environment."
                    .red()
            );
            return Err(e);
        },
    };

    if let Some(command) = cli.command {
        let mut app = App::new(settings, false);
        return app.run_command(command).await.map_err(|e| {
            error!("Command execution failed: {:?}", e);
            e
        });
    }

    let mut app = App::new(settings, true);
    println!("{}", "Welcome to WeatherWise!".cyan().bold());

    // Main interactive loop
    loop {
        let place = app
            .session()
            .place
            .as_ref()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "not set".to_string());
        println!("{} {}", "Current location:".bold(), place);

        let options = &[
            "Set Location by City",
            "Pick a City from the Database",
            "Set Coordinates Manually",
            "Show a Dataset",
            "Batch Collect by Region",
            "List Regions",
            "Exit",
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("What would you like to do?")
            .items(options)
            .default(0)
            .interact_opt()?
            .unwrap_or(options.len() - 1);

        println!("\n---\n");

        let command_result = match selection {
            0 => match prompts::prompt_city() {
                Ok(city) => app.locate(Some(city.as_str())).await.map(|_| ()),
                Err(e) => Err(e),
            },
            1 => pick_city(&mut app).await,
            2 => prompts::prompt_coordinates().map(|coord| {
                app.set_coordinates(coord);
            }),
            3 => match show_args(&app) {
                Ok(args) => app.run_command(Commands::Show(args)).await,
                Err(e) => {
                    println!("{} {}", "Failed to get input:".red(), e);
                    continue;
                },
            },
            4 => match batch_args() {
                Ok(args) => app.run_command(Commands::Batch(args)).await,
                Err(e) => {
                    println!("{} {}", "Failed to get input:".red(), e);
                    continue;
                },
            },
            5 => app.run_command(Commands::Regions).await,
            _ => {
                println!("{}", "Goodbye!".green());
                break;
            },
        };

        if let Err(e) = command_result {
            error!("Command execution failed: {:?}", e);
            println!(
                "{} {}",
                "Error executing command:".red(),
                e.to_string().red()
            );
        }

        println!("\n---\n");
    }

    Ok(())
}

async fn pick_city(app: &mut App) -> Result<()> {
    let region = prompts::prompt_region()?;
    let cities = app.region_cities(region).await?;
    if cities.is_empty() {
        println!("{} no cities stored for {}", "Warning:".yellow().bold(), region);
        return Ok(());
    }
    if let Some(city) = prompts::prompt_city_from(&cities)? {
        app.locate(Some(db::geocoder_query(&city))).await?;
    }
    Ok(())
}

/// Interval, history range and export options for one dataset.
fn query_args(dataset: Dataset) -> Result<QueryArgs> {
    let mut query = QueryArgs::default();
    if dataset.is_sampled() {
        query.interval = Some(prompts::prompt_interval()?);
    }
    if dataset == Dataset::AirQualityHistory {
        let default = session::TimeRange::last_week(chrono::Utc::now());
        query.start = Some(prompts::prompt_date("Start", default.start)?);
        query.end = Some(prompts::prompt_date("End", default.end)?);
    }
    query.export = prompts::prompt_export(dataset)?;
    Ok(query)
}

fn show_args(app: &App) -> Result<ShowArgs> {
    let dataset = prompts::prompt_dataset()?;
    let city = if app.session().place.is_none() {
        Some(prompts::prompt_city()?).filter(|c| !c.trim().is_empty())
    } else {
        None
    };
    Ok(ShowArgs {
        dataset,
        city,
        lat: None,
        lon: None,
        query: query_args(dataset)?,
    })
}

fn batch_args() -> Result<BatchArgs> {
    let dataset = prompts::prompt_dataset()?;
    let region = prompts::prompt_region()?;
    Ok(BatchArgs {
        dataset,
        region,
        cities: Vec::new(),
        query: query_args(dataset)?,
    })
}
