use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select};
use tracing::info;
use weather_core::{
    BoxForm, Config, Coordinate, PointPolicy, WeatherError, check_point, lookup_box, lookup_point,
    parse_box, provider_from_config,
};

use crate::{
    server::{AppState, run_http_server},
    views::Views,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather by coordinates")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the web app.
    Serve {
        /// Address to listen on; defaults to `listen_addr` from the config file.
        #[arg(long)]
        addr: Option<String>,
    },

    /// Store the OpenWeatherMap API key and validation policy.
    Configure,

    /// Show the current temperature at a point.
    Point {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,

        #[arg(allow_negative_numbers = true)]
        longitude: f64,
    },

    /// Show station temperatures and their mean inside an area.
    #[command(name = "box")]
    Area {
        #[arg(allow_negative_numbers = true)]
        lat_bottom: String,

        #[arg(allow_negative_numbers = true)]
        lon_left: String,

        #[arg(allow_negative_numbers = true)]
        lat_top: String,

        #[arg(allow_negative_numbers = true)]
        lon_right: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Serve { addr } => serve(addr).await,
            Command::Configure => configure(),
            Command::Point {
                latitude,
                longitude,
            } => {
                let config = Config::load()?;
                let at =
                    check_point(Coordinate::new(latitude, longitude), config.point_validation)?;
                let provider = provider_from_config(&config)?;

                let report = lookup_point(provider.as_ref(), at).await?;
                println!("Station:     {}", report.station);
                println!("Temperature: {} °C", report.temperature_display());
                if let Some(at) = report.observed_at {
                    println!("Observed:    {}", at.format("%Y-%m-%d %H:%M UTC"));
                }
                Ok(())
            }
            Command::Area {
                lat_bottom,
                lon_left,
                lat_top,
                lon_right,
            } => {
                let config = Config::load()?;
                let form = BoxForm::new(&lat_bottom, &lon_left, &lat_top, &lon_right);
                let area = match parse_box(&form) {
                    Ok(area) => area,
                    Err(WeatherError::FieldValidation(fields)) => {
                        for (field, messages) in &fields {
                            for message in messages {
                                eprintln!("{field}: {message}");
                            }
                        }
                        anyhow::bail!("invalid bounding box");
                    }
                    Err(other) => return Err(other.into()),
                };
                let provider = provider_from_config(&config)?;

                let report = lookup_box(provider.as_ref(), area).await?;
                for (station, kelvin) in &report.stations {
                    println!("{station:<30} {kelvin:>8.1} K");
                }
                println!("{:<30} {:>8} K", "Mean", report.mean.to_string());
                Ok(())
            }
        }
    }
}

async fn serve(addr: Option<String>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let provider = provider_from_config(&config)?;
    let addr = addr.unwrap_or_else(|| config.listen_addr.clone());

    let views = Views::new().context("Failed to load page templates")?;

    info!(policy = %config.point_validation, "starting weather web app");
    let state = AppState {
        provider,
        point_policy: config.point_validation,
        views: Arc::new(views),
    };

    run_http_server(state, &addr).await
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key.trim().to_string());

    let start = PointPolicy::all()
        .iter()
        .position(|p| *p == config.point_validation)
        .unwrap_or(0);
    config.point_validation = Select::new("Single-point range check:", PointPolicy::all().to_vec())
        .with_starting_cursor(start)
        .prompt()
        .context("Failed to read validation policy")?;

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}
