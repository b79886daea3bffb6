#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the lunar crime analytics engine.
//!
//! Loads a snapshot JSON document (one dataset per city), validates it,
//! and prints the derived statistics as text or JSON. All numbers come from
//! [`lunar_crime_analytics`]; this binary only selects and formats them.

mod config;
mod render;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use lunar_crime_analytics::{
    AnalyticsError,
    report::{ReportCache, build_comparison},
    validate::validate_snapshot,
};
use lunar_crime_analytics_models::CityReport;
use lunar_crime_lunar_models::{CityId, RawSnapshot, Snapshot};
use serde::Serialize;
use thiserror::Error;

use crate::config::{DATA_PATH_ENV, OutputFormat};

/// Errors that abort a CLI invocation.
#[derive(Debug, Error)]
pub enum CliError {
    /// A file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// The file that failed.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The snapshot document is not valid JSON for the expected shape.
    #[error("Snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The config file is malformed.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// The engine rejected a request.
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    /// No snapshot path was configured anywhere.
    #[error(
        "No snapshot path: pass --data, set LUNAR_CRIME_DATA, or set data_path in the config file"
    )]
    MissingDataPath,
}

#[derive(Parser)]
#[command(
    name = "lunar_crime",
    about = "Full-moon vs. baseline incident statistics for Chicago, NYC, and LA"
)]
struct Cli {
    /// Snapshot JSON document (overrides `LUNAR_CRIME_DATA` and the config file)
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    /// TOML config file (defaults to `./lunar_crime.toml` if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Output format (overrides the config file)
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Every derived view for one or all cities
    Report {
        /// City identifier (CHICAGO, NYC, LA)
        #[arg(long)]
        city: Option<CityId>,
    },
    /// Full-moon vs. baseline averages, effect size, and significance
    Stats {
        /// City identifier (CHICAGO, NYC, LA)
        #[arg(long)]
        city: Option<CityId>,
    },
    /// Cross-city comparison
    Compare,
    /// Monthly buckets with completeness
    Monthly {
        /// City identifier (CHICAGO, NYC, LA)
        #[arg(long)]
        city: CityId,
    },
    /// Day-of-week buckets
    Weekday {
        /// City identifier (CHICAGO, NYC, LA)
        #[arg(long)]
        city: CityId,
    },
    /// Synthetic (modeled) hourly profile
    Hourly {
        /// City identifier (CHICAGO, NYC, LA)
        #[arg(long)]
        city: CityId,
    },
    /// Averages per named moon phase
    Phases {
        /// City identifier (CHICAGO, NYC, LA)
        #[arg(long)]
        city: CityId,
    },
}

/// Reads and validates the snapshot. Cities that fail validation are
/// logged and skipped.
fn load_snapshot(path: &Path) -> Result<Snapshot, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let raw: RawSnapshot = serde_json::from_str(&contents)?;
    let (snapshot, rejected) = validate_snapshot(&raw);

    for (city, e) in &rejected {
        log::error!("Skipping {city}: {e}");
    }
    log::info!(
        "Loaded {} city dataset(s) from {}",
        snapshot.cities.len(),
        path.display()
    );

    Ok(snapshot)
}

/// Resolves which cities a command applies to.
fn select_cities(snapshot: &Snapshot, city: Option<CityId>, configured: &[CityId]) -> Vec<CityId> {
    city.map_or_else(
        || {
            snapshot
                .cities
                .keys()
                .copied()
                .filter(|c| configured.is_empty() || configured.contains(c))
                .collect()
        },
        |city| vec![city],
    )
}

/// Returns reports for `cities`, served from `cache` when unchanged.
fn city_reports(
    snapshot: &Snapshot,
    cache: &mut ReportCache,
    cities: &[CityId],
) -> Result<Vec<CityReport>, CliError> {
    cities
        .iter()
        .map(|city| -> Result<CityReport, CliError> {
            let dataset = snapshot
                .get(*city)
                .ok_or(AnalyticsError::UnknownCity { city: *city })?;
            Ok(cache.get_or_build(*city, dataset).clone())
        })
        .collect()
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[allow(clippy::too_many_lines)]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config = config::load_config(cli.config.as_deref())?;
    let data_path = config::resolve_data_path(
        cli.data.as_deref(),
        std::env::var(DATA_PATH_ENV).ok(),
        &config,
    )?;
    let format = cli.format.unwrap_or(config.format);
    let snapshot = load_snapshot(&data_path)?;
    let mut cache = ReportCache::new();

    match cli.command {
        Commands::Report { city } => {
            let cities = select_cities(&snapshot, city, &config.cities);
            let reports = city_reports(&snapshot, &mut cache, &cities)?;
            match format {
                OutputFormat::Json => print_json(&reports)?,
                OutputFormat::Text => {
                    for report in &reports {
                        render::report(report);
                        println!();
                    }
                }
            }
        }
        Commands::Stats { city } => {
            let cities = select_cities(&snapshot, city, &config.cities);
            let reports = city_reports(&snapshot, &mut cache, &cities)?;
            match format {
                OutputFormat::Json => {
                    let stats: Vec<_> = reports.iter().map(|r| (r.city, &r.statistics)).collect();
                    print_json(&stats)?;
                }
                OutputFormat::Text => {
                    for report in &reports {
                        match report.statistics.ready() {
                            Some(stats) => render::statistics(stats),
                            None => println!("{}: insufficient data", report.city),
                        }
                    }
                }
            }
        }
        Commands::Compare => {
            let cities = select_cities(&snapshot, None, &config.cities);
            let reports = city_reports(&snapshot, &mut cache, &cities)?;
            let comparison = build_comparison(&reports)?;
            match format {
                OutputFormat::Json => print_json(&comparison)?,
                OutputFormat::Text => render::comparison(&comparison),
            }
        }
        Commands::Monthly { city } => {
            let reports = city_reports(&snapshot, &mut cache, &[city])?;
            let report = &reports[0];
            match (format, report.monthly.ready()) {
                (OutputFormat::Json, _) => print_json(&report.monthly)?,
                (OutputFormat::Text, Some(buckets)) => render::monthly(buckets),
                (OutputFormat::Text, None) => println!("{city}: insufficient data"),
            }
        }
        Commands::Weekday { city } => {
            let reports = city_reports(&snapshot, &mut cache, &[city])?;
            let report = &reports[0];
            match (format, report.weekday.ready()) {
                (OutputFormat::Json, _) => print_json(&report.weekday)?,
                (OutputFormat::Text, Some(buckets)) => render::weekday(buckets),
                (OutputFormat::Text, None) => println!("{city}: insufficient data"),
            }
        }
        Commands::Hourly { city } => {
            let reports = city_reports(&snapshot, &mut cache, &[city])?;
            let report = &reports[0];
            match (format, report.hourly.ready()) {
                (OutputFormat::Json, _) => print_json(&report.hourly)?,
                (OutputFormat::Text, Some(profile)) => render::hourly(profile),
                (OutputFormat::Text, None) => println!("{city}: insufficient data"),
            }
        }
        Commands::Phases { city } => {
            let reports = city_reports(&snapshot, &mut cache, &[city])?;
            let report = &reports[0];
            match (format, report.phases.ready()) {
                (OutputFormat::Json, _) => print_json(&report.phases)?,
                (OutputFormat::Text, Some(buckets)) => render::phases(buckets),
                (OutputFormat::Text, None) => println!("{city}: insufficient data"),
            }
        }
    }

    Ok(())
}
