//! CLI configuration: TOML file, environment override, and flag precedence.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use lunar_crime_lunar_models::CityId;
use serde::Deserialize;

use crate::CliError;

/// Environment variable that overrides the configured snapshot path.
pub const DATA_PATH_ENV: &str = "LUNAR_CRIME_DATA";

/// Config file picked up from the working directory when `--config` is not
/// given.
pub const DEFAULT_CONFIG_FILE: &str = "lunar_crime.toml";

/// The documented default config, embedded at compile time.
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../config/lunar_crime.toml");

/// How results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    Json,
    /// Human-readable tables.
    #[default]
    Text,
}

/// Settings read from the TOML config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Snapshot JSON path.
    pub data_path: Option<PathBuf>,
    /// Output format.
    pub format: OutputFormat,
    /// Cities to include by default. Empty means all.
    pub cities: Vec<CityId>,
}

/// Parses a config document.
///
/// # Errors
///
/// Returns [`CliError::Config`] if the TOML is malformed.
pub fn parse_config_toml(toml_str: &str) -> Result<CliConfig, CliError> {
    Ok(toml::from_str(toml_str)?)
}

/// Loads the config from `path`, or from [`DEFAULT_CONFIG_FILE`] in the
/// working directory if present, or falls back to defaults.
///
/// # Errors
///
/// Returns [`CliError`] if an explicitly given file cannot be read, or any
/// config file fails to parse.
pub fn load_config(path: Option<&Path>) -> Result<CliConfig, CliError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let local = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !local.is_file() {
                log::debug!("No {DEFAULT_CONFIG_FILE} found, using defaults");
                return Ok(CliConfig::default());
            }
            local
        }
    };

    let contents = std::fs::read_to_string(&path).map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })?;
    log::debug!("Loaded config from {}", path.display());
    parse_config_toml(&contents)
}

/// Picks the snapshot path: `--data` flag, then [`DATA_PATH_ENV`], then
/// the config file.
///
/// # Errors
///
/// Returns [`CliError::MissingDataPath`] if none of them is set.
pub fn resolve_data_path(
    flag: Option<&Path>,
    env_value: Option<String>,
    config: &CliConfig,
) -> Result<PathBuf, CliError> {
    if let Some(path) = flag {
        return Ok(path.to_path_buf());
    }
    if let Some(value) = env_value
        && !value.trim().is_empty()
    {
        return Ok(PathBuf::from(value));
    }
    config.data_path.clone().ok_or(CliError::MissingDataPath)
}
