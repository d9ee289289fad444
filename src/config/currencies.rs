//! Currency configuration loading from config.toml
//!
//! The currencies listed in config.toml are seeded into the database on startup
//! when their code is not stored yet.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Currencies to seed
    #[serde(default)]
    pub currencies: Vec<CurrencyConfig>,
}

/// Configuration for a single currency
#[derive(Debug, Deserialize, Clone)]
pub struct CurrencyConfig {
    /// ISO 4217 code
    pub code: String,
    /// Human-readable name
    pub name: String,
    /// Display symbol
    pub symbol: String,
    /// Conversion rate relative to the default currency
    pub rate: f64,
    /// Whether this currency should be the default
    #[serde(default)]
    pub is_default: bool,
}

/// Loads currency configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    parse_config(&contents)
}

/// Parses configuration from a TOML string
///
/// # Errors
/// Returns an error if the TOML is invalid or required fields are missing.
pub fn parse_config(contents: &str) -> Result<Config> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Where [`load_default_config`] looks for the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Loads currency configuration from the default location (./config.toml)
pub fn load_default_config() -> Result<Config> {
    load_config(DEFAULT_CONFIG_PATH)
}
