/// Database configuration and connection management
pub mod database;

/// Currency seed configuration loading from config.toml
pub mod currencies;
