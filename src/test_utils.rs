//! Shared test utilities for the catalog core.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{article, banner, currency, product, property},
    entities,
    errors::Result,
};
use sea_orm::{ConnectOptions, DatabaseConnection};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Routes `tracing` output through the test harness so it shows up for failing tests.
/// Safe to call from every test; only the first call installs the subscriber.
pub fn init_test_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a file-backed `SQLite` database behind a pool of several connections, for
/// tests whose statements must really run side by side. Returns the connection and the
/// scratch directory holding the file; remove the directory when done.
pub async fn setup_file_test_db(name: &str) -> Result<(DatabaseConnection, PathBuf)> {
    let dir = std::env::temp_dir().join(format!("catalog-admin-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir)?;

    let url = format!("sqlite://{}/catalog.sqlite?mode=rwc", dir.display());
    let mut options = ConnectOptions::new(url);
    options.max_connections(8).min_connections(2);
    let db = sea_orm::Database::connect(options).await?;
    crate::config::database::create_tables(&db).await?;
    Ok((db, dir))
}

/// Creates a test article whose title, and therefore slug, is `slug`.
pub async fn create_test_article(
    db: &DatabaseConnection,
    slug: &str,
) -> Result<entities::article::Model> {
    article::create_article(db, slug, "Test body").await
}

/// Creates a test tag.
pub async fn create_test_tag(db: &DatabaseConnection, name: &str) -> Result<entities::tag::Model> {
    article::create_tag(db, name).await
}

/// Creates a test property.
pub async fn create_test_property(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::property::Model> {
    property::create_property(db, name).await
}

/// Creates a test property value not offered by any property yet.
pub async fn create_test_property_value(
    db: &DatabaseConnection,
    value: &str,
) -> Result<entities::property_value::Model> {
    property::create_property_value(db, value).await
}

/// Creates an active test banner without a link.
pub async fn create_test_banner(
    db: &DatabaseConnection,
    title: &str,
) -> Result<entities::banner::Model> {
    banner::create_banner(db, title, None).await
}

/// Creates a test section.
pub async fn create_test_section(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::section::Model> {
    banner::create_section(db, name).await
}

/// Creates a test product with sensible defaults.
///
/// # Defaults
/// * name: `"Test product {sku}"`
/// * price: 10.0
pub async fn create_test_product(
    db: &DatabaseConnection,
    sku: &str,
) -> Result<entities::product::Model> {
    product::create_product(db, &format!("Test product {sku}"), sku, 10.0).await
}

/// Creates a test currency through the regular write path.
///
/// # Defaults
/// * name: `"{code} currency"`
/// * symbol: `"¤"`
/// * rate: 1.0
pub async fn create_test_currency(
    db: &DatabaseConnection,
    code: &str,
    is_default: bool,
) -> Result<entities::currency::Model> {
    currency::create_currency(
        db,
        currency::NewCurrency {
            code: code.to_string(),
            name: format!("{code} currency"),
            symbol: "¤".to_string(),
            rate: 1.0,
            is_default,
        },
    )
    .await
}
