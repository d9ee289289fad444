use catalog_admin::{
    config::{
        currencies::{self, DEFAULT_CONFIG_PATH},
        database,
    },
    core::currency,
    errors::Result,
};
use dotenvy::dotenv;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 4. Seed currencies from config.toml, if there is one
    if Path::new(DEFAULT_CONFIG_PATH).exists() {
        let config = currencies::load_default_config()
            .inspect_err(|e| error!("Failed to load {}: {}", DEFAULT_CONFIG_PATH, e))?;
        currency::seed_currencies(&db, &config.currencies)
            .await
            .inspect_err(|e| error!("Failed to seed currencies: {}", e))?;
    } else {
        warn!("{} not found, skipping currency seeding", DEFAULT_CONFIG_PATH);
    }

    match currency::get_default_currency(&db).await? {
        Some(default) => info!(code = %default.code, "Default currency"),
        None => warn!("No default currency configured"),
    }

    Ok(())
}
