//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! which also emits the junction foreign keys with their `ON DELETE CASCADE` actions.

use crate::entities::{
    Article, ArticleTag, Banner, BannerSection, Currency, Product, ProductPropertyValue, Property,
    PropertyPropertyValue, PropertyValue, Section, Tag,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::path::Path;
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/catalog.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, falling back
/// to a local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Creates the parent directory of a file-backed `SQLite` URL.
fn ensure_sqlite_dir(database_url: &str) -> Result<()> {
    let Some(path) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or_default();
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    ensure_sqlite_dir(&database_url)?;
    debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

async fn create_table<E: EntityTrait>(
    db: &DatabaseConnection,
    schema: &Schema,
    entity: E,
) -> Result<()> {
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all tables that do not exist yet.
///
/// Referenced tables are created before the junctions that point at them.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, Article).await?;
    create_table(db, &schema, Tag).await?;
    create_table(db, &schema, ArticleTag).await?;
    create_table(db, &schema, Product).await?;
    create_table(db, &schema, Property).await?;
    create_table(db, &schema, PropertyValue).await?;
    create_table(db, &schema, PropertyPropertyValue).await?;
    create_table(db, &schema, ProductPropertyValue).await?;
    create_table(db, &schema, Banner).await?;
    create_table(db, &schema, Section).await?;
    create_table(db, &schema, BannerSection).await?;
    create_table(db, &schema, Currency).await?;

    info!("Database tables ensured");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        article_tag::Model as ArticleTagModel, currency::Model as CurrencyModel,
        product::Model as ProductModel,
    };
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<ProductModel> = Product::find().limit(1).all(&db).await?;
        let _: Vec<ArticleTagModel> = ArticleTag::find().limit(1).all(&db).await?;
        let _: Vec<CurrencyModel> = Currency::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_repeatable() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[test]
    fn test_default_database_url_is_sqlite() {
        assert!(DEFAULT_DATABASE_URL.starts_with("sqlite://"));
    }

    #[test]
    fn test_ensure_sqlite_dir() -> Result<()> {
        ensure_sqlite_dir("sqlite::memory:")?;
        ensure_sqlite_dir("sqlite://catalog.sqlite?mode=rwc")?;

        let dir = std::env::temp_dir().join(format!("catalog-admin-{}", std::process::id()));
        let url = format!("sqlite://{}/nested/catalog.sqlite?mode=rwc", dir.display());
        ensure_sqlite_dir(&url)?;
        assert!(dir.join("nested").is_dir());
        std::fs::remove_dir_all(&dir)?;
        Ok(())
    }
}
