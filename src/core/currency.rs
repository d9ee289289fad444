//! Currency business logic - Handles currency creation, updates and the default currency.
//!
//! Every write goes through [`save_currency`], which runs the exclusive-flag hook inside
//! the same transaction as the row write. That keeps exactly one default currency once
//! any currency has been made default, and keeps `default_set_at` at the moment a row
//! first became the default.

use crate::{
    config::currencies::CurrencyConfig,
    core::exclusive_flag::{begin_flag_transaction, enforce_before_commit},
    entities::{Currency, currency},
    errors::{Error, Result},
};
use sea_orm::{ActiveValue, QueryOrder, Set, prelude::*};
use tracing::{debug, info, instrument};

/// Fields for a new currency
#[derive(Clone, Debug)]
pub struct NewCurrency {
    /// ISO 4217 code; normalized to upper case
    pub code: String,
    /// Human-readable name
    pub name: String,
    /// Display symbol
    pub symbol: String,
    /// Conversion rate relative to the default currency
    pub rate: f64,
    /// Whether the new currency becomes the default
    pub is_default: bool,
}

impl From<&CurrencyConfig> for NewCurrency {
    fn from(config: &CurrencyConfig) -> Self {
        Self {
            code: config.code.clone(),
            name: config.name.clone(),
            symbol: config.symbol.clone(),
            rate: config.rate,
            is_default: config.is_default,
        }
    }
}

/// Partial update; `None` leaves a field as stored
#[derive(Clone, Debug, Default)]
pub struct CurrencyChanges {
    /// New display name
    pub name: Option<String>,
    /// New symbol
    pub symbol: Option<String>,
    /// New rate
    pub rate: Option<f64>,
    /// New default flag
    pub is_default: Option<bool>,
}

fn normalize_code(code: &str) -> Result<String> {
    let code = code.trim().to_ascii_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(Error::InvalidInput {
            message: format!("Currency code must be three letters, got '{code}'"),
        });
    }
    Ok(code)
}

fn validate_rate(rate: f64) -> Result<f64> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(Error::InvalidRate { rate });
    }
    Ok(rate)
}

fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput {
            message: "Currency name cannot be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Persists a currency active model.
///
/// Opens a transaction, runs [`enforce_before_commit`], inserts the row if it has no id
/// yet or updates it otherwise, and commits. If any step fails the transaction is
/// dropped and rolled back, including the clearing of the previous default.
///
/// # Errors
/// Returns an error if any statement fails, e.g. a duplicate currency code.
#[instrument(skip_all)]
pub async fn save_currency(
    db: &DatabaseConnection,
    mut active: currency::ActiveModel,
) -> Result<currency::Model> {
    let now = chrono::Utc::now();
    active.updated_at = Set(now);

    let txn = begin_flag_transaction(db).await?;
    enforce_before_commit(&txn, &mut active).await?;

    let saved = if matches!(active.id, ActiveValue::NotSet) {
        active.created_at = Set(now);
        if matches!(active.is_default, ActiveValue::NotSet) {
            active.is_default = Set(false);
        }
        if matches!(active.default_set_at, ActiveValue::NotSet) {
            active.default_set_at = Set(None);
        }
        active.insert(&txn).await?
    } else {
        active.update(&txn).await?
    };

    txn.commit().await?;
    debug!(id = saved.id, code = %saved.code, is_default = saved.is_default, "Saved currency");
    Ok(saved)
}

/// Creates a new currency after validating code, name and rate.
///
/// # Errors
/// Returns an error if:
/// - The code is not three ASCII letters
/// - The name is empty or whitespace-only
/// - The rate is not a positive finite number
/// - The code is already taken or the insert fails
pub async fn create_currency(db: &DatabaseConnection, new: NewCurrency) -> Result<currency::Model> {
    let code = normalize_code(&new.code)?;
    let name = validate_name(&new.name)?;
    let rate = validate_rate(new.rate)?;

    let active = currency::ActiveModel {
        code: Set(code),
        name: Set(name),
        symbol: Set(new.symbol.trim().to_string()),
        rate: Set(rate),
        is_default: Set(new.is_default),
        ..Default::default()
    };
    let created = save_currency(db, active).await?;
    info!(id = created.id, code = %created.code, "Created currency");
    Ok(created)
}

/// Applies `changes` to the currency with id `currency_id`.
///
/// # Errors
/// Returns [`Error::NotFound`] if the currency does not exist, a validation error for
/// bad name or rate, or a database error.
pub async fn update_currency(
    db: &DatabaseConnection,
    currency_id: i64,
    changes: CurrencyChanges,
) -> Result<currency::Model> {
    let mut active: currency::ActiveModel = get_currency_by_id(db, currency_id)
        .await?
        .ok_or(Error::NotFound {
            entity: "currency",
            id: currency_id,
        })?
        .into();

    if let Some(name) = changes.name {
        active.name = Set(validate_name(&name)?);
    }
    if let Some(symbol) = changes.symbol {
        active.symbol = Set(symbol.trim().to_string());
    }
    if let Some(rate) = changes.rate {
        active.rate = Set(validate_rate(rate)?);
    }
    if let Some(is_default) = changes.is_default {
        active.is_default = Set(is_default);
    }

    save_currency(db, active).await
}

/// Makes the currency with id `currency_id` the default.
///
/// # Errors
/// Returns [`Error::NotFound`] if the currency does not exist, or a database error.
pub async fn set_default_currency(
    db: &DatabaseConnection,
    currency_id: i64,
) -> Result<currency::Model> {
    let updated = update_currency(
        db,
        currency_id,
        CurrencyChanges {
            is_default: Some(true),
            ..Default::default()
        },
    )
    .await?;
    info!(id = updated.id, code = %updated.code, "Default currency changed");
    Ok(updated)
}

/// Returns the current default currency, if any currency holds the flag.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_default_currency(db: &DatabaseConnection) -> Result<Option<currency::Model>> {
    Currency::find()
        .filter(currency::Column::IsDefault.eq(true))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all currencies ordered by code.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_currencies(db: &DatabaseConnection) -> Result<Vec<currency::Model>> {
    Currency::find()
        .order_by_asc(currency::Column::Code)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a currency by id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_currency_by_id(
    db: &DatabaseConnection,
    currency_id: i64,
) -> Result<Option<currency::Model>> {
    Currency::find_by_id(currency_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a currency by code, case-insensitively.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_currency_by_code(
    db: &DatabaseConnection,
    code: &str,
) -> Result<Option<currency::Model>> {
    Currency::find()
        .filter(currency::Column::Code.eq(code.trim().to_ascii_uppercase()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Deletes a currency. Deleting the default leaves the collection without one.
///
/// # Errors
/// Returns an error if the delete fails.
pub async fn delete_currency(db: &DatabaseConnection, currency_id: i64) -> Result<bool> {
    let deleted = Currency::delete_by_id(currency_id).exec(db).await?;
    Ok(deleted.rows_affected > 0)
}

/// Inserts configured currencies whose code is not stored yet.
///
/// Seeding uses [`create_currency`], so at most one default survives even if the
/// configuration marks several; the last one listed wins. Returns the number created.
///
/// # Errors
/// Returns an error if a configured currency is invalid or an insert fails.
#[instrument(skip_all, fields(configured = configs.len()))]
pub async fn seed_currencies(db: &DatabaseConnection, configs: &[CurrencyConfig]) -> Result<usize> {
    let mut created = 0;
    for config in configs {
        if get_currency_by_code(db, &config.code).await?.is_some() {
            debug!(code = %config.code, "Currency already present, skipping");
            continue;
        }
        create_currency(db, NewCurrency::from(config)).await?;
        created += 1;
    }
    info!(created, "Seeded currencies");
    Ok(created)
}
