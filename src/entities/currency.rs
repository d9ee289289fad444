//! Currency entity - Display and pricing currencies.
//!
//! Exactly one currency may be the default at a time. The rule is enforced by
//! [`crate::core::exclusive_flag`] on every write that goes through
//! [`crate::core::currency::save_currency`]; `default_set_at` records when a row
//! first became the default and is never rewritten afterwards.

use sea_orm::{ActiveValue, Set, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::core::exclusive_flag::ExclusiveFlag;

/// Currency database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "currencies")]
pub struct Model {
    /// Unique identifier for the currency
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ISO 4217 code (e.g., "EUR")
    #[sea_orm(unique)]
    pub code: String,
    /// Human-readable name (e.g., "Euro")
    pub name: String,
    /// Display symbol (e.g., "€")
    pub symbol: String,
    /// Conversion rate relative to the default currency
    pub rate: f64,
    /// Whether this is the default currency
    pub is_default: bool,
    /// When this currency first became the default; `None` if it never was
    pub default_set_at: Option<DateTimeUtc>,
    /// When the currency was created
    pub created_at: DateTimeUtc,
    /// When the currency was last modified
    pub updated_at: DateTimeUtc,
}

/// Currency has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl ExclusiveFlag for ActiveModel {
    fn flag_column() -> Column {
        Column::IsDefault
    }

    fn flag_set_at_column() -> Column {
        Column::DefaultSetAt
    }

    fn id_column() -> Column {
        Column::Id
    }

    fn flag(&self) -> Option<bool> {
        match &self.is_default {
            ActiveValue::Set(value) | ActiveValue::Unchanged(value) => Some(*value),
            ActiveValue::NotSet => None,
        }
    }

    fn row_id(&self) -> Option<i64> {
        match &self.id {
            ActiveValue::Set(id) | ActiveValue::Unchanged(id) => Some(*id),
            ActiveValue::NotSet => None,
        }
    }

    fn flag_set_at(&self) -> Option<Option<DateTimeUtc>> {
        match &self.default_set_at {
            ActiveValue::Set(at) | ActiveValue::Unchanged(at) => Some(*at),
            ActiveValue::NotSet => None,
        }
    }

    fn set_flag_set_at(&mut self, at: DateTimeUtc) {
        self.default_set_at = Set(Some(at));
    }
}
