//! Core business logic, independent of any request-handling framework.
//!
//! [`association`] and [`exclusive_flag`] hold the generic link and flag rules;
//! the entity modules wrap them with typed, validated operations.

pub mod article;
pub mod association;
pub mod banner;
pub mod currency;
pub mod exclusive_flag;
pub mod feedback;
pub mod product;
pub mod property;

use crate::errors::{Error, Result};
use sea_orm::{ConnectionTrait, EntityTrait, PrimaryKeyTrait};

/// Loads the row with id `id`, or fails with [`Error::NotFound`] naming `entity`.
pub(crate) async fn require<E, C>(db: &C, entity: &'static str, id: i64) -> Result<E::Model>
where
    E: EntityTrait,
    C: ConnectionTrait,
    i64: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
{
    E::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::NotFound { entity, id })
}

/// Lower-case ASCII slug: runs of anything but letters and digits become one `-`.
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    for c in input.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Trims `value` and rejects it if nothing is left.
pub(crate) fn non_empty(value: &str, what: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput {
            message: format!("{what} cannot be empty"),
        });
    }
    Ok(trimmed.to_string())
}
