//! Property and property value operations.
//!
//! A property (size, color) offers an ordered list of values through
//! `property_property_value`. One value row can be offered by several properties.

use crate::{
    core::{
        association::{self, AssociatedQuery, AttachResult, DetachOutcome, Junction, SortOrder},
        non_empty, require, slugify,
    },
    entities::{
        Property, PropertyPropertyValue, PropertyValue, property, property_property_value,
        property_value,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Creates a property; the slug is derived from the name.
///
/// # Errors
/// Returns an error if the name is empty, the slug is taken, or the insert fails.
pub async fn create_property(db: &DatabaseConnection, name: &str) -> Result<property::Model> {
    let name = non_empty(name, "Property name")?;
    let slug = slugify(&name);
    if slug.is_empty() {
        return Err(Error::InvalidInput {
            message: format!("Property name '{name}' has no characters usable in a slug"),
        });
    }

    let property = property::ActiveModel {
        name: Set(name),
        slug: Set(slug),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(id = property.id, slug = %property.slug, "Created property");
    Ok(property)
}

/// Creates a standalone value, not yet offered by any property.
///
/// # Errors
/// Returns an error if the value is empty or the insert fails.
pub async fn create_property_value(
    db: &DatabaseConnection,
    value: &str,
) -> Result<property_value::Model> {
    let value = non_empty(value, "Property value")?;
    property_value::ActiveModel {
        value: Set(value),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Finds a property by slug.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_property_by_slug(
    db: &DatabaseConnection,
    slug: &str,
) -> Result<Option<property::Model>> {
    Property::find()
        .filter(property::Column::Slug.eq(slug))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Offers `value_id` on `property_id` at position `sort`, or after the last value
/// when `sort` is `None`.
///
/// Offering a value twice keeps one link; passing a `sort` then moves it.
///
/// # Errors
/// Returns [`Error::NotFound`] if either id does not resolve, or
/// [`Error::OperationFailed`] if the write fails.
#[instrument(skip(db))]
pub async fn add_value_to_property(
    db: &DatabaseConnection,
    property_id: i64,
    value_id: i64,
    sort: Option<i32>,
) -> Result<AttachResult> {
    require::<Property, _>(db, "property", property_id).await?;
    require::<PropertyValue, _>(db, "property value", value_id).await?;

    let sort = match sort {
        Some(sort) => Some(SortOrder(sort)),
        None => append_position(db, property_id, value_id).await?,
    };
    association::attach::<PropertyPropertyValue, _>(db, property_id, value_id, sort.as_ref()).await
}

/// Position after the last offered value, or `None` when the value is already offered
/// and should keep its place.
async fn append_position(
    db: &DatabaseConnection,
    property_id: i64,
    value_id: i64,
) -> Result<Option<SortOrder>> {
    if association::is_attached::<PropertyPropertyValue, _>(db, property_id, value_id).await? {
        return Ok(None);
    }
    let next = association::next_sort::<PropertyPropertyValue, _>(
        db,
        PropertyPropertyValue::owner_column(),
        property_id,
    )
    .await?;
    Ok(Some(SortOrder(next)))
}

/// Stops offering `value_id` on `property_id`.
///
/// # Errors
/// Returns [`Error::NotFound`] if the property does not exist, or
/// [`Error::OperationFailed`] if the delete fails.
#[instrument(skip(db))]
pub async fn remove_value_from_property(
    db: &DatabaseConnection,
    property_id: i64,
    value_id: i64,
) -> Result<DetachOutcome> {
    require::<Property, _>(db, "property", property_id).await?;
    association::detach::<PropertyPropertyValue, _>(db, property_id, value_id).await
}

/// Moves an offered value to position `sort`. Returns `false` if the property does
/// not offer the value.
///
/// # Errors
/// Returns [`Error::OperationFailed`] if the update fails.
pub async fn reorder_value(
    db: &DatabaseConnection,
    property_id: i64,
    value_id: i64,
    sort: i32,
) -> Result<bool> {
    association::update_pivot::<PropertyPropertyValue, _>(
        db,
        property_id,
        value_id,
        &SortOrder(sort),
    )
    .await
}

/// Values offered by a property, in display order.
#[must_use]
pub fn property_values(property_id: i64) -> AssociatedQuery<PropertyValue> {
    association::list_associated::<PropertyPropertyValue>(property_id)
}

/// Properties offering a value.
#[must_use]
pub fn properties_offering(value_id: i64) -> AssociatedQuery<Property> {
    association::list_owners::<PropertyPropertyValue>(value_id)
}

/// Whether `property_id` offers `value_id`.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn offers_value(db: &DatabaseConnection, property_id: i64, value_id: i64) -> Result<bool> {
    association::is_attached::<PropertyPropertyValue, _>(db, property_id, value_id).await
}

/// Deletes a property along with its value offers and product selections made for it.
///
/// # Errors
/// Returns an error if the delete fails.
pub async fn delete_property(db: &DatabaseConnection, property_id: i64) -> Result<bool> {
    let deleted = Property::delete_by_id(property_id).exec(db).await?;
    Ok(deleted.rows_affected > 0)
}

/// Deletes a value everywhere it is offered or selected.
///
/// # Errors
/// Returns an error if the delete fails.
pub async fn delete_property_value(db: &DatabaseConnection, value_id: i64) -> Result<bool> {
    let deleted = PropertyValue::delete_by_id(value_id).exec(db).await?;
    Ok(deleted.rows_affected > 0)
}

/// Sort positions of a property's values, for display tooling.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn value_positions(
    db: &DatabaseConnection,
    property_id: i64,
) -> Result<Vec<property_property_value::Model>> {
    PropertyPropertyValue::find()
        .filter(property_property_value::Column::PropertyId.eq(property_id))
        .order_by_asc(property_property_value::Column::Sort)
        .order_by_asc(property_property_value::Column::PropertyValueId)
        .all(db)
        .await
        .map_err(Into::into)
}
