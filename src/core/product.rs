//! Product business logic - Handles product rows and their selected property values.
//!
//! A product picks values for its properties through `product_property_value`. The
//! pivot remembers which property a value was picked for, and a value can only be
//! picked for a property that offers it.

use crate::{
    core::{
        association::{self, AssociatedQuery, AttachResult, DetachOutcome},
        non_empty,
        property::offers_value,
        require,
    },
    entities::{
        Product, ProductPropertyValue, Property, PropertyLink, PropertyValue, product,
        product_property_value,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

fn validate_price(price: f64) -> Result<f64> {
    if !price.is_finite() || price < 0.0 {
        return Err(Error::InvalidPrice { price });
    }
    Ok(price)
}

/// Retrieves all active products, ordered alphabetically by name.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_active_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::IsActive.eq(true))
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a product by SKU.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product_by_sku(
    db: &DatabaseConnection,
    sku: &str,
) -> Result<Option<product::Model>> {
    Product::find()
        .filter(product::Column::Sku.eq(sku.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific product by its unique ID.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product_by_id(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Option<product::Model>> {
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new active product, performing input validation.
///
/// Name and SKU are trimmed. The SKU must be unique.
///
/// # Errors
/// Returns an error if:
/// - The name or SKU is empty or whitespace-only
/// - The price is negative or not finite (NaN, infinity)
/// - The SKU is taken or the database insert fails
pub async fn create_product(
    db: &DatabaseConnection,
    name: &str,
    sku: &str,
    price: f64,
) -> Result<product::Model> {
    let name = non_empty(name, "Product name")?;
    let sku = non_empty(sku, "Product SKU")?;
    let price = validate_price(price)?;

    let now = chrono::Utc::now();
    let product = product::ActiveModel {
        name: Set(name),
        sku: Set(sku),
        price: Set(price),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(id = product.id, sku = %product.sku, "Created product");
    Ok(product)
}

/// Updates an existing product's name and price and refreshes `updated_at`.
///
/// # Errors
/// Returns an error if:
/// - The product name is empty or whitespace-only
/// - The price is negative or not finite (NaN, infinity)
/// - The product does not exist
/// - The database update operation fails
pub async fn update_product(
    db: &DatabaseConnection,
    product_id: i64,
    new_name: &str,
    new_price: f64,
) -> Result<product::Model> {
    let name = non_empty(new_name, "Product name")?;
    let price = validate_price(new_price)?;

    let mut product: product::ActiveModel =
        require::<Product, _>(db, "product", product_id).await?.into();
    product.name = Set(name);
    product.price = Set(price);
    product.updated_at = Set(chrono::Utc::now());

    product.update(db).await.map_err(Into::into)
}

/// Shows or hides a product without touching its selections.
///
/// # Errors
/// Returns [`Error::NotFound`] if the product does not exist, or a database error.
pub async fn set_product_active(
    db: &DatabaseConnection,
    product_id: i64,
    is_active: bool,
) -> Result<product::Model> {
    let mut product: product::ActiveModel =
        require::<Product, _>(db, "product", product_id).await?.into();
    product.is_active = Set(is_active);
    product.updated_at = Set(chrono::Utc::now());
    product.update(db).await.map_err(Into::into)
}

/// Deletes a product and its property value selections.
///
/// # Errors
/// Returns an error if the delete fails.
pub async fn delete_product(db: &DatabaseConnection, product_id: i64) -> Result<bool> {
    let deleted = Product::delete_by_id(product_id).exec(db).await?;
    Ok(deleted.rows_affected > 0)
}

/// Selects `value_id` for `property_id` on a product.
///
/// Selecting the same value again for a different property rewrites the pivot.
///
/// # Errors
/// Returns:
/// - [`Error::NotFound`] if the product, property or value does not exist
/// - [`Error::InvalidInput`] if the property does not offer the value
/// - [`Error::OperationFailed`] if the write fails
#[instrument(skip(db))]
pub async fn select_property_value(
    db: &DatabaseConnection,
    product_id: i64,
    property_id: i64,
    value_id: i64,
) -> Result<AttachResult> {
    require::<Product, _>(db, "product", product_id).await?;
    let property = require::<Property, _>(db, "property", property_id).await?;
    let value = require::<PropertyValue, _>(db, "property value", value_id).await?;

    if !offers_value(db, property_id, value_id).await? {
        return Err(Error::InvalidInput {
            message: format!(
                "Property '{}' does not offer value '{}'",
                property.name, value.value
            ),
        });
    }

    let link = PropertyLink { property_id };
    association::attach::<ProductPropertyValue, _>(db, product_id, value_id, Some(&link)).await
}

/// Drops a selected value from a product.
///
/// # Errors
/// Returns [`Error::NotFound`] if the product does not exist, or
/// [`Error::OperationFailed`] if the delete fails.
#[instrument(skip(db))]
pub async fn deselect_property_value(
    db: &DatabaseConnection,
    product_id: i64,
    value_id: i64,
) -> Result<DetachOutcome> {
    require::<Product, _>(db, "product", product_id).await?;
    association::detach::<ProductPropertyValue, _>(db, product_id, value_id).await
}

/// Values selected for a product, by value id.
#[must_use]
pub fn product_property_values(product_id: i64) -> AssociatedQuery<PropertyValue> {
    association::list_associated::<ProductPropertyValue>(product_id)
}

/// Products that selected a value.
#[must_use]
pub fn products_with_value(value_id: i64) -> AssociatedQuery<Product> {
    association::list_owners::<ProductPropertyValue>(value_id)
}

/// Raw selection rows of a product, including the property each value was picked for.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn product_selections(
    db: &DatabaseConnection,
    product_id: i64,
) -> Result<Vec<product_property_value::Model>> {
    ProductPropertyValue::find()
        .filter(product_property_value::Column::ProductId.eq(product_id))
        .order_by_asc(product_property_value::Column::PropertyValueId)
        .all(db)
        .await
        .map_err(Into::into)
}
