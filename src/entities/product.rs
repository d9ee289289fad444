//! Product entity - A sellable catalog item.
//!
//! Products carry the property values they were configured with through the
//! `product_property_value` junction.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name of the product (e.g., "Linen shirt")
    pub name: String,
    /// Stock keeping unit, unique across products
    #[sea_orm(unique)]
    pub sku: String,
    /// Price in the default currency
    pub price: f64,
    /// Inactive products are hidden from the storefront
    pub is_active: bool,
    /// When the product was created
    pub created_at: DateTimeUtc,
    /// When the product was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One product has many selected property values
    #[sea_orm(has_many = "super::product_property_value::Entity")]
    ProductPropertyValue,
}

impl Related<super::product_property_value::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductPropertyValue.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
