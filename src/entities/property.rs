//! Property entity - A product attribute such as "Color" or "Size".
//!
//! A property offers an ordered list of values through `property_property_value`.
//! Products pick concrete values through `product_property_value`, which also
//! records the property the value was chosen for.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Property database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "properties")]
pub struct Model {
    /// Unique identifier for the property
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Color")
    pub name: String,
    /// Machine name, unique across properties
    #[sea_orm(unique)]
    pub slug: String,
}

/// Defines relationships between Property and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Values offered by this property
    #[sea_orm(has_many = "super::property_property_value::Entity")]
    PropertyPropertyValue,
    /// Product selections made for this property
    #[sea_orm(has_many = "super::product_property_value::Entity")]
    ProductPropertyValue,
}

impl Related<super::property_property_value::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PropertyPropertyValue.def()
    }
}

impl Related<super::product_property_value::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductPropertyValue.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
