//! Property value entity - One concrete value, e.g. "Red" or "XL".

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Property value database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "property_values")]
pub struct Model {
    /// Unique identifier for the value
    #[sea_orm(primary_key)]
    pub id: i64,
    /// The value as displayed
    pub value: String,
}

/// Defines relationships between `PropertyValue` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Properties offering this value
    #[sea_orm(has_many = "super::property_property_value::Entity")]
    PropertyPropertyValue,
    /// Products that selected this value
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
