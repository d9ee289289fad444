//! Product-value junction. The pivot records which property the value was picked
//! for, since one value can be offered by several properties.

use sea_orm::{Set, Value, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::core::association::Junction;

/// A property value selected for a product
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_property_value")]
pub struct Model {
    /// Owning product
    #[sea_orm(primary_key, auto_increment = false)]
    pub product_id: i64,
    /// Selected value
    #[sea_orm(primary_key, auto_increment = false)]
    pub property_value_id: i64,
    /// Property the value was selected for
    pub property_id: Option<i64>,
}

/// All three foreign keys cascade on delete
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Selection belongs to a product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Product,
    /// Selected value
    #[sea_orm(
        belongs_to = "super::property_value::Entity",
        from = "Column::PropertyValueId",
        to = "super::property_value::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    PropertyValue,
    /// Property context of the selection
    #[sea_orm(
        belongs_to = "super::property::Entity",
        from = "Column::PropertyId",
        to = "super::property::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Property,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::property_value::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PropertyValue.def()
    }
}

impl Related<super::property::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Property.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Pivot payload for `product_property_value`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PropertyLink {
    /// Property the value is selected for
    pub property_id: i64,
}

impl Junction for Entity {
    type Owner = super::product::Entity;
    type Target = super::property_value::Entity;
    type Pivot = PropertyLink;

    const RELATION: &'static str = "product_property_value";

    fn owner_column() -> Column {
        Column::ProductId
    }

    fn target_column() -> Column {
        Column::PropertyValueId
    }

    fn owner_id_column() -> super::product::Column {
        super::product::Column::Id
    }

    fn target_id_column() -> super::property_value::Column {
        super::property_value::Column::Id
    }

    fn new_link(owner_id: i64, target_id: i64, pivot: Option<&PropertyLink>) -> ActiveModel {
        ActiveModel {
            product_id: Set(owner_id),
            property_value_id: Set(target_id),
            property_id: Set(pivot.map(|link| link.property_id)),
        }
    }

    fn pivot_values(pivot: &PropertyLink) -> Vec<(Column, Value)> {
        vec![(Column::PropertyId, Some(pivot.property_id).into())]
    }
}
