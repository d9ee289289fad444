//! Property-value junction with a `sort` column ordering the values of a property.

use sea_orm::{Set, Value, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::core::association::{Junction, SortOrder};

/// A value offered by a property
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "property_property_value")]
pub struct Model {
    /// Owning property
    #[sea_orm(primary_key, auto_increment = false)]
    pub property_id: i64,
    /// Offered value
    #[sea_orm(primary_key, auto_increment = false)]
    pub property_value_id: i64,
    /// Position in the property's value list, ascending
    pub sort: i32,
}

/// Both sides cascade on delete
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Link belongs to a property
    #[sea_orm(
        belongs_to = "super::property::Entity",
        from = "Column::PropertyId",
        to = "super::property::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Property,
    /// Link belongs to a property value
    #[sea_orm(
        belongs_to = "super::property_value::Entity",
        from = "Column::PropertyValueId",
        to = "super::property_value::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    PropertyValue,
}

impl Related<super::property::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Property.def()
    }
}

impl Related<super::property_value::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PropertyValue.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Junction for Entity {
    type Owner = super::property::Entity;
    type Target = super::property_value::Entity;
    type Pivot = SortOrder;

    const RELATION: &'static str = "property_property_value";

    fn owner_column() -> Column {
        Column::PropertyId
    }

    fn target_column() -> Column {
        Column::PropertyValueId
    }

    fn sort_column() -> Option<Column> {
        Some(Column::Sort)
    }

    fn owner_id_column() -> super::property::Column {
        super::property::Column::Id
    }

    fn target_id_column() -> super::property_value::Column {
        super::property_value::Column::Id
    }

    fn new_link(owner_id: i64, target_id: i64, pivot: Option<&SortOrder>) -> ActiveModel {
        ActiveModel {
            property_id: Set(owner_id),
            property_value_id: Set(target_id),
            sort: Set(pivot.copied().unwrap_or_default().0),
        }
    }

    fn pivot_values(pivot: &SortOrder) -> Vec<(Column, Value)> {
        vec![(Column::Sort, pivot.0.into())]
    }
}
