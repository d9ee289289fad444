//! Banner-section junction. Carries a `sort` position within the section.

use sea_orm::{Set, Value, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::core::association::{Junction, SortOrder};

/// Placement of a banner in a section
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "banner_section")]
pub struct Model {
    /// Placed banner
    #[sea_orm(primary_key, auto_increment = false)]
    pub banner_id: i64,
    /// Section the banner is placed in
    #[sea_orm(primary_key, auto_increment = false)]
    pub section_id: i64,
    /// Position, ascending
    pub sort: i32,
}

/// Both sides cascade on delete
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Placement belongs to a banner
    #[sea_orm(
        belongs_to = "super::banner::Entity",
        from = "Column::BannerId",
        to = "super::banner::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Banner,
    /// Placement belongs to a section
    #[sea_orm(
        belongs_to = "super::section::Entity",
        from = "Column::SectionId",
        to = "super::section::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Section,
}

impl Related<super::banner::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Banner.def()
    }
}

impl Related<super::section::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Section.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Junction for Entity {
    type Owner = super::banner::Entity;
    type Target = super::section::Entity;
    type Pivot = SortOrder;

    const RELATION: &'static str = "banner_section";

    fn owner_column() -> Column {
        Column::BannerId
    }

    fn target_column() -> Column {
        Column::SectionId
    }

    fn sort_column() -> Option<Column> {
        Some(Column::Sort)
    }

    fn owner_id_column() -> super::banner::Column {
        super::banner::Column::Id
    }

    fn target_id_column() -> super::section::Column {
        super::section::Column::Id
    }

    fn new_link(owner_id: i64, target_id: i64, pivot: Option<&SortOrder>) -> ActiveModel {
        ActiveModel {
            banner_id: Set(owner_id),
            section_id: Set(target_id),
            sort: Set(pivot.copied().unwrap_or_default().0),
        }
    }

    fn pivot_values(pivot: &SortOrder) -> Vec<(Column, Value)> {
        vec![(Column::Sort, pivot.0.into())]
    }
}
