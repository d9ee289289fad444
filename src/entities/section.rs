//! Section entity - A page area where banners are placed.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Section database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sections")]
pub struct Model {
    /// Unique identifier for the section
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Homepage hero")
    pub name: String,
    /// Machine name, unique across sections
    #[sea_orm(unique)]
    pub slug: String,
}

/// Defines relationships between Section and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One section has many banner placements
    #[sea_orm(has_many = "super::banner_section::Entity")]
    BannerSection,
}

impl Related<super::banner_section::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BannerSection.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
