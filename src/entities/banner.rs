//! Banner entity - Promotional image/link placed into one or more sections.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Banner database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "banners")]
pub struct Model {
    /// Unique identifier for the banner
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Title shown as alt text
    pub title: String,
    /// Where the banner links to
    pub link_url: Option<String>,
    /// Inactive banners stay placed but are not rendered
    pub is_active: bool,
    /// When the banner was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Banner and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One banner has many section placements
    #[sea_orm(has_many = "super::banner_section::Entity")]
    BannerSection,
}

impl Related<super::banner_section::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BannerSection.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
