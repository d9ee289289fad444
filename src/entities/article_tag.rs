//! Article-tag junction. Carries no pivot columns.

use sea_orm::{Set, Value, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::core::association::Junction;

/// Article-tag link
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "article_tag")]
pub struct Model {
    /// Linked article
    #[sea_orm(primary_key, auto_increment = false)]
    pub article_id: i64,
    /// Linked tag
    #[sea_orm(primary_key, auto_increment = false)]
    pub tag_id: i64,
}

/// Both sides cascade on delete
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Link belongs to an article
    #[sea_orm(
        belongs_to = "super::article::Entity",
        from = "Column::ArticleId",
        to = "super::article::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Article,
    /// Link belongs to a tag
    #[sea_orm(
        belongs_to = "super::tag::Entity",
        from = "Column::TagId",
        to = "super::tag::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Tag,
}

impl Related<super::article::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Article.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tag.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Junction for Entity {
    type Owner = super::article::Entity;
    type Target = super::tag::Entity;
    type Pivot = ();

    const RELATION: &'static str = "article_tag";

    fn owner_column() -> Column {
        Column::ArticleId
    }

    fn target_column() -> Column {
        Column::TagId
    }

    fn owner_id_column() -> super::article::Column {
        super::article::Column::Id
    }

    fn target_id_column() -> super::tag::Column {
        super::tag::Column::Id
    }

    fn new_link(owner_id: i64, target_id: i64, _pivot: Option<&()>) -> ActiveModel {
        ActiveModel {
            article_id: Set(owner_id),
            tag_id: Set(target_id),
        }
    }

    fn pivot_values(_pivot: &()) -> Vec<(Column, Value)> {
        Vec::new()
    }
}
