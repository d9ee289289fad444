//! Entity module - Contains all SeaORM entity definitions for the database.
//! Plain entities hold catalog rows; the junction entities (`article_tag`,
//! `banner_section`, `property_property_value`, `product_property_value`) link
//! them and implement [`crate::core::association::Junction`].

pub mod article;
pub mod article_tag;
pub mod banner;
pub mod banner_section;
pub mod currency;
pub mod product;
pub mod product_property_value;
pub mod property;
pub mod property_property_value;
pub mod property_value;
pub mod section;
pub mod tag;

// Re-export specific types to avoid conflicts
pub use article::{Column as ArticleColumn, Entity as Article, Model as ArticleModel};
pub use article_tag::{Entity as ArticleTag, Model as ArticleTagModel};
pub use banner::{Column as BannerColumn, Entity as Banner, Model as BannerModel};
pub use banner_section::{Entity as BannerSection, Model as BannerSectionModel};
pub use currency::{Column as CurrencyColumn, Entity as Currency, Model as CurrencyModel};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use product_property_value::{
    Entity as ProductPropertyValue, Model as ProductPropertyValueModel, PropertyLink,
};
pub use property::{Column as PropertyColumn, Entity as Property, Model as PropertyModel};
pub use property_property_value::{
    Entity as PropertyPropertyValue, Model as PropertyPropertyValueModel,
};
pub use property_value::{Entity as PropertyValue, Model as PropertyValueModel};
pub use section::{Column as SectionColumn, Entity as Section, Model as SectionModel};
pub use tag::{Column as TagColumn, Entity as Tag, Model as TagModel};
