//! Banner and section operations.
//!
//! Banners are placed into sections through `banner_section`; the pivot `sort`
//! orders the banners within a section.

use crate::{
    core::{
        association::{self, AssociatedQuery, AttachResult, DetachOutcome, Junction, SortOrder},
        non_empty, require, slugify,
    },
    entities::{Banner, BannerSection, Section, banner, section},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use tracing::{info, instrument};

/// Creates an active banner.
///
/// # Errors
/// Returns an error if the title is empty or the insert fails.
pub async fn create_banner(
    db: &DatabaseConnection,
    title: &str,
    link_url: Option<&str>,
) -> Result<banner::Model> {
    let title = non_empty(title, "Banner title")?;
    let link_url = link_url
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(ToString::to_string);

    let banner = banner::ActiveModel {
        title: Set(title),
        link_url: Set(link_url),
        is_active: Set(true),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(id = banner.id, "Created banner");
    Ok(banner)
}

/// Shows or hides a banner in every section it is placed in.
///
/// # Errors
/// Returns [`Error::NotFound`] if the banner does not exist, or a database error.
pub async fn set_banner_active(
    db: &DatabaseConnection,
    banner_id: i64,
    is_active: bool,
) -> Result<banner::Model> {
    let mut banner: banner::ActiveModel =
        require::<Banner, _>(db, "banner", banner_id).await?.into();
    banner.is_active = Set(is_active);
    banner.update(db).await.map_err(Into::into)
}

/// Creates a section; the slug is derived from the name.
///
/// # Errors
/// Returns an error if the name is empty, the slug is taken, or the insert fails.
pub async fn create_section(db: &DatabaseConnection, name: &str) -> Result<section::Model> {
    let name = non_empty(name, "Section name")?;
    let slug = slugify(&name);
    if slug.is_empty() {
        return Err(Error::InvalidInput {
            message: format!("Section name '{name}' has no characters usable in a slug"),
        });
    }

    section::ActiveModel {
        name: Set(name),
        slug: Set(slug),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Finds a section by slug.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_section_by_slug(
    db: &DatabaseConnection,
    slug: &str,
) -> Result<Option<section::Model>> {
    Section::find()
        .filter(section::Column::Slug.eq(slug))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Places a banner into a section at `sort`, or last when `sort` is `None`.
///
/// Re-placing a banner without `sort` keeps its position.
///
/// # Errors
/// Returns [`Error::NotFound`] if either id does not resolve, or
/// [`Error::OperationFailed`] if the write fails.
#[instrument(skip(db))]
pub async fn place_banner(
    db: &DatabaseConnection,
    banner_id: i64,
    section_id: i64,
    sort: Option<i32>,
) -> Result<AttachResult> {
    require::<Banner, _>(db, "banner", banner_id).await?;
    require::<Section, _>(db, "section", section_id).await?;

    let sort = match sort {
        Some(sort) => Some(SortOrder(sort)),
        None => append_position(db, banner_id, section_id).await?,
    };
    association::attach::<BannerSection, _>(db, banner_id, section_id, sort.as_ref()).await
}

/// Position after the last banner of the section, or `None` when the banner is placed
/// there already.
async fn append_position(
    db: &DatabaseConnection,
    banner_id: i64,
    section_id: i64,
) -> Result<Option<SortOrder>> {
    if association::is_attached::<BannerSection, _>(db, banner_id, section_id).await? {
        return Ok(None);
    }
    let next =
        association::next_sort::<BannerSection, _>(db, BannerSection::target_column(), section_id)
            .await?;
    Ok(Some(SortOrder(next)))
}

/// Takes a banner out of a section.
///
/// # Errors
/// Returns [`Error::NotFound`] if the banner does not exist, or
/// [`Error::OperationFailed`] if the delete fails.
#[instrument(skip(db))]
pub async fn remove_banner_from_section(
    db: &DatabaseConnection,
    banner_id: i64,
    section_id: i64,
) -> Result<DetachOutcome> {
    require::<Banner, _>(db, "banner", banner_id).await?;
    association::detach::<BannerSection, _>(db, banner_id, section_id).await
}

/// Moves a placed banner to `sort` within the section. Returns `false` if the banner
/// is not placed there.
///
/// # Errors
/// Returns [`Error::OperationFailed`] if the update fails.
pub async fn move_banner(
    db: &DatabaseConnection,
    banner_id: i64,
    section_id: i64,
    sort: i32,
) -> Result<bool> {
    association::update_pivot::<BannerSection, _>(db, banner_id, section_id, &SortOrder(sort)).await
}

/// Banners in a section, in placement order.
#[must_use]
pub fn section_banners(section_id: i64) -> AssociatedQuery<Banner> {
    association::list_owners::<BannerSection>(section_id)
}

/// Active banners of a section in placement order, as rendered on the storefront.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn active_section_banners(
    db: &DatabaseConnection,
    section_id: i64,
) -> Result<Vec<banner::Model>> {
    section_banners(section_id)
        .into_select()
        .filter(banner::Column::IsActive.eq(true))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sections a banner is placed in.
#[must_use]
pub fn banner_sections(banner_id: i64) -> AssociatedQuery<Section> {
    association::list_associated::<BannerSection>(banner_id)
}

/// Deletes a banner and its placements.
///
/// # Errors
/// Returns an error if the delete fails.
pub async fn delete_banner(db: &DatabaseConnection, banner_id: i64) -> Result<bool> {
    let deleted = Banner::delete_by_id(banner_id).exec(db).await?;
    Ok(deleted.rows_affected > 0)
}

/// Deletes a section and the placements in it.
///
/// # Errors
/// Returns an error if the delete fails.
pub async fn delete_section(db: &DatabaseConnection, section_id: i64) -> Result<bool> {
    let deleted = Section::delete_by_id(section_id).exec(db).await?;
    Ok(deleted.rows_affected > 0)
}
