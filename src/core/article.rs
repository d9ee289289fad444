//! Article and tag operations.
//!
//! Articles and tags are plain rows identified by slug; tagging goes through the
//! `article_tag` junction. The wrappers here resolve ids first so a bad id surfaces
//! as [`Error::NotFound`] instead of a storage failure.

use crate::{
    core::{
        association::{self, AssociatedQuery, AttachResult, DetachOutcome, SyncReport},
        non_empty, require, slugify,
    },
    entities::{Article, ArticleTag, Tag, article, tag},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use tracing::{info, instrument};

fn slug_for(text: &str, what: &str) -> Result<String> {
    let slug = slugify(text);
    if slug.is_empty() {
        return Err(Error::InvalidInput {
            message: format!("{what} '{text}' has no characters usable in a slug"),
        });
    }
    Ok(slug)
}

/// Creates an article; the slug is derived from the title.
///
/// # Errors
/// Returns an error if:
/// - The title is empty or has nothing slug-worthy in it
/// - Another article already uses the slug
/// - The database insert fails
pub async fn create_article(
    db: &DatabaseConnection,
    title: &str,
    body: &str,
) -> Result<article::Model> {
    let title = non_empty(title, "Article title")?;
    let slug = slug_for(&title, "Article title")?;

    let article = article::ActiveModel {
        title: Set(title),
        slug: Set(slug),
        body: Set(body.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(id = article.id, slug = %article.slug, "Created article");
    Ok(article)
}

/// Finds an article by slug.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_article_by_slug(
    db: &DatabaseConnection,
    slug: &str,
) -> Result<Option<article::Model>> {
    Article::find()
        .filter(article::Column::Slug.eq(slug))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Deletes an article. Its tag links go with it.
///
/// # Errors
/// Returns an error if the delete fails.
pub async fn delete_article(db: &DatabaseConnection, article_id: i64) -> Result<bool> {
    let deleted = Article::delete_by_id(article_id).exec(db).await?;
    Ok(deleted.rows_affected > 0)
}

/// Creates a tag; the slug is derived from the name.
///
/// # Errors
/// Returns an error if the name is empty, the slug is taken, or the insert fails.
pub async fn create_tag(db: &DatabaseConnection, name: &str) -> Result<tag::Model> {
    let name = non_empty(name, "Tag name")?;
    let slug = slug_for(&name, "Tag name")?;

    tag::ActiveModel {
        name: Set(name),
        slug: Set(slug),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Finds a tag by slug.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_tag_by_slug(db: &DatabaseConnection, slug: &str) -> Result<Option<tag::Model>> {
    Tag::find()
        .filter(tag::Column::Slug.eq(slug))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Deletes a tag. It disappears from every article that carried it.
///
/// # Errors
/// Returns an error if the delete fails.
pub async fn delete_tag(db: &DatabaseConnection, tag_id: i64) -> Result<bool> {
    let deleted = Tag::delete_by_id(tag_id).exec(db).await?;
    Ok(deleted.rows_affected > 0)
}

/// Tags an article. Tagging twice is a no-op.
///
/// # Errors
/// Returns [`Error::NotFound`] if either id does not resolve, or
/// [`Error::OperationFailed`] if the insert fails.
#[instrument(skip(db))]
pub async fn tag_article(
    db: &DatabaseConnection,
    article_id: i64,
    tag_id: i64,
) -> Result<AttachResult> {
    require::<Article, _>(db, "article", article_id).await?;
    require::<Tag, _>(db, "tag", tag_id).await?;
    association::attach::<ArticleTag, _>(db, article_id, tag_id, None).await
}

/// Removes a tag from an article.
///
/// The tag itself may already be gone, in which case its link went with it and the
/// result is [`DetachOutcome::AlreadyAbsent`].
///
/// # Errors
/// Returns [`Error::NotFound`] if the article does not exist, or
/// [`Error::OperationFailed`] if the delete fails.
#[instrument(skip(db))]
pub async fn untag_article(
    db: &DatabaseConnection,
    article_id: i64,
    tag_id: i64,
) -> Result<DetachOutcome> {
    require::<Article, _>(db, "article", article_id).await?;
    association::detach::<ArticleTag, _>(db, article_id, tag_id).await
}

/// Replaces the tags of an article with `tag_ids`.
///
/// # Errors
/// Returns [`Error::NotFound`] if the article or any tag does not exist, or
/// [`Error::OperationFailed`] if the sync fails. A failed sync changes nothing.
pub async fn set_article_tags(
    db: &DatabaseConnection,
    article_id: i64,
    tag_ids: &[i64],
) -> Result<SyncReport> {
    require::<Article, _>(db, "article", article_id).await?;
    for &tag_id in tag_ids {
        require::<Tag, _>(db, "tag", tag_id).await?;
    }
    association::sync::<ArticleTag>(db, article_id, tag_ids).await
}

/// Tags of an article, by tag id.
#[must_use]
pub fn article_tags(article_id: i64) -> AssociatedQuery<Tag> {
    association::list_associated::<ArticleTag>(article_id)
}

/// Articles carrying a tag, by article id.
#[must_use]
pub fn tagged_articles(tag_id: i64) -> AssociatedQuery<Article> {
    association::list_owners::<ArticleTag>(tag_id)
}
