//! Many-to-many association management.
//!
//! Every junction entity implements [`Junction`], which tells the manager how the
//! pair is keyed and which extra pivot columns the junction carries. The operations
//! here are generic over that trait and are idempotent: attaching an existing pair
//! or detaching a missing one is a reported no-op, never an error. Storage failures
//! are always surfaced as [`Error::OperationFailed`].

use std::collections::BTreeSet;

use crate::errors::{Error, Result};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    Paginator, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Related, Select, SelectModel,
    SqlErr, TransactionTrait, TryInsertResult, Value,
    sea_query::{Expr, OnConflict},
};
use tracing::{debug, info, instrument, warn};

/// Describes one junction table linking an owner entity to a target entity.
pub trait Junction: EntityTrait {
    /// Entity on the owning side (e.g. article)
    type Owner: EntityTrait + Related<Self>;
    /// Entity on the related side (e.g. tag)
    type Target: EntityTrait + Related<Self>;
    /// Extra pivot columns written on attach; `()` when the junction has none
    type Pivot: Send + Sync;

    /// Junction table name, used in logs and errors
    const RELATION: &'static str;

    /// Junction column referencing the owner
    fn owner_column() -> Self::Column;

    /// Junction column referencing the target
    fn target_column() -> Self::Column;

    /// Ordering column, if the junction has one
    fn sort_column() -> Option<Self::Column> {
        None
    }

    /// Primary key column of the owner entity
    fn owner_id_column() -> <Self::Owner as EntityTrait>::Column;

    /// Primary key column of the target entity
    fn target_id_column() -> <Self::Target as EntityTrait>::Column;

    /// Builds a new junction row.
    fn new_link(owner_id: i64, target_id: i64, pivot: Option<&Self::Pivot>)
    -> Self::ActiveModel;

    /// Column assignments for rewriting the pivot of an existing row.
    fn pivot_values(pivot: &Self::Pivot) -> Vec<(Self::Column, Value)>;
}

/// Pivot payload for junctions that only carry a `sort` column
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortOrder(pub i32);

/// Result of [`attach`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachResult {
    /// A new junction row was inserted
    Created,
    /// The link existed and its pivot columns were rewritten
    Updated,
    /// The link existed and nothing was written
    Unchanged,
}

/// Result of a successful [`detach`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetachOutcome {
    /// The junction row existed and was deleted
    Removed,
    /// There was no junction row to delete
    AlreadyAbsent,
}

/// Summary of a [`sync`] call
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Target ids that were newly linked
    pub attached: Vec<i64>,
    /// Target ids that were unlinked
    pub detached: Vec<i64>,
    /// Target ids that were already linked and kept
    pub unchanged: Vec<i64>,
}

impl SyncReport {
    /// True if the sync neither attached nor detached anything.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.attached.is_empty() && self.detached.is_empty()
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn failed<J: Junction>(
    action: &'static str,
    owner_id: i64,
    related_id: i64,
    source: DbErr,
) -> Error {
    warn!(
        relation = J::RELATION,
        action, owner_id, related_id, error = %source,
        "Association operation failed"
    );
    Error::OperationFailed {
        relation: J::RELATION,
        action,
        owner_id,
        related_id,
        source,
    }
}

/// Links `owner_id` to `target_id`.
///
/// The insert uses `ON CONFLICT DO NOTHING` on the pair, so an existing link (including
/// one created by a concurrent caller) is the idempotent case: the pivot columns are
/// rewritten when `pivot` is given, otherwise nothing is written.
///
/// # Errors
/// Returns [`Error::OperationFailed`] for any storage failure other than the pair
/// already existing, e.g. a foreign key violation or a lost connection.
#[instrument(skip(db, pivot), fields(relation = J::RELATION))]
pub async fn attach<J, C>(
    db: &C,
    owner_id: i64,
    target_id: i64,
    pivot: Option<&J::Pivot>,
) -> Result<AttachResult>
where
    J: Junction,
    C: ConnectionTrait,
    <J as EntityTrait>::Model: IntoActiveModel<<J as EntityTrait>::ActiveModel>,
{
    let link = J::new_link(owner_id, target_id, pivot);
    let inserted = J::insert(link)
        .on_conflict(
            OnConflict::columns([J::owner_column(), J::target_column()])
                .do_nothing()
                .to_owned(),
        )
        .do_nothing()
        .exec(db)
        .await;

    match inserted {
        Ok(TryInsertResult::Inserted(_)) => {
            info!(owner_id, target_id, "Attached");
            return Ok(AttachResult::Created);
        }
        Ok(TryInsertResult::Conflicted | TryInsertResult::Empty) => {}
        Err(err) if is_unique_violation(&err) => {
            debug!(owner_id, target_id, "Lost attach race; link already exists");
        }
        Err(err) => return Err(failed::<J>("attach", owner_id, target_id, err)),
    }

    let rewritten = match pivot {
        Some(pivot) => update_pivot::<J, C>(db, owner_id, target_id, pivot).await?,
        None => false,
    };
    if rewritten {
        Ok(AttachResult::Updated)
    } else {
        debug!(owner_id, target_id, "Already attached");
        Ok(AttachResult::Unchanged)
    }
}

/// Removes the link between `owner_id` and `target_id`.
///
/// Detaching a pair that is not linked returns [`DetachOutcome::AlreadyAbsent`], so
/// calling this twice yields `Removed` then `AlreadyAbsent`. Neither endpoint row is
/// touched, and neither needs to exist any more.
///
/// # Errors
/// Returns [`Error::OperationFailed`] if the delete statement fails.
#[instrument(skip(db), fields(relation = J::RELATION))]
pub async fn detach<J, C>(db: &C, owner_id: i64, target_id: i64) -> Result<DetachOutcome>
where
    J: Junction,
    C: ConnectionTrait,
{
    let deleted = J::delete_many()
        .filter(J::owner_column().eq(owner_id))
        .filter(J::target_column().eq(target_id))
        .exec(db)
        .await
        .map_err(|err| failed::<J>("detach", owner_id, target_id, err))?;

    if deleted.rows_affected == 0 {
        debug!(owner_id, target_id, "Nothing to detach");
        Ok(DetachOutcome::AlreadyAbsent)
    } else {
        info!(owner_id, target_id, "Detached");
        Ok(DetachOutcome::Removed)
    }
}

/// Rewrites the pivot columns of an existing link. Returns `false` if the pair is not
/// linked or the junction has no pivot columns; existence is never changed.
///
/// # Errors
/// Returns [`Error::OperationFailed`] if the update statement fails.
#[instrument(skip(db, pivot), fields(relation = J::RELATION))]
pub async fn update_pivot<J, C>(
    db: &C,
    owner_id: i64,
    target_id: i64,
    pivot: &J::Pivot,
) -> Result<bool>
where
    J: Junction,
    C: ConnectionTrait,
{
    let values = J::pivot_values(pivot);
    if values.is_empty() {
        return Ok(false);
    }

    let mut update = J::update_many()
        .filter(J::owner_column().eq(owner_id))
        .filter(J::target_column().eq(target_id));
    for (column, value) in values {
        update = update.col_expr(column, Expr::value(value));
    }

    let updated = update
        .exec(db)
        .await
        .map_err(|err| failed::<J>("update pivot of", owner_id, target_id, err))?;
    debug!(owner_id, target_id, rows = updated.rows_affected, "Pivot updated");
    Ok(updated.rows_affected > 0)
}

/// Makes `target_ids` the exact set of targets linked to `owner_id`.
///
/// Runs in one transaction: links not in `target_ids` are removed, missing ones are
/// attached without pivot data, and links present in both are left untouched.
///
/// # Errors
/// Returns [`Error::OperationFailed`] if any statement fails; the transaction is
/// rolled back and no link changes are kept.
#[instrument(skip(db, target_ids), fields(relation = J::RELATION, wanted = target_ids.len()))]
pub async fn sync<J>(db: &DatabaseConnection, owner_id: i64, target_ids: &[i64]) -> Result<SyncReport>
where
    J: Junction,
    <J as EntityTrait>::Model: IntoActiveModel<<J as EntityTrait>::ActiveModel>,
{
    let txn = db
        .begin()
        .await
        .map_err(|err| failed::<J>("sync", owner_id, 0, err))?;

    let current: BTreeSet<i64> = linked_target_ids::<J, _>(&txn, owner_id)
        .await
        .map_err(|err| failed::<J>("sync", owner_id, 0, err))?
        .into_iter()
        .collect();
    let wanted: BTreeSet<i64> = target_ids.iter().copied().collect();

    let mut report = SyncReport::default();
    for &target_id in current.difference(&wanted) {
        if detach::<J, _>(&txn, owner_id, target_id).await? == DetachOutcome::Removed {
            report.detached.push(target_id);
        }
    }
    for &target_id in &wanted {
        if current.contains(&target_id) {
            report.unchanged.push(target_id);
        } else if attach::<J, _>(&txn, owner_id, target_id, None).await? == AttachResult::Created {
            report.attached.push(target_id);
        } else {
            report.unchanged.push(target_id);
        }
    }

    txn.commit()
        .await
        .map_err(|err| failed::<J>("sync", owner_id, 0, err))?;
    info!(
        owner_id,
        attached = report.attached.len(),
        detached = report.detached.len(),
        "Synced links"
    );
    Ok(report)
}

/// Removes every link of `owner_id` and returns how many were deleted.
///
/// # Errors
/// Returns [`Error::OperationFailed`] if the delete statement fails.
#[instrument(skip(db), fields(relation = J::RELATION))]
pub async fn detach_all<J, C>(db: &C, owner_id: i64) -> Result<u64>
where
    J: Junction,
    C: ConnectionTrait,
{
    let deleted = J::delete_many()
        .filter(J::owner_column().eq(owner_id))
        .exec(db)
        .await
        .map_err(|err| failed::<J>("detach", owner_id, 0, err))?;
    info!(owner_id, rows = deleted.rows_affected, "Detached all");
    Ok(deleted.rows_affected)
}

/// Target ids currently linked to `owner_id`, in target id order.
async fn linked_target_ids<J, C>(db: &C, owner_id: i64) -> std::result::Result<Vec<i64>, DbErr>
where
    J: Junction,
    C: ConnectionTrait,
{
    J::find()
        .select_only()
        .column(J::target_column())
        .filter(J::owner_column().eq(owner_id))
        .order_by_asc(J::target_column())
        .into_tuple::<i64>()
        .all(db)
        .await
}

/// Checks whether `owner_id` and `target_id` are linked.
///
/// # Errors
/// Returns an error if the query fails.
pub async fn is_attached<J, C>(db: &C, owner_id: i64, target_id: i64) -> Result<bool>
where
    J: Junction,
    C: ConnectionTrait,
{
    let link = J::find()
        .filter(J::owner_column().eq(owner_id))
        .filter(J::target_column().eq(target_id))
        .one(db)
        .await?;
    Ok(link.is_some())
}

/// Sort value that places a new link after every link sharing `scope_id` in `scope`.
///
/// `scope` is either junction column: ordering values of a property scopes by owner,
/// ordering banners within a section scopes by target. Returns 0 for an empty scope and
/// for junctions without a sort column.
///
/// # Errors
/// Returns an error if the query fails.
pub async fn next_sort<J, C>(db: &C, scope: J::Column, scope_id: i64) -> Result<i32>
where
    J: Junction,
    C: ConnectionTrait,
{
    let Some(sort) = J::sort_column() else {
        return Ok(0);
    };
    let max = J::find()
        .select_only()
        .column_as(sort.max(), "max_sort")
        .filter(scope.eq(scope_id))
        .into_tuple::<Option<i32>>()
        .one(db)
        .await?
        .flatten();
    Ok(max.map_or(0, |max| max.saturating_add(1)))
}

/// A query over the entities linked to one endpoint.
///
/// Building it runs nothing; each call to [`Self::all`], [`Self::count`] or
/// [`Self::pages`] executes it afresh, so the same value can be reused.
#[derive(Clone, Debug)]
pub struct AssociatedQuery<E: EntityTrait> {
    select: Select<E>,
}

impl<E> AssociatedQuery<E>
where
    E: EntityTrait,
    E::Model: Send + Sync + 'static,
{
    /// Fetches all linked rows.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn all<C: ConnectionTrait>(&self, db: &C) -> Result<Vec<E::Model>> {
        self.select.clone().all(db).await.map_err(Into::into)
    }

    /// Counts linked rows.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn count<C: ConnectionTrait>(&self, db: &C) -> Result<u64> {
        self.select.clone().count(db).await.map_err(Into::into)
    }

    /// Pages through linked rows, `per_page` at a time, keeping the ordering.
    pub fn pages<'db, C: ConnectionTrait>(
        &self,
        db: &'db C,
        per_page: u64,
    ) -> Paginator<'db, C, SelectModel<E::Model>> {
        self.select.clone().paginate(db, per_page)
    }

    /// The underlying select, for callers that need extra filters.
    #[must_use]
    pub fn into_select(self) -> Select<E> {
        self.select
    }
}

/// Targets linked to `owner_id`, ordered by the junction's `sort` column ascending
/// when it has one, then by target id.
#[must_use]
pub fn list_associated<J: Junction>(owner_id: i64) -> AssociatedQuery<J::Target> {
    let mut select = J::Target::find()
        .inner_join(J::default())
        .filter(J::owner_column().eq(owner_id));
    if let Some(sort) = J::sort_column() {
        select = select.order_by_asc(sort);
    }
    AssociatedQuery {
        select: select.order_by_asc(J::target_id_column()),
    }
}

/// Owners linked to `target_id`, ordered like [`list_associated`]: by `sort` when the
/// junction has one, then by owner id.
#[must_use]
pub fn list_owners<J: Junction>(target_id: i64) -> AssociatedQuery<J::Owner> {
    let mut select = J::Owner::find()
        .inner_join(J::default())
        .filter(J::target_column().eq(target_id));
    if let Some(sort) = J::sort_column() {
        select = select.order_by_asc(sort);
    }
    AssociatedQuery {
        select: select.order_by_asc(J::owner_id_column()),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::{
        Article, ArticleTag, BannerSection, ProductPropertyValue, PropertyLink,
        PropertyPropertyValue, Tag, article_tag, product_property_value,
    };
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase, ModelTrait};

    #[tokio::test]
    async fn test_detach_scenario_from_empty_junction() -> Result<()> {
        init_test_tracing();
        let db = setup_test_db().await?;
        let article = create_test_article(&db, "first-post").await?;
        let tag = create_test_tag(&db, "rust").await?;

        let outcome = detach::<ArticleTag, _>(&db, article.id, tag.id).await?;
        assert_eq!(outcome, DetachOutcome::AlreadyAbsent);

        let attached = attach::<ArticleTag, _>(&db, article.id, tag.id, None).await?;
        assert_eq!(attached, AttachResult::Created);

        let outcome = detach::<ArticleTag, _>(&db, article.id, tag.id).await?;
        assert_eq!(outcome, DetachOutcome::Removed);

        let outcome = detach::<ArticleTag, _>(&db, article.id, tag.id).await?;
        assert_eq!(outcome, DetachOutcome::AlreadyAbsent);

        Ok(())
    }

    #[tokio::test]
    async fn test_detach_after_related_row_is_gone() -> Result<()> {
        let db = setup_test_db().await?;
        let article = create_test_article(&db, "post").await?;
        let tag = create_test_tag(&db, "gone").await?;
        let tag_id = tag.id;
        attach::<ArticleTag, _>(&db, article.id, tag_id, None).await?;

        tag.delete(&db).await?;

        let outcome = detach::<ArticleTag, _>(&db, article.id, tag_id).await?;
        assert_eq!(outcome, DetachOutcome::AlreadyAbsent);

        let outcome = detach::<ArticleTag, _>(&db, article.id, 424_242).await?;
        assert_eq!(outcome, DetachOutcome::AlreadyAbsent);
        Ok(())
    }

    #[tokio::test]
    async fn test_attach_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let article = create_test_article(&db, "post").await?;
        let tag = create_test_tag(&db, "dup").await?;

        let first = attach::<ArticleTag, _>(&db, article.id, tag.id, None).await?;
        let second = attach::<ArticleTag, _>(&db, article.id, tag.id, None).await?;
        assert_eq!(first, AttachResult::Created);
        assert_eq!(second, AttachResult::Unchanged);

        let rows = ArticleTag::find()
            .filter(article_tag::Column::ArticleId.eq(article.id))
            .filter(article_tag::Column::TagId.eq(tag.id))
            .count(&db)
            .await?;
        assert_eq!(rows, 1);

        // A junction without pivot columns has nothing to rewrite
        let third = attach::<ArticleTag, _>(&db, article.id, tag.id, Some(&())).await?;
        assert_eq!(third, AttachResult::Unchanged);
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_attach_has_one_winner() -> Result<()> {
        init_test_tracing();
        let (db, dir) = setup_file_test_db("concurrent-attach").await?;
        let article = create_test_article(&db, "race").await?;
        let tag = create_test_tag(&db, "contended").await?;

        let pool = db.get_sqlite_connection_pool().clone();
        let handles: Vec<_> = (0..12)
            .map(|_| {
                let db = sea_orm::SqlxSqliteConnector::from_sqlx_sqlite_pool(pool.clone());
                let (article_id, tag_id) = (article.id, tag.id);
                tokio::spawn(async move {
                    attach::<ArticleTag, _>(&db, article_id, tag_id, None).await
                })
            })
            .collect();

        let (mut created, mut unchanged, mut other) = (0, 0, 0);
        for handle in handles {
            match handle.await.unwrap() {
                Ok(AttachResult::Created) => created += 1,
                Ok(AttachResult::Unchanged) => unchanged += 1,
                Ok(AttachResult::Updated) | Err(_) => other += 1,
            }
        }
        assert_eq!((created, unchanged, other), (1, 11, 0));

        let rows = ArticleTag::find()
            .filter(article_tag::Column::ArticleId.eq(article.id))
            .count(&db)
            .await?;
        assert_eq!(rows, 1);

        db.close().await?;
        std::fs::remove_dir_all(dir)?;
        Ok(())
    }

    #[tokio::test]
    async fn test_attach_with_pivot_upserts_sort() -> Result<()> {
        let db = setup_test_db().await?;
        let property = create_test_property(&db, "size").await?;
        let small = create_test_property_value(&db, "S").await?;

        let created =
            attach::<PropertyPropertyValue, _>(&db, property.id, small.id, Some(&SortOrder(5)))
                .await?;
        assert_eq!(created, AttachResult::Created);

        let updated =
            attach::<PropertyPropertyValue, _>(&db, property.id, small.id, Some(&SortOrder(1)))
                .await?;
        assert_eq!(updated, AttachResult::Updated);

        let link = PropertyPropertyValue::find_by_id((property.id, small.id))
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(link.sort, 1);

        let unchanged = attach::<PropertyPropertyValue, _>(&db, property.id, small.id, None).await?;
        assert_eq!(unchanged, AttachResult::Unchanged);
        let link = PropertyPropertyValue::find_by_id((property.id, small.id))
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(link.sort, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_pivot_does_not_create_links() -> Result<()> {
        let db = setup_test_db().await?;
        let banner = create_test_banner(&db, "Summer sale").await?;
        let section = create_test_section(&db, "hero").await?;

        let changed =
            update_pivot::<BannerSection, _>(&db, banner.id, section.id, &SortOrder(3)).await?;
        assert!(!changed);
        assert!(!is_attached::<BannerSection, _>(&db, banner.id, section.id).await?);

        attach::<BannerSection, _>(&db, banner.id, section.id, None).await?;
        let changed =
            update_pivot::<BannerSection, _>(&db, banner.id, section.id, &SortOrder(3)).await?;
        assert!(changed);

        let sections = list_associated::<BannerSection>(banner.id).all(&db).await?;
        assert_eq!(sections.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_product_pivot_carries_property_id() -> Result<()> {
        let db = setup_test_db().await?;
        let product = create_test_product(&db, "SKU-1").await?;
        let color = create_test_property(&db, "color").await?;
        let trim = create_test_property(&db, "trim-color").await?;
        let red = create_test_property_value(&db, "Red").await?;

        let link = PropertyLink {
            property_id: color.id,
        };
        attach::<ProductPropertyValue, _>(&db, product.id, red.id, Some(&link)).await?;
        let row = ProductPropertyValue::find_by_id((product.id, red.id))
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(row.property_id, Some(color.id));

        let relinked = PropertyLink {
            property_id: trim.id,
        };
        let result =
            attach::<ProductPropertyValue, _>(&db, product.id, red.id, Some(&relinked)).await?;
        assert_eq!(result, AttachResult::Updated);
        let row = ProductPropertyValue::find_by_id((product.id, red.id))
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(row.property_id, Some(trim.id));

        // Deleting the property referenced only by the pivot cascades too
        trim.delete(&db).await?;
        let remaining = ProductPropertyValue::find()
            .filter(product_property_value::Column::ProductId.eq(product.id))
            .count(&db)
            .await?;
        assert_eq!(remaining, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_attach_to_missing_target_fails() -> Result<()> {
        let db = setup_test_db().await?;
        let article = create_test_article(&db, "post").await?;

        let result = attach::<ArticleTag, _>(&db, article.id, 9_999, None).await;
        assert!(matches!(
            result,
            Err(Error::OperationFailed {
                action: "attach",
                related_id: 9_999,
                ..
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_detach_storage_failure_is_reported() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_exec_errors([DbErr::Custom("connection reset".to_string())])
            .into_connection();

        let result = detach::<ArticleTag, _>(&db, 1, 5).await;
        match result {
            Err(Error::OperationFailed {
                relation,
                action,
                owner_id,
                related_id,
                ..
            }) => {
                assert_eq!(relation, "article_tag");
                assert_eq!(action, "detach");
                assert_eq!((owner_id, related_id), (1, 5));
            }
            other => panic!("expected OperationFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cascade_removes_junction_rows() -> Result<()> {
        let db = setup_test_db().await?;
        let kept = create_test_article(&db, "kept").await?;
        let doomed = create_test_article(&db, "doomed").await?;
        let rust = create_test_tag(&db, "rust").await?;
        let sql = create_test_tag(&db, "sql").await?;

        attach::<ArticleTag, _>(&db, kept.id, rust.id, None).await?;
        attach::<ArticleTag, _>(&db, kept.id, sql.id, None).await?;
        attach::<ArticleTag, _>(&db, doomed.id, rust.id, None).await?;

        Article::delete_by_id(doomed.id).exec(&db).await?;
        assert!(list_associated::<ArticleTag>(doomed.id).all(&db).await?.is_empty());

        Tag::delete_by_id(sql.id).exec(&db).await?;
        let links = ArticleTag::find().all(&db).await?;
        assert_eq!(
            links,
            vec![article_tag::Model {
                article_id: kept.id,
                tag_id: rust.id,
            }]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_list_associated_orders_by_sort_then_id() -> Result<()> {
        let db = setup_test_db().await?;
        let size = create_test_property(&db, "size").await?;
        let small = create_test_property_value(&db, "S").await?;
        let medium = create_test_property_value(&db, "M").await?;
        let large = create_test_property_value(&db, "L").await?;

        attach::<PropertyPropertyValue, _>(&db, size.id, large.id, Some(&SortOrder(3))).await?;
        attach::<PropertyPropertyValue, _>(&db, size.id, small.id, Some(&SortOrder(1))).await?;
        attach::<PropertyPropertyValue, _>(&db, size.id, medium.id, Some(&SortOrder(1))).await?;

        let query = list_associated::<PropertyPropertyValue>(size.id);
        let values: Vec<String> = query.all(&db).await?.into_iter().map(|v| v.value).collect();
        assert_eq!(values, vec!["S", "M", "L"]);

        // Restartable: the same query runs again with the same result
        assert_eq!(query.count(&db).await?, 3);
        assert_eq!(query.all(&db).await?.len(), 3);

        let mut pages = query.pages(&db, 2);
        let first = pages.fetch_and_next().await?.unwrap();
        let second = pages.fetch_and_next().await?.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].id, large.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_associated_without_sort_uses_target_id() -> Result<()> {
        let db = setup_test_db().await?;
        let article = create_test_article(&db, "post").await?;
        let first = create_test_tag(&db, "a").await?;
        let second = create_test_tag(&db, "b").await?;

        attach::<ArticleTag, _>(&db, article.id, second.id, None).await?;
        attach::<ArticleTag, _>(&db, article.id, first.id, None).await?;

        let tags = list_associated::<ArticleTag>(article.id).all(&db).await?;
        assert_eq!(tags, vec![first, second]);

        let empty = list_associated::<ArticleTag>(article.id + 100).all(&db).await?;
        assert!(empty.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_list_owners() -> Result<()> {
        let db = setup_test_db().await?;
        let one = create_test_article(&db, "one").await?;
        let two = create_test_article(&db, "two").await?;
        let tag = create_test_tag(&db, "shared").await?;

        attach::<ArticleTag, _>(&db, two.id, tag.id, None).await?;
        attach::<ArticleTag, _>(&db, one.id, tag.id, None).await?;

        let owners = list_owners::<ArticleTag>(tag.id).all(&db).await?;
        assert_eq!(owners, vec![one, two]);
        Ok(())
    }

    #[tokio::test]
    async fn test_sync_replaces_link_set() -> Result<()> {
        let db = setup_test_db().await?;
        let article = create_test_article(&db, "post").await?;
        let a = create_test_tag(&db, "a").await?;
        let b = create_test_tag(&db, "b").await?;
        let c = create_test_tag(&db, "c").await?;

        attach::<ArticleTag, _>(&db, article.id, a.id, None).await?;
        attach::<ArticleTag, _>(&db, article.id, b.id, None).await?;

        let report = sync::<ArticleTag>(&db, article.id, &[b.id, c.id]).await?;
        assert_eq!(report.attached, vec![c.id]);
        assert_eq!(report.detached, vec![a.id]);
        assert_eq!(report.unchanged, vec![b.id]);

        let again = sync::<ArticleTag>(&db, article.id, &[c.id, b.id]).await?;
        assert!(again.is_noop());

        let tags = list_associated::<ArticleTag>(article.id).all(&db).await?;
        assert_eq!(tags, vec![b, c]);
        Ok(())
    }

    #[tokio::test]
    async fn test_sync_rolls_back_on_failure() -> Result<()> {
        let db = setup_test_db().await?;
        let article = create_test_article(&db, "post").await?;
        let a = create_test_tag(&db, "a").await?;
        attach::<ArticleTag, _>(&db, article.id, a.id, None).await?;

        let result = sync::<ArticleTag>(&db, article.id, &[9_999]).await;
        assert!(matches!(result, Err(Error::OperationFailed { .. })));

        assert!(is_attached::<ArticleTag, _>(&db, article.id, a.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_detach_all() -> Result<()> {
        let db = setup_test_db().await?;
        let article = create_test_article(&db, "post").await?;
        let a = create_test_tag(&db, "a").await?;
        let b = create_test_tag(&db, "b").await?;
        attach::<ArticleTag, _>(&db, article.id, a.id, None).await?;
        attach::<ArticleTag, _>(&db, article.id, b.id, None).await?;

        assert_eq!(detach_all::<ArticleTag, _>(&db, article.id).await?, 2);
        assert_eq!(detach_all::<ArticleTag, _>(&db, article.id).await?, 0);
        Ok(())
    }
}
