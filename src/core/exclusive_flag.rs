//! Exclusive boolean flag enforcement.
//!
//! Some collections allow at most one row to carry a flag, for example the default
//! currency. The write path calls [`enforce_before_commit`] on its open transaction
//! right before persisting a row; when that row is about to hold the flag, every
//! sibling loses it and the row's flag-set timestamp is stamped if it was never set.
//! The caller then writes the row and commits, so both changes land together or not
//! at all.

use crate::errors::Result;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection,
    DatabaseTransaction, EntityTrait, IsolationLevel, QueryFilter, QuerySelect, TransactionTrait,
    sea_query::Expr,
};
use tracing::{debug, info, instrument};

/// An active model whose entity has one exclusive flag column.
pub trait ExclusiveFlag: ActiveModelTrait + Send {
    /// The boolean column at most one row may hold `true` in
    fn flag_column() -> <Self::Entity as EntityTrait>::Column;

    /// Nullable timestamp recording when a row first held the flag
    fn flag_set_at_column() -> <Self::Entity as EntityTrait>::Column;

    /// Primary key column
    fn id_column() -> <Self::Entity as EntityTrait>::Column;

    /// Flag value about to be written; `None` when not part of this write.
    fn flag(&self) -> Option<bool>;

    /// Row id, `None` for a row that has not been inserted yet.
    fn row_id(&self) -> Option<i64>;

    /// Timestamp carried by this active model; `None` when it is not loaded.
    fn flag_set_at(&self) -> Option<Option<DateTime<Utc>>>;

    /// Stamps the flag-set timestamp.
    fn set_flag_set_at(&mut self, at: DateTime<Utc>);
}

/// What [`enforce_before_commit`] did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Enforcement {
    /// The row is not taking the flag; nothing was touched
    Skipped,
    /// The row takes the flag
    Applied {
        /// Siblings that held the flag and were cleared
        siblings_cleared: u64,
        /// Whether the flag-set timestamp was stamped by this write
        stamped: bool,
    },
}

/// Opens the transaction an exclusive-flag write runs in.
///
/// Serializable where the backend lets us pick; `SQLite` transactions are
/// serializable already and reject an explicit level.
///
/// # Errors
/// Returns an error if the transaction cannot be started.
pub async fn begin_flag_transaction(db: &DatabaseConnection) -> Result<DatabaseTransaction> {
    let isolation = match db.get_database_backend() {
        DatabaseBackend::Sqlite => None,
        _ => Some(IsolationLevel::Serializable),
    };
    db.begin_with_config(isolation, None)
        .await
        .map_err(Into::into)
}

/// Pre-commit hook for rows carrying an exclusive flag.
///
/// Must run on the same transaction that persists `active`. Does nothing unless the
/// pending flag value is `true`. Otherwise it clears the flag on every other row (all
/// rows when `active` has no id yet) and stamps the flag-set timestamp if the row has
/// never held the flag. An existing timestamp is kept; when the active model does not
/// carry it, the stored value is read first.
///
/// # Errors
/// Returns an error if any statement fails. The caller must then drop the
/// transaction so that no partial state is committed.
#[instrument(skip_all, fields(row_id = ?active.row_id()))]
pub async fn enforce_before_commit<C, A>(conn: &C, active: &mut A) -> Result<Enforcement>
where
    C: ConnectionTrait,
    A: ExclusiveFlag,
{
    if active.flag() != Some(true) {
        return Ok(Enforcement::Skipped);
    }

    let mut clear = <A::Entity as EntityTrait>::update_many()
        .col_expr(A::flag_column(), Expr::value(false))
        .filter(A::flag_column().eq(true));
    if let Some(id) = active.row_id() {
        clear = clear.filter(A::id_column().ne(id));
    }
    let siblings_cleared = clear.exec(conn).await?.rows_affected;

    let current = match (active.flag_set_at(), active.row_id()) {
        (Some(at), _) => at,
        (None, Some(id)) => stored_flag_set_at::<C, A>(conn, id).await?,
        (None, None) => None,
    };
    let stamped = current.is_none();
    if stamped {
        active.set_flag_set_at(Utc::now());
    }

    if siblings_cleared > 0 {
        info!(siblings_cleared, "Moved exclusive flag");
    }
    debug!(stamped, "Exclusive flag enforced");
    Ok(Enforcement::Applied {
        siblings_cleared,
        stamped,
    })
}

async fn stored_flag_set_at<C, A>(conn: &C, id: i64) -> Result<Option<DateTime<Utc>>>
where
    C: ConnectionTrait,
    A: ExclusiveFlag,
{
    let stored = <A::Entity as EntityTrait>::find()
        .select_only()
        .column(A::flag_set_at_column())
        .filter(A::id_column().eq(id))
        .into_tuple::<Option<DateTime<Utc>>>()
        .one(conn)
        .await?;
    Ok(stored.flatten())
}
