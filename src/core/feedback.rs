//! User-facing feedback and audit logging for association changes.
//!
//! Request handlers turn the result of a link removal into one of three states:
//! removed, already removed, or failed. Only the last is an error; the benign no-op
//! gets its own calm message. Every outcome is written to the `audit` tracing target
//! with the acting user and both ids.

use crate::{
    core::association::{self, AttachResult, DetachOutcome, Junction},
    errors::Result,
};
use sea_orm::{ConnectionTrait, EntityTrait, IntoActiveModel};
use tracing::{error, info, warn};

/// What to tell the user after a removal request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemovalFeedback {
    /// The link existed and is gone now
    Removed,
    /// There was nothing to remove
    AlreadyRemoved,
    /// The removal could not be carried out
    Failed {
        /// Error text for logs and the response
        reason: String,
    },
}

impl RemovalFeedback {
    /// Maps a detach result onto the three feedback states.
    #[must_use]
    pub fn from_result(result: &Result<DetachOutcome>) -> Self {
        match result {
            Ok(DetachOutcome::Removed) => Self::Removed,
            Ok(DetachOutcome::AlreadyAbsent) => Self::AlreadyRemoved,
            Err(err) => Self::Failed {
                reason: err.to_string(),
            },
        }
    }

    /// Short label used in audit records.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Removed => "removed",
            Self::AlreadyRemoved => "already_removed",
            Self::Failed { .. } => "error",
        }
    }

    /// True only for [`RemovalFeedback::Failed`].
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Message shown to the user; `subject` names what was unlinked, e.g. `"Tag 'rust'"`.
    #[must_use]
    pub fn message(&self, subject: &str) -> String {
        match self {
            Self::Removed => format!("✅ {subject} removed."),
            Self::AlreadyRemoved => format!("ℹ️ {subject} was already removed."),
            Self::Failed { reason } => format!("❌ Could not remove {subject}: {reason}"),
        }
    }
}

/// Writes the audit record for a removal and returns the matching feedback.
pub fn audit_removal(
    actor: &str,
    relation: &'static str,
    owner_id: i64,
    related_id: i64,
    result: &Result<DetachOutcome>,
) -> RemovalFeedback {
    let feedback = RemovalFeedback::from_result(result);
    match &feedback {
        RemovalFeedback::Failed { reason } => error!(
            target: "audit",
            actor, relation, owner_id, related_id,
            outcome = feedback.label(),
            reason = %reason,
            "Link removal failed"
        ),
        _ => info!(
            target: "audit",
            actor, relation, owner_id, related_id,
            outcome = feedback.label(),
            "Link removal"
        ),
    }
    feedback
}

/// Writes the audit record for an attach. Storage failures log at error level,
/// rejected input at warn.
pub fn audit_attach(
    actor: &str,
    relation: &'static str,
    owner_id: i64,
    related_id: i64,
    result: &Result<AttachResult>,
) {
    match result {
        Ok(outcome) => info!(
            target: "audit",
            actor, relation, owner_id, related_id,
            outcome = ?outcome,
            "Link attach"
        ),
        Err(err) if err.is_storage_failure() => error!(
            target: "audit",
            actor, relation, owner_id, related_id,
            outcome = "error",
            reason = %err,
            "Link attach failed"
        ),
        Err(err) => warn!(
            target: "audit",
            actor, relation, owner_id, related_id,
            outcome = "rejected",
            reason = %err,
            "Link attach rejected"
        ),
    }
}

/// Detaches a link on behalf of `actor`, audits it and returns the feedback.
pub async fn detach_with_feedback<J, C>(
    db: &C,
    actor: &str,
    owner_id: i64,
    related_id: i64,
) -> RemovalFeedback
where
    J: Junction,
    C: ConnectionTrait,
{
    let result = association::detach::<J, C>(db, owner_id, related_id).await;
    audit_removal(actor, J::RELATION, owner_id, related_id, &result)
}

/// Attaches a link on behalf of `actor` and audits it.
///
/// # Errors
/// Propagates the attach error after auditing it.
pub async fn attach_with_audit<J, C>(
    db: &C,
    actor: &str,
    owner_id: i64,
    related_id: i64,
    pivot: Option<&J::Pivot>,
) -> Result<AttachResult>
where
    J: Junction,
    C: ConnectionTrait,
    <J as EntityTrait>::Model: IntoActiveModel<<J as EntityTrait>::ActiveModel>,
{
    let result = association::attach::<J, C>(db, owner_id, related_id, pivot).await;
    audit_attach(actor, J::RELATION, owner_id, related_id, &result);
    result
}
