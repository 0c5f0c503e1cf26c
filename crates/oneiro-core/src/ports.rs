//! Storage and gateway port traits.
//!
//! Implemented by `oneiro-postgres` (stores) and `oneiro-llm`
//! (interpreters) — the workflow depends only on these traits, so tests
//! inject in-memory doubles instead of a live backend.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::types::{DreamRecord, DreamStatus, OperationKind, Profile};

/// Credit ledger over per-user profile rows.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Return the profile for `user_id`, creating it with the default
    /// credit grant if absent. Storage failures propagate — the ledger
    /// never hides a transport error behind a default balance.
    async fn fetch_or_create(&self, user_id: &str) -> Result<Profile>;

    /// Deduct one credit and return the persisted balance.
    ///
    /// Precondition: `current_balance > 0`, otherwise
    /// `DreamError::InsufficientCredits` without touching storage. The
    /// write itself is a single conditional decrement guarded by
    /// `credits > 0`, so two concurrent deductions from the same balance
    /// can never both succeed against the same credit.
    async fn deduct_credit(&self, user_id: &str, current_balance: i32) -> Result<i32>;
}

/// Store for dream records keyed by an explicit per-attempt id.
#[async_trait]
pub trait DreamStore: Send + Sync {
    /// Insert a new `pending` record and return it with its generated id.
    async fn create_pending(&self, user_id: &str, dream_text: &str) -> Result<DreamRecord>;

    /// Transition the record out of `pending`, exactly once.
    ///
    /// `status` must be a terminal state; resolving a record that is not
    /// `pending` (already resolved, or never created) fails with
    /// `DreamError::Conflict`.
    async fn resolve(
        &self,
        dream_id: Uuid,
        status: DreamStatus,
        interpretation: Option<&str>,
    ) -> Result<DreamRecord>;

    /// Recent records for a user, most recent first.
    async fn list_for_user(&self, user_id: &str, limit: i64) -> Result<Vec<DreamRecord>>;
}

/// Best-effort audit trail. Callers swallow failures — a lost log entry
/// never fails the operation that produced it.
#[async_trait]
pub trait OperationLogStore: Send + Sync {
    async fn record(
        &self,
        user_id: &str,
        operation: OperationKind,
        details: serde_json::Value,
    ) -> Result<()>;
}

/// The interpretation gateway: dream text in, interpretation text out.
///
/// One attempt per submission — no retry (a retry could double-charge),
/// no streaming, no cancellation.
#[async_trait]
pub trait Interpreter: Send + Sync {
    async fn interpret(&self, dream_text: &str) -> Result<String>;
}
