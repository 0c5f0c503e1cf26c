//! Domain types for profiles, dream records and submission outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Credits granted when a profile is created lazily on first access.
pub const DEFAULT_CREDIT_GRANT: i32 = 5;

/// Lifecycle state of a dream record.
///
/// Created `pending` when a submission begins, resolved exactly once to
/// `success` (with interpretation attached) or `failed` (without).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DreamStatus {
    Pending,
    Success,
    Failed,
}

impl DreamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DreamStatus::Pending => "pending",
            DreamStatus::Success => "success",
            DreamStatus::Failed => "failed",
        }
    }

    /// True for the two terminal states.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, DreamStatus::Pending)
    }
}

impl fmt::Display for DreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DreamStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DreamStatus::Pending),
            "success" => Ok(DreamStatus::Success),
            "failed" => Ok(DreamStatus::Failed),
            other => Err(format!("unknown dream status: {}", other)),
        }
    }
}

/// Per-user record holding the credit balance.
///
/// The user id is opaque — issued by the external auth collaborator, never
/// generated here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub credits: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One interpretation attempt's persisted state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DreamRecord {
    /// Per-attempt submission id, generated at create time and passed
    /// through create → resolve.
    pub id: Uuid,
    pub user_id: String,
    pub dream_text: String,
    pub status: DreamStatus,
    pub interpretation: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of a successful dream submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    /// None when the pending record could not be persisted — the
    /// interpretation is still returned.
    pub dream_id: Option<Uuid>,
    pub interpretation: String,
    /// Balance after deduction; the pre-deduction balance if the
    /// deduction write failed after the interpretation succeeded.
    pub credits: i32,
}

/// Kinds of entries in the audit operation log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    CreditDeduction,
    DreamOperation,
    Error,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::CreditDeduction => "CREDIT_DEDUCTION",
            OperationKind::DreamOperation => "DREAM_OPERATION",
            OperationKind::Error => "ERROR",
        }
    }
}
