//! Postgres adapters for the profile ledger, dream records and the
//! operation log.

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use oneiro_core::error::{DreamError, Result};
use oneiro_core::ports::{DreamStore, OperationLogStore, ProfileStore};
use oneiro_core::types::{DreamRecord, DreamStatus, OperationKind, Profile, DEFAULT_CREDIT_GRANT};

/// Row shape shared by every dreams query; status comes back as text and
/// is parsed on the way out.
#[derive(sqlx::FromRow)]
struct PgDreamRow {
    id: Uuid,
    user_id: String,
    dream_text: String,
    status: String,
    interpretation: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PgDreamRow> for DreamRecord {
    type Error = String;

    fn try_from(row: PgDreamRow) -> std::result::Result<Self, Self::Error> {
        Ok(DreamRecord {
            id: row.id,
            user_id: row.user_id,
            dream_text: row.dream_text,
            status: row.status.parse::<DreamStatus>()?,
            interpretation: row.interpretation,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_record(row: PgDreamRow) -> Result<DreamRecord> {
    row.try_into().map_err(|e: String| DreamError::Storage(anyhow!(e)))
}

const DREAM_COLUMNS: &str = "id, user_id, dream_text, status, interpretation, created_at, updated_at";

// ── PgProfileStore ────────────────────────────────────────────

/// Postgres-backed credit ledger.
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn fetch_or_create(&self, user_id: &str) -> Result<Profile> {
        // Lazy default grant: the insert is a no-op for existing rows, so
        // exactly one profile ever exists per user id.
        sqlx::query(
            r#"
            INSERT INTO profiles (id, credits)
            VALUES ($1, $2)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(DEFAULT_CREDIT_GRANT)
        .execute(&self.pool)
        .await
        .map_err(|e| DreamError::Storage(anyhow!(e)))?;

        let profile = sqlx::query_as::<_, (String, i32, DateTime<Utc>, DateTime<Utc>)>(
            r#"
            SELECT id, credits, created_at, updated_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DreamError::Storage(anyhow!(e)))?;

        Ok(Profile {
            id: profile.0,
            credits: profile.1,
            created_at: profile.2,
            updated_at: profile.3,
        })
    }

    async fn deduct_credit(&self, user_id: &str, current_balance: i32) -> Result<i32> {
        if current_balance <= 0 {
            return Err(DreamError::InsufficientCredits);
        }

        // One conditional round trip: the stored balance decides, never a
        // client-computed subtraction. Concurrent deductions serialize on
        // the row and the guard stops the loser at zero.
        let credits = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE profiles
            SET credits = credits - 1, updated_at = now()
            WHERE id = $1 AND credits > 0
            RETURNING credits
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DreamError::Storage(anyhow!(e)))?;

        credits.ok_or(DreamError::InsufficientCredits)
    }
}

// ── PgDreamStore ──────────────────────────────────────────────

/// Postgres-backed dream record store, keyed by an explicit per-attempt id.
pub struct PgDreamStore {
    pool: PgPool,
}

impl PgDreamStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DreamStore for PgDreamStore {
    async fn create_pending(&self, user_id: &str, dream_text: &str) -> Result<DreamRecord> {
        let row = sqlx::query_as::<_, PgDreamRow>(&format!(
            r#"
            INSERT INTO dreams (id, user_id, dream_text, status)
            VALUES ($1, $2, $3, 'pending')
            RETURNING {DREAM_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(dream_text)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DreamError::Storage(anyhow!(e)))?;

        into_record(row)
    }

    async fn resolve(
        &self,
        dream_id: Uuid,
        status: DreamStatus,
        interpretation: Option<&str>,
    ) -> Result<DreamRecord> {
        if !status.is_resolved() {
            return Err(DreamError::InvalidInput(
                "cannot resolve a dream back to pending".into(),
            ));
        }

        // Guarded by status = 'pending': a record resolves exactly once,
        // a replay surfaces as Conflict instead of a silent overwrite.
        let row = sqlx::query_as::<_, PgDreamRow>(&format!(
            r#"
            UPDATE dreams
            SET status = $2, interpretation = $3, updated_at = now()
            WHERE id = $1 AND status = 'pending'
            RETURNING {DREAM_COLUMNS}
            "#,
        ))
        .bind(dream_id)
        .bind(status.as_str())
        .bind(interpretation)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DreamError::Storage(anyhow!(e)))?;

        match row {
            Some(row) => into_record(row),
            None => Err(DreamError::Conflict(format!(
                "dream {} not found or already resolved",
                dream_id
            ))),
        }
    }

    async fn list_for_user(&self, user_id: &str, limit: i64) -> Result<Vec<DreamRecord>> {
        let rows = sqlx::query_as::<_, PgDreamRow>(&format!(
            r#"
            SELECT {DREAM_COLUMNS}
            FROM dreams
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DreamError::Storage(anyhow!(e)))?;

        rows.into_iter().map(into_record).collect()
    }
}

// ── PgOperationLogStore ───────────────────────────────────────

/// Append-only audit log.
pub struct PgOperationLogStore {
    pool: PgPool,
}

impl PgOperationLogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OperationLogStore for PgOperationLogStore {
    async fn record(
        &self,
        user_id: &str,
        operation: OperationKind,
        details: serde_json::Value,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO operation_logs (id, user_id, operation_type, details)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(operation.as_str())
        .bind(details)
        .execute(&self.pool)
        .await
        .map_err(|e| DreamError::Storage(anyhow!(e)))?;

        Ok(())
    }
}

// ── PgStores ──────────────────────────────────────────────────

/// All adapters over one shared pool.
pub struct PgStores {
    pub profiles: Arc<PgProfileStore>,
    pub dreams: Arc<PgDreamStore>,
    pub logs: Arc<PgOperationLogStore>,
}

impl PgStores {
    pub fn new(pool: PgPool) -> Self {
        Self {
            profiles: Arc::new(PgProfileStore::new(pool.clone())),
            dreams: Arc::new(PgDreamStore::new(pool.clone())),
            logs: Arc::new(PgOperationLogStore::new(pool)),
        }
    }
}
