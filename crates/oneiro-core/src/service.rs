//! The dream submission workflow.
//!
//! Sequences ensure-profile → create-pending → interpret → resolve →
//! deduct-credit over the port traits. All remote calls are strictly
//! sequential; the credit deduction happens only after a successful
//! interpretation has been obtained and recorded, and at most once per
//! submission.
//!
//! Error policy: validation and credit errors abort before any record is
//! created; interpretation errors are fatal to the submission (record
//! marked `failed`, no deduction); dream-record and operation-log writes
//! are bookkeeping and never block the flow — failures there are logged
//! and swallowed.

use std::sync::Arc;

use serde_json::json;

use crate::error::{DreamError, Result};
use crate::ports::{DreamStore, Interpreter, OperationLogStore, ProfileStore};
use crate::types::{DreamRecord, DreamStatus, OperationKind, SubmissionOutcome};

pub struct DreamService {
    profiles: Arc<dyn ProfileStore>,
    dreams: Arc<dyn DreamStore>,
    logs: Arc<dyn OperationLogStore>,
    interpreter: Arc<dyn Interpreter>,
}

impl DreamService {
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        dreams: Arc<dyn DreamStore>,
        logs: Arc<dyn OperationLogStore>,
        interpreter: Arc<dyn Interpreter>,
    ) -> Self {
        Self {
            profiles,
            dreams,
            logs,
            interpreter,
        }
    }

    /// Current balance for a user, creating the profile lazily on first
    /// access.
    pub async fn fetch_credits(&self, user_id: &str) -> Result<i32> {
        let profile = self.profiles.fetch_or_create(user_id).await?;
        Ok(profile.credits)
    }

    /// Recent dream records for a user, most recent first.
    pub async fn recent_dreams(&self, user_id: &str, limit: i64) -> Result<Vec<DreamRecord>> {
        self.dreams.list_for_user(user_id, limit).await
    }

    /// Run one full submission.
    pub async fn submit_dream(&self, user_id: &str, dream_text: &str) -> Result<SubmissionOutcome> {
        let text = dream_text.trim();
        if text.is_empty() {
            return Err(DreamError::InvalidInput(
                "dream text must not be empty".into(),
            ));
        }

        let profile = self.profiles.fetch_or_create(user_id).await?;
        if profile.credits < 1 {
            return Err(DreamError::InsufficientCredits);
        }

        // The pending record always precedes the gateway call. Its
        // creation is bookkeeping: a failure here must not block the
        // interpretation.
        let pending = match self.dreams.create_pending(user_id, text).await {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("failed to create pending dream record for {}: {}", user_id, e);
                None
            }
        };

        let interpretation = match self.interpreter.interpret(text).await {
            Ok(interpretation) => interpretation,
            Err(err) => {
                if let Some(record) = &pending {
                    if let Err(e) = self
                        .dreams
                        .resolve(record.id, DreamStatus::Failed, None)
                        .await
                    {
                        tracing::warn!("failed to mark dream {} as failed: {}", record.id, e);
                    }
                }
                self.log_best_effort(
                    user_id,
                    OperationKind::Error,
                    json!({
                        "operation": OperationKind::DreamOperation.as_str(),
                        "error": err.to_string(),
                    }),
                )
                .await;
                return Err(err);
            }
        };

        // Record success before touching the balance, so a credit is only
        // ever spent on an interpretation that was obtained and recorded.
        if let Some(record) = &pending {
            if let Err(e) = self
                .dreams
                .resolve(record.id, DreamStatus::Success, Some(&interpretation))
                .await
            {
                tracing::error!("failed to mark dream {} as success: {}", record.id, e);
            }
        }

        let credits = match self.profiles.deduct_credit(user_id, profile.credits).await {
            Ok(remaining) => {
                self.log_best_effort(
                    user_id,
                    OperationKind::CreditDeduction,
                    json!({
                        "previous_credits": profile.credits,
                        "new_credits": remaining,
                        "action": "dream_interpretation",
                    }),
                )
                .await;
                remaining
            }
            Err(e) => {
                // The interpretation has already been produced and will be
                // shown; surface the stale balance instead of rolling back.
                tracing::error!("credit deduction failed for {}: {}", user_id, e);
                profile.credits
            }
        };

        self.log_best_effort(
            user_id,
            OperationKind::DreamOperation,
            json!({
                "dream_id": pending.as_ref().map(|r| r.id),
                "status": DreamStatus::Success,
                "interpretation_length": interpretation.len(),
            }),
        )
        .await;

        Ok(SubmissionOutcome {
            dream_id: pending.map(|r| r.id),
            interpretation,
            credits,
        })
    }

    async fn log_best_effort(
        &self,
        user_id: &str,
        operation: OperationKind,
        details: serde_json::Value,
    ) {
        if let Err(e) = self.logs.record(user_id, operation, details).await {
            tracing::warn!(
                "failed to record {} operation log for {}: {}",
                operation.as_str(),
                user_id,
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Profile, DEFAULT_CREDIT_GRANT};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    struct MemProfiles {
        credits: Mutex<HashMap<String, i32>>,
        fail_deduct: bool,
    }

    impl MemProfiles {
        fn with_balance(user_id: &str, credits: i32) -> Self {
            let store = Self::default();
            store.credits.lock().unwrap().insert(user_id.into(), credits);
            store
        }

        fn balance(&self, user_id: &str) -> Option<i32> {
            self.credits.lock().unwrap().get(user_id).copied()
        }

        fn profile_count(&self) -> usize {
            self.credits.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ProfileStore for MemProfiles {
        async fn fetch_or_create(&self, user_id: &str) -> Result<Profile> {
            let mut credits = self.credits.lock().unwrap();
            let balance = *credits
                .entry(user_id.to_string())
                .or_insert(DEFAULT_CREDIT_GRANT);
            let now = Utc::now();
            Ok(Profile {
                id: user_id.to_string(),
                credits: balance,
                created_at: now,
                updated_at: now,
            })
        }

        async fn deduct_credit(&self, user_id: &str, current_balance: i32) -> Result<i32> {
            if current_balance <= 0 {
                return Err(DreamError::InsufficientCredits);
            }
            if self.fail_deduct {
                return Err(DreamError::Storage(anyhow::anyhow!("write refused")));
            }
            let mut credits = self.credits.lock().unwrap();
            let balance = credits
                .get_mut(user_id)
                .ok_or_else(|| DreamError::NotFound(user_id.to_string()))?;
            // Mirrors the conditional decrement: the stored balance, not
            // the caller's snapshot, decides.
            if *balance <= 0 {
                return Err(DreamError::InsufficientCredits);
            }
            *balance -= 1;
            Ok(*balance)
        }
    }

    #[derive(Default)]
    struct MemDreams {
        records: Mutex<HashMap<Uuid, DreamRecord>>,
    }

    impl MemDreams {
        fn all(&self) -> Vec<DreamRecord> {
            self.records.lock().unwrap().values().cloned().collect()
        }
    }

    #[async_trait]
    impl DreamStore for MemDreams {
        async fn create_pending(&self, user_id: &str, dream_text: &str) -> Result<DreamRecord> {
            let now = Utc::now();
            let record = DreamRecord {
                id: Uuid::new_v4(),
                user_id: user_id.to_string(),
                dream_text: dream_text.to_string(),
                status: DreamStatus::Pending,
                interpretation: None,
                created_at: now,
                updated_at: now,
            };
            self.records
                .lock()
                .unwrap()
                .insert(record.id, record.clone());
            Ok(record)
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
            let mut records = self.records.lock().unwrap();
            let record = records.get_mut(&dream_id).ok_or_else(|| {
                DreamError::Conflict(format!("dream {} not found or already resolved", dream_id))
            })?;
            if record.status != DreamStatus::Pending {
                return Err(DreamError::Conflict(format!(
                    "dream {} not found or already resolved",
                    dream_id
                )));
            }
            record.status = status;
            record.interpretation = interpretation.map(|s| s.to_string());
            record.updated_at = Utc::now();
            Ok(record.clone())
        }

        async fn list_for_user(&self, user_id: &str, limit: i64) -> Result<Vec<DreamRecord>> {
            let mut records: Vec<_> = self
                .records
                .lock()
                .unwrap()
                .values()
                .filter(|r| r.user_id == user_id)
                .cloned()
                .collect();
            records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            records.truncate(limit as usize);
            Ok(records)
        }
    }

    #[derive(Default)]
    struct MemLogs {
        entries: Mutex<Vec<(String, &'static str, serde_json::Value)>>,
    }

    #[async_trait]
    impl OperationLogStore for MemLogs {
        async fn record(
            &self,
            user_id: &str,
            operation: OperationKind,
            details: serde_json::Value,
        ) -> Result<()> {
            self.entries
                .lock()
                .unwrap()
                .push((user_id.to_string(), operation.as_str(), details));
            Ok(())
        }
    }

    struct MockInterpreter {
        reply: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl MockInterpreter {
        fn replying(reply: &'static str) -> Self {
            Self {
                reply: Some(reply),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Interpreter for MockInterpreter {
        async fn interpret(&self, _dream_text: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Some(reply) => Ok(reply.to_string()),
                None => Err(DreamError::Interpretation("upstream unavailable".into())),
            }
        }
    }

    struct Harness {
        profiles: Arc<MemProfiles>,
        dreams: Arc<MemDreams>,
        interpreter: Arc<MockInterpreter>,
        service: DreamService,
    }

    fn harness(profiles: MemProfiles, interpreter: MockInterpreter) -> Harness {
        let profiles = Arc::new(profiles);
        let dreams = Arc::new(MemDreams::default());
        let interpreter = Arc::new(interpreter);
        let service = DreamService::new(
            profiles.clone(),
            dreams.clone(),
            Arc::new(MemLogs::default()),
            interpreter.clone(),
        );
        Harness {
            profiles,
            dreams,
            interpreter,
            service,
        }
    }

    #[tokio::test]
    async fn empty_text_is_rejected_before_any_call() {
        let h = harness(MemProfiles::default(), MockInterpreter::replying("x"));

        let err = h.service.submit_dream("user-1", "   ").await.unwrap_err();

        assert!(matches!(err, DreamError::InvalidInput(_)));
        assert_eq!(h.interpreter.call_count(), 0);
        assert!(h.dreams.all().is_empty());
        // Not even the profile lookup ran.
        assert_eq!(h.profiles.profile_count(), 0);
    }

    #[tokio::test]
    async fn insufficient_credits_blocks_before_the_gateway() {
        let h = harness(
            MemProfiles::with_balance("user-1", 0),
            MockInterpreter::replying("x"),
        );

        let err = h
            .service
            .submit_dream("user-1", "I was falling")
            .await
            .unwrap_err();

        assert!(matches!(err, DreamError::InsufficientCredits));
        assert_eq!(h.interpreter.call_count(), 0);
        assert!(h.dreams.all().is_empty());
    }

    #[tokio::test]
    async fn successful_flow_resolves_record_and_deducts_one_credit() {
        let h = harness(
            MemProfiles::with_balance("user-1", 3),
            MockInterpreter::replying("Flight dreams often reflect a sense of freedom."),
        );

        let outcome = h
            .service
            .submit_dream("user-1", "I was flying over a city")
            .await
            .unwrap();

        assert!(!outcome.interpretation.is_empty());
        assert_eq!(outcome.credits, 2);
        assert_eq!(h.profiles.balance("user-1"), Some(2));

        let records = h.dreams.all();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, DreamStatus::Success);
        assert_eq!(records[0].id, outcome.dream_id.unwrap());
        assert!(records[0].interpretation.as_deref().unwrap().len() > 0);
    }

    #[tokio::test]
    async fn failed_interpretation_marks_record_failed_and_keeps_balance() {
        let h = harness(
            MemProfiles::with_balance("user-1", 3),
            MockInterpreter::failing(),
        );

        let err = h
            .service
            .submit_dream("user-1", "I was flying over a city")
            .await
            .unwrap_err();

        assert!(matches!(err, DreamError::Interpretation(_)));
        assert_eq!(h.profiles.balance("user-1"), Some(3));

        let records = h.dreams.all();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, DreamStatus::Failed);
        assert!(records[0].interpretation.is_none());
    }

    #[tokio::test]
    async fn fetch_credits_creates_the_profile_exactly_once() {
        let h = harness(MemProfiles::default(), MockInterpreter::replying("x"));

        assert_eq!(h.service.fetch_credits("user-1").await.unwrap(), 5);
        assert_eq!(h.service.fetch_credits("user-1").await.unwrap(), 5);
        assert_eq!(h.profiles.profile_count(), 1);
    }

    #[tokio::test]
    async fn deduct_at_zero_fails_without_a_write() {
        let profiles = MemProfiles::with_balance("user-1", 0);

        let err = profiles.deduct_credit("user-1", 0).await.unwrap_err();

        assert!(matches!(err, DreamError::InsufficientCredits));
        assert_eq!(profiles.balance("user-1"), Some(0));
    }

    #[tokio::test]
    async fn resolving_a_submission_twice_is_a_conflict() {
        let dreams = MemDreams::default();
        let record = dreams.create_pending("user-1", "a recurring dream").await.unwrap();

        dreams
            .resolve(record.id, DreamStatus::Success, Some("interpreted"))
            .await
            .unwrap();
        let err = dreams
            .resolve(record.id, DreamStatus::Failed, None)
            .await
            .unwrap_err();

        assert!(matches!(err, DreamError::Conflict(_)));
        assert_eq!(dreams.all().len(), 1);
        assert_eq!(dreams.all()[0].status, DreamStatus::Success);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_deductions_never_double_spend() {
        let profiles = Arc::new(MemProfiles::with_balance("user-1", 1));

        // Both callers read the same starting balance, as two browser
        // sessions would. The conditional decrement lets exactly one win.
        let (a, b) = tokio::join!(
            profiles.deduct_credit("user-1", 1),
            profiles.deduct_credit("user-1", 1),
        );

        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
        assert_eq!(profiles.balance("user-1"), Some(0));
    }

    #[tokio::test]
    async fn deduction_failure_still_returns_the_interpretation() {
        let profiles = MemProfiles {
            credits: Mutex::new(HashMap::from([("user-1".to_string(), 3)])),
            fail_deduct: true,
        };
        let h = harness(profiles, MockInterpreter::replying("interpreted"));

        let outcome = h
            .service
            .submit_dream("user-1", "I was flying over a city")
            .await
            .unwrap();

        assert_eq!(outcome.interpretation, "interpreted");
        // Pre-deduction balance surfaces; nothing was decremented.
        assert_eq!(outcome.credits, 3);
        assert_eq!(h.profiles.balance("user-1"), Some(3));
        assert_eq!(h.dreams.all()[0].status, DreamStatus::Success);
    }

    #[tokio::test]
    async fn pending_create_failure_does_not_block_interpretation() {
        struct RefusingDreams;

        #[async_trait]
        impl DreamStore for RefusingDreams {
            async fn create_pending(&self, _: &str, _: &str) -> Result<DreamRecord> {
                Err(DreamError::Storage(anyhow::anyhow!("insert refused")))
            }

            async fn resolve(
                &self,
                dream_id: Uuid,
                _: DreamStatus,
                _: Option<&str>,
            ) -> Result<DreamRecord> {
                Err(DreamError::Conflict(format!(
                    "dream {} not found or already resolved",
                    dream_id
                )))
            }

            async fn list_for_user(&self, _: &str, _: i64) -> Result<Vec<DreamRecord>> {
                Ok(Vec::new())
            }
        }

        let profiles = Arc::new(MemProfiles::with_balance("user-1", 2));
        let service = DreamService::new(
            profiles.clone(),
            Arc::new(RefusingDreams),
            Arc::new(MemLogs::default()),
            Arc::new(MockInterpreter::replying("interpreted")),
        );

        let outcome = service
            .submit_dream("user-1", "I was flying over a city")
            .await
            .unwrap();

        assert!(outcome.dream_id.is_none());
        assert_eq!(outcome.interpretation, "interpreted");
        assert_eq!(outcome.credits, 1);
    }
}
