//! QUESTFLOW Test Utilities
//!
//! Shared test infrastructure for the QUESTFLOW workspace:
//! - Proptest generators for ids, XP, milestone tables and ledgers
//! - A store that fails every call, for error-path tests
//! - Fixtures for common scenarios
//! - Assertions for QUESTFLOW error variants

// Re-export the in-memory store from its source crate
pub use questflow_storage::InMemoryStore;

pub use questflow_core::{
    EntityKind, Milestone, MilestoneTable, NewProfile, NewReferralEvent, QuestCompletion,
    QuestError, QuestResult, ReferralClaim, ReferralEvent, ReferralLedger, RewardsConfig,
    RewardsError, StorageError, Ttrust, UserId, UserProfile, ValidationError,
};

use async_trait::async_trait;
use chrono::Utc;
use questflow_storage::{ProfileStore, QuestStore, ReferralStore};

// ============================================================================
// FAILING STORE
// ============================================================================

/// A store whose every operation fails with `StorageError::QueryFailed`,
/// standing in for an unreachable database.
#[derive(Debug, Clone, Default)]
pub struct FailingStore;

impl FailingStore {
    fn fail<T>(operation: &str) -> QuestResult<T> {
        Err(StorageError::QueryFailed {
            reason: format!("{}: connection refused", operation),
        }
        .into())
    }
}

#[async_trait]
impl ReferralStore for FailingStore {
    async fn referral_ledger(&self, _user_id: &UserId) -> QuestResult<ReferralLedger> {
        Self::fail("referral_ledger")
    }

    async fn referral_event_insert(&self, _event: &ReferralEvent) -> QuestResult<()> {
        Self::fail("referral_event_insert")
    }

    async fn referral_claim_list(&self, _user_id: &UserId) -> QuestResult<Vec<ReferralClaim>> {
        Self::fail("referral_claim_list")
    }

    async fn referral_claim(
        &self,
        _user_id: &UserId,
        _table: &MilestoneTable,
    ) -> QuestResult<ReferralClaim> {
        Self::fail("referral_claim")
    }
}

#[async_trait]
impl ProfileStore for FailingStore {
    async fn profile_get(&self, _user_id: &UserId) -> QuestResult<Option<UserProfile>> {
        Self::fail("profile_get")
    }

    async fn profile_insert(&self, _profile: &UserProfile) -> QuestResult<()> {
        Self::fail("profile_insert")
    }

    async fn profile_record_quest(
        &self,
        _user_id: &UserId,
        _quest: QuestCompletion,
    ) -> QuestResult<UserProfile> {
        Self::fail("profile_record_quest")
    }
}

#[async_trait]
impl QuestStore for FailingStore {
    async fn ping(&self) -> QuestResult<()> {
        Self::fail("ping")
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for QUESTFLOW inputs.

    use super::*;
    use proptest::prelude::*;

    /// Printable user ids, 1 to 32 chars, never blank after trimming.
    pub fn arb_user_id() -> impl Strategy<Value = UserId> {
        "[a-zA-Z0-9_@.-]{1,32}".prop_filter_map("valid user id", |raw| UserId::parse(&raw).ok())
    }

    /// Two distinct user ids.
    pub fn arb_user_pair() -> impl Strategy<Value = (UserId, UserId)> {
        (arb_user_id(), arb_user_id()).prop_filter("distinct users", |(a, b)| a != b)
    }

    /// XP totals across the whole tier range and a little beyond.
    pub fn arb_xp() -> impl Strategy<Value = u64> {
        prop_oneof![0u64..200, 0u64..2_000, 0u64..1_000_000]
    }

    /// XP for a single accepted quest completion.
    pub fn arb_quest_xp() -> impl Strategy<Value = u64> {
        questflow_core::MIN_QUEST_XP..=questflow_core::MAX_QUEST_XP
    }

    /// Valid milestone tables: 1 to 5 strictly increasing thresholds with
    /// positive bonuses.
    pub fn arb_milestone_table() -> impl Strategy<Value = MilestoneTable> {
        (
            prop::collection::vec((1u64..20, 1u64..1_000), 1..=5),
            1u64..50,
        )
            .prop_filter_map("valid milestone table", |(steps, interval)| {
                let mut threshold = 0;
                let milestones = steps
                    .into_iter()
                    .map(|(gap, bonus)| {
                        threshold += gap;
                        Milestone::new(threshold, Ttrust::from_hundredths(bonus))
                    })
                    .collect();
                MilestoneTable::new(milestones, interval).ok()
            })
    }

    /// A ledger whose claimed sum never exceeds what the default table pays.
    pub fn arb_ledger() -> impl Strategy<Value = ReferralLedger> {
        (0u64..200, 0u64..=100).prop_map(|(count, claimed_pct)| {
            let earned = MilestoneTable::default().total_earned(count).hundredths();
            ReferralLedger::new(count, Ttrust::from_hundredths(earned * claimed_pct / 100))
        })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built records for common scenarios.

    use super::*;
    use uuid::Uuid;

    pub fn user(id: &str) -> UserId {
        UserId::parse(id).unwrap_or_else(|e| panic!("invalid fixture user id {:?}: {}", id, e))
    }

    pub fn referral_event(referrer: &str, referred: &str) -> ReferralEvent {
        let new = NewReferralEvent::new(referrer, referred)
            .unwrap_or_else(|e| panic!("invalid fixture referral: {}", e));
        ReferralEvent::create(Uuid::now_v7(), new, Utc::now())
    }

    pub fn profile(user_id: &str) -> UserProfile {
        let new = NewProfile::new(user_id, Some("Test User".to_string()), None)
            .unwrap_or_else(|e| panic!("invalid fixture profile: {}", e));
        UserProfile::create(Uuid::now_v7(), new, Utc::now())
    }

    /// Store with `count` referrals credited to `referrer`.
    pub async fn store_with_referrals(referrer: &str, count: usize) -> InMemoryStore {
        let store = InMemoryStore::new();
        for i in 0..count {
            let event = referral_event(referrer, &format!("{}-referred-{}", referrer, i));
            store
                .referral_event_insert(&event)
                .await
                .unwrap_or_else(|e| panic!("seeding referral failed: {}", e));
        }
        store
    }

    /// Rewards config with the default milestones and a fixed link base.
    pub fn rewards_config() -> RewardsConfig {
        RewardsConfig {
            public_base_url: "https://questflow.test".to_string(),
            ..RewardsConfig::default()
        }
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for QUESTFLOW error variants.

    use super::*;

    #[track_caller]
    pub fn assert_no_rewards<T: std::fmt::Debug>(result: &QuestResult<T>) {
        match result {
            Err(QuestError::Rewards(RewardsError::NoRewardsAvailable)) => {}
            other => panic!("Expected NoRewardsAvailable, got: {:?}", other),
        }
    }

    #[track_caller]
    pub fn assert_conflict<T: std::fmt::Debug>(result: &QuestResult<T>, entity: EntityKind) {
        match result {
            Err(QuestError::Storage(StorageError::Conflict { entity: e, .. })) => {
                assert_eq!(*e, entity, "Wrong entity kind in Conflict error");
            }
            other => panic!("Expected Conflict for {:?}, got: {:?}", entity, other),
        }
    }

    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(result: &QuestResult<T>, entity: EntityKind) {
        match result {
            Err(QuestError::Storage(StorageError::NotFound { entity: e, .. })) => {
                assert_eq!(*e, entity, "Wrong entity kind in NotFound error");
            }
            other => panic!("Expected NotFound for {:?}, got: {:?}", entity, other),
        }
    }

    #[track_caller]
    pub fn assert_validation_error<T: std::fmt::Debug>(result: &QuestResult<T>) {
        match result {
            Err(QuestError::Validation(_)) => {}
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::assertions::*;
    use super::fixtures::*;
    use super::*;

    #[tokio::test]
    async fn test_failing_store_reports_storage_errors() {
        let result = FailingStore.referral_ledger(&user("a")).await;
        assert!(matches!(
            result,
            Err(QuestError::Storage(StorageError::QueryFailed { .. }))
        ));
        assert!(FailingStore.ping().await.is_err());
    }

    #[tokio::test]
    async fn test_seeded_store_and_duplicate_pair() {
        let store = store_with_referrals("seed", 3).await;
        let ledger = store.referral_ledger(&user("seed")).await.expect("ledger");
        assert_eq!(ledger.referral_count, 3);

        let again = store
            .referral_event_insert(&referral_event("seed", "seed-referred-0"))
            .await;
        assert_conflict(&again, EntityKind::ReferralEvent);
    }

    #[test]
    fn test_profile_fixture_starts_at_zero() {
        let p = profile("fixture");
        assert_eq!(p.xp, 0);
        assert_eq!(p.level, 0);
        assert_eq!(p.social_profiles, serde_json::json!({}));
    }
}
