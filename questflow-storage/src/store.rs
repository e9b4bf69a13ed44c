//! Async storage traits.
//!
//! Stores only persist and return raw records and counters. Everything a
//! client sees is derived from those by the engines in `questflow-core`.

use async_trait::async_trait;
use questflow_core::{
    MilestoneTable, QuestCompletion, QuestResult, ReferralClaim, ReferralEvent, ReferralLedger,
    UserId, UserProfile,
};

/// Referral events and the claim ledger.
#[async_trait]
pub trait ReferralStore: Send + Sync {
    /// Referral count and claimed sum for a referrer. Users with no activity
    /// get an empty ledger, not an error.
    async fn referral_ledger(&self, user_id: &UserId) -> QuestResult<ReferralLedger>;

    /// Append a referral event. A second event for the same
    /// (referrer, referred) pair fails with `StorageError::Conflict`.
    async fn referral_event_insert(&self, event: &ReferralEvent) -> QuestResult<()>;

    /// Claims for a user, oldest first.
    async fn referral_claim_list(&self, user_id: &UserId) -> QuestResult<Vec<ReferralClaim>>;

    /// Claim the full claimable balance.
    ///
    /// Reading the ledger, planning the claim and inserting the claim row are
    /// serialised per user: of two concurrent calls with a balance of B, one
    /// writes B and the other fails with `RewardsError::NoRewardsAvailable`.
    async fn referral_claim(
        &self,
        user_id: &UserId,
        table: &MilestoneTable,
    ) -> QuestResult<ReferralClaim>;
}

/// User progression profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn profile_get(&self, user_id: &UserId) -> QuestResult<Option<UserProfile>>;

    /// Insert a new profile. Fails with `StorageError::Conflict` when the user
    /// already has one.
    async fn profile_insert(&self, profile: &UserProfile) -> QuestResult<()>;

    /// Credit a quest completion and return the updated profile. XP, level
    /// and the completion count change in a single write.
    async fn profile_record_quest(
        &self,
        user_id: &UserId,
        quest: QuestCompletion,
    ) -> QuestResult<UserProfile>;
}

/// Everything the API needs from a backend.
#[async_trait]
pub trait QuestStore: ReferralStore + ProfileStore {
    /// Cheap round trip used by readiness checks.
    async fn ping(&self) -> QuestResult<()>;

    /// Short backend name for logs and metrics.
    fn backend_name(&self) -> &'static str;
}
