//! In-memory store for tests and local development.

use async_trait::async_trait;
use chrono::Utc;
use questflow_core::{
    new_entity_id, plan_claim, EntityKind, MilestoneTable, QuestCompletion, QuestResult,
    ReferralClaim, ReferralEvent, ReferralLedger, StorageError, Ttrust, UserId, UserProfile,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::store::{ProfileStore, QuestStore, ReferralStore};

#[derive(Debug, Default)]
struct State {
    profiles: HashMap<UserId, UserProfile>,
    events: Vec<ReferralEvent>,
    event_pairs: HashSet<(UserId, UserId)>,
    claims: Vec<ReferralClaim>,
}

impl State {
    fn ledger(&self, user_id: &UserId) -> ReferralLedger {
        let referral_count = self
            .events
            .iter()
            .filter(|e| &e.referrer_user_id == user_id)
            .count() as u64;
        let claimed: Ttrust = self
            .claims
            .iter()
            .filter(|c| &c.user_id == user_id)
            .map(|c| c.amount)
            .sum();
        ReferralLedger::new(referral_count, claimed)
    }
}

/// Store backed by a single `RwLock`.
///
/// Reads share the lock. Every mutation, including the whole
/// read-plan-insert sequence of a claim, holds the write lock, which
/// serialises claims across all users.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn referral_event_count(&self) -> QuestResult<usize> {
        Ok(self.read()?.events.len())
    }

    pub fn referral_claim_count(&self) -> QuestResult<usize> {
        Ok(self.read()?.claims.len())
    }

    fn read(&self) -> QuestResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| StorageError::LockPoisoned.into())
    }

    fn write(&self) -> QuestResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| StorageError::LockPoisoned.into())
    }
}

#[async_trait]
impl ReferralStore for InMemoryStore {
    async fn referral_ledger(&self, user_id: &UserId) -> QuestResult<ReferralLedger> {
        Ok(self.read()?.ledger(user_id))
    }

    async fn referral_event_insert(&self, event: &ReferralEvent) -> QuestResult<()> {
        let mut state = self.write()?;
        let pair = (event.referrer_user_id.clone(), event.referred_user_id.clone());
        if !state.event_pairs.insert(pair) {
            return Err(StorageError::Conflict {
                entity: EntityKind::ReferralEvent,
                key: format!("{} -> {}", event.referrer_user_id, event.referred_user_id),
            }
            .into());
        }
        state.events.push(event.clone());
        Ok(())
    }

    async fn referral_claim_list(&self, user_id: &UserId) -> QuestResult<Vec<ReferralClaim>> {
        Ok(self
            .read()?
            .claims
            .iter()
            .filter(|c| &c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn referral_claim(
        &self,
        user_id: &UserId,
        table: &MilestoneTable,
    ) -> QuestResult<ReferralClaim> {
        let mut state = self.write()?;
        let plan = plan_claim(&state.ledger(user_id), table)?;
        let claim = ReferralClaim {
            id: new_entity_id(),
            user_id: user_id.clone(),
            amount: plan.amount,
            referral_count: plan.referral_count,
            created_at: Utc::now(),
        };
        state.claims.push(claim.clone());
        Ok(claim)
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn profile_get(&self, user_id: &UserId) -> QuestResult<Option<UserProfile>> {
        Ok(self.read()?.profiles.get(user_id).cloned())
    }

    async fn profile_insert(&self, profile: &UserProfile) -> QuestResult<()> {
        let mut state = self.write()?;
        if state.profiles.contains_key(&profile.user_id) {
            return Err(StorageError::Conflict {
                entity: EntityKind::UserProfile,
                key: profile.user_id.to_string(),
            }
            .into());
        }
        state
            .profiles
            .insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }

    async fn profile_record_quest(
        &self,
        user_id: &UserId,
        quest: QuestCompletion,
    ) -> QuestResult<UserProfile> {
        let mut state = self.write()?;
        let profile = state
            .profiles
            .get_mut(user_id)
            .ok_or_else(|| StorageError::NotFound {
                entity: EntityKind::UserProfile,
                key: user_id.to_string(),
            })?;
        profile.apply_quest(quest, Utc::now());
        Ok(profile.clone())
    }
}

#[async_trait]
impl QuestStore for InMemoryStore {
    async fn ping(&self) -> QuestResult<()> {
        self.read().map(|_| ())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use questflow_core::{NewProfile, NewReferralEvent, QuestError, RewardsError};

    fn user(id: &str) -> UserId {
        UserId::parse(id).expect("valid user id")
    }

    fn event(referrer: &str, referred: &str) -> ReferralEvent {
        let new = NewReferralEvent::new(referrer, referred).expect("valid event");
        ReferralEvent::create(new_entity_id(), new, Utc::now())
    }

    #[tokio::test]
    async fn test_empty_ledger_for_unknown_user() -> QuestResult<()> {
        let store = InMemoryStore::new();
        let ledger = store.referral_ledger(&user("nobody")).await?;
        assert_eq!(ledger, ReferralLedger::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_ledger_counts_only_referrer_rows() -> QuestResult<()> {
        let store = InMemoryStore::new();
        store.referral_event_insert(&event("alice", "bob")).await?;
        store.referral_event_insert(&event("alice", "carol")).await?;
        store.referral_event_insert(&event("bob", "dave")).await?;

        assert_eq!(store.referral_ledger(&user("alice")).await?.referral_count, 2);
        assert_eq!(store.referral_ledger(&user("bob")).await?.referral_count, 1);
        assert_eq!(store.referral_ledger(&user("carol")).await?.referral_count, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_pair_conflicts() -> QuestResult<()> {
        let store = InMemoryStore::new();
        store.referral_event_insert(&event("alice", "bob")).await?;
        let result = store.referral_event_insert(&event("alice", "bob")).await;
        assert!(matches!(
            result,
            Err(QuestError::Storage(StorageError::Conflict {
                entity: EntityKind::ReferralEvent,
                ..
            }))
        ));
        assert_eq!(store.referral_event_count()?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_claim_without_balance_inserts_nothing() -> QuestResult<()> {
        let store = InMemoryStore::new();
        let table = MilestoneTable::default();
        let result = store.referral_claim(&user("alice"), &table).await;
        assert!(matches!(
            result,
            Err(QuestError::Rewards(RewardsError::NoRewardsAvailable))
        ));
        assert_eq!(store.referral_claim_count()?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_claim_then_reclaim() -> QuestResult<()> {
        let store = InMemoryStore::new();
        let table = MilestoneTable::default();
        for referred in ["b", "c", "d"] {
            store.referral_event_insert(&event("alice", referred)).await?;
        }

        let claim = store.referral_claim(&user("alice"), &table).await?;
        assert_eq!(claim.amount, Ttrust::from_whole(1));
        assert_eq!(claim.referral_count, 3);

        let again = store.referral_claim(&user("alice"), &table).await;
        assert!(again.is_err());
        assert_eq!(store.referral_claim_list(&user("alice")).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_profile_insert_and_quest() -> QuestResult<()> {
        let store = InMemoryStore::new();
        let new = NewProfile::new("alice", Some("Alice".to_string()), None)?;
        let profile = UserProfile::create(new_entity_id(), new, Utc::now());
        store.profile_insert(&profile).await?;
        assert!(store.profile_insert(&profile).await.is_err());

        let updated = store
            .profile_record_quest(&user("alice"), QuestCompletion::new(45)?)
            .await?;
        assert_eq!(updated.xp, 45);
        assert_eq!(updated.level, 2);
        assert_eq!(updated.quests_completed, 1);

        let missing = store
            .profile_record_quest(&user("bob"), QuestCompletion::new(10)?)
            .await;
        assert!(matches!(
            missing,
            Err(QuestError::Storage(StorageError::NotFound { .. }))
        ));
        Ok(())
    }
}
