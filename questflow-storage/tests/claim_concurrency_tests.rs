//! Concurrency Tests for the Claim Ledger
//!
//! **Property: a balance is paid out at most once**
//!
//! Any number of concurrent claims for the same user, racing against each
//! other, write exactly one claim row for the full balance. Every other call
//! fails with `NoRewardsAvailable`.

use chrono::Utc;
use proptest::prelude::*;
use questflow_core::{
    new_entity_id, MilestoneTable, NewReferralEvent, QuestError, ReferralEvent, RewardsError,
    Ttrust, UserId,
};
use questflow_storage::{InMemoryStore, ReferralStore};
use std::sync::Arc;
use tokio::runtime::Runtime;

fn user(id: &str) -> UserId {
    UserId::parse(id).expect("valid user id")
}

async fn seed_referrals(store: &InMemoryStore, referrer: &str, count: usize) {
    for i in 0..count {
        let new = NewReferralEvent::new(referrer, &format!("{}-friend-{}", referrer, i))
            .expect("valid event");
        store
            .referral_event_insert(&ReferralEvent::create(new_entity_id(), new, Utc::now()))
            .await
            .expect("insert event");
    }
}

async fn race_claims(store: Arc<InMemoryStore>, user_id: &str, racers: usize) -> (usize, usize) {
    let table = Arc::new(MilestoneTable::default());
    let mut handles = Vec::with_capacity(racers);
    for _ in 0..racers {
        let store = Arc::clone(&store);
        let table = Arc::clone(&table);
        let user_id = user(user_id);
        handles.push(tokio::spawn(async move {
            store.referral_claim(&user_id, &table).await
        }));
    }

    let mut ok = 0;
    let mut none = 0;
    for handle in handles {
        match handle.await.expect("task completed") {
            Ok(_) => ok += 1,
            Err(QuestError::Rewards(RewardsError::NoRewardsAvailable)) => none += 1,
            Err(other) => panic!("unexpected claim error: {other}"),
        }
    }
    (ok, none)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_two_concurrent_claims_pay_once() {
    let store = Arc::new(InMemoryStore::new());
    seed_referrals(&store, "alice", 3).await;

    let (ok, none) = race_claims(Arc::clone(&store), "alice", 2).await;
    assert_eq!(ok, 1);
    assert_eq!(none, 1);

    let claims = store
        .referral_claim_list(&user("alice"))
        .await
        .expect("list claims");
    assert_eq!(claims.len(), 1);
    assert_eq!(claims[0].amount, Ttrust::from_whole(1));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(25))]

    #[test]
    fn prop_concurrent_claims_pay_at_most_once(referrals in 0usize..15, racers in 2usize..10) {
        let rt = Runtime::new()
            .map_err(|e| TestCaseError::fail(format!("Failed to create runtime: {}", e)))?;
        rt.block_on(async {
            let store = Arc::new(InMemoryStore::new());
            seed_referrals(&store, "racer", referrals).await;
            let expected = MilestoneTable::default().total_earned(referrals as u64);

            let (ok, none) = race_claims(Arc::clone(&store), "racer", racers).await;
            let claims = store
                .referral_claim_list(&user("racer"))
                .await
                .map_err(|e| TestCaseError::fail(e.to_string()))?;

            if expected.is_zero() {
                prop_assert_eq!(ok, 0);
                prop_assert!(claims.is_empty());
            } else {
                prop_assert_eq!(ok, 1);
                prop_assert_eq!(claims.len(), 1);
                prop_assert_eq!(claims[0].amount, expected);
            }
            prop_assert_eq!(ok + none, racers);
            Ok::<(), TestCaseError>(())
        })?;
    }
}
