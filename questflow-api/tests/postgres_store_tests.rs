//! Postgres Store Tests
//!
//! Run against a live database configured through `QUESTFLOW_DB_*`:
//!
//! ```text
//! cargo test -p questflow-api --features db-tests --test postgres_store_tests
//! ```
//!
//! Each test uses fresh user ids, so runs do not interfere with each other.

#![cfg(feature = "db-tests")]

use std::sync::Arc;

use questflow_api::{DbClient, DbConfig};
use questflow_core::{MilestoneTable, QuestCompletion, Ttrust};
use questflow_storage::{ProfileStore, QuestStore, ReferralStore};
use questflow_test_utils::assertions::{assert_conflict, assert_no_rewards, assert_not_found};
use questflow_test_utils::fixtures::{profile, referral_event, user};
use questflow_test_utils::EntityKind;
use uuid::Uuid;

async fn db() -> DbClient {
    let db = DbClient::from_config(&DbConfig::from_env()).expect("pool");
    db.migrate().await.expect("migrate");
    db
}

fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::now_v7())
}

#[tokio::test]
async fn test_ping_and_migrate_twice() {
    let db = db().await;
    db.migrate().await.expect("migration is idempotent");
    db.ping().await.expect("ping");
    assert_eq!(db.backend_name(), "postgres");
}

#[tokio::test]
async fn test_ledger_and_claim() {
    let db = db().await;
    let referrer = unique("referrer");
    let table = MilestoneTable::default();

    assert_no_rewards(&db.referral_claim(&user(&referrer), &table).await);

    for i in 0..3 {
        db.referral_event_insert(&referral_event(&referrer, &format!("{}-{}", referrer, i)))
            .await
            .expect("insert");
    }
    let duplicate = db
        .referral_event_insert(&referral_event(&referrer, &format!("{}-0", referrer)))
        .await;
    assert_conflict(&duplicate, EntityKind::ReferralEvent);

    let claim = db.referral_claim(&user(&referrer), &table).await.expect("claim");
    assert_eq!(claim.amount, Ttrust::from_whole(1));
    assert_eq!(claim.referral_count, 3);

    let ledger = db.referral_ledger(&user(&referrer)).await.expect("ledger");
    assert_eq!(ledger.referral_count, 3);
    assert_eq!(ledger.claimed, Ttrust::from_whole(1));

    let claims = db.referral_claim_list(&user(&referrer)).await.expect("list");
    assert_eq!(claims.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_claims_pay_once() {
    let db = Arc::new(db().await);
    let referrer = unique("racer");
    for i in 0..10 {
        db.referral_event_insert(&referral_event(&referrer, &format!("{}-{}", referrer, i)))
            .await
            .expect("insert");
    }

    let table = Arc::new(MilestoneTable::default());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let db = Arc::clone(&db);
            let table = Arc::clone(&table);
            let user_id = user(&referrer);
            tokio::spawn(async move { db.referral_claim(&user_id, &table).await })
        })
        .collect();

    let mut paid = Vec::new();
    for handle in handles {
        if let Ok(claim) = handle.await.expect("task") {
            paid.push(claim.amount);
        }
    }
    assert_eq!(paid, vec![Ttrust::from_hundredths(250)]);
}

#[tokio::test]
async fn test_profile_quest_updates_level_in_one_write() {
    let db = db().await;
    let user_id = unique("hero");

    assert_not_found(
        &db.profile_record_quest(&user(&user_id), QuestCompletion::new(5).expect("xp"))
            .await,
        EntityKind::UserProfile,
    );

    db.profile_insert(&profile(&user_id)).await.expect("insert");
    assert_conflict(&db.profile_insert(&profile(&user_id)).await, EntityKind::UserProfile);

    let updated = db
        .profile_record_quest(&user(&user_id), QuestCompletion::new(175).expect("xp"))
        .await
        .expect("quest");
    assert_eq!(updated.xp, 175);
    assert_eq!(updated.level, 8);
    assert_eq!(updated.quests_completed, 1);

    let fetched = db.profile_get(&user(&user_id)).await.expect("get");
    assert_eq!(fetched.map(|p| p.level), Some(8));
}
