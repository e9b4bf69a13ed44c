//! Referral Service
//!
//! Stats, event recording and reward claims.

use chrono::Utc;
use questflow_core::{
    compute_stats, new_entity_id, NewReferralEvent, QuestError, ReferralClaim, ReferralEvent,
    ReferralStats, RewardsConfig, RewardsError, UserId,
};
use questflow_storage::QuestStore;

use super::observe;
use crate::error::ApiResult;
use crate::telemetry::{metrics::with_metrics, ClaimOutcome};
use crate::types::{ClaimResponse, CreateReferralEventRequest};

/// Current referral stats for a user. Users with no referrals get zeroed
/// stats, not a 404.
pub async fn referral_stats(
    store: &dyn QuestStore,
    rewards: &RewardsConfig,
    user_id: &UserId,
) -> ApiResult<ReferralStats> {
    let ledger = observe(store, "referral_ledger", store.referral_ledger(user_id)).await?;
    Ok(compute_stats(
        user_id,
        &ledger,
        &rewards.milestones,
        &rewards.public_base_url,
    ))
}

/// Validate and append a referral event.
pub async fn record_referral(
    store: &dyn QuestStore,
    request: CreateReferralEventRequest,
) -> ApiResult<ReferralEvent> {
    let new = NewReferralEvent::new(&request.referrer_user_id, &request.referred_user_id)?;
    let event = ReferralEvent::create(new_entity_id(), new, Utc::now());

    observe(store, "referral_event_insert", store.referral_event_insert(&event)).await?;

    tracing::info!(
        event_id = %event.id,
        referrer = %event.referrer_user_id,
        referred = %event.referred_user_id,
        "Referral recorded"
    );
    Ok(event)
}

/// Claim the whole claimable balance and return the claim with the stats
/// after it.
///
/// The store serialises claims per user, so concurrent calls pay out at most
/// once; the losers see `NoRewardsAvailable`.
pub async fn claim_rewards(
    store: &dyn QuestStore,
    rewards: &RewardsConfig,
    user_id: &UserId,
) -> ApiResult<ClaimResponse> {
    let result = observe(
        store,
        "referral_claim",
        store.referral_claim(user_id, &rewards.milestones),
    )
    .await;

    let claim = match result {
        Ok(claim) => {
            with_metrics(|m| m.record_claim(ClaimOutcome::Claimed, claim.amount.hundredths()));
            claim
        }
        Err(err @ QuestError::Rewards(RewardsError::NoRewardsAvailable)) => {
            with_metrics(|m| m.record_claim(ClaimOutcome::NothingToClaim, 0));
            tracing::debug!(user_id = %user_id, "Claim rejected, nothing claimable");
            return Err(err.into());
        }
        Err(err) => {
            with_metrics(|m| m.record_claim(ClaimOutcome::Failed, 0));
            return Err(err.into());
        }
    };

    tracing::info!(
        user_id = %user_id,
        claim_id = %claim.id,
        amount = %claim.amount,
        referral_count = claim.referral_count,
        "Referral rewards claimed"
    );

    let stats = referral_stats(store, rewards, user_id).await?;
    Ok(ClaimResponse { claim, stats })
}

/// Prior claims, oldest first.
pub async fn claim_history(store: &dyn QuestStore, user_id: &UserId) -> ApiResult<Vec<ReferralClaim>> {
    Ok(observe(store, "referral_claim_list", store.referral_claim_list(user_id)).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use questflow_core::Ttrust;
    use questflow_storage::InMemoryStore;

    fn user(id: &str) -> UserId {
        UserId::parse(id).expect("valid user id")
    }

    fn referral(referrer: &str, referred: &str) -> CreateReferralEventRequest {
        CreateReferralEventRequest {
            referrer_user_id: referrer.to_string(),
            referred_user_id: referred.to_string(),
        }
    }

    #[tokio::test]
    async fn test_stats_for_unknown_user_are_zero() {
        let store = InMemoryStore::new();
        let stats = referral_stats(&store, &RewardsConfig::default(), &user("nobody"))
            .await
            .expect("stats");
        assert_eq!(stats.total_referrals, 0);
        assert!(stats.total_earned.is_zero());
        assert!(stats.claimable_rewards.is_zero());
        assert_eq!(stats.referral_link, "http://localhost:3000/join?ref=nobody");
    }

    #[tokio::test]
    async fn test_claim_then_claim_again() {
        let store = InMemoryStore::new();
        let rewards = RewardsConfig::default();
        for friend in ["b", "c", "d"] {
            record_referral(&store, referral("a", friend))
                .await
                .expect("record referral");
        }

        let first = claim_rewards(&store, &rewards, &user("a"))
            .await
            .expect("first claim");
        assert_eq!(first.claim.amount, Ttrust::from_whole(1));
        assert_eq!(first.claim.referral_count, 3);
        assert!(first.stats.claimable_rewards.is_zero());
        assert_eq!(first.stats.total_earned, Ttrust::from_whole(1));

        let second = claim_rewards(&store, &rewards, &user("a"))
            .await
            .expect_err("nothing left");
        assert_eq!(second.code, ErrorCode::NoRewardsAvailable);

        let history = claim_history(&store, &user("a")).await.expect("history");
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_self_referral_is_rejected() {
        let store = InMemoryStore::new();
        let err = record_referral(&store, referral("a", "a"))
            .await
            .expect_err("self referral");
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(store.referral_event_count().expect("count"), 0);
    }

    #[tokio::test]
    async fn test_duplicate_referral_is_a_conflict() {
        let store = InMemoryStore::new();
        record_referral(&store, referral("a", "b"))
            .await
            .expect("first");
        let err = record_referral(&store, referral("a", "b"))
            .await
            .expect_err("duplicate");
        assert_eq!(err.code, ErrorCode::EntityAlreadyExists);
    }
}
