//! Referral rewards engine.
//!
//! Pure functions over a [`ReferralLedger`] snapshot (referral count plus the
//! sum of prior claims). Stores load the snapshot and call into this module;
//! nothing here performs I/O.

use serde::{Deserialize, Serialize};

use crate::amount::Ttrust;
use crate::error::RewardsError;
use crate::identity::UserId;
use crate::milestone::{MilestoneStatus, MilestoneTable};

/// Largest single claim the ledger column can hold, in hundredths.
pub const MAX_CLAIM_HUNDREDTHS: u64 = i32::MAX as u64;

/// Raw counters for one referrer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReferralLedger {
    /// Referral events where the user is the referrer.
    pub referral_count: u64,
    /// Sum of all prior claim amounts.
    pub claimed: Ttrust,
}

impl ReferralLedger {
    pub fn new(referral_count: u64, claimed: Ttrust) -> Self {
        Self {
            referral_count,
            claimed,
        }
    }

    /// Total earned under a milestone table.
    pub fn earned(&self, table: &MilestoneTable) -> Ttrust {
        table.total_earned(self.referral_count)
    }

    /// Earned minus claimed, floored at zero.
    pub fn claimable(&self, table: &MilestoneTable) -> Ttrust {
        self.earned(table).saturating_sub(self.claimed)
    }
}

/// Referral dashboard for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ReferralStats {
    pub total_referrals: u64,
    #[cfg_attr(feature = "openapi", schema(value_type = f64, example = 2.5))]
    pub total_earned: Ttrust,
    #[cfg_attr(feature = "openapi", schema(value_type = f64, example = 1.5))]
    pub claimable_rewards: Ttrust,
    pub referral_link: String,
    pub next_milestone: u64,
    pub milestone_progress: f64,
    pub milestones: Vec<MilestoneStatus>,
}

/// Build the stats view from a ledger snapshot.
pub fn compute_stats(
    user_id: &UserId,
    ledger: &ReferralLedger,
    table: &MilestoneTable,
    link_base: &str,
) -> ReferralStats {
    let count = ledger.referral_count;
    ReferralStats {
        total_referrals: count,
        total_earned: ledger.earned(table),
        claimable_rewards: ledger.claimable(table),
        referral_link: referral_link(link_base, user_id),
        next_milestone: table.next_milestone(count),
        milestone_progress: table.progress_percentage(count),
        milestones: table.statuses(count),
    }
}

/// `<base>/join?ref=<url-encoded user id>`. A trailing slash on the base is
/// dropped.
pub fn referral_link(base: &str, user_id: &UserId) -> String {
    format!(
        "{}/join?ref={}",
        base.trim_end_matches('/'),
        urlencoding::encode(user_id.as_str())
    )
}

/// What a claim would write if committed now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimPlan {
    pub amount: Ttrust,
    /// Referral count snapshot recorded on the claim row.
    pub referral_count: u64,
}

/// Decide the claim for a ledger snapshot.
///
/// Must be called with the snapshot read under the same per-user
/// serialisation that guards the insert, or two claims can both see the same
/// balance.
pub fn plan_claim(ledger: &ReferralLedger, table: &MilestoneTable) -> Result<ClaimPlan, RewardsError> {
    let amount = ledger.claimable(table);
    if amount.is_zero() {
        return Err(RewardsError::NoRewardsAvailable);
    }
    if amount.hundredths() > MAX_CLAIM_HUNDREDTHS {
        return Err(RewardsError::AmountOutOfRange {
            hundredths: amount.hundredths(),
        });
    }
    Ok(ClaimPlan {
        amount,
        referral_count: ledger.referral_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::parse(id).expect("valid user id")
    }

    #[test]
    fn test_zero_referrals() {
        let table = MilestoneTable::default();
        let stats = compute_stats(&user("u1"), &ReferralLedger::default(), &table, "https://q.app");
        assert_eq!(stats.total_referrals, 0);
        assert_eq!(stats.total_earned, Ttrust::ZERO);
        assert_eq!(stats.claimable_rewards, Ttrust::ZERO);
        assert_eq!(stats.next_milestone, 3);
    }

    #[test]
    fn test_three_referrals_no_claims() {
        let table = MilestoneTable::default();
        let ledger = ReferralLedger::new(3, Ttrust::ZERO);
        let stats = compute_stats(&user("u1"), &ledger, &table, "https://q.app");
        assert_eq!(stats.total_earned, Ttrust::from_whole(1));
        assert_eq!(stats.claimable_rewards, Ttrust::from_whole(1));
    }

    #[test]
    fn test_ten_referrals_with_prior_claim() {
        let table = MilestoneTable::default();
        let ledger = ReferralLedger::new(10, Ttrust::from_hundredths(100));
        let stats = compute_stats(&user("u1"), &ledger, &table, "https://q.app");
        assert_eq!(stats.total_earned, Ttrust::from_hundredths(250));
        assert_eq!(stats.claimable_rewards, Ttrust::from_hundredths(150));
    }

    #[test]
    fn test_over_claimed_ledger_floors_at_zero() {
        let table = MilestoneTable::default();
        let ledger = ReferralLedger::new(3, Ttrust::from_hundredths(500));
        assert_eq!(ledger.claimable(&table), Ttrust::ZERO);
    }

    #[test]
    fn test_referral_link_encodes() {
        let link = referral_link("https://questflow.app/", &user("alice smith&co"));
        assert_eq!(link, "https://questflow.app/join?ref=alice%20smith%26co");
    }

    #[test]
    fn test_plan_claim_nothing_available() {
        let table = MilestoneTable::default();
        let ledger = ReferralLedger::new(2, Ttrust::ZERO);
        assert_eq!(plan_claim(&ledger, &table), Err(RewardsError::NoRewardsAvailable));

        let spent = ReferralLedger::new(3, Ttrust::from_hundredths(100));
        assert_eq!(plan_claim(&spent, &table), Err(RewardsError::NoRewardsAvailable));
    }

    #[test]
    fn test_plan_claim_takes_full_balance() {
        let table = MilestoneTable::default();
        let ledger = ReferralLedger::new(12, Ttrust::from_hundredths(100));
        let plan = plan_claim(&ledger, &table).expect("claimable");
        assert_eq!(plan.amount, Ttrust::from_hundredths(150));
        assert_eq!(plan.referral_count, 12);
    }

    #[test]
    fn test_stats_json_shape() -> Result<(), serde_json::Error> {
        let table = MilestoneTable::default();
        let ledger = ReferralLedger::new(10, Ttrust::from_hundredths(100));
        let stats = compute_stats(&user("u1"), &ledger, &table, "https://q.app");
        let json = serde_json::to_value(&stats)?;
        assert_eq!(json["totalReferrals"], 10);
        assert_eq!(json["totalEarned"], 2.5);
        assert_eq!(json["claimableRewards"], 1.5);
        assert_eq!(json["referralLink"], "https://q.app/join?ref=u1");
        assert_eq!(json["nextMilestone"], 20);
        Ok(())
    }
}
