//! Referral milestone table.
//!
//! A milestone is a referral-count threshold that unlocks a bonus. Bonuses are
//! cumulative: a referrer past several thresholds has earned the sum of their
//! bonuses.

use serde::{Deserialize, Serialize};

use crate::amount::Ttrust;
use crate::error::ConfigError;

/// A referral-count threshold and the bonus it unlocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub threshold: u64,
    /// Bonus in hundredths of a tTRUST.
    #[serde(with = "crate::amount::hundredths")]
    pub bonus: Ttrust,
}

impl Milestone {
    pub const fn new(threshold: u64, bonus: Ttrust) -> Self {
        Self { threshold, bonus }
    }
}

/// Default milestones: 3 referrals earn 1 tTRUST, 10 referrals a further 1.5.
pub const DEFAULT_MILESTONES: [Milestone; 2] = [
    Milestone::new(3, Ttrust::from_hundredths(100)),
    Milestone::new(10, Ttrust::from_hundredths(150)),
];

/// Spacing of the progress targets shown past the last milestone.
pub const DEFAULT_REPEAT_INTERVAL: u64 = 10;

/// Validated milestone table.
///
/// Thresholds are at least 1 and strictly increasing; every bonus is
/// positive. Construct with [`MilestoneTable::new`] or deserialize, which
/// runs the same checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMilestoneTable")]
pub struct MilestoneTable {
    milestones: Vec<Milestone>,
    repeat_interval: u64,
}

#[derive(Deserialize)]
struct RawMilestoneTable {
    milestones: Vec<Milestone>,
    #[serde(default = "default_repeat_interval")]
    repeat_interval: u64,
}

fn default_repeat_interval() -> u64 {
    DEFAULT_REPEAT_INTERVAL
}

impl TryFrom<RawMilestoneTable> for MilestoneTable {
    type Error = ConfigError;

    fn try_from(raw: RawMilestoneTable) -> Result<Self, Self::Error> {
        MilestoneTable::new(raw.milestones, raw.repeat_interval)
    }
}

impl Default for MilestoneTable {
    fn default() -> Self {
        Self {
            milestones: DEFAULT_MILESTONES.to_vec(),
            repeat_interval: DEFAULT_REPEAT_INTERVAL,
        }
    }
}

impl MilestoneTable {
    pub fn new(milestones: Vec<Milestone>, repeat_interval: u64) -> Result<Self, ConfigError> {
        if milestones.is_empty() {
            return Err(invalid("milestones", "[]", "at least one milestone is required"));
        }
        if repeat_interval == 0 {
            return Err(invalid("repeat_interval", "0", "must be at least 1"));
        }
        let mut previous = 0u64;
        for m in &milestones {
            if m.threshold <= previous {
                return Err(invalid(
                    "threshold",
                    &m.threshold.to_string(),
                    "thresholds must be at least 1 and strictly increasing",
                ));
            }
            if m.bonus.is_zero() {
                return Err(invalid("bonus", "0", "bonus must be positive"));
            }
            previous = m.threshold;
        }
        Ok(Self {
            milestones,
            repeat_interval,
        })
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    pub fn repeat_interval(&self) -> u64 {
        self.repeat_interval
    }

    /// Sum of the bonuses for every milestone the count has reached.
    pub fn total_earned(&self, referral_count: u64) -> Ttrust {
        self.milestones
            .iter()
            .filter(|m| referral_count >= m.threshold)
            .map(|m| m.bonus)
            .sum()
    }

    /// Next progress target strictly above the count.
    ///
    /// Inside the table this is the next threshold. Past the last threshold
    /// it is the next multiple of the repeat interval.
    pub fn next_milestone(&self, referral_count: u64) -> u64 {
        self.milestones
            .iter()
            .map(|m| m.threshold)
            .find(|&t| t > referral_count)
            .unwrap_or_else(|| {
                (referral_count / self.repeat_interval)
                    .saturating_add(1)
                    .saturating_mul(self.repeat_interval)
            })
    }

    /// `count / next_milestone * 100`, clamped to `[0, 100]`.
    pub fn progress_percentage(&self, referral_count: u64) -> f64 {
        let target = self.next_milestone(referral_count);
        (referral_count as f64 / target as f64 * 100.0).clamp(0.0, 100.0)
    }

    pub fn statuses(&self, referral_count: u64) -> Vec<MilestoneStatus> {
        self.milestones
            .iter()
            .map(|m| MilestoneStatus {
                threshold: m.threshold,
                bonus: m.bonus,
                reached: referral_count >= m.threshold,
            })
            .collect()
    }
}

fn invalid(field: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Whether a milestone has been reached, for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct MilestoneStatus {
    pub threshold: u64,
    #[cfg_attr(feature = "openapi", schema(value_type = f64))]
    pub bonus: Ttrust,
    pub reached: bool,
}
