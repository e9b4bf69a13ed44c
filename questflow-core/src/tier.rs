//! Reputation tiers and their unlock table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of five ordered reputation bands unlocked by level.
///
/// Variant order is the tier order; `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Enchanter,
    Illuminated,
    Conscious,
    Oracle,
    Templar,
}

/// Minimum level required for a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierThreshold {
    pub tier: Tier,
    pub min_level: u64,
}

/// Unlock table, ascending by level. Each tier covers
/// `[min_level, next.min_level)`; the first entry starts at 0 and the last is
/// unbounded, so the table partitions every level.
pub const TIER_THRESHOLDS: [TierThreshold; 5] = [
    TierThreshold { tier: Tier::Enchanter, min_level: 0 },
    TierThreshold { tier: Tier::Illuminated, min_level: 5 },
    TierThreshold { tier: Tier::Conscious, min_level: 15 },
    TierThreshold { tier: Tier::Oracle, min_level: 30 },
    TierThreshold { tier: Tier::Templar, min_level: 50 },
];

impl Tier {
    pub const ALL: [Tier; 5] = [
        Tier::Enchanter,
        Tier::Illuminated,
        Tier::Conscious,
        Tier::Oracle,
        Tier::Templar,
    ];

    /// Tier for a level: scan the unlock table from the top and take the
    /// first tier whose minimum level is reached.
    pub fn from_level(level: u64) -> Tier {
        TIER_THRESHOLDS
            .iter()
            .rev()
            .find(|t| level >= t.min_level)
            .map(|t| t.tier)
            .unwrap_or(Tier::Enchanter)
    }

    pub fn min_level(self) -> u64 {
        TIER_THRESHOLDS[self.index()].min_level
    }

    /// The next tier up, or `None` at the top.
    pub fn next(self) -> Option<Tier> {
        Tier::ALL.get(self.index() + 1).copied()
    }

    /// 1-based position in the tier order.
    pub fn order(self) -> u8 {
        self.index() as u8 + 1
    }

    fn index(self) -> usize {
        match self {
            Tier::Enchanter => 0,
            Tier::Illuminated => 1,
            Tier::Conscious => 2,
            Tier::Oracle => 3,
            Tier::Templar => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Enchanter => "enchanter",
            Tier::Illuminated => "illuminated",
            Tier::Conscious => "conscious",
            Tier::Oracle => "oracle",
            Tier::Templar => "templar",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Tier::Enchanter => "Enchanter",
            Tier::Illuminated => "Illuminated",
            Tier::Conscious => "Conscious",
            Tier::Oracle => "Oracle",
            Tier::Templar => "Templar",
        }
    }

    /// Badge colour as a hex string.
    pub fn color(self) -> &'static str {
        match self {
            Tier::Enchanter => "#8b5cf6",
            Tier::Illuminated => "#10b981",
            Tier::Conscious => "#3b82f6",
            Tier::Oracle => "#6366f1",
            Tier::Templar => "#ef4444",
        }
    }

    /// Percentage of quest rewards paid out as liquid tTRUST at this tier.
    pub fn quest_earning_rate(self) -> u8 {
        match self {
            Tier::Enchanter => 0,
            Tier::Illuminated => 10,
            Tier::Conscious => 25,
            Tier::Oracle => 50,
            Tier::Templar => 100,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an invalid tier string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierParseError(pub String);

impl fmt::Display for TierParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid tier: {}", self.0)
    }
}

impl std::error::Error for TierParseError {}

impl FromStr for Tier {
    type Err = TierParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enchanter" => Ok(Tier::Enchanter),
            "illuminated" => Ok(Tier::Illuminated),
            "conscious" => Ok(Tier::Conscious),
            "oracle" => Ok(Tier::Oracle),
            "templar" => Ok(Tier::Templar),
            _ => Err(TierParseError(s.to_string())),
        }
    }
}

/// Presentation record for one tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TierInfo {
    pub tier: Tier,
    pub order: u8,
    pub display_name: String,
    pub color: String,
    pub min_level: u64,
    pub quest_earning_rate: u8,
}

impl From<Tier> for TierInfo {
    fn from(tier: Tier) -> Self {
        Self {
            tier,
            order: tier.order(),
            display_name: tier.display_name().to_string(),
            color: tier.color().to_string(),
            min_level: tier.min_level(),
            quest_earning_rate: tier.quest_earning_rate(),
        }
    }
}

/// The full tier table in ascending order.
pub fn tier_table() -> Vec<TierInfo> {
    Tier::ALL.iter().copied().map(TierInfo::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries() {
        assert_eq!(Tier::from_level(0), Tier::Enchanter);
        assert_eq!(Tier::from_level(4), Tier::Enchanter);
        assert_eq!(Tier::from_level(5), Tier::Illuminated);
        assert_eq!(Tier::from_level(14), Tier::Illuminated);
        assert_eq!(Tier::from_level(15), Tier::Conscious);
        assert_eq!(Tier::from_level(29), Tier::Conscious);
        assert_eq!(Tier::from_level(30), Tier::Oracle);
        assert_eq!(Tier::from_level(49), Tier::Oracle);
        assert_eq!(Tier::from_level(50), Tier::Templar);
        assert_eq!(Tier::from_level(u64::MAX), Tier::Templar);
    }

    #[test]
    fn test_threshold_table_is_ascending_from_zero() {
        assert_eq!(TIER_THRESHOLDS[0].min_level, 0);
        for pair in TIER_THRESHOLDS.windows(2) {
            assert!(pair[0].min_level < pair[1].min_level);
            assert!(pair[0].tier < pair[1].tier);
        }
    }

    #[test]
    fn test_next_and_order() {
        assert_eq!(Tier::Enchanter.next(), Some(Tier::Illuminated));
        assert_eq!(Tier::Templar.next(), None);
        assert_eq!(Tier::Enchanter.order(), 1);
        assert_eq!(Tier::Templar.order(), 5);
    }

    #[test]
    fn test_round_trip_str() {
        for tier in Tier::ALL {
            assert_eq!(tier.as_str().parse::<Tier>(), Ok(tier));
        }
        assert!("paladin".parse::<Tier>().is_err());
    }

    #[test]
    fn test_serializes_lowercase() -> Result<(), serde_json::Error> {
        assert_eq!(serde_json::to_string(&Tier::Oracle)?, "\"oracle\"");
        Ok(())
    }

    #[test]
    fn test_tier_table() {
        let table = tier_table();
        assert_eq!(table.len(), 5);
        assert_eq!(table[1].display_name, "Illuminated");
        assert_eq!(table[1].min_level, 5);
        assert_eq!(table[4].quest_earning_rate, 100);
    }
}
