//! XP progression: level, tier, and progress toward the next level.

use serde::{Deserialize, Serialize};

use crate::tier::Tier;

/// XP required per level. Levels are a flat 20 XP apart.
pub const XP_PER_LEVEL: u64 = 20;

/// Level for an XP total: `floor(xp / XP_PER_LEVEL)`.
pub fn level_for_xp(xp: u64) -> u64 {
    xp / XP_PER_LEVEL
}

/// Derived progression view for an XP total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Progression {
    pub xp: u64,
    pub level: u64,
    pub tier: Tier,
    /// XP earned since the start of the current level.
    pub xp_into_level: u64,
    /// XP still needed to reach the next level.
    pub xp_to_next_level: u64,
    /// Total XP at which the next level starts.
    pub next_level_xp: u64,
    /// `xp_into_level / XP_PER_LEVEL * 100`, clamped to `[0, 100]`.
    pub progress_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_tier: Option<NextTier>,
}

/// The next tier and the distance to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct NextTier {
    pub tier: Tier,
    pub min_level: u64,
    pub levels_remaining: u64,
}

/// Derive level, tier and level progress from an XP total.
///
/// Total over all inputs. The arithmetic saturates at the top of the `u64`
/// range rather than overflowing.
pub fn derive_progression(xp: u64) -> Progression {
    let level = level_for_xp(xp);
    let tier = Tier::from_level(level);
    let level_start_xp = level * XP_PER_LEVEL;
    let next_level_xp = level.saturating_add(1).saturating_mul(XP_PER_LEVEL);
    let xp_into_level = xp - level_start_xp;
    let xp_to_next_level = next_level_xp.saturating_sub(xp);
    let progress_percentage =
        (xp_into_level as f64 / XP_PER_LEVEL as f64 * 100.0).clamp(0.0, 100.0);

    let next_tier = tier.next().map(|next| NextTier {
        tier: next,
        min_level: next.min_level(),
        levels_remaining: next.min_level().saturating_sub(level),
    });

    Progression {
        xp,
        level,
        tier,
        xp_into_level,
        xp_to_next_level,
        next_level_xp,
        progress_percentage,
        next_tier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_xp() {
        let p = derive_progression(0);
        assert_eq!(p.level, 0);
        assert_eq!(p.tier, Tier::Enchanter);
        assert_eq!(p.xp_into_level, 0);
        assert_eq!(p.xp_to_next_level, 20);
        assert_eq!(p.next_level_xp, 20);
        assert_eq!(p.progress_percentage, 0.0);
        assert_eq!(
            p.next_tier,
            Some(NextTier {
                tier: Tier::Illuminated,
                min_level: 5,
                levels_remaining: 5,
            })
        );
    }

    #[test]
    fn test_175_xp() {
        let p = derive_progression(175);
        assert_eq!(p.level, 8);
        assert_eq!(p.tier, Tier::Illuminated);
        assert_eq!(p.xp_into_level, 15);
        assert_eq!(p.xp_to_next_level, 5);
        assert_eq!(p.next_level_xp, 180);
        assert_eq!(p.progress_percentage, 75.0);
    }

    #[test]
    fn test_exact_level_boundary() {
        let p = derive_progression(100);
        assert_eq!(p.level, 5);
        assert_eq!(p.tier, Tier::Illuminated);
        assert_eq!(p.xp_into_level, 0);
        assert_eq!(p.xp_to_next_level, 20);
    }

    #[test]
    fn test_templar_has_no_next_tier() {
        let p = derive_progression(50 * XP_PER_LEVEL);
        assert_eq!(p.tier, Tier::Templar);
        assert!(p.next_tier.is_none());
    }

    #[test]
    fn test_max_xp_does_not_panic() {
        let p = derive_progression(u64::MAX);
        assert_eq!(p.tier, Tier::Templar);
        assert!(p.progress_percentage <= 100.0);
    }
}
