//! QUESTFLOW Core - Progression and Referral Rewards
//!
//! Pure types and engines with no I/O. Stores load raw counters (XP, referral
//! counts, claimed sums) and hand them to the functions in this crate, which
//! derive everything a client sees.

pub mod amount;
pub mod config;
pub mod entities;
pub mod error;
pub mod identity;
pub mod milestone;
pub mod progression;
pub mod referral;
pub mod tier;

pub use amount::{Ttrust, HUNDREDTHS_PER_TTRUST};
pub use config::{RewardsConfig, DEFAULT_PUBLIC_URL};
pub use entities::{
    NewProfile, NewReferralEvent, QuestCompletion, ReferralClaim, ReferralEvent, UserProfile,
    MAX_DISPLAY_NAME_LEN, MAX_QUEST_XP, MIN_QUEST_XP,
};
pub use error::{
    ConfigError, EntityKind, QuestError, QuestResult, RewardsError, StorageError, ValidationError,
};
pub use identity::{new_entity_id, EntityId, Timestamp, UserId, MAX_USER_ID_LEN};
pub use milestone::{
    Milestone, MilestoneStatus, MilestoneTable, DEFAULT_MILESTONES, DEFAULT_REPEAT_INTERVAL,
};
pub use progression::{derive_progression, level_for_xp, NextTier, Progression, XP_PER_LEVEL};
pub use referral::{
    compute_stats, plan_claim, referral_link, ClaimPlan, ReferralLedger, ReferralStats,
    MAX_CLAIM_HUNDREDTHS,
};
pub use tier::{tier_table, Tier, TierInfo, TierParseError, TierThreshold, TIER_THRESHOLDS};
