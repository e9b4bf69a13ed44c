//! Persisted records and the validated inputs that create them.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::amount::Ttrust;
use crate::error::ValidationError;
use crate::identity::{EntityId, Timestamp, UserId};
use crate::progression::{derive_progression, level_for_xp, Progression};

/// Longest accepted display name, in characters.
pub const MAX_DISPLAY_NAME_LEN: usize = 64;

/// XP accepted for a single quest completion.
pub const MIN_QUEST_XP: u64 = 1;
pub const MAX_QUEST_XP: u64 = 100_000;

// ============================================================================
// PROFILES
// ============================================================================

/// A user's progression profile.
///
/// `level` is stored alongside `xp` for querying but is only ever written as
/// `level_for_xp(xp)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub user_id: UserId,
    pub display_name: Option<String>,
    pub xp: u64,
    pub level: u64,
    pub quests_completed: u64,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub social_profiles: JsonValue,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

impl UserProfile {
    /// A fresh profile at zero XP.
    pub fn create(id: EntityId, new: NewProfile, now: Timestamp) -> Self {
        Self {
            id,
            user_id: new.user_id,
            display_name: new.display_name,
            xp: 0,
            level: 0,
            quests_completed: 0,
            social_profiles: new.social_profiles,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn progression(&self) -> Progression {
        derive_progression(self.xp)
    }

    /// Credit a completed quest. XP saturates; level follows XP.
    pub fn apply_quest(&mut self, quest: QuestCompletion, now: Timestamp) {
        self.xp = self.xp.saturating_add(quest.xp());
        self.level = level_for_xp(self.xp);
        self.quests_completed = self.quests_completed.saturating_add(1);
        self.updated_at = now;
    }
}

/// Validated input for creating a profile.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProfile {
    pub user_id: UserId,
    pub display_name: Option<String>,
    pub social_profiles: JsonValue,
}

impl NewProfile {
    pub fn new(
        user_id: &str,
        display_name: Option<String>,
        social_profiles: Option<JsonValue>,
    ) -> Result<Self, ValidationError> {
        let user_id = UserId::parse(user_id)?;

        let display_name = match display_name.map(|n| n.trim().to_string()) {
            Some(name) if name.is_empty() => None,
            Some(name) if name.chars().count() > MAX_DISPLAY_NAME_LEN => {
                return Err(ValidationError::InvalidValue {
                    field: "displayName".to_string(),
                    reason: format!("must be at most {} characters", MAX_DISPLAY_NAME_LEN),
                });
            }
            other => other,
        };

        let social_profiles = match social_profiles {
            None | Some(JsonValue::Null) => JsonValue::Object(Default::default()),
            Some(obj @ JsonValue::Object(_)) => obj,
            Some(_) => {
                return Err(ValidationError::InvalidValue {
                    field: "socialProfiles".to_string(),
                    reason: "must be a JSON object".to_string(),
                });
            }
        };

        Ok(Self {
            user_id,
            display_name,
            social_profiles,
        })
    }
}

/// XP awarded for one completed quest, within
/// `MIN_QUEST_XP..=MAX_QUEST_XP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestCompletion {
    xp: u64,
}

impl QuestCompletion {
    pub fn new(xp: u64) -> Result<Self, ValidationError> {
        if !(MIN_QUEST_XP..=MAX_QUEST_XP).contains(&xp) {
            return Err(ValidationError::OutOfRange {
                field: "xp".to_string(),
                min: MIN_QUEST_XP as i64,
                max: MAX_QUEST_XP as i64,
            });
        }
        Ok(Self { xp })
    }

    pub fn xp(self) -> u64 {
        self.xp
    }
}

// ============================================================================
// REFERRALS
// ============================================================================

/// One successful referral. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ReferralEvent {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub referrer_user_id: UserId,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub referred_user_id: UserId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
}

impl ReferralEvent {
    pub fn create(id: EntityId, new: NewReferralEvent, now: Timestamp) -> Self {
        Self {
            id,
            referrer_user_id: new.referrer_user_id,
            referred_user_id: new.referred_user_id,
            created_at: now,
        }
    }
}

/// Validated referral: both ids present and distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReferralEvent {
    pub referrer_user_id: UserId,
    pub referred_user_id: UserId,
}

impl NewReferralEvent {
    pub fn new(referrer_user_id: &str, referred_user_id: &str) -> Result<Self, ValidationError> {
        let referrer_user_id = UserId::parse(referrer_user_id).map_err(|e| rename_field(e, "referrerUserId"))?;
        let referred_user_id = UserId::parse(referred_user_id).map_err(|e| rename_field(e, "referredUserId"))?;
        if referrer_user_id == referred_user_id {
            return Err(ValidationError::InvalidValue {
                field: "referredUserId".to_string(),
                reason: "a user cannot refer themselves".to_string(),
            });
        }
        Ok(Self {
            referrer_user_id,
            referred_user_id,
        })
    }
}

fn rename_field(err: ValidationError, field: &str) -> ValidationError {
    match err {
        ValidationError::RequiredFieldMissing { .. } => ValidationError::RequiredFieldMissing {
            field: field.to_string(),
        },
        ValidationError::InvalidValue { reason, .. } => ValidationError::InvalidValue {
            field: field.to_string(),
            reason,
        },
        ValidationError::OutOfRange { min, max, .. } => ValidationError::OutOfRange {
            field: field.to_string(),
            min,
            max,
        },
    }
}

/// A committed claim. `amount` is the integer hundredths written to the
/// ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ReferralClaim {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub user_id: UserId,
    #[serde(with = "crate::amount::hundredths")]
    #[cfg_attr(feature = "openapi", schema(value_type = u64, example = 150))]
    pub amount: Ttrust,
    pub referral_count: u64,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
}
