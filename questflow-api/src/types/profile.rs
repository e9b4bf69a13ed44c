//! Profile-related API types

use questflow_core::{Progression, UserProfile};
use serde::{Deserialize, Serialize};

/// Request to create a profile.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileRequest {
    #[serde(default)]
    pub user_id: String,
    /// Blank names are stored as absent
    pub display_name: Option<String>,
    /// Free-form JSON object of linked social accounts
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub social_profiles: Option<serde_json::Value>,
}

/// Request to credit a completed quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RecordQuestRequest {
    /// XP awarded, 1 to 100000
    pub xp: u64,
}

/// A profile with its derived level, tier and progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ProfileResponse {
    pub profile: UserProfile,
    pub progression: Progression,
}

impl From<UserProfile> for ProfileResponse {
    fn from(profile: UserProfile) -> Self {
        let progression = profile.progression();
        Self {
            profile,
            progression,
        }
    }
}
