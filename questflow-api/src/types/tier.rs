//! Tier table API types

use questflow_core::{TierInfo, XP_PER_LEVEL};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TierTableResponse {
    pub xp_per_level: u64,
    /// Ascending by minimum level
    pub tiers: Vec<TierInfo>,
}

impl TierTableResponse {
    pub fn current() -> Self {
        Self {
            xp_per_level: XP_PER_LEVEL,
            tiers: questflow_core::tier_table(),
        }
    }
}
