//! Referral-related API types

use questflow_core::{ReferralClaim, ReferralStats};
use serde::{Deserialize, Serialize};

/// Request to record a referral.
///
/// Missing ids deserialize as empty strings and are reported by validation as
/// missing fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateReferralEventRequest {
    /// User who shared the link
    #[serde(default)]
    pub referrer_user_id: String,
    /// User who signed up through it
    #[serde(default)]
    pub referred_user_id: String,
}

/// Result of a successful claim: the written ledger row and the stats after
/// it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ClaimResponse {
    pub claim: ReferralClaim,
    pub stats: ReferralStats,
}

/// A user's claim history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ListClaimsResponse {
    pub claims: Vec<ReferralClaim>,
    pub total: usize,
}
