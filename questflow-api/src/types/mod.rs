//! API Request and Response Types
//!
//! Bodies are camelCase JSON. Domain records (`ReferralEvent`,
//! `ReferralClaim`, `UserProfile`, `ReferralStats`, `TierInfo`) are returned
//! as-is from `questflow-core`; only envelopes and request bodies live here.

// Referral types
mod referral;
pub use referral::*;

// Profile types
mod profile;
pub use profile::*;

// Tier types
mod tier;
pub use tier::*;
