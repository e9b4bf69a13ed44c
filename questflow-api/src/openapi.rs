//! OpenAPI Specification for QUESTFLOW API
//!
//! Generated by utoipa from the route annotations and schema derives.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::health::{ComponentHealth, HealthDetails, HealthResponse, HealthStatus};
use crate::routes::{health, profile, referral, tier};
use crate::telemetry::metrics;
use crate::types::*;

use questflow_core::{
    MilestoneStatus, NextTier, Progression, ReferralClaim, ReferralEvent, ReferralStats, Tier,
    TierInfo, UserProfile,
};

/// OpenAPI document for QUESTFLOW API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "QUESTFLOW API",
        version = "0.1.0",
        description = "Quest progression tiers and referral rewards",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    tags(
        (name = "Referrals", description = "Referral stats, events and reward claims"),
        (name = "Profiles", description = "User progression profiles and quest completions"),
        (name = "Tiers", description = "The tier table"),
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Observability", description = "Prometheus metrics")
    ),
    paths(
        referral::get_stats,
        referral::create_event,
        referral::claim,
        referral::list_claims,
        profile::get_profile,
        profile::create_profile,
        profile::record_quest,
        tier::list_tiers,
        health::ping,
        health::liveness,
        health::readiness,
        metrics::metrics_handler,
    ),
    components(
        schemas(
            // === Errors ===
            ApiError, ErrorCode,

            // === Request/Response Types ===
            CreateReferralEventRequest, ClaimResponse, ListClaimsResponse,
            CreateProfileRequest, RecordQuestRequest, ProfileResponse, TierTableResponse,
            HealthResponse, HealthStatus, HealthDetails, ComponentHealth,

            // === Domain Types ===
            ReferralStats, ReferralEvent, ReferralClaim, MilestoneStatus,
            UserProfile, Progression, NextTier, Tier, TierInfo
        )
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate OpenAPI spec as JSON string.
    pub fn to_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() -> Result<(), String> {
        let openapi = ApiDoc::openapi();
        assert_eq!(openapi.info.title, "QUESTFLOW API");

        let tags = openapi
            .tags
            .as_ref()
            .ok_or_else(|| "OpenAPI tags missing".to_string())?;
        assert_eq!(tags.len(), 5);

        for path in [
            "/api/referrals/stats/{user_id}",
            "/api/referrals/event",
            "/api/referrals/claim/{user_id}",
            "/api/profiles/{user_id}/quests",
            "/health/ready",
        ] {
            assert!(openapi.paths.paths.contains_key(path), "missing path {}", path);
        }
        Ok(())
    }

    #[test]
    fn test_openapi_json_serializes() -> Result<(), serde_json::Error> {
        let json = ApiDoc::to_json()?;
        assert!(json.contains("claimableRewards"));
        assert!(json.contains("NO_REWARDS_AVAILABLE"));
        Ok(())
    }

    #[test]
    fn test_timestamps_are_date_time_strings() -> Result<(), serde_json::Error> {
        let doc = serde_json::to_value(ApiDoc::openapi())?;
        let schemas = &doc["components"]["schemas"];
        for (schema, field) in [
            ("UserProfile", "createdAt"),
            ("UserProfile", "updatedAt"),
            ("ReferralEvent", "createdAt"),
            ("ReferralClaim", "createdAt"),
        ] {
            let property = &schemas[schema]["properties"][field];
            assert_eq!(property["type"], "string", "{schema}.{field}");
            assert_eq!(property["format"], "date-time", "{schema}.{field}");
        }
        Ok(())
    }
}
