//! Referral REST API Routes
//!
//! Thin handlers over `services::referral_service`. User ids come from the
//! path or the body; nothing is read from ambient state.

use axum::{extract::State, response::IntoResponse, routing::{get, post}, Json, Router};
use questflow_core::RewardsConfig;
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    extractors::{ApiJson, PathUserId},
    services,
    state::{AppState, SharedStore},
    types::{ClaimResponse, CreateReferralEventRequest, ListClaimsResponse},
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/referrals/stats/:user_id - Referral stats for a user
#[utoipa::path(
    get,
    path = "/api/referrals/stats/{user_id}",
    tag = "Referrals",
    params(
        ("user_id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Referral stats", body = questflow_core::ReferralStats),
        (status = 400, description = "Invalid user id", body = ApiError),
        (status = 500, description = "Store failure", body = ApiError),
    ),
)]
pub async fn get_stats(
    State(store): State<SharedStore>,
    State(rewards): State<Arc<RewardsConfig>>,
    PathUserId(user_id): PathUserId,
) -> ApiResult<impl IntoResponse> {
    let stats = services::referral_stats(store.as_ref(), &rewards, &user_id).await?;
    Ok(Json(stats))
}

/// POST /api/referrals/event - Record a referral
#[utoipa::path(
    post,
    path = "/api/referrals/event",
    tag = "Referrals",
    request_body = CreateReferralEventRequest,
    responses(
        (status = 200, description = "Referral recorded", body = questflow_core::ReferralEvent),
        (status = 400, description = "Missing ids, self-referral or malformed body", body = ApiError),
        (status = 409, description = "Pair already recorded", body = ApiError),
        (status = 500, description = "Store failure", body = ApiError),
    ),
)]
pub async fn create_event(
    State(store): State<SharedStore>,
    ApiJson(req): ApiJson<CreateReferralEventRequest>,
) -> ApiResult<impl IntoResponse> {
    let event = services::record_referral(store.as_ref(), req).await?;
    Ok(Json(event))
}

/// POST /api/referrals/claim/:user_id - Claim all claimable rewards
#[utoipa::path(
    post,
    path = "/api/referrals/claim/{user_id}",
    tag = "Referrals",
    params(
        ("user_id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Rewards claimed", body = ClaimResponse),
        (status = 400, description = "Nothing claimable", body = ApiError),
        (status = 500, description = "Store failure", body = ApiError),
    ),
)]
pub async fn claim(
    State(store): State<SharedStore>,
    State(rewards): State<Arc<RewardsConfig>>,
    PathUserId(user_id): PathUserId,
) -> ApiResult<impl IntoResponse> {
    let response = services::claim_rewards(store.as_ref(), &rewards, &user_id).await?;
    Ok(Json(response))
}

/// GET /api/referrals/claims/:user_id - Claim history
#[utoipa::path(
    get,
    path = "/api/referrals/claims/{user_id}",
    tag = "Referrals",
    params(
        ("user_id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Claims, oldest first", body = ListClaimsResponse),
        (status = 500, description = "Store failure", body = ApiError),
    ),
)]
pub async fn list_claims(
    State(store): State<SharedStore>,
    PathUserId(user_id): PathUserId,
) -> ApiResult<impl IntoResponse> {
    let claims = services::claim_history(store.as_ref(), &user_id).await?;
    let total = claims.len();
    Ok(Json(ListClaimsResponse { claims, total }))
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/stats/:user_id", get(get_stats))
        .route("/event", post(create_event))
        .route("/claim/:user_id", post(claim))
        .route("/claims/:user_id", get(list_claims))
}
