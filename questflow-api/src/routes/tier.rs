//! Tier REST API Routes

use axum::{response::IntoResponse, routing::get, Json, Router};

use crate::state::AppState;
use crate::types::TierTableResponse;

/// GET /api/tiers - The tier table
#[utoipa::path(
    get,
    path = "/api/tiers",
    tag = "Tiers",
    responses(
        (status = 200, description = "Tiers in ascending order", body = TierTableResponse),
    ),
)]
pub async fn list_tiers() -> impl IntoResponse {
    Json(TierTableResponse::current())
}

pub fn create_router() -> Router<AppState> {
    Router::new().route("/", get(list_tiers))
}
