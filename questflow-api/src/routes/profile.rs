//! Profile REST API Routes

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::{
    error::{ApiError, ApiResult},
    extractors::{ApiJson, PathUserId},
    services,
    state::{AppState, SharedStore},
    types::{CreateProfileRequest, ProfileResponse, RecordQuestRequest},
};

/// GET /api/profiles/:user_id - Profile with derived progression
#[utoipa::path(
    get,
    path = "/api/profiles/{user_id}",
    tag = "Profiles",
    params(
        ("user_id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Profile found", body = ProfileResponse),
        (status = 404, description = "No profile for this user", body = ApiError),
    ),
)]
pub async fn get_profile(
    State(store): State<SharedStore>,
    PathUserId(user_id): PathUserId,
) -> ApiResult<impl IntoResponse> {
    let profile = services::get_profile(store.as_ref(), &user_id).await?;
    Ok(Json(ProfileResponse::from(profile)))
}

/// POST /api/profiles - Create a profile
#[utoipa::path(
    post,
    path = "/api/profiles",
    tag = "Profiles",
    request_body = CreateProfileRequest,
    responses(
        (status = 201, description = "Profile created", body = ProfileResponse),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 409, description = "Profile already exists", body = ApiError),
    ),
)]
pub async fn create_profile(
    State(store): State<SharedStore>,
    ApiJson(req): ApiJson<CreateProfileRequest>,
) -> ApiResult<impl IntoResponse> {
    let profile = services::create_profile(store.as_ref(), req).await?;
    Ok((StatusCode::CREATED, Json(ProfileResponse::from(profile))))
}

/// POST /api/profiles/:user_id/quests - Record a completed quest
#[utoipa::path(
    post,
    path = "/api/profiles/{user_id}/quests",
    tag = "Profiles",
    params(
        ("user_id" = String, Path, description = "User ID")
    ),
    request_body = RecordQuestRequest,
    responses(
        (status = 200, description = "Quest recorded", body = ProfileResponse),
        (status = 400, description = "XP out of range", body = ApiError),
        (status = 404, description = "No profile for this user", body = ApiError),
    ),
)]
pub async fn record_quest(
    State(store): State<SharedStore>,
    PathUserId(user_id): PathUserId,
    ApiJson(req): ApiJson<RecordQuestRequest>,
) -> ApiResult<impl IntoResponse> {
    let profile = services::record_quest(store.as_ref(), &user_id, req.xp).await?;
    Ok(Json(ProfileResponse::from(profile)))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_profile))
        .route("/:user_id", get(get_profile))
        .route("/:user_id/quests", post(record_quest))
}
