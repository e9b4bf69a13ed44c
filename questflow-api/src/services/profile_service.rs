//! Profile Service
//!
//! Profile creation, lookup and quest completion.

use chrono::Utc;
use questflow_core::{level_for_xp, new_entity_id, NewProfile, QuestCompletion, UserId, UserProfile};
use questflow_storage::QuestStore;

use super::observe;
use crate::error::{ApiError, ApiResult};
use crate::types::CreateProfileRequest;

pub async fn get_profile(store: &dyn QuestStore, user_id: &UserId) -> ApiResult<UserProfile> {
    match observe(store, "profile_get", store.profile_get(user_id)).await? {
        Some(profile) => Ok(profile),
        None => Err(ApiError::entity_not_found("UserProfile", user_id)),
    }
}

/// Create a profile at zero XP.
pub async fn create_profile(
    store: &dyn QuestStore,
    request: CreateProfileRequest,
) -> ApiResult<UserProfile> {
    let new = NewProfile::new(
        &request.user_id,
        request.display_name,
        request.social_profiles,
    )?;
    let profile = UserProfile::create(new_entity_id(), new, Utc::now());

    observe(store, "profile_insert", store.profile_insert(&profile)).await?;

    tracing::info!(user_id = %profile.user_id, profile_id = %profile.id, "Profile created");
    Ok(profile)
}

/// Credit a completed quest worth `xp`.
pub async fn record_quest(
    store: &dyn QuestStore,
    user_id: &UserId,
    xp: u64,
) -> ApiResult<UserProfile> {
    let quest = QuestCompletion::new(xp)?;
    let profile = observe(
        store,
        "profile_record_quest",
        store.profile_record_quest(user_id, quest),
    )
    .await?;

    let previous_level = level_for_xp(profile.xp.saturating_sub(quest.xp()));
    if previous_level < profile.level {
        tracing::info!(
            user_id = %user_id,
            level = profile.level,
            tier = %profile.progression().tier,
            "Level up"
        );
    } else {
        tracing::debug!(user_id = %user_id, xp = profile.xp, "Quest recorded");
    }
    Ok(profile)
}
