//! Path extractor for user identifiers.
//!
//! `PathUserId` pulls the single `:user_id` segment and validates it as a
//! [`UserId`], so handlers never see blank or over-long ids.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use questflow_core::UserId;

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathUserId(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for PathUserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                ApiError::invalid_input(format!("Invalid user id in path: {}", e.body_text()))
            })?;
        let user_id = UserId::parse(&raw)?;
        Ok(PathUserId(user_id))
    }
}
