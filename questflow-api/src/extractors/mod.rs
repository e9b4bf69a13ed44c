//! Custom extractors that reject with `ApiError` bodies.

pub mod json;
pub mod user_id;

pub use json::ApiJson;
pub use user_id::PathUserId;
