//! HTTP error envelope.
//!
//! Every failure leaves a handler as an [`ApiError`]: a stable machine code,
//! a message safe to show a client, and optional structured details such as
//! the offending field. Store failures are logged here and replaced by a
//! generic message, so connection strings and SQL never reach a response.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use questflow_core::{QuestError, RewardsError, StorageError, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

const STORE_FAILURE_MESSAGE: &str = "Database operation failed";

/// Machine-readable error category, serialized as `SCREAMING_SNAKE_CASE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // 400
    ValidationFailed,
    InvalidInput,
    MissingField,
    InvalidRange,
    /// A claim was requested while the claimable balance is zero.
    NoRewardsAvailable,

    // 404
    EntityNotFound,

    // 409
    /// Duplicate referral pair or profile.
    EntityAlreadyExists,

    // 5xx
    InternalError,
    DatabaseError,
    ServiceUnavailable,
}

impl ErrorCode {
    pub fn status_code(self) -> StatusCode {
        use ErrorCode::*;
        match self {
            ValidationFailed | InvalidInput | MissingField | InvalidRange
            | NoRewardsAvailable => StatusCode::BAD_REQUEST,
            EntityNotFound => StatusCode::NOT_FOUND,
            EntityAlreadyExists => StatusCode::CONFLICT,
            InternalError | DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// JSON body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// `details.field` carries the wire name of the missing field.
    pub fn missing_field(field: &str) -> Self {
        Self::new(ErrorCode::MissingField, format!("{} is required", field))
            .with_details(json!({ "field": field }))
    }

    pub fn invalid_range(field: &str, min: impl fmt::Display, max: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::InvalidRange,
            format!("{} must be between {} and {}", field, min, max),
        )
        .with_details(json!({ "field": field, "min": min.to_string(), "max": max.to_string() }))
    }

    pub fn no_rewards_available() -> Self {
        Self::new(ErrorCode::NoRewardsAvailable, "No rewards available to claim")
    }

    pub fn entity_not_found(entity: &str, key: impl fmt::Display) -> Self {
        Self::new(ErrorCode::EntityNotFound, format!("{} for {} not found", entity, key))
    }

    pub fn entity_already_exists(entity: &str, key: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::EntityAlreadyExists,
            format!("{} for {} already exists", entity, key),
        )
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn database_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

/// Unparseable bodies and a missing `Content-Type` are both plain 400s.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_input(rejection.body_text())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::RequiredFieldMissing { field } => ApiError::missing_field(&field),
            ValidationError::OutOfRange { field, min, max } => {
                ApiError::invalid_range(&field, min, max)
            }
            ValidationError::InvalidValue { ref field, .. } => {
                let details = json!({ "field": field });
                ApiError::validation_failed(err.to_string()).with_details(details)
            }
        }
    }
}

impl From<QuestError> for ApiError {
    fn from(err: QuestError) -> Self {
        match err {
            QuestError::Validation(e) => e.into(),
            QuestError::Rewards(RewardsError::NoRewardsAvailable) => {
                ApiError::no_rewards_available()
            }
            QuestError::Rewards(e) => {
                tracing::error!(error = %e, "Reward computation failed");
                ApiError::internal_error("Failed to compute rewards")
            }
            QuestError::Storage(StorageError::NotFound { entity, key }) => {
                ApiError::entity_not_found(&format!("{:?}", entity), key)
            }
            QuestError::Storage(StorageError::Conflict { entity, key }) => {
                ApiError::entity_already_exists(&format!("{:?}", entity), key)
            }
            QuestError::Storage(e) => {
                tracing::error!(error = %e, "Store operation failed");
                ApiError::database_error(STORE_FAILURE_MESSAGE)
            }
            QuestError::Config(e) => {
                tracing::error!(error = %e, "Rewards configuration rejected");
                ApiError::internal_error("Service misconfigured")
            }
        }
    }
}

// Raised while building the pool and applying migrations at startup.

impl From<tokio_postgres::Error> for ApiError {
    fn from(err: tokio_postgres::Error) -> Self {
        tracing::error!(error = %err, "Postgres statement failed");
        ApiError::database_error(STORE_FAILURE_MESSAGE)
    }
}

impl From<deadpool_postgres::PoolError> for ApiError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        tracing::error!(error = %err, "Could not check out a Postgres connection");
        match err {
            deadpool_postgres::PoolError::Closed => {
                ApiError::service_unavailable("Store connection pool is closed")
            }
            _ => ApiError::database_error(STORE_FAILURE_MESSAGE),
        }
    }
}
