//! Error types for QUESTFLOW operations

use thiserror::Error;

/// Entity kinds that storage errors refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    UserProfile,
    ReferralEvent,
}

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Entity not found: {entity:?} for {key}")]
    NotFound { entity: EntityKind, key: String },

    #[error("{entity:?} already exists for {key}")]
    Conflict { entity: EntityKind, key: String },

    #[error("Query failed: {reason}")]
    QueryFailed { reason: String },

    #[error("Transaction failed: {reason}")]
    TransactionFailed { reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Validation errors for caller-supplied input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Value for {field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },
}

/// Reward computation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RewardsError {
    #[error("No rewards available to claim")]
    NoRewardsAvailable,

    #[error("Claim amount {hundredths} exceeds the ledger range")]
    AmountOutOfRange { hundredths: u64 },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all QUESTFLOW errors.
#[derive(Debug, Clone, Error)]
pub enum QuestError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Rewards error: {0}")]
    Rewards(#[from] RewardsError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for QUESTFLOW operations.
pub type QuestResult<T> = Result<T, QuestError>;
