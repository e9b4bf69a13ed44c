//! Identity types for QUESTFLOW entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::ValidationError;

/// Record identifier using UUIDv7 for timestamp-sortable IDs.
pub type EntityId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new UUIDv7 EntityId (timestamp-sortable).
pub fn new_entity_id() -> EntityId {
    Uuid::now_v7()
}

/// Maximum accepted length of a user id, in bytes.
pub const MAX_USER_ID_LEN: usize = 128;

/// Opaque user identifier.
///
/// User ids originate in the external account system and arrive as path
/// parameters or request fields. They are trimmed and must be non-empty,
/// at most [`MAX_USER_ID_LEN`] bytes, and free of control characters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and normalize a raw user id.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::RequiredFieldMissing {
                field: "userId".to_string(),
            });
        }
        if trimmed.len() > MAX_USER_ID_LEN {
            return Err(ValidationError::InvalidValue {
                field: "userId".to_string(),
                reason: format!("must be at most {} bytes", MAX_USER_ID_LEN),
            });
        }
        if trimmed.chars().any(char::is_control) {
            return Err(ValidationError::InvalidValue {
                field: "userId".to_string(),
                reason: "must not contain control characters".to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        UserId::parse(&value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_trims() -> Result<(), ValidationError> {
        let id = UserId::parse("  user-123 ")?;
        assert_eq!(id.as_str(), "user-123");
        Ok(())
    }

    #[test]
    fn test_user_id_rejects_empty_and_control() {
        assert!(UserId::parse("").is_err());
        assert!(UserId::parse("   ").is_err());
        assert!(UserId::parse("bad\u{0}id").is_err());
        assert!(UserId::parse(&"x".repeat(MAX_USER_ID_LEN + 1)).is_err());
    }

    #[test]
    fn test_user_id_serde_validates() {
        let ok: Result<UserId, _> = serde_json::from_str("\"abc\"");
        assert!(ok.is_ok());
        let bad: Result<UserId, _> = serde_json::from_str("\"  \"");
        assert!(bad.is_err());
    }
}
