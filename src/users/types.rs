use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use super::error::ApiError;

static USER_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$",
    )
    .expect("user id pattern is a valid regex")
});

/// Identifier of a user record.
///
/// Generated once as a UUID v4 string when the record is created and never
/// rewritten afterwards. Lookups compare the textual form exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Accepts only the hyphenated 8-4-4-4-12 hex form.
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        if USER_ID_PATTERN.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(ApiError::InvalidUserId)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub age: serde_json::Number,
    pub hobbies: Vec<String>,
}

impl UserRecord {
    pub fn from_draft(id: UserId, draft: UserDraft) -> Self {
        Self {
            id,
            username: draft.username,
            age: draft.age,
            hobbies: draft.hobbies,
        }
    }
}

/// Validated field set for a create or replace.
#[derive(Debug, Clone, PartialEq)]
pub struct UserDraft {
    pub username: String,
    pub age: serde_json::Number,
    pub hobbies: Vec<String>,
}

/// Raw request body for POST and PUT.
///
/// `username` and `age` stay untyped so that a wrong type is reported as a
/// missing field rather than as a malformed body.
#[derive(Debug, Default, Deserialize)]
pub struct UserPayload {
    #[serde(default)]
    pub username: Option<serde_json::Value>,
    #[serde(default)]
    pub age: Option<serde_json::Value>,
    #[serde(default)]
    pub hobbies: Option<Vec<String>>,
}

impl UserPayload {
    /// Empty bodies behave like `{}`.
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        serde_json::from_slice(body).map_err(|e| {
            tracing::debug!("Rejected request body: {}", e);
            ApiError::InvalidBody
        })
    }

    /// Presence check: a non-empty username string and a non-zero numeric age.
    pub fn into_draft(self) -> Result<UserDraft, ApiError> {
        let username = match self.username {
            Some(serde_json::Value::String(name)) if !name.is_empty() => name,
            _ => return Err(ApiError::MissingFields),
        };

        let age = match self.age {
            Some(serde_json::Value::Number(age)) if !is_zero(&age) => age,
            _ => return Err(ApiError::MissingFields),
        };

        Ok(UserDraft {
            username,
            age,
            hobbies: self.hobbies.unwrap_or_default(),
        })
    }
}

fn is_zero(number: &serde_json::Number) -> bool {
    number.as_f64().map(|value| value == 0.0).unwrap_or(false)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_accepts_generated_ids() {
        let id = UserId::new();
        assert_eq!(UserId::parse(id.as_str()).unwrap(), id);
    }

    #[test]
    fn test_user_id_rejects_non_hyphenated_forms() {
        assert!(UserId::parse("not-a-uuid").is_err());
        assert!(UserId::parse("67e5504410b1426f9247bb680e5fe0c8").is_err());
        assert!(UserId::parse("{67e55044-10b1-426f-9247-bb680e5fe0c8}").is_err());
        assert!(UserId::parse("67E55044-10B1-426F-9247-BB680E5FE0C8").is_ok());
    }

    #[test]
    fn test_payload_empty_body_is_empty_object() {
        let payload = UserPayload::from_body(b"").unwrap();
        assert!(payload.username.is_none());
        assert!(matches!(payload.into_draft(), Err(ApiError::MissingFields)));
    }

    #[test]
    fn test_payload_zero_age_counts_as_missing() {
        let payload = UserPayload::from_body(br#"{"username":"X","age":0}"#).unwrap();
        assert!(matches!(payload.into_draft(), Err(ApiError::MissingFields)));
    }

    #[test]
    fn test_payload_defaults_hobbies() {
        let draft = UserPayload::from_body(br#"{"username":"X","age":1,"hobbies":null}"#)
            .unwrap()
            .into_draft()
            .unwrap();
        assert_eq!(draft.username, "X");
        assert!(draft.hobbies.is_empty());
    }
}
