//! Identifier types for accounts known to the back office.
//!
//! Account identifiers are issued by the remote API and arrive inside token
//! claims and response bodies. The back end emits them either as JSON
//! numbers or as strings, so `AccountId` accepts both and normalizes to a
//! string.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when parsing an ID from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse.
    pub id_type: &'static str,
    /// The reason for the parse failure.
    pub reason: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {}: {}", self.id_type, self.reason)
    }
}

impl std::error::Error for ParseIdError {}

/// Identifier of an administrator or institution account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Creates an account ID from its string form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseIdError {
                id_type: "AccountId",
                reason: "empty identifier".to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl From<u64> for AccountId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Self(n.to_string())),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_numeric_id() {
        let id: AccountId = serde_json::from_str("42").expect("deserialize");
        assert_eq!(id.as_str(), "42");
    }

    #[test]
    fn deserializes_string_id() {
        let id: AccountId = serde_json::from_str("\"inst-7\"").expect("deserialize");
        assert_eq!(id, AccountId::new("inst-7"));
    }

    #[test]
    fn rejects_empty_string_id() {
        let result: Result<AccountId, _> = serde_json::from_str("\"  \"");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_non_scalar_id() {
        let result: Result<AccountId, _> = serde_json::from_str("{\"id\": 1}");
        assert!(result.is_err());
    }

    #[test]
    fn parse_reports_type() {
        let err = "".parse::<AccountId>().unwrap_err();
        assert_eq!(err.id_type, "AccountId");
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&AccountId::from(9)).expect("serialize");
        assert_eq!(json, "\"9\"");
    }
}
