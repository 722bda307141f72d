//! Error types for the session crate.
//!
//! These describe a stale or corrupt local session. They are resolved by
//! clearing the session record and are never shown to the user; they exist
//! so the reason can be logged.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::flags::SessionFlags;

/// Reasons a stored session record is not usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No token is stored.
    MissingToken,
    /// The token could not be decoded into claims.
    MalformedToken,
    /// The token's expiry has passed.
    ExpiredToken { expired_at: DateTime<Utc> },
    /// The stored role flags contradict each other or the token.
    FlagInconsistency {
        flags: SessionFlags,
        /// The token's `is_admin` claim, when the token was readable.
        is_admin: Option<bool>,
    },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingToken => write!(f, "no session token stored"),
            Self::MalformedToken => write!(f, "session token is malformed"),
            Self::ExpiredToken { expired_at } => {
                write!(f, "session token expired at {expired_at}")
            }
            Self::FlagInconsistency { flags, is_admin } => {
                write!(
                    f,
                    "session flags inconsistent (adminAuthenticated={}, userLoggedIn={}",
                    flags.admin, flags.institution
                )?;
                match is_admin {
                    Some(is_admin) => write!(f, ", is_admin={is_admin})"),
                    None => write!(f, ")"),
                }
            }
        }
    }
}

impl std::error::Error for SessionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_token_display_includes_time() {
        let expired_at = DateTime::from_timestamp(0, 0).expect("epoch");
        let err = SessionError::ExpiredToken { expired_at };
        assert!(err.to_string().contains("expired"));
        assert!(err.to_string().contains("1970"));
    }

    #[test]
    fn flag_inconsistency_display() {
        let err = SessionError::FlagInconsistency {
            flags: SessionFlags {
                admin: true,
                institution: false,
            },
            is_admin: Some(false),
        };
        let text = err.to_string();
        assert!(text.contains("adminAuthenticated=true"));
        assert!(text.contains("userLoggedIn=false"));
        assert!(text.contains("is_admin=false"));
    }

    #[test]
    fn flag_inconsistency_without_claim_display() {
        let err = SessionError::FlagInconsistency {
            flags: SessionFlags {
                admin: true,
                institution: true,
            },
            is_admin: None,
        };
        assert!(!err.to_string().contains("is_admin"));
    }
}
