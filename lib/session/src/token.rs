//! Bearer token decoding.
//!
//! Tokens are JWT-shaped: `base64url(header).base64url(payload).signature`.
//! Only the payload is read here; the signature is the back end's concern.
//! Every function is a pure function of the token string and a clock
//! reading, and none of them fails outward: anything that cannot be decoded
//! is reported as "no claims" and treated as expired.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use credit_office_core::AccountId;
use serde::{Deserialize, Serialize};

use crate::role::Role;

/// Claims carried in a token's payload segment.
///
/// Claims are recomputed from the raw token on demand and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Account identifier.
    pub id: AccountId,
    /// Display name of the account holder.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Free-form role label assigned by the back end.
    pub role: String,
    /// Whether the account is a system administrator.
    pub is_admin: bool,
    /// Whether the account is active.
    pub is_active: bool,
    /// Issued-at, epoch seconds.
    pub iat: i64,
    /// Expiry, epoch seconds.
    pub exp: i64,
}

impl TokenClaims {
    /// Returns the workspace role implied by the `is_admin` claim.
    #[must_use]
    pub fn workspace_role(&self) -> Role {
        Role::from_is_admin(self.is_admin)
    }

    /// Returns when the token was issued.
    #[must_use]
    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.iat, 0).unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// Returns when the token expires.
    ///
    /// An out-of-range `exp` maps to the epoch, which reads as long expired.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::UNIX_EPOCH)
    }
}

/// Decodes a token's payload into claims.
///
/// Returns `None` unless the token has exactly three dot-separated segments
/// and the middle one is base64 (URL-safe or standard alphabet, padding
/// optional) holding a JSON object with every required claim.
#[must_use]
pub fn decode(token: &str) -> Option<TokenClaims> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return None;
    };

    let payload = payload.trim_end_matches('=');
    if payload.is_empty() {
        return None;
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| STANDARD_NO_PAD.decode(payload))
        .ok()?;

    serde_json::from_slice(&bytes).ok()
}

/// Returns true if the token cannot be decoded or has expired.
#[must_use]
pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, Utc::now())
}

/// [`is_expired`] against an explicit clock reading.
#[must_use]
pub fn is_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    match decode(token) {
        Some(claims) => claims.exp <= now.timestamp(),
        None => true,
    }
}

/// Returns how long the token stays valid, clamped at zero.
///
/// Undecodable tokens have no time remaining.
#[must_use]
pub fn time_remaining(token: &str) -> Duration {
    time_remaining_at(token, Utc::now())
}

/// [`time_remaining`] against an explicit clock reading.
#[must_use]
pub fn time_remaining_at(token: &str, now: DateTime<Utc>) -> Duration {
    match decode(token) {
        Some(claims) if claims.exp > now.timestamp() => {
            Duration::try_seconds(claims.exp - now.timestamp()).unwrap_or(Duration::MAX)
        }
        _ => Duration::zero(),
    }
}

/// Returns true if the token is still valid but expires within
/// `threshold_minutes`.
#[must_use]
pub fn expires_soon(token: &str, threshold_minutes: i64) -> bool {
    expires_soon_at(token, threshold_minutes, Utc::now())
}

/// [`expires_soon`] against an explicit clock reading.
#[must_use]
pub fn expires_soon_at(token: &str, threshold_minutes: i64, now: DateTime<Utc>) -> bool {
    let remaining = time_remaining_at(token, now);
    let threshold = Duration::try_minutes(threshold_minutes).unwrap_or(Duration::MAX);
    remaining > Duration::zero() && remaining <= threshold
}
