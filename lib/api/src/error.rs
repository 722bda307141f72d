//! Classified API failures.
//!
//! Every failed call is classified exactly once, at the response
//! interceptor, into an [`ApiError`]. Downstream code matches on the
//! variant and never re-inspects status codes or message text.

use serde_json::Value;
use std::fmt;

/// Message fragments that mark a 403 as an account deactivation rather than
/// a plain permission error.
///
/// The back end exposes no error code for this, so the free-text message is
/// matched. Wording changes on the server silently turn a deactivation into
/// a `PermissionDenied`.
const DEACTIVATION_MARKERS: &[&str] = &["deactivated", "inactive"];

/// Fallback shown when the server is unreachable.
pub const NETWORK_FALLBACK: &str =
    "Unable to reach the server. Please check your connection and try again.";
/// Fallback shown for server-side failures.
pub const SERVER_FALLBACK: &str = "Something went wrong on our side. Please try again later.";
/// Fallback shown when the session ended.
pub const SESSION_FALLBACK: &str = "Your session has expired. Please log in again.";
/// Fallback shown for rejected requests without a server message.
pub const REQUEST_FALLBACK: &str = "The request could not be completed.";

/// A classified API failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The stored token expired; the request was never sent.
    SessionExpired,
    /// The server rejected the credential: any 401, or a 403 reporting a
    /// deactivated account.
    AuthRejected {
        status: u16,
        message: Option<String>,
    },
    /// 403 that is not a deactivation.
    PermissionDenied { message: Option<String> },
    /// 404.
    NotFound { message: Option<String> },
    /// 422 and the remaining 4xx business errors.
    ValidationError {
        status: u16,
        message: Option<String>,
    },
    /// 429.
    RateLimited { message: Option<String> },
    /// 5xx.
    ServerError {
        status: u16,
        message: Option<String>,
    },
    /// No response was received.
    NetworkUnavailable { details: String },
    /// A 2xx response whose body did not have the expected shape.
    InvalidResponse { details: String },
    /// The client could not be constructed.
    Configuration { details: String },
}

impl ApiError {
    /// Classifies a response. Returns `None` for success statuses.
    #[must_use]
    pub fn from_response(status: u16, body: &Value) -> Option<Self> {
        if (200..300).contains(&status) {
            return None;
        }
        let message = server_message(body);
        let error = match status {
            401 => Self::AuthRejected { status, message },
            403 if message.as_deref().is_some_and(is_deactivation_message) => {
                Self::AuthRejected { status, message }
            }
            403 => Self::PermissionDenied { message },
            404 => Self::NotFound { message },
            429 => Self::RateLimited { message },
            500..=599 => Self::ServerError { status, message },
            _ => Self::ValidationError { status, message },
        };
        Some(error)
    }

    /// Returns the HTTP status, if a response was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthRejected { status, .. }
            | Self::ValidationError { status, .. }
            | Self::ServerError { status, .. } => Some(*status),
            Self::PermissionDenied { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::RateLimited { .. } => Some(429),
            Self::SessionExpired
            | Self::NetworkUnavailable { .. }
            | Self::InvalidResponse { .. }
            | Self::Configuration { .. } => None,
        }
    }

    /// Returns the server-provided message, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::AuthRejected { message, .. }
            | Self::PermissionDenied { message }
            | Self::NotFound { message }
            | Self::ValidationError { message, .. }
            | Self::RateLimited { message }
            | Self::ServerError { message, .. } => message.as_deref(),
            Self::SessionExpired
            | Self::NetworkUnavailable { .. }
            | Self::InvalidResponse { .. }
            | Self::Configuration { .. } => None,
        }
    }

    /// Returns true if this failure ends the session when it comes back from
    /// an authenticated request.
    #[must_use]
    pub fn ends_session(&self) -> bool {
        matches!(self, Self::SessionExpired | Self::AuthRejected { .. })
    }

    /// Returns true if the server was never reached.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::NetworkUnavailable { .. })
    }

    /// Returns a message safe to show the user.
    ///
    /// Server messages are passed through for business errors; transport
    /// and server failures get a generic retry-suggesting text.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::SessionExpired => SESSION_FALLBACK.to_string(),
            Self::AuthRejected { message, .. } => message
                .clone()
                .unwrap_or_else(|| SESSION_FALLBACK.to_string()),
            Self::PermissionDenied { message }
            | Self::NotFound { message }
            | Self::ValidationError { message, .. }
            | Self::RateLimited { message } => message
                .clone()
                .unwrap_or_else(|| REQUEST_FALLBACK.to_string()),
            Self::ServerError { .. } | Self::InvalidResponse { .. } | Self::Configuration { .. } => {
                SERVER_FALLBACK.to_string()
            }
            Self::NetworkUnavailable { .. } => NETWORK_FALLBACK.to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionExpired => write!(f, "session expired"),
            Self::AuthRejected { status, message } => {
                write!(f, "authentication rejected ({status})")?;
                write_message(f, message.as_deref())
            }
            Self::PermissionDenied { message } => {
                write!(f, "permission denied")?;
                write_message(f, message.as_deref())
            }
            Self::NotFound { message } => {
                write!(f, "not found")?;
                write_message(f, message.as_deref())
            }
            Self::ValidationError { status, message } => {
                write!(f, "request rejected ({status})")?;
                write_message(f, message.as_deref())
            }
            Self::RateLimited { message } => {
                write!(f, "rate limited")?;
                write_message(f, message.as_deref())
            }
            Self::ServerError { status, message } => {
                write!(f, "server error ({status})")?;
                write_message(f, message.as_deref())
            }
            Self::NetworkUnavailable { details } => write!(f, "network unavailable: {details}"),
            Self::InvalidResponse { details } => write!(f, "invalid response: {details}"),
            Self::Configuration { details } => write!(f, "client configuration error: {details}"),
        }
    }
}

impl std::error::Error for ApiError {}

fn write_message(f: &mut fmt::Formatter<'_>, message: Option<&str>) -> fmt::Result {
    match message {
        Some(message) => write!(f, ": {message}"),
        None => Ok(()),
    }
}

/// Extracts the human-readable message from an error body.
///
/// The back end uses `message`, and occasionally `error`; a bare string
/// body is taken as the message.
fn server_message(body: &Value) -> Option<String> {
    let text = match body {
        Value::String(text) => Some(text.as_str()),
        Value::Object(map) => map
            .get("message")
            .or_else(|| map.get("error"))
            .and_then(Value::as_str),
        _ => None,
    };
    text.map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Returns true if a 403 message reports a deactivated or inactive account.
#[must_use]
pub fn is_deactivation_message(message: &str) -> bool {
    let lowered = message.to_lowercase();
    DEACTIVATION_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_is_not_an_error() {
        assert_eq!(ApiError::from_response(200, &json!({})), None);
        assert_eq!(ApiError::from_response(204, &Value::Null), None);
    }

    #[test]
    fn unauthorized_is_auth_rejection() {
        let err = ApiError::from_response(401, &json!({"message": "jwt expired"})).unwrap();
        assert_eq!(
            err,
            ApiError::AuthRejected {
                status: 401,
                message: Some("jwt expired".to_string())
            }
        );
        assert!(err.ends_session());
    }

    #[test]
    fn forbidden_depends_on_message() {
        let deactivated =
            ApiError::from_response(403, &json!({"message": "Account has been DEACTIVATED"}))
                .unwrap();
        assert!(deactivated.ends_session());

        let inactive = ApiError::from_response(403, &json!({"error": "User is inactive"})).unwrap();
        assert!(inactive.ends_session());

        let denied = ApiError::from_response(403, &json!({"message": "Admins only"})).unwrap();
        assert_eq!(
            denied,
            ApiError::PermissionDenied {
                message: Some("Admins only".to_string())
            }
        );
        assert!(!denied.ends_session());

        let bare = ApiError::from_response(403, &Value::Null).unwrap();
        assert!(matches!(bare, ApiError::PermissionDenied { message: None }));
    }

    #[test]
    fn remaining_statuses_never_end_session() {
        for (status, expected_status) in [(404, 404), (422, 422), (429, 429), (500, 500), (400, 400)]
        {
            let err = ApiError::from_response(status, &json!({"message": "nope"})).unwrap();
            assert!(!err.ends_session(), "status {status}");
            assert_eq!(err.status(), Some(expected_status));
        }
        assert!(matches!(
            ApiError::from_response(503, &Value::Null),
            Some(ApiError::ServerError { status: 503, .. })
        ));
        assert!(matches!(
            ApiError::from_response(409, &Value::Null),
            Some(ApiError::ValidationError { status: 409, .. })
        ));
    }

    #[test]
    fn network_failures_never_end_session() {
        let err = ApiError::NetworkUnavailable {
            details: "connection refused".to_string(),
        };
        assert!(!err.ends_session());
        assert!(err.is_network());
        assert_eq!(err.status(), None);
        assert_eq!(err.user_message(), NETWORK_FALLBACK);
    }

    #[test]
    fn user_messages_prefer_server_text_for_business_errors() {
        let err = ApiError::from_response(422, &json!({"message": "Email already registered"}))
            .unwrap();
        assert_eq!(err.user_message(), "Email already registered");

        let err = ApiError::from_response(422, &json!({})).unwrap();
        assert_eq!(err.user_message(), REQUEST_FALLBACK);

        let err = ApiError::from_response(500, &json!({"message": "stack trace here"})).unwrap();
        assert_eq!(err.user_message(), SERVER_FALLBACK);
    }

    #[test]
    fn string_bodies_are_messages() {
        let err = ApiError::from_response(400, &json!("  Bad email  ")).unwrap();
        assert_eq!(err.server_message(), Some("Bad email"));
    }

    #[test]
    fn display_includes_status_and_message() {
        let err = ApiError::ServerError {
            status: 502,
            message: Some("upstream down".to_string()),
        };
        assert_eq!(err.to_string(), "server error (502): upstream down");
        assert_eq!(ApiError::SessionExpired.to_string(), "session expired");
    }
}
