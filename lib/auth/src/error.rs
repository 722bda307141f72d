//! Error types for session manager operations.

use credit_office_api::ApiError;
use credit_office_session::{Role, SessionError};
use std::fmt;

/// Fallback shown when a login fails without a server message.
pub const LOGIN_FALLBACK: &str = "Login failed. Please check your credentials and try again.";

/// Errors surfaced by the session manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The server refused the login.
    LoginFailed { message: Option<String> },
    /// The login response carried a token that cannot back a session.
    InvalidToken { reason: SessionError },
    /// The token's role claim disagrees with the workspace logged into.
    RoleMismatch { requested: Role, token_role: Role },
    /// The token marks the account inactive.
    AccountInactive,
    /// A logout, unmount, or newer operation landed first; the result was
    /// discarded.
    Superseded,
    /// The call failed for a reason the session manager does not handle.
    Request(ApiError),
}

impl AuthError {
    /// Classifies a failed login call.
    ///
    /// Anything the server answered is a login failure carrying its message;
    /// transport and server-side failures stay request errors so the user
    /// gets the generic retry text.
    #[must_use]
    pub fn from_login_failure(error: &ApiError) -> Self {
        match error {
            ApiError::NetworkUnavailable { .. }
            | ApiError::ServerError { .. }
            | ApiError::InvalidResponse { .. }
            | ApiError::Configuration { .. } => Self::Request(error.clone()),
            other => Self::LoginFailed {
                message: other.server_message().map(str::to_string),
            },
        }
    }

    /// Returns a message safe to show the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::LoginFailed { message } => message
                .clone()
                .unwrap_or_else(|| LOGIN_FALLBACK.to_string()),
            Self::InvalidToken { .. } => {
                "The server returned an invalid session. Please try again.".to_string()
            }
            Self::RoleMismatch { requested, .. } => {
                format!("This account cannot sign in to the {requested} workspace.")
            }
            Self::AccountInactive => {
                "This account is inactive. Please contact your administrator.".to_string()
            }
            Self::Superseded => "The operation was cancelled.".to_string(),
            Self::Request(error) => error.user_message(),
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoginFailed { message: Some(message) } => write!(f, "login failed: {message}"),
            Self::LoginFailed { message: None } => write!(f, "login failed"),
            Self::InvalidToken { reason } => write!(f, "login returned unusable token: {reason}"),
            Self::RoleMismatch {
                requested,
                token_role,
            } => write!(
                f,
                "token role '{token_role}' does not match requested role '{requested}'"
            ),
            Self::AccountInactive => write!(f, "account is inactive"),
            Self::Superseded => write!(f, "operation superseded by a newer session change"),
            Self::Request(error) => write!(f, "request failed: {error}"),
        }
    }
}

impl std::error::Error for AuthError {}

#[cfg(test)]
mod tests {
    use super::*;
    use credit_office_api::error::NETWORK_FALLBACK;

    #[test]
    fn rejected_login_carries_server_message() {
        let error = AuthError::from_login_failure(&ApiError::AuthRejected {
            status: 401,
            message: Some("Invalid email or password".to_string()),
        });
        assert_eq!(
            error,
            AuthError::LoginFailed {
                message: Some("Invalid email or password".to_string())
            }
        );
        assert_eq!(error.user_message(), "Invalid email or password");
    }

    #[test]
    fn rejected_login_without_message_uses_fallback() {
        let error = AuthError::from_login_failure(&ApiError::ValidationError {
            status: 422,
            message: None,
        });
        assert_eq!(error.user_message(), LOGIN_FALLBACK);
    }

    #[test]
    fn network_failure_suggests_retry() {
        let error = AuthError::from_login_failure(&ApiError::NetworkUnavailable {
            details: "dns".to_string(),
        });
        assert!(matches!(error, AuthError::Request(_)));
        assert_eq!(error.user_message(), NETWORK_FALLBACK);
    }

    #[test]
    fn role_mismatch_display() {
        let error = AuthError::RoleMismatch {
            requested: Role::Admin,
            token_role: Role::Institution,
        };
        assert!(error.to_string().contains("institution"));
        assert!(error.user_message().contains("admin workspace"));
    }
}
