//! The in-memory authentication state published to UI consumers.

use crate::role::Role;
use crate::user::User;

/// Snapshot of the session as the UI sees it.
///
/// Recomputed wholesale on bootstrap, login, logout, and a failed
/// bootstrap probe. Consumers only ever receive copies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub token: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Coarse state-machine position derived from an [`AuthState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Bootstrap or login is in flight.
    Validating,
    /// No session.
    Unauthenticated,
    /// A session for the given role.
    Authenticated(Role),
}

impl AuthState {
    /// The state before bootstrap has resolved.
    #[must_use]
    pub fn bootstrapping() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    /// A settled state with no session.
    #[must_use]
    pub fn unauthenticated() -> Self {
        Self::default()
    }

    /// A settled state with no session and a user-facing error.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// A settled authenticated state.
    #[must_use]
    pub fn authenticated(user: User, token: String) -> Self {
        Self {
            user: Some(user),
            token: Some(token),
            loading: false,
            error: None,
        }
    }

    /// Returns true if both a user and a token are present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    /// Returns true if the current user is an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_admin)
    }

    /// Returns the role of the current session.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        if self.is_authenticated() {
            self.user.as_ref().map(User::role)
        } else {
            None
        }
    }

    /// Returns the state-machine position.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        if self.loading {
            return SessionStatus::Validating;
        }
        match self.role() {
            Some(role) => SessionStatus::Authenticated(role),
            None => SessionStatus::Unauthenticated,
        }
    }
}
