//! Shared session cell.
//!
//! A `SessionHandle` owns the session record, the published [`AuthState`],
//! and the navigation callback. The HTTP layer and the session manager both
//! hold a clone, which is how a request failing with 401 can log the user
//! out without the HTTP layer knowing about the manager.
//!
//! # Commit discipline
//!
//! Every operation that ends in a state change takes a [`Ticket`] when it
//! starts. Starting a bootstrap or a login, logging out, and unmounting all
//! advance the epoch, and a commit only lands if its ticket still matches.
//! A result arriving after a disqualifying transition is dropped. Record
//! writes and state publication happen under one lock, so no other holder
//! can observe a half-written record.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info};

use crate::flags::{SessionFlagStore, SessionRecord};
use crate::navigation::{NavigationTarget, Navigator};
use crate::state::AuthState;
use crate::store::SessionStore;
use crate::user::User;

/// Why a session was ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// The user asked to log out.
    UserInitiated,
    /// The stored token expired before a request could be sent.
    TokenExpired,
    /// The server rejected the token (401).
    Rejected,
    /// The server reported the account as deactivated (403).
    AccountDeactivated,
}

impl LogoutReason {
    /// Returns true for logouts the user did not ask for.
    #[must_use]
    pub fn is_forced(&self) -> bool {
        !matches!(self, Self::UserInitiated)
    }
}

impl fmt::Display for LogoutReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserInitiated => write!(f, "user initiated"),
            Self::TokenExpired => write!(f, "token expired"),
            Self::Rejected => write!(f, "rejected by server"),
            Self::AccountDeactivated => write!(f, "account deactivated"),
        }
    }
}

/// Marks the epoch an operation started in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug)]
struct Guard {
    epoch: u64,
    mounted: bool,
    bootstrapped: bool,
}

struct Shared {
    record: SessionFlagStore,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<AuthState>,
    guard: Mutex<Guard>,
}

/// Cloneable handle to the session shared by the manager and the HTTP layer.
#[derive(Clone)]
pub struct SessionHandle {
    shared: Arc<Shared>,
}

impl SessionHandle {
    /// Creates a handle over the given store and navigator.
    ///
    /// The published state starts as [`AuthState::bootstrapping`].
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        let (state, _) = watch::channel(AuthState::bootstrapping());
        Self {
            shared: Arc::new(Shared {
                record: SessionFlagStore::new(store),
                navigator,
                state,
                guard: Mutex::new(Guard {
                    epoch: 0,
                    mounted: true,
                    bootstrapped: false,
                }),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Guard> {
        self.shared
            .guard
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Reads the stored session record.
    #[must_use]
    pub fn record(&self) -> SessionRecord {
        let _guard = self.lock();
        self.shared.record.read()
    }

    /// Reads the stored token.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        let _guard = self.lock();
        self.shared.record.token()
    }

    /// Returns a copy of the published state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.shared.state.borrow().clone()
    }

    /// Subscribes to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.shared.state.subscribe()
    }

    /// Returns true until [`unmount`](Self::unmount) is called.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.lock().mounted
    }

    /// Starts an operation that supersedes every operation in flight.
    #[must_use]
    pub fn begin(&self) -> Ticket {
        let mut guard = self.lock();
        guard.epoch += 1;
        Ticket(guard.epoch)
    }

    /// Starts the bootstrap for this mount.
    ///
    /// Returns `None` if bootstrap already started or the handle is
    /// unmounted.
    #[must_use]
    pub fn begin_bootstrap(&self) -> Option<Ticket> {
        let mut guard = self.lock();
        if guard.bootstrapped || !guard.mounted {
            return None;
        }
        guard.bootstrapped = true;
        guard.epoch += 1;
        Some(Ticket(guard.epoch))
    }

    /// Observes the current epoch without superseding anything.
    #[must_use]
    pub fn observe(&self) -> Ticket {
        Ticket(self.lock().epoch)
    }

    /// Returns true if a commit with `ticket` would land.
    #[must_use]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        let guard = self.lock();
        guard.mounted && guard.epoch == ticket.0
    }

    /// Publishes `state` if `ticket` is still current.
    pub fn publish_if_current(&self, ticket: Ticket, state: AuthState) -> bool {
        let guard = self.lock();
        if !(guard.mounted && guard.epoch == ticket.0) {
            debug!("discarding stale state");
            return false;
        }
        self.shared.state.send_replace(state);
        true
    }

    /// Edits the published state in place if `ticket` is still current.
    pub fn modify_if_current(&self, ticket: Ticket, edit: impl FnOnce(&mut AuthState)) -> bool {
        let guard = self.lock();
        if !(guard.mounted && guard.epoch == ticket.0) {
            debug!("discarding stale state edit");
            return false;
        }
        self.shared.state.send_modify(edit);
        true
    }

    /// Writes the session record and publishes the authenticated state if
    /// `ticket` is still current.
    pub fn commit_session(&self, ticket: Ticket, token: &str, user: User) -> bool {
        let guard = self.lock();
        if !(guard.mounted && guard.epoch == ticket.0) {
            debug!("discarding stale session commit");
            return false;
        }
        self.shared.record.write(token, user.role());
        self.shared
            .state
            .send_replace(AuthState::authenticated(user, token.to_string()));
        true
    }

    /// Clears the record and publishes the unauthenticated state if `ticket`
    /// is still current. No navigation happens.
    pub fn reset_if_current(&self, ticket: Ticket) -> bool {
        let guard = self.lock();
        if !(guard.mounted && guard.epoch == ticket.0) {
            debug!("discarding stale session reset");
            return false;
        }
        self.shared.record.clear();
        self.shared.state.send_replace(AuthState::unauthenticated());
        true
    }

    /// Ends the session from any state.
    ///
    /// Clears the record, publishes the unauthenticated state, invalidates
    /// every operation in flight, and sends the user to the public entry
    /// screen unless it is already shown. Idempotent.
    pub fn logout(&self, reason: LogoutReason) {
        let mounted = {
            let mut guard = self.lock();
            self.end_session(&mut guard)
        };
        self.after_logout(reason, mounted);
    }

    /// Ends the session only if the stored token is still `expected`.
    ///
    /// Used for failures of requests sent under an earlier session: once a
    /// newer login has replaced the token, the old request's rejection no
    /// longer applies. Returns true if the session was ended.
    pub fn logout_if_token(&self, expected: Option<&str>, reason: LogoutReason) -> bool {
        let mounted = {
            let mut guard = self.lock();
            if self.shared.record.token().as_deref() != expected {
                debug!(reason = %reason, "session changed since the request was sent; keeping it");
                return false;
            }
            self.end_session(&mut guard)
        };
        self.after_logout(reason, mounted);
        true
    }

    fn end_session(&self, guard: &mut Guard) -> bool {
        guard.epoch += 1;
        self.shared.record.clear();
        self.shared.state.send_replace(AuthState::unauthenticated());
        guard.mounted
    }

    fn after_logout(&self, reason: LogoutReason, mounted: bool) {
        if reason.is_forced() {
            info!(reason = %reason, "forced logout");
        } else {
            info!("logged out");
        }

        if mounted && self.shared.navigator.current() != Some(NavigationTarget::PublicEntry) {
            self.shared.navigator.navigate(NavigationTarget::PublicEntry);
        }
    }

    /// Requests navigation through the injected navigator.
    pub fn navigate(&self, target: NavigationTarget) {
        if self.is_mounted() {
            self.shared.navigator.navigate(target);
        }
    }

    /// Tears the handle down. Results of operations still in flight are
    /// discarded from now on.
    pub fn unmount(&self) {
        let mut guard = self.lock();
        guard.mounted = false;
        guard.epoch += 1;
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("state", &*self.shared.state.borrow())
            .finish_non_exhaustive()
    }
}
