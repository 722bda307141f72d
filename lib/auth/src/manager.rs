//! The authentication session manager.
//!
//! `AuthSessionManager` owns the session lifecycle: it validates the stored
//! record at startup, logs users in and out, and runs the pass-through
//! account calls that report progress through the shared state. Forced
//! logouts raised by the HTTP layer land on the same [`SessionHandle`], so
//! the manager never needs to be told about them.

use std::future::Future;

use chrono::Duration;
use credit_office_api::{
    ApiError, ApiMessage, Credentials, HttpClient, LoginResponse, RegistrationRequest,
};
use credit_office_session::{
    AuthState, LogoutReason, ProfileUpdate, Role, SessionError, SessionHandle, SessionRecord,
    Ticket, TokenClaims, User, flags, token,
};
use rootcause::prelude::Report;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::config::SessionConfig;
use crate::error::AuthError;

/// Result of a session expiry check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryStatus {
    /// No token is stored.
    NoSession,
    /// The session is live and not yet close to expiry.
    Valid { remaining: Duration },
    /// The session expires within the warning window.
    ExpiringSoon { remaining: Duration },
    /// The session had expired; it has been ended.
    Expired,
}

/// Manages the authenticated session of the back-office client.
#[derive(Clone)]
pub struct AuthSessionManager {
    client: HttpClient,
    config: SessionConfig,
}

impl AuthSessionManager {
    /// Creates a manager driving the session the client reports to.
    #[must_use]
    pub fn new(client: HttpClient, config: SessionConfig) -> Self {
        Self { client, config }
    }

    /// Returns the HTTP client, for feature calls made under this session.
    #[must_use]
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// Returns the shared session handle.
    #[must_use]
    pub fn session(&self) -> &SessionHandle {
        self.client.session()
    }

    /// Returns a copy of the current state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.session().state()
    }

    /// Subscribes to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.session().subscribe()
    }

    /// Restores the stored session, if it is still usable.
    ///
    /// Runs at most once per mount; later calls return the current state.
    /// A stored record that fails local validation is cleared without a
    /// network call. A locally valid one is confirmed with a read-only request
    /// for its role. An explicit rejection clears it; a network or server failure
    /// keeps it.
    #[instrument(skip(self))]
    pub async fn bootstrap(&self) -> AuthState {
        let Some(ticket) = self.session().begin_bootstrap() else {
            debug!("bootstrap already ran for this mount");
            return self.state();
        };

        let record = self.session().record();
        let (token, claims) = match validate_record(&record) {
            Ok(valid) => valid,
            Err(SessionError::MissingToken) if record.is_empty() => {
                debug!("no stored session");
                self.session().reset_if_current(ticket);
                return self.state();
            }
            Err(reason) => {
                info!(reason = %reason, "discarding stored session");
                self.session().reset_if_current(ticket);
                return self.state();
            }
        };

        let role = claims.workspace_role();
        let user = User::from_claims(&claims);

        match self.client.probe(role).await {
            Ok(()) => {
                debug!(role = %role, "stored session confirmed");
                self.session()
                    .publish_if_current(ticket, AuthState::authenticated(user, token));
            }
            Err(report) => match report.current_context() {
                ApiError::AuthRejected { .. }
                | ApiError::PermissionDenied { .. }
                | ApiError::SessionExpired => {
                    info!(error = %report.current_context(), "stored session rejected");
                    self.session().reset_if_current(ticket);
                }
                other => {
                    warn!(error = %other, "could not confirm stored session; keeping it");
                    self.session()
                        .publish_if_current(ticket, AuthState::authenticated(user, token));
                }
            },
        }

        self.state()
    }

    /// Logs in to the workspace of `role`.
    ///
    /// On success the session record is written, the state becomes
    /// authenticated, and the user is sent to the role's home screen. On
    /// failure the state carries a user-facing message and nothing is
    /// stored; a session committed earlier stays in place, in the state and
    /// in the record alike. A logout or unmount that lands while the call is in flight
    /// wins, and the result is `AuthError::Superseded`.
    #[instrument(skip(self, email, password), fields(role = %role))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<User, Report<AuthError>> {
        let ticket = self.session().begin();
        self.session().modify_if_current(ticket, |state| {
            state.loading = true;
            state.error = None;
        });

        let credentials = Credentials::new(email, password);
        let outcome = match self.client.login(role, &credentials).await {
            Ok(response) => accept_login(role, &response),
            Err(report) => Err(AuthError::from_login_failure(report.current_context())),
        };

        match outcome {
            Ok((token, user)) => {
                if !self.session().commit_session(ticket, &token, user.clone()) {
                    debug!("login result discarded");
                    return Err(AuthError::Superseded.into());
                }
                info!(role = %role, user_id = %user.id(), "logged in");
                self.session().navigate(role.home());
                Ok(user)
            }
            Err(error) => {
                warn!(error = %error, "login failed");
                let message = error.user_message();
                let reported = self.session().modify_if_current(ticket, |state| {
                    state.loading = false;
                    state.error = Some(message);
                });
                if !reported {
                    return Err(AuthError::Superseded.into());
                }
                Err(error.into())
            }
        }
    }

    /// Ends the session at the user's request.
    pub fn logout(&self) {
        self.session().logout(LogoutReason::UserInitiated);
    }

    /// Ends the session for a reason the user did not choose.
    pub fn force_logout(&self, reason: LogoutReason) {
        self.session().logout(reason);
    }

    /// Registers a new institution.
    pub async fn register(
        &self,
        registration: &RegistrationRequest,
    ) -> Result<ApiMessage, Report<AuthError>> {
        self.pass_through(self.client.register(registration)).await
    }

    /// Requests a password reset email.
    pub async fn reset_password(&self, email: &str) -> Result<ApiMessage, Report<AuthError>> {
        self.pass_through(self.client.reset_password(email)).await
    }

    /// Updates the signed-in account's profile.
    ///
    /// The stored profile is merged into the current user unless the
    /// session changed while the call was in flight.
    pub async fn update_profile(
        &self,
        update: &ProfileUpdate,
    ) -> Result<ProfileUpdate, Report<AuthError>> {
        let ticket = self.session().observe();
        self.session().modify_if_current(ticket, |state| {
            state.loading = true;
            state.error = None;
        });

        match self.client.update_profile(update).await {
            Ok(profile) => {
                let merged = self.session().modify_if_current(ticket, |state| {
                    state.loading = false;
                    if let Some(user) = state.user.as_mut() {
                        user.apply_profile(&profile);
                    }
                });
                if !merged {
                    debug!("profile update landed after the session changed");
                }
                Ok(profile)
            }
            Err(report) => Err(self.fail_pass_through(ticket, report.current_context())),
        }
    }

    async fn pass_through<T>(
        &self,
        call: impl Future<Output = Result<T, Report<ApiError>>>,
    ) -> Result<T, Report<AuthError>> {
        let ticket = self.session().observe();
        self.session().modify_if_current(ticket, |state| {
            state.loading = true;
            state.error = None;
        });

        match call.await {
            Ok(value) => {
                self.session()
                    .modify_if_current(ticket, |state| state.loading = false);
                Ok(value)
            }
            Err(report) => Err(self.fail_pass_through(ticket, report.current_context())),
        }
    }

    fn fail_pass_through(
        &self,
        ticket: Ticket,
        error: &ApiError,
    ) -> Report<AuthError> {
        let error = AuthError::Request(error.clone());
        let message = error.user_message();
        self.session().modify_if_current(ticket, |state| {
            state.loading = false;
            state.error = Some(message);
        });
        error.into()
    }

    /// Checks the stored token against the clock. An expired session is
    /// ended on the spot.
    pub fn check_expiry(&self) -> ExpiryStatus {
        let Some(token) = self.session().token() else {
            return ExpiryStatus::NoSession;
        };

        if token::is_expired(&token) {
            self.force_logout(LogoutReason::TokenExpired);
            return ExpiryStatus::Expired;
        }

        let remaining = token::time_remaining(&token);
        if token::expires_soon(&token, self.config.expiry_warning_minutes) {
            ExpiryStatus::ExpiringSoon { remaining }
        } else {
            ExpiryStatus::Valid { remaining }
        }
    }

    /// Spawns a task that checks expiry on the configured interval until
    /// the session is unmounted.
    pub fn spawn_expiry_watch(&self) -> JoinHandle<()> {
        let manager = self.clone();
        let period =
            std::time::Duration::from_secs(self.config.expiry_check_interval_seconds.max(1));

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                if !manager.session().is_mounted() {
                    debug!("session unmounted; stopping expiry watch");
                    break;
                }
                match manager.check_expiry() {
                    ExpiryStatus::ExpiringSoon { remaining } => {
                        warn!(
                            remaining_seconds = remaining.num_seconds(),
                            "session expires soon"
                        );
                    }
                    ExpiryStatus::Expired => info!("session expired"),
                    ExpiryStatus::Valid { .. } | ExpiryStatus::NoSession => {}
                }
            }
        })
    }

    /// Tears the manager down. Results still in flight are discarded.
    pub fn unmount(&self) {
        self.session().unmount();
    }
}

impl std::fmt::Debug for AuthSessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSessionManager")
            .field("session", self.session())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Validates a stored record without touching the network.
fn validate_record(record: &SessionRecord) -> Result<(String, TokenClaims), SessionError> {
    let token = record.token.clone().ok_or(SessionError::MissingToken)?;
    let claims = token::decode(&token).ok_or(SessionError::MalformedToken)?;
    if token::is_expired(&token) {
        return Err(SessionError::ExpiredToken {
            expired_at: claims.expires_at(),
        });
    }
    if !flags::validate(record.flags, claims.is_admin) {
        return Err(SessionError::FlagInconsistency {
            flags: record.flags,
            is_admin: Some(claims.is_admin),
        });
    }
    Ok((token, claims))
}

/// Checks a login response and builds the signed-in user.
fn accept_login(role: Role, response: &LoginResponse) -> Result<(String, User), AuthError> {
    let claims = token::decode(&response.token).ok_or(AuthError::InvalidToken {
        reason: SessionError::MalformedToken,
    })?;
    if claims.workspace_role() != role {
        return Err(AuthError::RoleMismatch {
            requested: role,
            token_role: claims.workspace_role(),
        });
    }
    if token::is_expired(&response.token) {
        return Err(AuthError::InvalidToken {
            reason: SessionError::ExpiredToken {
                expired_at: claims.expires_at(),
            },
        });
    }
    if !claims.is_active {
        return Err(AuthError::AccountInactive);
    }

    let (institution_name, institution_logo) = response.display_fields();
    let user = User::from_claims(&claims).with_institution(institution_name, institution_logo);
    Ok((response.token.clone(), user))
}
