//! Session-aware HTTP client.
//!
//! Every call runs through two interceptors:
//!
//! - The request interceptor reads the stored token. An expired token
//!   aborts the call before dispatch, forces a logout, and fails with
//!   [`ApiError::SessionExpired`]. A live token is attached as the bearer
//!   credential. Without a token the call goes out unauthenticated.
//! - The response interceptor classifies failures into [`ApiError`]. On a
//!   session request, any 401 and a 403 reporting a deactivated account
//!   force a logout, unless a newer login replaced the token the request
//!   was sent with. Every other failure, including a network error, is
//!   surfaced to the caller and leaves the session alone.
//!
//! Public requests skip both session effects.

use std::sync::Arc;

use credit_office_session::{LogoutReason, SessionHandle, token};
use rootcause::prelude::Report;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::{ApiConfig, EndpointConfig};
use crate::error::ApiError;
use crate::transport::{Access, ApiRequest, ApiResponse, ReqwestTransport, Transport, TransportError};

/// HTTP client bound to a session.
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    session: SessionHandle,
    endpoints: EndpointConfig,
}

impl HttpClient {
    /// Creates a client over an explicit transport.
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        session: SessionHandle,
        endpoints: EndpointConfig,
    ) -> Self {
        Self {
            transport,
            session,
            endpoints,
        }
    }

    /// Creates a `reqwest`-backed client from configuration.
    pub fn from_config(config: &ApiConfig, session: SessionHandle) -> Result<Self, Report<ApiError>> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::new(
            Arc::new(transport),
            session,
            config.endpoints().clone(),
        ))
    }

    /// Returns the session this client reports to.
    #[must_use]
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Returns the configured endpoint paths.
    #[must_use]
    pub fn endpoints(&self) -> &EndpointConfig {
        &self.endpoints
    }

    /// Sends a request and returns the raw JSON body.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn send(&self, request: ApiRequest) -> Result<Value, Report<ApiError>> {
        let bearer = self.authorize(&request)?;
        let outcome = self.transport.send(&request, bearer.as_deref()).await;
        Ok(self.inspect(&request, bearer.as_deref(), outcome)?)
    }

    /// Sends a request and deserializes the body.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, Report<ApiError>> {
        let body = self.send(request).await?;
        serde_json::from_value(body).map_err(|e| {
            ApiError::InvalidResponse {
                details: e.to_string(),
            }
            .into()
        })
    }

    /// Request interceptor. Returns the credential to attach.
    fn authorize(&self, request: &ApiRequest) -> Result<Option<String>, ApiError> {
        if request.access == Access::Public {
            return Ok(None);
        }

        match self.session.token() {
            Some(token) if token::is_expired(&token) => {
                debug!("stored token expired; aborting request");
                self.session
                    .logout_if_token(Some(token.as_str()), LogoutReason::TokenExpired);
                Err(ApiError::SessionExpired)
            }
            Some(token) => Ok(Some(token)),
            None => Ok(None),
        }
    }

    /// Response interceptor. Classifies failures and applies the session
    /// policy to the session `bearer` was taken from.
    fn inspect(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
        outcome: Result<ApiResponse, TransportError>,
    ) -> Result<Value, ApiError> {
        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, "no response received");
                return Err(ApiError::NetworkUnavailable { details: e.details });
            }
        };

        let Some(error) = ApiError::from_response(response.status, &response.body) else {
            return Ok(response.body);
        };

        if let ApiError::ServerError { status, .. } = &error {
            warn!(status, error = %error, "server error");
        }

        if request.access == Access::Session {
            match &error {
                ApiError::AuthRejected { status: 401, .. } => {
                    self.session.logout_if_token(bearer, LogoutReason::Rejected);
                }
                ApiError::AuthRejected { .. } => {
                    self.session
                        .logout_if_token(bearer, LogoutReason::AccountDeactivated);
                }
                _ => {}
            }
        }

        Err(error)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use chrono::Utc;
    use credit_office_session::{
        MemoryStore, NavigationTarget, Navigator, Role, SessionStore, flags,
    };
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Transport answering from a script and recording what it was sent.
    #[derive(Default)]
    struct ScriptedTransport {
        replies: Mutex<VecDeque<Result<ApiResponse, TransportError>>>,
        sent: Mutex<Vec<(ApiRequest, Option<String>)>>,
    }

    impl ScriptedTransport {
        fn reply(self, status: u16, body: Value) -> Self {
            self.replies
                .lock()
                .unwrap()
                .push_back(Ok(ApiResponse::new(status, body)));
            self
        }

        fn fail(self, details: &str) -> Self {
            self.replies
                .lock()
                .unwrap()
                .push_back(Err(TransportError::new(details)));
            self
        }

        fn sent(&self) -> Vec<(ApiRequest, Option<String>)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(
            &self,
            request: &ApiRequest,
            bearer: Option<&str>,
        ) -> Result<ApiResponse, TransportError> {
            self.sent
                .lock()
                .unwrap()
                .push((request.clone(), bearer.map(str::to_string)));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(ApiResponse::new(200, Value::Null)))
        }
    }

    #[derive(Default)]
    struct RecordingNavigator {
        visits: Mutex<Vec<NavigationTarget>>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, target: NavigationTarget) {
            self.visits.lock().unwrap().push(target);
        }
    }

    fn token(exp_offset_secs: i64, is_admin: bool) -> String {
        let claims = json!({
            "id": 11,
            "name": "Robin",
            "email": "robin@lender.example",
            "role": if is_admin { "admin" } else { "institution" },
            "is_admin": is_admin,
            "is_active": true,
            "iat": Utc::now().timestamp() - 60,
            "exp": Utc::now().timestamp() + exp_offset_secs,
        });
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(b"{}"),
            URL_SAFE_NO_PAD.encode(claims.to_string())
        )
    }

    struct Fixture {
        client: HttpClient,
        transport: Arc<ScriptedTransport>,
        store: Arc<MemoryStore>,
        navigator: Arc<RecordingNavigator>,
    }

    fn fixture(transport: ScriptedTransport, stored_token: Option<String>) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let navigator = Arc::new(RecordingNavigator::default());
        let session = SessionHandle::new(store.clone(), navigator.clone());
        if let Some(token) = stored_token {
            store.set(flags::TOKEN_KEY, &token);
            store.set(flags::INSTITUTION_FLAG_KEY, "true");
        }
        let transport = Arc::new(transport);
        let client = HttpClient::new(transport.clone(), session, EndpointConfig::default());
        Fixture {
            client,
            transport,
            store,
            navigator,
        }
    }

    #[tokio::test]
    async fn attaches_live_token() {
        let live = token(3600, false);
        let fx = fixture(
            ScriptedTransport::default().reply(200, json!({"ok": true})),
            Some(live.clone()),
        );

        let body = fx.client.send(ApiRequest::get("/admin/institutions")).await;

        assert_eq!(body.ok(), Some(json!({"ok": true})));
        let sent = fx.transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1.as_deref(), Some(live.as_str()));
    }

    #[tokio::test]
    async fn sends_unauthenticated_without_token() {
        let fx = fixture(ScriptedTransport::default(), None);
        fx.client
            .send(ApiRequest::get("/public/stats"))
            .await
            .expect("request succeeds");
        assert_eq!(fx.transport.sent()[0].1, None);
    }

    #[tokio::test]
    async fn expired_token_aborts_before_dispatch() {
        let fx = fixture(ScriptedTransport::default(), Some(token(-10, false)));

        let err = fx
            .client
            .send(ApiRequest::get("/admin/institutions"))
            .await
            .unwrap_err();

        assert_eq!(err.current_context(), &ApiError::SessionExpired);
        assert!(!err.current_context().is_network());
        assert!(fx.transport.sent().is_empty());
        assert!(fx.store.is_empty());
        assert!(!fx.client.session().state().is_authenticated());
        assert_eq!(
            *fx.navigator.visits.lock().unwrap(),
            vec![NavigationTarget::PublicEntry]
        );
    }

    #[tokio::test]
    async fn unauthorized_forces_logout() {
        let fx = fixture(
            ScriptedTransport::default().reply(401, json!({"message": "invalid token"})),
            Some(token(3600, false)),
        );

        let err = fx
            .client
            .send(ApiRequest::get("/credit/scores"))
            .await
            .unwrap_err();

        assert!(err.current_context().ends_session());
        assert!(fx.store.is_empty());
        assert_eq!(
            *fx.navigator.visits.lock().unwrap(),
            vec![NavigationTarget::PublicEntry]
        );
    }

    #[test]
    fn rejection_of_replaced_token_keeps_newer_session() {
        let newer = token(3600, false);
        let fx = fixture(ScriptedTransport::default(), Some(newer.clone()));
        let rejected = Ok(ApiResponse::new(401, json!({"message": "invalid token"})));

        let err = fx
            .client
            .inspect(
                &ApiRequest::get("/credit/scores"),
                Some("superseded-token"),
                rejected,
            )
            .unwrap_err();

        assert!(err.ends_session());
        assert_eq!(fx.store.get(flags::TOKEN_KEY), Some(newer));
        assert!(fx.navigator.visits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn deactivated_account_forces_logout() {
        let fx = fixture(
            ScriptedTransport::default()
                .reply(403, json!({"message": "Your account has been deactivated"})),
            Some(token(3600, false)),
        );

        let err = fx
            .client
            .send(ApiRequest::get("/credit/scores"))
            .await
            .unwrap_err();

        assert!(matches!(
            err.current_context(),
            ApiError::AuthRejected { status: 403, .. }
        ));
        assert!(fx.store.is_empty());
    }

    #[tokio::test]
    async fn permission_error_keeps_session() {
        let live = token(3600, false);
        let fx = fixture(
            ScriptedTransport::default().reply(403, json!({"message": "Admins only"})),
            Some(live.clone()),
        );

        let err = fx
            .client
            .send(ApiRequest::get("/admin/admins"))
            .await
            .unwrap_err();

        assert!(matches!(
            err.current_context(),
            ApiError::PermissionDenied { .. }
        ));
        assert_eq!(fx.store.get(flags::TOKEN_KEY), Some(live));
        assert!(fx.navigator.visits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn network_and_server_errors_keep_session() {
        let live = token(3600, false);
        let fx = fixture(
            ScriptedTransport::default()
                .fail("connection reset")
                .reply(500, json!({"message": "db down"}))
                .reply(422, json!({"message": "bad csv"}))
                .reply(429, Value::Null)
                .reply(404, Value::Null),
            Some(live.clone()),
        );

        for _ in 0..5 {
            let err = fx
                .client
                .send(ApiRequest::get("/credit/batches"))
                .await
                .unwrap_err();
            assert!(!err.current_context().ends_session());
        }

        assert_eq!(fx.store.get(flags::TOKEN_KEY), Some(live));
        assert!(fx.navigator.visits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn public_requests_skip_session_effects() {
        let fx = fixture(
            ScriptedTransport::default().reply(401, json!({"message": "Invalid credentials"})),
            Some(token(-10, false)),
        );

        let err = fx
            .client
            .send(ApiRequest::post("/auth/institution/login", json!({})).public())
            .await
            .unwrap_err();

        assert_eq!(
            err.current_context().server_message(),
            Some("Invalid credentials")
        );
        assert_eq!(fx.transport.sent()[0].1, None);
        assert!(!fx.store.is_empty());
        assert!(fx.navigator.visits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn send_json_reports_shape_mismatch() {
        #[derive(Debug, serde::Deserialize)]
        struct Expected {
            #[allow(dead_code)]
            token: String,
        }

        let fx = fixture(
            ScriptedTransport::default().reply(200, json!({"unexpected": 1})),
            None,
        );
        let err = fx
            .client
            .send_json::<Expected>(ApiRequest::get("/x").public())
            .await
            .unwrap_err();
        assert!(matches!(
            err.current_context(),
            ApiError::InvalidResponse { .. }
        ));
    }

    #[test]
    fn flags_for_fixture_are_consistent() {
        let fx = fixture(ScriptedTransport::default(), Some(token(3600, false)));
        let record = fx.client.session().record();
        assert!(flags::validate(record.flags, Role::Institution.is_admin()));
    }
}
