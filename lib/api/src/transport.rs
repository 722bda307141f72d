//! The network seam under the HTTP client.
//!
//! [`HttpClient`](crate::HttpClient) decides what to send and what a
//! response means; a [`Transport`] only moves bytes. The production
//! implementation is [`ReqwestTransport`].

use async_trait::async_trait;
use rootcause::prelude::Report;
use serde_json::Value;
use std::fmt;
use tracing::warn;

use crate::config::ApiConfig;
use crate::error::ApiError;

/// HTTP method of an API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
        }
    }
}

/// Whether a request runs under the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Access {
    /// Attach the session token and let auth failures end the session.
    #[default]
    Session,
    /// Send without a credential; responses never touch the session.
    /// Used for login, registration, and password reset.
    Public,
}

/// An outgoing API request.
///
/// The bearer credential is not part of the request; the client's request
/// interceptor hands it to the transport separately.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub access: Access,
    pub body: Option<Value>,
}

impl ApiRequest {
    /// A session-scoped GET.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            access: Access::Session,
            body: None,
        }
    }

    /// A session-scoped POST with a JSON body.
    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            access: Access::Session,
            body: Some(body),
        }
    }

    /// A session-scoped PUT with a JSON body.
    #[must_use]
    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Put,
            path: path.into(),
            access: Access::Session,
            body: Some(body),
        }
    }

    /// Marks the request as public.
    #[must_use]
    pub fn public(mut self) -> Self {
        self.access = Access::Public;
        self
    }
}

/// A received response. Non-JSON bodies arrive as a JSON string.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }
}

/// The request never produced a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub details: String,
}

impl TransportError {
    /// Creates a transport error.
    #[must_use]
    pub fn new(details: impl Into<String>) -> Self {
        Self {
            details: details.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transport failure: {}", self.details)
    }
}

impl std::error::Error for TransportError {}

/// Moves a request to the API and brings back the response.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request`, attaching `bearer` as the credential when present.
    ///
    /// # Errors
    ///
    /// Returns an error only if no response was received. Error statuses
    /// are successful transports.
    async fn send(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<ApiResponse, TransportError>;
}

/// [`Transport`] over a `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Creates a transport for the configured base URL.
    pub fn new(config: &ApiConfig) -> Result<Self, Report<ApiError>> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::Configuration {
                details: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<ApiResponse, TransportError> {
        let url = self.url(&request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
        };
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::new(e.to_string()))?;
        let status = response.status().as_u16();
        let text = match response.text().await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(status, error = %e, "failed to read response body");
                None
            }
        };

        Ok(ApiResponse {
            status,
            body: parse_body(text),
        })
    }
}

/// Turns a response body into JSON. A body that is missing, unreadable, or
/// blank is `Null`; one that is not JSON is kept as a string.
fn parse_body(text: Option<String>) -> Value {
    match text {
        Some(text) if !text.trim().is_empty() => {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        }
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_constructors() {
        let get = ApiRequest::get("/admin/admins");
        assert_eq!(get.method, Method::Get);
        assert_eq!(get.access, Access::Session);
        assert!(get.body.is_none());

        let post = ApiRequest::post("/auth/admin/login", json!({"email": "a"})).public();
        assert_eq!(post.method, Method::Post);
        assert_eq!(post.access, Access::Public);
        assert_eq!(post.body, Some(json!({"email": "a"})));

        assert_eq!(ApiRequest::put("/x", json!({})).method.to_string(), "PUT");
    }

    #[test]
    fn reqwest_transport_joins_paths() {
        let transport =
            ReqwestTransport::new(&ApiConfig::new("http://localhost:4000/api/")).expect("client");
        assert_eq!(
            transport.url("/admin/admins"),
            "http://localhost:4000/api/admin/admins"
        );
        assert_eq!(
            transport.url("admin/admins"),
            "http://localhost:4000/api/admin/admins"
        );
    }

    #[test]
    fn unreadable_body_keeps_status_classifiable() {
        assert_eq!(parse_body(None), Value::Null);
        assert_eq!(parse_body(Some("  \n".to_string())), Value::Null);
        assert_eq!(
            parse_body(Some(r#"{"message":"revoked"}"#.to_string())),
            json!({"message": "revoked"})
        );
        assert_eq!(
            parse_body(Some("Bad Gateway".to_string())),
            json!("Bad Gateway")
        );

        let response = ApiResponse::new(401, parse_body(None));
        assert!(matches!(
            ApiError::from_response(response.status, &response.body),
            Some(ApiError::AuthRejected { status: 401, message: None })
        ));
    }

    #[test]
    fn transport_error_display() {
        let err = TransportError::new("connection refused");
        assert!(err.to_string().contains("connection refused"));
    }
}
