//! Typed wrappers for the endpoints the session layer calls.

use credit_office_session::{ProfileUpdate, Role};
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use tracing::instrument;

use crate::client::HttpClient;
use crate::error::ApiError;
use crate::transport::ApiRequest;

/// Login credentials.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Creates credentials.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Institution display fields nested in some login responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InstitutionSummary {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

/// Body of a successful login.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    #[serde(default, alias = "institution_name")]
    pub institution_name: Option<String>,
    #[serde(default, alias = "institution_logo")]
    pub institution_logo: Option<String>,
    #[serde(default)]
    pub institution: Option<InstitutionSummary>,
}

impl LoginResponse {
    /// Returns the institution name and logo, preferring the flat fields.
    #[must_use]
    pub fn display_fields(&self) -> (Option<String>, Option<String>) {
        let nested = self.institution.clone().unwrap_or_default();
        (
            self.institution_name.clone().or(nested.name),
            self.institution_logo.clone().or(nested.logo),
        )
    }
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"<redacted>")
            .field("institution_name", &self.institution_name)
            .field("institution_logo", &self.institution_logo)
            .field("institution", &self.institution)
            .finish()
    }
}

/// Institution self-registration request.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub institution_name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("institution_name", &self.institution_name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// Acknowledgement body of the pass-through endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: Option<String>,
}

impl HttpClient {
    /// Logs in with the role-specific endpoint.
    #[instrument(skip(self, credentials), fields(role = %role))]
    pub async fn login(
        &self,
        role: Role,
        credentials: &Credentials,
    ) -> Result<LoginResponse, Report<ApiError>> {
        let body = serde_json::to_value(credentials).map_err(|e| ApiError::Configuration {
            details: e.to_string(),
        })?;
        let request = ApiRequest::post(self.endpoints().login(role), body).public();
        self.send_json(request).await
    }

    /// Issues the lightweight authenticated read used to confirm a stored
    /// token at startup.
    #[instrument(skip(self), fields(role = %role))]
    pub async fn probe(&self, role: Role) -> Result<(), Report<ApiError>> {
        self.send(ApiRequest::get(self.endpoints().probe(role)))
            .await
            .map(|_| ())
    }

    /// Registers a new institution.
    #[instrument(skip(self, registration))]
    pub async fn register(
        &self,
        registration: &RegistrationRequest,
    ) -> Result<ApiMessage, Report<ApiError>> {
        let body = serde_json::to_value(registration).map_err(|e| ApiError::Configuration {
            details: e.to_string(),
        })?;
        let request = ApiRequest::post(self.endpoints().register.clone(), body).public();
        let body = self.send(request).await?;
        Ok(serde_json::from_value(body).unwrap_or_default())
    }

    /// Requests a password reset email.
    #[instrument(skip(self, email))]
    pub async fn reset_password(&self, email: &str) -> Result<ApiMessage, Report<ApiError>> {
        let request = ApiRequest::post(
            self.endpoints().reset_password.clone(),
            json!({ "email": email }),
        )
        .public();
        let body = self.send(request).await?;
        Ok(serde_json::from_value(body).unwrap_or_default())
    }

    /// Updates the signed-in account's profile and returns the stored
    /// profile fields.
    #[instrument(skip(self, update))]
    pub async fn update_profile(
        &self,
        update: &ProfileUpdate,
    ) -> Result<ProfileUpdate, Report<ApiError>> {
        let body = serde_json::to_value(update).map_err(|e| ApiError::Configuration {
            details: e.to_string(),
        })?;
        let request = ApiRequest::put(self.endpoints().profile.clone(), body);
        let body = self.send(request).await?;
        let profile = match body {
            serde_json::Value::Object(mut map) if map.contains_key("profile") => {
                map.remove("profile").unwrap_or_default()
            }
            other => other,
        };
        serde_json::from_value(profile).map_err(|e| {
            ApiError::InvalidResponse {
                details: e.to_string(),
            }
            .into()
        })
    }
}
