//! API endpoint configuration.
//!
//! Fields with defaults can be omitted when loading from environment
//! variables; only the base URL is required.

use credit_office_session::Role;
use serde::{Deserialize, Serialize};

/// Configuration for reaching the back-office API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to
    /// (e.g., "https://api.credit-office.example/api").
    base_url: String,
    /// Endpoint paths.
    #[serde(default)]
    endpoints: EndpointConfig,
}

impl ApiConfig {
    /// Creates a configuration with default endpoint paths.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            endpoints: EndpointConfig::default(),
        }
    }

    /// Replaces the endpoint paths.
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: EndpointConfig) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the endpoint paths.
    #[must_use]
    pub fn endpoints(&self) -> &EndpointConfig {
        &self.endpoints
    }
}

/// Paths of the endpoints the session layer calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Administrator login.
    /// Default: "/auth/admin/login"
    #[serde(default = "default_admin_login")]
    pub admin_login: String,
    /// Institution login.
    /// Default: "/auth/institution/login"
    #[serde(default = "default_institution_login")]
    pub institution_login: String,
    /// Read-only endpoint probed at startup for admin sessions.
    /// Default: "/admin/admins"
    #[serde(default = "default_admin_probe")]
    pub admin_probe: String,
    /// Read-only endpoint probed at startup for institution sessions.
    /// Default: "/admin/institutions"
    #[serde(default = "default_institution_probe")]
    pub institution_probe: String,
    /// Institution self-registration.
    /// Default: "/auth/institution/register"
    #[serde(default = "default_register")]
    pub register: String,
    /// Password reset request.
    /// Default: "/auth/reset-password"
    #[serde(default = "default_reset_password")]
    pub reset_password: String,
    /// Profile update for the signed-in account.
    /// Default: "/institution/profile"
    #[serde(default = "default_profile")]
    pub profile: String,
}

fn default_admin_login() -> String {
    "/auth/admin/login".to_string()
}

fn default_institution_login() -> String {
    "/auth/institution/login".to_string()
}

fn default_admin_probe() -> String {
    "/admin/admins".to_string()
}

fn default_institution_probe() -> String {
    "/admin/institutions".to_string()
}

fn default_register() -> String {
    "/auth/institution/register".to_string()
}

fn default_reset_password() -> String {
    "/auth/reset-password".to_string()
}

fn default_profile() -> String {
    "/institution/profile".to_string()
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            admin_login: default_admin_login(),
            institution_login: default_institution_login(),
            admin_probe: default_admin_probe(),
            institution_probe: default_institution_probe(),
            register: default_register(),
            reset_password: default_reset_password(),
            profile: default_profile(),
        }
    }
}

impl EndpointConfig {
    /// Returns the login path for `role`.
    #[must_use]
    pub fn login(&self, role: Role) -> &str {
        match role {
            Role::Admin => &self.admin_login,
            Role::Institution => &self.institution_login,
        }
    }

    /// Returns the bootstrap probe path for `role`.
    #[must_use]
    pub fn probe(&self, role: Role) -> &str {
        match role {
            Role::Admin => &self.admin_probe,
            Role::Institution => &self.institution_probe,
        }
    }
}
