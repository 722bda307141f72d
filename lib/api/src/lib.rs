//! Session-aware HTTP client for the credit-office back-office API.
//!
//! This crate provides:
//! - `HttpClient`: the request pipeline with the token-attaching request
//!   interceptor and the failure-classifying response interceptor
//! - `ApiError`: the classified failure every call resolves to
//! - `Transport`: the network seam, with `ReqwestTransport` for production
//! - Typed wrappers for the login, probe, registration, password reset, and
//!   profile endpoints
//!
//! # Failure policy
//!
//! | Outcome | Session effect |
//! |---|---|
//! | stored token expired | request aborted, forced logout, `SessionExpired` |
//! | 401 | forced logout |
//! | 403 reporting a deactivated account | forced logout |
//! | other 403 | none, `PermissionDenied` |
//! | 404 / 422 / 429 / 5xx | none |
//! | no response | none, `NetworkUnavailable` |

mod client;
pub mod config;
mod endpoints;
pub mod error;
pub mod transport;

pub use client::HttpClient;
pub use config::{ApiConfig, EndpointConfig};
pub use endpoints::{ApiMessage, Credentials, InstitutionSummary, LoginResponse, RegistrationRequest};
pub use error::ApiError;
pub use transport::{
    Access, ApiRequest, ApiResponse, Method, ReqwestTransport, Transport, TransportError,
};
