//! Authentication session management for the credit-office back office.
//!
//! [`AuthSessionManager`] is the single entry point for the session
//! lifecycle:
//!
//! - `bootstrap` restores a stored session at startup
//! - `login` and `logout` move between the unauthenticated and
//!   authenticated states
//! - `register`, `reset_password`, and `update_profile` run account calls
//!   that report progress through the shared state
//! - `check_expiry` and `spawn_expiry_watch` end sessions whose token ran out
//!
//! State is published through a `tokio::sync::watch` channel; UI code
//! subscribes with [`AuthSessionManager::subscribe`].

pub mod config;
pub mod error;
mod manager;

pub use config::SessionConfig;
pub use error::AuthError;
pub use manager::{AuthSessionManager, ExpiryStatus};
