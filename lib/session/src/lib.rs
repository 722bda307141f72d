//! Client-side session state for the credit-office back office.
//!
//! This crate provides:
//! - Bearer token decoding and expiry checks (`token`)
//! - The persisted session record and its role-flag consistency rules (`flags`)
//! - Injected key/value storage (`SessionStore`, `MemoryStore`, `FileStore`)
//! - The `User` view model and the published `AuthState`
//! - `SessionHandle`, the shared cell through which the HTTP layer and the
//!   session manager commit state and force logouts
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use credit_office_session::{LogNavigator, MemoryStore, Role, SessionHandle, flags};
//!
//! let handle = SessionHandle::new(Arc::new(MemoryStore::new()), Arc::new(LogNavigator));
//! let record = handle.record();
//! assert!(record.is_empty());
//! assert!(!flags::validate(record.flags, Role::Admin.is_admin()));
//! ```

pub mod error;
pub mod flags;
pub mod handle;
pub mod navigation;
pub mod role;
pub mod state;
pub mod store;
pub mod token;
pub mod user;

pub use error::SessionError;
pub use flags::{SessionFlagStore, SessionFlags, SessionRecord};
pub use handle::{LogoutReason, SessionHandle, Ticket};
pub use navigation::{LogNavigator, NavigationTarget, Navigator};
pub use role::Role;
pub use state::{AuthState, SessionStatus};
pub use store::{FileStore, MemoryStore, SessionStore};
pub use token::TokenClaims;
pub use user::{ProfileUpdate, User};
