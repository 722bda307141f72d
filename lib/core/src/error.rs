//! Result alias shared by the credit-office crates.
//!
//! Failures are carried as `rootcause` reports whose context is the owning
//! crate's error enum: `ApiError` for HTTP calls, `AuthError` for session
//! operations, `ConsoleError` for the operator console. Callers branch on
//! `Report::current_context` and never on rendered messages.

use rootcause::Report;

/// Result whose error is a report carrying the domain error `C`.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;
