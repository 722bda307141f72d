//! Core types and utilities for the credit-office back-office client.
//!
//! This crate provides the error handling foundation and the identifier
//! types shared by the session, API, and authentication crates.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{AccountId, ParseIdError};
