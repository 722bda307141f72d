//! Console error types.

use credit_office_api::ApiError;
use credit_office_auth::AuthError;
use std::fmt;
use std::path::PathBuf;

/// Errors that end a console invocation.
#[derive(Debug, Clone)]
pub enum ConsoleError {
    /// Configuration could not be loaded.
    Configuration { details: String },
    /// The session file could not be opened.
    Storage { path: PathBuf, details: String },
    /// The HTTP client could not be built.
    Client(ApiError),
    /// A session operation failed.
    Auth(AuthError),
}

impl ConsoleError {
    /// Returns the message printed to the operator.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Client(error) => error.user_message(),
            Self::Auth(error) => error.user_message(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration { details } => write!(f, "invalid configuration: {details}"),
            Self::Storage { path, details } => {
                write!(f, "cannot open session file {}: {details}", path.display())
            }
            Self::Client(error) => write!(f, "cannot create client: {error}"),
            Self::Auth(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for ConsoleError {}
