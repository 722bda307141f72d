//! Named navigation targets and the navigation side-effect seam.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A screen the session manager can send the user to.
///
/// Targets are named rather than given as paths so the embedding UI decides
/// where each one lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NavigationTarget {
    /// The public entry screen (login).
    PublicEntry,
    /// Landing screen of the admin console.
    AdminHome,
    /// Landing screen of the institution workspace.
    InstitutionHome,
}

impl NavigationTarget {
    /// Returns the camelCase target name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PublicEntry => "publicEntry",
            Self::AdminHome => "adminHome",
            Self::InstitutionHome => "institutionHome",
        }
    }
}

impl fmt::Display for NavigationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side-effect callback used to move the UI between screens.
pub trait Navigator: Send + Sync {
    /// Navigates to the given target.
    fn navigate(&self, target: NavigationTarget);

    /// Returns the target currently shown, if the UI can tell.
    fn current(&self) -> Option<NavigationTarget> {
        None
    }
}

/// Navigator that only records the request in the log.
///
/// Used by headless embeddings such as the operator console.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, target: NavigationTarget) {
        tracing::info!(screen = %target, "navigation requested");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_names() {
        assert_eq!(NavigationTarget::PublicEntry.to_string(), "publicEntry");
        assert_eq!(NavigationTarget::AdminHome.to_string(), "adminHome");
        assert_eq!(
            NavigationTarget::InstitutionHome.to_string(),
            "institutionHome"
        );
    }

    #[test]
    fn serialized_names_match_display() {
        let json = serde_json::to_string(&NavigationTarget::InstitutionHome).expect("serialize");
        assert_eq!(json, "\"institutionHome\"");
    }

    #[test]
    fn log_navigator_has_no_location() {
        assert_eq!(LogNavigator.current(), None);
    }
}
