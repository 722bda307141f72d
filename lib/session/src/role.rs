//! Workspace roles.
//!
//! The back office has two disjoint kinds of accounts: system administrators
//! working in the admin console, and credit institutions working in their own
//! workspace. A session belongs to exactly one of them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::navigation::NavigationTarget;

/// The role a session was established for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System administrator using the admin console.
    Admin,
    /// Credit institution using the institution workspace.
    Institution,
}

impl Role {
    /// Maps a token's `is_admin` claim onto a role.
    #[must_use]
    pub fn from_is_admin(is_admin: bool) -> Self {
        if is_admin { Self::Admin } else { Self::Institution }
    }

    /// Returns true if this role has admin privileges.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Returns the screen a freshly logged-in user of this role lands on.
    #[must_use]
    pub fn home(&self) -> NavigationTarget {
        match self {
            Self::Admin => NavigationTarget::AdminHome,
            Self::Institution => NavigationTarget::InstitutionHome,
        }
    }

    /// Returns the lowercase name used in logs and on the command line.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Institution => "institution",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "institution" | "user" => Ok(Self::Institution),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_is_admin() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::Institution.is_admin());
    }

    #[test]
    fn from_is_admin_maps_both_ways() {
        assert_eq!(Role::from_is_admin(true), Role::Admin);
        assert_eq!(Role::from_is_admin(false), Role::Institution);
    }

    #[test]
    fn home_targets() {
        assert_eq!(Role::Admin.home(), NavigationTarget::AdminHome);
        assert_eq!(Role::Institution.home(), NavigationTarget::InstitutionHome);
    }

    #[test]
    fn parse_accepts_legacy_user_alias() {
        assert_eq!("Institution".parse::<Role>(), Ok(Role::Institution));
        assert_eq!("user".parse::<Role>(), Ok(Role::Institution));
        assert_eq!(" admin ".parse::<Role>(), Ok(Role::Admin));
        assert!("auditor".parse::<Role>().is_err());
    }

    #[test]
    fn role_serialization_format() {
        let json = serde_json::to_string(&Role::Admin).expect("serialize");
        assert_eq!(json, "\"admin\"");

        let json = serde_json::to_string(&Role::Institution).expect("serialize");
        assert_eq!(json, "\"institution\"");
    }
}
