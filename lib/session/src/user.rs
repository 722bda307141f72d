//! The signed-in user as shown by the UI.
//!
//! A `User` is a view model: identity fields come from the token claims,
//! and the institution display fields come from the login response, not
//! from the token.

use credit_office_core::AccountId;
use serde::{Deserialize, Serialize};

use crate::role::Role;
use crate::token::TokenClaims;

/// The authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: AccountId,
    name: String,
    email: String,
    /// Role label as issued by the back end.
    role_label: String,
    role: Role,
    is_active: bool,
    institution_name: Option<String>,
    institution_logo: Option<String>,
}

impl User {
    /// Builds a user from token claims alone.
    #[must_use]
    pub fn from_claims(claims: &TokenClaims) -> Self {
        Self {
            id: claims.id.clone(),
            name: claims.name.clone(),
            email: claims.email.clone(),
            role_label: claims.role.clone(),
            role: claims.workspace_role(),
            is_active: claims.is_active,
            institution_name: None,
            institution_logo: None,
        }
    }

    /// Sets the institution display fields received at login.
    #[must_use]
    pub fn with_institution(mut self, name: Option<String>, logo: Option<String>) -> Self {
        self.institution_name = name;
        self.institution_logo = logo;
        self
    }

    /// Merges a profile update into this user.
    ///
    /// Fields absent from the update keep their current value. Identity and
    /// role never change through a profile update.
    pub fn apply_profile(&mut self, update: &ProfileUpdate) {
        if let Some(name) = &update.name {
            self.name.clone_from(name);
        }
        if let Some(email) = &update.email {
            self.email.clone_from(email);
        }
        if update.institution_name.is_some() {
            self.institution_name.clone_from(&update.institution_name);
        }
        if update.institution_logo.is_some() {
            self.institution_logo.clone_from(&update.institution_logo);
        }
    }

    /// Returns the account ID.
    #[must_use]
    pub fn id(&self) -> &AccountId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the role label issued by the back end.
    #[must_use]
    pub fn role_label(&self) -> &str {
        &self.role_label
    }

    /// Returns the workspace role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns true if the user is a system administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Returns the account's active flag at the time the token was issued.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns the institution name, if known.
    #[must_use]
    pub fn institution_name(&self) -> Option<&str> {
        self.institution_name.as_deref()
    }

    /// Returns the institution logo URL, if known.
    #[must_use]
    pub fn institution_logo(&self) -> Option<&str> {
        self.institution_logo.as_deref()
    }
}

/// Profile fields returned by the back end after a profile update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(
        default,
        alias = "institution_name",
        skip_serializing_if = "Option::is_none"
    )]
    pub institution_name: Option<String>,
    #[serde(
        default,
        alias = "institution_logo",
        skip_serializing_if = "Option::is_none"
    )]
    pub institution_logo: Option<String>,
}
