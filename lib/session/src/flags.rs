//! The persisted session record: the raw token plus its role flag.
//!
//! Storage keeps two boolean flags, `adminAuthenticated` and
//! `userLoggedIn`, as a redundant corroboration of the token's own
//! `is_admin` claim. In memory the pair is always handled as a single
//! `Option<Role>`; the two-flag shape exists only at the storage boundary,
//! so a double-true record can be read but never written.

use std::sync::Arc;

use crate::error::SessionError;
use crate::role::Role;
use crate::store::SessionStore;

/// Storage key of the raw token.
pub const TOKEN_KEY: &str = "token";
/// Storage key of the admin flag.
pub const ADMIN_FLAG_KEY: &str = "adminAuthenticated";
/// Storage key of the institution flag.
pub const INSTITUTION_FLAG_KEY: &str = "userLoggedIn";

const FLAG_SET: &str = "true";

/// The two role flags as found in storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionFlags {
    /// `adminAuthenticated` is set.
    pub admin: bool,
    /// `userLoggedIn` is set.
    pub institution: bool,
}

impl SessionFlags {
    /// Projects a role onto the flag pair. Exactly one flag is set for a role.
    #[must_use]
    pub fn for_role(role: Option<Role>) -> Self {
        Self {
            admin: role == Some(Role::Admin),
            institution: role == Some(Role::Institution),
        }
    }

    /// Collapses the flags into a role.
    ///
    /// # Errors
    ///
    /// Returns `FlagInconsistency` when both flags are set, since no single
    /// role matches that record.
    pub fn role(&self) -> Result<Option<Role>, SessionError> {
        match (self.admin, self.institution) {
            (true, true) => Err(SessionError::FlagInconsistency {
                flags: *self,
                is_admin: None,
            }),
            (true, false) => Ok(Some(Role::Admin)),
            (false, true) => Ok(Some(Role::Institution)),
            (false, false) => Ok(None),
        }
    }
}

/// Checks the flags against the token's `is_admin` claim.
///
/// Invalid when both flags are set, when an admin token lacks the admin
/// flag, or when an institution token lacks the institution flag.
#[must_use]
pub fn validate(flags: SessionFlags, is_admin: bool) -> bool {
    match flags.role() {
        Ok(Some(role)) => role.is_admin() == is_admin,
        Ok(None) | Err(_) => false,
    }
}

/// Snapshot of the session record as stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionRecord {
    /// The raw token, if any.
    pub token: Option<String>,
    /// The stored role flags.
    pub flags: SessionFlags,
}

impl SessionRecord {
    /// Returns true if nothing at all is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.flags == SessionFlags::default()
    }
}

/// Reads and writes the session record through a [`SessionStore`].
///
/// The record is only ever written whole (`write`) or removed whole
/// (`clear`); it is never partially updated.
#[derive(Clone)]
pub struct SessionFlagStore {
    store: Arc<dyn SessionStore>,
}

impl SessionFlagStore {
    /// Wraps a key/value store.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Reads the stored record.
    #[must_use]
    pub fn read(&self) -> SessionRecord {
        SessionRecord {
            token: self.store.get(TOKEN_KEY).filter(|t| !t.is_empty()),
            flags: SessionFlags {
                admin: self.flag(ADMIN_FLAG_KEY),
                institution: self.flag(INSTITUTION_FLAG_KEY),
            },
        }
    }

    /// Reads only the raw token.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// Stores the token and sets the flag for `role`, clearing the other.
    pub fn write(&self, token: &str, role: Role) {
        let flags = SessionFlags::for_role(Some(role));
        self.store.set(TOKEN_KEY, token);
        self.put_flag(ADMIN_FLAG_KEY, flags.admin);
        self.put_flag(INSTITUTION_FLAG_KEY, flags.institution);
    }

    /// Removes the token and both flags.
    pub fn clear(&self) {
        self.store.clear(TOKEN_KEY);
        self.store.clear(ADMIN_FLAG_KEY);
        self.store.clear(INSTITUTION_FLAG_KEY);
    }

    fn flag(&self, key: &str) -> bool {
        self.store.get(key).is_some_and(|v| v == FLAG_SET)
    }

    fn put_flag(&self, key: &str, set: bool) {
        if set {
            self.store.set(key, FLAG_SET);
        } else {
            self.store.clear(key);
        }
    }
}

impl std::fmt::Debug for SessionFlagStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionFlagStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn flags(admin: bool, institution: bool) -> SessionFlags {
        SessionFlags { admin, institution }
    }

    #[test]
    fn both_flags_never_validate() {
        assert!(!validate(flags(true, true), true));
        assert!(!validate(flags(true, true), false));
    }

    #[test]
    fn flags_must_agree_with_role_claim() {
        assert!(validate(flags(true, false), true));
        assert!(validate(flags(false, true), false));
        assert!(!validate(flags(true, false), false));
        assert!(!validate(flags(false, true), true));
    }

    #[test]
    fn missing_flags_never_validate() {
        assert!(!validate(flags(false, false), true));
        assert!(!validate(flags(false, false), false));
    }

    #[test]
    fn role_projection_is_exclusive() {
        for role in [None, Some(Role::Admin), Some(Role::Institution)] {
            let projected = SessionFlags::for_role(role);
            assert!(!(projected.admin && projected.institution));
            assert_eq!(projected.role(), Ok(role));
        }
        assert!(matches!(
            flags(true, true).role(),
            Err(SessionError::FlagInconsistency { .. })
        ));
    }

    #[test]
    fn write_sets_exactly_one_flag() {
        let store = Arc::new(MemoryStore::new());
        let record = SessionFlagStore::new(store.clone());

        record.write("tok-admin", Role::Admin);
        assert_eq!(store.get(ADMIN_FLAG_KEY), Some("true".to_string()));
        assert_eq!(store.get(INSTITUTION_FLAG_KEY), None);

        record.write("tok-inst", Role::Institution);
        let read = record.read();
        assert_eq!(read.token.as_deref(), Some("tok-inst"));
        assert_eq!(read.flags, flags(false, true));
    }

    #[test]
    fn clear_removes_everything() {
        let store = Arc::new(MemoryStore::new());
        let record = SessionFlagStore::new(store.clone());

        record.write("tok", Role::Institution);
        store.set(ADMIN_FLAG_KEY, "true");
        record.clear();

        assert!(record.read().is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn non_true_flag_values_read_as_unset() {
        let store = Arc::new(MemoryStore::new());
        store.set(ADMIN_FLAG_KEY, "false");
        store.set(INSTITUTION_FLAG_KEY, "yes");
        store.set(TOKEN_KEY, "");

        let record = SessionFlagStore::new(store).read();
        assert_eq!(record.flags, SessionFlags::default());
        assert_eq!(record.token, None);
    }
}
