//! # Access Gate
//!
//! Credential check and role classification.
//!
//! Administrators are checked first (by username), then students (by
//! student id). Passwords are stored and compared as plain text; the
//! comparison is exact equality.

use crate::error::Result;
use crate::storage::RecordStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// Caller role after authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => f.write_str("admin"),
            Role::Student => f.write_str("student"),
        }
    }
}

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Username for admins, student id for students.
    pub user_id: String,
    pub role: Role,
}

fn credentials_match(stored: &str, given: &str) -> bool {
    stored.as_bytes().ct_eq(given.as_bytes()).into()
}

/// Authenticates callers against a borrowed record store.
pub struct AccessGate<'a, S: RecordStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RecordStore + ?Sized> AccessGate<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Return the principal for valid credentials, `None` otherwise.
    ///
    /// Empty username or password fails without touching the store.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<Principal>> {
        if username.is_empty() || password.is_empty() {
            return Ok(None);
        }

        if let Some(admin) = self.store.find_administrator_by_username(username)? {
            if credentials_match(&admin.password, password) {
                return Ok(Some(Principal {
                    user_id: username.to_string(),
                    role: Role::Admin,
                }));
            }
        }

        if let Some(student) = self.store.find_student(username)? {
            if credentials_match(&student.password, password) {
                return Ok(Some(Principal {
                    user_id: username.to_string(),
                    role: Role::Student,
                }));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::Dataset;
    use crate::storage::RedbStore;

    fn store() -> RedbStore {
        let store = RedbStore::in_memory().unwrap();
        store.load_dataset(&Dataset::sample()).unwrap();
        store
    }

    #[test]
    fn empty_credentials_fail() {
        let store = store();
        let gate = AccessGate::new(&store);
        assert_eq!(gate.authenticate("", "x").ok(), Some(None));
        assert_eq!(gate.authenticate("x", "").ok(), Some(None));
        assert_eq!(gate.authenticate("", "").ok(), Some(None));
    }

    #[test]
    fn admin_login() {
        let store = store();
        let gate = AccessGate::new(&store);
        let principal = gate.authenticate("admin", "admin123").ok().flatten();
        assert_eq!(
            principal,
            Some(Principal {
                user_id: "admin".into(),
                role: Role::Admin,
            })
        );
    }

    #[test]
    fn student_login_by_id() {
        let store = store();
        let gate = AccessGate::new(&store);
        let principal = gate.authenticate("69000001", "password123").ok().flatten();
        assert_eq!(principal.map(|p| p.role), Some(Role::Student));
    }

    #[test]
    fn wrong_password_fails() {
        let store = store();
        let gate = AccessGate::new(&store);
        assert_eq!(gate.authenticate("admin", "admin1234").ok(), Some(None));
        assert_eq!(gate.authenticate("69000001", "Password123").ok(), Some(None));
        assert_eq!(gate.authenticate("nobody", "password123").ok(), Some(None));
    }

    #[test]
    fn role_display() {
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(Role::Student.to_string(), "student");
    }
}
