//! Trust-on-first-use credential store.
//!
//! There are no pre-provisioned accounts. The first secret presented for a
//! username is recorded and becomes that user's credential until it is
//! deleted; every later presentation is a plain comparison against it.
//!
//! ## Concurrency
//!
//! Lookups take a shared lock. Enrolment re-checks under the exclusive lock,
//! so when several first-time requests race on one username exactly one
//! secret is recorded and the others are compared against it.

use crate::error::{CredentialError, CredentialResult};
use parking_lot::RwLock;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

/// Outcome of [`CredentialStore::verify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// The username was unknown and the secret has been recorded for it.
    Enrolled,
    /// The secret matches the recorded one.
    Accepted,
    /// The secret does not match the recorded one.
    Rejected,
}

impl Verification {
    fn compare(recorded: &str, presented: &str) -> Self {
        if recorded == presented {
            Verification::Accepted
        } else {
            Verification::Rejected
        }
    }

    /// Returns true if the caller may proceed.
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Verification::Rejected)
    }

    /// Returns true if this call created the credential.
    pub fn is_new(&self) -> bool {
        matches!(self, Verification::Enrolled)
    }
}

/// Maps usernames to their recorded secret.
#[derive(Default)]
pub struct CredentialStore {
    secrets: RwLock<HashMap<String, String>>,
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl CredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Verifies `secret` for `username`, enrolling the username if unknown.
    pub fn verify(&self, username: &str, secret: &str) -> Verification {
        if let Some(recorded) = self.secrets.read().get(username) {
            return Verification::compare(recorded, secret);
        }

        // Another caller may have enrolled the name since the read lock was dropped.
        match self.secrets.write().entry(username.to_owned()) {
            Entry::Occupied(entry) => Verification::compare(entry.get(), secret),
            Entry::Vacant(entry) => {
                entry.insert(secret.to_owned());
                Verification::Enrolled
            }
        }
    }

    /// Removes the credential for `username` if `secret` matches.
    ///
    /// Nothing is changed on failure.
    pub fn delete(&self, username: &str, secret: &str) -> CredentialResult<()> {
        let mut secrets = self.secrets.write();
        let recorded = secrets
            .get(username)
            .ok_or_else(|| CredentialError::NotFound(username.to_owned()))?;
        if recorded != secret {
            return Err(CredentialError::Unauthorized(username.to_owned()));
        }
        secrets.remove(username);
        Ok(())
    }

    /// Returns true if `username` has a recorded secret.
    pub fn contains(&self, username: &str) -> bool {
        self.secrets.read().contains_key(username)
    }

    /// Returns the number of enrolled users.
    pub fn len(&self) -> usize {
        self.secrets.read().len()
    }

    /// Returns true if nobody is enrolled.
    pub fn is_empty(&self) -> bool {
        self.secrets.read().is_empty()
    }
}
