//! Per-user document store.

use ansip_protocol::Sip008;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;

/// Maps usernames to their SIP008 document.
///
/// Writes replace the whole document. No validation happens here; callers
/// are expected to have checked the version before storing.
#[derive(Default)]
pub struct DocumentStore {
    documents: RwLock<HashMap<String, Sip008>>,
}

// Documents carry shadowsocks passwords.
impl fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentStore")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl DocumentStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `document` for `username`, replacing any previous one.
    pub fn put(&self, username: impl Into<String>, document: Sip008) {
        self.documents.write().insert(username.into(), document);
    }

    /// Returns a copy of the document stored for `username`.
    pub fn get(&self, username: &str) -> Option<Sip008> {
        self.documents.read().get(username).cloned()
    }

    /// Removes the document for `username`. Returns false if there was none.
    pub fn delete(&self, username: &str) -> bool {
        self.documents.write().remove(username).is_some()
    }

    /// Returns the number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Returns true if no documents are stored.
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}
