//! Presence registry — identity → live session.
//!
//! Single source of truth for "who is online". Every key maps to a
//! currently connected, logged-in session; entries are removed
//! synchronously on disconnect, so no other operation can observe a stale
//! binding. Mutated only while the hub's gate is held.

use std::collections::HashMap;

use beckon_core::{PresenceEntry, UserId};

use crate::directory::UserDirectory;
use crate::session::{SessionHandle, SessionId};

#[derive(Debug, Default)]
pub struct PresenceTable {
    entries: HashMap<UserId, SessionHandle>,
}

impl PresenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an identity to a session, returning any displaced handle.
    /// Duplicate-login policy is the hub's concern; this just swaps.
    pub fn bind(&mut self, id: UserId, session: SessionHandle) -> Option<SessionHandle> {
        self.entries.insert(id, session)
    }

    pub fn get(&self, id: &str) -> Option<&SessionHandle> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Remove the binding only if it still belongs to `session_id`.
    /// A stale disconnect from an evicted session is a no-op.
    pub fn unbind(&mut self, id: &str, session_id: SessionId) -> bool {
        match self.entries.get(id) {
            Some(s) if s.id() == session_id => {
                self.entries.remove(id);
                true
            }
            _ => false,
        }
    }

    /// Unconditional removal (eviction path).
    pub fn remove(&mut self, id: &str) -> Option<SessionHandle> {
        self.entries.remove(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UserId, &SessionHandle)> {
        self.entries.iter()
    }

    /// The online view: every bound identity with its display name, sorted
    /// by id for a deterministic payload.
    pub fn snapshot(&self, directory: &UserDirectory) -> Vec<PresenceEntry> {
        let mut users: Vec<PresenceEntry> = self
            .entries
            .keys()
            .map(|id| PresenceEntry {
                id: id.clone(),
                name: directory.display_name(id).unwrap_or_else(|| id.clone()),
            })
            .collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        users
    }
}
