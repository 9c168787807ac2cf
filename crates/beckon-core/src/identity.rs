//! User identity types.
//!
//! A `UserId` is a stable opaque token issued by the directory. It identifies
//! a person across connections and is never reused for someone else. The
//! relay treats it as a key; it has no structure beyond equality.

use serde::{Deserialize, Serialize};

/// Stable identity token. Issued by the directory, never by the relay.
pub type UserId = String;

/// A registered user as stored in the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// Stored verbatim. Credential hardening is out of scope for the relay.
    pub password: String,
}

impl UserRecord {
    /// The client-visible view of this record. Never includes the password.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// What a client is told about a user on successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// One row of the online-users view pushed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceEntry {
    pub id: UserId,
    pub name: String,
}
