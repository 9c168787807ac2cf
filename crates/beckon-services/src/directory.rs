//! User directory — identity issuance and credential lookup.
//!
//! Stands in for a real account database: ids are issued sequentially,
//! never reused, and records live for the process lifetime. The relay
//! consults it as a synchronous, side-effect-free lookup; it has no say
//! in presence or call state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use beckon_core::{UserId, UserRecord};

/// First id handed out after the seeded demo users.
const FIRST_ISSUED_ID: u64 = 1004;

/// Shared, concurrently readable user table.
#[derive(Clone)]
pub struct UserDirectory {
    users: Arc<DashMap<UserId, UserRecord>>,
    next_id: Arc<AtomicU64>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    #[error("email already registered")]
    DuplicateEmail,
}

impl UserDirectory {
    /// An empty directory. Ids still start at 1004 so seeded and unseeded
    /// deployments never hand out overlapping ids.
    pub fn new() -> Self {
        Self {
            users: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(FIRST_ISSUED_ID)),
        }
    }

    /// A directory pre-populated with the three demo users.
    pub fn with_demo_users() -> Self {
        let dir = Self::new();
        for (id, name, email, password) in [
            ("1001", "Barath", "barath@example.com", "password_1"),
            ("1002", "John", "john@example.com", "password_2"),
            ("1003", "Jane", "jane@example.com", "password_3"),
        ] {
            dir.users.insert(
                id.to_string(),
                UserRecord {
                    id: id.to_string(),
                    name: name.to_string(),
                    email: email.to_string(),
                    password: password.to_string(),
                },
            );
        }
        dir
    }

    /// Create a new account. Fails if the email is already registered.
    pub fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserRecord, DirectoryError> {
        if self.users.iter().any(|u| u.email == email) {
            return Err(DirectoryError::DuplicateEmail);
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        let record = UserRecord {
            id: id.clone(),
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        self.users.insert(id.clone(), record.clone());

        tracing::info!(user_id = %id, name, "user registered");
        Ok(record)
    }

    /// Look up an identity token. `None` means the id was never issued.
    pub fn authenticate(&self, id: &str) -> Option<UserRecord> {
        self.users.get(id).map(|r| r.clone())
    }

    /// Display name for an id, if known.
    pub fn display_name(&self, id: &str) -> Option<String> {
        self.users.get(id).map(|r| r.name.clone())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new()
    }
}
