//! Broadcast notifier — pushes the online view to every connected session
//! after each presence mutation.
//!
//! This is a full refresh, not a diff: every session gets the complete
//! snapshot (minus itself) on every login and logout. O(N) events per
//! mutation, which is fine at rendezvous-scale connection counts and keeps
//! clients trivially consistent.

use beckon_core::ServerEvent;

use crate::directory::UserDirectory;
use crate::presence::PresenceTable;

pub(crate) fn broadcast_presence(presence: &PresenceTable, directory: &UserDirectory) {
    let snapshot = presence.snapshot(directory);
    for (id, session) in presence.iter() {
        let users = snapshot
            .iter()
            .filter(|entry| &entry.id != id)
            .cloned()
            .collect();
        session.send(ServerEvent::PresenceUpdate { users });
    }
}
