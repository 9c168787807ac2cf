//! Connection sessions — the relay's handle to one live client connection.

use tokio::sync::mpsc;

use beckon_core::ServerEvent;

/// Monotonic id for one transport connection. Presence entries carry it so
/// a stale disconnect from an evicted session can be told apart from the
/// live binding.
pub type SessionId = u64;

/// Non-owning handle to a connected client. The connection task owns the
/// receiving end; everything pushed here is serialized and written to the
/// socket in arrival order.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: SessionId,
    tx: mpsc::UnboundedSender<ServerEvent>,
}

impl SessionHandle {
    pub fn new(id: SessionId, tx: mpsc::UnboundedSender<ServerEvent>) -> Self {
        Self { id, tx }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Push an event to this session. A closed receiver means the
    /// connection is already tearing down and its disconnect event will do
    /// the cleanup, so the failed send is dropped.
    pub fn send(&self, event: ServerEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!(session_id = self.id, "event for closed session dropped");
        }
    }
}
