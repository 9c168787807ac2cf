//! Beckon wire protocol — every event exchanged over the signaling socket.
//!
//! These types ARE the protocol. Frames are JSON text, tagged by `event`;
//! the tag strings and field names here are what clients match on, so
//! renaming anything is a breaking change.
//!
//! Signal payloads (SDP offers, answers, network-path candidates) are
//! carried as opaque `serde_json::Value`s and relayed verbatim. The relay
//! never parses them and never distinguishes an offer from a candidate.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identity::{PresenceEntry, UserId, UserProfile};

// ── Client → server ───────────────────────────────────────────────────────────

/// Events a connected client may send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Bind this connection to an identity. Must precede everything else.
    Login { user_id: UserId },

    /// Ask the relay to ring another identity.
    CallRequest { callee_id: UserId },

    /// Relay an opaque payload to another identity.
    /// The sender field clients may embed in `payload` is ignored; the
    /// relay stamps the sender from the connection's own binding.
    Signal { recipient_id: UserId, payload: Value },

    /// Decline a pending incoming call.
    Reject,

    /// End the current call, in whatever phase it is.
    Hangup,
}

// ── Server → client ───────────────────────────────────────────────────────────

/// Events the relay pushes to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
    LoginSuccess { user: UserProfile },
    LoginError { reason: String },

    /// Full refresh of the online view, excluding the recipient itself.
    PresenceUpdate { users: Vec<PresenceEntry> },

    /// Delivered to the callee only.
    IncomingCall { caller_id: UserId, caller_name: String },

    /// Delivered to the caller: offline, busy, or explicit decline.
    CallRejected { reason: String },

    /// A relayed payload. `sender_id` is trusted — stamped by the relay.
    Signal { sender_id: UserId, payload: Value },

    /// The call partner hung up or disconnected.
    CallEnded { peer_id: UserId },

    /// This connection's identity logged in elsewhere and the binding moved.
    SessionReplaced,
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Signaling failures. None of these are fatal to the process; each is
/// local to one identity's interaction. The display strings double as the
/// client-visible `reason` fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignalingError {
    #[error("not logged in")]
    NotLoggedIn,

    #[error("invalid user id")]
    UnknownUser(UserId),

    #[error("{0} is currently offline")]
    PeerOffline(UserId),

    #[error("{0} is busy")]
    Busy(UserId),

    #[error("identity {0} already connected")]
    AlreadyBound(UserId),
}

// ── Tests ─────────────────────────────────────────────────────────────────────
