//! beckon-core — shared types, the signaling wire protocol, and configuration.
//! All other Beckon crates depend on this one.

pub mod config;
pub mod identity;
pub mod protocol;

pub use identity::{PresenceEntry, UserId, UserProfile, UserRecord};
pub use protocol::{ClientEvent, ServerEvent, SignalingError};
