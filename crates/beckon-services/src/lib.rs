//! beckon-services — the stateful core of the signaling relay: user
//! directory, presence registry, call-state table, and the hub that gates
//! every mutation.

pub mod calls;
pub mod directory;
pub mod hub;
mod notifier;
pub mod presence;
pub mod session;

pub use calls::{CallState, CallTable};
pub use directory::{DirectoryError, UserDirectory};
pub use hub::SignalingHub;
pub use presence::PresenceTable;
pub use session::{SessionHandle, SessionId};
