//! Signaling hub — the single mutation gate over presence and call state.
//!
//! Every login, call event, hangup, and disconnect funnels through one
//! mutex, so a disconnect can never interleave with a call request into a
//! half-applied state. Nothing awaits while the lock is held: every
//! operation is a bounded sequence of map mutations and unbounded channel
//! sends, and the relay never waits on media-path progress.
//!
//! Call operations carry the acting session's id and are ignored when that
//! session no longer holds the identity's binding, so an evicted
//! connection cannot keep acting as its former identity.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use beckon_core::config::DuplicateLoginPolicy;
use beckon_core::{PresenceEntry, ServerEvent, SignalingError, UserRecord};

use crate::calls::{CallState, CallTable};
use crate::directory::UserDirectory;
use crate::notifier::broadcast_presence;
use crate::presence::PresenceTable;
use crate::session::{SessionHandle, SessionId};

struct HubState {
    presence: PresenceTable,
    calls: CallTable,
}

pub struct SignalingHub {
    directory: UserDirectory,
    policy: DuplicateLoginPolicy,
    state: Mutex<HubState>,
    next_session_id: AtomicU64,
}

impl SignalingHub {
    pub fn new(directory: UserDirectory, policy: DuplicateLoginPolicy) -> Self {
        Self {
            directory,
            policy,
            state: Mutex::new(HubState {
                presence: PresenceTable::new(),
                calls: CallTable::new(),
            }),
            next_session_id: AtomicU64::new(1),
        }
    }

    pub fn directory(&self) -> &UserDirectory {
        &self.directory
    }

    /// Allocate an id for a freshly accepted connection.
    pub fn next_session_id(&self) -> SessionId {
        self.next_session_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn online_count(&self) -> usize {
        self.lock().presence.len()
    }

    /// Unfiltered online view, for the HTTP surface.
    pub fn online_users(&self) -> Vec<PresenceEntry> {
        self.lock().presence.snapshot(&self.directory)
    }

    /// Current call phase of an identity. None means Idle.
    pub fn call_state(&self, id: &str) -> Option<CallState> {
        self.lock().calls.get(id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// True when `session_id` currently holds the binding for `user_id`.
    fn owns_binding(state: &HubState, user_id: &str, session_id: SessionId) -> bool {
        state.presence.get(user_id).map(|s| s.id()) == Some(session_id)
    }

    // ── Login / disconnect ────────────────────────────────────────────────────

    /// Bind `session` to `user_id`. On success the session receives
    /// `login_success` and everyone receives a presence refresh, all under
    /// the gate so two logins can never interleave.
    pub fn login(
        &self,
        session: &SessionHandle,
        user_id: &str,
    ) -> Result<UserRecord, SignalingError> {
        let user = self
            .directory
            .authenticate(user_id)
            .ok_or_else(|| SignalingError::UnknownUser(user_id.to_string()))?;

        let mut state = self.lock();

        if let Some(bound_session) = state.presence.get(user_id).map(|s| s.id()) {
            if bound_session == session.id() {
                // Same connection retrying; confirm without rebinding.
                session.send(ServerEvent::LoginSuccess {
                    user: user.profile(),
                });
                return Ok(user);
            }
            match self.policy {
                DuplicateLoginPolicy::Reject => {
                    tracing::warn!(user_id, "duplicate login rejected");
                    return Err(SignalingError::AlreadyBound(user_id.to_string()));
                }
                DuplicateLoginPolicy::Evict => {
                    // The old session's call dies with it.
                    Self::hangup_locked(&mut state, user_id);
                    if let Some(old) = state.presence.remove(user_id) {
                        old.send(ServerEvent::SessionReplaced);
                    }
                    tracing::info!(
                        user_id,
                        old_session = bound_session,
                        new_session = session.id(),
                        "prior session evicted"
                    );
                }
            }
        }

        state.presence.bind(user_id.to_string(), session.clone());
        session.send(ServerEvent::LoginSuccess {
            user: user.profile(),
        });
        broadcast_presence(&state.presence, &self.directory);

        tracing::info!(user_id, name = %user.name, session_id = session.id(), "logged in");
        Ok(user)
    }

    /// Transport-level disconnect: forced hangup, then deregistration, then
    /// the presence broadcast. Ignored if the binding has already moved to
    /// another session (eviction), so a stale disconnect cannot knock a
    /// live login offline.
    pub fn disconnect(&self, user_id: &str, session_id: SessionId) {
        let mut state = self.lock();

        if !Self::owns_binding(&state, user_id, session_id) {
            tracing::debug!(user_id, session_id, "stale disconnect ignored");
            return;
        }

        Self::hangup_locked(&mut state, user_id);
        state.presence.unbind(user_id, session_id);
        broadcast_presence(&state.presence, &self.directory);

        tracing::info!(user_id, session_id, "disconnected");
    }

    // ── Call events ───────────────────────────────────────────────────────────

    /// Start ringing `callee` on behalf of `caller`. Errors map to a
    /// `call_rejected` for the caller; the callee is never told about a
    /// request that failed its preconditions.
    pub fn call_request(
        &self,
        caller: &str,
        session_id: SessionId,
        callee: &str,
    ) -> Result<(), SignalingError> {
        let mut state = self.lock();

        if !Self::owns_binding(&state, caller, session_id) {
            return Err(SignalingError::NotLoggedIn);
        }
        if !state.calls.is_idle(caller) {
            return Err(SignalingError::Busy(caller.to_string()));
        }
        let callee_session = state
            .presence
            .get(callee)
            .cloned()
            .ok_or_else(|| SignalingError::PeerOffline(callee.to_string()))?;
        if !state.calls.is_idle(callee) {
            return Err(SignalingError::Busy(callee.to_string()));
        }

        state.calls.begin(caller, callee);
        let caller_name = self
            .directory
            .display_name(caller)
            .unwrap_or_else(|| caller.to_string());
        callee_session.send(ServerEvent::IncomingCall {
            caller_id: caller.to_string(),
            caller_name,
        });

        tracing::info!(caller, callee, "call request relayed");
        Ok(())
    }

    /// Relay an opaque payload. Pairing is not a gate: the only condition
    /// is that the recipient is currently present; otherwise the payload is
    /// silently dropped and the sender learns of the failure from its own
    /// transport layer. The first answer-direction signal of a pending call
    /// promotes both sides to InCall.
    pub fn signal(&self, sender: &str, session_id: SessionId, recipient: &str, payload: Value) {
        let mut state = self.lock();

        if !Self::owns_binding(&state, sender, session_id) {
            tracing::debug!(sender, session_id, "signal from stale session dropped");
            return;
        }
        let Some(target) = state.presence.get(recipient).cloned() else {
            tracing::debug!(sender, recipient, "signal for absent recipient dropped");
            return;
        };

        if state.calls.connect_on_answer(sender, recipient) {
            tracing::info!(callee = sender, caller = recipient, "call connected");
        }

        target.send(ServerEvent::Signal {
            sender_id: sender.to_string(),
            payload,
        });
    }

    /// End whatever call `user_id` is part of. Idempotent and safe when
    /// the partner is already gone.
    pub fn hangup(&self, user_id: &str, session_id: SessionId) {
        let mut state = self.lock();
        if !Self::owns_binding(&state, user_id, session_id) {
            tracing::debug!(user_id, session_id, "hangup from stale session ignored");
            return;
        }
        Self::hangup_locked(&mut state, user_id);
    }

    /// Decline a pending incoming call. Only meaningful while ringing; the
    /// caller gets a rejection reason distinct from offline and busy.
    pub fn reject(&self, user_id: &str, session_id: SessionId) {
        let mut state = self.lock();

        if !Self::owns_binding(&state, user_id, session_id) {
            tracing::debug!(user_id, session_id, "reject from stale session ignored");
            return;
        }
        let caller = match state.calls.get(user_id) {
            Some(CallState::RingingFrom(caller)) => caller.clone(),
            _ => return,
        };
        state.calls.end(user_id);

        if let Some(caller_session) = state.presence.get(&caller) {
            caller_session.send(ServerEvent::CallRejected {
                reason: format!("{user_id} declined"),
            });
        }
        tracing::info!(callee = user_id, caller = %caller, "call declined");
    }

    fn hangup_locked(state: &mut HubState, user_id: &str) {
        let Some(partner) = state.calls.end(user_id) else {
            return;
        };
        if let Some(partner_session) = state.presence.get(&partner) {
            partner_session.send(ServerEvent::CallEnded {
                peer_id: user_id.to_string(),
            });
        }
        tracing::info!(user_id, partner = %partner, "call ended");
    }
}
