//! Per-identity call state.
//!
//! Call phase is an explicit tagged variant, never inferred from the
//! presence or absence of some other object. Absence from the table means
//! Idle. The table's one hard invariant is symmetry: whenever A is
//! `InCall(B)`, B is `InCall(A)` — every transition here preserves it.

use std::collections::HashMap;

use beckon_core::UserId;

/// Current call phase of one identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallState {
    /// Sent a call request, waiting for the callee's first answer signal.
    Calling(UserId),
    /// Target of a pending call request.
    RingingFrom(UserId),
    /// Both sides have exchanged signals; the call is live.
    InCall(UserId),
}

impl CallState {
    /// The other identity in this call, whatever the phase.
    pub fn partner(&self) -> &UserId {
        match self {
            CallState::Calling(p) | CallState::RingingFrom(p) | CallState::InCall(p) => p,
        }
    }
}

#[derive(Debug, Default)]
pub struct CallTable {
    states: HashMap<UserId, CallState>,
}

impl CallTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&CallState> {
        self.states.get(id)
    }

    pub fn is_idle(&self, id: &str) -> bool {
        !self.states.contains_key(id)
    }

    /// Current partner of `id`, in any phase.
    pub fn partner(&self, id: &str) -> Option<UserId> {
        self.states.get(id).map(|s| s.partner().clone())
    }

    /// Record a fresh request: caller → `Calling(callee)`,
    /// callee → `RingingFrom(caller)`. Callers must have checked both
    /// sides are idle; this overwrites unconditionally.
    pub fn begin(&mut self, caller: &str, callee: &str) {
        self.states
            .insert(caller.to_string(), CallState::Calling(callee.to_string()));
        self.states
            .insert(callee.to_string(), CallState::RingingFrom(caller.to_string()));
    }

    /// Answer path: if `sender` is ringing from `recipient` and `recipient`
    /// is calling `sender`, promote both to `InCall`. Returns whether the
    /// pair was promoted.
    pub fn connect_on_answer(&mut self, sender: &str, recipient: &str) -> bool {
        let sender_ringing = matches!(
            self.states.get(sender),
            Some(CallState::RingingFrom(p)) if p.as_str() == recipient
        );
        let recipient_calling = matches!(
            self.states.get(recipient),
            Some(CallState::Calling(p)) if p.as_str() == sender
        );
        if !(sender_ringing && recipient_calling) {
            return false;
        }

        self.states
            .insert(sender.to_string(), CallState::InCall(recipient.to_string()));
        self.states
            .insert(recipient.to_string(), CallState::InCall(sender.to_string()));
        true
    }

    /// Tear down whatever call `id` is part of, in any phase. Returns the
    /// partner whose side was also cleared, so the caller can notify them.
    /// Idempotent: a second call returns None and changes nothing.
    pub fn end(&mut self, id: &str) -> Option<UserId> {
        let state = self.states.remove(id)?;
        let partner = state.partner().clone();

        let partner_points_back = self
            .states
            .get(&partner)
            .map(|s| s.partner().as_str() == id)
            .unwrap_or(false);
        if partner_points_back {
            self.states.remove(&partner);
            Some(partner)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Every InCall entry must be mirrored by its partner.
    #[cfg(test)]
    fn is_symmetric(&self) -> bool {
        self.states.iter().all(|(id, state)| match state {
            CallState::InCall(p) => {
                self.states.get(p) == Some(&CallState::InCall(id.clone()))
            }
            _ => true,
        })
    }
}
