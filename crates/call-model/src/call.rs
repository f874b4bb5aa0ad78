//! The call handle: the root of the engine's reactive surface.

use crate::participant::CallParticipants;
use crate::state::CallState;
use tokio::sync::watch;
use tracing::debug;

/// Read handle to a call.
#[derive(Debug, Clone)]
pub struct Call {
    state: watch::Receiver<CallState>,
    participants: watch::Receiver<CallParticipants>,
}

impl Call {
    /// Create a call handle and its driver. Starts disconnected with an
    /// empty roster.
    #[must_use]
    pub fn new() -> (Self, CallDriver) {
        let (state_tx, state_rx) = watch::channel(CallState::Disconnected);
        let (participants_tx, participants_rx) = watch::channel(CallParticipants::default());
        (
            Self {
                state: state_rx,
                participants: participants_rx,
            },
            CallDriver {
                state: state_tx,
                participants: participants_tx,
            },
        )
    }

    #[must_use]
    pub fn state(&self) -> CallState {
        *self.state.borrow()
    }

    #[must_use]
    pub fn state_watch(&self) -> watch::Receiver<CallState> {
        self.state.clone()
    }

    #[must_use]
    pub fn participants(&self) -> CallParticipants {
        self.participants.borrow().clone()
    }

    #[must_use]
    pub fn participants_watch(&self) -> watch::Receiver<CallParticipants> {
        self.participants.clone()
    }
}

/// Write side of a [`Call`], owned by the engine adapter.
#[derive(Debug)]
pub struct CallDriver {
    state: watch::Sender<CallState>,
    participants: watch::Sender<CallParticipants>,
}

impl CallDriver {
    pub fn set_state(&self, state: CallState) {
        let modified = self.state.send_if_modified(|current| {
            let changed = *current != state;
            *current = state;
            changed
        });
        if modified {
            debug!(target: "call_model.call", state = ?state, "call state changed");
        }
    }

    pub fn set_participants(&self, participants: CallParticipants) {
        self.participants.send_if_modified(|current| {
            let changed = *current != participants;
            *current = participants;
            changed
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ids::UserId;
    use crate::participant::Participant;

    #[test]
    fn test_call_starts_disconnected() {
        let (call, _driver) = Call::new();
        assert_eq!(call.state(), CallState::Disconnected);
        assert_eq!(call.participants().count(), 0);
    }

    #[test]
    fn test_state_transitions_notify_once() {
        let (call, driver) = Call::new();
        let mut watch = call.state_watch();
        watch.mark_unchanged();

        driver.set_state(CallState::Connected);
        assert!(watch.has_changed().unwrap());
        watch.mark_unchanged();

        driver.set_state(CallState::Connected);
        assert!(!watch.has_changed().unwrap());
    }

    #[test]
    fn test_roster_updates() {
        let (call, driver) = Call::new();
        let (me, _me_driver) = Participant::new(UserId::from("me"), "Me", None);
        driver.set_participants(CallParticipants {
            me: Some(me),
            others: Vec::new(),
        });
        assert_eq!(call.participants().count(), 1);
    }
}
