//! Call, participant and stream state enums.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a call as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallState {
    /// Outgoing call, local side is dialing.
    Dialing,
    /// Incoming call, local side is being rung.
    Ringing,
    /// Outgoing call, remote side is being rung.
    RingingRemotely,
    /// Signaling/media setup in progress.
    Connecting,
    /// Call is established.
    Connected,
    /// Connection was lost and the engine is re-establishing it.
    Reconnecting,
    /// Call is not active (initial state, or torn down without completing).
    Disconnected,
    /// Call has ended for good; no further state transitions follow.
    Ended,
}

impl CallState {
    /// True for the states preceding an established call, where the local
    /// preview is shown instead of the stream list.
    #[must_use]
    pub const fn is_pre_call(self) -> bool {
        matches!(
            self,
            CallState::Dialing | CallState::Ringing | CallState::RingingRemotely
        )
    }

    /// True once the call has permanently ended.
    #[must_use]
    pub const fn is_ended(self) -> bool {
        matches!(self, CallState::Ended)
    }
}

/// Why a participant is not (or not yet) in the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotInCallReason {
    /// Invited but not yet notified.
    Invited,
    /// Currently being rung.
    Ringing,
    /// Declined the invitation.
    Declined,
    /// Was in the call and left.
    Left,
}

/// Per-participant call membership state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticipantState {
    /// Actively in the call.
    InCall,
    /// Not in the call, with the reason.
    NotInCall(NotInCallReason),
}

impl ParticipantState {
    #[must_use]
    pub const fn is_in_call(self) -> bool {
        matches!(self, ParticipantState::InCall)
    }

    #[must_use]
    pub const fn is_ringing(self) -> bool {
        matches!(self, ParticipantState::NotInCall(NotInCallReason::Ringing))
    }
}

/// Lifecycle state of a published stream.
///
/// A stream is visible/audible to other participants only while `Live`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamState {
    /// Published but not yet flowing.
    Open,
    /// Media is flowing.
    Live,
    /// Torn down.
    Closed,
}

impl StreamState {
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, StreamState::Live)
    }
}
