//! Call participants and the call roster.

use crate::ids::UserId;
use crate::state::{NotInCallReason, ParticipantState};
use crate::stream::Stream;
use tokio::sync::watch;

/// Read handle to a call participant.
///
/// Display name and avatar are fixed at construction; membership state and
/// the published stream list are observable.
#[derive(Debug, Clone)]
pub struct Participant {
    user_id: UserId,
    display_name: String,
    avatar: Option<String>,
    state: watch::Receiver<ParticipantState>,
    streams: watch::Receiver<Vec<Stream>>,
}

impl Participant {
    /// Create a participant handle and its driver. Starts invited with no
    /// streams.
    #[must_use]
    pub fn new(
        user_id: UserId,
        display_name: impl Into<String>,
        avatar: Option<String>,
    ) -> (Self, ParticipantDriver) {
        let (state_tx, state_rx) =
            watch::channel(ParticipantState::NotInCall(NotInCallReason::Invited));
        let (streams_tx, streams_rx) = watch::channel(Vec::new());
        (
            Self {
                user_id,
                display_name: display_name.into(),
                avatar,
                state: state_rx,
                streams: streams_rx,
            },
            ParticipantDriver {
                state: state_tx,
                streams: streams_tx,
            },
        )
    }

    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }

    #[must_use]
    pub fn state(&self) -> ParticipantState {
        *self.state.borrow()
    }

    #[must_use]
    pub fn state_watch(&self) -> watch::Receiver<ParticipantState> {
        self.state.clone()
    }

    #[must_use]
    pub fn streams(&self) -> Vec<Stream> {
        self.streams.borrow().clone()
    }

    #[must_use]
    pub fn streams_watch(&self) -> watch::Receiver<Vec<Stream>> {
        self.streams.clone()
    }
}

impl PartialEq for Participant {
    fn eq(&self, other: &Self) -> bool {
        self.user_id == other.user_id && self.state.same_channel(&other.state)
    }
}

impl Eq for Participant {}

/// Write side of a [`Participant`], owned by the engine adapter.
#[derive(Debug)]
pub struct ParticipantDriver {
    state: watch::Sender<ParticipantState>,
    streams: watch::Sender<Vec<Stream>>,
}

impl ParticipantDriver {
    pub fn set_state(&self, state: ParticipantState) {
        self.state.send_if_modified(|current| {
            let changed = *current != state;
            *current = state;
            changed
        });
    }

    pub fn set_streams(&self, streams: Vec<Stream>) {
        self.streams.send_if_modified(|current| {
            let changed = *current != streams;
            *current = streams;
            changed
        });
    }
}

/// The call roster: the local participant and everyone else.
///
/// `me` is `None` until the engine has resolved the local session. `others`
/// keeps the engine's reporting order, which downstream consumers treat as
/// arrival order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallParticipants {
    pub me: Option<Participant>,
    pub others: Vec<Participant>,
}

impl CallParticipants {
    /// All participants, local one first.
    #[must_use]
    pub fn list(&self) -> Vec<Participant> {
        let mut all = Vec::with_capacity(self.others.len() + 1);
        if let Some(me) = &self.me {
            all.push(me.clone());
        }
        all.extend(self.others.iter().cloned());
        all
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.others.len() + usize::from(self.me.is_some())
    }
}
