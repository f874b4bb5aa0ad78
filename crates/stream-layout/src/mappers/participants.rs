//! Projections over the call roster.

use crate::mappers::support::{spawn_projection, SubKey, Subscription};
use crate::model::ParticipantUi;
use call_model::{Call, CallParticipants, Participant};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// The participants currently in the call, local participant first.
///
/// A participant counts as in-call when the engine reports `InCall` or when
/// it has published at least one stream (media can arrive before the state
/// transition). Nothing is emitted while the local participant is unknown;
/// after that, others keep the roster's reporting order.
pub fn in_call_participants(
    call: &Call,
    cancel: CancellationToken,
) -> watch::Receiver<Vec<ParticipantUi>> {
    spawn_projection(
        "in_call_participants",
        call,
        cancel,
        |roster| {
            let mut subs = Vec::new();
            for participant in &roster.others {
                subs.push(Subscription::leaf(
                    SubKey::ParticipantState(participant.user_id().clone()),
                    participant.state_watch(),
                ));
                subs.push(Subscription::leaf(
                    SubKey::ParticipantStreams(participant.user_id().clone()),
                    participant.streams_watch(),
                ));
            }
            subs
        },
        |roster, _| derive_in_call(roster),
    )
}

/// True while at least one other participant is being rung and nobody else
/// has answered yet.
pub fn are_other_participants_ringing(
    call: &Call,
    cancel: CancellationToken,
) -> watch::Receiver<bool> {
    spawn_projection(
        "are_other_participants_ringing",
        call,
        cancel,
        |roster| {
            roster
                .others
                .iter()
                .map(|p| {
                    Subscription::leaf(
                        SubKey::ParticipantState(p.user_id().clone()),
                        p.state_watch(),
                    )
                })
                .collect()
        },
        |roster, _| {
            let any_ringing = roster.others.iter().any(|p| p.state().is_ringing());
            let none_in_call = !roster.others.iter().any(|p| p.state().is_in_call());
            any_ringing && none_in_call
        },
    )
}

fn derive_in_call(roster: &CallParticipants) -> Vec<ParticipantUi> {
    let Some(me) = &roster.me else {
        return Vec::new();
    };

    let mut out = vec![to_participant_ui(me, true)];
    for participant in &roster.others {
        let is_in_call =
            participant.state().is_in_call() || !participant.streams().is_empty();
        if is_in_call {
            out.push(to_participant_ui(participant, false));
        }
    }
    out
}

fn to_participant_ui(participant: &Participant, is_me: bool) -> ParticipantUi {
    ParticipantUi {
        user_id: participant.user_id().clone(),
        username: participant.display_name().to_string(),
        avatar: participant.avatar().map(str::to_string),
        is_me,
        state: participant.state(),
    }
}
