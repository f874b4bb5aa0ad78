//! Projections over the published streams of a call.

use crate::mappers::support::{spawn_projection, SubKey, Subscription};
use crate::model::{AudioUi, StreamUi, VideoUi};
use call_model::{Call, CallParticipants, CallState, Participant};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// The flat, UI-ready list of every published stream in the call.
///
/// Merges every participant's stream list with each stream's audio/video
/// observables. Insertion order is the roster order (local participant
/// first), which downstream selection treats as priority for overflow.
pub fn streams_ui(call: &Call, cancel: CancellationToken) -> watch::Receiver<Vec<StreamUi>> {
    spawn_projection(
        "streams_ui",
        call,
        cancel,
        |roster| subscribe_streams(roster.list()),
        |roster, _| derive_streams(roster.list(), roster),
    )
}

/// The local participant's streams only.
pub fn my_streams_ui(call: &Call, cancel: CancellationToken) -> watch::Receiver<Vec<StreamUi>> {
    spawn_projection(
        "my_streams_ui",
        call,
        cancel,
        |roster| subscribe_streams(roster.me.iter().cloned().collect()),
        |roster, _| derive_streams(roster.me.iter().cloned().collect(), roster),
    )
}

/// Whether any of the local participant's streams is currently live
/// (visible/audible to the other participants).
pub fn do_any_of_my_streams_is_live(
    call: &Call,
    cancel: CancellationToken,
) -> watch::Receiver<bool> {
    spawn_projection(
        "do_any_of_my_streams_is_live",
        call,
        cancel,
        |roster| {
            let mut subs = Vec::new();
            if let Some(me) = &roster.me {
                subs.push(Subscription::structural(
                    SubKey::ParticipantStreams(me.user_id().clone()),
                    me.streams_watch(),
                ));
                for stream in me.streams() {
                    subs.push(Subscription::leaf(
                        SubKey::StreamState(stream.id().clone()),
                        stream.state_watch(),
                    ));
                }
            }
            subs
        },
        |roster, _| any_of_my_streams_live(roster),
    )
}

/// Whether any other participant has published streams.
pub fn do_others_have_streams(call: &Call, cancel: CancellationToken) -> watch::Receiver<bool> {
    spawn_projection(
        "do_others_have_streams",
        call,
        cancel,
        |roster| {
            roster
                .others
                .iter()
                .map(|p| {
                    Subscription::leaf(
                        SubKey::ParticipantStreams(p.user_id().clone()),
                        p.streams_watch(),
                    )
                })
                .collect()
        },
        |roster, _| others_have_streams(roster),
    )
}

/// Whether the local participant has published streams.
pub fn do_i_have_streams(call: &Call, cancel: CancellationToken) -> watch::Receiver<bool> {
    spawn_projection(
        "do_i_have_streams",
        call,
        cancel,
        |roster| {
            roster
                .me
                .iter()
                .map(|me| {
                    Subscription::leaf(
                        SubKey::ParticipantStreams(me.user_id().clone()),
                        me.streams_watch(),
                    )
                })
                .collect()
        },
        |roster, _| roster.me.as_ref().is_some_and(|me| !me.streams().is_empty()),
    )
}

/// Whether the local participant is effectively alone: nobody else has
/// streams, or none of the local streams is live.
pub fn am_i_alone(call: &Call, cancel: CancellationToken) -> watch::Receiver<bool> {
    spawn_projection(
        "am_i_alone",
        call,
        cancel,
        subscribe_aloneness,
        |roster, _| is_alone(roster),
    )
}

/// Whether the call is connected but the local participant is still waiting
/// for anyone else's media.
pub fn am_i_waiting_others(call: &Call, cancel: CancellationToken) -> watch::Receiver<bool> {
    spawn_projection(
        "am_i_waiting_others",
        call,
        cancel,
        subscribe_aloneness,
        |roster, call_state| call_state == CallState::Connected && is_alone(roster),
    )
}

/// Whether at least one stream in the list has enabled video.
#[must_use]
pub fn has_at_least_a_video_enabled(streams: &[StreamUi]) -> bool {
    streams
        .iter()
        .any(|s| s.video.as_ref().is_some_and(|v| v.is_enabled))
}

fn subscribe_streams(participants: Vec<Participant>) -> Vec<Subscription> {
    let mut subs = Vec::new();
    for participant in participants {
        subs.push(Subscription::structural(
            SubKey::ParticipantStreams(participant.user_id().clone()),
            participant.streams_watch(),
        ));
        for stream in participant.streams() {
            subs.push(Subscription::leaf(
                SubKey::StreamAudio(stream.id().clone()),
                stream.audio_watch(),
            ));
            // The video slot is structural: when a video source appears we
            // must also start watching its enabled flag.
            subs.push(Subscription::structural(
                SubKey::StreamVideo(stream.id().clone()),
                stream.video_watch(),
            ));
            if let Some(video) = stream.video() {
                subs.push(Subscription::leaf(
                    SubKey::VideoEnabled(stream.id().clone()),
                    video.enabled_watch(),
                ));
            }
        }
    }
    subs
}

fn derive_streams(participants: Vec<Participant>, roster: &CallParticipants) -> Vec<StreamUi> {
    let me_id = roster.me.as_ref().map(|me| me.user_id().clone());
    let mut out = Vec::new();
    for participant in participants {
        let is_mine = me_id.as_ref() == Some(participant.user_id());
        for stream in participant.streams() {
            out.push(StreamUi {
                id: stream.id().clone(),
                username: participant.display_name().to_string(),
                avatar: participant.avatar().map(str::to_string),
                is_mine,
                audio: stream.audio().map(AudioUi::from),
                video: stream.video().as_ref().map(VideoUi::from),
            });
        }
    }
    out
}

fn subscribe_aloneness(roster: &CallParticipants) -> Vec<Subscription> {
    let mut subs: Vec<Subscription> = roster
        .others
        .iter()
        .map(|p| {
            Subscription::leaf(
                SubKey::ParticipantStreams(p.user_id().clone()),
                p.streams_watch(),
            )
        })
        .collect();
    if let Some(me) = &roster.me {
        subs.push(Subscription::structural(
            SubKey::ParticipantStreams(me.user_id().clone()),
            me.streams_watch(),
        ));
        for stream in me.streams() {
            subs.push(Subscription::leaf(
                SubKey::StreamState(stream.id().clone()),
                stream.state_watch(),
            ));
        }
    }
    subs
}

fn others_have_streams(roster: &CallParticipants) -> bool {
    roster.others.iter().any(|p| !p.streams().is_empty())
}

fn any_of_my_streams_live(roster: &CallParticipants) -> bool {
    roster
        .me
        .as_ref()
        .is_some_and(|me| me.streams().iter().any(|s| s.state().is_live()))
}

fn is_alone(roster: &CallParticipants) -> bool {
    !others_have_streams(roster) || !any_of_my_streams_live(roster)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use call_model::{
        AudioInput, CallParticipants, CallState, ParticipantState, StreamId, StreamState, UserId,
        VideoInput, VideoSize,
    };
    use std::time::Duration;

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    fn participant(id: &str) -> (Participant, call_model::ParticipantDriver) {
        Participant::new(UserId::from(id), id, None)
    }

    fn live_stream(id: &str) -> (call_model::Stream, call_model::StreamDriver) {
        let (stream, driver) = call_model::Stream::new(StreamId::from(id));
        driver.set_audio(Some(AudioInput::enabled()));
        driver.set_state(StreamState::Live);
        (stream, driver)
    }

    #[tokio::test(start_paused = true)]
    async fn test_streams_ui_merges_all_participants() {
        let (call, call_driver) = Call::new();
        let cancel = CancellationToken::new();
        let rx = streams_ui(&call, cancel.clone());

        let (me, me_driver) = participant("me");
        let (other, other_driver) = participant("alice");
        let (my_stream, _d1) = live_stream("me-cam");
        let (their_stream, _d2) = live_stream("alice-cam");
        me_driver.set_streams(vec![my_stream]);
        other_driver.set_streams(vec![their_stream]);
        me_driver.set_state(ParticipantState::InCall);
        other_driver.set_state(ParticipantState::InCall);
        call_driver.set_participants(CallParticipants {
            me: Some(me),
            others: vec![other],
        });
        settle().await;

        let streams = rx.borrow().clone();
        assert_eq!(streams.len(), 2);
        assert!(streams[0].is_mine);
        assert_eq!(streams[0].id, StreamId::from("me-cam"));
        assert!(!streams[1].is_mine);
        assert_eq!(streams[1].username, "alice");

        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_streams_ui_reacts_to_stream_removal() {
        let (call, call_driver) = Call::new();
        let cancel = CancellationToken::new();
        let rx = streams_ui(&call, cancel.clone());

        let (other, other_driver) = participant("alice");
        let (s1, _d1) = live_stream("s1");
        let (s2, _d2) = live_stream("s2");
        other_driver.set_streams(vec![s1, s2.clone()]);
        call_driver.set_participants(CallParticipants {
            me: None,
            others: vec![other],
        });
        settle().await;
        assert_eq!(rx.borrow().len(), 2);

        other_driver.set_streams(vec![s2]);
        settle().await;
        let streams = rx.borrow().clone();
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].id, StreamId::from("s2"));

        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_streams_ui_tracks_video_enabled() {
        let (call, call_driver) = Call::new();
        let cancel = CancellationToken::new();
        let rx = streams_ui(&call, cancel.clone());

        let (other, other_driver) = participant("alice");
        let (stream, stream_driver) = live_stream("s1");
        let (video, video_driver) = VideoInput::new(false, true, VideoSize::new(1280, 720));
        stream_driver.set_video(Some(video));
        other_driver.set_streams(vec![stream]);
        call_driver.set_participants(CallParticipants {
            me: None,
            others: vec![other],
        });
        settle().await;
        assert!(rx.borrow()[0].video.as_ref().unwrap().is_enabled);

        video_driver.set_enabled(false);
        settle().await;
        assert!(!rx.borrow()[0].video.as_ref().unwrap().is_enabled);

        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_do_any_of_my_streams_is_live() {
        let (call, call_driver) = Call::new();
        let cancel = CancellationToken::new();
        let rx = do_any_of_my_streams_is_live(&call, cancel.clone());
        assert!(!*rx.borrow());

        let (me, me_driver) = participant("me");
        let (stream, stream_driver) = call_model::Stream::new(StreamId::from("cam"));
        me_driver.set_streams(vec![stream]);
        call_driver.set_participants(CallParticipants {
            me: Some(me),
            others: Vec::new(),
        });
        settle().await;
        assert!(!*rx.borrow(), "open stream is not live yet");

        stream_driver.set_state(StreamState::Live);
        settle().await;
        assert!(*rx.borrow());

        stream_driver.set_state(StreamState::Closed);
        settle().await;
        assert!(!*rx.borrow());

        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_am_i_alone_and_waiting() {
        let (call, call_driver) = Call::new();
        let cancel = CancellationToken::new();
        let alone_rx = am_i_alone(&call, cancel.clone());
        let waiting_rx = am_i_waiting_others(&call, cancel.clone());

        let (me, me_driver) = participant("me");
        let (other, other_driver) = participant("alice");
        let (my_stream, my_stream_driver) = live_stream("me-cam");
        me_driver.set_streams(vec![my_stream]);
        call_driver.set_participants(CallParticipants {
            me: Some(me),
            others: vec![other],
        });
        settle().await;

        // My stream is live but the other side has nothing published.
        assert!(*alone_rx.borrow());
        assert!(!*waiting_rx.borrow(), "not waiting while not connected");

        call_driver.set_state(CallState::Connected);
        settle().await;
        assert!(*waiting_rx.borrow());

        let (their_stream, _d) = live_stream("alice-cam");
        other_driver.set_streams(vec![their_stream]);
        settle().await;
        assert!(!*alone_rx.borrow());
        assert!(!*waiting_rx.borrow());

        // A dead local stream makes me alone again.
        my_stream_driver.set_state(StreamState::Closed);
        settle().await;
        assert!(*alone_rx.borrow());

        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_has_at_least_a_video_enabled() {
        let (video, video_driver) = VideoInput::new(false, true, VideoSize::new(640, 480));
        let with_video = StreamUi {
            id: StreamId::from("s1"),
            username: "alice".to_string(),
            avatar: None,
            is_mine: false,
            audio: None,
            video: Some(VideoUi::from(&video)),
        };
        let without_video = StreamUi {
            id: StreamId::from("s2"),
            video: None,
            ..with_video.clone()
        };

        assert!(has_at_least_a_video_enabled(&[
            without_video.clone(),
            with_video.clone()
        ]));
        assert!(!has_at_least_a_video_enabled(&[without_video.clone()]));
        assert!(!has_at_least_a_video_enabled(&[]));

        video_driver.set_enabled(false);
        let disabled = StreamUi {
            video: Some(VideoUi::from(&video)),
            ..with_video
        };
        assert!(!has_at_least_a_video_enabled(&[disabled]));
    }
}
