//! End-to-end flow: engine events through mappers, aggregation and the
//! selection policy, the way a call screen consumes the SDK.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

use call_model::{CallState, StreamId, VideoSize};
use layout_test_utils::{TestCall, TestParticipant, TestStream};
use std::time::Duration;
use stream_layout::aggregator::StreamStateActor;
use stream_layout::config::LayoutConfig;
use stream_layout::layout::{build_layout, CapacityConfig, LayoutSlot, SlotRole, WindowSizeClass};
use stream_layout::pip::{
    pip_streams_to_display, spawn_aspect_ratio_sampler, AspectRatio, DEFAULT_PIP_ASPECT_RATIO,
};
use tokio_util::sync::CancellationToken;

async fn settle() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[tokio::test(start_paused = true)]
async fn full_call_lifecycle() {
    init_tracing();
    let mut call = TestCall::new();
    call.set_state(CallState::RingingRemotely);
    call.set_me(TestParticipant::new("me", "Me"));
    call.add_other(TestParticipant::new("alice", "Alice"));

    let cancel = CancellationToken::new();
    let (handle, _task) =
        StreamStateActor::spawn(&call.call, LayoutConfig::default(), cancel.clone());
    settle().await;

    // Pre-call: preview shown, no grid.
    let state = handle.state();
    let preview = state.preview.as_ref().expect("preview while ringing");
    assert_eq!(preview.username, "Alice");
    assert!(build_layout(&state, CapacityConfig::default()).is_empty());

    // The call connects and both sides publish.
    call.set_state(CallState::Connected);
    call.me_mut().unwrap().add_stream(TestStream::camera("me-cam"));
    settle().await;
    call.other_mut("alice")
        .unwrap()
        .set_state(call_model::ParticipantState::InCall);
    call.other_mut("alice")
        .unwrap()
        .add_stream(TestStream::camera("alice-cam"));
    settle().await;
    tokio::time::advance(Duration::from_millis(600)).await;
    settle().await;

    let state = handle.state();
    assert_eq!(state.streams.len(), 2);
    assert!(state.preview.is_none(), "preview gone once the grid fills");

    let window = WindowSizeClass::from_dimensions(360.0, 800.0);
    let slots = build_layout(&state, CapacityConfig::for_window(window));
    assert_eq!(slots.len(), 2);
    assert!(slots.iter().all(|slot| matches!(
        slot,
        LayoutSlot::Stream {
            role: SlotRole::Featured,
            ..
        }
    )));

    // The user pins the remote stream.
    assert!(handle.pin(StreamId::from("alice-cam")).await.unwrap());
    let slots = build_layout(&handle.state(), CapacityConfig::for_window(window));
    match &slots[0] {
        LayoutSlot::Stream { stream, role, .. } => {
            assert_eq!(stream.id, StreamId::from("alice-cam"));
            assert_eq!(*role, SlotRole::Pinned);
        }
        LayoutSlot::MoreParticipants { .. } => panic!("expected the pinned stream first"),
    }

    // Sharing the screen auto-pins it in front of the manual pin.
    call.me_mut()
        .unwrap()
        .add_stream(TestStream::screen_share("me-share"));
    settle().await;
    let state = handle.state();
    assert_eq!(state.pinned_streams.len(), 2);
    assert_eq!(state.pinned_streams[0].id, StreamId::from("me-share"));
    let slots = build_layout(&state, CapacityConfig::for_window(window));
    assert!(slots.iter().any(|slot| matches!(
        slot,
        LayoutSlot::Stream {
            is_local_screen_share: true,
            selectable: false,
            ..
        }
    )));

    // Fullscreen overrides the whole grid.
    handle
        .fullscreen(Some(StreamId::from("alice-cam")))
        .await
        .unwrap();
    settle().await;
    let slots = build_layout(&handle.state(), CapacityConfig::for_window(window));
    assert_eq!(slots.len(), 1);
    assert!(matches!(
        &slots[0],
        LayoutSlot::Stream {
            role: SlotRole::Fullscreen,
            ..
        }
    ));

    // The call ends: everything resets.
    call.set_state(CallState::Ended);
    settle().await;
    let state = handle.state();
    assert!(state.streams.is_empty());
    assert!(state.pinned_streams.is_empty());
    assert!(state.fullscreen_stream.is_none());

    cancel.cancel();
}

#[tokio::test(start_paused = true)]
async fn overflow_surfaces_a_summary_tile() {
    init_tracing();
    let mut call = TestCall::connected();
    call.set_me(TestParticipant::new("me", "Me").in_call());
    for (user, stream) in [("alice", "a"), ("bob", "b"), ("carol", "c")] {
        call.add_other(TestParticipant::new(user, user).in_call());
        call.other_mut(user)
            .unwrap()
            .add_stream(TestStream::camera(stream));
    }

    let cancel = CancellationToken::new();
    let (handle, _task) =
        StreamStateActor::spawn(&call.call, LayoutConfig::default(), cancel.clone());
    settle().await;

    handle.set_max_featured_streams(2).await.unwrap();
    settle().await;

    let state = handle.state();
    assert_eq!(state.streams.len(), 3);
    let slots = build_layout(
        &state,
        CapacityConfig {
            max_featured_streams: 2,
            max_thumbnail_streams: 3,
            max_pinned_streams: 2,
        },
    );

    assert_eq!(slots.len(), 2);
    match &slots[1] {
        LayoutSlot::MoreParticipants { participants } => {
            // The replaced second slot joins the overflow in the summary.
            assert_eq!(participants.len(), 2);
        }
        LayoutSlot::Stream { .. } => panic!("expected a summary tile"),
    }

    cancel.cancel();
}

#[tokio::test(start_paused = true)]
async fn pip_surface_tracks_the_single_remote_stream() {
    init_tracing();
    let mut call = TestCall::connected();
    call.set_me(TestParticipant::new("me", "Me").in_call());
    call.add_other(TestParticipant::new("alice", "Alice").in_call());
    call.me_mut().unwrap().add_stream(TestStream::camera("me-cam"));
    call.other_mut("alice")
        .unwrap()
        .add_stream(TestStream::camera("alice-cam"));

    let cancel = CancellationToken::new();
    let config = LayoutConfig::default();
    let (handle, _task) = StreamStateActor::spawn(&call.call, config.clone(), cancel.clone());
    settle().await;

    let shown = pip_streams_to_display(&handle.state());
    assert_eq!(shown.len(), 1, "only the remote stream fits the pip");
    assert_eq!(shown[0].id, StreamId::from("alice-cam"));

    let (ratio_rx, _sampler) = spawn_aspect_ratio_sampler(
        handle.subscribe(),
        config.pip_sample_interval,
        cancel.clone(),
    );
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(
        *ratio_rx.borrow(),
        AspectRatio {
            width: 16,
            height: 9
        }
    );

    // The remote camera rotates; the sampler picks it up on the next tick.
    call.other_mut("alice")
        .unwrap()
        .stream(&StreamId::from("alice-cam"))
        .unwrap()
        .set_video_size(VideoSize::new(720, 1280));
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(
        *ratio_rx.borrow(),
        AspectRatio {
            width: 9,
            height: 16
        }
    );

    // Sharing my screen pins it, so the pip shows the share and falls back
    // to the default ratio.
    call.me_mut()
        .unwrap()
        .add_stream(TestStream::screen_share("me-share"));
    settle().await;
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(*ratio_rx.borrow(), DEFAULT_PIP_ASPECT_RATIO);

    cancel.cancel();
}
