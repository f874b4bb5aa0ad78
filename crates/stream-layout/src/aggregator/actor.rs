//! `StreamStateActor` - owns the aggregate layout state for one call.
//!
//! The actor is the single writer of [`StreamUiState`]: imperative intents
//! (pin, unpin, fullscreen, capacity changes) arrive as mailbox commands,
//! upstream reactive changes arrive through the mapper channels, and both
//! are serialized onto the actor task. Consumers read immutable snapshots
//! through a watch channel; no shared mutable state exists.
//!
//! # Debounce
//!
//! A new upstream stream list normally applies immediately. The one
//! exception: while the call is connected with other participants in call
//! and the incoming list holds exactly one stream, the apply is deferred by
//! a debounce interval. This absorbs the one-by-one churn of streams
//! (re)publishing during connection setup, where rendering the intermediate
//! single-stream list would flicker. Any newer upstream emission cancels
//! the pending apply and is evaluated fresh (generation-counted).

use super::messages::LayoutCommand;
use crate::config::LayoutConfig;
use crate::errors::LayoutError;
use crate::layout::CapacityConfig;
use crate::mappers;
use crate::model::{ParticipantUi, StreamPreview, StreamUi, StreamUiState};

use call_model::{Call, CallParticipants, CallState, StreamId};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Mailbox capacity for layout commands.
const LAYOUT_CHANNEL_BUFFER: usize = 64;

/// Handle to a [`StreamStateActor`].
#[derive(Debug, Clone)]
pub struct StreamStateHandle {
    sender: mpsc::Sender<LayoutCommand>,
    cancel_token: CancellationToken,
    state: watch::Receiver<StreamUiState>,
}

impl StreamStateHandle {
    /// Pin a stream. Returns `true` iff the stream is currently in the
    /// displayable list and the pinned set is below capacity.
    pub async fn pin(&self, stream_id: StreamId) -> Result<bool, LayoutError> {
        let (tx, rx) = oneshot::channel();
        self.send(LayoutCommand::Pin {
            stream_id,
            respond_to: tx,
        })
        .await?;
        rx.await
            .map_err(|e| LayoutError::ActorUnavailable(format!("response receive failed: {e}")))
    }

    /// Unpin a stream; no-op if it is not pinned.
    pub async fn unpin(&self, stream_id: StreamId) -> Result<(), LayoutError> {
        self.send(LayoutCommand::Unpin { stream_id }).await
    }

    /// Clear the pinned set.
    pub async fn unpin_all(&self) -> Result<(), LayoutError> {
        self.send(LayoutCommand::UnpinAll).await
    }

    /// Select the fullscreen stream (`None` clears). Selecting a stream not
    /// currently in the list leaves the state unchanged.
    pub async fn fullscreen(&self, stream_id: Option<StreamId>) -> Result<(), LayoutError> {
        self.send(LayoutCommand::Fullscreen { stream_id }).await
    }

    pub async fn set_max_pinned_streams(&self, count: usize) -> Result<(), LayoutError> {
        self.send(LayoutCommand::SetMaxPinnedStreams { count }).await
    }

    pub async fn set_max_thumbnail_streams(&self, count: usize) -> Result<(), LayoutError> {
        self.send(LayoutCommand::SetMaxThumbnailStreams { count })
            .await
    }

    pub async fn set_max_featured_streams(&self, count: usize) -> Result<(), LayoutError> {
        self.send(LayoutCommand::SetMaxFeaturedStreams { count })
            .await
    }

    /// Current capacity configuration.
    pub async fn capacities(&self) -> Result<CapacityConfig, LayoutError> {
        let (tx, rx) = oneshot::channel();
        self.send(LayoutCommand::Capacities { respond_to: tx })
            .await?;
        rx.await
            .map_err(|e| LayoutError::ActorUnavailable(format!("response receive failed: {e}")))
    }

    /// Current layout state snapshot.
    #[must_use]
    pub fn state(&self) -> StreamUiState {
        self.state.borrow().clone()
    }

    /// Subscribe to layout state snapshots.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StreamUiState> {
        self.state.clone()
    }

    /// Tear the actor down.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    async fn send(&self, command: LayoutCommand) -> Result<(), LayoutError> {
        self.sender
            .send(command)
            .await
            .map_err(|e| LayoutError::ActorUnavailable(format!("command send failed: {e}")))
    }
}

/// A deferred upstream apply, waiting out the debounce window.
struct PendingApply {
    streams: Vec<StreamUi>,
    deadline: Instant,
    generation: u64,
}

/// The `StreamStateActor` implementation.
pub struct StreamStateActor {
    receiver: mpsc::Receiver<LayoutCommand>,
    cancel_token: CancellationToken,
    state: watch::Sender<StreamUiState>,
    streams_rx: watch::Receiver<Vec<StreamUi>>,
    in_call_rx: watch::Receiver<Vec<ParticipantUi>>,
    call_state_rx: watch::Receiver<CallState>,
    roster_rx: watch::Receiver<CallParticipants>,
    caps: CapacityConfig,
    debounce: Duration,
    pending: Option<PendingApply>,
    /// The list most recently written to the state; used to detect streams
    /// *entering* (for the screen-share auto-pin).
    last_applied: Vec<StreamUi>,
    /// Bumped on every upstream emission; a pending apply from an older
    /// generation is dead the moment a newer emission arrives.
    generation: u64,
    /// Set on `Ended`: upstream changes are ignored from then on, commands
    /// keep being served (and reject by value).
    ended: bool,
}

impl StreamStateActor {
    /// Spawn the aggregation actor for a call.
    ///
    /// Returns a handle and the task join handle. The mappers feeding the
    /// actor are spawned with child tokens of `cancel_token`, so one cancel
    /// tears the whole pipeline down.
    pub fn spawn(
        call: &Call,
        config: LayoutConfig,
        cancel_token: CancellationToken,
    ) -> (StreamStateHandle, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(LAYOUT_CHANNEL_BUFFER);
        let (state_tx, state_rx) = watch::channel(StreamUiState::default());

        let actor = Self {
            receiver,
            cancel_token: cancel_token.clone(),
            state: state_tx,
            streams_rx: mappers::streams_ui(call, cancel_token.child_token()),
            in_call_rx: mappers::in_call_participants(call, cancel_token.child_token()),
            call_state_rx: call.state_watch(),
            roster_rx: call.participants_watch(),
            caps: config.initial_capacities,
            debounce: config.single_stream_debounce,
            pending: None,
            last_applied: Vec::new(),
            generation: 0,
            ended: false,
        };

        let task_handle = tokio::spawn(actor.run());

        let handle = StreamStateHandle {
            sender,
            cancel_token,
            state: state_rx,
        };

        (handle, task_handle)
    }

    /// Run the actor loop.
    #[instrument(skip_all, name = "layout.aggregator")]
    async fn run(mut self) {
        info!(target: "layout.aggregator", "stream state actor started");

        // Streams published before the actor existed count as an upstream
        // update too.
        let initial = self.streams_rx.borrow_and_update().clone();
        self.ingest_streams(initial);
        self.refresh_preview();

        loop {
            let deadline = self
                .pending
                .as_ref()
                .map_or_else(Instant::now, |p| p.deadline);

            tokio::select! {
                () = self.cancel_token.cancelled() => {
                    info!(target: "layout.aggregator", "stream state actor cancelled");
                    break;
                }

                maybe = self.receiver.recv() => {
                    match maybe {
                        Some(command) => self.handle_command(command),
                        None => {
                            info!(target: "layout.aggregator", "command channel closed, exiting");
                            break;
                        }
                    }
                }

                changed = self.streams_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let new_list = self.streams_rx.borrow_and_update().clone();
                    self.ingest_streams(new_list);
                }

                changed = self.call_state_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    self.on_call_state_changed();
                }

                changed = self.in_call_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    // Read on demand by the debounce decision; just clear
                    // the notification.
                    let _ = self.in_call_rx.borrow_and_update();
                }

                changed = self.roster_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let _ = self.roster_rx.borrow_and_update();
                    self.refresh_preview();
                }

                () = tokio::time::sleep_until(deadline), if self.pending.is_some() => {
                    self.apply_pending();
                }
            }
        }

        info!(target: "layout.aggregator", "stream state actor stopped");
    }

    /// Decide whether a fresh upstream list applies now or after the
    /// debounce window.
    fn ingest_streams(&mut self, new_list: Vec<StreamUi>) {
        if self.ended {
            return;
        }

        let call_state = *self.call_state_rx.borrow();
        let in_call_count = self.in_call_rx.borrow().len();
        self.generation = self.generation.wrapping_add(1);

        let defer = call_state == CallState::Connected
            && new_list.len() == 1
            && in_call_count > 1;

        if defer {
            debug!(
                target: "layout.aggregator",
                generation = self.generation,
                debounce_ms = self.debounce.as_millis() as u64,
                "deferring single-stream update"
            );
            self.pending = Some(PendingApply {
                streams: new_list,
                deadline: Instant::now() + self.debounce,
                generation: self.generation,
            });
        } else {
            self.pending = None;
            self.apply_streams(new_list, call_state);
        }
    }

    fn apply_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!(
                target: "layout.aggregator",
                generation = pending.generation,
                "applying deferred update"
            );
            let call_state = *self.call_state_rx.borrow();
            self.apply_streams(pending.streams, call_state);
        }
    }

    /// Write a new stream list into the state, maintaining the pin and
    /// fullscreen invariants.
    fn apply_streams(&mut self, new_list: Vec<StreamUi>, call_state: CallState) {
        // A local screen share just *entering* the list gets auto-pinned at
        // the front.
        let entering_screen_share = new_list
            .iter()
            .find(|s| s.is_local_screen_share())
            .filter(|ss| !self.last_applied.iter().any(|prev| prev.id == ss.id))
            .cloned();
        let max_pinned = self.caps.max_pinned_streams;

        self.state.send_if_modified(|state| {
            // Prune pins that left the list, refreshing survivors to the
            // new snapshots.
            let mut pinned: Vec<StreamUi> = state
                .pinned_streams
                .iter()
                .filter_map(|p| new_list.iter().find(|s| s.id == p.id).cloned())
                .collect();

            if let Some(screen_share) = &entering_screen_share {
                if !pinned.iter().any(|p| p.id == screen_share.id) {
                    pinned.insert(0, screen_share.clone());
                    while pinned.len() > max_pinned {
                        // Evict the pin displaced from the front; with zero
                        // capacity the screen share itself goes.
                        if pinned.len() > 1 {
                            pinned.remove(1);
                        } else {
                            pinned.clear();
                        }
                    }
                }
            }

            // Fullscreen selection does not survive a reconnect, and never
            // survives its stream leaving the list.
            let fullscreen = if call_state == CallState::Reconnecting {
                None
            } else {
                state
                    .fullscreen_stream
                    .as_ref()
                    .and_then(|f| new_list.iter().find(|s| s.id == f.id).cloned())
            };

            let next = StreamUiState {
                streams: new_list.clone(),
                pinned_streams: pinned,
                fullscreen_stream: fullscreen,
                preview: state.preview.clone(),
            };
            if *state == next {
                false
            } else {
                *state = next;
                true
            }
        });

        self.last_applied = new_list;
        self.refresh_preview();
    }

    fn on_call_state_changed(&mut self) {
        let call_state = *self.call_state_rx.borrow_and_update();
        match call_state {
            CallState::Ended => {
                info!(target: "layout.aggregator", "call ended, resetting layout state");
                self.pending = None;
                self.last_applied.clear();
                self.ended = true;
                self.state.send_if_modified(|state| {
                    let default = StreamUiState::default();
                    if *state == default {
                        false
                    } else {
                        *state = default;
                        true
                    }
                });
                return;
            }
            CallState::Reconnecting => {
                debug!(target: "layout.aggregator", "reconnecting, clearing fullscreen selection");
                self.state
                    .send_if_modified(|state| state.fullscreen_stream.take().is_some());
            }
            _ => {}
        }
        self.refresh_preview();
    }

    /// Keep the pre-call preview in sync: populated while dialing/ringing,
    /// dropped once the call is past pre-call and the list holds more than
    /// one stream.
    fn refresh_preview(&mut self) {
        if self.ended {
            return;
        }

        let call_state = *self.call_state_rx.borrow();
        if call_state.is_pre_call() {
            let roster = self.roster_rx.borrow().clone();
            let Some(first_other) = roster.others.first().cloned() else {
                return;
            };
            let my_camera = self
                .state
                .borrow()
                .streams
                .iter()
                .find(|s| s.is_mine && s.video.as_ref().is_some_and(|v| !v.is_screen_share))
                .and_then(|s| s.video.clone());
            let preview = StreamPreview {
                is_group_call: roster.others.len() > 1,
                video: my_camera,
                username: first_other.display_name().to_string(),
                avatar: first_other.avatar().map(str::to_string),
            };
            self.state.send_if_modified(|state| {
                if state.preview.as_ref() == Some(&preview) {
                    false
                } else {
                    state.preview = Some(preview.clone());
                    true
                }
            });
        } else {
            self.state.send_if_modified(|state| {
                if state.preview.is_some() && state.streams.len() > 1 {
                    state.preview = None;
                    true
                } else {
                    false
                }
            });
        }
    }

    fn handle_command(&mut self, command: LayoutCommand) {
        match command {
            LayoutCommand::Pin {
                stream_id,
                respond_to,
            } => {
                let _ = respond_to.send(self.handle_pin(&stream_id));
            }

            LayoutCommand::Unpin { stream_id } => {
                self.state.send_if_modified(|state| {
                    let before = state.pinned_streams.len();
                    state.pinned_streams.retain(|p| p.id != stream_id);
                    state.pinned_streams.len() != before
                });
            }

            LayoutCommand::UnpinAll => {
                self.state.send_if_modified(|state| {
                    if state.pinned_streams.is_empty() {
                        false
                    } else {
                        state.pinned_streams.clear();
                        true
                    }
                });
            }

            LayoutCommand::Fullscreen { stream_id } => {
                self.state.send_if_modified(|state| match stream_id {
                    None => state.fullscreen_stream.take().is_some(),
                    Some(ref id) => {
                        let Some(stream) = state.streams.iter().find(|s| &s.id == id).cloned()
                        else {
                            return false;
                        };
                        if state.fullscreen_stream.as_ref() == Some(&stream) {
                            false
                        } else {
                            state.fullscreen_stream = Some(stream);
                            true
                        }
                    }
                });
            }

            LayoutCommand::SetMaxPinnedStreams { count } => {
                self.caps.max_pinned_streams = count;
                // Excess pins drop newest-first: the list keeps pin order,
                // so truncation keeps the oldest pins.
                self.state.send_if_modified(|state| {
                    if state.pinned_streams.len() > count {
                        state.pinned_streams.truncate(count);
                        true
                    } else {
                        false
                    }
                });
            }

            LayoutCommand::SetMaxThumbnailStreams { count } => {
                self.caps.max_thumbnail_streams = count;
            }

            LayoutCommand::SetMaxFeaturedStreams { count } => {
                self.caps.max_featured_streams = count;
            }

            LayoutCommand::Capacities { respond_to } => {
                let _ = respond_to.send(self.caps);
            }
        }
    }

    fn handle_pin(&mut self, stream_id: &StreamId) -> bool {
        let max_pinned = self.caps.max_pinned_streams;
        let mut pinned = false;
        self.state.send_if_modified(|state| {
            if state.is_pinned(stream_id) {
                // Already pinned: success without mutation.
                pinned = true;
                return false;
            }
            let Some(stream) = state.find_stream(stream_id).cloned() else {
                return false;
            };
            if state.pinned_streams.len() >= max_pinned {
                return false;
            }
            state.pinned_streams.push(stream);
            pinned = true;
            true
        });
        pinned
    }
}
