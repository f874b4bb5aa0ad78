//! Projection plumbing shared by the mappers.
//!
//! A projection is a single-writer task that owns a keyed set of watch
//! subscriptions over the call model, re-derives its full output value from
//! current state on any notification, and publishes through a watch channel
//! with distinct-until-changed semantics. Because every `watch` channel
//! always holds a current value, a (re)subscription starts from a complete
//! picture; a partial snapshot is unrepresentable.
//!
//! Structural subscriptions (a participant's stream list, a stream's video
//! slot) invalidate the subscription set itself: when one fires, the task
//! tears the set down and rebuilds it from current state, mirroring a
//! flat-map-latest over the changed source.

use call_model::{Call, CallParticipants, CallState, StreamId, UserId};
use std::collections::HashSet;
use std::pin::Pin;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::{Stream, StreamExt, StreamMap};
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub(crate) type ChangeStream = Pin<Box<dyn Stream<Item = ()> + Send>>;

/// Identifies one watched source within a projection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum SubKey {
    ParticipantState(UserId),
    ParticipantStreams(UserId),
    StreamAudio(StreamId),
    StreamVideo(StreamId),
    VideoEnabled(StreamId),
    StreamState(StreamId),
}

/// One watched source plus whether a change invalidates the set.
pub(crate) struct Subscription {
    key: SubKey,
    changes: ChangeStream,
    structural: bool,
}

impl Subscription {
    pub(crate) fn leaf<T>(key: SubKey, rx: watch::Receiver<T>) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        Self {
            key,
            changes: changes_of(rx),
            structural: false,
        }
    }

    pub(crate) fn structural<T>(key: SubKey, rx: watch::Receiver<T>) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        Self {
            key,
            changes: changes_of(rx),
            structural: true,
        }
    }
}

fn changes_of<T>(rx: watch::Receiver<T>) -> ChangeStream
where
    T: Clone + Send + Sync + 'static,
{
    Box::pin(WatchStream::from_changes(rx).map(|_| ()))
}

/// Spawn a projection task and return its output channel.
///
/// `subscribe` lists the sources relevant for the given roster; `derive`
/// computes the output from current state. The task lives until `cancel`
/// fires, every output receiver is dropped, or the call itself goes away.
pub(crate) fn spawn_projection<T, S, D>(
    target: &'static str,
    call: &Call,
    cancel: CancellationToken,
    subscribe: S,
    derive: D,
) -> watch::Receiver<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
    S: Fn(&CallParticipants) -> Vec<Subscription> + Send + 'static,
    D: Fn(&CallParticipants, CallState) -> T + Send + 'static,
{
    let mut roster_rx = call.participants_watch();
    let mut state_rx = call.state_watch();

    let initial = derive(&roster_rx.borrow().clone(), *state_rx.borrow());
    let (tx, rx) = watch::channel(initial);

    tokio::spawn(async move {
        'rebuild: loop {
            let roster = roster_rx.borrow_and_update().clone();
            let call_state = *state_rx.borrow_and_update();

            let mut structural_keys: HashSet<SubKey> = HashSet::new();
            let mut subscriptions: StreamMap<SubKey, ChangeStream> = StreamMap::new();
            for sub in subscribe(&roster) {
                if sub.structural {
                    structural_keys.insert(sub.key.clone());
                }
                subscriptions.insert(sub.key, sub.changes);
            }

            emit(&tx, derive(&roster, call_state));
            if tx.is_closed() {
                break;
            }

            loop {
                tokio::select! {
                    () = cancel.cancelled() => break 'rebuild,

                    changed = roster_rx.changed() => {
                        if changed.is_err() {
                            break 'rebuild;
                        }
                        continue 'rebuild;
                    }

                    changed = state_rx.changed() => {
                        if changed.is_err() {
                            break 'rebuild;
                        }
                        let roster_now = roster_rx.borrow().clone();
                        let state_now = *state_rx.borrow_and_update();
                        emit(&tx, derive(&roster_now, state_now));
                    }

                    next = subscriptions.next(), if !subscriptions.is_empty() => {
                        match next {
                            Some((key, ())) => {
                                if structural_keys.contains(&key) {
                                    continue 'rebuild;
                                }
                                let roster_now = roster_rx.borrow().clone();
                                let state_now = *state_rx.borrow();
                                emit(&tx, derive(&roster_now, state_now));
                            }
                            // Every watched source ended; wait for the
                            // roster or call state to move again.
                            None => continue,
                        }
                    }
                }

                if tx.is_closed() {
                    break 'rebuild;
                }
            }
        }

        debug!(target: "layout.mappers", projection = target, "projection stopped");
    });

    rx
}

fn emit<T: PartialEq>(tx: &watch::Sender<T>, value: T) {
    tx.send_if_modified(|current| {
        if *current == value {
            false
        } else {
            *current = value;
            true
        }
    });
}
