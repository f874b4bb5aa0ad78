//! Command types for the aggregation actor.
//!
//! All mutation of layout state travels through these messages over a
//! `tokio::sync::mpsc` mailbox; request-reply commands carry a
//! `tokio::sync::oneshot` responder.

use crate::layout::CapacityConfig;
use call_model::StreamId;
use tokio::sync::oneshot;

/// Commands accepted by `StreamStateActor`.
#[derive(Debug)]
pub enum LayoutCommand {
    /// Pin a stream for a larger display slot.
    ///
    /// Replies `true` iff the stream is currently displayable and the
    /// pinned set is below capacity; `false` otherwise, with no mutation.
    Pin {
        stream_id: StreamId,
        respond_to: oneshot::Sender<bool>,
    },

    /// Remove a stream from the pinned set. No-op if it is not pinned.
    Unpin { stream_id: StreamId },

    /// Clear the pinned set.
    UnpinAll,

    /// Select the stream occupying the whole display area, or clear the
    /// selection with `None`. Selecting an absent stream is a no-op.
    Fullscreen { stream_id: Option<StreamId> },

    /// Update the pinned-stream capacity; excess pins are dropped
    /// newest-first.
    SetMaxPinnedStreams { count: usize },

    /// Update the thumbnail capacity consumed by the selection policy.
    SetMaxThumbnailStreams { count: usize },

    /// Update the featured-grid capacity consumed by the selection policy.
    SetMaxFeaturedStreams { count: usize },

    /// Read the current capacity configuration.
    Capacities {
        respond_to: oneshot::Sender<CapacityConfig>,
    },
}
