//! Reactive projections from the engine model to UI-shaped values.
//!
//! Every mapper spawns a single-writer projection task (see [`support`])
//! and hands back a `watch::Receiver`: subscribers always see a complete,
//! distinct value and never a partial merge. Tasks stop when the given
//! cancellation token fires or the last receiver is dropped.
//!
//! # Modules
//!
//! - [`streams`] - the flat stream list and stream-derived booleans
//! - [`participants`] - in-call roster and ringing detection
//! - [`call_state`] - call lifecycle passthrough

pub mod call_state;
pub mod participants;
pub mod streams;

mod support;

pub use call_state::call_state_ui;
pub use participants::{are_other_participants_ringing, in_call_participants};
pub use streams::{
    am_i_alone, am_i_waiting_others, do_any_of_my_streams_is_live, do_i_have_streams,
    do_others_have_streams, has_at_least_a_video_enabled, my_streams_ui, streams_ui,
};
