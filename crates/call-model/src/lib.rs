//! Engine-facing reactive call model.
//!
//! The conference engine is an external collaborator: this crate models the
//! slice of its reactive surface the layout SDK consumes, nothing more. Each
//! observable object comes in two halves:
//!
//! - a cheap-to-clone read *handle* ([`Call`], [`Participant`], [`Stream`],
//!   [`VideoInput`]) holding `tokio::sync::watch` receivers, and
//! - a *driver* ([`CallDriver`], [`ParticipantDriver`], [`StreamDriver`],
//!   [`VideoInputDriver`]) holding the write side, owned by the engine
//!   adapter (or by test fixtures).
//!
//! Drivers publish with `send_if_modified`, so a value-identical update never
//! notifies subscribers. Consumers either read the current value through the
//! handle accessors or subscribe to the underlying watch channel.
//!
//! # Modules
//!
//! - [`ids`] - opaque identifier newtypes
//! - [`state`] - call/participant/stream state enums
//! - [`input`] - audio/video input descriptors
//! - [`stream`] - published stream handle and driver
//! - [`participant`] - participant handle, driver and the call roster
//! - [`call`] - the call handle and driver

pub mod call;
pub mod ids;
pub mod input;
pub mod participant;
pub mod state;
pub mod stream;

pub use call::{Call, CallDriver};
pub use ids::{StreamId, UserId};
pub use input::{AudioInput, VideoInput, VideoInputDriver, VideoSize};
pub use participant::{CallParticipants, Participant, ParticipantDriver};
pub use state::{CallState, NotInCallReason, ParticipantState, StreamState};
pub use stream::{Stream, StreamDriver};
