//! Stream aggregation state: the single source of truth for layout.
//!
//! One [`StreamStateActor`] per call screen owns the authoritative
//! [`crate::model::StreamUiState`]; everything else reads snapshots.
//!
//! # Modules
//!
//! - [`actor`] - the actor, its handle and the debounced apply policy
//! - [`messages`] - mailbox command types

pub mod actor;
pub mod messages;

pub use actor::{StreamStateActor, StreamStateHandle};
pub use messages::LayoutCommand;
