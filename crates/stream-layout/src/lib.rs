//! Stream Layout SDK
//!
//! This library reduces the reactive model of an external conference engine
//! (see `call-model`) into the state a call screen renders: which streams
//! are featured, pinned, fullscreen or thumbnails, what the "+N others"
//! summary contains, and what the minimized picture-in-picture surface
//! shows.
//!
//! # Architecture
//!
//! ```text
//! engine (watch channels)
//!   └── mappers          pure reactive projections (streams list,
//!   │                    in-call roster, boolean combinators)
//!   └── StreamStateActor owns StreamUiState, serializes all mutation,
//!   │                    applies debounce/pruning/auto-pin rules
//!   └── layout / pip     pure selection & sizing policy over snapshots
//! ```
//!
//! All mutation is confined to the actor task; everything downstream reads
//! immutable [`model::StreamUiState`] snapshots through a watch channel, so
//! no locks are involved anywhere.
//!
//! # Modules
//!
//! - [`model`] - UI-ready snapshot types
//! - [`mappers`] - reactive projections over the engine model
//! - [`aggregator`] - the stream aggregation state actor
//! - [`layout`] - selection and sizing policy
//! - [`pip`] - picture-in-picture reduction and aspect-ratio sampling
//! - [`config`] - environment-driven configuration
//! - [`errors`] - error types

pub mod aggregator;
pub mod config;
pub mod errors;
pub mod layout;
pub mod mappers;
pub mod model;
pub mod pip;

pub use aggregator::{StreamStateActor, StreamStateHandle};
pub use config::LayoutConfig;
pub use errors::LayoutError;
pub use layout::{CapacityConfig, LayoutSlot, SlotRole, WindowSizeClass};
pub use model::{StreamPreview, StreamUi, StreamUiState};
