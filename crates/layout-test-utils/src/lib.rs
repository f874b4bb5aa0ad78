//! # Layout Test Utilities
//!
//! Fixtures for testing the stream layout SDK against a simulated call:
//! each fixture owns both halves of a `call-model` object (the read handle
//! and the driver), so tests mutate engine state through plain method
//! calls.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use layout_test_utils::{TestCall, TestParticipant, TestStream};
//!
//! let mut call = TestCall::connected();
//! call.set_me(TestParticipant::new("me", "Me").in_call());
//! call.add_other(TestParticipant::new("alice", "Alice").in_call());
//!
//! if let Some(alice) = call.other_mut("alice") {
//!     alice.add_stream(TestStream::camera("alice-cam"));
//! }
//! ```

pub mod fixtures;

pub use fixtures::{TestCall, TestParticipant, TestStream, TestVideo};
