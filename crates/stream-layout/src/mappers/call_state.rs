//! Call state projection.

use call_model::{Call, CallState};
use tokio::sync::watch;

/// The call's lifecycle state as consumed by the UI layer.
///
/// The engine model already publishes distinct values through a watch
/// channel, so this is a plain subscription; it exists so UI consumers
/// depend on the mapper surface rather than on the engine handle.
#[must_use]
pub fn call_state_ui(call: &Call) -> watch::Receiver<CallState> {
    call.state_watch()
}
