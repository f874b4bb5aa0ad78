//! Picture-in-picture stream reduction.
//!
//! When the call is minimized into the system PiP window only one or two
//! streams fit, and the OS window wants a stable aspect ratio: resizing it
//! on every frame-size report would thrash, so the ratio is sampled on a
//! fixed interval and only re-emitted when it meaningfully changes.

use crate::model::{StreamUi, StreamUiState};
use call_model::VideoSize;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Streams shown at most in the PiP window.
pub const MAX_PIP_STREAMS: usize = 2;

/// Aspect ratio used whenever a single remote stream is not being tracked.
pub const DEFAULT_PIP_ASPECT_RATIO: AspectRatio = AspectRatio {
    width: 9,
    height: 16,
};

/// A reduced width:height ratio for the OS PiP window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    /// Reduce a video size to its aspect ratio. Degenerate sizes fall back
    /// to the default portrait ratio.
    #[must_use]
    pub fn of(size: VideoSize) -> Self {
        let divisor = gcd(size.width, size.height);
        if divisor == 0 {
            DEFAULT_PIP_ASPECT_RATIO
        } else {
            Self {
                width: size.width / divisor,
                height: size.height / divisor,
            }
        }
    }

    #[must_use]
    pub fn as_f32(self) -> f32 {
        if self.height == 0 {
            0.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

const fn gcd(a: u32, b: u32) -> u32 {
    let (mut a, mut b) = (a, b);
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// Select the streams shown on the PiP surface.
///
/// Fullscreen wins outright; otherwise up to two pinned streams; otherwise
/// up to two remote streams.
#[must_use]
pub fn pip_streams_to_display(state: &StreamUiState) -> Vec<StreamUi> {
    if let Some(fullscreen) = &state.fullscreen_stream {
        return vec![fullscreen.clone()];
    }
    if !state.pinned_streams.is_empty() {
        return state
            .pinned_streams
            .iter()
            .take(MAX_PIP_STREAMS)
            .cloned()
            .collect();
    }
    state
        .streams
        .iter()
        .filter(|s| !s.is_mine)
        .take(MAX_PIP_STREAMS)
        .cloned()
        .collect()
}

/// The stream whose live video dimensions drive the PiP aspect ratio:
/// exactly one remote stream shown, no local screen share active.
fn tracked_stream(state: &StreamUiState) -> Option<StreamUi> {
    if state.is_screen_share_active() {
        return None;
    }
    let shown = pip_streams_to_display(state);
    match shown.as_slice() {
        [only] if !only.is_mine => Some(only.clone()),
        _ => None,
    }
}

/// Spawn the aspect-ratio sampler for a PiP surface.
///
/// Every `sample_interval` the current layout state is inspected; while a
/// single remote stream is shown its live video size is reduced to a
/// ratio, otherwise the default 9:16 applies. Emissions are deduplicated on
/// the ratio rounded to two decimals, so minor size jitter never reaches
/// the OS window.
#[must_use]
pub fn spawn_aspect_ratio_sampler(
    state_rx: watch::Receiver<StreamUiState>,
    sample_interval: Duration,
    cancel: CancellationToken,
) -> (watch::Receiver<AspectRatio>, JoinHandle<()>) {
    let (tx, rx) = watch::channel(DEFAULT_PIP_ASPECT_RATIO);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sample_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // Rounded ratio last pushed to the OS window.
        let mut last_rounded: Option<i32> = None;

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if tx.is_closed() {
                        break;
                    }
                    let state = state_rx.borrow().clone();
                    let size = tracked_stream(&state)
                        .and_then(|s| s.video.map(|v| v.size()))
                        .unwrap_or(VideoSize {
                            width: DEFAULT_PIP_ASPECT_RATIO.width,
                            height: DEFAULT_PIP_ASPECT_RATIO.height,
                        });

                    let ratio = if size.height == 0 {
                        0.0
                    } else {
                        size.width as f32 / size.height as f32
                    };
                    let rounded = (ratio * 100.0) as i32;
                    if last_rounded != Some(rounded) {
                        last_rounded = Some(rounded);
                        let aspect = AspectRatio::of(size);
                        debug!(
                            target: "layout.pip",
                            width = aspect.width,
                            height = aspect.height,
                            "pip aspect ratio changed"
                        );
                        let _ = tx.send(aspect);
                    }
                }
            }
        }

        debug!(target: "layout.pip", "aspect ratio sampler stopped");
    });

    (rx, task)
}
