//! Audio and video input descriptors attached to a stream.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Pixel dimensions of a video source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSize {
    pub width: u32,
    pub height: u32,
}

impl VideoSize {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Snapshot of a stream's audio source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioInput {
    /// Whether the source is producing audio.
    pub is_enabled: bool,
    /// Whether the local user muted this source for themselves only.
    pub is_muted_for_you: bool,
}

impl AudioInput {
    #[must_use]
    pub const fn enabled() -> Self {
        Self {
            is_enabled: true,
            is_muted_for_you: false,
        }
    }
}

/// Handle to a stream's video source.
///
/// `enabled` participates in the stream-list level of the reactive pipeline;
/// `size` deliberately does not. Live dimensions change at frame cadence and
/// are only read by samplers (the PiP aspect-ratio tracker), so equality of
/// two handles is channel identity plus the screen-share flag, never the
/// current size value.
#[derive(Debug, Clone)]
pub struct VideoInput {
    is_screen_share: bool,
    enabled: watch::Receiver<bool>,
    size: watch::Receiver<VideoSize>,
}

impl VideoInput {
    /// Create a video input handle and its driver.
    #[must_use]
    pub fn new(is_screen_share: bool, enabled: bool, size: VideoSize) -> (Self, VideoInputDriver) {
        let (enabled_tx, enabled_rx) = watch::channel(enabled);
        let (size_tx, size_rx) = watch::channel(size);
        (
            Self {
                is_screen_share,
                enabled: enabled_rx,
                size: size_rx,
            },
            VideoInputDriver {
                enabled: enabled_tx,
                size: size_tx,
            },
        )
    }

    #[must_use]
    pub const fn is_screen_share(&self) -> bool {
        self.is_screen_share
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        *self.enabled.borrow()
    }

    #[must_use]
    pub fn enabled_watch(&self) -> watch::Receiver<bool> {
        self.enabled.clone()
    }

    /// Current live dimensions.
    #[must_use]
    pub fn size(&self) -> VideoSize {
        *self.size.borrow()
    }

    #[must_use]
    pub fn size_watch(&self) -> watch::Receiver<VideoSize> {
        self.size.clone()
    }
}

impl PartialEq for VideoInput {
    fn eq(&self, other: &Self) -> bool {
        self.is_screen_share == other.is_screen_share
            && self.enabled.same_channel(&other.enabled)
            && self.size.same_channel(&other.size)
    }
}

impl Eq for VideoInput {}

/// Write side of a [`VideoInput`], owned by the engine adapter.
#[derive(Debug)]
pub struct VideoInputDriver {
    enabled: watch::Sender<bool>,
    size: watch::Sender<VideoSize>,
}

impl VideoInputDriver {
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.send_if_modified(|current| {
            let changed = *current != enabled;
            *current = enabled;
            changed
        });
    }

    pub fn set_size(&self, size: VideoSize) {
        self.size.send_if_modified(|current| {
            let changed = *current != size;
            *current = size;
            changed
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_video_input_equality_is_channel_identity() {
        let (video, _driver) = VideoInput::new(false, true, VideoSize::new(1280, 720));
        let clone = video.clone();
        assert_eq!(video, clone);

        let (other, _other_driver) = VideoInput::new(false, true, VideoSize::new(1280, 720));
        assert_ne!(video, other);
    }

    #[test]
    fn test_size_change_does_not_affect_equality() {
        let (video, driver) = VideoInput::new(false, true, VideoSize::new(1280, 720));
        let clone = video.clone();
        driver.set_size(VideoSize::new(640, 480));
        assert_eq!(video, clone);
        assert_eq!(video.size(), VideoSize::new(640, 480));
    }

    #[test]
    fn test_enabled_updates_are_distinct() {
        let (video, driver) = VideoInput::new(false, true, VideoSize::new(16, 9));
        let mut watch = video.enabled_watch();
        watch.mark_unchanged();

        driver.set_enabled(true);
        assert!(!watch.has_changed().unwrap());

        driver.set_enabled(false);
        assert!(watch.has_changed().unwrap());
        assert!(!video.is_enabled());
    }
}
