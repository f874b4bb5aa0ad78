//! A published stream as reported by the engine.

use crate::ids::StreamId;
use crate::input::{AudioInput, VideoInput};
use crate::state::StreamState;
use tokio::sync::watch;

/// Read handle to a published stream.
///
/// Audio and video are optional and can appear or disappear over the
/// stream's lifetime (an audio-only stream upgrading to video, a video
/// source being unpublished). Equality is id plus channel identity.
#[derive(Debug, Clone)]
pub struct Stream {
    id: StreamId,
    audio: watch::Receiver<Option<AudioInput>>,
    video: watch::Receiver<Option<VideoInput>>,
    state: watch::Receiver<StreamState>,
}

impl Stream {
    /// Create a stream handle and its driver. Starts with no audio, no
    /// video, in [`StreamState::Open`].
    #[must_use]
    pub fn new(id: StreamId) -> (Self, StreamDriver) {
        let (audio_tx, audio_rx) = watch::channel(None);
        let (video_tx, video_rx) = watch::channel(None);
        let (state_tx, state_rx) = watch::channel(StreamState::Open);
        (
            Self {
                id,
                audio: audio_rx,
                video: video_rx,
                state: state_rx,
            },
            StreamDriver {
                audio: audio_tx,
                video: video_tx,
                state: state_tx,
            },
        )
    }

    #[must_use]
    pub const fn id(&self) -> &StreamId {
        &self.id
    }

    #[must_use]
    pub fn audio(&self) -> Option<AudioInput> {
        *self.audio.borrow()
    }

    #[must_use]
    pub fn audio_watch(&self) -> watch::Receiver<Option<AudioInput>> {
        self.audio.clone()
    }

    #[must_use]
    pub fn video(&self) -> Option<VideoInput> {
        self.video.borrow().clone()
    }

    #[must_use]
    pub fn video_watch(&self) -> watch::Receiver<Option<VideoInput>> {
        self.video.clone()
    }

    #[must_use]
    pub fn state(&self) -> StreamState {
        *self.state.borrow()
    }

    #[must_use]
    pub fn state_watch(&self) -> watch::Receiver<StreamState> {
        self.state.clone()
    }
}

impl PartialEq for Stream {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.state.same_channel(&other.state)
    }
}

impl Eq for Stream {}

/// Write side of a [`Stream`], owned by the engine adapter.
#[derive(Debug)]
pub struct StreamDriver {
    audio: watch::Sender<Option<AudioInput>>,
    video: watch::Sender<Option<VideoInput>>,
    state: watch::Sender<StreamState>,
}

impl StreamDriver {
    pub fn set_audio(&self, audio: Option<AudioInput>) {
        self.audio.send_if_modified(|current| {
            let changed = *current != audio;
            *current = audio;
            changed
        });
    }

    pub fn set_video(&self, video: Option<VideoInput>) {
        self.video.send_if_modified(|current| {
            let changed = *current != video;
            *current = video;
            changed
        });
    }

    pub fn set_state(&self, state: StreamState) {
        self.state.send_if_modified(|current| {
            let changed = *current != state;
            *current = state;
            changed
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::input::VideoSize;

    #[test]
    fn test_stream_starts_empty_and_open() {
        let (stream, _driver) = Stream::new(StreamId::from("s1"));
        assert_eq!(stream.id().as_str(), "s1");
        assert_eq!(stream.audio(), None);
        assert!(stream.video().is_none());
        assert_eq!(stream.state(), StreamState::Open);
    }

    #[test]
    fn test_driver_updates_are_observable() {
        let (stream, driver) = Stream::new(StreamId::from("s1"));

        driver.set_audio(Some(AudioInput::enabled()));
        driver.set_state(StreamState::Live);
        let (video, _video_driver) = VideoInput::new(true, true, VideoSize::new(1920, 1080));
        driver.set_video(Some(video));

        assert_eq!(stream.audio(), Some(AudioInput::enabled()));
        assert_eq!(stream.state(), StreamState::Live);
        assert!(stream.video().is_some_and(|v| v.is_screen_share()));
    }

    #[test]
    fn test_equality_is_id_and_channel() {
        let (stream, _driver) = Stream::new(StreamId::from("s1"));
        assert_eq!(stream, stream.clone());

        let (same_id, _other_driver) = Stream::new(StreamId::from("s1"));
        assert_ne!(stream, same_id);
    }
}
