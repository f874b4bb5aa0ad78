//! UI-ready snapshot types.
//!
//! Everything here is immutable data derived from the engine model: the
//! aggregation actor produces these, the layout policy and the presentation
//! layer consume them. A [`VideoUi`] keeps a handle to its source's live
//! size channel for the PiP sampler, but that channel's current value never
//! participates in equality, so stream lists only compare by meaningful UI
//! state.

use call_model::{AudioInput, ParticipantState, StreamId, UserId, VideoInput, VideoSize};
use tokio::sync::watch;

/// Audio state of a displayed stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioUi {
    pub is_enabled: bool,
    pub is_muted_for_you: bool,
}

impl From<AudioInput> for AudioUi {
    fn from(audio: AudioInput) -> Self {
        Self {
            is_enabled: audio.is_enabled,
            is_muted_for_you: audio.is_muted_for_you,
        }
    }
}

/// Video state of a displayed stream.
#[derive(Debug, Clone)]
pub struct VideoUi {
    pub is_enabled: bool,
    pub is_screen_share: bool,
    size: watch::Receiver<VideoSize>,
}

impl VideoUi {
    /// Current live dimensions of the source.
    #[must_use]
    pub fn size(&self) -> VideoSize {
        *self.size.borrow()
    }
}

impl From<&VideoInput> for VideoUi {
    fn from(video: &VideoInput) -> Self {
        Self {
            is_enabled: video.is_enabled(),
            is_screen_share: video.is_screen_share(),
            size: video.size_watch(),
        }
    }
}

impl PartialEq for VideoUi {
    fn eq(&self, other: &Self) -> bool {
        self.is_enabled == other.is_enabled
            && self.is_screen_share == other.is_screen_share
            && self.size.same_channel(&other.size)
    }
}

impl Eq for VideoUi {}

/// A single displayable stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamUi {
    pub id: StreamId,
    pub username: String,
    pub avatar: Option<String>,
    pub is_mine: bool,
    pub audio: Option<AudioUi>,
    pub video: Option<VideoUi>,
}

impl StreamUi {
    /// True for the local participant's screen-share stream, which renders
    /// as a "you are sharing" placeholder and is never selectable.
    #[must_use]
    pub fn is_local_screen_share(&self) -> bool {
        self.is_mine && self.video.as_ref().is_some_and(|v| v.is_screen_share)
    }
}

/// A participant in the in-call roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantUi {
    pub user_id: UserId,
    pub username: String,
    pub avatar: Option<String>,
    pub is_me: bool,
    pub state: ParticipantState,
}

/// Pre-call local preview, shown instead of the stream list while dialing
/// or ringing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamPreview {
    pub is_group_call: bool,
    pub video: Option<VideoUi>,
    pub username: String,
    pub avatar: Option<String>,
}

/// The aggregate layout state, owned by the aggregation actor.
///
/// Invariants maintained by the actor:
/// - `fullscreen_stream`, if present, is an element of `streams`
/// - `pinned_streams` is an ordered subset of `streams`, capped at the
///   configured maximum (local screen share first, then pin order)
/// - `preview` and `streams` are never rendered together; a non-`None`
///   preview suppresses the list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamUiState {
    pub streams: Vec<StreamUi>,
    pub pinned_streams: Vec<StreamUi>,
    pub fullscreen_stream: Option<StreamUi>,
    pub preview: Option<StreamPreview>,
}

impl StreamUiState {
    #[must_use]
    pub fn is_pinned(&self, id: &StreamId) -> bool {
        self.pinned_streams.iter().any(|s| &s.id == id)
    }

    #[must_use]
    pub fn find_stream(&self, id: &StreamId) -> Option<&StreamUi> {
        self.streams.iter().find(|s| &s.id == id)
    }

    /// True while the local participant is sharing their screen.
    #[must_use]
    pub fn is_screen_share_active(&self) -> bool {
        self.streams.iter().any(StreamUi::is_local_screen_share)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn stream(id: &str, is_mine: bool) -> StreamUi {
        StreamUi {
            id: StreamId::from(id),
            username: "user".to_string(),
            avatar: None,
            is_mine,
            audio: None,
            video: None,
        }
    }

    fn screen_share(id: &str, is_mine: bool) -> StreamUi {
        let (video, _driver) = VideoInput::new(true, true, VideoSize::new(1920, 1080));
        StreamUi {
            video: Some(VideoUi::from(&video)),
            ..stream(id, is_mine)
        }
    }

    #[test]
    fn test_local_screen_share_detection() {
        assert!(screen_share("ss", true).is_local_screen_share());
        assert!(!screen_share("ss", false).is_local_screen_share());
        assert!(!stream("s1", true).is_local_screen_share());
    }

    #[test]
    fn test_state_helpers() {
        let state = StreamUiState {
            streams: vec![stream("a", false), screen_share("ss", true)],
            pinned_streams: vec![stream("a", false)],
            fullscreen_stream: None,
            preview: None,
        };

        assert!(state.is_pinned(&StreamId::from("a")));
        assert!(!state.is_pinned(&StreamId::from("ss")));
        assert!(state.find_stream(&StreamId::from("ss")).is_some());
        assert!(state.find_stream(&StreamId::from("missing")).is_none());
        assert!(state.is_screen_share_active());
    }

    #[test]
    fn test_video_ui_equality_ignores_size_value() {
        let (video, driver) = VideoInput::new(false, true, VideoSize::new(1280, 720));
        let ui = VideoUi::from(&video);
        let before = ui.clone();
        driver.set_size(VideoSize::new(640, 360));
        assert_eq!(ui, before);
        assert_eq!(ui.size(), VideoSize::new(640, 360));
    }
}
