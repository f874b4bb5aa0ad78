//! Stream selection and sizing policy.
//!
//! Pure functions over [`StreamUiState`] snapshots: no I/O, no mutation.
//! Selection precedence is fullscreen > pinned > featured; anything not
//! selected is surfaced as "non-displayed" data for the "+N others" summary
//! tile.

use crate::model::{StreamUi, StreamUiState};
use call_model::StreamId;
use serde::{Deserialize, Serialize};

/// Most streams shown at once in a compact window.
pub const MAX_VISIBLE_STREAMS_COMPACT: usize = 8;

/// Most streams shown at once in an expanded window.
pub const MAX_VISIBLE_STREAMS_EXPANDED: usize = 15;

/// Most pinned streams in a compact window.
pub const MAX_PINNED_STREAMS_COMPACT: usize = 2;

/// Most pinned streams in an expanded window.
pub const MAX_PINNED_STREAMS_EXPANDED: usize = 6;

/// Most thumbnails shown alongside pinned streams.
pub const MAX_THUMBNAIL_STREAMS: usize = 3;

/// Largest thumbnail edge, in density-independent units.
pub const MAX_THUMBNAIL_EDGE: f32 = 180.0;

/// Size class of one window dimension (material breakpoints).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeClass {
    Compact,
    Medium,
    Expanded,
}

/// Window size class of the hosting surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSizeClass {
    pub width: SizeClass,
    pub height: SizeClass,
}

impl WindowSizeClass {
    /// Classify window dimensions given in density-independent units.
    #[must_use]
    pub fn from_dimensions(width: f32, height: f32) -> Self {
        let width_class = if width < 600.0 {
            SizeClass::Compact
        } else if width < 840.0 {
            SizeClass::Medium
        } else {
            SizeClass::Expanded
        };
        let height_class = if height < 480.0 {
            SizeClass::Compact
        } else if height < 900.0 {
            SizeClass::Medium
        } else {
            SizeClass::Expanded
        };
        Self {
            width: width_class,
            height: height_class,
        }
    }

    #[must_use]
    pub const fn is_compact_in_any_dimension(self) -> bool {
        matches!(self.width, SizeClass::Compact) || matches!(self.height, SizeClass::Compact)
    }

    #[must_use]
    pub const fn has_compact_height(self) -> bool {
        matches!(self.height, SizeClass::Compact)
    }

    #[must_use]
    pub const fn has_expanded_width(self) -> bool {
        matches!(self.width, SizeClass::Expanded)
    }
}

/// Capacity limits applied by the selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityConfig {
    /// Most streams in the featured grid (no pins, no fullscreen).
    pub max_featured_streams: usize,
    /// Most thumbnails alongside pinned streams.
    pub max_thumbnail_streams: usize,
    /// Most simultaneously pinned streams.
    pub max_pinned_streams: usize,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            max_featured_streams: MAX_VISIBLE_STREAMS_COMPACT,
            max_thumbnail_streams: MAX_THUMBNAIL_STREAMS,
            max_pinned_streams: MAX_PINNED_STREAMS_COMPACT,
        }
    }
}

impl CapacityConfig {
    /// Capacity presets for a window size class.
    #[must_use]
    pub fn for_window(window: WindowSizeClass) -> Self {
        if window.is_compact_in_any_dimension() {
            Self {
                max_featured_streams: MAX_VISIBLE_STREAMS_COMPACT,
                max_thumbnail_streams: MAX_THUMBNAIL_STREAMS,
                max_pinned_streams: MAX_PINNED_STREAMS_COMPACT,
            }
        } else {
            Self {
                max_featured_streams: MAX_VISIBLE_STREAMS_EXPANDED,
                max_thumbnail_streams: MAX_THUMBNAIL_STREAMS,
                max_pinned_streams: MAX_PINNED_STREAMS_EXPANDED,
            }
        }
    }
}

/// Where thumbnails are laid out relative to pinned streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailsArrangement {
    Start,
    End,
    Bottom,
}

/// Thumbnail placement for a window size class.
#[must_use]
pub fn thumbnails_arrangement(window: WindowSizeClass) -> ThumbnailsArrangement {
    if window.has_compact_height() {
        ThumbnailsArrangement::End
    } else if window.has_expanded_width() {
        ThumbnailsArrangement::Start
    } else {
        ThumbnailsArrangement::Bottom
    }
}

/// A participant whose stream did not get a display slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonDisplayedParticipant {
    pub id: StreamId,
    pub username: String,
    pub avatar: Option<String>,
}

impl From<&StreamUi> for NonDisplayedParticipant {
    fn from(stream: &StreamUi) -> Self {
        Self {
            id: stream.id.clone(),
            username: stream.username.clone(),
            avatar: stream.avatar.clone(),
        }
    }
}

/// Role a selected stream occupies in the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotRole {
    Fullscreen,
    Pinned,
    Featured,
    Thumbnail,
}

/// One rendered slot of the call grid.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutSlot {
    /// A stream surface.
    Stream {
        stream: StreamUi,
        role: SlotRole,
        /// Local screen share renders a "you are sharing" placeholder.
        is_local_screen_share: bool,
        /// Whether tapping the slot opens stream actions.
        selectable: bool,
    },
    /// Summary tile standing in for the streams that did not fit.
    MoreParticipants {
        participants: Vec<NonDisplayedParticipant>,
    },
}

/// Select which streams get a display slot.
///
/// Precedence: a fullscreen stream excludes everything else; otherwise
/// pinned streams come first with up to `max_thumbnails` of the rest as
/// thumbnails; otherwise the first `max_featured` streams.
#[must_use]
pub fn streams_to_display(
    state: &StreamUiState,
    max_featured: usize,
    max_thumbnails: usize,
) -> Vec<StreamUi> {
    if let Some(fullscreen) = &state.fullscreen_stream {
        return vec![fullscreen.clone()];
    }
    if !state.pinned_streams.is_empty() {
        let thumbnails = state
            .streams
            .iter()
            .filter(|s| !state.is_pinned(&s.id))
            .take(max_thumbnails)
            .cloned();
        return state
            .pinned_streams
            .iter()
            .cloned()
            .chain(thumbnails)
            .collect();
    }
    state.streams.iter().take(max_featured).cloned().collect()
}

/// Streams present in the state but left without a slot.
#[must_use]
pub fn non_displayed_participants(
    state: &StreamUiState,
    displayed: &[StreamUi],
) -> Vec<NonDisplayedParticipant> {
    state
        .streams
        .iter()
        .filter(|s| !displayed.iter().any(|d| d.id == s.id))
        .map(NonDisplayedParticipant::from)
        .collect()
}

/// Build the full slot list for the call grid.
///
/// The last slot becomes a [`LayoutSlot::MoreParticipants`] summary
/// (carrying the replaced stream's participant plus everyone non-displayed)
/// when some streams did not fit, more than one slot is shown, and nothing
/// is pinned. A non-`None` preview suppresses the list entirely.
#[must_use]
pub fn build_layout(state: &StreamUiState, caps: CapacityConfig) -> Vec<LayoutSlot> {
    if state.preview.is_some() {
        return Vec::new();
    }

    let displayed =
        streams_to_display(state, caps.max_featured_streams, caps.max_thumbnail_streams);
    let non_displayed = non_displayed_participants(state, &displayed);
    let use_more_tile = !non_displayed.is_empty()
        && displayed.len() > 1
        && state.pinned_streams.is_empty();

    let last_index = displayed.len().saturating_sub(1);
    displayed
        .iter()
        .enumerate()
        .map(|(index, stream)| {
            if use_more_tile && index == last_index {
                let mut participants = vec![NonDisplayedParticipant::from(stream)];
                participants.extend(non_displayed.iter().cloned());
                return LayoutSlot::MoreParticipants { participants };
            }

            let role = if state.fullscreen_stream.as_ref().is_some_and(|f| f.id == stream.id) {
                SlotRole::Fullscreen
            } else if state.is_pinned(&stream.id) {
                SlotRole::Pinned
            } else if state.pinned_streams.is_empty() {
                SlotRole::Featured
            } else {
                SlotRole::Thumbnail
            };
            let is_local_screen_share = stream.is_local_screen_share();
            LayoutSlot::Stream {
                stream: stream.clone(),
                role,
                is_local_screen_share,
                selectable: !is_local_screen_share,
            }
        })
        .collect()
}

/// Thumbnail edge length for the available viewport.
///
/// 90% of the smaller viewport dimension, clamped so thumbnails never
/// exceed [`MAX_THUMBNAIL_EDGE`] and shrink as the row fills up.
#[must_use]
pub fn thumbnail_size(max_width: f32, max_height: f32) -> f32 {
    let max_available = max_width.min(max_height) * 0.9;
    if max_available < MAX_THUMBNAIL_EDGE {
        max_available
    } else {
        (max_available / MAX_THUMBNAIL_STREAMS as f32).min(MAX_THUMBNAIL_EDGE)
    }
}

/// Identities of the streams a layout displays (summary tiles excluded).
#[must_use]
pub fn displayed_stream_ids(slots: &[LayoutSlot]) -> Vec<StreamId> {
    slots
        .iter()
        .filter_map(|slot| match slot {
            LayoutSlot::Stream { stream, .. } => Some(stream.id.clone()),
            LayoutSlot::MoreParticipants { .. } => None,
        })
        .collect()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use call_model::{VideoInput, VideoSize};

    fn stream(id: &str) -> StreamUi {
        StreamUi {
            id: StreamId::from(id),
            username: id.to_string(),
            avatar: None,
            is_mine: false,
            audio: None,
            video: None,
        }
    }

    fn local_screen_share(id: &str) -> StreamUi {
        let (video, _driver) = VideoInput::new(true, true, VideoSize::new(1920, 1080));
        StreamUi {
            is_mine: true,
            video: Some(crate::model::VideoUi::from(&video)),
            ..stream(id)
        }
    }

    fn state_of(streams: Vec<StreamUi>) -> StreamUiState {
        StreamUiState {
            streams,
            ..StreamUiState::default()
        }
    }

    #[test]
    fn test_fullscreen_excludes_everything_else() {
        let mut state = state_of(vec![stream("a"), stream("b"), stream("c")]);
        state.pinned_streams = vec![stream("b")];
        state.fullscreen_stream = Some(stream("c"));

        let displayed = streams_to_display(&state, 8, 3);
        assert_eq!(displayed.len(), 1);
        assert_eq!(displayed[0].id, StreamId::from("c"));
    }

    #[test]
    fn test_pinned_streams_come_first_with_thumbnails() {
        let mut state = state_of(vec![stream("a"), stream("b"), stream("c"), stream("d")]);
        state.pinned_streams = vec![stream("c")];

        let displayed = streams_to_display(&state, 8, 2);
        let ids: Vec<_> = displayed.iter().map(|s| s.id.as_str().to_string()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_featured_capacity_limit() {
        let state = state_of(vec![stream("a"), stream("b"), stream("c")]);
        let displayed = streams_to_display(&state, 2, 3);
        let ids: Vec<_> = displayed.iter().map(|s| s.id.as_str().to_string()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_more_tile_replaces_last_slot() {
        // Streams [a, b, c] with a featured capacity of two: c is
        // non-displayed, so b's slot becomes the summary tile carrying both.
        let state = state_of(vec![stream("a"), stream("b"), stream("c")]);
        let slots = build_layout(
            &state,
            CapacityConfig {
                max_featured_streams: 2,
                max_thumbnail_streams: 3,
                max_pinned_streams: 2,
            },
        );

        assert_eq!(slots.len(), 2);
        assert!(matches!(&slots[0], LayoutSlot::Stream { stream, .. } if stream.id.as_str() == "a"));
        match &slots[1] {
            LayoutSlot::MoreParticipants { participants } => {
                let names: Vec<_> = participants.iter().map(|p| p.username.clone()).collect();
                assert_eq!(names, vec!["b", "c"]);
            }
            LayoutSlot::Stream { .. } => panic!("expected summary tile"),
        }
    }

    #[test]
    fn test_no_more_tile_for_single_slot() {
        let state = state_of(vec![stream("a"), stream("b")]);
        let slots = build_layout(
            &state,
            CapacityConfig {
                max_featured_streams: 1,
                max_thumbnail_streams: 3,
                max_pinned_streams: 2,
            },
        );

        assert_eq!(slots.len(), 1);
        assert!(matches!(&slots[0], LayoutSlot::Stream { .. }));
    }

    #[test]
    fn test_no_more_tile_while_pinned() {
        let mut state = state_of(vec![stream("a"), stream("b"), stream("c"), stream("d")]);
        state.pinned_streams = vec![stream("a")];

        let slots = build_layout(
            &state,
            CapacityConfig {
                max_featured_streams: 8,
                max_thumbnail_streams: 2,
                max_pinned_streams: 2,
            },
        );

        // a pinned + b, c thumbnails; d stays non-displayed without a tile.
        assert_eq!(slots.len(), 3);
        assert!(slots.iter().all(|s| matches!(s, LayoutSlot::Stream { .. })));
    }

    #[test]
    fn test_slot_roles() {
        let mut state = state_of(vec![stream("a"), stream("b"), stream("c")]);
        state.pinned_streams = vec![stream("a")];

        let slots = build_layout(&state, CapacityConfig::default());
        match &slots[0] {
            LayoutSlot::Stream { role, .. } => assert_eq!(*role, SlotRole::Pinned),
            LayoutSlot::MoreParticipants { .. } => panic!("expected stream slot"),
        }
        match &slots[1] {
            LayoutSlot::Stream { role, .. } => assert_eq!(*role, SlotRole::Thumbnail),
            LayoutSlot::MoreParticipants { .. } => panic!("expected stream slot"),
        }
    }

    #[test]
    fn test_local_screen_share_not_selectable() {
        let state = state_of(vec![local_screen_share("ss"), stream("a")]);
        let slots = build_layout(&state, CapacityConfig::default());

        match &slots[0] {
            LayoutSlot::Stream {
                is_local_screen_share,
                selectable,
                ..
            } => {
                assert!(is_local_screen_share);
                assert!(!selectable);
            }
            LayoutSlot::MoreParticipants { .. } => panic!("expected stream slot"),
        }
    }

    #[test]
    fn test_preview_suppresses_layout() {
        let mut state = state_of(vec![stream("a")]);
        state.preview = Some(crate::model::StreamPreview {
            is_group_call: false,
            video: None,
            username: "bob".to_string(),
            avatar: None,
        });

        assert!(build_layout(&state, CapacityConfig::default()).is_empty());
    }

    #[test]
    fn test_thumbnail_size_small_viewport() {
        // Below the max edge the thumbnail takes 90% of the smaller side.
        let size = thumbnail_size(400.0, 150.0);
        assert!((size - 135.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_thumbnail_size_large_viewport() {
        // 90% of 900 = 810, divided by the thumbnail count then clamped.
        let size = thumbnail_size(1200.0, 900.0);
        assert!((size - 180.0).abs() < f32::EPSILON);

        let size = thumbnail_size(500.0, 900.0);
        assert!((size - 150.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_window_size_class() {
        let phone = WindowSizeClass::from_dimensions(360.0, 800.0);
        assert!(phone.is_compact_in_any_dimension());
        assert_eq!(
            CapacityConfig::for_window(phone).max_pinned_streams,
            MAX_PINNED_STREAMS_COMPACT
        );

        let tablet = WindowSizeClass::from_dimensions(1024.0, 900.0);
        assert!(!tablet.is_compact_in_any_dimension());
        let caps = CapacityConfig::for_window(tablet);
        assert_eq!(caps.max_featured_streams, MAX_VISIBLE_STREAMS_EXPANDED);
        assert_eq!(caps.max_pinned_streams, MAX_PINNED_STREAMS_EXPANDED);
    }

    #[test]
    fn test_capacity_config_serde_roundtrip() {
        let caps = CapacityConfig {
            max_featured_streams: 15,
            max_thumbnail_streams: 3,
            max_pinned_streams: 6,
        };
        let json = serde_json::to_string(&caps).unwrap();
        assert_eq!(serde_json::from_str::<CapacityConfig>(&json).unwrap(), caps);

        let window = WindowSizeClass::from_dimensions(1024.0, 900.0);
        let json = serde_json::to_string(&window).unwrap();
        assert_eq!(
            serde_json::from_str::<WindowSizeClass>(&json).unwrap(),
            window
        );
    }

    #[test]
    fn test_thumbnails_arrangement() {
        let landscape_phone = WindowSizeClass::from_dimensions(800.0, 360.0);
        assert_eq!(
            thumbnails_arrangement(landscape_phone),
            ThumbnailsArrangement::End
        );

        let desktop = WindowSizeClass::from_dimensions(1400.0, 800.0);
        assert_eq!(
            thumbnails_arrangement(desktop),
            ThumbnailsArrangement::Start
        );

        let portrait = WindowSizeClass::from_dimensions(700.0, 800.0);
        assert_eq!(
            thumbnails_arrangement(portrait),
            ThumbnailsArrangement::Bottom
        );
    }
}
