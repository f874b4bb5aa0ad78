//! Simulated call fixtures.
//!
//! Builders follow the usual `with_*`/consuming pattern; mutators publish
//! the change to the underlying watch channels immediately.

use call_model::{
    AudioInput, Call, CallDriver, CallParticipants, CallState, Participant, ParticipantDriver,
    ParticipantState, Stream, StreamDriver, StreamId, StreamState, UserId, VideoInput,
    VideoInputDriver, VideoSize,
};
use uuid::Uuid;

/// A video input plus its driver.
#[derive(Debug)]
pub struct TestVideo {
    pub input: VideoInput,
    pub driver: VideoInputDriver,
}

impl TestVideo {
    #[must_use]
    pub fn new(is_screen_share: bool, size: VideoSize) -> Self {
        let (input, driver) = VideoInput::new(is_screen_share, true, size);
        Self { input, driver }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.driver.set_enabled(enabled);
    }

    pub fn set_size(&self, size: VideoSize) {
        self.driver.set_size(size);
    }
}

/// A published stream plus its driver.
#[derive(Debug)]
pub struct TestStream {
    pub stream: Stream,
    pub driver: StreamDriver,
    pub video: Option<TestVideo>,
}

impl TestStream {
    /// A live camera stream with enabled audio and 720p video.
    #[must_use]
    pub fn camera(id: impl Into<StreamId>) -> Self {
        Self::with_video(id, TestVideo::new(false, VideoSize::new(1280, 720)))
    }

    /// A live screen-share stream.
    #[must_use]
    pub fn screen_share(id: impl Into<StreamId>) -> Self {
        Self::with_video(id, TestVideo::new(true, VideoSize::new(1920, 1080)))
    }

    /// A live audio-only stream.
    #[must_use]
    pub fn audio_only(id: impl Into<StreamId>) -> Self {
        let (stream, driver) = Stream::new(id.into());
        driver.set_audio(Some(AudioInput::enabled()));
        driver.set_state(StreamState::Live);
        Self {
            stream,
            driver,
            video: None,
        }
    }

    fn with_video(id: impl Into<StreamId>, video: TestVideo) -> Self {
        let (stream, driver) = Stream::new(id.into());
        driver.set_audio(Some(AudioInput::enabled()));
        driver.set_video(Some(video.input.clone()));
        driver.set_state(StreamState::Live);
        Self {
            stream,
            driver,
            video: Some(video),
        }
    }

    #[must_use]
    pub fn id(&self) -> &StreamId {
        self.stream.id()
    }

    pub fn set_state(&self, state: StreamState) {
        self.driver.set_state(state);
    }

    pub fn set_video_size(&self, size: VideoSize) {
        if let Some(video) = &self.video {
            video.set_size(size);
        }
    }

    pub fn set_video_enabled(&self, enabled: bool) {
        if let Some(video) = &self.video {
            video.set_enabled(enabled);
        }
    }
}

/// A participant plus its driver and owned streams.
#[derive(Debug)]
pub struct TestParticipant {
    pub participant: Participant,
    pub driver: ParticipantDriver,
    streams: Vec<TestStream>,
}

impl TestParticipant {
    #[must_use]
    pub fn new(user_id: impl Into<UserId>, name: impl Into<String>) -> Self {
        let (participant, driver) = Participant::new(user_id.into(), name, None);
        Self {
            participant,
            driver,
            streams: Vec::new(),
        }
    }

    /// A participant with a random id and name.
    #[must_use]
    pub fn random() -> Self {
        let suffix = Uuid::new_v4().to_string();
        let short = suffix.get(..8).unwrap_or("00000000");
        Self::new(format!("user-{suffix}"), format!("Guest {short}"))
    }

    /// Rebuild the participant with an avatar (use before adding streams).
    #[must_use]
    pub fn with_avatar(self, avatar: impl Into<String>) -> Self {
        let user_id = self.participant.user_id().clone();
        let name = self.participant.display_name().to_string();
        let (participant, driver) = Participant::new(user_id, name, Some(avatar.into()));
        Self {
            participant,
            driver,
            streams: self.streams,
        }
    }

    /// Mark the participant as in call (builder form).
    #[must_use]
    pub fn in_call(self) -> Self {
        self.driver.set_state(ParticipantState::InCall);
        self
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        self.participant.user_id()
    }

    pub fn set_state(&self, state: ParticipantState) {
        self.driver.set_state(state);
    }

    pub fn add_stream(&mut self, stream: TestStream) {
        self.streams.push(stream);
        self.publish_streams();
    }

    pub fn remove_stream(&mut self, id: &StreamId) {
        self.streams.retain(|s| s.id() != id);
        self.publish_streams();
    }

    pub fn clear_streams(&mut self) {
        self.streams.clear();
        self.publish_streams();
    }

    #[must_use]
    pub fn stream(&self, id: &StreamId) -> Option<&TestStream> {
        self.streams.iter().find(|s| s.id() == id)
    }

    fn publish_streams(&self) {
        self.driver
            .set_streams(self.streams.iter().map(|s| s.stream.clone()).collect());
    }
}

/// A simulated call: the handle, the driver and the participant fixtures.
#[derive(Debug)]
pub struct TestCall {
    pub call: Call,
    pub driver: CallDriver,
    me: Option<TestParticipant>,
    others: Vec<TestParticipant>,
}

impl TestCall {
    /// A disconnected call with an empty roster.
    #[must_use]
    pub fn new() -> Self {
        let (call, driver) = Call::new();
        Self {
            call,
            driver,
            me: None,
            others: Vec::new(),
        }
    }

    /// A call already in the `Connected` state.
    #[must_use]
    pub fn connected() -> Self {
        let fixture = Self::new();
        fixture.set_state(CallState::Connected);
        fixture
    }

    pub fn set_state(&self, state: CallState) {
        self.driver.set_state(state);
    }

    pub fn set_me(&mut self, me: TestParticipant) {
        self.me = Some(me);
        self.publish_roster();
    }

    pub fn add_other(&mut self, other: TestParticipant) {
        self.others.push(other);
        self.publish_roster();
    }

    pub fn remove_other(&mut self, user_id: &UserId) {
        self.others.retain(|p| p.participant.user_id() != user_id);
        self.publish_roster();
    }

    #[must_use]
    pub fn me_mut(&mut self) -> Option<&mut TestParticipant> {
        self.me.as_mut()
    }

    /// Look an other participant up by the raw user id.
    #[must_use]
    pub fn other_mut(&mut self, user_id: &str) -> Option<&mut TestParticipant> {
        self.others
            .iter_mut()
            .find(|p| p.participant.user_id().as_str() == user_id)
    }

    fn publish_roster(&self) {
        self.driver.set_participants(CallParticipants {
            me: self.me.as_ref().map(|p| p.participant.clone()),
            others: self.others.iter().map(|p| p.participant.clone()).collect(),
        });
    }
}

impl Default for TestCall {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_stream_is_live_with_media() {
        let stream = TestStream::camera("cam");
        assert_eq!(stream.stream.state(), StreamState::Live);
        assert!(stream.stream.audio().is_some());
        assert!(stream.stream.video().is_some_and(|v| !v.is_screen_share()));
    }

    #[test]
    fn test_screen_share_flag() {
        let stream = TestStream::screen_share("share");
        assert!(stream.stream.video().is_some_and(|v| v.is_screen_share()));
    }

    #[test]
    fn test_roster_publication() {
        let mut call = TestCall::connected();
        call.set_me(TestParticipant::new("me", "Me").in_call());
        call.add_other(TestParticipant::new("alice", "Alice"));

        let roster = call.call.participants();
        assert_eq!(roster.count(), 2);
        assert!(roster.me.is_some());

        call.remove_other(&UserId::from("alice"));
        assert_eq!(call.call.participants().count(), 1);
    }

    #[test]
    fn test_stream_publication_follows_fixture() {
        let mut call = TestCall::connected();
        call.add_other(TestParticipant::new("alice", "Alice").in_call());

        let alice = call.other_mut("alice").unwrap();
        alice.add_stream(TestStream::camera("alice-cam"));
        assert_eq!(alice.participant.streams().len(), 1);

        alice.remove_stream(&StreamId::from("alice-cam"));
        assert!(alice.participant.streams().is_empty());
    }

    #[test]
    fn test_random_participants_are_unique() {
        let a = TestParticipant::random();
        let b = TestParticipant::random();
        assert_ne!(a.participant.user_id(), b.participant.user_id());
    }
}
