//! Opaque identifier newtypes.
//!
//! Both ids are engine-assigned strings; this crate never interprets them
//! beyond equality and hashing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a call participant (the engine's user id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Wrap an engine-assigned user id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Unique identifier for a published stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StreamId(String);

impl StreamId {
    /// Wrap an engine-assigned stream id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StreamId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for StreamId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_compare_by_value() {
        assert_eq!(StreamId::from("s1"), StreamId::new("s1"));
        assert_ne!(StreamId::from("s1"), StreamId::from("s2"));
        assert_eq!(UserId::from("alice"), UserId::new(String::from("alice")));
    }

    #[test]
    fn test_display_is_raw_id() {
        assert_eq!(StreamId::from("screen-1").to_string(), "screen-1");
        assert_eq!(UserId::from("bob").as_str(), "bob");
    }

    #[test]
    fn test_serde_roundtrip() {
        let id = StreamId::from("s1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"s1\"");
        assert_eq!(serde_json::from_str::<StreamId>(&json).unwrap(), id);
    }
}
