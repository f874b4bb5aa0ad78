//! Stream layout error types.
//!
//! This layer has no recoverable faults of its own: inapplicable requests
//! (pinning an absent stream, fullscreening a removed one) are rejected by
//! value, never raised. The only errors surfaced to callers are losing the
//! actor (the owning scope tore it down) and invalid configuration.

use thiserror::Error;

/// Stream layout error type.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The aggregation actor is gone; the owning scope was torn down.
    #[error("layout actor unavailable: {0}")]
    ActorUnavailable(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held a value that does not parse.
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_formatting() {
        assert_eq!(
            format!("{}", LayoutError::ActorUnavailable("channel closed".to_string())),
            "layout actor unavailable: channel closed"
        );

        assert_eq!(
            format!(
                "{}",
                ConfigError::InvalidValue {
                    name: "STREAM_LAYOUT_DEBOUNCE_MS".to_string(),
                    value: "abc".to_string()
                }
            ),
            "invalid value for STREAM_LAYOUT_DEBOUNCE_MS: abc"
        );
    }

    #[test]
    fn test_config_error_conversion() {
        let err: LayoutError = ConfigError::InvalidValue {
            name: "X".to_string(),
            value: "y".to_string(),
        }
        .into();
        assert!(matches!(err, LayoutError::Config(_)));
    }
}
