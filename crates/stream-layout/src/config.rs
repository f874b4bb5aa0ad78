//! Stream layout configuration.
//!
//! Loaded from environment variables with sensible defaults; every knob can
//! also be set programmatically. `from_vars` takes a plain map so tests
//! never touch the process environment.

use crate::errors::ConfigError;
use crate::layout::CapacityConfig;
use std::collections::HashMap;
use std::env;
use std::time::Duration;

/// Default debounce applied before a single-stream list replaces the
/// current one while the call is connected with company (absorbs the
/// one-by-one stream churn of connection setup).
pub const DEFAULT_SINGLE_STREAM_DEBOUNCE_MS: u64 = 500;

/// Default sampling interval for the PiP aspect-ratio tracker.
pub const DEFAULT_PIP_SAMPLE_INTERVAL_MS: u64 = 250;

/// Stream layout configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutConfig {
    /// Debounce window for single-stream upstream updates.
    pub single_stream_debounce: Duration,
    /// Capacities the aggregation actor starts with (the owning screen
    /// usually overrides them per window size class).
    pub initial_capacities: CapacityConfig,
    /// PiP aspect-ratio sampling interval.
    pub pip_sample_interval: Duration,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            single_stream_debounce: Duration::from_millis(DEFAULT_SINGLE_STREAM_DEBOUNCE_MS),
            initial_capacities: CapacityConfig::default(),
            pip_sample_interval: Duration::from_millis(DEFAULT_PIP_SAMPLE_INTERVAL_MS),
        }
    }
}

impl LayoutConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = vars.get("STREAM_LAYOUT_DEBOUNCE_MS") {
            config.single_stream_debounce =
                Duration::from_millis(parse_var("STREAM_LAYOUT_DEBOUNCE_MS", value)?);
        }
        if let Some(value) = vars.get("STREAM_LAYOUT_PIP_SAMPLE_MS") {
            config.pip_sample_interval =
                Duration::from_millis(parse_var("STREAM_LAYOUT_PIP_SAMPLE_MS", value)?);
        }
        if let Some(value) = vars.get("STREAM_LAYOUT_MAX_FEATURED") {
            config.initial_capacities.max_featured_streams =
                parse_var("STREAM_LAYOUT_MAX_FEATURED", value)?;
        }
        if let Some(value) = vars.get("STREAM_LAYOUT_MAX_THUMBNAILS") {
            config.initial_capacities.max_thumbnail_streams =
                parse_var("STREAM_LAYOUT_MAX_THUMBNAILS", value)?;
        }
        if let Some(value) = vars.get("STREAM_LAYOUT_MAX_PINNED") {
            config.initial_capacities.max_pinned_streams =
                parse_var("STREAM_LAYOUT_MAX_PINNED", value)?;
        }

        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LayoutConfig::from_vars(&HashMap::new()).expect("defaults should load");
        assert_eq!(
            config.single_stream_debounce,
            Duration::from_millis(DEFAULT_SINGLE_STREAM_DEBOUNCE_MS)
        );
        assert_eq!(
            config.pip_sample_interval,
            Duration::from_millis(DEFAULT_PIP_SAMPLE_INTERVAL_MS)
        );
        assert_eq!(config.initial_capacities, CapacityConfig::default());
    }

    #[test]
    fn test_custom_values() {
        let vars = HashMap::from([
            ("STREAM_LAYOUT_DEBOUNCE_MS".to_string(), "250".to_string()),
            ("STREAM_LAYOUT_MAX_PINNED".to_string(), "6".to_string()),
            ("STREAM_LAYOUT_MAX_FEATURED".to_string(), "15".to_string()),
        ]);

        let config = LayoutConfig::from_vars(&vars).expect("config should load");
        assert_eq!(config.single_stream_debounce, Duration::from_millis(250));
        assert_eq!(config.initial_capacities.max_pinned_streams, 6);
        assert_eq!(config.initial_capacities.max_featured_streams, 15);
        // Untouched knobs keep defaults.
        assert_eq!(config.initial_capacities.max_thumbnail_streams, 3);
    }

    #[test]
    fn test_invalid_value_is_reported() {
        let vars = HashMap::from([(
            "STREAM_LAYOUT_DEBOUNCE_MS".to_string(),
            "not-a-number".to_string(),
        )]);

        let result = LayoutConfig::from_vars(&vars);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { name, .. }) if name == "STREAM_LAYOUT_DEBOUNCE_MS"
        ));
    }
}
