//! Emitter configuration.
//!
//! Configuration can be built in code, deserialized, or loaded from
//! environment variables with defaults for anything unset.

use serde::{Deserialize, Serialize};

/// Default soft limit on listeners per event.
pub const DEFAULT_MAX_LISTENERS: usize = 10;

/// Emitter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Listener count per event at which a max-listeners warning is raised.
    /// Registration is never refused.
    pub max_listeners: usize,

    /// Deliver operational records (subscribe, emit, clear, ...) to the
    /// diagnostic sink. Warnings and listener failures are always delivered.
    pub debug: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            max_listeners: DEFAULT_MAX_LISTENERS,
            debug: false,
        }
    }
}

impl EmitterConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `EMITTER_MAX_LISTENERS`: soft listener limit per event (default: 10)
    /// - `EMITTER_DEBUG`: enable operational records (default: false)
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            max_listeners: std::env::var("EMITTER_MAX_LISTENERS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.max_listeners),
            debug: std::env::var("EMITTER_DEBUG")
                .map(|s| s == "true" || s == "1")
                .unwrap_or(default.debug),
        }
    }

    /// Set the max listeners threshold.
    pub fn with_max_listeners(mut self, max_listeners: usize) -> Self {
        self.max_listeners = max_listeners;
        self
    }

    /// Enable or disable operational records.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EmitterConfig::default();
        assert_eq!(config.max_listeners, 10);
        assert!(!config.debug);
    }

    #[test]
    fn test_builder_methods() {
        let config = EmitterConfig::default()
            .with_max_listeners(2)
            .with_debug(true);
        assert_eq!(config.max_listeners, 2);
        assert!(config.debug);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: EmitterConfig = serde_json::from_str(r#"{"debug": true}"#).unwrap();
        assert_eq!(config.max_listeners, DEFAULT_MAX_LISTENERS);
        assert!(config.debug);

        let config: EmitterConfig = serde_json::from_str(r#"{"max_listeners": 3}"#).unwrap();
        assert_eq!(config.max_listeners, 3);
        assert!(!config.debug);
    }

    #[test]
    fn test_from_env() {
        std::env::set_var("EMITTER_MAX_LISTENERS", "25");
        std::env::set_var("EMITTER_DEBUG", "1");
        let config = EmitterConfig::from_env();
        assert_eq!(config.max_listeners, 25);
        assert!(config.debug);

        std::env::set_var("EMITTER_MAX_LISTENERS", "not-a-number");
        std::env::set_var("EMITTER_DEBUG", "false");
        let config = EmitterConfig::from_env();
        assert_eq!(config.max_listeners, DEFAULT_MAX_LISTENERS);
        assert!(!config.debug);

        std::env::remove_var("EMITTER_MAX_LISTENERS");
        std::env::remove_var("EMITTER_DEBUG");
    }
}
