//! Shared value types
//!
//! Event name and payload bounds, emission options, listener priorities and
//! emitter statistics.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Types usable as event names.
///
/// Implemented for every type with the required bounds: `String`,
/// `&'static str`, or an application enum of event kinds.
pub trait EventName: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

impl<K> EventName for K where K: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

/// Types usable as event payloads. Each listener receives its own clone.
pub trait Payload: Clone + Send + Sync + 'static {}

impl<T> Payload for T where T: Clone + Send + Sync + 'static {}

/// Listener priority. Higher values start earlier; there is no fixed range.
pub type Priority = i64;

/// Priority used when none is given.
pub const DEFAULT_PRIORITY: Priority = 0;

/// How an emission runs its listeners.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmitStrategy {
    /// Start every listener without waiting, then wait for all of them
    #[default]
    Parallel,
    /// Start each listener only after the previous one has completed
    Sequential,
}

impl EmitStrategy {
    /// Get the strategy name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmitStrategy::Parallel => "parallel",
            EmitStrategy::Sequential => "sequential",
        }
    }
}

impl std::fmt::Display for EmitStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for a single emission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitOptions {
    /// Execution strategy (default: parallel)
    pub strategy: EmitStrategy,
}

impl EmitOptions {
    /// Options for a parallel emission.
    pub fn parallel() -> Self {
        Self {
            strategy: EmitStrategy::Parallel,
        }
    }

    /// Options for a sequential emission.
    pub fn sequential() -> Self {
        Self {
            strategy: EmitStrategy::Sequential,
        }
    }
}

impl From<EmitStrategy> for EmitOptions {
    fn from(strategy: EmitStrategy) -> Self {
        Self { strategy }
    }
}

/// Emitter statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitterStats {
    /// Emissions that found at least one listener
    pub events_emitted: u64,
    /// Listener invocations started
    pub listeners_invoked: u64,
    /// Listener invocations that failed or panicked
    pub listener_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_strategy_is_parallel() {
        assert_eq!(EmitOptions::default().strategy, EmitStrategy::Parallel);
        assert_eq!(EmitOptions::parallel(), EmitOptions::default());
        assert_eq!(EmitOptions::sequential().strategy, EmitStrategy::Sequential);
    }

    #[test]
    fn test_strategy_serde() {
        let json = serde_json::to_string(&EmitStrategy::Sequential).unwrap();
        assert_eq!(json, "\"sequential\"");

        let options: EmitOptions = serde_json::from_str(r#"{"strategy": "sequential"}"#).unwrap();
        assert_eq!(options, EmitOptions::sequential());

        let options: EmitOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, EmitOptions::parallel());
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(EmitStrategy::Parallel.to_string(), "parallel");
        assert_eq!(EmitOptions::from(EmitStrategy::Sequential).strategy.as_str(), "sequential");
    }
}
