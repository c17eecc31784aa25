//! Diagnostic sink
//!
//! The emitter reports what it does through a pluggable [`DiagnosticSink`].
//! Operational records (subscribe, emit, clear, ...) are only produced when
//! the emitter runs with `debug` enabled. Duplicate-listener and
//! max-listeners warnings and listener failures are always produced.
//!
//! The default sink is [`TracingSink`], which forwards every record to
//! `tracing` with structured fields. [`MemorySink`] keeps records for later
//! inspection, and any `Fn(&DiagnosticRecord)` closure is a sink as well.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

/// Operation a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operation {
    /// Listener registered
    #[serde(rename = "subscribe")]
    Subscribe,
    /// One-shot listener registered
    #[serde(rename = "subscribe:once")]
    SubscribeOnce,
    /// Listener removed
    #[serde(rename = "unsubscribe")]
    Unsubscribe,
    /// One-shot listener fired and is about to remove itself
    #[serde(rename = "unsubscribe:once")]
    UnsubscribeOnce,
    /// Every listener of one event removed
    #[serde(rename = "unsubscribe_all")]
    UnsubscribeAll,
    /// Event emitted
    #[serde(rename = "emit")]
    Emit,
    /// Every event cleared
    #[serde(rename = "clear")]
    Clear,
    /// Listener already registered for the event
    #[serde(rename = "duplicate_listener")]
    DuplicateListener,
    /// Listener count reached the configured threshold
    #[serde(rename = "max_listeners_exceeded")]
    MaxListenersExceeded,
    /// Listener returned an error or panicked
    #[serde(rename = "listener_failed")]
    ListenerFailed,
}

impl Operation {
    /// Get the operation name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Subscribe => "subscribe",
            Operation::SubscribeOnce => "subscribe:once",
            Operation::Unsubscribe => "unsubscribe",
            Operation::UnsubscribeOnce => "unsubscribe:once",
            Operation::UnsubscribeAll => "unsubscribe_all",
            Operation::Emit => "emit",
            Operation::Clear => "clear",
            Operation::DuplicateListener => "duplicate_listener",
            Operation::MaxListenersExceeded => "max_listeners_exceeded",
            Operation::ListenerFailed => "listener_failed",
        }
    }

    /// Severity this operation is reported with.
    pub fn level(&self) -> DiagnosticLevel {
        match self {
            Operation::DuplicateListener | Operation::MaxListenersExceeded => {
                DiagnosticLevel::Warn
            }
            Operation::ListenerFailed => DiagnosticLevel::Error,
            _ => DiagnosticLevel::Debug,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticLevel {
    /// Operational trace, only produced in debug mode
    Debug,
    /// Soft warning, registration still succeeded
    Warn,
    /// Listener failure
    Error,
}

/// One diagnostic record.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticRecord {
    /// Emitter instance that produced the record
    pub emitter_id: Uuid,

    /// Operation
    pub operation: Operation,

    /// Severity
    pub level: DiagnosticLevel,

    /// Event label, when the operation concerns one event
    pub event: Option<String>,

    /// Free-form detail
    pub message: Option<String>,

    /// When the record was created
    pub timestamp: DateTime<Utc>,
}

impl DiagnosticRecord {
    /// Create a record for an operation.
    pub fn new(emitter_id: Uuid, operation: Operation) -> Self {
        Self {
            emitter_id,
            operation,
            level: operation.level(),
            event: None,
            message: None,
            timestamp: Utc::now(),
        }
    }

    /// Set the event label.
    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    /// Set the message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Receiver of diagnostic records.
///
/// Sinks are never invoked while the emitter's registry is locked, so a sink
/// may call back into the emitter.
pub trait DiagnosticSink: Send + Sync {
    /// Handle one record.
    fn record(&self, record: &DiagnosticRecord);
}

impl<F> DiagnosticSink for F
where
    F: Fn(&DiagnosticRecord) + Send + Sync,
{
    fn record(&self, record: &DiagnosticRecord) {
        self(record)
    }
}

/// Sink forwarding records to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, record: &DiagnosticRecord) {
        let event = record.event.as_deref().unwrap_or("");
        let message = record.message.as_deref().unwrap_or("");

        match record.level {
            DiagnosticLevel::Debug => tracing::debug!(
                emitter_id = %record.emitter_id,
                operation = %record.operation,
                event = event,
                "{}",
                message
            ),
            DiagnosticLevel::Warn => tracing::warn!(
                emitter_id = %record.emitter_id,
                operation = %record.operation,
                event = event,
                "{}",
                message
            ),
            DiagnosticLevel::Error => tracing::error!(
                emitter_id = %record.emitter_id,
                operation = %record.operation,
                event = event,
                "{}",
                message
            ),
        }
    }
}

/// Sink keeping every record in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<DiagnosticRecord>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records so far.
    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.records.lock().clone()
    }

    /// Number of records for an operation.
    pub fn count(&self, operation: Operation) -> usize {
        self.records
            .lock()
            .iter()
            .filter(|r| r.operation == operation)
            .count()
    }

    /// Operations in the order they were recorded.
    pub fn operations(&self) -> Vec<Operation> {
        self.records.lock().iter().map(|r| r.operation).collect()
    }

    /// Drop all records.
    pub fn reset(&self) {
        self.records.lock().clear();
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, record: &DiagnosticRecord) {
        self.records.lock().push(record.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_operation_levels() {
        assert_eq!(Operation::Subscribe.level(), DiagnosticLevel::Debug);
        assert_eq!(Operation::DuplicateListener.level(), DiagnosticLevel::Warn);
        assert_eq!(Operation::MaxListenersExceeded.level(), DiagnosticLevel::Warn);
        assert_eq!(Operation::ListenerFailed.level(), DiagnosticLevel::Error);
    }

    #[test]
    fn test_record_serialization() {
        let record = DiagnosticRecord::new(Uuid::now_v7(), Operation::SubscribeOnce)
            .with_event("test")
            .with_message("PRIORITY 2");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["operation"], "subscribe:once");
        assert_eq!(json["level"], "debug");
        assert_eq!(json["event"], "test");
        assert_eq!(json["message"], "PRIORITY 2");
    }

    #[test]
    fn test_memory_sink_counts() {
        let sink = MemorySink::new();
        let id = Uuid::now_v7();

        sink.record(&DiagnosticRecord::new(id, Operation::Subscribe));
        sink.record(&DiagnosticRecord::new(id, Operation::Emit));
        sink.record(&DiagnosticRecord::new(id, Operation::Subscribe));

        assert_eq!(sink.count(Operation::Subscribe), 2);
        assert_eq!(
            sink.operations(),
            vec![Operation::Subscribe, Operation::Emit, Operation::Subscribe]
        );

        sink.reset();
        assert!(sink.records().is_empty());
    }

    #[test]
    fn test_closure_sink() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let sink: Arc<dyn DiagnosticSink> = Arc::new(move |_: &DiagnosticRecord| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        sink.record(&DiagnosticRecord::new(Uuid::now_v7(), Operation::Clear));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_tracing_sink_accepts_every_level() {
        let id = Uuid::now_v7();
        TracingSink.record(&DiagnosticRecord::new(id, Operation::Emit).with_event("a"));
        TracingSink.record(&DiagnosticRecord::new(id, Operation::DuplicateListener));
        TracingSink.record(
            &DiagnosticRecord::new(id, Operation::ListenerFailed).with_message("boom"),
        );
    }
}
