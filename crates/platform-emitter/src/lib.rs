//! # Platform Emitter
//!
//! This crate provides a typed, in-process event emitter for Relay platform
//! services, letting independent components of one process react to each
//! other's events without knowing about each other.
//!
//! ## Overview
//!
//! The platform-emitter crate handles:
//! - **Registry**: Event names mapped to their listeners, queried and cleared
//!   synchronously
//! - **Priorities**: Higher-priority listeners start first, ties keep their
//!   registration order
//! - **Strategies**: Parallel (default) or sequential execution per emission
//! - **Error Isolation**: A failing or panicking listener never stops its
//!   siblings and never reaches the emitting caller
//! - **One-shot Listeners**: `once` registrations and `to_future` waits
//! - **Diagnostics**: Pluggable sink for operational records and warnings
//!
//! There is no delivery across processes, no persistence, no replay and no
//! retry of failed listeners.
//!
//! ## Usage
//!
//! ### Registering and Emitting
//!
//! ```rust
//! use platform_emitter::{EmitOptions, Emitter};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let emitter: Emitter<String> = Emitter::new();
//!
//! let handle = emitter.on_fn("document.created", |title: String| async move {
//!     println!("indexing {title}");
//!     Ok(())
//! });
//! emitter.once_fn("document.created", |title: String| async move {
//!     println!("first document: {title}");
//!     Ok(())
//! });
//!
//! emitter.emit("document.created", "Q4 report".to_string()).await;
//! emitter
//!     .emit_with("document.created", "Roadmap".to_string(), EmitOptions::sequential())
//!     .await;
//!
//! handle.unsubscribe();
//! assert!(emitter.is_empty());
//! # }
//! ```
//!
//! ### Typed Event Schemas
//!
//! Pair an enum of event kinds with a payload enum to keep names and
//! payloads in one place:
//!
//! ```rust
//! use platform_emitter::Emitter;
//!
//! #[derive(Debug, Clone, PartialEq, Eq, Hash)]
//! enum Kind {
//!     MeetingStarted,
//!     MeetingEnded,
//! }
//!
//! #[derive(Debug, Clone)]
//! enum MeetingEvent {
//!     Started { meeting_id: u64 },
//!     Ended { meeting_id: u64, minutes: u32 },
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let emitter: Emitter<MeetingEvent, Kind> = Emitter::new();
//! let ended = emitter.to_future(Kind::MeetingEnded);
//!
//! emitter
//!     .emit(&Kind::MeetingEnded, MeetingEvent::Ended { meeting_id: 7, minutes: 30 })
//!     .await;
//!
//! assert!(matches!(ended.await, Ok(MeetingEvent::Ended { minutes: 30, .. })));
//! # }
//! ```
//!
//! ## Diagnostics
//!
//! Records go to a [`DiagnosticSink`]; the default [`TracingSink`] forwards
//! them to `tracing`. Operational records (`subscribe`, `subscribe:once`,
//! `unsubscribe`, `unsubscribe:once`, `unsubscribe_all`, `emit`, `clear`)
//! need `debug` enabled in [`EmitterConfig`]. Duplicate-listener and
//! max-listeners warnings and listener failures are always recorded.
//!
//! ## Removal Semantics
//!
//! [`Emitter::off`] with an event that has no listeners clears every event,
//! not just that one. [`Emitter::off_event`] and [`Emitter::off_listener`]
//! behave the same way.

pub mod config;
pub mod diagnostics;
mod dispatch;
pub mod emitter;
pub mod error;
pub mod listener;
mod once;
mod registry;
mod subscription;
pub mod types;

// Re-export main types
pub use config::{EmitterConfig, DEFAULT_MAX_LISTENERS};
pub use diagnostics::{
    DiagnosticLevel, DiagnosticRecord, DiagnosticSink, MemorySink, Operation, TracingSink,
};
pub use emitter::{Emitter, Unsubscribe};
pub use error::{EmitterError, EmitterResult, ListenerError, ListenerResult};
pub use listener::{listener_fn, FnListener, Listener, SharedListener};
pub use types::{
    EmitOptions, EmitStrategy, EmitterStats, EventName, Payload, Priority, DEFAULT_PRIORITY,
};
