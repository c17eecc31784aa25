//! Error types for the emitter
//!
//! Listener failures are absorbed at the dispatch boundary and only surface
//! through the diagnostic sink. The emitter itself fails in one place: a
//! future obtained from `to_future` whose subscription was removed before
//! the event fired.

use std::any::Any;
use thiserror::Error;

/// Failure raised by a listener.
///
/// Returned from [`Listener::on_event`](crate::Listener::on_event) or
/// produced by the dispatcher when a listener panics.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Listener reported a failure
    #[error("{0}")]
    Failed(String),

    /// Listener failed with an underlying error
    #[error("{0}")]
    Source(#[from] Box<dyn std::error::Error + Send + Sync>),

    /// Listener panicked while starting or while running
    #[error("listener panicked: {0}")]
    Panicked(String),
}

impl ListenerError {
    /// Create a failure from a message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Wrap any error type.
    pub fn from_error<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Source(Box::new(error))
    }

    /// Build a [`ListenerError::Panicked`] from a caught panic payload.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::Panicked(message)
    }
}

/// Result type returned by listeners.
pub type ListenerResult = Result<(), ListenerError>;

/// Emitter error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmitterError {
    /// The one-shot subscription behind a pending future was removed
    /// before a matching emission.
    #[error("Subscription for event {event} was dropped before it fired")]
    SubscriptionDropped {
        /// Event label
        event: String,
    },
}

/// Result type for emitter operations.
pub type EmitterResult<T> = Result<T, EmitterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_payload_messages() {
        let err = ListenerError::from_panic(Box::new("boom"));
        assert_eq!(err.to_string(), "listener panicked: boom");

        let err = ListenerError::from_panic(Box::new(String::from("owned boom")));
        assert_eq!(err.to_string(), "listener panicked: owned boom");

        let err = ListenerError::from_panic(Box::new(42_u32));
        assert_eq!(err.to_string(), "listener panicked: non-string panic payload");
    }

    #[test]
    fn test_source_displays_inner_error() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = ListenerError::from_error(io);
        assert_eq!(err.to_string(), "disk gone");
    }

    #[test]
    fn test_subscription_dropped_message() {
        let err = EmitterError::SubscriptionDropped {
            event: "\"ready\"".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Subscription for event \"ready\" was dropped before it fired"
        );
    }
}
