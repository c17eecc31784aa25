//! One-shot listener wrappers
//!
//! [`OnceListener`] runs the wrapped listener at most once and then removes
//! its own registry entry. [`Resolver`] hands the first payload it receives
//! to a oneshot channel and backs `Emitter::to_future`.

use crate::dispatch;
use crate::emitter::Shared;
use crate::error::ListenerResult;
use crate::listener::{Listener, ListenerKey, SharedListener};
use crate::types::{EventName, Payload};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Weak;
use tokio::sync::oneshot;

/// Wrapper registered by `once`.
pub(crate) struct OnceListener<T, K> {
    listener: SharedListener<T>,
    fired: AtomicBool,
    shared: Weak<Shared<T, K>>,
    event: K,
}

impl<T, K> OnceListener<T, K> {
    pub(crate) fn new(listener: SharedListener<T>, shared: Weak<Shared<T, K>>, event: K) -> Self {
        Self {
            listener,
            fired: AtomicBool::new(false),
            shared,
            event,
        }
    }
}

#[async_trait]
impl<T, K> Listener<T> for OnceListener<T, K>
where
    T: Payload,
    K: EventName,
{
    async fn on_event(&self, payload: T) -> ListenerResult {
        // Two overlapping emissions may both have captured this wrapper
        if self.fired.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        if let Some(shared) = self.shared.upgrade() {
            shared.trace_once_fired(&self.event);
        }

        let result = dispatch::invoke(&self.listener, payload).await;

        if let Some(shared) = self.shared.upgrade() {
            shared.unsubscribe(&self.event, ListenerKey::of_ref(self));
        }

        result
    }
}

/// Listener resolving a pending `to_future` call.
pub(crate) struct Resolver<T> {
    tx: Mutex<Option<oneshot::Sender<T>>>,
}

impl<T> Resolver<T> {
    pub(crate) fn new(tx: oneshot::Sender<T>) -> Self {
        Self {
            tx: Mutex::new(Some(tx)),
        }
    }
}

#[async_trait]
impl<T> Listener<T> for Resolver<T>
where
    T: Payload,
{
    async fn on_event(&self, payload: T) -> ListenerResult {
        let tx = self.tx.lock().take();
        if let Some(tx) = tx {
            // The receiving future may have been dropped; nothing to do then
            let _ = tx.send(payload);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmitterConfig;
    use crate::diagnostics::{MemorySink, Operation};
    use crate::emitter::Emitter;
    use crate::error::ListenerError;
    use crate::listener::listener_fn;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_overlapping_emissions_fire_once() {
        let emitter: Emitter<u32> = Emitter::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = hits.clone();

        emitter.once_fn("tick", move |_: u32| {
            let hits = hits_clone.clone();
            async move {
                tokio::task::yield_now().await;
                hits.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        // Both emissions capture the wrapper before either completes
        tokio::join!(emitter.emit("tick", 1), emitter.emit("tick", 2));

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!emitter.has("tick"));
    }

    #[tokio::test]
    async fn test_failing_once_listener_is_removed_and_reported() {
        let sink = Arc::new(MemorySink::new());
        let emitter: Emitter<u32> = Emitter::with_sink(EmitterConfig::default(), sink.clone());

        emitter.once(
            "tick",
            listener_fn(|n: u32| async move { Err(ListenerError::failed(format!("tick {n}"))) }),
        );
        emitter.emit("tick", 1).await;

        assert!(!emitter.has("tick"));
        assert_eq!(sink.count(Operation::ListenerFailed), 1);
    }

    #[tokio::test]
    async fn test_once_records_in_debug_mode() {
        let sink = Arc::new(MemorySink::new());
        let config = EmitterConfig::default().with_debug(true);
        let emitter: Emitter<u32> = Emitter::with_sink(config, sink.clone());

        emitter.once_fn("tick", |_: u32| async { Ok(()) });
        emitter.emit("tick", 1).await;

        assert_eq!(
            sink.operations(),
            vec![
                Operation::SubscribeOnce,
                Operation::Subscribe,
                Operation::Emit,
                Operation::UnsubscribeOnce,
                Operation::Unsubscribe,
            ]
        );
    }

    #[tokio::test]
    async fn test_resolver_sends_first_payload_only() {
        let (tx, rx) = oneshot::channel::<u32>();
        let resolver = Resolver::new(tx);

        resolver.on_event(5_u32).await.unwrap();
        resolver.on_event(6_u32).await.unwrap();

        assert_eq!(rx.await.unwrap(), 5);
    }
}
