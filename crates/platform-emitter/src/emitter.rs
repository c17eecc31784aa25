//! Emitter implementation
//!
//! [`Emitter`] owns a registry of event names to priority-ordered listener
//! sets and dispatches emissions to them. Registration, removal and queries
//! are synchronous and never suspend; emission suspends only while waiting
//! for listeners to complete.
//!
//! Each emission works on the listeners registered at the moment it starts.
//! A listener that adds or removes other listeners affects later emissions
//! only.

use crate::config::EmitterConfig;
use crate::diagnostics::{DiagnosticRecord, DiagnosticSink, Operation, TracingSink};
use crate::dispatch;
use crate::error::{EmitterError, EmitterResult, ListenerError, ListenerResult};
use crate::listener::{listener_fn, ListenerKey, SharedListener};
use crate::once::{OnceListener, Resolver};
use crate::registry::Registry;
use crate::subscription::Insertion;
use crate::types::{EmitOptions, EmitterStats, EventName, Payload, Priority, DEFAULT_PRIORITY};
use parking_lot::Mutex;
use std::borrow::Borrow;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::oneshot;
use uuid::Uuid;

/// State shared by an emitter, its clones, its unsubscribe handles and its
/// one-shot wrappers.
pub(crate) struct Shared<T, K> {
    id: Uuid,
    config: EmitterConfig,
    registry: Mutex<Registry<T, K>>,
    sink: Arc<dyn DiagnosticSink>,
    events_emitted: AtomicU64,
    listeners_invoked: AtomicU64,
    listener_failures: AtomicU64,
}

impl<T, K> Shared<T, K>
where
    T: Payload,
    K: EventName,
{
    /// Deliver an operational record when debug mode is on.
    fn trace(&self, operation: Operation, event: Option<&dyn Debug>, message: Option<String>) {
        if self.config.debug {
            self.deliver(operation, event, message);
        }
    }

    /// Deliver a record unconditionally.
    fn deliver(&self, operation: Operation, event: Option<&dyn Debug>, message: Option<String>) {
        let mut record = DiagnosticRecord::new(self.id, operation);
        record.event = event.map(|e| format!("{e:?}"));
        record.message = message;
        self.sink.record(&record);
    }

    /// Remove one listener, dropping the event if it was the last one.
    pub(crate) fn unsubscribe(&self, event: &K, key: ListenerKey) {
        self.trace(Operation::Unsubscribe, Some(event), None);
        self.registry.lock().remove(event, key);
    }

    pub(crate) fn trace_once_fired(&self, event: &K) {
        self.trace(Operation::UnsubscribeOnce, Some(event), None);
    }

    fn clear(&self) {
        let count = self.registry.lock().clear();
        self.trace(
            Operation::Clear,
            None,
            Some(format!("cleared {count} event types")),
        );
    }
}

/// Typed in-process event emitter.
///
/// `T` is the payload type and `K` the event name type. Listeners run in
/// priority order (highest first, ties in registration order). Listener
/// failures are reported to the diagnostic sink and never reach the caller
/// of [`emit`](Emitter::emit).
///
/// Cloning an `Emitter` yields another handle to the same registry.
/// Separately constructed emitters share nothing.
///
/// # Example
///
/// ```rust
/// use platform_emitter::{listener_fn, EmitOptions, Emitter};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let emitter: Emitter<String> = Emitter::new();
///
/// let audit = emitter.on_fn("user.created", |name: String| async move {
///     println!("audit: {name}");
///     Ok(())
/// });
/// emitter.on_with_priority(
///     "user.created",
///     listener_fn(|name: String| async move {
///         println!("validate first: {name}");
///         Ok(())
///     }),
///     10,
/// );
///
/// emitter
///     .emit_with("user.created", "alice".to_string(), EmitOptions::sequential())
///     .await;
///
/// audit.unsubscribe();
/// assert_eq!(emitter.listeners_count("user.created"), 1);
/// # }
/// ```
pub struct Emitter<T, K = String> {
    shared: Arc<Shared<T, K>>,
}

impl<T, K> Clone for Emitter<T, K> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, K> std::fmt::Debug for Emitter<T, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("id", &self.shared.id)
            .field("config", &self.shared.config)
            .finish()
    }
}

impl<T, K> Default for Emitter<T, K>
where
    T: Payload,
    K: EventName,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, K> Emitter<T, K>
where
    T: Payload,
    K: EventName,
{
    /// Create an emitter with default configuration and the tracing sink.
    pub fn new() -> Self {
        Self::with_config(EmitterConfig::default())
    }

    /// Create an emitter with custom configuration and the tracing sink.
    pub fn with_config(config: EmitterConfig) -> Self {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    /// Create an emitter reporting to a custom diagnostic sink.
    pub fn with_sink(config: EmitterConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        let max_listeners = config.max_listeners;
        Self {
            shared: Arc::new(Shared {
                id: Uuid::now_v7(),
                config,
                registry: Mutex::new(Registry::new(max_listeners)),
                sink,
                events_emitted: AtomicU64::new(0),
                listeners_invoked: AtomicU64::new(0),
                listener_failures: AtomicU64::new(0),
            }),
        }
    }

    /// Instance id attached to every diagnostic record.
    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    /// Listener count per event at which a warning is raised.
    pub fn max_listeners(&self) -> usize {
        self.shared.config.max_listeners
    }

    /// Check whether an event has listeners.
    pub fn has<Q>(&self, event: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shared.registry.lock().contains(event)
    }

    /// Number of listeners for an event (0 when absent).
    pub fn listeners_count<Q>(&self, event: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shared.registry.lock().count(event)
    }

    /// Events that currently have listeners, in first-registration order.
    pub fn event_names(&self) -> Vec<K> {
        self.shared.registry.lock().names()
    }

    /// Check whether no event has listeners.
    pub fn is_empty(&self) -> bool {
        self.shared.registry.lock().is_empty()
    }

    /// Get emitter statistics.
    pub fn stats(&self) -> EmitterStats {
        EmitterStats {
            events_emitted: self.shared.events_emitted.load(Ordering::Relaxed),
            listeners_invoked: self.shared.listeners_invoked.load(Ordering::Relaxed),
            listener_failures: self.shared.listener_failures.load(Ordering::Relaxed),
        }
    }

    /// Register a listener with the default priority.
    pub fn on(&self, event: impl Into<K>, listener: SharedListener<T>) -> Unsubscribe<T, K> {
        self.on_with_priority(event, listener, DEFAULT_PRIORITY)
    }

    /// Register a listener.
    ///
    /// Registering the same listener twice for one event keeps the existing
    /// entry (and its priority) and raises a duplicate warning. Reaching the
    /// max listeners threshold raises a warning but still registers.
    pub fn on_with_priority(
        &self,
        event: impl Into<K>,
        listener: SharedListener<T>,
        priority: Priority,
    ) -> Unsubscribe<T, K> {
        let event = event.into();
        let shared = &self.shared;

        let outcome = shared
            .registry
            .lock()
            .insert(event.clone(), listener.clone(), priority);

        match outcome {
            Insertion::Duplicate => shared.deliver(
                Operation::DuplicateListener,
                Some(&event),
                Some("listener already registered, keeping the existing one".to_string()),
            ),
            Insertion::Added {
                exceeded: Some(count),
            } => shared.deliver(
                Operation::MaxListenersExceeded,
                Some(&event),
                Some(format!(
                    "possible listener leak: {count} listeners already registered, limit is {}",
                    shared.config.max_listeners
                )),
            ),
            Insertion::Added { exceeded: None } => {}
        }

        shared.trace(
            Operation::Subscribe,
            Some(&event),
            Some(format!("priority {priority}")),
        );

        Unsubscribe {
            shared: Arc::downgrade(shared),
            event,
            listener,
        }
    }

    /// Register an async closure with the default priority.
    pub fn on_fn<F, Fut>(&self, event: impl Into<K>, f: F) -> Unsubscribe<T, K>
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ListenerResult> + Send + 'static,
    {
        self.on(event, listener_fn(f))
    }

    /// Register a one-shot listener with the default priority.
    pub fn once(&self, event: impl Into<K>, listener: SharedListener<T>) {
        self.once_with_priority(event, listener, DEFAULT_PRIORITY)
    }

    /// Register a one-shot listener.
    ///
    /// The listener runs at most once. Its wrapper occupies the priority slot
    /// and removes itself once the listener has completed, whether it
    /// succeeded or failed.
    pub fn once_with_priority(
        &self,
        event: impl Into<K>,
        listener: SharedListener<T>,
        priority: Priority,
    ) {
        let event = event.into();
        self.shared
            .trace(Operation::SubscribeOnce, Some(&event), None);

        let wrapper = OnceListener::new(listener, Arc::downgrade(&self.shared), event.clone());
        self.on_with_priority(event, Arc::new(wrapper), priority);
    }

    /// Register a one-shot async closure with the default priority.
    pub fn once_fn<F, Fut>(&self, event: impl Into<K>, f: F)
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ListenerResult> + Send + 'static,
    {
        self.once(event, listener_fn(f))
    }

    /// Remove listeners.
    ///
    /// - no event: remove everything (same as [`clear`](Emitter::clear))
    /// - event only: remove every listener of that event
    /// - event and listener: remove that listener from that event
    ///
    /// When the event has no listeners, this clears every event.
    pub fn off(&self, event: Option<&K>, listener: Option<&SharedListener<T>>) {
        match (event, listener) {
            (Some(event), Some(listener)) => self.off_listener(event, listener),
            (Some(event), None) => self.off_event(event),
            (None, _) => self.clear(),
        }
    }

    /// Remove every listener of an event.
    ///
    /// Clears every event when this one has no listeners.
    pub fn off_event<Q>(&self, event: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        let removed = self.shared.registry.lock().remove_event(event);

        match removed {
            Some(count) => self.shared.trace(
                Operation::UnsubscribeAll,
                Some(&event),
                Some(format!("removed {count} listeners")),
            ),
            None => self.shared.clear(),
        }
    }

    /// Remove one listener from an event.
    ///
    /// Clears every event when this one has no listeners. An unknown
    /// listener on a registered event is a no-op.
    pub fn off_listener<Q>(&self, event: &Q, listener: &SharedListener<T>)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        let registered = {
            let mut registry = self.shared.registry.lock();
            if registry.contains(event) {
                registry.remove(event, ListenerKey::of(listener));
                true
            } else {
                false
            }
        };

        if registered {
            self.shared
                .trace(Operation::Unsubscribe, Some(&event), None);
        } else {
            self.shared.clear();
        }
    }

    /// Remove every listener of every event.
    pub fn clear(&self) {
        self.shared.clear();
    }

    /// Emit an event with the parallel strategy.
    pub async fn emit<Q>(&self, event: &Q, payload: T)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + Sync + ?Sized,
    {
        self.emit_with(event, payload, EmitOptions::default()).await
    }

    /// Emit an event.
    ///
    /// Completes once every listener has been attempted. Emitting an event
    /// without listeners is a no-op.
    pub async fn emit_with<Q>(&self, event: &Q, payload: T, options: EmitOptions)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + Sync + ?Sized,
    {
        let shared = &self.shared;
        let snapshot = shared.registry.lock().snapshot(event);

        let Some(listeners) = snapshot else {
            shared.trace(
                Operation::Emit,
                Some(&event),
                Some("no listeners registered".to_string()),
            );
            return;
        };

        shared.trace(
            Operation::Emit,
            Some(&event),
            Some(format!("strategy {}", options.strategy)),
        );
        shared.events_emitted.fetch_add(1, Ordering::Relaxed);
        shared
            .listeners_invoked
            .fetch_add(listeners.len() as u64, Ordering::Relaxed);

        let failures = dispatch::dispatch(&listeners, payload, options.strategy, |error: ListenerError| {
            shared.deliver(
                Operation::ListenerFailed,
                Some(&event),
                Some(error.to_string()),
            );
        })
        .await;

        shared
            .listener_failures
            .fetch_add(failures as u64, Ordering::Relaxed);
    }

    /// Wait for the next emission of an event.
    ///
    /// The one-shot subscription is registered before this returns, so an
    /// emission that happens before the future is first polled still
    /// resolves it. Several pending futures for one event all resolve with
    /// the same payload. The future fails with
    /// [`EmitterError::SubscriptionDropped`] if the subscription is removed
    /// before the event fires.
    pub fn to_future(
        &self,
        event: impl Into<K>,
    ) -> impl Future<Output = EmitterResult<T>> + Send + 'static {
        let event = event.into();
        let label = format!("{event:?}");
        let (tx, rx) = oneshot::channel();

        self.once(event, Arc::new(Resolver::new(tx)));

        async move {
            rx.await
                .map_err(|_| EmitterError::SubscriptionDropped { event: label })
        }
    }
}

/// Handle removing one registration.
///
/// Dropping the handle keeps the listener registered. The handle does not
/// keep the emitter alive.
pub struct Unsubscribe<T, K> {
    shared: Weak<Shared<T, K>>,
    event: K,
    listener: SharedListener<T>,
}

impl<T, K> Unsubscribe<T, K>
where
    T: Payload,
    K: EventName,
{
    /// Event the listener is registered for.
    pub fn event(&self) -> &K {
        &self.event
    }

    /// The registered listener.
    pub fn listener(&self) -> &SharedListener<T> {
        &self.listener
    }

    /// Remove the listener, dropping the event if it was the last one.
    /// No-op if it was already removed or the emitter is gone.
    pub fn unsubscribe(self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.unsubscribe(&self.event, ListenerKey::of(&self.listener));
        }
    }
}

impl<T, K: Debug> std::fmt::Debug for Unsubscribe<T, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("event", &self.event)
            .finish()
    }
}
