//! Listener abstraction
//!
//! A listener is any [`Listener`] implementation shared behind an [`Arc`].
//! The `Arc` allocation is the listener's identity: registering the same
//! `Arc` twice for one event is detected as a duplicate, and removal matches
//! on it.

use crate::error::ListenerResult;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

/// Event listener trait.
///
/// Returning `Err` or panicking both count as a failure. Failures are
/// reported to the diagnostic sink and never reach the emitting caller.
#[async_trait]
pub trait Listener<T>: Send + Sync {
    /// Handle one emission of the event.
    async fn on_event(&self, payload: T) -> ListenerResult;
}

/// Shared listener handle used for registration and removal.
pub type SharedListener<T> = Arc<dyn Listener<T>>;

/// Identity of a registered listener (address of its allocation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ListenerKey(usize);

impl ListenerKey {
    /// Key of a shared listener.
    pub(crate) fn of<T>(listener: &SharedListener<T>) -> Self {
        Self(Arc::as_ptr(listener).cast::<()>() as usize)
    }

    /// Key of a listener seen from inside its own `on_event`.
    pub(crate) fn of_ref<L>(listener: &L) -> Self {
        Self((listener as *const L).cast::<()>() as usize)
    }
}

/// Adapter turning an async closure into a [`Listener`].
pub struct FnListener<F> {
    f: F,
}

impl<F> FnListener<F> {
    /// Wrap a closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<T, F, Fut> Listener<T> for FnListener<F>
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync,
    Fut: Future<Output = ListenerResult> + Send,
{
    async fn on_event(&self, payload: T) -> ListenerResult {
        (self.f)(payload).await
    }
}

/// Create a shared listener from an async closure.
///
/// # Example
///
/// ```rust
/// use platform_emitter::{listener_fn, Emitter};
///
/// let emitter: Emitter<String> = Emitter::new();
/// let greet = listener_fn(|name: String| async move {
///     println!("hello {name}");
///     Ok(())
/// });
///
/// emitter.on("greet", greet.clone());
/// emitter.off_listener("greet", &greet);
/// assert!(emitter.is_empty());
/// ```
pub fn listener_fn<T, F, Fut>(f: F) -> SharedListener<T>
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ListenerResult> + Send + 'static,
{
    Arc::new(FnListener::new(f))
}
