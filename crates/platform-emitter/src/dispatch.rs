//! Dispatch of one emission
//!
//! Runs a snapshot of listeners under the chosen [`EmitStrategy`]. Every
//! failure (an `Err`, a panic while starting, or a panic while running) is
//! handed to the `report` callback and dispatch moves on to the next listener.
//! Nothing a listener does can fail the emission itself.

use crate::error::{ListenerError, ListenerResult};
use crate::listener::SharedListener;
use crate::types::EmitStrategy;
use futures::future::{self, BoxFuture, FutureExt};
use std::panic::{self, AssertUnwindSafe};

/// Start one listener and return its completion, with panics turned into
/// [`ListenerError::Panicked`].
pub(crate) fn invoke<'a, T>(listener: &'a SharedListener<T>, payload: T) -> BoxFuture<'a, ListenerResult>
where
    T: Send + 'a,
{
    match panic::catch_unwind(AssertUnwindSafe(|| listener.on_event(payload))) {
        Ok(fut) => AssertUnwindSafe(fut)
            .catch_unwind()
            .map(|outcome| outcome.unwrap_or_else(|p| Err(ListenerError::from_panic(p))))
            .boxed(),
        Err(p) => future::ready(Err(ListenerError::from_panic(p))).boxed(),
    }
}

/// Run every listener with a clone of `payload`.
///
/// Returns the number of failed listeners.
pub(crate) async fn dispatch<T, R>(
    listeners: &[SharedListener<T>],
    payload: T,
    strategy: EmitStrategy,
    mut report: R,
) -> usize
where
    T: Clone + Send + 'static,
    R: FnMut(ListenerError),
{
    let mut failures = 0;

    match strategy {
        EmitStrategy::Sequential => {
            for listener in listeners {
                if let Err(e) = invoke(listener, payload.clone()).await {
                    failures += 1;
                    report(e);
                }
            }
        }
        EmitStrategy::Parallel => {
            // join_all polls in order, so listeners start in priority order
            let pending: Vec<_> = listeners
                .iter()
                .map(|listener| invoke(listener, payload.clone()))
                .collect();

            for result in future::join_all(pending).await {
                if let Err(e) = result {
                    failures += 1;
                    report(e);
                }
            }
        }
    }

    failures
}
