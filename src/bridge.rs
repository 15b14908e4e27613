//! Suspending a task until a promise settles.

use thiserror::Error as ThisError;

use crate::{slot, Error, Promise, Settlement};

/// Why [`await_promise`] did not produce a value.
///
/// The rejection payload is any `E`, so the message leaves it out; take it
/// with [`AwaitError::rejection`].
#[derive(Debug, ThisError)]
pub enum AwaitError<E> {
    /// The awaited promise was rejected with this payload.
    #[error("awaited promise was rejected")]
    Rejected(E),
    #[error("{0}")]
    Runtime(#[from] Error),
}

impl<E> AwaitError<E> {
    pub fn rejection(self) -> Option<E> {
        match self {
            AwaitError::Rejected(reason) => Some(reason),
            AwaitError::Runtime(_) => None,
        }
    }
}

/// Builds a promise with `supplier` and suspends the calling task until it
/// settles. Other tasks keep running in the meantime.
///
/// A watcher task attaches a completion reaction that fills a one-shot slot,
/// then waits on the slot. The caller joins the watcher and returns what the
/// slot held. A promise that never settles keeps the caller suspended; one
/// that can no longer settle because every handle to it is gone fails with
/// [`Error::ProducerDropped`].
///
/// # Examples
///
/// ```
/// use promise_chain::{await_promise, Promise, Runtime};
///
/// let mut runtime = Runtime::new();
/// let value = runtime.block_on(|ctx| async move {
///     await_promise(|| Promise::<&str, &str>::resolved(&ctx, "ok")).await
/// });
/// assert_eq!(value.unwrap(), "ok");
/// ```
pub async fn await_promise<T, E, F>(supplier: F) -> Result<T, AwaitError<E>>
where
    T: Clone + 'static,
    E: Clone + 'static,
    F: FnOnce() -> Promise<T, E>,
{
    let promise = supplier();
    let ctx = promise.context().clone();
    let (producer, consumer) = slot::channel::<Settlement<T, E>>();

    let watcher = ctx.spawn_with_handle(async move {
        promise.then_settled(move |settlement| {
            producer.fill(settlement);
            Ok(())
        });
        // Only reactions and resolvers keep the cell alive from here on.
        drop(promise);
        consumer.await
    })?;

    match watcher.await? {
        Settlement::Resolved(value) => Ok(value),
        Settlement::Rejected(reason) => Err(AwaitError::Rejected(reason)),
    }
}

impl<T, E> Promise<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    /// Suspends until this promise settles and returns its resolved value.
    pub async fn value(&self) -> Result<T, AwaitError<E>> {
        let promise = self.clone();
        await_promise(move || promise).await
    }
}
