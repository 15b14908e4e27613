//! The cooperative scheduling context that promises dispatch their reactions on.
//!
//! A [`Runtime`] owns a single-threaded pool of tasks. Every task interleaves
//! with the others only at `.await` points, so promise state needs no lock.
//! [`Context`] is the cheap, cloneable handle handed to promise constructors.
//!
//! Code that cannot thread a handle through can install one on the current
//! thread with [`Context::enter`] and look it up with [`Context::current`].

use std::cell::RefCell;
use std::future::Future;

use futures::executor::{LocalPool, LocalSpawner};
use futures::future::RemoteHandle;
use futures::task::LocalSpawnExt;

use crate::Error;

thread_local! {
    static CURRENT: RefCell<Option<Context>> = const { RefCell::new(None) };
}

/// Handle to a scheduler that reactions and awaited tasks are spawned on.
#[derive(Debug, Clone)]
pub struct Context {
    spawner: LocalSpawner,
}

impl Context {
    /// Submits a unit of work. It runs the next time the owning runtime is driven.
    pub fn spawn<F>(&self, future: F) -> Result<(), Error>
    where
        F: Future<Output = ()> + 'static,
    {
        self.spawner.spawn_local(future)?;
        Ok(())
    }

    /// Submits a unit of work and returns a handle that completes with its output.
    ///
    /// Dropping the handle cancels the task.
    pub fn spawn_with_handle<F>(&self, future: F) -> Result<RemoteHandle<F::Output>, Error>
    where
        F: Future + 'static,
        F::Output: 'static,
    {
        Ok(self.spawner.spawn_local_with_handle(future)?)
    }

    /// Installs this context as the current one for the calling thread.
    ///
    /// The previous context (possibly none) comes back when the guard drops,
    /// including when the scope unwinds.
    pub fn enter(&self) -> EnterGuard {
        let previous = CURRENT.with(|slot| slot.borrow_mut().replace(self.clone()));
        log::trace!("entered scheduling context");
        EnterGuard { previous }
    }

    /// The context installed on this thread, if any.
    pub fn current() -> Option<Context> {
        CURRENT.with(|slot| slot.borrow().clone())
    }

    pub fn try_current() -> Result<Context, Error> {
        Self::current().ok_or(Error::NoContext)
    }
}

/// Restores the previously installed context on drop.
#[must_use = "the context is uninstalled as soon as the guard is dropped"]
#[derive(Debug)]
pub struct EnterGuard {
    previous: Option<Context>,
}

impl Drop for EnterGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT.with(|slot| *slot.borrow_mut() = previous);
        log::trace!("left scheduling context");
    }
}

/// A single-threaded cooperative scheduler.
#[derive(Debug)]
pub struct Runtime {
    pool: LocalPool,
}

impl Runtime {
    pub fn new() -> Self {
        Self {
            pool: LocalPool::new(),
        }
    }

    pub fn context(&self) -> Context {
        Context {
            spawner: self.pool.spawner(),
        }
    }

    /// Drives the future built by `f` to completion, then keeps running until
    /// no spawned task can make progress.
    ///
    /// The runtime's context is current for the whole call and the previous
    /// one is restored afterwards.
    ///
    /// # Examples
    ///
    /// ```
    /// use promise_chain::{Promise, Runtime};
    ///
    /// let mut runtime = Runtime::new();
    /// let child = runtime.block_on(|ctx| async move {
    ///     Promise::<u32, String>::resolved(&ctx, 20).then(|n| Ok(n + 1))
    /// });
    /// assert_eq!(child.settlement().map(|s| s.into_result()), Some(Ok(21)));
    /// ```
    pub fn block_on<F, Fut>(&mut self, f: F) -> Fut::Output
    where
        F: FnOnce(Context) -> Fut,
        Fut: Future,
    {
        let ctx = self.context();
        let _guard = ctx.enter();
        let output = self.pool.run_until(f(ctx));
        self.pool.run_until_stalled();
        output
    }

    /// Runs every task that can currently make progress, then returns.
    pub fn run_until_stalled(&mut self) {
        self.pool.run_until_stalled();
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}
