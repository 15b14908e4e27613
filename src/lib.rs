//! Chainable promises on a cooperative, single-threaded scheduler.
//!
//! A [`Promise`] settles once, as resolved or rejected. `then`, `catch` and
//! friends hang child promises off it; each child's handler runs as its own
//! task on the [`Context`] the parent was created with, whether the child was
//! attached before or after the parent settled. [`await_promise`] lets a task
//! suspend until a promise settles and take its value.
//!
//! # Examples
//!
//! ```
//! use promise_chain::{Promise, Runtime, Settlement};
//!
//! let mut runtime = Runtime::new();
//! let last = runtime.block_on(|ctx| async move {
//!     Promise::<String, String>::rejected(&ctx, "failure".into())
//!         .then_or_else(|ok| Ok(ok), |_err| Ok("recovered".to_string()))
//!         .then(|value| Ok(value))
//!         .catch(|_| Ok("never".to_string()))
//! });
//! assert_eq!(last.settlement(), Some(Settlement::Resolved("recovered".to_string())));
//! ```

mod bridge;
mod context;
mod promise;
mod reaction;
mod settlement;
mod slot;

pub use bridge::{await_promise, AwaitError};
pub use context::{Context, EnterGuard, Runtime};
pub use promise::{Promise, Resolver};
pub use settlement::{Settlement, Status};

use futures::task::SpawnError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("promise has already settled")]
    AlreadySettled,
    #[error("promise dropped before it settled")]
    ProducerDropped,
    #[error("no scheduling context installed on this thread")]
    NoContext,
    #[error("scheduler refused the task: {0}")]
    Spawn(#[from] SpawnError),
}
