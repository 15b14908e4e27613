//! How a child promise turns its parent's settlement into its own.

use crate::Settlement;

/// What a child does with one branch of its parent's outcome.
pub(crate) enum Branch<A, U, E> {
    /// Run a handler. `Ok` resolves the child and `Err` rejects it, whichever
    /// branch the handler was attached to.
    Handle(Box<dyn FnOnce(A) -> Result<U, E>>),
    /// No handler for this branch: keep the parent's payload and outcome kind.
    PassThrough(fn(A) -> Settlement<U, E>),
}

impl<A, U, E> Branch<A, U, E> {
    pub(crate) fn handle<F>(handler: F) -> Self
    where
        F: FnOnce(A) -> Result<U, E> + 'static,
    {
        Branch::Handle(Box::new(handler))
    }

    fn apply(self, payload: A) -> Settlement<U, E> {
        match self {
            Branch::Handle(handler) => handler(payload).into(),
            Branch::PassThrough(forward) => forward(payload),
        }
    }
}

/// The handlers a child was created with.
pub(crate) enum Reaction<T, U, E> {
    Branches {
        on_resolved: Branch<T, U, E>,
        on_rejected: Branch<E, U, E>,
    },
    /// One handler that sees the whole settlement.
    Settled(Box<dyn FnOnce(Settlement<T, E>) -> Result<U, E>>),
}

impl<T, U, E> Reaction<T, U, E> {
    pub(crate) fn new(on_resolved: Branch<T, U, E>, on_rejected: Branch<E, U, E>) -> Self {
        Reaction::Branches {
            on_resolved,
            on_rejected,
        }
    }

    pub(crate) fn run(self, parent: Settlement<T, E>) -> Settlement<U, E> {
        match self {
            Reaction::Branches {
                on_resolved,
                on_rejected,
            } => match parent {
                Settlement::Resolved(value) => on_resolved.apply(value),
                Settlement::Rejected(reason) => on_rejected.apply(reason),
            },
            Reaction::Settled(handler) => handler(parent).into(),
        }
    }
}

impl<T, E> Reaction<T, T, E> {
    /// Forwards either outcome unchanged.
    pub(crate) fn pass_through() -> Self {
        Reaction::new(
            Branch::PassThrough(Settlement::Resolved),
            Branch::PassThrough(Settlement::Rejected),
        )
    }
}
