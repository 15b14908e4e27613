//! The settlement cell and the `then`/`catch` wiring on top of it.
//!
//! A [`Promise`] is a shared handle to one cell. The cell moves from pending
//! to settled once; whatever children were attached by then are notified, and
//! children attached later are notified on the spot. Notifying a child never
//! runs its handler inline: it submits a reaction task to the promise's
//! [`Context`], so `resolve` returns before any handler has run.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use crate::reaction::{Branch, Reaction};
use crate::{Context, Error, Settlement, Status};

type Notify<T, E> = Box<dyn FnOnce(Settlement<T, E>)>;

struct Cell<T, E> {
    settlement: Option<Settlement<T, E>>,
    children: Vec<Notify<T, E>>,
}

/// A deferred value that settles once, as resolved with a `T` or rejected
/// with an `E`.
///
/// Cloning the handle shares the same cell.
pub struct Promise<T, E> {
    cell: Rc<RefCell<Cell<T, E>>>,
    ctx: Context,
}

/// The `resolve`/`reject` entry points of one promise.
pub struct Resolver<T, E> {
    cell: Rc<RefCell<Cell<T, E>>>,
}

impl<T, E> Clone for Promise<T, E> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            ctx: self.ctx.clone(),
        }
    }
}

impl<T, E> Clone for Resolver<T, E> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Promise<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = self.cell.borrow();
        f.debug_struct("Promise")
            .field("status", &status_of(&cell))
            .field("children", &cell.children.len())
            .finish()
    }
}

impl<T, E> fmt::Debug for Resolver<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("status", &status_of(&self.cell.borrow()))
            .finish()
    }
}

fn status_of<T, E>(cell: &Cell<T, E>) -> Status {
    cell.settlement
        .as_ref()
        .map_or(Status::Pending, Settlement::status)
}

impl<T, E> Resolver<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    /// Resolves the promise. Does nothing if it has already settled.
    pub fn resolve(&self, value: T) {
        self.settle_lenient(Settlement::Resolved(value))
    }

    /// Rejects the promise. Does nothing if it has already settled.
    pub fn reject(&self, reason: E) {
        self.settle_lenient(Settlement::Rejected(reason))
    }

    /// Like [`Resolver::resolve`], but reports a second settlement.
    pub fn try_resolve(&self, value: T) -> Result<(), Error> {
        self.settle(Settlement::Resolved(value))
    }

    /// Like [`Resolver::reject`], but reports a second settlement.
    pub fn try_reject(&self, reason: E) -> Result<(), Error> {
        self.settle(Settlement::Rejected(reason))
    }

    pub fn is_settled(&self) -> bool {
        self.cell.borrow().settlement.is_some()
    }

    fn settle_lenient(&self, settlement: Settlement<T, E>) {
        if self.settle(settlement).is_err() {
            log::debug!("ignoring settlement of an already settled promise");
        }
    }

    pub(crate) fn settle(&self, settlement: Settlement<T, E>) -> Result<(), Error> {
        let children = {
            let mut cell = self.cell.borrow_mut();
            if cell.settlement.is_some() {
                return Err(Error::AlreadySettled);
            }
            cell.settlement = Some(settlement.clone());
            std::mem::take(&mut cell.children)
        };
        log::trace!(
            "promise {}, notifying {} children",
            settlement.status(),
            children.len()
        );
        for notify in children {
            notify(settlement.clone());
        }
        Ok(())
    }
}

impl<T, E> Promise<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    fn pending(ctx: &Context) -> (Self, Resolver<T, E>) {
        let cell = Rc::new(RefCell::new(Cell {
            settlement: None,
            children: Vec::new(),
        }));
        let resolver = Resolver { cell: cell.clone() };
        (
            Self {
                cell,
                ctx: ctx.clone(),
            },
            resolver,
        )
    }

    /// Creates a promise and runs `init` right away with its resolver.
    ///
    /// An `Err` returned by `init` rejects the promise, unless `init` already
    /// settled it.
    ///
    /// # Examples
    ///
    /// ```
    /// use promise_chain::{Promise, Runtime, Status};
    ///
    /// let runtime = Runtime::new();
    /// let promise = Promise::<u8, String>::new(&runtime.context(), |resolver| {
    ///     resolver.resolve(1);
    ///     resolver.resolve(2);
    ///     Ok(())
    /// });
    /// assert_eq!(promise.status(), Status::Resolved);
    /// assert_eq!(promise.settlement().and_then(|s| s.into_result().ok()), Some(1));
    /// ```
    pub fn new<F>(ctx: &Context, init: F) -> Self
    where
        F: FnOnce(Resolver<T, E>) -> Result<(), E>,
    {
        let (promise, resolver) = Self::pending(ctx);
        if let Err(fault) = init(resolver.clone()) {
            resolver.reject(fault);
        }
        promise
    }

    /// Creates a promise whose initializer may suspend. The initializer runs
    /// as its own task on `ctx`; an `Err` it returns rejects the promise.
    pub fn spawn<F, Fut>(ctx: &Context, init: F) -> Result<Self, Error>
    where
        F: FnOnce(Resolver<T, E>) -> Fut,
        Fut: Future<Output = Result<(), E>> + 'static,
    {
        let (promise, resolver) = Self::pending(ctx);
        let task = init(resolver.clone());
        ctx.spawn(async move {
            if let Err(fault) = task.await {
                resolver.reject(fault);
            }
        })?;
        Ok(promise)
    }

    /// A promise that is already resolved with `value`.
    pub fn resolved(ctx: &Context, value: T) -> Self {
        Self::new(ctx, |resolver| {
            resolver.resolve(value);
            Ok(())
        })
    }

    /// A promise that is already rejected with `reason`.
    pub fn rejected(ctx: &Context, reason: E) -> Self {
        Self::new(ctx, |resolver| {
            resolver.reject(reason);
            Ok(())
        })
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn status(&self) -> Status {
        status_of(&self.cell.borrow())
    }

    pub fn is_settled(&self) -> bool {
        self.status() != Status::Pending
    }

    /// A copy of the settled outcome, or `None` while pending.
    pub fn settlement(&self) -> Option<Settlement<T, E>> {
        self.cell.borrow().settlement.clone()
    }

    /// Chains a handler for the resolved value. A rejection passes through.
    ///
    /// An `Err` returned by the handler rejects the child.
    pub fn then<U, F>(&self, on_resolved: F) -> Promise<U, E>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> Result<U, E> + 'static,
    {
        self.attach(Reaction::new(
            Branch::handle(on_resolved),
            Branch::PassThrough(Settlement::Rejected),
        ))
    }

    /// Chains handlers for both outcomes. Whichever handler runs, `Ok`
    /// resolves the child, so a rejection handler can recover.
    pub fn then_or_else<U, F, G>(&self, on_resolved: F, on_rejected: G) -> Promise<U, E>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> Result<U, E> + 'static,
        G: FnOnce(E) -> Result<U, E> + 'static,
    {
        self.attach(Reaction::new(
            Branch::handle(on_resolved),
            Branch::handle(on_rejected),
        ))
    }

    /// Chains a handler for the rejection. A resolved value passes through.
    pub fn catch<G>(&self, on_rejected: G) -> Promise<T, E>
    where
        G: FnOnce(E) -> Result<T, E> + 'static,
    {
        self.attach(Reaction::new(
            Branch::PassThrough(Settlement::Resolved),
            Branch::handle(on_rejected),
        ))
    }

    /// A child with no handlers, settling exactly as this promise does.
    pub fn forward(&self) -> Promise<T, E> {
        self.attach(Reaction::pass_through())
    }

    /// Chains one handler that receives the settlement whatever its kind.
    pub fn then_settled<U, F>(&self, on_settled: F) -> Promise<U, E>
    where
        U: Clone + 'static,
        F: FnOnce(Settlement<T, E>) -> Result<U, E> + 'static,
    {
        self.attach(Reaction::Settled(Box::new(on_settled)))
    }

    fn attach<U>(&self, reaction: Reaction<T, U, E>) -> Promise<U, E>
    where
        U: Clone + 'static,
    {
        let (child, resolver) = Promise::pending(&self.ctx);
        let ctx = self.ctx.clone();
        let notify: Notify<T, E> = Box::new(move |settlement| {
            log::trace!("dispatching reaction to {}", settlement.status());
            let dispatched = ctx.spawn(async move {
                resolver.settle_lenient(reaction.run(settlement));
            });
            if let Err(e) = dispatched {
                log::warn!("reaction dropped: {e}");
            }
        });

        let settled = {
            let mut cell = self.cell.borrow_mut();
            match cell.settlement.clone() {
                Some(settlement) => Some((settlement, notify)),
                None => {
                    cell.children.push(notify);
                    None
                }
            }
        };
        if let Some((settlement, notify)) = settled {
            notify(settlement);
        }
        child
    }
}
