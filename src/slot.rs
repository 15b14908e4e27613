use std::cell::RefCell;
use std::rc::Rc;
use std::{future::Future, pin::Pin, task::{Context, Poll, Waker}};
use crate::Error;

/// A one-shot, single-consumer slot. The `Producer` fills it once, the
/// `Consumer` is a future that completes with the value.
///
/// Both halves live on the same cooperative scheduler, so the shared state is
/// an `Rc<RefCell<_>>` rather than a lock.
#[derive(Debug)]
pub(crate) struct Producer<T> {
    slot: Rc<RefCell<Inner<T>>>,
}

#[derive(Debug)]
pub(crate) struct Consumer<T> {
    slot: Rc<RefCell<Inner<T>>>,
}

#[derive(Debug)]
enum WakerState {
    Fresh,
    Tainted,
}

#[derive(Debug)]
struct Inner<T> {
    value: Option<T>,
    waker: Result<Waker, WakerState>,
}

pub(crate) fn channel<T>() -> (Producer<T>, Consumer<T>) {
    let inner = Rc::new(RefCell::new(Inner {
        value: None,
        waker: Err(WakerState::Fresh),
    }));
    (Producer { slot: inner.clone() }, Consumer { slot: inner })
}

impl<T> Producer<T> {
    pub(crate) fn fill(self, value: T) {
        let mut slot = self.slot.borrow_mut();
        slot.value = Some(value);
        if let Ok(waker) = std::mem::replace(&mut slot.waker, Err(WakerState::Tainted)) {
            waker.wake()
        }
    }
}

impl<T> Drop for Producer<T> {
    /// If this is an unfilled producer, wake with error.
    fn drop(&mut self) {
        let mut slot = self.slot.borrow_mut();
        if let Ok(waker) = std::mem::replace(&mut slot.waker, Err(WakerState::Tainted)) {
            waker.wake()
        }
    }
}

impl<T> Future for Consumer<T> {
    type Output = Result<T, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut slot = self.slot.borrow_mut();
        match slot.value.take() {
            Some(value) => Poll::Ready(Ok(value)),
            None => match std::mem::replace(&mut slot.waker, Ok(cx.waker().clone())) {
                Err(WakerState::Tainted) => Poll::Ready(Err(Error::ProducerDropped)),
                _ => Poll::Pending,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::LocalPool;
    use futures::task::LocalSpawnExt;
    use super::channel;
    use crate::Error;

    #[test]
    fn test_fill_before_poll() {
        let (producer, consumer) = channel::<String>();
        producer.fill(String::from("🍓"));
        let mut pool = LocalPool::new();
        assert_eq!(pool.run_until(consumer).unwrap(), "🍓");
    }

    #[test]
    fn test_fill_wakes_waiting_consumer() {
        let (producer, consumer) = channel::<u8>();
        let mut pool = LocalPool::new();
        pool.spawner()
            .spawn_local(async move { producer.fill(3) })
            .unwrap();
        assert_eq!(pool.run_until(consumer).unwrap(), 3);
    }

    #[test]
    fn test_dropped_producer() {
        let (producer, consumer) = channel::<u8>();
        let mut pool = LocalPool::new();
        pool.spawner()
            .spawn_local(async move { std::mem::drop(producer) })
            .unwrap();
        assert!(matches!(pool.run_until(consumer), Err(Error::ProducerDropped)));
    }
}
