use crate::event::{EventQueue, EventTarget};
use std::cell::Cell;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info};

struct Shared<E> {
    queue: EventQueue<E>,
    wake: Notify,
    wake_closed: AtomicBool,
    producers: AtomicUsize,
}

impl<E> Shared<E> {
    /// Nothing queued, nothing left that could queue, and no one waiting on a wake.
    fn retired(&self) -> bool {
        self.wake_closed.load(Ordering::Acquire)
            && self.producers.load(Ordering::Acquire) == 0
            && self.queue.is_empty()
    }
}

/// Producer side of an [`EventLoop`]. Safe to move to engine threads.
pub struct EventSender<E> {
    shared: Arc<Shared<E>>,
}

impl<E> EventSender<E> {
    fn attach(shared: &Arc<Shared<E>>) -> Self {
        shared.producers.fetch_add(1, Ordering::AcqRel);
        Self {
            shared: shared.clone(),
        }
    }

    /// Queues `event` and wakes the dispatch thread. Never blocks beyond the queue lock.
    pub fn send(&self, event: E) {
        self.shared.queue.push(event);
        self.shared.wake.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.shared.wake_closed.load(Ordering::Acquire)
    }
}

impl<E> Clone for EventSender<E> {
    fn clone(&self) -> Self {
        Self::attach(&self.shared)
    }
}

impl<E> Drop for EventSender<E> {
    fn drop(&mut self) {
        if self.shared.producers.fetch_sub(1, Ordering::AcqRel) == 1 {
            // A parked dispatch task may be waiting only on this producer.
            self.shared.wake.notify_one();
        }
    }
}

/// Consumer side: owned by the host object, used only on the dispatch thread.
///
/// After [`EventLoop::stop`] the loop is closed once the batch in progress has
/// finished. A spawned dispatch task keeps delivering whatever the remaining
/// [`EventSender`]s queue, so completions that race a close still settle, and
/// it exits once the last sender is gone and the queue is empty.
pub struct EventLoop<E> {
    shared: Arc<Shared<E>>,
    dispatching: Cell<bool>,
    stopping: Cell<bool>,
}

impl<E> EventLoop<E> {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                queue: EventQueue::new(),
                wake: Notify::new(),
                wake_closed: AtomicBool::new(false),
                producers: AtomicUsize::new(0),
            }),
            dispatching: Cell::new(false),
            stopping: Cell::new(false),
        }
    }

    pub fn sender(&self) -> EventSender<E> {
        EventSender::attach(&self.shared)
    }

    pub fn pending(&self) -> usize {
        self.shared.queue.len()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.wake_closed.load(Ordering::Acquire)
    }

    /// Requests the loop be closed. Inside a batch this is deferred until the
    /// batch completes.
    pub fn stop(&self) {
        self.stopping.set(true);
        if !self.dispatching.get() {
            self.close_wake();
        }
    }

    /// Drains the queue once and hands every event to `target`, in order.
    /// Returns the number of events handled. Re-entrant calls from inside a
    /// handler are ignored.
    ///
    /// If a handler panics, the rest of the batch is dropped (rejecting any
    /// operation it carries) and the loop stays usable for the next drain.
    pub fn dispatch_pending<T>(&self, target: &T) -> usize
    where
        T: EventTarget<Event = E> + ?Sized,
    {
        if self.dispatching.replace(true) {
            debug!("dispatch already in progress, skipping nested drain");
            return 0;
        }
        let _batch = BatchGuard { event_loop: self };

        let events = self.shared.queue.drain_all();
        let count = events.len();
        if count > 0 {
            debug!(count, "dispatching event batch");
        }
        for event in events {
            target.handle_event(event);
        }
        count
    }

    fn close_wake(&self) {
        if self.shared.wake_closed.swap(true, Ordering::AcqRel) {
            return;
        }
        debug!("event loop closed");
        self.shared.wake.notify_one();
    }

    async fn wait(&self) {
        self.shared.wake.notified().await;
    }
}

impl<E> Default for EventLoop<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Drop for EventLoop<E> {
    // Whatever is still queued is dropped here, which rejects any pending
    // operation it carries.
    fn drop(&mut self) {
        self.close_wake();
        self.shared.wake.notify_one();
        let leftover = self.shared.queue.drain_all();
        if !leftover.is_empty() {
            debug!(count = leftover.len(), "Discarding events queued for a dropped target");
        }
    }
}

/// Ends a batch on every exit path, unwinding included.
struct BatchGuard<'a, E> {
    event_loop: &'a EventLoop<E>,
}

impl<E> Drop for BatchGuard<'_, E> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            debug!("event handler panicked, abandoning the rest of the batch");
        }
        self.event_loop.dispatching.set(false);
        if self.event_loop.stopping.get() {
            self.event_loop.close_wake();
        }
    }
}

/// Runs `target`'s event loop on the current `LocalSet` until the target is
/// dropped, or until it is closed and every producer has let go.
///
/// # Panics
///
/// Panics if called outside of a `tokio::task::LocalSet`.
pub fn spawn_dispatch<T>(target: &Rc<T>) -> JoinHandle<()>
where
    T: EventTarget + 'static,
    T::Event: 'static,
{
    let weak: Weak<T> = Rc::downgrade(target);
    let shared = target.event_loop().shared.clone();

    tokio::task::spawn_local(async move {
        info!("Event loop dispatch started");

        loop {
            if shared.queue.is_empty() {
                if shared.retired() {
                    break;
                }
                shared.wake.notified().await;
            }

            let Some(target) = weak.upgrade() else {
                debug!("Event target dropped, leaving dispatch loop");
                break;
            };
            target.event_loop().dispatch_pending(&*target);
        }

        info!("Event loop dispatch finished");
    })
}

/// Waits for the next wake and dispatches one batch. For hosts that drive
/// the loop from their own future instead of [`spawn_dispatch`].
pub async fn dispatch_next<T>(target: &T) -> usize
where
    T: EventTarget + ?Sized,
{
    let event_loop = target.event_loop();
    if event_loop.shared.queue.is_empty() && !event_loop.shared.retired() {
        event_loop.wait().await;
    }
    event_loop.dispatch_pending(target)
}
