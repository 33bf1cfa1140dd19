use std::collections::VecDeque;
use std::mem;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// FIFO shared between producer threads and the single dispatch thread.
///
/// The lock is only held to append or to swap the whole buffer out, so a
/// producer never waits on event handling.
pub struct EventQueue<E> {
    events: Mutex<VecDeque<E>>,
}

impl<E> EventQueue<E> {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push(&self, event: E) {
        self.lock().push_back(event);
    }

    /// Takes every queued event, oldest first, leaving the queue empty.
    pub fn drain_all(&self) -> VecDeque<E> {
        mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panicking handler never holds this lock, so a poisoned buffer is still consistent.
    fn lock(&self) -> MutexGuard<'_, VecDeque<E>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}
