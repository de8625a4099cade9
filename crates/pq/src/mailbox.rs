//! Thread-safe priority mailbox.
//!
//! [`PriorityMailbox`] is a cloneable handle over one locked
//! [`PriorityQueue`]. Every mutation runs inside a single short critical
//! section whose length is bounded by the strategy (O(log n) for the heap,
//! O(n) for the list). Blocking is opt-in through
//! [`PriorityMailbox::extract_timeout`], which waits on a condition variable
//! and therefore never holds the lock while sleeping.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;
use parking_lot::{Condvar, Mutex};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{QueueError, QueueResult};
use crate::heap::HeapQueue;
use crate::list::ListQueue;
use crate::priority::Priority;
use crate::PriorityQueue;

/// Backing strategy chosen at creation time.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Array-backed max-heap, O(log n) insert and extract.
    #[default]
    Heap,
    /// Sorted doubly linked list, O(n) insert and O(1) extract.
    List,
}

/// What `insert` does when the mailbox is full.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    /// Fail with [`QueueError::CapacityExceeded`].
    #[default]
    Reject,
    /// Drop the lowest-ranked entry, then insert.
    EvictLowest,
}

type BoxedQueue<T> = Box<dyn PriorityQueue<T> + Send>;

struct Shared<T> {
    queue: Mutex<Option<BoxedQueue<T>>>,
    ready: Condvar,
    capacity: usize,
    overflow: Overflow,
}

/// Bounded, priority-ordered, thread-safe request mailbox.
pub struct PriorityMailbox<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for PriorityMailbox<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Send + 'static> PriorityMailbox<T> {
    /// Creates a mailbox holding at most `capacity` entries.
    pub fn create(capacity: usize, strategy: Strategy, overflow: Overflow) -> QueueResult<Self> {
        let queue: BoxedQueue<T> = match strategy {
            Strategy::Heap => Box::new(HeapQueue::with_capacity(capacity)?),
            Strategy::List => Box::new(ListQueue::with_capacity(capacity)?),
        };
        debug!("[PQ] created {strategy:?} mailbox, capacity {capacity}, overflow {overflow:?}");
        Ok(Self::from_queue(queue, overflow))
    }

    /// Wraps an already constructed strategy.
    pub fn with_queue<Q>(queue: Q, overflow: Overflow) -> Self
    where
        Q: PriorityQueue<T> + Send + 'static,
    {
        Self::from_queue(Box::new(queue), overflow)
    }

    fn from_queue(queue: BoxedQueue<T>, overflow: Overflow) -> Self {
        let capacity = queue.capacity();
        Self {
            shared: Arc::new(Shared {
                queue: Mutex::new(Some(queue)),
                ready: Condvar::new(),
                capacity,
                overflow,
            }),
        }
    }
}

impl<T> PriorityMailbox<T> {
    /// Inserts `item`.
    ///
    /// With [`Overflow::EvictLowest`] a full mailbox first gives up its
    /// lowest-ranked entry, which is returned to the caller.
    pub fn insert(&self, item: T, priority: Priority) -> QueueResult<Option<(T, Priority)>> {
        let mut guard = self.shared.queue.lock();
        let queue = guard.as_mut().ok_or(QueueError::InvalidHandle)?;

        let evicted = if queue.is_full() {
            match self.shared.overflow {
                Overflow::Reject => return Err(QueueError::CapacityExceeded),
                Overflow::EvictLowest => queue.evict_lowest(),
            }
        } else {
            None
        };
        queue.push(item, priority)?;
        drop(guard);

        self.shared.ready.notify_one();
        if let Some((_, lost)) = &evicted {
            debug!("[PQ] full: evicted {lost} entry to admit {priority}");
        }
        Ok(evicted)
    }

    /// Removes the highest-ranked entry without blocking.
    pub fn extract(&self) -> QueueResult<(T, Priority)> {
        let mut guard = self.shared.queue.lock();
        let queue = guard.as_mut().ok_or(QueueError::InvalidHandle)?;
        queue.pop().ok_or(QueueError::Empty)
    }

    /// Removes the highest-ranked entry, waiting up to `timeout` for one to
    /// arrive. Returns [`QueueError::Empty`] when the wait expires.
    pub fn extract_timeout(&self, timeout: Duration) -> QueueResult<(T, Priority)> {
        let deadline = Instant::now() + timeout;
        let mut guard = self.shared.queue.lock();
        loop {
            let queue = guard.as_mut().ok_or(QueueError::InvalidHandle)?;
            if let Some(entry) = queue.pop() {
                return Ok(entry);
            }
            if self.shared.ready.wait_until(&mut guard, deadline).timed_out() {
                let queue = guard.as_mut().ok_or(QueueError::InvalidHandle)?;
                return queue.pop().ok_or(QueueError::Empty);
            }
        }
    }

    /// Releases every stored entry and invalidates all clones of this handle.
    ///
    /// Threads blocked in [`extract_timeout`](Self::extract_timeout) wake up
    /// with [`QueueError::InvalidHandle`].
    pub fn destroy(&self) {
        let queue = self.shared.queue.lock().take();
        self.shared.ready.notify_all();
        // Entries are dropped outside the critical section.
        if let Some(mut queue) = queue {
            let released = queue.len();
            queue.clear();
            debug!("[PQ] destroyed mailbox, released {released} entries");
        }
    }

    /// Number of stored entries; zero once destroyed.
    pub fn size(&self) -> usize {
        self.shared.queue.lock().as_ref().map_or(0, |queue| queue.len())
    }

    /// True when nothing is stored, including after `destroy`.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn is_destroyed(&self) -> bool {
        self.shared.queue.lock().is_none()
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    pub fn overflow(&self) -> Overflow {
        self.shared.overflow
    }
}
