//! # pq
//!
//! Bounded priority mailbox shared between the UI dispatcher and the LED
//! actor. Requests are ranked by [`Priority`] first and by arrival order
//! second, so entries of equal priority leave the queue in FIFO order.
//!
//! ## Module Overview
//! - [`priority`] – The fixed ordinal priority set.
//! - [`error`]    – Failure values returned by every queue operation.
//! - [`heap`]     – Array-backed max-heap strategy (the default).
//! - [`list`]     – Priority-sorted doubly linked list over an index arena.
//! - [`mailbox`]  – Thread-safe handle wrapping either strategy.
//!
//! Both strategies implement [`PriorityQueue`], so the mailbox and its tests
//! can run against either one.

mod entry;
pub mod error;
pub mod heap;
pub mod list;
pub mod mailbox;
pub mod priority;

pub use error::{QueueError, QueueResult};
pub use heap::HeapQueue;
pub use list::ListQueue;
pub use mailbox::{Overflow, PriorityMailbox, Strategy};
pub use priority::Priority;

/// Storage strategy behind a [`PriorityMailbox`].
///
/// Implementations are single-threaded; the mailbox provides the locking.
/// `pop` must always return the entry with the highest priority and, among
/// equal priorities, the one pushed first.
pub trait PriorityQueue<T> {
    /// Maximum number of entries the queue holds.
    fn capacity(&self) -> usize;

    /// Number of entries currently stored.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_full(&self) -> bool {
        self.len() >= self.capacity()
    }

    /// Stores `item`, failing with [`QueueError::CapacityExceeded`] when full.
    fn push(&mut self, item: T, priority: Priority) -> QueueResult<()>;

    /// Removes the highest-ranked entry.
    fn pop(&mut self) -> Option<(T, Priority)>;

    /// Removes the lowest-ranked entry to make room for a new one.
    fn evict_lowest(&mut self) -> Option<(T, Priority)>;

    /// Drops every stored entry.
    fn clear(&mut self);
}
