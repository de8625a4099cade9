//! Priority-sorted doubly linked list strategy.
//!
//! Nodes live in an index arena reserved at construction and are recycled
//! through a free list, so no node is ever allocated or freed individually.
//! The chain is kept in rank order: the head is the next entry to leave and
//! the tail is the lowest-ranked one, which makes eviction exact.

use crate::entry::Entry;
use crate::error::{check_capacity, QueueError, QueueResult};
use crate::priority::Priority;
use crate::PriorityQueue;

struct Slot<T> {
    entry: Option<Entry<T>>,
    prev: Option<usize>,
    next: Option<usize>,
}

impl<T> Slot<T> {
    const fn vacant() -> Self {
        Self {
            entry: None,
            prev: None,
            next: None,
        }
    }
}

pub struct ListQueue<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
    next_seq: u64,
}

impl<T> ListQueue<T> {
    /// Creates an empty list able to hold `capacity` entries.
    pub fn with_capacity(capacity: usize) -> QueueResult<Self> {
        check_capacity(capacity)?;

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| QueueError::AllocationFailure)?;
        slots.resize_with(capacity, Slot::vacant);

        let mut free = Vec::new();
        free.try_reserve_exact(capacity)
            .map_err(|_| QueueError::AllocationFailure)?;
        // Lowest index is handed out first.
        free.extend((0..capacity).rev());

        Ok(Self {
            slots,
            free,
            head: None,
            tail: None,
            len: 0,
            next_seq: 0,
        })
    }

    /// Priorities from head to tail, i.e. in extraction order.
    pub fn priorities(&self) -> Vec<Priority> {
        let mut out = Vec::with_capacity(self.len);
        let mut cursor = self.head;
        while let Some(index) = cursor {
            let slot = &self.slots[index];
            if let Some(entry) = &slot.entry {
                out.push(entry.priority);
            }
            cursor = slot.next;
        }
        out
    }

    /// First node whose priority is strictly lower than `priority`.
    fn first_below(&self, priority: Priority) -> Option<usize> {
        let mut cursor = self.head;
        while let Some(index) = cursor {
            let slot = &self.slots[index];
            if slot.entry.as_ref().is_some_and(|e| e.priority < priority) {
                return Some(index);
            }
            cursor = slot.next;
        }
        None
    }

    fn link(&mut self, index: usize, prev: Option<usize>, next: Option<usize>) {
        self.slots[index].prev = prev;
        self.slots[index].next = next;
        match prev {
            Some(p) => self.slots[p].next = Some(index),
            None => self.head = Some(index),
        }
        match next {
            Some(n) => self.slots[n].prev = Some(index),
            None => self.tail = Some(index),
        }
    }

    fn unlink(&mut self, index: usize) -> Option<Entry<T>> {
        let prev = self.slots[index].prev.take();
        let next = self.slots[index].next.take();
        match prev {
            Some(p) => self.slots[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n].prev = prev,
            None => self.tail = prev,
        }
        self.len -= 1;
        self.free.push(index);
        self.slots[index].entry.take()
    }
}

impl<T> PriorityQueue<T> for ListQueue<T> {
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn len(&self) -> usize {
        self.len
    }

    fn push(&mut self, item: T, priority: Priority) -> QueueResult<()> {
        let index = self.free.pop().ok_or(QueueError::CapacityExceeded)?;
        let seq = self.next_seq;
        self.next_seq += 1;
        self.slots[index].entry = Some(Entry::new(item, priority, seq));

        // Equal priorities land behind their peers, which keeps FIFO order.
        match self.first_below(priority) {
            Some(next) => {
                let prev = self.slots[next].prev;
                self.link(index, prev, Some(next));
            }
            None => {
                let tail = self.tail;
                self.link(index, tail, None);
            }
        }
        self.len += 1;
        Ok(())
    }

    fn pop(&mut self) -> Option<(T, Priority)> {
        let head = self.head?;
        self.unlink(head).map(Entry::into_parts)
    }

    fn evict_lowest(&mut self) -> Option<(T, Priority)> {
        let tail = self.tail?;
        self.unlink(tail).map(Entry::into_parts)
    }

    fn clear(&mut self) {
        while self.pop().is_some() {}
    }
}
