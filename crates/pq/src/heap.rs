//! Array-backed max-heap strategy.
//!
//! Entries live in a slot array reserved once at construction, so insert and
//! extract never allocate. Node `i` has its children at `2i + 1` and `2i + 2`;
//! slot 0 always holds the highest-ranked entry.

use crate::entry::Entry;
use crate::error::{check_capacity, QueueError, QueueResult};
use crate::priority::Priority;
use crate::PriorityQueue;

pub struct HeapQueue<T> {
    slots: Vec<Entry<T>>,
    capacity: usize,
    next_seq: u64,
}

impl<T> HeapQueue<T> {
    /// Creates an empty heap able to hold `capacity` entries.
    pub fn with_capacity(capacity: usize) -> QueueResult<Self> {
        check_capacity(capacity)?;
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| QueueError::AllocationFailure)?;
        Ok(Self {
            slots,
            capacity,
            next_seq: 0,
        })
    }

    /// Priority of the entry that `pop` would return next.
    pub fn peek_priority(&self) -> Option<Priority> {
        self.slots.first().map(|entry| entry.priority)
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if !self.slots[index].outranks(&self.slots[parent]) {
                break;
            }
            self.slots.swap(index, parent);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.slots.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut best = index;

            if left < len && self.slots[left].outranks(&self.slots[best]) {
                best = left;
            }
            if right < len && self.slots[right].outranks(&self.slots[best]) {
                best = right;
            }
            if best == index {
                break;
            }
            self.slots.swap(index, best);
            index = best;
        }
    }

    /// Index of the lowest-ranked entry.
    ///
    /// The minimum of a max-heap is always a leaf, and leaves occupy the
    /// second half of the array, so only that half is scanned.
    fn lowest_index(&self) -> Option<usize> {
        let len = self.slots.len();
        if len == 0 {
            return None;
        }
        let mut lowest = len / 2;
        for index in (len / 2 + 1)..len {
            if self.slots[lowest].outranks(&self.slots[index]) {
                lowest = index;
            }
        }
        Some(lowest)
    }
}

impl<T> PriorityQueue<T> for HeapQueue<T> {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn len(&self) -> usize {
        self.slots.len()
    }

    fn push(&mut self, item: T, priority: Priority) -> QueueResult<()> {
        if self.slots.len() >= self.capacity {
            return Err(QueueError::CapacityExceeded);
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.slots.push(Entry::new(item, priority, seq));
        self.sift_up(self.slots.len() - 1);
        Ok(())
    }

    fn pop(&mut self) -> Option<(T, Priority)> {
        if self.slots.is_empty() {
            return None;
        }
        let top = self.slots.swap_remove(0);
        if !self.slots.is_empty() {
            self.sift_down(0);
        }
        Some(top.into_parts())
    }

    fn evict_lowest(&mut self) -> Option<(T, Priority)> {
        let index = self.lowest_index()?;
        let evicted = self.slots.swap_remove(index);
        // The last entry moved into a leaf slot; it can only need to rise.
        if index < self.slots.len() {
            self.sift_up(index);
        }
        Some(evicted.into_parts())
    }

    fn clear(&mut self) {
        self.slots.clear();
    }
}
