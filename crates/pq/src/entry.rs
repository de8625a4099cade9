use core::cmp::Ordering;

use crate::priority::Priority;

/// Queue slot contents: the payload, its priority, and the insertion
/// sequence used to break priority ties.
#[derive(Debug)]
pub(crate) struct Entry<T> {
    pub(crate) item: T,
    pub(crate) priority: Priority,
    pub(crate) seq: u64,
}

impl<T> Entry<T> {
    pub(crate) fn new(item: T, priority: Priority, seq: u64) -> Self {
        Self { item, priority, seq }
    }

    /// Returns true if `self` must leave the queue before `other`.
    pub(crate) fn outranks(&self, other: &Self) -> bool {
        match self.priority.cmp(&other.priority) {
            Ordering::Greater => true,
            Ordering::Less => false,
            // older wins
            Ordering::Equal => self.seq < other.seq,
        }
    }

    pub(crate) fn into_parts(self) -> (T, Priority) {
        (self.item, self.priority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_priority_outranks_older_entry() {
        let old_low = Entry::new((), Priority::Low, 0);
        let new_high = Entry::new((), Priority::High, 9);
        assert!(new_high.outranks(&old_low));
        assert!(!old_low.outranks(&new_high));
    }

    #[test]
    fn equal_priority_breaks_tie_by_sequence() {
        let first = Entry::new((), Priority::Medium, 3);
        let second = Entry::new((), Priority::Medium, 4);
        assert!(first.outranks(&second));
        assert!(!second.outranks(&first));
        assert!(!first.outranks(&first));
    }
}
