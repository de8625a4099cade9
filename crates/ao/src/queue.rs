//! Bounded FIFO event queue for active objects.
//!
//! A fixed-size `heapless::Deque` behind a mutex, shared by cloneable
//! handles. The consumer may close the queue once it has gone idle; a closed
//! queue refuses every post and hands the event back to the sender.

use std::sync::Arc;
use std::time::{Duration, Instant};

use heapless::Deque;
use parking_lot::{Condvar, Mutex};

/// Why an event could not be posted. The event is returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostError<T> {
    Full(T),
    Closed(T),
}

impl<T> PostError<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Full(event) | Self::Closed(event) => event,
        }
    }
}

struct Slots<T, const N: usize> {
    events: Deque<T, N>,
    closed: bool,
}

struct Channel<T, const N: usize> {
    slots: Mutex<Slots<T, N>>,
    ready: Condvar,
}

pub struct EventQueue<T, const N: usize> {
    channel: Arc<Channel<T, N>>,
}

impl<T, const N: usize> Clone for EventQueue<T, N> {
    fn clone(&self) -> Self {
        Self {
            channel: Arc::clone(&self.channel),
        }
    }
}

impl<T, const N: usize> Default for EventQueue<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> EventQueue<T, N> {
    /// Create a new empty, open queue
    pub fn new() -> Self {
        Self {
            channel: Arc::new(Channel {
                slots: Mutex::new(Slots {
                    events: Deque::new(),
                    closed: false,
                }),
                ready: Condvar::new(),
            }),
        }
    }

    /// Post an event to the back of the queue without blocking
    pub fn try_post(&self, event: T) -> Result<(), PostError<T>> {
        let mut slots = self.channel.slots.lock();
        if slots.closed {
            return Err(PostError::Closed(event));
        }
        slots.events.push_back(event).map_err(PostError::Full)?;
        drop(slots);
        self.channel.ready.notify_one();
        Ok(())
    }

    /// Discard the oldest pending event
    pub fn drop_oldest(&self) -> Option<T> {
        self.channel.slots.lock().events.pop_front()
    }

    /// Take the oldest event, waiting up to `timeout` for one to arrive
    pub fn receive_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut slots = self.channel.slots.lock();
        loop {
            if let Some(event) = slots.events.pop_front() {
                return Some(event);
            }
            if self
                .channel
                .ready
                .wait_until(&mut slots, deadline)
                .timed_out()
            {
                return slots.events.pop_front();
            }
        }
    }

    /// Close the queue if nothing is pending. Returns true once closed.
    pub fn close_if_empty(&self) -> bool {
        let mut slots = self.channel.slots.lock();
        if slots.events.is_empty() {
            slots.closed = true;
        }
        slots.closed
    }

    /// Close the queue unconditionally, discarding pending events.
    /// Returns how many were discarded.
    pub fn close(&self) -> usize {
        let mut slots = self.channel.slots.lock();
        slots.closed = true;
        let mut discarded = 0;
        while slots.events.pop_front().is_some() {
            discarded += 1;
        }
        discarded
    }

    pub fn is_closed(&self) -> bool {
        self.channel.slots.lock().closed
    }

    pub fn len(&self) -> usize {
        self.channel.slots.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the maximum capacity of the queue
    pub const fn capacity(&self) -> usize {
        N
    }

    /// True if both handles refer to the same queue
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.channel, &other.channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_event_queue_fifo() {
        let queue: EventQueue<u8, 4> = EventQueue::new();
        assert!(queue.is_empty());

        queue.try_post(10).unwrap();
        queue.try_post(20).unwrap();
        queue.try_post(30).unwrap();
        assert_eq!(queue.len(), 3);

        let timeout = Duration::from_millis(1);
        assert_eq!(queue.receive_timeout(timeout), Some(10));
        assert_eq!(queue.receive_timeout(timeout), Some(20));
        assert_eq!(queue.receive_timeout(timeout), Some(30));
        assert_eq!(queue.receive_timeout(timeout), None);
    }

    #[test]
    fn test_event_queue_full_returns_event() {
        let queue: EventQueue<u8, 2> = EventQueue::new();
        queue.try_post(1).unwrap();
        queue.try_post(2).unwrap();

        assert_eq!(queue.try_post(3), Err(PostError::Full(3)));
        assert_eq!(queue.drop_oldest(), Some(1));
        queue.try_post(3).unwrap();
        assert_eq!(queue.drop_oldest(), Some(2));
        assert_eq!(queue.drop_oldest(), Some(3));
    }

    #[test]
    fn test_close_only_when_empty() {
        let queue: EventQueue<u8, 2> = EventQueue::new();
        queue.try_post(1).unwrap();
        assert!(!queue.close_if_empty());
        assert!(!queue.is_closed());

        assert_eq!(queue.drop_oldest(), Some(1));
        assert!(queue.close_if_empty());
        assert_eq!(queue.try_post(5), Err(PostError::Closed(5)));
        assert_eq!(PostError::Closed(5).into_inner(), 5);
    }

    #[test]
    fn test_close_discards_pending() {
        let queue: EventQueue<u8, 4> = EventQueue::new();
        queue.try_post(1).unwrap();
        queue.try_post(2).unwrap();

        assert_eq!(queue.close(), 2);
        assert!(queue.is_closed());
        assert!(queue.is_empty());
        assert_eq!(queue.try_post(3), Err(PostError::Closed(3)));
    }

    #[test]
    fn test_receive_wakes_on_post() {
        let queue: EventQueue<u8, 2> = EventQueue::new();
        let producer = queue.clone();
        assert!(producer.same_as(&queue));

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            producer.try_post(7).unwrap();
        });
        assert_eq!(queue.receive_timeout(Duration::from_secs(5)), Some(7));
        handle.join().unwrap();
    }
}
