//! Queue failure values.

use thiserror::Error;

/// Errors returned by the priority queue strategies and the mailbox.
///
/// Every failing operation leaves the queue exactly as it was before the call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// Backing storage could not be reserved.
    #[error("allocation failure")]
    AllocationFailure,
    /// The queue is full and eviction is disabled.
    #[error("queue capacity exceeded")]
    CapacityExceeded,
    /// Nothing to extract.
    #[error("queue is empty")]
    Empty,
    /// The mailbox handle has been destroyed.
    #[error("invalid or destroyed queue handle")]
    InvalidHandle,
    /// A queue must hold at least two entries.
    #[error("invalid queue capacity: {0}")]
    InvalidCapacity(usize),
}

pub type QueueResult<T> = Result<T, QueueError>;

/// Minimum capacity accepted by every strategy.
pub(crate) const MIN_CAPACITY: usize = 2;

pub(crate) fn check_capacity(capacity: usize) -> QueueResult<()> {
    if capacity < MIN_CAPACITY {
        Err(QueueError::InvalidCapacity(capacity))
    } else {
        Ok(())
    }
}
