//! Common error types for HAL operations

use embedded_hal::digital::ErrorKind;
use thiserror::Error;

/// HAL operation errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError {
    /// The pin driver reported a failure
    #[error("pin error: {0:?}")]
    Pin(ErrorKind),
}

impl HalError {
    pub(crate) fn from_pin<E: embedded_hal::digital::Error>(err: E) -> Self {
        Self::Pin(err.kind())
    }
}

/// Result type for HAL operations
pub type HalResult<T> = Result<T, HalError>;
