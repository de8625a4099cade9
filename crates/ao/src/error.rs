use pq::QueueError;
use thiserror::Error;

pub use crate::config::ConfigError;

pub type ActorResult<T> = Result<T, ActorError>;

/// Errors raised while starting or talking to the active objects.
#[derive(Error, Debug)]
pub enum ActorError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("priority mailbox error: {0}")]
    Queue(#[from] QueueError),
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("UI mailbox stayed full after evicting every queued event")]
    MailboxFull,
    #[error("UI dispatcher could not be started")]
    DispatcherUnavailable,
}
