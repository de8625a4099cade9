//! Structured trace records.
//!
//! Every active object reports its notable transitions through an optional
//! [`TraceHook`]. The hook runs on the emitting thread and must not block.

use std::sync::Arc;

use hal::LedColor;
use pq::{Priority, QueueError};

use crate::event::UiEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceRecord {
    UiStarted { generation: u64 },
    UiStopped { generation: u64 },
    EventSent(UiEvent),
    /// The UI mailbox was full and its oldest event was discarded.
    EventDropped(UiEvent),
    RequestQueued { color: LedColor, priority: Priority },
    RequestEvicted { color: LedColor, priority: Priority },
    RequestRejected {
        color: LedColor,
        priority: Priority,
        error: QueueError,
    },
    LedOn(LedColor),
    LedOff(LedColor),
    ButtonClassified(UiEvent),
}

/// Trace hook invoked for every [`TraceRecord`].
pub type TraceHook = Arc<dyn Fn(&TraceRecord) + Send + Sync>;

/// Cloneable handle that forwards records to an optional hook.
#[derive(Clone, Default)]
pub struct Tracer {
    hook: Option<TraceHook>,
}

impl Tracer {
    pub fn new(hook: Option<TraceHook>) -> Self {
        Self { hook }
    }

    pub fn emit(&self, record: TraceRecord) {
        if let Some(hook) = &self.hook {
            hook(&record);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.hook.is_some()
    }
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
