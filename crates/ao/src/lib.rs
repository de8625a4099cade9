//! Active objects for the button/LED application.
//!
//! Three workers cooperate through two mailboxes:
//!
//! ```text
//! ButtonSampler -> UiDispatcher mailbox -> UiDispatcher -> PriorityMailbox -> LedActor -> LEDs
//! ```
//!
//! The [`ButtonSampler`] classifies presses into [`UiEvent`]s. The transient
//! [`UiDispatcher`] turns each event into a colored [`LedRequest`] with a
//! priority. The [`LedActor`] lights one LED at a time in priority order.
//! [`App`] wires everything from a [`SystemConfig`].

pub mod app;
pub mod button;
pub mod config;
pub mod error;
pub mod event;
pub mod led;
pub mod queue;
pub mod trace;
pub mod ui;

pub use app::{App, AppBuilder};
pub use button::{ButtonSampler, Debouncer, EventSink, SamplerHandle};
pub use config::{ConfigError, SystemConfig, SystemConfigBuilder};
pub use error::{ActorError, ActorResult};
pub use event::{LedAction, LedRequest, UiEvent};
pub use led::LedActor;
pub use queue::{EventQueue, PostError};
pub use trace::{TraceHook, TraceRecord, Tracer};
pub use ui::{UiDispatcher, UI_QUEUE_LEN};

#[cfg(test)]
mod tests;
