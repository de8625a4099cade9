//! Button sampling and gesture classification.
//!
//! [`Debouncer`] accumulates held time once per sampling period and
//! classifies it on release. [`ButtonSampler`] pairs it with a
//! [`ButtonInput`] and an [`EventSink`], and can run on its own thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use hal::ButtonInput;
use log::{info, warn};

use crate::config::SystemConfig;
use crate::error::{ActorError, ActorResult};
use crate::event::UiEvent;
use crate::trace::{TraceRecord, Tracer};
use crate::ui::UiDispatcher;

/// Held-duration state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debouncer {
    elapsed: Duration,
    period: Duration,
    pulse: Duration,
    short: Duration,
    long: Duration,
}

impl Debouncer {
    pub fn new(period: Duration, pulse: Duration, short: Duration, long: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            period,
            pulse,
            short,
            long,
        }
    }

    pub fn from_config(config: &SystemConfig) -> Self {
        Self::new(
            config.button_period,
            config.pulse_threshold,
            config.short_threshold,
            config.long_threshold,
        )
    }

    /// Feeds one sample. Returns the gesture completed by a release, if any.
    pub fn sample(&mut self, pressed: bool) -> Option<UiEvent> {
        if pressed {
            self.elapsed = self.elapsed.saturating_add(self.period);
            return None;
        }
        let held = core::mem::take(&mut self.elapsed);
        self.classify(held)
    }

    /// The largest threshold met wins.
    pub fn classify(&self, held: Duration) -> Option<UiEvent> {
        if held >= self.long {
            Some(UiEvent::Long)
        } else if held >= self.short {
            Some(UiEvent::Short)
        } else if held >= self.pulse {
            Some(UiEvent::Pulse)
        } else {
            None
        }
    }

    /// Time accumulated in the current press.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

/// Destination for classified gestures.
pub trait EventSink: Send + Sync {
    fn send(&self, event: UiEvent) -> ActorResult<()>;
}

impl EventSink for UiDispatcher {
    fn send(&self, event: UiEvent) -> ActorResult<()> {
        UiDispatcher::send(self, event)
    }
}

pub struct ButtonSampler<B, S> {
    input: B,
    sink: S,
    debouncer: Debouncer,
    tracer: Tracer,
}

impl<B, S> ButtonSampler<B, S>
where
    B: ButtonInput,
    S: EventSink,
{
    pub fn new(input: B, sink: S, debouncer: Debouncer, tracer: Tracer) -> Self {
        Self {
            input,
            sink,
            debouncer,
            tracer,
        }
    }

    /// Reads the button once and forwards a completed gesture.
    pub fn poll(&mut self) -> Option<UiEvent> {
        let pressed = self.input.read_pressed();
        let event = self.debouncer.sample(pressed)?;

        self.tracer.emit(TraceRecord::ButtonClassified(event));
        match self.sink.send(event) {
            Ok(()) => info!("[BUTTON] {event} press sent"),
            Err(error) => warn!("[BUTTON] {event} press lost: {error}"),
        }
        Some(event)
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }
}

impl<B, S> ButtonSampler<B, S>
where
    B: ButtonInput + 'static,
    S: EventSink + 'static,
{
    /// Runs [`poll`](Self::poll) every sampling period on a new thread.
    pub fn spawn(mut self) -> ActorResult<SamplerHandle> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let period = self.debouncer.period();

        let join = thread::Builder::new()
            .name("ao-button".into())
            .spawn(move || {
                while !flag.load(Ordering::Acquire) {
                    self.poll();
                    thread::sleep(period);
                }
            })
            .map_err(ActorError::Spawn)?;

        Ok(SamplerHandle { stop, join })
    }
}

/// Owner of a running sampler thread.
pub struct SamplerHandle {
    stop: Arc<AtomicBool>,
    join: JoinHandle<()>,
}

impl SamplerHandle {
    /// Stops sampling and waits for the thread to exit.
    pub fn stop(self) {
        self.stop.store(true, Ordering::Release);
        if self.join.join().is_err() {
            warn!("[BUTTON] sampler thread panicked");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}
