//! LED active object.
//!
//! A single worker blocks on the priority mailbox and drives one LED
//! channel per request: on for `on_duration`, then off again. Requests are
//! served strictly in mailbox rank order, one at a time.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use hal::{LedColor, LedOutput};
use log::{debug, info, warn};
use parking_lot::Mutex;
use pq::{PriorityMailbox, QueueError};

use crate::error::ActorResult;
use crate::event::{LedAction, LedRequest};
use crate::trace::{TraceRecord, Tracer};

struct LedShared {
    leds: Mutex<Box<dyn LedOutput>>,
    requests: PriorityMailbox<LedRequest>,
    on_duration: Duration,
    poll_timeout: Duration,
    running: AtomicBool,
    workers: AtomicUsize,
    tracer: Tracer,
}

#[derive(Clone)]
pub struct LedActor {
    shared: Arc<LedShared>,
}

impl LedActor {
    pub fn new<L>(
        leds: L,
        requests: PriorityMailbox<LedRequest>,
        on_duration: Duration,
        poll_timeout: Duration,
        tracer: Tracer,
    ) -> Self
    where
        L: LedOutput + 'static,
    {
        Self {
            shared: Arc::new(LedShared {
                leds: Mutex::new(Box::new(leds)),
                requests,
                on_duration,
                poll_timeout,
                running: AtomicBool::new(false),
                workers: AtomicUsize::new(0),
                tracer,
            }),
        }
    }

    /// Spawns the worker. Returns `Ok` without spawning if one is already
    /// running.
    pub fn start(&self) -> ActorResult<()> {
        if self
            .shared
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("[LED] already running");
            return Ok(());
        }

        let worker = self.clone();
        match thread::Builder::new()
            .name("ao-led".into())
            .spawn(move || worker.run())
        {
            Ok(_) => {
                self.shared.workers.fetch_add(1, Ordering::Relaxed);
                info!("[LED] started");
                Ok(())
            }
            Err(error) => {
                self.shared.running.store(false, Ordering::Release);
                Err(error.into())
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Worker threads spawned over the actor's lifetime.
    pub fn worker_count(&self) -> usize {
        self.shared.workers.load(Ordering::Relaxed)
    }

    pub fn requests(&self) -> &PriorityMailbox<LedRequest> {
        &self.shared.requests
    }

    fn run(self) {
        loop {
            match self.shared.requests.extract_timeout(self.shared.poll_timeout) {
                Ok((request, _)) => self.drive(request),
                Err(QueueError::Empty) => {}
                Err(QueueError::InvalidHandle) => break,
                Err(error) => {
                    warn!("[LED] extract failed: {error}");
                    thread::sleep(self.shared.poll_timeout);
                }
            }
        }
        self.shared.running.store(false, Ordering::Release);
        info!("[LED] mailbox destroyed, stopped");
    }

    fn drive(&self, request: LedRequest) {
        let color = request.color;
        match request.action {
            LedAction::On => {
                self.set(color, true);
                thread::sleep(self.shared.on_duration);
                self.set(color, false);
            }
            LedAction::Off => self.set(color, false),
        }
    }

    fn set(&self, color: LedColor, asserted: bool) {
        let result = self.shared.leds.lock().set(color, asserted);
        if let Err(error) = result {
            warn!("[LED] failed to drive {color}: {error}");
            return;
        }
        if asserted {
            info!("[LED] {color} on");
            self.shared.tracer.emit(TraceRecord::LedOn(color));
        } else {
            info!("[LED] {color} off");
            self.shared.tracer.emit(TraceRecord::LedOff(color));
        }
    }
}
