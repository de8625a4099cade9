//! UI dispatcher active object.
//!
//! The dispatcher owns a small FIFO mailbox of [`UiEvent`]s, translates each
//! event into an LED request and forwards it into the shared
//! [`PriorityMailbox`]. It is transient: after `idle_timeout` without events
//! the consumer thread closes its mailbox and exits. The next
//! [`UiDispatcher::send`] recreates the mailbox and spawns a fresh consumer.
//!
//! The running state lives in one mutex-guarded slot. A new mailbox is
//! installed under that lock and its consumer thread is spawned after the
//! lock is released; events posted in between wait in the mailbox for it.
//! Retirement happens under the lock and only succeeds on an empty mailbox,
//! so an event can never be stranded in a queue nobody reads.

use std::io;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};
use parking_lot::Mutex;
use pq::PriorityMailbox;

use crate::error::{ActorError, ActorResult};
use crate::event::{LedRequest, UiEvent};
use crate::queue::{EventQueue, PostError};
use crate::trace::{TraceRecord, Tracer};

/// Capacity of the dispatcher's own event mailbox.
pub const UI_QUEUE_LEN: usize = 10;

/// Times `send` re-creates a mailbox that retired underneath it.
const REVIVE_ATTEMPTS: usize = 3;

pub(crate) type UiQueue = EventQueue<UiEvent, UI_QUEUE_LEN>;

pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

/// Starts a named consumer thread running `job`.
pub(crate) type SpawnFn = fn(String, Job) -> io::Result<()>;

fn spawn_thread(name: String, job: Job) -> io::Result<()> {
    thread::Builder::new().name(name).spawn(job).map(|_| ())
}

struct UiState {
    mailbox: Option<UiQueue>,
    generation: u64,
}

struct UiShared {
    state: Mutex<UiState>,
    requests: PriorityMailbox<LedRequest>,
    idle_timeout: Duration,
    tracer: Tracer,
    spawn: SpawnFn,
}

/// Handle to the UI dispatcher. Clones share one dispatcher.
#[derive(Clone)]
pub struct UiDispatcher {
    shared: Arc<UiShared>,
}

impl UiDispatcher {
    /// Creates a stopped dispatcher forwarding into `requests`.
    pub fn new(
        requests: PriorityMailbox<LedRequest>,
        idle_timeout: Duration,
        tracer: Tracer,
    ) -> Self {
        Self::with_spawner(requests, idle_timeout, tracer, spawn_thread)
    }

    pub(crate) fn with_spawner(
        requests: PriorityMailbox<LedRequest>,
        idle_timeout: Duration,
        tracer: Tracer,
        spawn: SpawnFn,
    ) -> Self {
        Self {
            shared: Arc::new(UiShared {
                state: Mutex::new(UiState {
                    mailbox: None,
                    generation: 0,
                }),
                requests,
                idle_timeout,
                tracer,
                spawn,
            }),
        }
    }

    /// Starts the consumer eagerly. Calling it on a running dispatcher is a
    /// no-op.
    pub fn start(&self) -> ActorResult<()> {
        self.ensure_running().map(|_| ())
    }

    /// Posts `event` without blocking.
    ///
    /// A full mailbox sheds its oldest events until this one fits. A retired
    /// dispatcher is restarted first.
    pub fn send(&self, event: UiEvent) -> ActorResult<()> {
        let mut event = event;
        for _ in 0..REVIVE_ATTEMPTS {
            let queue = self.ensure_running()?;
            match post_evicting(&queue, event, &self.shared.tracer) {
                Ok(()) => {
                    debug!("[UI] {event} event queued");
                    self.shared.tracer.emit(TraceRecord::EventSent(event));
                    return Ok(());
                }
                // The consumer retired between lookup and post.
                Err(PostError::Closed(returned)) => event = returned,
                Err(PostError::Full(_)) => return Err(ActorError::MailboxFull),
            }
        }
        Err(ActorError::DispatcherUnavailable)
    }

    /// True while a consumer thread owns a live mailbox.
    pub fn is_running(&self) -> bool {
        self.shared.state.lock().mailbox.is_some()
    }

    /// Number of consumer threads started so far.
    pub fn spawn_count(&self) -> u64 {
        self.shared.state.lock().generation
    }

    /// Events waiting in the dispatcher mailbox.
    pub fn pending(&self) -> usize {
        self.shared
            .state
            .lock()
            .mailbox
            .as_ref()
            .map_or(0, |queue| queue.len())
    }

    pub fn requests(&self) -> &PriorityMailbox<LedRequest> {
        &self.shared.requests
    }

    fn ensure_running(&self) -> ActorResult<UiQueue> {
        let mut state = self.shared.state.lock();
        if let Some(queue) = &state.mailbox {
            return Ok(queue.clone());
        }
        let queue = UiQueue::new();
        state.generation += 1;
        let generation = state.generation;
        state.mailbox = Some(queue.clone());
        drop(state);

        let consumer = self.clone();
        let inbox = queue.clone();
        let spawned = (self.shared.spawn)(
            format!("ao-ui-{generation}"),
            Box::new(move || consumer.run(inbox, generation)),
        );
        if let Err(error) = spawned {
            self.roll_back(&queue, generation);
            warn!("[UI] dispatcher {generation} failed to start: {error}");
            return Err(ActorError::Spawn(error));
        }

        info!("[UI] dispatcher {generation} started");
        self.shared.tracer.emit(TraceRecord::UiStarted { generation });
        Ok(queue)
    }

    /// Undoes the install of a mailbox whose consumer never started.
    fn roll_back(&self, queue: &UiQueue, generation: u64) {
        let mut state = self.shared.state.lock();
        if state
            .mailbox
            .as_ref()
            .is_some_and(|current| current.same_as(queue))
        {
            state.mailbox = None;
            if state.generation == generation {
                state.generation -= 1;
            }
        }
        let discarded = queue.close();
        drop(state);
        if discarded > 0 {
            warn!("[UI] dropped {discarded} events queued for dispatcher {generation}");
        }
    }

    fn run(self, queue: UiQueue, generation: u64) {
        loop {
            match queue.receive_timeout(self.shared.idle_timeout) {
                Some(event) => self.dispatch(event),
                None => {
                    if self.retire(&queue) {
                        break;
                    }
                }
            }
        }
        info!("[UI] idle, dispatcher {generation} stopped");
        self.shared.tracer.emit(TraceRecord::UiStopped { generation });
    }

    /// Closes `queue` and clears the slot, unless events slipped in.
    fn retire(&self, queue: &UiQueue) -> bool {
        let mut state = self.shared.state.lock();
        if !queue.close_if_empty() {
            return false;
        }
        if state
            .mailbox
            .as_ref()
            .is_some_and(|current| current.same_as(queue))
        {
            state.mailbox = None;
        }
        true
    }

    fn dispatch(&self, event: UiEvent) {
        let (request, priority) = event.to_request();
        let color = request.color;
        let tracer = &self.shared.tracer;

        match self.shared.requests.insert(request, priority) {
            Ok(evicted) => {
                info!("[UI] {event}: {color} request sent at {priority} priority");
                tracer.emit(TraceRecord::RequestQueued { color, priority });
                if let Some((lost, lost_priority)) = evicted {
                    warn!("[UI] LED mailbox full, dropped {} request", lost.color);
                    tracer.emit(TraceRecord::RequestEvicted {
                        color: lost.color,
                        priority: lost_priority,
                    });
                }
            }
            Err(error) => {
                warn!("[UI] {event}: {color} request not sent: {error}");
                tracer.emit(TraceRecord::RequestRejected {
                    color,
                    priority,
                    error,
                });
            }
        }
    }
}

/// Posts `event`, discarding the oldest pending events while the queue is
/// full. Gives up after `N + 1` attempts.
pub(crate) fn post_evicting<const N: usize>(
    queue: &EventQueue<UiEvent, N>,
    event: UiEvent,
    tracer: &Tracer,
) -> Result<(), PostError<UiEvent>> {
    let mut event = event;
    for _ in 0..=N {
        match queue.try_post(event) {
            Ok(()) => return Ok(()),
            Err(PostError::Full(returned)) => {
                if let Some(dropped) = queue.drop_oldest() {
                    warn!("[UI] mailbox full, dropped oldest {dropped} event");
                    tracer.emit(TraceRecord::EventDropped(dropped));
                }
                event = returned;
            }
            Err(closed) => return Err(closed),
        }
    }
    Err(PostError::Full(event))
}
