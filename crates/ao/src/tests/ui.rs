use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use hal::LedColor;
use parking_lot::Mutex;
use pq::{Overflow, Priority, PriorityMailbox, QueueError, Strategy};

use super::{recording_tracer, wait_until};
use crate::error::ActorError;
use crate::event::{LedRequest, UiEvent};
use crate::queue::EventQueue;
use crate::trace::{TraceRecord, Tracer};
use crate::ui::{post_evicting, Job, UiDispatcher, UI_QUEUE_LEN};

fn mailbox(capacity: usize) -> PriorityMailbox<LedRequest> {
    PriorityMailbox::create(capacity, Strategy::Heap, Overflow::Reject).unwrap()
}

#[test]
fn dispatcher_starts_lazily_on_first_event() {
    let requests = mailbox(10);
    let ui = UiDispatcher::new(requests.clone(), Duration::from_secs(5), Tracer::default());
    assert!(!ui.is_running());
    assert_eq!(ui.spawn_count(), 0);

    ui.send(UiEvent::Long).unwrap();
    assert!(ui.is_running());
    assert!(wait_until(|| requests.size() == 1));
    assert_eq!(
        requests.extract(),
        Ok((LedRequest::on(LedColor::Blue), Priority::Low))
    );
}

#[test]
fn start_is_idempotent() {
    let ui = UiDispatcher::new(mailbox(4), Duration::from_secs(5), Tracer::default());
    ui.start().unwrap();
    ui.start().unwrap();
    assert_eq!(ui.spawn_count(), 1);
}

#[test]
fn idle_dispatcher_retires_and_revives_on_send() {
    let requests = mailbox(10);
    let (tracer, records) = recording_tracer();
    let ui = UiDispatcher::new(requests.clone(), Duration::from_millis(30), tracer);

    ui.start().unwrap();
    assert!(wait_until(|| !ui.is_running()));
    assert_eq!(requests.size(), 0);

    ui.send(UiEvent::Pulse).unwrap();
    assert!(wait_until(|| requests.size() == 1));
    assert_eq!(
        requests.extract(),
        Ok((LedRequest::on(LedColor::Red), Priority::High))
    );
    assert_eq!(ui.spawn_count(), 2);

    // Delivered exactly once.
    thread::sleep(Duration::from_millis(60));
    assert_eq!(requests.extract(), Err(QueueError::Empty));

    assert!(wait_until(|| !ui.is_running()));
    let records = records.lock();
    assert!(records.contains(&TraceRecord::UiStopped { generation: 1 }));
    assert!(records.contains(&TraceRecord::UiStarted { generation: 2 }));
    assert!(records.contains(&TraceRecord::RequestQueued {
        color: LedColor::Red,
        priority: Priority::High,
    }));
}

#[test]
fn full_event_queue_drops_oldest() {
    let queue: EventQueue<UiEvent, 2> = EventQueue::new();
    let (tracer, records) = recording_tracer();
    queue.try_post(UiEvent::Pulse).unwrap();
    queue.try_post(UiEvent::Short).unwrap();

    post_evicting(&queue, UiEvent::Long, &tracer).unwrap();

    assert_eq!(queue.drop_oldest(), Some(UiEvent::Short));
    assert_eq!(queue.drop_oldest(), Some(UiEvent::Long));
    assert_eq!(*records.lock(), vec![TraceRecord::EventDropped(UiEvent::Pulse)]);
}

#[test]
fn full_priority_mailbox_rejects_and_traces() {
    let requests = mailbox(2);
    let (tracer, records) = recording_tracer();
    let ui = UiDispatcher::new(requests.clone(), Duration::from_secs(5), tracer);

    for _ in 0..3 {
        ui.send(UiEvent::Short).unwrap();
    }
    assert!(wait_until(|| {
        records
            .lock()
            .iter()
            .any(|record| matches!(record, TraceRecord::RequestRejected { .. }))
    }));
    assert_eq!(requests.size(), 2);
    assert!(records.lock().contains(&TraceRecord::RequestRejected {
        color: LedColor::Green,
        priority: Priority::Medium,
        error: QueueError::CapacityExceeded,
    }));
}

#[test]
fn evicting_priority_mailbox_keeps_higher_requests() {
    let requests = PriorityMailbox::create(2, Strategy::List, Overflow::EvictLowest).unwrap();
    let (tracer, records) = recording_tracer();
    let ui = UiDispatcher::new(requests.clone(), Duration::from_secs(5), tracer);

    ui.send(UiEvent::Long).unwrap();
    ui.send(UiEvent::Short).unwrap();
    ui.send(UiEvent::Pulse).unwrap();

    assert!(wait_until(|| {
        records
            .lock()
            .iter()
            .any(|record| matches!(record, TraceRecord::RequestEvicted { .. }))
    }));
    assert_eq!(
        requests.extract(),
        Ok((LedRequest::on(LedColor::Red), Priority::High))
    );
    assert_eq!(
        requests.extract(),
        Ok((LedRequest::on(LedColor::Green), Priority::Medium))
    );
    assert!(records.lock().contains(&TraceRecord::RequestEvicted {
        color: LedColor::Blue,
        priority: Priority::Low,
    }));
}

#[test]
fn concurrent_senders_lose_nothing_silently() {
    let requests = mailbox(64);
    let (tracer, records) = recording_tracer();
    let ui = UiDispatcher::new(requests.clone(), Duration::from_millis(20), tracer);

    let senders: Vec<_> = (0..4)
        .map(|_| {
            let ui = ui.clone();
            thread::spawn(move || {
                for _ in 0..5 {
                    ui.send(UiEvent::Short).unwrap();
                    thread::sleep(Duration::from_millis(3));
                }
            })
        })
        .collect();
    for sender in senders {
        sender.join().unwrap();
    }

    let accounted = || {
        records
            .lock()
            .iter()
            .filter(|record| {
                matches!(
                    record,
                    TraceRecord::RequestQueued { .. } | TraceRecord::EventDropped(_)
                )
            })
            .count()
    };
    assert!(wait_until(|| accounted() == 20));
    let sent = records
        .lock()
        .iter()
        .filter(|record| matches!(record, TraceRecord::EventSent(_)))
        .count();
    assert_eq!(sent, 20);
    assert!(requests.size() <= 20);
}

fn refuse_spawn(_name: String, _job: Job) -> io::Result<()> {
    Err(io::Error::new(io::ErrorKind::Other, "thread limit reached"))
}

#[test]
fn failed_spawn_leaves_dispatcher_stopped() {
    let requests = mailbox(4);
    let ui = UiDispatcher::with_spawner(
        requests.clone(),
        Duration::from_secs(5),
        Tracer::default(),
        refuse_spawn,
    );

    assert!(matches!(ui.start(), Err(ActorError::Spawn(_))));
    assert!(!ui.is_running());
    assert_eq!(ui.spawn_count(), 0);
    assert_eq!(ui.pending(), 0);

    assert!(matches!(ui.send(UiEvent::Pulse), Err(ActorError::Spawn(_))));
    assert!(!ui.is_running());
    assert!(requests.is_empty());
}

#[test]
fn send_sheds_oldest_events_while_consumer_is_busy() {
    let gate = Arc::new(Mutex::new(()));
    let dispatched = Arc::new(AtomicUsize::new(0));
    let records = Arc::new(Mutex::new(Vec::new()));
    let tracer = {
        let gate = Arc::clone(&gate);
        let dispatched = Arc::clone(&dispatched);
        let records = Arc::clone(&records);
        Tracer::new(Some(Arc::new(move |record: &TraceRecord| {
            records.lock().push(record.clone());
            if matches!(record, TraceRecord::RequestQueued { .. }) {
                dispatched.fetch_add(1, Ordering::SeqCst);
                // The consumer stalls here while the test holds the gate.
                drop(gate.lock());
            }
        })))
    };
    let requests = mailbox(64);
    let ui = UiDispatcher::new(requests, Duration::from_secs(5), tracer);

    let held = gate.lock();
    ui.send(UiEvent::Long).unwrap();
    assert!(wait_until(|| dispatched.load(Ordering::SeqCst) == 1));

    for _ in 0..UI_QUEUE_LEN + 2 {
        ui.send(UiEvent::Short).unwrap();
    }
    assert_eq!(ui.pending(), UI_QUEUE_LEN);
    let dropped = records
        .lock()
        .iter()
        .filter(|record| **record == TraceRecord::EventDropped(UiEvent::Short))
        .count();
    assert_eq!(dropped, 2);

    drop(held);
    assert!(wait_until(|| dispatched.load(Ordering::SeqCst) == 1 + UI_QUEUE_LEN));
    assert_eq!(ui.requests().size(), 1 + UI_QUEUE_LEN);
    assert_eq!(ui.pending(), 0);
}
