mod ui;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use hal::{HalResult, LedColor, LedOutput};
use parking_lot::Mutex;

use crate::trace::{TraceRecord, Tracer};

/// LED double recording every `set` call.
#[derive(Clone, Default)]
struct RecordingLeds {
    calls: Arc<Mutex<Vec<(LedColor, bool)>>>,
}

impl RecordingLeds {
    fn calls(&self) -> Vec<(LedColor, bool)> {
        self.calls.lock().clone()
    }
}

impl LedOutput for RecordingLeds {
    fn set(&mut self, color: LedColor, asserted: bool) -> HalResult<()> {
        self.calls.lock().push((color, asserted));
        Ok(())
    }
}

/// Tracer collecting records for later inspection.
fn recording_tracer() -> (Tracer, Arc<Mutex<Vec<TraceRecord>>>) {
    let records = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&records);
    let tracer = Tracer::new(Some(Arc::new(move |record: &TraceRecord| {
        sink.lock().push(record.clone());
    })));
    (tracer, records)
}

/// Polls `condition` until it holds or five seconds pass.
fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}
