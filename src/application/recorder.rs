//! Call recording.
//!
//! Each operation owns one append-only [`CallRecorder`]. Records carry sequence
//! numbers from the capability's shared [`Sequencer`], so histories of several
//! recorders merge back into call order with [`merge_histories`].

use crate::application::ports::Sequencer;
use crate::domain::invocation::InvocationRecord;
use std::sync::{Arc, Mutex, MutexGuard};

/// Append-only log of the invocations of one operation.
#[derive(Debug)]
pub struct CallRecorder {
    records: Mutex<Vec<InvocationRecord>>,
    timeline: Arc<dyn Sequencer>,
}

impl CallRecorder {
    /// Create an empty recorder on the given timeline.
    pub fn new(timeline: Arc<dyn Sequencer>) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            timeline,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<InvocationRecord>> {
        self.records
            .lock()
            .expect("CallRecorder mutex poisoned - a test thread panicked while recording a call")
    }

    /// Append a record, keeping the log ordered by sequence number.
    ///
    /// A call made from inside a computed response finishes first but
    /// carries the later number, so it is placed after its caller.
    pub fn record(&self, record: InvocationRecord) {
        let mut records = self.lock();
        let at = records.partition_point(|r| r.sequence() <= record.sequence());
        records.insert(at, record);
    }

    /// Snapshot of the recorded calls, in call order.
    pub fn history(&self) -> Vec<InvocationRecord> {
        self.lock().clone()
    }

    /// Number of recorded calls.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no call was recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every record.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Whether two recorders draw sequence numbers from the same sequencer.
    pub fn shares_timeline_with(&self, other: &CallRecorder) -> bool {
        same_timeline(&self.timeline, &other.timeline)
    }
}

/// Whether two sequencer handles point at the same sequencer.
pub fn same_timeline(a: &Arc<dyn Sequencer>, b: &Arc<dyn Sequencer>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

/// Merge the histories of several recorders, ordered by sequence number.
///
/// Recorders that appear more than once are only read once.
pub fn merge_histories<'a, I>(recorders: I) -> Vec<InvocationRecord>
where
    I: IntoIterator<Item = &'a Arc<CallRecorder>>,
{
    let mut seen: Vec<*const CallRecorder> = Vec::new();
    let mut merged = Vec::new();
    for recorder in recorders {
        let ptr = Arc::as_ptr(recorder);
        if seen.contains(&ptr) {
            continue;
        }
        seen.push(ptr);
        merged.extend(recorder.history());
    }
    merged.sort_by_key(|record| record.sequence());
    merged
}
