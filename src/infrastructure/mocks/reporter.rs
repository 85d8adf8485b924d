//! Capturing reporter for testing.

use crate::application::ports::Reporter;
use crate::domain::verdict::Verdict;
use std::sync::{Arc, Mutex};

/// Reporter that stores failed verdicts instead of acting on them.
///
/// Clones share the same storage, so a test can keep one handle and give the
/// other to a `Verifier`.
#[derive(Debug, Clone, Default)]
pub struct CapturingReporter {
    reported: Arc<Mutex<Vec<Verdict>>>,
}

impl CapturingReporter {
    /// Create a reporter with nothing captured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every verdict reported so far, oldest first.
    pub fn reported(&self) -> Vec<Verdict> {
        self.reported
            .lock()
            .expect("CapturingReporter mutex poisoned - a test thread panicked while holding the lock")
            .clone()
    }

    /// Number of verdicts reported so far.
    pub fn count(&self) -> usize {
        self.reported
            .lock()
            .expect("CapturingReporter mutex poisoned - a test thread panicked while holding the lock")
            .len()
    }
}

impl Reporter for CapturingReporter {
    fn report_failure(&self, verdict: &Verdict) {
        self.reported
            .lock()
            .expect("CapturingReporter mutex poisoned - a test thread panicked while holding the lock")
            .push(verdict.clone());
    }
}
