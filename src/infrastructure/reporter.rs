//! Reporter implementations.
//!
//! How a failed verification reaches the host test runner.

use crate::application::ports::Reporter;
use crate::application::verifier::Verifier;
use crate::domain::verdict::Verdict;
use std::sync::Arc;

/// Turns every reported failure into an assertion panic.
///
/// This is what `Verifier::default()` uses, so `check` behaves like
/// `assert!` inside `#[test]` functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanicReporter;

impl Reporter for PanicReporter {
    fn report_failure(&self, verdict: &Verdict) {
        panic!("{}", verdict);
    }
}

impl Verifier {
    /// A verifier that turns failed checks into assertion panics.
    pub fn new() -> Self {
        Self::with_reporter(Arc::new(PanicReporter))
    }
}

impl Default for Verifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Emits every reported failure as a `tracing` error event and carries on.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report_failure(&self, verdict: &Verdict) {
        tracing::error!(
            expectation = verdict.expectation(),
            position = verdict.position(),
            actual_calls = verdict.actual().len(),
            "{}",
            verdict
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::verdict::Mismatch;
    use crate::infrastructure::mocks::MockCaptureLayer;
    use tracing::Level;
    use tracing_subscriber::layer::SubscriberExt;

    fn failed() -> Verdict {
        Verdict::fail(
            "View::display called exactly 1 time",
            Mismatch {
                reason: "expected View::display exactly 1 time, but found 0 calls".to_string(),
                position: None,
                actual: Vec::new(),
            },
        )
    }

    #[test]
    #[should_panic(expected = "but found 0 calls")]
    fn test_panic_reporter() {
        PanicReporter.report_failure(&failed());
    }

    #[test]
    fn test_log_reporter_emits_error() {
        let capture = MockCaptureLayer::new();
        let subscriber = tracing_subscriber::registry().with(capture.clone());

        tracing::subscriber::with_default(subscriber, || {
            LogReporter.report_failure(&failed());
        });

        let events = capture.get_captured();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::ERROR);
        assert!(events[0].message.contains("verification failed"));
        assert_eq!(
            events[0].field("expectation"),
            Some("View::display called exactly 1 time")
        );
    }
}
