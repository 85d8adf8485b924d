//! Sequencer implementations.

use crate::application::ports::Sequencer;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-local monotonic counter.
///
/// Numbers start at 1, so `current() == 0` means nothing was issued yet.
#[derive(Debug, Default)]
pub struct MonotonicSequencer {
    last: AtomicU64,
}

impl MonotonicSequencer {
    /// Create a sequencer whose first number is 1.
    pub fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }
}

impl Sequencer for MonotonicSequencer {
    fn advance(&self) -> u64 {
        self.last.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn current(&self) -> u64 {
        self.last.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_numbers_start_at_one() {
        let sequencer = MonotonicSequencer::new();
        assert_eq!(sequencer.current(), 0);
        assert_eq!(sequencer.advance(), 1);
        assert_eq!(sequencer.advance(), 2);
        assert_eq!(sequencer.current(), 2);
    }

    #[test]
    fn test_concurrent_advance_is_unique() {
        let sequencer = Arc::new(MonotonicSequencer::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let sequencer = Arc::clone(&sequencer);
                thread::spawn(move || (0..250).map(|_| sequencer.advance()).collect::<Vec<_>>())
            })
            .collect();

        let mut issued: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        issued.sort_unstable();
        issued.dedup();
        assert_eq!(issued.len(), 1000);
        assert_eq!(sequencer.current(), 1000);
    }
}
