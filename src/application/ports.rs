//! Ports (interfaces) for the application layer.
//!
//! Infrastructure adapters implement these ports; the stub/record/verify logic
//! only sees the traits.

use crate::domain::verdict::Verdict;
use std::fmt::Debug;

/// Port for issuing invocation sequence numbers.
///
/// One sequencer is shared by every operation of a capability, so the calls of
/// different operations can be put back in temporal order. Capabilities built
/// with the same sequencer share a timeline and can be verified together.
/// Infrastructure provides `MonotonicSequencer`.
pub trait Sequencer: Send + Sync + Debug {
    /// Issue the next sequence number. Numbers are strictly increasing.
    fn advance(&self) -> u64;

    /// The most recently issued number, or 0 if none was issued yet.
    fn current(&self) -> u64;
}

/// Port for surfacing failed verifications to the host test runner.
///
/// Infrastructure provides `PanicReporter` (assertion failure) and
/// `LogReporter` (tracing event).
pub trait Reporter: Send + Sync + Debug {
    /// Called once for every failed verdict passed through `Verifier::check`.
    fn report_failure(&self, verdict: &Verdict);
}
