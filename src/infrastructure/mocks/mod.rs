//! Test helpers.
//!
//! Doubles for the crate's own ports and a tracing layer that captures the
//! events mocks emit.

pub mod layer;
pub mod reporter;

pub use layer::{CapturedEvent, MockCaptureLayer};
pub use reporter::CapturingReporter;
