//! # stand-in
//!
//! Runtime test doubles for trait-based capabilities.
//!
//! A test substitutes a fabricated implementation of a trait for the real one,
//! programs canned or computed responses per call, records every call the code
//! under test makes, and afterwards asserts on that history: how often an
//! operation was called, with which arguments, and in which order relative to
//! other operations, including operations of other mocked traits.
//!
//! ## Quick Start
//!
//! ```rust
//! use stand_in::{Method, Mock, Verifier};
//!
//! trait View {
//!     fn display(&self, value: i32) -> bool;
//!     fn error(&self, message: String);
//! }
//!
//! struct MockView {
//!     display: Method<i32, bool>,
//!     error: Method<String, ()>,
//! }
//!
//! impl View for MockView {
//!     fn display(&self, value: i32) -> bool {
//!         self.display.invoke(value)
//!     }
//!
//!     fn error(&self, message: String) {
//!         self.error.invoke(message)
//!     }
//! }
//!
//! fn render_all(view: &dyn View, values: &[i32]) {
//!     for &value in values {
//!         if value < 0 || !view.display(value) {
//!             view.error(format!("cannot display {}", value));
//!         }
//!     }
//! }
//!
//! let mock = Mock::new("View");
//! let view = MockView {
//!     display: mock.method("display").unwrap(),
//!     error: mock.method("error").unwrap(),
//! };
//! view.display.when().always_compute(|v: &i32| v % 2 == 0);
//!
//! render_all(&view, &[2, 4, 3, -1]);
//!
//! let verifier = Verifier::new();
//! verifier.check(view.display.calls().exactly(3));
//! verifier.check(view.error.calls().exactly(2));
//! verifier.check(view.display.calls() * 3 + view.error.calls() * 2);
//! ```
//!
//! The `+` operator means "then" and `* n` means "n times back-to-back". A
//! strict sequence must match the entire history of the operations it
//! mentions; use [`SequenceExpr::in_order`] to allow unrelated calls in
//! between.
//!
//! ## Stubbing
//!
//! Stubs are kept per operation in registration order; the first entry whose
//! matcher accepts the arguments answers the call. Calls nothing matches
//! return `R::default()` (or fail, on a mock built with
//! [`MockBuilder::strict`]).
//!
//! ```rust
//! use stand_in::{InvocationFailure, Mock};
//!
//! let mock = Mock::new("Calculator");
//! let divide = mock.method::<(i32, i32), i32>("divide").unwrap();
//!
//! divide
//!     .when()
//!     .matching(|(_, d): &(i32, i32)| *d == 0)
//!     .always_fail(InvocationFailure::new("division by zero"))
//!     .using(stand_in::ArgMatcher::any())
//!     .always_compute(|(n, d)| n / d);
//!
//! assert_eq!(divide.try_invoke((8, 2)), Ok(4));
//! assert!(divide.try_invoke((1, 0)).is_err());
//! assert_eq!(divide.call_count(), 2);
//! ```
//!
//! ## Verification results
//!
//! [`Verifier::verify`] returns a [`Verdict`] and never panics;
//! [`Verifier::check`] additionally reports failures through a [`Reporter`]
//! ([`PanicReporter`] by default, [`LogReporter`] to emit a `tracing` error
//! instead). A verdict converts into a `Result` for tests that use `?`:
//!
//! ```rust
//! # use stand_in::{Mock, VerificationError};
//! # fn main() -> Result<(), VerificationError> {
//! let mock = Mock::new("Clock");
//! let now = mock.method::<(), u64>("now").unwrap();
//! now.when().returns_each([1, 2, 3]).unwrap();
//!
//! now.invoke(());
//! now.invoke(());
//!
//! stand_in::verify(now.calls().exactly(2)).into_result()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Shared timelines
//!
//! Every mock numbers its calls from a [`Sequencer`]. Mocks that should be
//! verified together in one sequence must share it:
//!
//! ```rust
//! use stand_in::Mock;
//!
//! let model = Mock::new("Model");
//! let view = Mock::builder("View").sharing_timeline_with(&model).build();
//! let load = model.method::<(), i32>("load").unwrap();
//! let show = view.method::<i32, ()>("show").unwrap();
//!
//! let value = load.invoke(());
//! show.invoke(value);
//!
//! assert!(stand_in::verify(load.calls() + show.calls()).passed());
//! ```
//!
//! ## Logging
//!
//! Mocks emit `tracing` events: `trace` for every recorded call, `debug` when
//! a call falls back to the default value or fails, and when stubs are
//! configured or reset. No subscriber is installed by the crate.

// Domain layer - pure values
pub mod domain;

// Application layer - stub tables, recorders, verification
pub mod application;

// Infrastructure layer - mocks, handles and adapters
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    invocation::{CallOutcome, InvocationRecord},
    matcher::{ArgMatcher, ErasedMatcher},
    operation::{Operation, OperationId},
    response::{GeneratorKind, InvocationFailure, ResponseGenerator, SaturatingSequence},
    verdict::{CountBound, Mismatch, VerificationError, Verdict},
};

pub use application::{
    expression::{CallPattern, Expectation, SequenceExpr, SequenceMode},
    metrics::{Metrics, MetricsSnapshot},
    ports::{Reporter, Sequencer},
    verifier::Verifier,
};

pub use infrastructure::{
    method::{Method, Stubbing},
    mock::{ConfigError, Mock, MockBuilder, UnmatchedCallPolicy},
    reporter::{LogReporter, PanicReporter},
    sequencer::MonotonicSequencer,
};

/// Evaluate an expectation without reporting.
///
/// Shorthand for `Verifier::new().verify(expectation)`.
pub fn verify(expectation: impl Into<Expectation>) -> Verdict {
    application::verifier::evaluate(&expectation.into())
}
