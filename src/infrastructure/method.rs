//! Typed handles for mocked operations.
//!
//! A [`Method<A, R>`] is the test-facing side of one operation: `A` is the
//! argument (a tuple for several arguments, `()` for none) and `R` the return
//! type. The trait implementation of a mock forwards every call to
//! [`Method::invoke`] (or [`Method::try_invoke`] for fallible signatures);
//! tests configure responses with [`Method::when`] and reference calls in
//! verification expressions with [`Method::calls`].

use crate::application::expression::CallPattern;
use crate::application::recorder::CallRecorder;
use crate::application::stub_table::{Resolution, StubTable};
use crate::domain::invocation::{CallOutcome, InvocationRecord};
use crate::domain::matcher::ArgMatcher;
use crate::domain::operation::Operation;
use crate::domain::response::{InvocationFailure, ResponseGenerator, SaturatingSequence};
use crate::infrastructure::mock::{CapabilityContext, ConfigError, UnmatchedCallPolicy};
use crate::infrastructure::registry::OperationSlot;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// Handle to one mocked operation.
///
/// Clones refer to the same stub table and call history.
pub struct Method<A, R> {
    inner: Arc<MethodInner<A, R>>,
}

struct MethodInner<A, R> {
    operation: Operation,
    stubs: Mutex<StubTable<A, R>>,
    recorder: Arc<CallRecorder>,
    context: Arc<CapabilityContext>,
}

impl<A, R> MethodInner<A, R> {
    fn lock_stubs(&self) -> MutexGuard<'_, StubTable<A, R>> {
        self.stubs
            .lock()
            .expect("StubTable mutex poisoned - a test thread panicked while resolving a call")
    }
}

impl<A, R> MethodInner<A, R>
where
    A: fmt::Debug,
    R: Clone + Default,
{
    fn configure(&self, matcher: ArgMatcher<A>, generator: ResponseGenerator<A, R>) {
        let matcher_description = matcher.describe();
        let kind = generator.kind();
        let entry = self.lock_stubs().configure(matcher, generator);
        tracing::debug!(
            operation = %self.operation,
            entry,
            matcher = %matcher_description,
            generator = %kind,
            "stub configured"
        );
    }
}

impl<A, R> Method<A, R>
where
    A: Clone + fmt::Debug + Send + Sync + 'static,
    R: Clone + Default + Send + 'static,
{
    pub(crate) fn new(operation: Operation, context: Arc<CapabilityContext>) -> Self {
        let recorder = Arc::new(CallRecorder::new(Arc::clone(&context.sequencer)));
        Self {
            inner: Arc::new(MethodInner {
                operation,
                stubs: Mutex::new(StubTable::new()),
                recorder,
                context,
            }),
        }
    }

    pub(crate) fn slot(&self) -> Arc<dyn OperationSlot> {
        Arc::clone(&self.inner) as Arc<dyn OperationSlot>
    }

    /// Identity and signature of the operation.
    pub fn operation(&self) -> &Operation {
        &self.inner.operation
    }

    /// Start configuring stubs. Entries apply to any arguments until
    /// restricted with [`Stubbing::using`] and friends.
    pub fn when(&self) -> Stubbing<A, R> {
        Stubbing {
            method: self.clone(),
            matcher: ArgMatcher::any(),
        }
    }

    /// Accept any call and answer with the default value, recording as usual.
    pub fn fake(&self) -> &Self {
        self.when().always_default();
        self
    }

    /// Drop every configured stub, then start configuring afresh.
    ///
    /// The only way for a new unconstrained stub to take over from an
    /// earlier one.
    pub fn restub(&self) -> Stubbing<A, R> {
        self.reset_stubs();
        self.when()
    }

    /// Drop every configured stub. History is kept.
    pub fn reset_stubs(&self) {
        self.inner.lock_stubs().clear();
        tracing::debug!(operation = %self.inner.operation, "stubs reset");
    }

    fn configure(&self, matcher: ArgMatcher<A>, generator: ResponseGenerator<A, R>) {
        self.inner.configure(matcher, generator);
    }

    /// Answer a call, panicking if the operation fails.
    ///
    /// Use [`Method::try_invoke`] for operations whose signature can report
    /// failure.
    ///
    /// # Panics
    ///
    /// When a computed response fails, or when no stub matches on a strict
    /// mock.
    pub fn invoke(&self, arguments: A) -> R {
        match self.try_invoke(arguments) {
            Ok(value) => value,
            Err(failure) => panic!("{}", failure),
        }
    }

    /// Answer a call.
    ///
    /// Every call is recorded exactly once, before the result is returned,
    /// whether a stub matched, the default was used or the call failed.
    ///
    /// # Errors
    ///
    /// Returns the failure of a computed response, or a failure describing
    /// the unmatched call under `UnmatchedCallPolicy::Fail`.
    pub fn try_invoke(&self, arguments: A) -> Result<R, InvocationFailure> {
        let inner = &*self.inner;
        let sequence = inner.context.sequencer.advance();
        let snapshot = inner.lock_stubs().snapshot();
        let found = snapshot.first_match(&arguments);
        let resolution = inner.lock_stubs().respond(found);

        let (result, outcome) = match resolution {
            Resolution::Value { entry, value } => (Ok(value), CallOutcome::Stubbed { entry }),
            Resolution::Computed { entry, compute } => match compute(&arguments) {
                Ok(value) => (Ok(value), CallOutcome::Stubbed { entry }),
                Err(failure) => (
                    Err(failure.for_operation(&inner.operation)),
                    CallOutcome::Failed,
                ),
            },
            Resolution::Unmatched => match inner.context.policy {
                UnmatchedCallPolicy::ReturnDefault => (Ok(R::default()), CallOutcome::Defaulted),
                UnmatchedCallPolicy::Fail => (
                    Err(InvocationFailure::new(format!(
                        "no stub matches {:?} on a strict mock",
                        arguments
                    ))
                    .for_operation(&inner.operation)),
                    CallOutcome::Failed,
                ),
            },
        };

        let record = InvocationRecord::new(inner.operation.clone(), arguments, sequence, outcome);
        tracing::trace!(
            operation = %inner.operation,
            sequence,
            outcome = ?outcome,
            "call recorded"
        );

        match outcome {
            CallOutcome::Stubbed { .. } => inner.context.metrics.record_stubbed(),
            CallOutcome::Defaulted => {
                inner.context.metrics.record_defaulted();
                tracing::debug!(
                    operation = %inner.operation,
                    arguments = record.rendered_arguments(),
                    "no stub matched, returning the default value"
                );
            }
            CallOutcome::Failed => {
                inner.context.metrics.record_failed();
                if let Err(failure) = &result {
                    tracing::debug!(
                        operation = %inner.operation,
                        arguments = record.rendered_arguments(),
                        error = %failure,
                        "mocked call failed"
                    );
                }
            }
        }

        inner.recorder.record(record);
        result
    }

    /// Recorded calls of this operation, oldest first.
    pub fn history(&self) -> Vec<InvocationRecord> {
        self.inner.recorder.history()
    }

    /// Argument snapshots of the recorded calls, oldest first.
    pub fn recorded_arguments(&self) -> Vec<A> {
        self.inner
            .recorder
            .history()
            .iter()
            .filter_map(|record| record.arguments::<A>().cloned())
            .collect()
    }

    /// Number of recorded calls.
    pub fn call_count(&self) -> usize {
        self.inner.recorder.len()
    }

    /// Pattern matching every call of this operation.
    pub fn calls(&self) -> CallPattern {
        self.calls_using(ArgMatcher::any())
    }

    /// Pattern matching calls whose arguments equal `expected`.
    pub fn calls_with(&self, expected: A) -> CallPattern
    where
        A: PartialEq,
    {
        self.calls_using(ArgMatcher::eq(expected))
    }

    /// Pattern matching calls whose arguments satisfy `predicate`.
    pub fn calls_matching<F>(&self, description: impl Into<String>, predicate: F) -> CallPattern
    where
        F: Fn(&A) -> bool + Send + Sync + 'static,
    {
        self.calls_using(ArgMatcher::described(description, predicate))
    }

    /// Pattern matching calls accepted by `matcher`, the same matcher type
    /// used for stubbing.
    pub fn calls_using(&self, matcher: ArgMatcher<A>) -> CallPattern {
        CallPattern::new(
            self.inner.operation.clone(),
            Arc::clone(&self.inner.recorder),
            matcher.erase(),
        )
    }

    /// One line per configured stub, in resolution order.
    pub fn describe_stubs(&self) -> Vec<String> {
        self.inner.lock_stubs().describe()
    }
}

impl<A, R> Clone for Method<A, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, R> fmt::Debug for Method<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("operation", &self.inner.operation.signature())
            .field("calls", &self.inner.recorder.len())
            .finish()
    }
}

impl<A, R> fmt::Debug for MethodInner<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInner")
            .field("operation", &self.operation.signature())
            .field("recorder", &self.recorder)
            .finish()
    }
}

impl<A, R> OperationSlot for MethodInner<A, R>
where
    A: fmt::Debug + Send + Sync + 'static,
    R: Clone + Default + Send + 'static,
{
    fn operation(&self) -> &Operation {
        &self.operation
    }

    fn recorder(&self) -> &Arc<CallRecorder> {
        &self.recorder
    }

    fn reset_stubs(&self) {
        self.lock_stubs().clear();
    }

    fn fake(&self) {
        self.configure(ArgMatcher::any(), ResponseGenerator::Default);
    }

    fn describe_stubs(&self) -> Vec<String> {
        self.lock_stubs().describe()
    }
}

/// Stub configuration builder returned by [`Method::when`].
///
/// Every response method appends one entry to the operation's stub table,
/// restricted to the arguments selected so far. Entries are tried in the
/// order they were added and the first whose matcher accepts answers, so
/// `returns(1).returns(2)` always answers 1.
///
/// # Example
///
/// ```
/// use stand_in::Mock;
///
/// let mock = Mock::new("Calculator");
/// let sqrt = mock.method::<f64, f64>("sqrt").unwrap();
///
/// sqrt.when()
///     .matching(|x: &f64| *x < 0.0)
///     .always_return(f64::NAN)
///     .using(stand_in::ArgMatcher::any())
///     .always_compute(|x: &f64| x.sqrt());
///
/// assert!(sqrt.invoke(-1.0).is_nan());
/// assert_eq!(sqrt.invoke(9.0), 3.0);
/// ```
pub struct Stubbing<A, R> {
    method: Method<A, R>,
    matcher: ArgMatcher<A>,
}

impl<A, R> Stubbing<A, R>
where
    A: Clone + fmt::Debug + Send + Sync + 'static,
    R: Clone + Default + Send + 'static,
{
    /// Restrict subsequent entries to arguments accepted by `matcher`.
    ///
    /// Matchers run without any lock held, so a predicate may call back into
    /// the mock, including the operation it guards.
    pub fn using(mut self, matcher: ArgMatcher<A>) -> Self {
        self.matcher = matcher;
        self
    }

    /// Restrict subsequent entries to arguments equal to `expected`.
    pub fn with_args(self, expected: A) -> Self
    where
        A: PartialEq,
    {
        self.using(ArgMatcher::eq(expected))
    }

    /// Restrict subsequent entries to arguments satisfying `predicate`.
    pub fn matching<F>(self, predicate: F) -> Self
    where
        F: Fn(&A) -> bool + Send + Sync + 'static,
    {
        self.using(ArgMatcher::predicate(predicate))
    }

    fn append(self, generator: ResponseGenerator<A, R>) -> Self {
        self.method.configure(self.matcher.clone(), generator);
        self
    }

    /// Append a constant response.
    pub fn returns(self, value: R) -> Self {
        self.append(ResponseGenerator::Constant(value))
    }

    /// Append one entry answering `values` in order, then the last value forever.
    ///
    /// # Errors
    ///
    /// `ConfigError::EmptySequence` if `values` is empty.
    pub fn returns_each<I>(self, values: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = R>,
    {
        let sequence = SaturatingSequence::new(values.into_iter().collect()).ok_or_else(|| {
            ConfigError::EmptySequence {
                operation: self.method.operation().to_string(),
            }
        })?;
        Ok(self.append(ResponseGenerator::Sequence(sequence)))
    }

    /// Append one entry answering `value` `times` times (and forever after).
    ///
    /// # Errors
    ///
    /// `ConfigError::ZeroRepetitions` if `times` is zero.
    pub fn returns_times(self, times: usize, value: R) -> Result<Self, ConfigError> {
        let sequence = SaturatingSequence::repeated(times, value).ok_or_else(|| {
            ConfigError::ZeroRepetitions {
                operation: self.method.operation().to_string(),
            }
        })?;
        Ok(self.append(ResponseGenerator::Sequence(sequence)))
    }

    /// Answer every matching call with `value`.
    pub fn always_return(self, value: R) -> Self {
        self.returns(value)
    }

    /// Answer every matching call with the default value.
    pub fn always_default(self) -> Self {
        self.append(ResponseGenerator::Default)
    }

    /// Answer every matching call with `f(arguments)`.
    ///
    /// `f` runs without any lock held, so it may call back into the mock.
    pub fn always_compute<F>(self, f: F) -> Self
    where
        F: Fn(&A) -> R + Send + Sync + 'static,
    {
        self.append(ResponseGenerator::computed(f))
    }

    /// Answer every matching call with `f(arguments)`, failing the call on `Err`.
    pub fn always_try_compute<F>(self, f: F) -> Self
    where
        F: Fn(&A) -> Result<R, InvocationFailure> + Send + Sync + 'static,
    {
        self.append(ResponseGenerator::try_computed(f))
    }

    /// Fail every matching call with `failure`.
    pub fn always_fail(self, failure: InvocationFailure) -> Self {
        self.always_try_compute(move |_| Err(failure.clone()))
    }
}

impl<A, R> fmt::Debug for Stubbing<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stubbing")
            .field("method", &self.method)
            .finish()
    }
}
