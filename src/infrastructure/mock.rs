//! Mocked capabilities.
//!
//! A [`Mock`] stands in for one abstract capability (a trait). It owns the
//! capability's operations, the sequencer every call draws its number from,
//! the call metrics and the policy for calls no stub matches. Typed
//! [`Method`] handles are obtained once per operation and stored in the
//! test's implementation of the trait.
//!
//! # Example
//!
//! ```
//! use stand_in::{Method, Mock};
//!
//! trait View {
//!     fn display(&self, value: i32) -> bool;
//! }
//!
//! struct MockView {
//!     display: Method<i32, bool>,
//! }
//!
//! impl View for MockView {
//!     fn display(&self, value: i32) -> bool {
//!         self.display.invoke(value)
//!     }
//! }
//!
//! let mock = Mock::new("View");
//! let view = MockView {
//!     display: mock.method("display").unwrap(),
//! };
//!
//! view.display.when().returns_each([true, false]).unwrap();
//! assert!(view.display(1));
//! assert!(!view.display(2));
//! assert!(!view.display(3));
//! assert_eq!(mock.history().len(), 3);
//! ```

use crate::application::expression::Expectation;
use crate::application::metrics::Metrics;
use crate::application::ports::Sequencer;
use crate::application::recorder::merge_histories;
use crate::application::verifier::Verifier;
use crate::domain::invocation::InvocationRecord;
use crate::domain::operation::{Operation, OperationId};
use crate::domain::verdict::Verdict;
use crate::infrastructure::method::Method;
use crate::infrastructure::registry::{OperationRegistry, OperationSlot};
use crate::infrastructure::sequencer::MonotonicSequencer;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_CAPABILITY: AtomicU64 = AtomicU64::new(1);

/// Error returned when a mock or one of its stubs is misconfigured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A response sequence was given no values
    EmptySequence { operation: String },
    /// A repeated response was asked for zero times
    ZeroRepetitions { operation: String },
    /// The operation name is already registered on the capability
    DuplicateOperation {
        capability: String,
        operation: &'static str,
    },
    /// The operation name is empty
    EmptyOperationName { capability: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptySequence { operation } => {
                write!(f, "{}: a response sequence needs at least one value", operation)
            }
            ConfigError::ZeroRepetitions { operation } => {
                write!(f, "{}: a repeated response must repeat at least once", operation)
            }
            ConfigError::DuplicateOperation {
                capability,
                operation,
            } => write!(
                f,
                "operation {}::{} is already registered",
                capability, operation
            ),
            ConfigError::EmptyOperationName { capability } => {
                write!(f, "{}: operation names must not be empty", capability)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// What a call no stub matches does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmatchedCallPolicy {
    /// Return the return type's default value (relaxed mock).
    #[default]
    ReturnDefault,
    /// Record the call, then fail it with an `InvocationFailure` (strict mock).
    Fail,
}

/// State shared by every operation of one capability.
#[derive(Debug)]
pub(crate) struct CapabilityContext {
    pub(crate) sequencer: Arc<dyn Sequencer>,
    pub(crate) policy: UnmatchedCallPolicy,
    pub(crate) metrics: Metrics,
}

/// Builder for constructing a [`Mock`].
#[derive(Debug)]
pub struct MockBuilder {
    name: String,
    sequencer: Option<Arc<dyn Sequencer>>,
    policy: UnmatchedCallPolicy,
}

impl MockBuilder {
    /// Draw sequence numbers from `sequencer`.
    ///
    /// Mocks built with the same sequencer share a timeline, so sequences
    /// spanning their operations can be verified.
    pub fn with_sequencer(mut self, sequencer: Arc<dyn Sequencer>) -> Self {
        self.sequencer = Some(sequencer);
        self
    }

    /// Share the timeline of an existing mock.
    pub fn sharing_timeline_with(self, other: &Mock) -> Self {
        self.with_sequencer(Arc::clone(other.sequencer()))
    }

    /// Set what calls no stub matches do.
    pub fn with_unmatched_policy(mut self, policy: UnmatchedCallPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Shorthand for `with_unmatched_policy(UnmatchedCallPolicy::Fail)`.
    pub fn strict(self) -> Self {
        self.with_unmatched_policy(UnmatchedCallPolicy::Fail)
    }

    /// Build the mock, on a fresh timeline unless one was given.
    pub fn build(self) -> Mock {
        let sequencer = self
            .sequencer
            .unwrap_or_else(|| Arc::new(MonotonicSequencer::new()) as Arc<dyn Sequencer>);
        let capability = NEXT_CAPABILITY.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            capability = %self.name,
            id = capability,
            policy = ?self.policy,
            "mock created"
        );

        Mock {
            inner: Arc::new(MockInner {
                name: Arc::from(self.name),
                capability,
                context: Arc::new(CapabilityContext {
                    sequencer,
                    policy: self.policy,
                    metrics: Metrics::new(),
                }),
                registry: OperationRegistry::new(),
            }),
        }
    }
}

/// A mocked capability.
///
/// Clones share the same operations, history and metrics.
#[derive(Debug, Clone)]
pub struct Mock {
    inner: Arc<MockInner>,
}

#[derive(Debug)]
struct MockInner {
    name: Arc<str>,
    capability: u64,
    context: Arc<CapabilityContext>,
    registry: OperationRegistry,
}

impl Mock {
    /// A relaxed mock on its own timeline.
    pub fn new(name: impl Into<String>) -> Self {
        Self::builder(name).build()
    }

    /// Start building a mock named `name`.
    pub fn builder(name: impl Into<String>) -> MockBuilder {
        MockBuilder {
            name: name.into(),
            sequencer: None,
            policy: UnmatchedCallPolicy::default(),
        }
    }

    /// Register an operation taking `A` and returning `R`.
    ///
    /// Multi-argument operations use a tuple for `A`. Both the stub table and
    /// the call history of the new operation start empty.
    ///
    /// # Errors
    ///
    /// - `ConfigError::EmptyOperationName` if `name` is empty
    /// - `ConfigError::DuplicateOperation` if `name` is already registered
    pub fn method<A, R>(&self, name: &'static str) -> Result<Method<A, R>, ConfigError>
    where
        A: Clone + fmt::Debug + Send + Sync + 'static,
        R: Clone + Default + Send + 'static,
    {
        if name.is_empty() {
            return Err(ConfigError::EmptyOperationName {
                capability: self.inner.name.to_string(),
            });
        }

        let method = self.inner.registry.register(&self.inner.name, name, |index| {
            let operation = Operation::of::<A, R>(
                OperationId::new(self.inner.capability, index),
                Arc::clone(&self.inner.name),
                name,
            );
            let method = Method::new(operation, Arc::clone(&self.inner.context));
            (method.slot(), method)
        })?;

        tracing::debug!(
            signature = %method.operation().signature(),
            index = method.operation().id().index(),
            "operation registered"
        );
        Ok(method)
    }

    /// Name of the capability.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Process-unique id of the capability.
    pub fn id(&self) -> u64 {
        self.inner.capability
    }

    /// Policy for calls no stub matches.
    pub fn policy(&self) -> UnmatchedCallPolicy {
        self.inner.context.policy
    }

    /// Sequencer every operation of this mock draws numbers from.
    pub fn sequencer(&self) -> &Arc<dyn Sequencer> {
        &self.inner.context.sequencer
    }

    /// Call counters shared by every operation of the mock.
    pub fn metrics(&self) -> &Metrics {
        &self.inner.context.metrics
    }

    /// Registered operations, in registration order.
    pub fn operations(&self) -> Vec<Operation> {
        self.inner
            .registry
            .slots()
            .iter()
            .map(|slot| slot.operation().clone())
            .collect()
    }

    /// Calls of every operation, in the order they were made.
    pub fn history(&self) -> Vec<InvocationRecord> {
        let slots: Vec<Arc<dyn OperationSlot>> = self.inner.registry.slots();
        merge_histories(slots.iter().map(|slot| slot.recorder()))
    }

    /// Configured stubs of every operation, prefixed with the operation.
    pub fn describe_stubs(&self) -> Vec<String> {
        self.inner
            .registry
            .slots()
            .iter()
            .flat_map(|slot| {
                let operation = slot.operation().to_string();
                slot.describe_stubs()
                    .into_iter()
                    .map(move |line| format!("{} {}", operation, line))
            })
            .collect()
    }

    /// Fake every registered operation: calls no existing stub accepts
    /// answer with the default value.
    pub fn fake_all(&self) {
        for slot in self.inner.registry.slots() {
            slot.fake();
        }
    }

    /// Clear every stub table and call history, and zero the metrics.
    ///
    /// Operations stay registered and existing `Method` handles stay valid.
    pub fn reset(&self) {
        for slot in self.inner.registry.slots() {
            slot.reset_stubs();
            slot.recorder().clear();
        }
        self.inner.context.metrics.reset();
        tracing::debug!(capability = %self.inner.name, "mock reset");
    }

    /// Clear every call history, keeping configured stubs.
    pub fn clear_invocation_history(&self) {
        for slot in self.inner.registry.slots() {
            slot.recorder().clear();
        }
        tracing::debug!(capability = %self.inner.name, "invocation history cleared");
    }

    /// Pass iff every call made on this mock is covered by a pattern of `covered`.
    pub fn verify_no_other_invocations(&self, covered: &[Expectation]) -> Verdict {
        Verifier::new().verify_no_other_invocations(&self.history(), covered)
    }
}
