//! Invocation records.
//!
//! One record is created per call to a mocked operation, whether or not a stub
//! matched. Records are immutable; the argument snapshot is kept type-erased so
//! records of different operations can live in one merged history, and typed
//! access is recovered by downcasting.

use crate::domain::operation::Operation;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// How an invocation was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    /// A configured stub matched; `entry` is its position in the stub table.
    Stubbed { entry: usize },
    /// No stub matched and the type's default value was returned.
    Defaulted,
    /// The call failed (computed failure or strict unmatched call).
    Failed,
}

/// Immutable log entry for one call.
#[derive(Clone)]
pub struct InvocationRecord {
    operation: Operation,
    arguments: Arc<dyn Any + Send + Sync>,
    rendered: Arc<str>,
    sequence: u64,
    outcome: CallOutcome,
}

impl InvocationRecord {
    /// Capture a call. The arguments are rendered with `Debug` once, up front.
    pub fn new<A>(operation: Operation, arguments: A, sequence: u64, outcome: CallOutcome) -> Self
    where
        A: fmt::Debug + Send + Sync + 'static,
    {
        let rendered: Arc<str> = Arc::from(format!("{:?}", arguments));
        Self {
            operation,
            arguments: Arc::new(arguments),
            rendered,
            sequence,
            outcome,
        }
    }

    /// The called operation.
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Sequence number drawn from the capability's shared counter.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// How the call was answered.
    pub fn outcome(&self) -> CallOutcome {
        self.outcome
    }

    /// Typed view of the argument snapshot, `None` if `A` is not the recorded type.
    pub fn arguments<A: 'static>(&self) -> Option<&A> {
        self.arguments.downcast_ref::<A>()
    }

    /// Type-erased argument snapshot.
    pub fn raw_arguments(&self) -> &(dyn Any + Send + Sync) {
        &*self.arguments
    }

    /// `Debug` rendering of the arguments.
    pub fn rendered_arguments(&self) -> &str {
        &self.rendered
    }
}

impl fmt::Display for InvocationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.operation, self.rendered)
    }
}

impl fmt::Debug for InvocationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationRecord")
            .field("operation", &self.operation.to_string())
            .field("arguments", &self.rendered)
            .field("sequence", &self.sequence)
            .field("outcome", &self.outcome)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::operation::OperationId;

    fn op() -> Operation {
        Operation::of::<(i32, String), bool>(OperationId::new(7, 1), Arc::from("View"), "show")
    }

    #[test]
    fn test_typed_argument_access() {
        let record = InvocationRecord::new(op(), (3, "x".to_string()), 4, CallOutcome::Defaulted);

        assert_eq!(record.arguments::<(i32, String)>(), Some(&(3, "x".to_string())));
        assert!(record.arguments::<i32>().is_none());
        assert_eq!(record.sequence(), 4);
        assert_eq!(record.outcome(), CallOutcome::Defaulted);
    }

    #[test]
    fn test_display_renders_operation_and_arguments() {
        let record = InvocationRecord::new(op(), (3, "x".to_string()), 1, CallOutcome::Failed);
        assert_eq!(record.to_string(), "View::show((3, \"x\"))");
    }
}
