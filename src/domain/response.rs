//! Response generators.
//!
//! A generator produces the return value for each call resolved to its stub
//! entry. Generators are stateful: a finite sequence keeps a cursor that
//! advances on every resolution and saturates at the last element.

use std::fmt;
use std::sync::Arc;

/// Failure signalled by a mocked operation.
///
/// Produced by computed responses that decide the operation should fail, and
/// by strict mocks when no stub matches a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationFailure {
    operation: Option<String>,
    message: String,
}

impl InvocationFailure {
    /// Create a failure with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            operation: None,
            message: message.into(),
        }
    }

    /// Attach the name of the operation that failed, unless one is already set.
    pub fn for_operation(mut self, operation: impl fmt::Display) -> Self {
        if self.operation.is_none() {
            self.operation = Some(operation.to_string());
        }
        self
    }

    /// Operation the failure was raised by, once attached.
    pub fn operation(&self) -> Option<&str> {
        self.operation.as_deref()
    }

    /// The failure message without the operation prefix.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for InvocationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.operation {
            Some(operation) => write!(f, "{} failed: {}", operation, self.message),
            None => write!(f, "mocked operation failed: {}", self.message),
        }
    }
}

impl std::error::Error for InvocationFailure {}

/// Computed response function.
pub type ComputeFn<A, R> = Arc<dyn Fn(&A) -> Result<R, InvocationFailure> + Send + Sync>;

/// Finite list of responses that repeats its last element once exhausted.
///
/// # Example
/// ```
/// use stand_in::SaturatingSequence;
///
/// let mut seq = SaturatingSequence::new(vec![1, 2]).unwrap();
/// assert_eq!(seq.next_value(), 1);
/// assert_eq!(seq.next_value(), 2);
/// assert_eq!(seq.next_value(), 2);
/// assert_eq!(seq.next_value(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct SaturatingSequence<R> {
    values: Vec<R>,
    cursor: usize,
}

impl<R: Clone> SaturatingSequence<R> {
    /// Build a sequence. Returns `None` for an empty list.
    pub fn new(values: Vec<R>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        Some(Self { values, cursor: 0 })
    }

    /// Build a sequence of `times` copies of `value`. Returns `None` if `times` is zero.
    pub fn repeated(times: usize, value: R) -> Option<Self> {
        Self::new(vec![value; times])
    }

    /// Return `values[min(cursor, len - 1)]` and advance the cursor.
    pub fn next_value(&mut self) -> R {
        let last = self.values.len() - 1;
        let value = self.values[self.cursor.min(last)].clone();
        self.cursor = self.cursor.saturating_add(1);
        value
    }

    /// Number of values in the sequence.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; construction rejects empty sequences.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether every element has been returned at least once.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.values.len()
    }
}

/// Kind of a generator, for introspection and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorKind {
    Constant,
    Sequence,
    Default,
    Computed,
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GeneratorKind::Constant => "constant",
            GeneratorKind::Sequence => "sequence",
            GeneratorKind::Default => "default",
            GeneratorKind::Computed => "computed",
        };
        f.write_str(name)
    }
}

/// What a generator yields for one call.
pub enum Generated<A, R> {
    /// A ready value.
    Value(R),
    /// A computed response to be evaluated by the caller.
    Deferred(ComputeFn<A, R>),
}

/// Stateful producer of return values.
pub enum ResponseGenerator<A, R> {
    /// Always the same value.
    Constant(R),
    /// Saturating finite sequence.
    Sequence(SaturatingSequence<R>),
    /// `R::default()` on every call.
    Default,
    /// Function of the call's arguments, possibly failing.
    Computed(ComputeFn<A, R>),
}

impl<A, R> ResponseGenerator<A, R>
where
    R: Clone + Default,
{
    /// Computed response from an infallible function.
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&A) -> R + Send + Sync + 'static,
    {
        ResponseGenerator::Computed(Arc::new(move |arguments| Ok(f(arguments))))
    }

    /// Computed response from a fallible function.
    pub fn try_computed<F>(f: F) -> Self
    where
        F: Fn(&A) -> Result<R, InvocationFailure> + Send + Sync + 'static,
    {
        ResponseGenerator::Computed(Arc::new(f))
    }

    /// Produce the response for one call and advance internal state.
    pub fn generate(&mut self) -> Generated<A, R> {
        match self {
            ResponseGenerator::Constant(value) => Generated::Value(value.clone()),
            ResponseGenerator::Sequence(sequence) => Generated::Value(sequence.next_value()),
            ResponseGenerator::Default => Generated::Value(R::default()),
            ResponseGenerator::Computed(f) => Generated::Deferred(Arc::clone(f)),
        }
    }

    /// Kind of this generator.
    pub fn kind(&self) -> GeneratorKind {
        match self {
            ResponseGenerator::Constant(_) => GeneratorKind::Constant,
            ResponseGenerator::Sequence(_) => GeneratorKind::Sequence,
            ResponseGenerator::Default => GeneratorKind::Default,
            ResponseGenerator::Computed(_) => GeneratorKind::Computed,
        }
    }
}

impl<A, R: fmt::Debug> fmt::Debug for ResponseGenerator<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseGenerator::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            ResponseGenerator::Sequence(sequence) => {
                f.debug_tuple("Sequence").field(sequence).finish()
            }
            ResponseGenerator::Default => f.write_str("Default"),
            ResponseGenerator::Computed(_) => f.debug_tuple("Computed").field(&"<fn>").finish(),
        }
    }
}
