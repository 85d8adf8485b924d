//! Declarative verification expressions.
//!
//! A [`CallPattern`] references one operation (optionally filtered by an
//! argument matcher). Patterns combine into count expectations
//! (`pattern.exactly(2)`) or into [`SequenceExpr`] trees with `+` (then) and
//! `*` (repeat):
//!
//! ```ignore
//! let expectation = (display.calls() * 2 + error.calls()) * 2;
//! ```
//!
//! Expressions are built by test code, evaluated once by the verifier and
//! then dropped.

use crate::application::recorder::CallRecorder;
use crate::domain::invocation::InvocationRecord;
use crate::domain::matcher::ErasedMatcher;
use crate::domain::operation::Operation;
use crate::domain::verdict::CountBound;
use std::fmt;
use std::ops::{Add, Mul};
use std::sync::Arc;

/// Reference to the calls of one operation, optionally filtered by arguments.
#[derive(Clone)]
pub struct CallPattern {
    operation: Operation,
    recorder: Arc<CallRecorder>,
    matcher: ErasedMatcher,
}

impl CallPattern {
    /// Create a pattern over `operation`'s calls held by `recorder`.
    pub fn new(operation: Operation, recorder: Arc<CallRecorder>, matcher: ErasedMatcher) -> Self {
        Self {
            operation,
            recorder,
            matcher,
        }
    }

    /// The referenced operation.
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Recorder holding the referenced operation's calls.
    pub fn recorder(&self) -> &Arc<CallRecorder> {
        &self.recorder
    }

    /// Argument filter applied to the operation's calls.
    pub fn matcher(&self) -> &ErasedMatcher {
        &self.matcher
    }

    /// Whether a record is a call of this operation with matching arguments.
    pub fn matches(&self, record: &InvocationRecord) -> bool {
        record.operation().id() == self.operation.id()
            && self.matcher.matches(record.raw_arguments())
    }

    /// Expect exactly `times` matching calls.
    pub fn exactly(self, times: usize) -> Expectation {
        self.counted(CountBound::Exactly(times))
    }

    /// Expect `times` matching calls or more.
    pub fn at_least(self, times: usize) -> Expectation {
        self.counted(CountBound::AtLeast(times))
    }

    /// Expect `times` matching calls or fewer.
    pub fn at_most(self, times: usize) -> Expectation {
        self.counted(CountBound::AtMost(times))
    }

    /// `exactly(1)`.
    pub fn once(self) -> Expectation {
        self.exactly(1)
    }

    /// `exactly(0)`.
    pub fn never(self) -> Expectation {
        self.exactly(0)
    }

    /// `at_least(1)`.
    pub fn at_least_once(self) -> Expectation {
        self.at_least(1)
    }

    fn counted(self, bound: CountBound) -> Expectation {
        Expectation::Count {
            pattern: self,
            bound,
        }
    }

    /// Sequence: this call, then `next`.
    pub fn then(self, next: impl Into<SequenceExpr>) -> SequenceExpr {
        SequenceExpr::from(self).then(next)
    }

    /// Sequence: this call `n` times back-to-back.
    pub fn times(self, n: usize) -> SequenceExpr {
        SequenceExpr::from(self).times(n)
    }
}

impl fmt::Display for CallPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.matcher.is_any() {
            write!(f, "{}", self.operation)
        } else {
            write!(f, "{}({})", self.operation, self.matcher.description())
        }
    }
}

impl fmt::Debug for CallPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallPattern")
            .field("operation", &self.operation.to_string())
            .field("matcher", &self.matcher.description())
            .finish()
    }
}

/// Ordered composition of call patterns.
#[derive(Clone, Debug)]
pub enum SequenceExpr {
    Call(CallPattern),
    Then(Vec<SequenceExpr>),
    Repeat(Box<SequenceExpr>, usize),
}

impl SequenceExpr {
    /// Append `next` after this expression.
    pub fn then(self, next: impl Into<SequenceExpr>) -> SequenceExpr {
        let mut parts = match self {
            SequenceExpr::Then(parts) => parts,
            other => vec![other],
        };
        match next.into() {
            SequenceExpr::Then(more) => parts.extend(more),
            other => parts.push(other),
        }
        SequenceExpr::Then(parts)
    }

    /// Repeat the whole expression `n` times back-to-back.
    pub fn times(self, n: usize) -> SequenceExpr {
        SequenceExpr::Repeat(Box::new(self), n)
    }

    /// The expected calls in order, expanded lazily.
    ///
    /// Repeats are walked with a counter rather than copied, so a large
    /// repeat count costs nothing until its steps are consumed.
    pub fn steps(&self) -> Steps<'_> {
        Steps {
            stack: vec![Frame::Node(self)],
        }
    }

    /// Whether the expression expands to no calls at all.
    pub fn is_empty(&self) -> bool {
        match self {
            SequenceExpr::Call(_) => false,
            SequenceExpr::Then(parts) => parts.iter().all(SequenceExpr::is_empty),
            SequenceExpr::Repeat(inner, n) => *n == 0 || inner.is_empty(),
        }
    }

    /// Every pattern referenced by the tree, including under a zero repeat.
    pub fn patterns(&self) -> Vec<&CallPattern> {
        match self {
            SequenceExpr::Call(pattern) => vec![pattern],
            SequenceExpr::Then(parts) => parts.iter().flat_map(|p| p.patterns()).collect(),
            SequenceExpr::Repeat(inner, _) => inner.patterns(),
        }
    }

    /// Require the relevant history to be exactly this pattern.
    pub fn strictly(self) -> Expectation {
        Expectation::Sequence {
            expr: self,
            mode: SequenceMode::Strict,
        }
    }

    /// Require this pattern as an order-preserving subsequence of the relevant history.
    pub fn in_order(self) -> Expectation {
        Expectation::Sequence {
            expr: self,
            mode: SequenceMode::InOrder,
        }
    }
}

/// Iterator over the expanded steps of a [`SequenceExpr`].
#[derive(Debug)]
pub struct Steps<'a> {
    stack: Vec<Frame<'a>>,
}

#[derive(Debug)]
enum Frame<'a> {
    Node(&'a SequenceExpr),
    Parts(&'a [SequenceExpr], usize),
    Repeat(&'a SequenceExpr, usize),
}

impl<'a> Iterator for Steps<'a> {
    type Item = &'a CallPattern;

    fn next(&mut self) -> Option<&'a CallPattern> {
        while let Some(frame) = self.stack.pop() {
            match frame {
                Frame::Node(SequenceExpr::Call(pattern)) => return Some(pattern),
                Frame::Node(SequenceExpr::Then(parts)) => {
                    self.stack.push(Frame::Parts(parts.as_slice(), 0));
                }
                // Empty bodies are skipped so every repeat frame yields a step.
                Frame::Node(SequenceExpr::Repeat(inner, n)) => {
                    if *n > 0 && !inner.is_empty() {
                        self.stack.push(Frame::Repeat(&**inner, *n));
                    }
                }
                Frame::Parts(parts, index) => {
                    if let Some(part) = parts.get(index) {
                        self.stack.push(Frame::Parts(parts, index + 1));
                        self.stack.push(Frame::Node(part));
                    }
                }
                Frame::Repeat(inner, remaining) => {
                    if remaining > 1 {
                        self.stack.push(Frame::Repeat(inner, remaining - 1));
                    }
                    self.stack.push(Frame::Node(inner));
                }
            }
        }
        None
    }
}

impl From<CallPattern> for SequenceExpr {
    fn from(pattern: CallPattern) -> Self {
        SequenceExpr::Call(pattern)
    }
}

impl fmt::Display for SequenceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceExpr::Call(pattern) => write!(f, "{}", pattern),
            SequenceExpr::Then(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" + ")?;
                    }
                    write!(f, "{}", part)?;
                }
                Ok(())
            }
            SequenceExpr::Repeat(inner, n) => match **inner {
                SequenceExpr::Call(_) => write!(f, "{} * {}", inner, n),
                _ => write!(f, "({}) * {}", inner, n),
            },
        }
    }
}

impl<T: Into<SequenceExpr>> Add<T> for SequenceExpr {
    type Output = SequenceExpr;

    fn add(self, rhs: T) -> SequenceExpr {
        self.then(rhs)
    }
}

impl<T: Into<SequenceExpr>> Add<T> for CallPattern {
    type Output = SequenceExpr;

    fn add(self, rhs: T) -> SequenceExpr {
        self.then(rhs)
    }
}

impl Mul<usize> for SequenceExpr {
    type Output = SequenceExpr;

    fn mul(self, n: usize) -> SequenceExpr {
        self.times(n)
    }
}

impl Mul<usize> for CallPattern {
    type Output = SequenceExpr;

    fn mul(self, n: usize) -> SequenceExpr {
        self.times(n)
    }
}

/// How a sequence is matched against the relevant history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceMode {
    /// The relevant history is exactly the expanded pattern.
    Strict,
    /// The expanded pattern is an order-preserving subsequence of the relevant history.
    InOrder,
}

/// A verification expression.
#[derive(Clone, Debug)]
pub enum Expectation {
    Count {
        pattern: CallPattern,
        bound: CountBound,
    },
    Sequence {
        expr: SequenceExpr,
        mode: SequenceMode,
    },
}

impl Expectation {
    /// Every call pattern the expectation references.
    pub fn patterns(&self) -> Vec<&CallPattern> {
        match self {
            Expectation::Count { pattern, .. } => vec![pattern],
            Expectation::Sequence { expr, .. } => expr.patterns(),
        }
    }
}

impl From<SequenceExpr> for Expectation {
    fn from(expr: SequenceExpr) -> Self {
        expr.strictly()
    }
}

/// A bare pattern means "called at least once".
impl From<CallPattern> for Expectation {
    fn from(pattern: CallPattern) -> Self {
        pattern.at_least_once()
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Count { pattern, bound } => write!(f, "{} called {}", pattern, bound),
            Expectation::Sequence {
                expr,
                mode: SequenceMode::Strict,
            } => write!(f, "sequence {}", expr),
            Expectation::Sequence {
                expr,
                mode: SequenceMode::InOrder,
            } => write!(f, "in order {}", expr),
        }
    }
}
