//! Verification outcomes.
//!
//! A [`Verdict`] is a boolean plus a human-readable diagnostic. The engine never
//! aborts on a failed verification; the host decides what a failure means
//! (assertion panic, log line, `Err` from a test returning `Result`).

use std::fmt;

/// Relation between an observed call count and an expected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountBound {
    Exactly(usize),
    AtLeast(usize),
    AtMost(usize),
}

impl CountBound {
    /// Whether `count` matching calls satisfy the bound.
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            CountBound::Exactly(n) => count == n,
            CountBound::AtLeast(n) => count >= n,
            CountBound::AtMost(n) => count <= n,
        }
    }
}

impl fmt::Display for CountBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (relation, n) = match *self {
            CountBound::Exactly(n) => ("exactly", n),
            CountBound::AtLeast(n) => ("at least", n),
            CountBound::AtMost(n) => ("at most", n),
        };
        write!(f, "{} {} {}", relation, n, if n == 1 { "time" } else { "times" })
    }
}

/// Details of a failed verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// What went wrong, in one sentence.
    pub reason: String,
    /// Position of the mismatch in the relevant history, for sequence checks.
    pub position: Option<usize>,
    /// Rendered calls that were actually recorded.
    pub actual: Vec<String>,
}

/// Result of evaluating one expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    expectation: String,
    mismatch: Option<Mismatch>,
}

impl Verdict {
    /// A passing verdict for the rendered expectation.
    pub fn pass(expectation: impl Into<String>) -> Self {
        Self {
            expectation: expectation.into(),
            mismatch: None,
        }
    }

    /// A failing verdict carrying its mismatch.
    pub fn fail(expectation: impl Into<String>, mismatch: Mismatch) -> Self {
        Self {
            expectation: expectation.into(),
            mismatch: Some(mismatch),
        }
    }

    /// Whether the expectation held.
    pub fn passed(&self) -> bool {
        self.mismatch.is_none()
    }

    /// Whether the expectation did not hold.
    pub fn failed(&self) -> bool {
        self.mismatch.is_some()
    }

    /// Rendered expectation, e.g. `View::display(any) exactly 2 times`.
    pub fn expectation(&self) -> &str {
        &self.expectation
    }

    /// Details of the failure, if any.
    pub fn mismatch(&self) -> Option<&Mismatch> {
        self.mismatch.as_ref()
    }

    /// Full diagnostic for a failure, `None` when the verdict passed.
    pub fn diagnostic(&self) -> Option<String> {
        self.mismatch.as_ref().map(|_| self.to_string())
    }

    /// Mismatch position for failed sequence verifications.
    pub fn position(&self) -> Option<usize> {
        self.mismatch.as_ref().and_then(|m| m.position)
    }

    /// Rendered actual calls attached to a failure (empty on pass).
    pub fn actual(&self) -> &[String] {
        self.mismatch
            .as_ref()
            .map(|m| m.actual.as_slice())
            .unwrap_or(&[])
    }

    /// Convert into a `Result` so tests can use `?`.
    pub fn into_result(self) -> Result<(), VerificationError> {
        if self.passed() {
            Ok(())
        } else {
            Err(VerificationError { verdict: self })
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.mismatch {
            None => write!(f, "verified: {}", self.expectation),
            Some(mismatch) => {
                write!(f, "verification failed: {}", self.expectation)?;
                write!(f, "\n  {}", mismatch.reason)?;
                if mismatch.actual.is_empty() {
                    write!(f, "\n  actual calls: none")
                } else {
                    write!(f, "\n  actual calls:")?;
                    for (i, call) in mismatch.actual.iter().enumerate() {
                        write!(f, "\n    [{}] {}", i, call)?;
                    }
                    Ok(())
                }
            }
        }
    }
}

/// Error form of a failed [`Verdict`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationError {
    verdict: Verdict,
}

impl VerificationError {
    /// The failed verdict.
    pub fn verdict(&self) -> &Verdict {
        &self.verdict
    }
}

impl fmt::Display for VerificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.verdict, f)
    }
}

impl std::error::Error for VerificationError {}
