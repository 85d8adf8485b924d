//! Verification engine.
//!
//! Evaluates [`Expectation`]s against call recorders. Evaluation is read-only
//! and one-shot: nothing about recorders or stub tables changes, and the
//! result is a [`Verdict`] rather than a panic. [`Verifier::check`] additionally
//! hands failures to a [`Reporter`].

use crate::application::expression::{CallPattern, Expectation, SequenceExpr, SequenceMode};
use crate::application::ports::Reporter;
use crate::application::recorder::merge_histories;
use crate::domain::invocation::InvocationRecord;
use crate::domain::verdict::{CountBound, Mismatch, Verdict};
use std::sync::Arc;

/// Evaluate one expectation against the current call history.
pub fn evaluate(expectation: &Expectation) -> Verdict {
    let rendered = expectation.to_string();
    match expectation {
        Expectation::Count { pattern, bound } => verify_count(rendered, pattern, *bound),
        Expectation::Sequence { expr, mode } => verify_sequence(rendered, expr, *mode),
    }
}

fn render(records: &[InvocationRecord]) -> Vec<String> {
    records.iter().map(|r| r.to_string()).collect()
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        "call"
    } else {
        "calls"
    }
}

fn verify_count(rendered: String, pattern: &CallPattern, bound: CountBound) -> Verdict {
    let history = pattern.recorder().history();
    let matching = history.iter().filter(|r| pattern.matches(r)).count();

    if bound.accepts(matching) {
        return Verdict::pass(rendered);
    }

    let reason = if pattern.matcher().is_any() {
        format!(
            "expected {} {}, but found {} {}",
            pattern,
            bound,
            matching,
            plural(matching)
        )
    } else {
        format!(
            "expected {} {}, but found {} matching {} out of {} {} to {}",
            pattern,
            bound,
            matching,
            plural(matching),
            history.len(),
            plural(history.len()),
            pattern.operation()
        )
    };
    Verdict::fail(
        rendered,
        Mismatch {
            reason,
            position: None,
            actual: render(&history),
        },
    )
}

fn verify_sequence(rendered: String, expr: &SequenceExpr, mode: SequenceMode) -> Verdict {
    let patterns = expr.patterns();

    if let Some((first, rest)) = patterns.split_first() {
        if let Some(other) = rest
            .iter()
            .find(|p| !first.recorder().shares_timeline_with(p.recorder()))
        {
            return Verdict::fail(
                rendered,
                Mismatch {
                    reason: format!(
                        "{} and {} are recorded on independent timelines; build the mocks with a shared sequencer to compare their call order",
                        first.operation(),
                        other.operation()
                    ),
                    position: None,
                    actual: Vec::new(),
                },
            );
        }
    }

    let history = merge_histories(patterns.iter().map(|p| p.recorder()));

    let failure = match mode {
        SequenceMode::Strict => strict_mismatch(expr.steps(), &history),
        SequenceMode::InOrder => in_order_mismatch(expr.steps(), &history),
    };

    match failure {
        None => Verdict::pass(rendered),
        Some((position, reason)) => Verdict::fail(
            rendered,
            Mismatch {
                reason,
                position: Some(position),
                actual: render(&history),
            },
        ),
    }
}

/// Position-by-position comparison covering the whole relevant history.
///
/// Steps are pulled one at a time and the walk stops at the first
/// difference, so at most `history.len() + 1` steps are expanded.
fn strict_mismatch<'a>(
    mut steps: impl Iterator<Item = &'a CallPattern>,
    history: &[InvocationRecord],
) -> Option<(usize, String)> {
    let mut position = 0;
    loop {
        match (steps.next(), history.get(position)) {
            (Some(step), Some(record)) if step.matches(record) => position += 1,
            (Some(step), Some(record)) => {
                return Some((
                    position,
                    format!(
                        "at position {}: expected {}, but found {}",
                        position, step, record
                    ),
                ))
            }
            (Some(step), None) => {
                return Some((
                    position,
                    format!(
                        "at position {}: expected {}, but the history ended after {} relevant {}",
                        position,
                        step,
                        history.len(),
                        plural(history.len())
                    ),
                ))
            }
            // The pattern ran out at `position`, which is therefore its length.
            (None, Some(record)) => {
                return Some((
                    position,
                    format!(
                        "at position {}: unexpected {}; the pattern covers {} {}",
                        position,
                        record,
                        position,
                        plural(position)
                    ),
                ))
            }
            (None, None) => return None,
        }
    }
}

/// Greedy subsequence search; earliest match per step is optimal.
fn in_order_mismatch<'a>(
    mut steps: impl Iterator<Item = &'a CallPattern>,
    history: &[InvocationRecord],
) -> Option<(usize, String)> {
    let mut pending = steps.next();
    let mut matched = 0;
    let mut resume_at = 0;
    for (position, record) in history.iter().enumerate() {
        let Some(step) = pending else {
            break;
        };
        if step.matches(record) {
            matched += 1;
            resume_at = position + 1;
            pending = steps.next();
        }
    }

    let step = pending?;
    Some((
        resume_at,
        format!(
            "step {} of the pattern: expected {} at or after position {}, but no such call was recorded",
            matched, step, resume_at
        ),
    ))
}

/// Verifies expectations and reports failures.
#[derive(Debug, Clone)]
pub struct Verifier {
    reporter: Arc<dyn Reporter>,
}

impl Verifier {
    /// Create a verifier that hands failed verdicts to `reporter`.
    pub fn with_reporter(reporter: Arc<dyn Reporter>) -> Self {
        Self { reporter }
    }

    /// Evaluate an expectation. Never reports.
    pub fn verify(&self, expectation: impl Into<Expectation>) -> Verdict {
        evaluate(&expectation.into())
    }

    /// Evaluate an expectation and report it if it failed.
    pub fn check(&self, expectation: impl Into<Expectation>) -> Verdict {
        let verdict = self.verify(expectation);
        if verdict.failed() {
            self.reporter.report_failure(&verdict);
        }
        verdict
    }

    /// Evaluate expectations in order; the first failure is returned.
    pub fn verify_all(&self, expectations: &[Expectation]) -> Verdict {
        let mut rendered = Vec::with_capacity(expectations.len());
        for expectation in expectations {
            let verdict = evaluate(expectation);
            if verdict.failed() {
                return verdict;
            }
            rendered.push(verdict.expectation().to_string());
        }
        Verdict::pass(rendered.join("; "))
    }

    /// Pass iff every record in `history` is matched by a pattern of `covered`.
    pub fn verify_no_other_invocations(
        &self,
        history: &[InvocationRecord],
        covered: &[Expectation],
    ) -> Verdict {
        let patterns: Vec<&CallPattern> = covered.iter().flat_map(|e| e.patterns()).collect();
        let rendered = format!(
            "no calls other than [{}]",
            patterns
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let uncovered: Vec<(usize, &InvocationRecord)> = history
            .iter()
            .enumerate()
            .filter(|(_, record)| !patterns.iter().any(|p| p.matches(record)))
            .collect();

        let Some(&(first, _)) = uncovered.first() else {
            return Verdict::pass(rendered);
        };
        let listed = uncovered
            .iter()
            .map(|(i, r)| format!("[{}] {}", i, r))
            .collect::<Vec<_>>()
            .join(", ");
        Verdict::fail(
            rendered,
            Mismatch {
                reason: format!(
                    "{} unverified {}: {}",
                    uncovered.len(),
                    plural(uncovered.len()),
                    listed
                ),
                position: Some(first),
                actual: render(history),
            },
        )
    }
}
