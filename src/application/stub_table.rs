//! Per-operation stub table.
//!
//! Entries are kept in registration order and resolution is first-fit: the
//! first entry whose matcher accepts the arguments answers the call, and later
//! entries are only reached when earlier matchers reject. Registering another
//! unconstrained entry therefore never overrides an existing one; clear the
//! table to replace stubs.
//!
//! Resolution happens in two steps so matchers run without the table being
//! borrowed: [`StubTable::snapshot`] copies the matchers out,
//! [`MatcherSnapshot::first_match`] evaluates them, and
//! [`StubTable::respond`] advances the chosen entry's generator. A matcher
//! predicate may therefore call back into the operation it guards.

use crate::domain::matcher::ArgMatcher;
use crate::domain::response::{ComputeFn, Generated, ResponseGenerator};
use std::fmt;
use std::sync::Arc;

/// One configured stub.
pub struct StubEntry<A, R> {
    pub matcher: Arc<ArgMatcher<A>>,
    pub generator: ResponseGenerator<A, R>,
}

impl<A: fmt::Debug, R: fmt::Debug> fmt::Debug for StubEntry<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StubEntry")
            .field("matcher", &self.matcher)
            .field("generator", &self.generator)
            .finish()
    }
}

/// Outcome of resolving one call against the table.
pub enum Resolution<A, R> {
    /// Entry `entry` matched and produced a value.
    Value { entry: usize, value: R },
    /// Entry `entry` matched and holds a computed response; the caller
    /// evaluates it (outside any lock guarding the table).
    Computed { entry: usize, compute: ComputeFn<A, R> },
    /// No entry matched.
    Unmatched,
}

/// The table's matchers as of one point in time.
pub struct MatcherSnapshot<A> {
    generation: u64,
    matchers: Vec<Arc<ArgMatcher<A>>>,
}

/// Entry chosen by a [`MatcherSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StubMatch {
    generation: u64,
    entry: usize,
}

impl<A> MatcherSnapshot<A> {
    /// First entry whose matcher accepts `arguments`.
    pub fn first_match(&self, arguments: &A) -> Option<StubMatch> {
        self.matchers
            .iter()
            .position(|matcher| matcher.matches(arguments))
            .map(|entry| StubMatch {
                generation: self.generation,
                entry,
            })
    }
}

/// Ordered (matcher, generator) entries for one operation.
pub struct StubTable<A, R> {
    entries: Vec<StubEntry<A, R>>,
    // Bumped on clear so a match taken before the clear is not applied after it.
    generation: u64,
}

impl<A, R> StubTable<A, R>
where
    R: Clone + Default,
{
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            generation: 0,
        }
    }

    /// Append an entry. Returns its index.
    pub fn configure(&mut self, matcher: ArgMatcher<A>, generator: ResponseGenerator<A, R>) -> usize {
        self.entries.push(StubEntry {
            matcher: Arc::new(matcher),
            generator,
        });
        self.entries.len() - 1
    }

    /// Copy out the current matchers, in resolution order.
    pub fn snapshot(&self) -> MatcherSnapshot<A> {
        MatcherSnapshot {
            generation: self.generation,
            matchers: self.entries.iter().map(|e| Arc::clone(&e.matcher)).collect(),
        }
    }

    /// Produce the response of a matched entry, advancing its generator.
    ///
    /// A match taken before the table was cleared resolves as unmatched.
    pub fn respond(&mut self, found: Option<StubMatch>) -> Resolution<A, R> {
        let Some(found) = found.filter(|m| m.generation == self.generation) else {
            return Resolution::Unmatched;
        };
        let Some(stub) = self.entries.get_mut(found.entry) else {
            return Resolution::Unmatched;
        };
        let entry = found.entry;
        match stub.generator.generate() {
            Generated::Value(value) => Resolution::Value { entry, value },
            Generated::Deferred(compute) => Resolution::Computed { entry, compute },
        }
    }

    /// Number of configured entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry is configured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.generation += 1;
    }

    /// One line per entry: `#<index> <matcher> -> <generator kind>`.
    pub fn describe(&self) -> Vec<String>
    where
        A: fmt::Debug,
    {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| format!("#{} {} -> {}", i, e.matcher.describe(), e.generator.kind()))
            .collect()
    }
}

impl<A, R> Default for StubTable<A, R>
where
    R: Clone + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<A: fmt::Debug, R: fmt::Debug> fmt::Debug for StubTable<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StubTable")
            .field("entries", &self.entries)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::response::{InvocationFailure, SaturatingSequence};

    fn resolve<A, R: Clone + Default>(table: &mut StubTable<A, R>, arguments: &A) -> Resolution<A, R> {
        let found = table.snapshot().first_match(arguments);
        table.respond(found)
    }

    fn value_of<A, R>(resolution: Resolution<A, R>) -> (usize, R) {
        match resolution {
            Resolution::Value { entry, value } => (entry, value),
            Resolution::Computed { .. } => panic!("unexpected computed resolution"),
            Resolution::Unmatched => panic!("unexpected unmatched resolution"),
        }
    }

    #[test]
    fn test_empty_table_is_unmatched() {
        let mut table = StubTable::<i32, bool>::new();
        assert!(matches!(resolve(&mut table, &0), Resolution::Unmatched));
        assert!(table.is_empty());
    }

    #[test]
    fn test_first_registered_match_any_wins() {
        let mut table = StubTable::<i32, i32>::new();
        table.configure(ArgMatcher::any(), ResponseGenerator::Constant(1));
        table.configure(ArgMatcher::any(), ResponseGenerator::Constant(2));

        for arg in 0..5 {
            assert_eq!(value_of(resolve(&mut table, &arg)), (0, 1));
        }
    }

    #[test]
    fn test_specific_matcher_reaches_later_entry() {
        let mut table = StubTable::<i32, &'static str>::new();
        table.configure(ArgMatcher::predicate(|v: &i32| *v < 0), ResponseGenerator::Constant("negative"));
        table.configure(ArgMatcher::any(), ResponseGenerator::Constant("other"));

        assert_eq!(value_of(resolve(&mut table, &-3)), (0, "negative"));
        assert_eq!(value_of(resolve(&mut table, &3)), (1, "other"));
    }

    #[test]
    fn test_earlier_match_any_shadows_later_specific_entry() {
        let mut table = StubTable::<i32, i32>::new();
        table.configure(ArgMatcher::any(), ResponseGenerator::Constant(1));
        table.configure(ArgMatcher::eq(7), ResponseGenerator::Constant(7));

        assert_eq!(value_of(resolve(&mut table, &7)), (0, 1));
    }

    #[test]
    fn test_only_matching_entry_advances() {
        let mut table = StubTable::<i32, i32>::new();
        table.configure(
            ArgMatcher::eq(0),
            ResponseGenerator::Sequence(SaturatingSequence::new(vec![1, 2, 3]).unwrap()),
        );
        table.configure(
            ArgMatcher::any(),
            ResponseGenerator::Sequence(SaturatingSequence::new(vec![10, 20]).unwrap()),
        );

        assert_eq!(value_of(resolve(&mut table, &5)).1, 10);
        assert_eq!(value_of(resolve(&mut table, &0)).1, 1);
        assert_eq!(value_of(resolve(&mut table, &5)).1, 20);
        assert_eq!(value_of(resolve(&mut table, &0)).1, 2);
        assert_eq!(value_of(resolve(&mut table, &5)).1, 20);
        assert_eq!(value_of(resolve(&mut table, &0)).1, 3);
        assert_eq!(value_of(resolve(&mut table, &0)).1, 3);
    }

    #[test]
    fn test_computed_resolution_is_returned_for_caller() {
        let mut table = StubTable::<i32, i32>::new();
        table.configure(
            ArgMatcher::any(),
            ResponseGenerator::try_computed(|v: &i32| {
                if *v >= 0 {
                    Ok(v + 1)
                } else {
                    Err(InvocationFailure::new("negative"))
                }
            }),
        );

        match resolve(&mut table, &1) {
            Resolution::Computed { entry, compute } => {
                assert_eq!(entry, 0);
                assert_eq!(compute(&1), Ok(2));
                assert!(compute(&-1).is_err());
            }
            _ => panic!("expected computed resolution"),
        }
    }

    #[test]
    fn test_describe_and_clear() {
        let mut table = StubTable::<i32, bool>::new();
        table.configure(ArgMatcher::eq(3), ResponseGenerator::Constant(true));
        table.configure(ArgMatcher::any(), ResponseGenerator::Default);

        assert_eq!(
            table.describe(),
            vec!["#0 == 3 -> constant".to_string(), "#1 any -> default".to_string()]
        );

        table.clear();
        assert!(table.is_empty());
        assert!(matches!(resolve(&mut table, &3), Resolution::Unmatched));
    }

    #[test]
    fn test_match_taken_before_clear_is_not_applied() {
        let mut table = StubTable::<i32, i32>::new();
        table.configure(ArgMatcher::any(), ResponseGenerator::Constant(1));

        let found = table.snapshot().first_match(&0);
        table.clear();
        table.configure(ArgMatcher::any(), ResponseGenerator::Constant(2));

        assert!(matches!(table.respond(found), Resolution::Unmatched));
        assert_eq!(value_of(resolve(&mut table, &0)), (0, 2));
    }

    #[test]
    fn test_matchers_run_without_borrowing_the_table() {
        let mut table = StubTable::<i32, i32>::new();
        table.configure(ArgMatcher::eq(1), ResponseGenerator::Constant(10));
        table.configure(ArgMatcher::predicate(|v: &i32| *v > 1), ResponseGenerator::Constant(20));

        let snapshot = table.snapshot();
        table.configure(ArgMatcher::any(), ResponseGenerator::Constant(30));

        assert_eq!(snapshot.first_match(&5).map(|m| m.entry), Some(1));
        assert_eq!(snapshot.first_match(&0), None);
        assert_eq!(value_of(table.respond(snapshot.first_match(&5))), (1, 20));
    }
}
