//! Argument matchers.
//!
//! A matcher is a predicate over an operation's argument tuple. The same
//! [`ArgMatcher`] value is used to restrict stubs and to filter calls during
//! verification; [`ErasedMatcher`] is its type-erased form, built from the
//! typed matcher so both uses evaluate identically.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Predicate function over an argument tuple.
pub type PredicateFn<A> = Arc<dyn Fn(&A) -> bool + Send + Sync>;

/// Matcher over argument tuples of type `A`.
pub enum ArgMatcher<A> {
    /// Accepts every call.
    Any,
    /// Accepts calls whose arguments equal `expected`.
    Equals {
        expected: A,
        eq: fn(&A, &A) -> bool,
    },
    /// Accepts calls for which the predicate returns true.
    Predicate {
        description: String,
        predicate: PredicateFn<A>,
    },
}

impl<A> ArgMatcher<A> {
    /// Match-any.
    pub fn any() -> Self {
        ArgMatcher::Any
    }

    /// Match arguments equal to `expected`.
    pub fn eq(expected: A) -> Self
    where
        A: PartialEq,
    {
        ArgMatcher::Equals {
            expected,
            eq: <A as PartialEq>::eq,
        }
    }

    /// Match arguments accepted by `predicate`.
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&A) -> bool + Send + Sync + 'static,
    {
        Self::described("predicate", predicate)
    }

    /// Like [`ArgMatcher::predicate`], with a description used in diagnostics.
    pub fn described<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&A) -> bool + Send + Sync + 'static,
    {
        ArgMatcher::Predicate {
            description: description.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Evaluate the matcher.
    pub fn matches(&self, arguments: &A) -> bool {
        match self {
            ArgMatcher::Any => true,
            ArgMatcher::Equals { expected, eq } => eq(expected, arguments),
            ArgMatcher::Predicate { predicate, .. } => predicate(arguments),
        }
    }

    /// Whether this is the match-any matcher.
    pub fn is_any(&self) -> bool {
        matches!(self, ArgMatcher::Any)
    }

    /// Human-readable form: `any`, `== 3`, or `matching(<description>)`.
    pub fn describe(&self) -> String
    where
        A: fmt::Debug,
    {
        match self {
            ArgMatcher::Any => "any".to_string(),
            ArgMatcher::Equals { expected, .. } => format!("== {:?}", expected),
            ArgMatcher::Predicate { description, .. } => format!("matching({})", description),
        }
    }

    /// Type-erase the matcher for use against recorded invocations.
    ///
    /// Arguments of any other type than `A` never match.
    pub fn erase(self) -> ErasedMatcher
    where
        A: fmt::Debug + Send + Sync + 'static,
    {
        let description = self.describe();
        if self.is_any() {
            return ErasedMatcher::any();
        }
        ErasedMatcher {
            description,
            any: false,
            test: Arc::new(move |raw: &(dyn Any + Send + Sync)| {
                raw.downcast_ref::<A>()
                    .is_some_and(|arguments| self.matches(arguments))
            }),
        }
    }
}

impl<A: Clone> Clone for ArgMatcher<A> {
    fn clone(&self) -> Self {
        match self {
            ArgMatcher::Any => ArgMatcher::Any,
            ArgMatcher::Equals { expected, eq } => ArgMatcher::Equals {
                expected: expected.clone(),
                eq: *eq,
            },
            ArgMatcher::Predicate {
                description,
                predicate,
            } => ArgMatcher::Predicate {
                description: description.clone(),
                predicate: Arc::clone(predicate),
            },
        }
    }
}

impl<A: fmt::Debug> fmt::Debug for ArgMatcher<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgMatcher::Any => f.write_str("Any"),
            ArgMatcher::Equals { expected, .. } => {
                f.debug_struct("Equals").field("expected", expected).finish()
            }
            ArgMatcher::Predicate { description, .. } => f
                .debug_struct("Predicate")
                .field("description", description)
                .field("predicate", &"<fn>")
                .finish(),
        }
    }
}

impl<A> Default for ArgMatcher<A> {
    fn default() -> Self {
        ArgMatcher::Any
    }
}

type ErasedTest = Arc<dyn Fn(&(dyn Any + Send + Sync)) -> bool + Send + Sync>;

/// Matcher over type-erased argument snapshots.
#[derive(Clone)]
pub struct ErasedMatcher {
    description: String,
    any: bool,
    test: ErasedTest,
}

impl ErasedMatcher {
    /// Match-any.
    pub fn any() -> Self {
        Self {
            description: "any".to_string(),
            any: true,
            test: Arc::new(|_| true),
        }
    }

    /// Evaluate against type-erased arguments.
    pub fn matches(&self, arguments: &(dyn Any + Send + Sync)) -> bool {
        (self.test)(arguments)
    }

    /// Rendered form used in diagnostics.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether this is the match-any matcher.
    pub fn is_any(&self) -> bool {
        self.any
    }
}

impl fmt::Debug for ErasedMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedMatcher")
            .field("description", &self.description)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_matches_everything() {
        let m = ArgMatcher::<i32>::any();
        assert!(m.matches(&0));
        assert!(m.matches(&-7));
        assert_eq!(m.describe(), "any");
    }

    #[test]
    fn test_equals() {
        let m = ArgMatcher::eq((1, "a".to_string()));
        assert!(m.matches(&(1, "a".to_string())));
        assert!(!m.matches(&(1, "b".to_string())));
        assert_eq!(m.describe(), "== (1, \"a\")");
    }

    #[test]
    fn test_predicate() {
        let m = ArgMatcher::described(">= 0", |v: &i32| *v >= 0);
        assert!(m.matches(&0));
        assert!(!m.matches(&-1));
        assert_eq!(m.describe(), "matching(>= 0)");
    }

    #[test]
    fn test_erased_matches_like_typed() {
        let typed = ArgMatcher::predicate(|v: &i32| *v % 2 == 0);
        let erased = typed.clone().erase();

        for v in -4..4 {
            assert_eq!(typed.matches(&v), erased.matches(&v));
        }
    }

    #[test]
    fn test_erased_rejects_other_types() {
        let erased = ArgMatcher::eq(3_i32).erase();
        assert!(erased.matches(&3_i32));
        assert!(!erased.matches(&3_i64));
    }

    #[test]
    fn test_erased_any() {
        let erased = ArgMatcher::<i32>::any().erase();
        assert!(erased.is_any());
        assert!(erased.matches(&"anything"));
    }
}
