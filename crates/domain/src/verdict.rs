//! The pass/fail result of one validation run.

use crate::Failure;
use serde::{Deserialize, Serialize};

/// Outcome of running all validators bound to a message type against one
/// message instance.
///
/// A verdict is transient: created per call, consumed by the interceptor, and
/// discarded. The failure list preserves registration order across validators
/// regardless of their completion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    failures: Vec<Failure>,
}

impl ValidationVerdict {
    /// A verdict with no failures. Messages with no bound validators are
    /// implicitly valid.
    #[must_use]
    pub const fn valid() -> Self {
        Self {
            failures: Vec::new(),
        }
    }

    /// Build a verdict from a single failure list.
    #[must_use]
    pub fn from_failures(failures: Vec<Failure>) -> Self {
        Self { failures }
    }

    /// Merge per-validator failure lists, preserving the outer (registration)
    /// order and the inner (rule-firing) order.
    #[must_use]
    pub fn from_failure_lists(lists: Vec<Vec<Failure>>) -> Self {
        let failures = lists.into_iter().flatten().collect();
        Self { failures }
    }

    /// Returns true when no validator reported a failure.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    /// Ordered failure list.
    #[must_use]
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// Consume the verdict, returning the ordered failure list.
    #[must_use]
    pub fn into_failures(self) -> Vec<Failure> {
        self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_verdict_is_valid() {
        let verdict = ValidationVerdict::valid();
        assert!(verdict.is_valid());
        assert!(verdict.failures().is_empty());
    }

    #[test]
    fn verdict_with_failures_is_invalid() {
        let verdict =
            ValidationVerdict::from_failures(vec![Failure::new("name", "must not be empty")]);
        assert!(!verdict.is_valid());
        assert_eq!(verdict.failures().len(), 1);
    }

    #[test]
    fn merge_preserves_outer_then_inner_order() {
        let first = vec![
            Failure::new("a", "first rule"),
            Failure::new("a", "second rule"),
        ];
        let second = vec![Failure::new("b", "third rule")];

        let verdict = ValidationVerdict::from_failure_lists(vec![first, second]);
        let messages: Vec<&str> = verdict
            .failures()
            .iter()
            .map(|failure| failure.message())
            .collect();
        assert_eq!(messages, vec!["first rule", "second rule", "third rule"]);
    }

    proptest! {
        #[test]
        fn merge_is_order_and_length_preserving(lists in failure_lists()) {
            let expected: Vec<String> = lists
                .iter()
                .flatten()
                .map(|failure| failure.message().to_owned())
                .collect();

            let verdict = ValidationVerdict::from_failure_lists(lists);
            let merged: Vec<String> = verdict
                .failures()
                .iter()
                .map(|failure| failure.message().to_owned())
                .collect();

            prop_assert_eq!(merged, expected);
        }
    }

    fn failure_lists() -> impl Strategy<Value = Vec<Vec<Failure>>> {
        prop::collection::vec(
            prop::collection::vec("[a-z]{1,8}", 0..4).prop_map(|messages| {
                messages
                    .into_iter()
                    .map(|message| Failure::new("field", message))
                    .collect()
            }),
            0..5,
        )
    }
}
