//! Comparison operator used by `TemperatureBased` predicates.

use serde::{Deserialize, Serialize};

/// The two comparisons a temperature-based predicate can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    LessThan,
    GreaterThan,
}

impl Comparator {
    /// Evaluate `lhs <compare> rhs`.
    pub fn compare(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparator::LessThan => lhs < rhs,
            Comparator::GreaterThan => lhs > rhs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn less_than() {
        assert!(Comparator::LessThan.compare(1.0, 2.0));
        assert!(!Comparator::LessThan.compare(2.0, 1.0));
    }

    #[test]
    fn greater_than() {
        assert!(Comparator::GreaterThan.compare(2.0, 1.0));
        assert!(!Comparator::GreaterThan.compare(1.0, 2.0));
    }
}
