//! Error types for control-logic evaluation.

use thiserror::Error;

/// Result type for control-logic operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur while evaluating heating logic.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// A `Distribution`'s weights did not sum to a positive value.
    #[error("Invalid heat distribution: {what}")]
    InvalidDistribution { what: String },

    /// A state-of-charge predicate had no live mains reading and no
    /// constant-mains substitute configured.
    #[error("No mains temperature available for state-of-charge evaluation")]
    NoMainsAvailable,

    /// A linked heat-source ID (backup/companion/follower) failed to resolve.
    #[error("Unresolved heat source link: {what}")]
    UnresolvedLink { what: String },
}
