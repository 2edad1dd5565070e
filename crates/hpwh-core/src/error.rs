use thiserror::Error;

pub type HpwhResult<T> = Result<T, HpwhError>;

/// Shared error type for the simulation core.
///
/// Mirrors the five error kinds the model distinguishes: configuration
/// errors are raised at construction, boundary-condition errors during a
/// step, out-of-range conditions are warnings (see `hpwh_app::Reporter`),
/// physics clamps are silent, and I/O errors live in `hpwh-io`.
#[derive(Error, Debug)]
pub enum HpwhError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Index out of bounds: {what} (index={index}, len={len})")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },
}
