//! Error types for the tank and heat-source stepping model.

use thiserror::Error;

/// Errors encountered while stepping the simulation.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// A boundary condition for the step was physically inconsistent
    /// (e.g. `draw2 > draw`, a negative volume, a non-finite temperature).
    /// The step is abandoned; tank state is left as of the prior step.
    #[error("Invalid boundary condition: {what}")]
    BoundaryCondition { what: String },

    /// The conduction stability criterion `tau <= 1` was violated.
    #[error("Conduction step unstable: tau={tau} exceeds 1.0 (reduce step size or node count)")]
    UnstableConduction { tau: f64 },

    #[error("Non-physical condition: {what}")]
    NonPhysical { what: String },

    #[error(transparent)]
    Control(#[from] hpwh_control::ControlError),

    #[error(transparent)]
    Core(#[from] hpwh_core::HpwhError),
}

pub type SimResult<T> = Result<T, SimError>;
