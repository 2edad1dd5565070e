//! Errors raised while parsing and building a model from `HPWHSimInput`.

use thiserror::Error;

/// Errors that can occur while building an `Hpwh` from a parsed model.
///
/// These are all configuration errors in the sense of spec §7: raised at
/// construction, before a single step runs.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Malformed JSON model: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required field: {what}")]
    MissingField { what: &'static str },

    #[error("Duplicate heat source id: {id}")]
    DuplicateId { id: String },

    #[error("Unresolved heat source link: source '{source}' references unknown id '{target}'")]
    UnresolvedLink { source: String, target: String },

    #[error("Cyclic heat source link graph detected, starting at '{start}'")]
    CyclicLinks { start: String },

    #[error(transparent)]
    Control(#[from] hpwh_control::ControlError),

    #[error(transparent)]
    Sim(#[from] hpwh_sim::SimError),
}

pub type ModelResult<T> = Result<T, ModelError>;
