//! Application error type aggregating every backend crate's error into one
//! surface the CLI can report, mirroring the teacher's service-layer
//! `AppError`: one variant per backend, `#[from]` wired so `?` composes
//! across crate boundaries without manual `.map_err`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("model error: {0}")]
    Model(#[from] hpwh_model::ModelError),

    #[error("simulation error: {0}")]
    Sim(#[from] hpwh_sim::SimError),

    #[error("control error: {0}")]
    Control(#[from] hpwh_control::ControlError),

    #[error("I/O error: {0}")]
    Io(#[from] hpwh_io::IoError),

    #[error("failed to read {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model JSON at {path}")]
    ParseModel {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no such preset: {0}")]
    UnknownPreset(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type AppResult<T> = Result<T, AppError>;
