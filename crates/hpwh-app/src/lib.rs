//! Orchestration layer between the CLI and the simulation backend crates:
//! loading models, driving a run to completion, writing results, and the
//! standardized rating procedures built on top of a run.

pub mod config;
pub mod driver;
pub mod error;
pub mod rating;
pub mod reporter;

pub use config::{SimulationConfig, UnitMode, Verbosity};
pub use driver::{
    load_model, load_model_file, run_model_against_schedules, run_test_directory,
    run_test_directory_with, RunReport,
};
pub use error::{AppError, AppResult};
pub use rating::{
    first_hour_rating, search_for_uef, simplified_uef, FirstHourRating, MakeResult, UefResult,
};
pub use reporter::{CollectingReporter, Reporter, TracingReporter};
