//! JSON model schema, builder, and preset catalog for the HPWH simulation
//! core.
//!
//! - [`schema`] — serde types mirroring the `HPWHSimInput` JSON shape.
//! - [`build`] — resolves cross-source ID links into indices (with cycle
//!   detection) and constructs a runnable `hpwh_sim::Hpwh`.
//! - [`presets`] — a small built-in catalog of representative models.

pub mod build;
pub mod error;
pub mod presets;
pub mod schema;

pub use build::build_hpwh;
pub use error::{ModelError, ModelResult};
pub use presets::Preset;
pub use schema::HpwhSimInput;
