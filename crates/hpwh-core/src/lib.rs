//! hpwh-core: stable foundation shared by every other crate in the workspace.
//!
//! Contains:
//! - numeric (Real + tolerances + finite-value checks)
//! - ids (stable compact IDs for heat-source cross references)
//! - error (shared error type)
//! - timing (opt-in coarse performance instrumentation)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod timing;

pub use error::{HpwhError, HpwhResult};
pub use ids::*;
pub use numeric::*;
