//! Stepping model for a heat-pump water heater: stratified tank, heat
//! sources, and the single-threaded synchronous stepper that ties them
//! together.
//!
//! # Module map
//!
//! - [`tank`] — the stratified tank: draw displacement, standby losses,
//!   conduction, inversion mixing.
//! - [`performance_map`] — bilinear-interpolated compressor performance
//!   grid.
//! - [`heat_source`] — compressor and resistance heat sources.
//! - [`stepper`] — `Hpwh`, owning the tank and heat-source set and running
//!   one step at a time.

pub mod error;
pub mod heat_source;
pub mod performance_map;
pub mod stepper;
pub mod tank;

pub use error::{SimError, SimResult};
pub use heat_source::{Compressor, CompressorConfig, HeatSource, HeatSourceKind, Resistance};
pub use performance_map::{PerformanceMap, PerformancePoint};
pub use stepper::{Hpwh, StepInputs, StepOutputs};
pub use tank::{Tank, TankConfig};
