//! Control logic primitives for heat-pump water heater simulation.
//!
//! This crate is deliberately independent of `hpwh-sim`: predicates are
//! evaluated against the `TankView` trait rather than a concrete `Tank`, so
//! control logic can be unit tested without pulling in the full stepping
//! model.
//!
//! # Contents
//!
//! - [`Distribution`] — weighted distribution over normalized tank height,
//!   used both for heat injection and for weighting which nodes contribute
//!   to a temperature-based predicate's tank-side value.
//! - [`HeatingLogic`] — the `TemperatureBased` / `StateOfChargeBased`
//!   predicate sum type.
//! - [`DrSignal`] — the per-step demand-response bitmask.

pub mod comparator;
pub mod distribution;
pub mod dr;
pub mod error;
pub mod heating_logic;
pub mod tank_view;

pub use comparator::Comparator;
pub use distribution::{Distribution, DistributionPoint};
pub use dr::DrSignal;
pub use error::{ControlError, ControlResult};
pub use heating_logic::{HeatingLogic, Mains, Reference, StateOfChargeBased, TemperatureBased};
pub use tank_view::{weighted_tank_value, TankView};
