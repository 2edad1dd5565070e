//! Heating-logic predicates: the `TemperatureBased` and `StateOfChargeBased`
//! turn-on / shut-off / standby conditions evaluated against a tank.

use serde::{Deserialize, Serialize};

use crate::comparator::Comparator;
use crate::distribution::Distribution;
use crate::error::{ControlError, ControlResult};
use crate::tank_view::{weighted_tank_value, TankView};

/// The reference temperature a `TemperatureBased` predicate compares against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Reference {
    /// A fixed decision temperature, degrees C.
    Absolute(f64),
    /// `setpoint - differential`, re-evaluated against the live setpoint
    /// every step.
    Differential(f64),
}

impl Reference {
    fn resolve(self, setpoint_c: f64) -> f64 {
        match self {
            Reference::Absolute(t) => t,
            Reference::Differential(d) => setpoint_c - d,
        }
    }
}

/// Where a `StateOfChargeBased` predicate reads the mains (inlet) temperature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Mains {
    /// Use the step's live inlet mains reading.
    Live,
    /// Substitute a fixed temperature, degrees C, ignoring the live inlet.
    Constant(f64),
}

/// A decision temperature compared against a weighted tank-side value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureBased {
    pub distribution: Distribution,
    pub reference: Reference,
    pub comparator: Comparator,
    /// When true, this predicate also requires the source's standby logic
    /// to currently hold.
    pub requires_standby: bool,
}

/// A fractional decision point on tank state of charge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateOfChargeBased {
    pub decision_point: f64,
    pub hysteresis: f64,
    pub min_useful_temp_c: f64,
    pub mains: Mains,
}

/// A per-heat-source turn-on, shut-off, or standby predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HeatingLogic {
    TemperatureBased(TemperatureBased),
    StateOfChargeBased(StateOfChargeBased),
}

impl HeatingLogic {
    /// Evaluate the predicate against the current tank state.
    ///
    /// `standby_active` is the source's own standby predicate result; it is
    /// only consulted when a `TemperatureBased` predicate has
    /// `requires_standby` set.
    pub fn evaluate(&self, tank: &dyn TankView, standby_active: bool) -> ControlResult<bool> {
        match self {
            HeatingLogic::TemperatureBased(t) => t.evaluate(tank, standby_active),
            HeatingLogic::StateOfChargeBased(s) => s.evaluate(tank),
        }
    }
}

impl TemperatureBased {
    fn evaluate(&self, tank: &dyn TankView, standby_active: bool) -> ControlResult<bool> {
        let weights = self.distribution.resolve(tank.node_count());
        let tank_value = weighted_tank_value(tank, &weights);
        let reference_value = self.reference.resolve(tank.setpoint_c());
        let holds = self.comparator.compare(tank_value, reference_value);
        Ok(if self.requires_standby {
            holds && standby_active
        } else {
            holds
        })
    }
}

impl StateOfChargeBased {
    /// Charge at temperature `t`, relative to `(mains, min_useful)`, clipped
    /// to non-negative.
    fn charge_per_node(&self, t_c: f64, mains_c: f64) -> f64 {
        let denom = self.min_useful_temp_c - mains_c;
        if denom.abs() < 1e-12 {
            return 0.0;
        }
        ((t_c - mains_c) / denom).max(0.0)
    }

    fn mains_temp_c(&self, tank: &dyn TankView) -> ControlResult<f64> {
        match self.mains {
            Mains::Constant(t) => Ok(t),
            Mains::Live => tank.live_mains_temp_c().ok_or(ControlError::NoMainsAvailable),
        }
    }

    /// `soc_fraction` per §4.3: charge summed across nodes, normalized by
    /// `n_nodes * charge_per_node(setpoint)`.
    pub fn soc_fraction(&self, tank: &dyn TankView) -> ControlResult<f64> {
        let mains_c = self.mains_temp_c(tank)?;
        let max_charge = self.charge_per_node(tank.setpoint_c(), mains_c);
        if max_charge <= 0.0 {
            return Ok(0.0);
        }
        let n = tank.node_count();
        let sum: f64 = (0..n)
            .map(|i| self.charge_per_node(tank.node_temp_c(i), mains_c))
            .sum();
        Ok(sum / (n as f64 * max_charge))
    }

    fn evaluate(&self, tank: &dyn TankView) -> ControlResult<bool> {
        let soc = self.soc_fraction(tank)?;
        Ok(soc < self.decision_point + self.hysteresis)
    }
}
