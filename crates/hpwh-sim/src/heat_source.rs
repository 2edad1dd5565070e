//! Heat sources: compressors (performance-map driven) and resistance
//! elements, plus the shared turn-on/shut-off/heat contract both honor.

use hpwh_control::{Distribution, HeatingLogic};
use hpwh_core::HeatSourceId;

use crate::error::SimResult;
use crate::performance_map::PerformanceMap;
use crate::tank::Tank;

/// How a compressor's condenser couples to the tank.
#[derive(Debug, Clone)]
pub enum CompressorConfig {
    /// Coil submerged in or wrapped around the tank; condenser temperature
    /// is read from the lower third of the tank.
    SubmergedOrWrapped,
    /// External condenser: condenser (refrigerant-side) temperature is read
    /// from `external_inlet_node`, the tank node water returns to after a
    /// pass through the condenser. `external_outlet_node` records the node
    /// water is drawn from but is not yet consumed by the model: a real
    /// flow-loop deposit needs a mass-flow-rate (`ṁ`) input this schema
    /// doesn't carry, so heat is applied the same way as
    /// `SubmergedOrWrapped`, via `heat_distribution` rather than a ṁ/Cp
    /// return-node injection. This is a partial approximation of spec
    /// §4.2's flow-loop description, not a full implementation.
    ExternalSinglePass {
        external_inlet_node: usize,
        external_outlet_node: usize,
    },
    /// Like `ExternalSinglePass`: same partial approximation, and multi-pass
    /// recirculation within a step is not separately modeled (a single
    /// distribution-weighted deposit stands in for repeated circulation).
    ExternalMultiPass {
        external_inlet_node: usize,
        external_outlet_node: usize,
    },
}

/// A compressor heat source: performance-map driven, with an ambient
/// lockout.
#[derive(Debug, Clone)]
pub struct Compressor {
    pub performance_map: PerformanceMap,
    pub config: CompressorConfig,
    pub min_ambient_t_c: f64,
    pub lockout_hysteresis_c: f64,
    locked_out: bool,
}

impl Compressor {
    pub fn new(
        performance_map: PerformanceMap,
        config: CompressorConfig,
        min_ambient_t_c: f64,
        lockout_hysteresis_c: f64,
    ) -> Self {
        Self {
            performance_map,
            config,
            min_ambient_t_c,
            lockout_hysteresis_c,
            locked_out: false,
        }
    }

    pub fn is_locked_out(&self) -> bool {
        self.locked_out
    }

    fn update_lockout(&mut self, ambient_t_c: f64) {
        if self.locked_out {
            if ambient_t_c > self.min_ambient_t_c + self.lockout_hysteresis_c {
                self.locked_out = false;
            }
        } else if ambient_t_c < self.min_ambient_t_c {
            self.locked_out = true;
        }
    }

    fn condenser_water_t_c(&self, tank: &Tank) -> f64 {
        match self.config {
            CompressorConfig::SubmergedOrWrapped => {
                let n = tank.n_nodes();
                let lower_third = ((n as f64) / 3.0).ceil() as usize;
                let lower_third = lower_third.clamp(1, n);
                tank.node_temps_c()[..lower_third].iter().sum::<f64>() / lower_third as f64
            }
            CompressorConfig::ExternalSinglePass {
                external_inlet_node,
                ..
            }
            | CompressorConfig::ExternalMultiPass {
                external_inlet_node,
                ..
            } => tank.node_temps_c()[external_inlet_node],
        }
    }
}

/// A constant-power electric resistance element.
#[derive(Debug, Clone, Copy)]
pub struct Resistance {
    pub input_power_kw: f64,
}

/// The two kinds of heat source the model supports.
#[derive(Debug, Clone)]
pub enum HeatSourceKind {
    Compressor(Compressor),
    Resistance(Resistance),
}

/// One heating element: its physical model, distribution, control logic,
/// cross-source links, and per-step accumulators.
#[derive(Debug, Clone)]
pub struct HeatSource {
    pub name: String,
    pub kind: HeatSourceKind,
    pub heat_distribution: Distribution,
    pub turn_on_logic: Vec<HeatingLogic>,
    pub shut_off_logic: Vec<HeatingLogic>,
    pub standby_logic: Option<HeatingLogic>,
    pub is_vip: bool,
    pub backup_heat_source: Option<HeatSourceId>,
    pub companion_heat_source: Option<HeatSourceId>,
    pub followed_by_heat_source: Option<HeatSourceId>,
    is_on: bool,
    runtime_min: f64,
    energy_input_kwh: f64,
    energy_output_kwh: f64,
}

impl HeatSource {
    pub fn new(name: impl Into<String>, kind: HeatSourceKind, heat_distribution: Distribution) -> Self {
        Self {
            name: name.into(),
            kind,
            heat_distribution,
            turn_on_logic: Vec::new(),
            shut_off_logic: Vec::new(),
            standby_logic: None,
            is_vip: false,
            backup_heat_source: None,
            companion_heat_source: None,
            followed_by_heat_source: None,
            is_on: false,
            runtime_min: 0.0,
            energy_input_kwh: 0.0,
            energy_output_kwh: 0.0,
        }
    }

    pub fn is_on(&self) -> bool {
        self.is_on
    }

    pub fn set_is_on(&mut self, is_on: bool) {
        self.is_on = is_on;
    }

    pub fn reset_accumulators(&mut self) {
        self.runtime_min = 0.0;
        self.energy_input_kwh = 0.0;
        self.energy_output_kwh = 0.0;
    }

    pub fn runtime_min(&self) -> f64 {
        self.runtime_min
    }

    pub fn energy_input_kwh(&self) -> f64 {
        self.energy_input_kwh
    }

    pub fn energy_output_kwh(&self) -> f64 {
        self.energy_output_kwh
    }

    pub fn is_locked_out(&self) -> bool {
        match &self.kind {
            HeatSourceKind::Compressor(c) => c.is_locked_out(),
            HeatSourceKind::Resistance(_) => false,
        }
    }

    fn update_lockout(&mut self, ambient_t_c: f64) {
        if let HeatSourceKind::Compressor(c) = &mut self.kind {
            c.update_lockout(ambient_t_c);
        }
    }

    /// True when any turn-on predicate passes, the source is not in an
    /// ambient lockout, and its shut-off predicates are not already
    /// triggered.
    pub fn should_heat(&mut self, tank: &Tank, ambient_t_c: f64) -> SimResult<bool> {
        self.update_lockout(ambient_t_c);
        if self.is_locked_out() {
            return Ok(false);
        }

        let standby_active = match &self.standby_logic {
            Some(logic) => logic.evaluate(tank, false)?,
            None => false,
        };

        let mut should_engage = false;
        for logic in &self.turn_on_logic {
            if logic.evaluate(tank, standby_active)? {
                should_engage = true;
                break;
            }
        }

        if should_engage && self.shuts_off(tank)? {
            should_engage = false;
        }
        Ok(should_engage)
    }

    /// True when any shut-off predicate passes, or the bottom node is at or
    /// above setpoint.
    pub fn shuts_off(&self, tank: &Tank) -> SimResult<bool> {
        if tank.node_temps_c()[0] >= tank.setpoint_c() {
            return Ok(true);
        }
        for logic in &self.shut_off_logic {
            if logic.evaluate(tank, false)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Deposit `capacity_kj` into `tank` per `heat_distribution`, top of the
    /// distribution downward, clamping any node at `max_setpoint_t_c` and
    /// carrying leftover to the next lower band. Returns undischarged heat.
    pub fn heat(&self, capacity_kj: f64, max_setpoint_t_c: f64, tank: &mut Tank) -> f64 {
        deposit_heat(&self.heat_distribution, capacity_kj, max_setpoint_t_c, tank)
    }

    /// Run this source for one step: compute capacity from its physical
    /// model, prorate against the shut-off predicate if it would trip
    /// partway through the step, deposit heat, and update accumulators.
    pub fn run_step(
        &mut self,
        tank: &mut Tank,
        evaporator_air_t_c: f64,
        max_setpoint_t_c: f64,
        step_seconds: f64,
    ) -> SimResult<()> {
        let dt_h = step_seconds / 3600.0;
        let (full_capacity_kj, full_input_kwh) = match &self.kind {
            HeatSourceKind::Resistance(r) => {
                let input_kwh = r.input_power_kw * dt_h;
                (input_kwh * 3600.0, input_kwh)
            }
            HeatSourceKind::Compressor(c) => {
                let condenser_t_c = c.condenser_water_t_c(tank);
                let point = c.performance_map.lookup(evaporator_air_t_c, condenser_t_c);
                let input_kwh = point.input_power_kw * dt_h;
                (point.heating_capacity_kw * dt_h * 3600.0, input_kwh)
            }
        };

        let fraction =
            fraction_to_meet_shutoff(&self.heat_distribution, tank, full_capacity_kj, max_setpoint_t_c, self);

        let applied_kj = full_capacity_kj * fraction;
        let leftover_kj = self.heat(applied_kj, max_setpoint_t_c, tank);
        let delivered_kj = (applied_kj - leftover_kj).max(0.0);

        self.runtime_min += fraction * step_seconds / 60.0;
        self.energy_input_kwh += full_input_kwh * fraction;
        self.energy_output_kwh += delivered_kj / 3600.0;

        if fraction < 1.0 {
            self.is_on = false;
        }

        Ok(())
    }
}

fn deposit_heat(
    distribution: &Distribution,
    capacity_kj: f64,
    max_setpoint_t_c: f64,
    tank: &mut Tank,
) -> f64 {
    let weights = distribution.resolve(tank.n_nodes());
    let mut leftover_kj = 0.0;
    for i in (0..tank.n_nodes()).rev() {
        let node_cap_kj = capacity_kj * weights[i];
        if node_cap_kj != 0.0 {
            let heat_to_add_kj = node_cap_kj + leftover_kj;
            leftover_kj = tank.add_heat_above_node(heat_to_add_kj, i, max_setpoint_t_c);
        }
    }
    leftover_kj
}

/// Bisect on the capacity fraction in `[0, 1]` to find the point at which
/// the shut-off condition would just become true, prorating runtime for
/// sources that reach shut-off partway through a step.
fn fraction_to_meet_shutoff(
    distribution: &Distribution,
    tank: &Tank,
    full_capacity_kj: f64,
    max_setpoint_t_c: f64,
    source: &HeatSource,
) -> f64 {
    let mut probe = tank.clone();
    deposit_heat(distribution, full_capacity_kj, max_setpoint_t_c, &mut probe);
    if !source.shuts_off(&probe).unwrap_or(false) {
        return 1.0;
    }

    let mut lo = 0.0_f64;
    let mut hi = 1.0_f64;
    for _ in 0..24 {
        let mid = 0.5 * (lo + hi);
        let mut probe = tank.clone();
        deposit_heat(distribution, full_capacity_kj * mid, max_setpoint_t_c, &mut probe);
        if source.shuts_off(&probe).unwrap_or(false) {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    hi.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tank::TankConfig;
    use hpwh_control::{Comparator, Reference, TemperatureBased};

    fn bottom_heat_tank(n: usize, t_c: f64) -> Tank {
        Tank::new(TankConfig {
            n_nodes: n,
            setpoint_c: t_c,
            ..TankConfig::default()
        })
        .unwrap()
    }

    fn resistance_source(power_kw: f64) -> HeatSource {
        let mut hs = HeatSource::new(
            "lower element",
            HeatSourceKind::Resistance(Resistance {
                input_power_kw: power_kw,
            }),
            Distribution::BottomOfTank,
        );
        hs.turn_on_logic.push(HeatingLogic::TemperatureBased(TemperatureBased {
            distribution: Distribution::BottomOfTank,
            reference: Reference::Absolute(48.0),
            comparator: Comparator::LessThan,
            requires_standby: false,
        }));
        hs
    }

    #[test]
    fn should_heat_when_bottom_below_threshold() {
        let mut hs = resistance_source(4.5);
        let tank = bottom_heat_tank(6, 30.0);
        assert!(hs.should_heat(&tank, 20.0).unwrap());
    }

    #[test]
    fn shuts_off_when_bottom_at_setpoint() {
        let hs = resistance_source(4.5);
        let tank = bottom_heat_tank(6, 51.0);
        assert!(hs.shuts_off(&tank).unwrap());
    }

    #[test]
    fn run_step_deposits_heat_and_tracks_energy() {
        let mut hs = resistance_source(4.5);
        let mut tank = bottom_heat_tank(6, 30.0);
        hs.run_step(&mut tank, 20.0, 60.0, 60.0).unwrap();
        assert!(hs.energy_input_kwh() > 0.0);
        assert!(hs.energy_output_kwh() > 0.0);
        assert!(tank.node_temps_c()[0] > 30.0);
    }

    #[test]
    fn run_step_prorates_runtime_on_early_shutoff() {
        // a huge resistor should overshoot the shut-off within the step,
        // so fraction should land below 1.0.
        let mut hs = resistance_source(500.0);
        let mut tank = bottom_heat_tank(6, 30.0);
        hs.run_step(&mut tank, 20.0, 51.0, 60.0).unwrap();
        assert!(hs.runtime_min() < 1.0);
        assert!(tank.node_temps_c()[0] <= 51.0 + 1e-6);
    }

    #[test]
    fn ambient_lockout_blocks_compressor_below_min() {
        let map = crate::performance_map::PerformanceMap::new(
            vec![-10.0, 30.0],
            vec![20.0, 50.0],
            vec![1.0, 1.0, 1.0, 1.0],
            vec![3.0, 3.0, 3.0, 3.0],
        )
        .unwrap();
        let mut hs = HeatSource::new(
            "compressor",
            HeatSourceKind::Compressor(Compressor::new(
                map,
                CompressorConfig::SubmergedOrWrapped,
                7.0,
                1.0,
            )),
            Distribution::BottomOfTank,
        );
        hs.turn_on_logic.push(HeatingLogic::TemperatureBased(TemperatureBased {
            distribution: Distribution::BottomOfTank,
            reference: Reference::Absolute(48.0),
            comparator: Comparator::LessThan,
            requires_standby: false,
        }));
        let tank = bottom_heat_tank(6, 30.0);
        assert!(!hs.should_heat(&tank, 5.0).unwrap());
        assert!(hs.is_locked_out());
    }
}
