//! `Hpwh`: owns the tank and heat-source set, and runs one step of the
//! simulation in the order fixed by §5: boundary intake, tank draw and
//! losses, controller decisions, source heating in engagement order,
//! inversion mixing, accumulator finalization.

use hpwh_control::DrSignal;
use hpwh_core::HeatSourceId;

use crate::error::SimResult;
use crate::heat_source::HeatSource;
use crate::tank::Tank;

/// Boundary conditions for one step.
#[derive(Debug, Clone, Copy)]
pub struct StepInputs {
    pub draw_volume_l: f64,
    pub inlet_t_c: f64,
    pub ambient_t_c: f64,
    pub evaporator_t_c: f64,
    pub draw_volume2_l: f64,
    pub inlet2_t_c: f64,
    pub dr_signal: DrSignal,
}

impl Default for StepInputs {
    fn default() -> Self {
        Self {
            draw_volume_l: 0.0,
            inlet_t_c: 15.0,
            ambient_t_c: 20.0,
            evaporator_t_c: 20.0,
            draw_volume2_l: 0.0,
            inlet2_t_c: 15.0,
            dr_signal: DrSignal::default(),
        }
    }
}

/// Per-source and aggregate results for one step.
#[derive(Debug, Clone)]
pub struct StepOutputs {
    pub outlet_temp_c: f64,
    pub standby_loss_kj: f64,
    pub per_source_runtime_min: Vec<f64>,
    pub per_source_energy_input_kwh: Vec<f64>,
    pub per_source_energy_output_kwh: Vec<f64>,
}

impl StepOutputs {
    pub fn total_energy_input_kwh(&self) -> f64 {
        self.per_source_energy_input_kwh.iter().sum()
    }

    pub fn total_energy_output_kwh(&self) -> f64 {
        self.per_source_energy_output_kwh.iter().sum()
    }
}

/// Owns the tank and every heat source; advances one minute at a time.
#[derive(Debug, Clone)]
pub struct Hpwh {
    tank: Tank,
    heat_sources: Vec<HeatSource>,
    step_seconds: f64,
}

impl Hpwh {
    pub fn new(tank: Tank, heat_sources: Vec<HeatSource>, step_seconds: f64) -> Self {
        Self {
            tank,
            heat_sources,
            step_seconds,
        }
    }

    pub fn tank(&self) -> &Tank {
        &self.tank
    }

    pub fn heat_sources(&self) -> &[HeatSource] {
        &self.heat_sources
    }

    fn index_of(&self, id: HeatSourceId) -> Option<usize> {
        let idx = id.index_usize();
        if idx < self.heat_sources.len() {
            Some(idx)
        } else {
            None
        }
    }

    /// Advance the simulation by one step.
    pub fn step(&mut self, inputs: StepInputs) -> SimResult<StepOutputs> {
        for source in &mut self.heat_sources {
            source.reset_accumulators();
        }

        let draw = self.tank.update_nodes(
            inputs.draw_volume_l,
            inputs.inlet_t_c,
            inputs.ambient_t_c,
            inputs.draw_volume2_l,
            inputs.inlet2_t_c,
            self.step_seconds,
        )?;

        self.decide_engagement(inputs.ambient_t_c, inputs.dr_signal)?;
        self.run_engaged_sources(inputs.evaporator_t_c)?;

        self.tank.mix_inversions();

        let n = self.heat_sources.len();
        let mut per_runtime = Vec::with_capacity(n);
        let mut per_input = Vec::with_capacity(n);
        let mut per_output = Vec::with_capacity(n);
        for source in &self.heat_sources {
            per_runtime.push(source.runtime_min());
            per_input.push(source.energy_input_kwh());
            per_output.push(source.energy_output_kwh());
        }

        Ok(StepOutputs {
            outlet_temp_c: draw.outlet_temp_c,
            standby_loss_kj: draw.standby_loss_kj,
            per_source_runtime_min: per_runtime,
            per_source_energy_input_kwh: per_input,
            per_source_energy_output_kwh: per_output,
        })
    }

    /// VIP sources first, then the rest; companion sources are cascaded in
    /// alongside whichever source they're attached to; ambient-locked-out
    /// sources disengage in favor of their declared backup.
    fn decide_engagement(&mut self, ambient_t_c: f64, dr: DrSignal) -> SimResult<()> {
        let n = self.heat_sources.len();
        let order: Vec<usize> = {
            let mut vip: Vec<usize> = (0..n).filter(|&i| self.heat_sources[i].is_vip).collect();
            let mut rest: Vec<usize> = (0..n).filter(|&i| !self.heat_sources[i].is_vip).collect();
            vip.append(&mut rest);
            vip
        };

        for idx in order {
            if dr.is_blocked() {
                // turn-on masked; sources already on may still finish their
                // run via shuts_off evaluation below.
                if self.heat_sources[idx].is_on() {
                    let shuts_off = self.heat_sources[idx].shuts_off(&self.tank)?;
                    if shuts_off {
                        self.heat_sources[idx].set_is_on(false);
                    }
                }
                continue;
            }

            let already_on = self.heat_sources[idx].is_on();
            if already_on {
                let shuts_off = self.heat_sources[idx].shuts_off(&self.tank)?;
                if shuts_off {
                    self.heat_sources[idx].set_is_on(false);
                } else {
                    continue; // keeps running
                }
            }

            let should_heat = self.heat_sources[idx].should_heat(&self.tank, ambient_t_c)?;
            if should_heat {
                self.engage_with_companion(idx)?;
            }

            if self.heat_sources[idx].is_locked_out() {
                self.engage_backup(idx)?;
            }
        }

        if dr.forces_compressor() {
            if let Some(idx) = (0..n).find(|&i| {
                matches!(
                    self.heat_sources[i].kind,
                    crate::heat_source::HeatSourceKind::Compressor(_)
                ) && !self.heat_sources[i].is_locked_out()
            }) {
                self.heat_sources[idx].set_is_on(true);
            }
        }
        if dr.forces_resistance() {
            if let Some(idx) = (0..n).rev().find(|&i| {
                matches!(
                    self.heat_sources[i].kind,
                    crate::heat_source::HeatSourceKind::Resistance(_)
                )
            }) {
                self.heat_sources[idx].set_is_on(true);
            }
        }

        Ok(())
    }

    fn engage_with_companion(&mut self, idx: usize) -> SimResult<()> {
        self.heat_sources[idx].set_is_on(true);
        if let Some(companion_id) = self.heat_sources[idx].companion_heat_source {
            if let Some(companion_idx) = self.index_of(companion_id) {
                let companion_shuts_off = self.heat_sources[companion_idx].shuts_off(&self.tank)?;
                let companion_on = self.heat_sources[companion_idx].is_on();
                let companion_locked_out = self.heat_sources[companion_idx].is_locked_out();
                if !companion_shuts_off && !companion_on && !companion_locked_out {
                    self.heat_sources[companion_idx].set_is_on(true);
                }
            }
        }
        Ok(())
    }

    fn engage_backup(&mut self, idx: usize) -> SimResult<()> {
        self.heat_sources[idx].set_is_on(false);
        if let Some(backup_id) = self.heat_sources[idx].backup_heat_source {
            if let Some(backup_idx) = self.index_of(backup_id) {
                self.heat_sources[backup_idx].set_is_on(true);
            }
        }
        Ok(())
    }

    /// Run every engaged source in index order; a source that shuts off
    /// partway through the step (see `HeatSource::run_step`) may hand the
    /// rest of the step to a declared follower.
    fn run_engaged_sources(&mut self, evaporator_t_c: f64) -> SimResult<()> {
        let max_setpoint_t_c = self.tank.setpoint_c();
        let n = self.heat_sources.len();
        for idx in 0..n {
            if !self.heat_sources[idx].is_on() {
                continue;
            }
            self.heat_sources[idx].run_step(
                &mut self.tank,
                evaporator_t_c,
                max_setpoint_t_c,
                self.step_seconds,
            )?;

            let finished_early = !self.heat_sources[idx].is_on();
            if finished_early {
                if let Some(follower_id) = self.heat_sources[idx].followed_by_heat_source {
                    if let Some(follower_idx) = self.index_of(follower_id) {
                        if !self.heat_sources[follower_idx].is_on()
                            && !self.heat_sources[follower_idx].is_locked_out()
                        {
                            self.heat_sources[follower_idx].set_is_on(true);
                            self.heat_sources[follower_idx].run_step(
                                &mut self.tank,
                                evaporator_t_c,
                                max_setpoint_t_c,
                                self.step_seconds,
                            )?;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
