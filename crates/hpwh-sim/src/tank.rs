//! Stratified storage tank: N equal-mass nodes, bottom to top.

use hpwh_core::numeric::{CP_WATER_KJ_PER_KG_C, DENSITY_WATER_KG_PER_L, K_WATER_W_PER_M_C};
use hpwh_control::TankView;

use crate::error::{SimError, SimResult};

/// Height-to-radius ratio used to derive tank geometry from volume alone.
/// Derived from the median value of a broad sample of insulated storage
/// tanks on the market; not configurable.
pub const ASPECT_RATIO: f64 = 4.75;

/// Configuration used to build a [`Tank`]. Mirrors the `tank` object of the
/// JSON model (`hpwh-model::schema`).
#[derive(Debug, Clone)]
pub struct TankConfig {
    pub n_nodes: usize,
    pub volume_l: f64,
    pub ua_kj_per_h_c: f64,
    pub fittings_ua_kj_per_h_c: f64,
    /// Fraction of the tank (from the bottom) averaged together after a
    /// draw. Zero disables bottom mixing.
    pub mix_below_fraction: f64,
    pub do_conduction: bool,
    pub do_inversion_mixing: bool,
    /// `Some(effectiveness)` selects heat-exchanger draw mode instead of
    /// displacement draw.
    pub heat_exchanger_effectiveness: Option<f64>,
    /// Node index receiving the primary inlet, `0` = bottom.
    pub inlet_node_index: usize,
    /// Node index receiving the secondary inlet.
    pub inlet2_node_index: usize,
    pub setpoint_c: f64,
    /// Node temperatures at simulation start; all nodes seeded to the
    /// setpoint when absent.
    pub initial_node_temps_c: Option<Vec<f64>>,
}

impl Default for TankConfig {
    fn default() -> Self {
        Self {
            n_nodes: 12,
            volume_l: 189.3, // 50 gal
            ua_kj_per_h_c: 6.5,
            fittings_ua_kj_per_h_c: 0.0,
            mix_below_fraction: 1.0 / 3.0,
            do_conduction: true,
            do_inversion_mixing: true,
            heat_exchanger_effectiveness: None,
            inlet_node_index: 0,
            inlet2_node_index: 0,
            setpoint_c: 51.7,
            initial_node_temps_c: None,
        }
    }
}

/// The step's outlet-temperature and loss results, reported alongside the
/// mutated node vector.
#[derive(Debug, Clone, Copy, Default)]
pub struct DrawResult {
    pub outlet_temp_c: f64,
    pub standby_loss_kj: f64,
}

/// A column of `n_nodes` equal-mass fluid nodes.
#[derive(Debug, Clone)]
pub struct Tank {
    n_nodes: usize,
    node_temps_c: Vec<f64>,
    volume_l: f64,
    node_volume_l: f64,
    node_cp_kj_per_c: f64,
    node_height_m: f64,
    frac_area_top: f64,
    frac_area_side: f64,
    ua_kj_per_h_c: f64,
    fittings_ua_kj_per_h_c: f64,
    mixes_on_draw: bool,
    mix_below_fraction: f64,
    do_conduction: bool,
    do_inversion_mixing: bool,
    heat_exchanger_effectiveness: Option<f64>,
    node_heat_exchanger_effectiveness: f64,
    inlet_node_index: usize,
    inlet2_node_index: usize,
    setpoint_c: f64,
    live_mains_temp_c: Option<f64>,
    total_standby_loss_kj: f64,
    last_outlet_temp_c: f64,
}

impl Tank {
    pub fn new(config: TankConfig) -> SimResult<Self> {
        if config.n_nodes == 0 {
            return Err(SimError::InvalidArg {
                what: "n_nodes must be at least 1",
            });
        }
        if !(config.volume_l > 0.0) {
            return Err(SimError::InvalidArg {
                what: "volume_l must be positive",
            });
        }
        if config.inlet_node_index >= config.n_nodes || config.inlet2_node_index >= config.n_nodes
        {
            return Err(SimError::InvalidArg {
                what: "inlet node index out of bounds",
            });
        }

        let node_volume_l = config.volume_l / config.n_nodes as f64;
        let node_cp_kj_per_c = CP_WATER_KJ_PER_KG_C * DENSITY_WATER_KG_PER_L * node_volume_l;

        let vol_m3 = config.volume_l / 1000.0;
        let radius_m = (vol_m3 / (std::f64::consts::PI * ASPECT_RATIO)).cbrt();
        let height_m = ASPECT_RATIO * radius_m;
        let node_height_m = height_m / config.n_nodes as f64;
        let frac_area_top = radius_m / (2.0 * (height_m + radius_m));
        let frac_area_side = height_m / (height_m + radius_m);

        let node_heat_exchanger_effectiveness = config
            .heat_exchanger_effectiveness
            .map(|e| 1.0 - (1.0 - e).powf(1.0 / config.n_nodes as f64))
            .unwrap_or(0.0);

        let node_temps_c = match config.initial_node_temps_c {
            Some(t) if t.len() == config.n_nodes => t,
            Some(_) => {
                return Err(SimError::InvalidArg {
                    what: "initial_node_temps_c length must equal n_nodes",
                })
            }
            None => vec![config.setpoint_c; config.n_nodes],
        };

        Ok(Self {
            n_nodes: config.n_nodes,
            node_temps_c,
            volume_l: config.volume_l,
            node_volume_l,
            node_cp_kj_per_c,
            node_height_m,
            frac_area_top,
            frac_area_side,
            ua_kj_per_h_c: config.ua_kj_per_h_c,
            fittings_ua_kj_per_h_c: config.fittings_ua_kj_per_h_c,
            mixes_on_draw: config.mix_below_fraction > 0.0,
            mix_below_fraction: config.mix_below_fraction,
            do_conduction: config.do_conduction,
            do_inversion_mixing: config.do_inversion_mixing,
            heat_exchanger_effectiveness: config.heat_exchanger_effectiveness,
            node_heat_exchanger_effectiveness,
            inlet_node_index: config.inlet_node_index,
            inlet2_node_index: config.inlet2_node_index,
            setpoint_c: config.setpoint_c,
            live_mains_temp_c: None,
            total_standby_loss_kj: 0.0,
            last_outlet_temp_c: config.setpoint_c,
        })
    }

    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    pub fn node_temps_c(&self) -> &[f64] {
        &self.node_temps_c
    }

    pub fn setpoint_c(&self) -> f64 {
        self.setpoint_c
    }

    pub fn set_setpoint_c(&mut self, setpoint_c: f64) {
        self.setpoint_c = setpoint_c;
    }

    pub fn total_standby_loss_kj(&self) -> f64 {
        self.total_standby_loss_kj
    }

    pub fn last_outlet_temp_c(&self) -> f64 {
        self.last_outlet_temp_c
    }

    /// Advance the tank for one step: draw displacement (or heat-exchanger
    /// pass-through), standby losses, conduction, and inversion mixing.
    /// Does not apply heat-source input; callers invoke `HeatSource::heat`
    /// separately, in between this call and the trailing inversion pass
    /// performed by the stepper.
    pub fn update_nodes(
        &mut self,
        draw_volume_l: f64,
        inlet_t_c: f64,
        ambient_t_c: f64,
        draw_volume2_l: f64,
        inlet2_t_c: f64,
        step_seconds: f64,
    ) -> SimResult<DrawResult> {
        if draw_volume_l < 0.0 || draw_volume2_l < 0.0 {
            return Err(SimError::BoundaryCondition {
                what: "draw volumes must be non-negative".into(),
            });
        }
        if draw_volume2_l > draw_volume_l {
            return Err(SimError::BoundaryCondition {
                what: "draw_volume2_l must not exceed draw_volume_l".into(),
            });
        }
        for (what, v) in [
            ("inlet_t_c", inlet_t_c),
            ("ambient_t_c", ambient_t_c),
            ("inlet2_t_c", inlet2_t_c),
        ] {
            if !v.is_finite() {
                return Err(SimError::BoundaryCondition {
                    what: format!("{what} is not finite"),
                });
            }
        }

        self.live_mains_temp_c = Some(inlet_t_c);

        let step_hours = step_seconds / 3600.0;
        let mut outlet_temp_c = self.node_temps_c[self.n_nodes - 1];

        if draw_volume_l > 0.0 {
            outlet_temp_c = if let Some(_eff) = self.heat_exchanger_effectiveness {
                self.draw_heat_exchanger(draw_volume_l, inlet_t_c)
            } else {
                self.draw_displacement(draw_volume_l, inlet_t_c, draw_volume2_l, inlet2_t_c)
            };

            if self.mixes_on_draw {
                let mixed_below = ((self.n_nodes as f64) * self.mix_below_fraction) as usize;
                self.mix_nodes(0, mixed_below.min(self.n_nodes), 1.0 / 3.0);
            }
        }

        let standby_loss_kj = self.apply_standby_losses(ambient_t_c, step_hours);

        if self.do_conduction {
            self.apply_conduction(step_seconds)?;
        }

        self.mix_inversions();

        self.total_standby_loss_kj += standby_loss_kj;
        self.last_outlet_temp_c = outlet_temp_c;

        Ok(DrawResult {
            outlet_temp_c,
            standby_loss_kj,
        })
    }

    /// Draws `draw_volume_l` from the top of the tank, replacing it node by
    /// node with inlet water injected at each inlet's own configured node
    /// (`inlet_node_index` / `inlet2_node_index`) rather than always at the
    /// bottom. Processes the draw in increments of at most one node-volume,
    /// shifting temperature up from each node's lower neighbor except at an
    /// inlet node, which blends in inlet water instead.
    fn draw_displacement(
        &mut self,
        draw_volume_l: f64,
        inlet_t_c: f64,
        draw_volume2_l: f64,
        inlet2_t_c: f64,
    ) -> f64 {
        let n = self.n_nodes;

        // sort inlets by node height: "high" sits closer to the top.
        let (high_node, high_frac, high_t_c, low_node, low_frac, low_t_c) =
            if self.inlet_node_index > self.inlet2_node_index {
                let high_frac = 1.0 - draw_volume2_l / draw_volume_l;
                (
                    self.inlet_node_index,
                    high_frac,
                    inlet_t_c,
                    self.inlet2_node_index,
                    1.0 - high_frac,
                    inlet2_t_c,
                )
            } else {
                let high_frac = draw_volume2_l / draw_volume_l;
                (
                    self.inlet2_node_index,
                    high_frac,
                    inlet2_t_c,
                    self.inlet_node_index,
                    1.0 - high_frac,
                    inlet_t_c,
                )
            };

        let draw_volume_n = draw_volume_l / self.node_volume_l;
        let draw_cp_kj_per_c = CP_WATER_KJ_PER_KG_C * DENSITY_WATER_KG_PER_L * draw_volume_l;

        let mut remaining_n = draw_volume_n;
        let mut total_expelled_kj = 0.0;

        while remaining_n > 0.0 {
            let increment_n = remaining_n.min(1.0);

            let top = n - 1;
            let output_heat_kj = self.node_cp_kj_per_c * increment_n * self.node_temps_c[top];
            total_expelled_kj += output_heat_kj;
            self.node_temps_c[top] -= output_heat_kj / self.node_cp_kj_per_c;

            let mut inlet_fraction = 0.0;
            for i in (0..n).rev() {
                if i == high_node {
                    inlet_fraction += high_frac;
                    self.node_temps_c[i] += increment_n * high_frac * high_t_c;
                }
                if i == low_node {
                    inlet_fraction += low_frac;
                    self.node_temps_c[i] += increment_n * low_frac * low_t_c;
                }
                if i > 0 {
                    let transfer_t_c = increment_n * (1.0 - inlet_fraction) * self.node_temps_c[i - 1];
                    self.node_temps_c[i] += transfer_t_c;
                    self.node_temps_c[i - 1] -= transfer_t_c;
                }
            }

            remaining_n -= increment_n;
            self.mix_inversions();
        }

        total_expelled_kj / draw_cp_kj_per_c
    }

    fn draw_heat_exchanger(&mut self, draw_volume_l: f64, inlet_t_c: f64) -> f64 {
        let draw_cp_kj_per_c = CP_WATER_KJ_PER_KG_C * DENSITY_WATER_KG_PER_L * draw_volume_l;
        let mut outlet_temp_c = inlet_t_c;
        for t in self.node_temps_c.iter_mut() {
            let max_exchange_kj = draw_cp_kj_per_c * (*t - outlet_temp_c);
            let exchange_kj = self.node_heat_exchanger_effectiveness * max_exchange_kj;
            *t -= exchange_kj / self.node_cp_kj_per_c;
            outlet_temp_c += exchange_kj / draw_cp_kj_per_c;
        }
        outlet_temp_c
    }

    /// Average the nodes in `[bottom, below)` together, blending each node
    /// toward the band mean by `mix_factor`.
    fn mix_nodes(&mut self, bottom: usize, below: usize, mix_factor: f64) {
        if below <= bottom {
            return;
        }
        let count = (below - bottom) as f64;
        let avg: f64 = self.node_temps_c[bottom..below].iter().sum::<f64>() / count;
        for t in self.node_temps_c[bottom..below].iter_mut() {
            *t += mix_factor * (avg - *t);
        }
    }

    fn apply_standby_losses(&mut self, ambient_t_c: f64, step_hours: f64) -> f64 {
        let n = self.n_nodes;
        let end_rate = self.ua_kj_per_h_c * self.frac_area_top;

        let bottom_loss_kj = end_rate * step_hours * (self.node_temps_c[0] - ambient_t_c);
        let top_loss_kj = end_rate * step_hours * (self.node_temps_c[n - 1] - ambient_t_c);
        self.node_temps_c[0] -= bottom_loss_kj / self.node_cp_kj_per_c;
        self.node_temps_c[n - 1] -= top_loss_kj / self.node_cp_kj_per_c;

        let side_rate =
            (self.ua_kj_per_h_c * self.frac_area_side + self.fittings_ua_kj_per_h_c) / n as f64;
        let mut side_loss_kj = 0.0;
        for t in self.node_temps_c.iter_mut() {
            let loss_kj = side_rate * step_hours * (*t - ambient_t_c);
            side_loss_kj += loss_kj;
            *t -= loss_kj / self.node_cp_kj_per_c;
        }

        bottom_loss_kj + top_loss_kj + side_loss_kj
    }

    fn apply_conduction(&mut self, step_seconds: f64) -> SimResult<()> {
        let n = self.n_nodes;
        if n < 2 {
            return Ok(());
        }
        let tau = 2.0 * K_WATER_W_PER_M_C
            / ((CP_WATER_KJ_PER_KG_C * 1000.0)
                * (DENSITY_WATER_KG_PER_L * 1000.0)
                * self.node_height_m
                * self.node_height_m)
            * step_seconds;
        if tau > 1.0 {
            return Err(SimError::UnstableConduction { tau });
        }

        let prev = self.node_temps_c.clone();
        self.node_temps_c[0] += tau * (prev[1] - prev[0]);
        self.node_temps_c[n - 1] += tau * (prev[n - 2] - prev[n - 1]);
        for i in 1..n - 1 {
            self.node_temps_c[i] += tau * (prev[i + 1] - 2.0 * prev[i] + prev[i - 1]);
        }
        Ok(())
    }

    /// Scan top to bottom; whenever a node is cooler than the one below it,
    /// average the largest contiguous band above the inversion whose mean
    /// exceeds the node below, and flatten the band to that mean. Repeat
    /// until no inversion remains.
    pub(crate) fn mix_inversions(&mut self) {
        if !self.do_inversion_mixing {
            return;
        }
        loop {
            let mut has_inversion = false;
            let n = self.n_nodes;
            let mut i = n - 1;
            while i > 0 {
                if self.node_temps_c[i] < self.node_temps_c[i - 1] {
                    has_inversion = true;
                    let mut t_mixed = 0.0;
                    let mut mass_mixed = 0.0;
                    let mut m = i as isize;
                    while m >= 0 {
                        t_mixed += self.node_temps_c[m as usize];
                        mass_mixed += 1.0;
                        if m == 0 || t_mixed / mass_mixed > self.node_temps_c[m as usize - 1] {
                            break;
                        }
                        m -= 1;
                    }
                    let mean = t_mixed / mass_mixed;
                    for k in (m as usize)..=i {
                        self.node_temps_c[k] = mean;
                    }
                }
                i -= 1;
            }
            if !has_inversion {
                break;
            }
        }
    }

    /// Add `q_add_kj` of heat at or above `node_index`, raising the node and
    /// every node above it at the same temperature in lockstep, clamped to
    /// `max_heat_to_c`. Returns any heat that could not be absorbed.
    pub fn add_heat_above_node(
        &mut self,
        mut q_add_kj: f64,
        node_index: usize,
        max_heat_to_c: f64,
    ) -> f64 {
        let n = self.n_nodes;
        let mut num_nodes_to_heat = 1usize;
        for i in node_index..n - 1 {
            if (self.node_temps_c[i] - self.node_temps_c[i + 1]).abs() > 1e-12 {
                break;
            }
            num_nodes_to_heat += 1;
        }

        while q_add_kj > 0.0 && node_index + num_nodes_to_heat - 1 < n {
            let target_node = node_index + num_nodes_to_heat;
            let heat_to_c = if target_node > n - 1 {
                max_heat_to_c
            } else {
                self.node_temps_c[target_node].min(max_heat_to_c)
            };

            let q_increment_kj = num_nodes_to_heat as f64
                * self.node_cp_kj_per_c
                * (heat_to_c - self.node_temps_c[node_index]);

            if q_increment_kj > q_add_kj {
                let heat_to_c = self.node_temps_c[node_index]
                    + q_add_kj / self.node_cp_kj_per_c / num_nodes_to_heat as f64;
                for j in 0..num_nodes_to_heat {
                    self.node_temps_c[node_index + j] = heat_to_c;
                }
                q_add_kj = 0.0;
            } else if q_increment_kj > 0.0 {
                for j in 0..num_nodes_to_heat {
                    self.node_temps_c[node_index + j] = heat_to_c;
                }
                q_add_kj -= q_increment_kj;
            }
            num_nodes_to_heat += 1;
        }

        q_add_kj
    }

    pub fn average_node_temp_c(&self) -> f64 {
        self.node_temps_c.iter().sum::<f64>() / self.n_nodes as f64
    }

    pub fn heat_content_kj(&self) -> f64 {
        DENSITY_WATER_KG_PER_L * self.volume_l * CP_WATER_KJ_PER_KG_C * self.average_node_temp_c()
    }

    /// Resample the node vector into `n` equal height bands and report the
    /// mean of band `i` (1-indexed, matching a physical thermocouple set).
    pub fn nth_thermocouple_t_c(&self, i: usize, n: usize) -> SimResult<f64> {
        if n == 0 || i == 0 || i > n {
            return Err(SimError::InvalidArg {
                what: "thermocouple index out of [1, n] range",
            });
        }
        let begin_frac = (i - 1) as f64 / n as f64;
        let end_frac = i as f64 / n as f64;
        Ok(resample_value(&self.node_temps_c, begin_frac, end_frac))
    }

    fn charge_per_node(&self, t_c: f64, mains_t_c: f64, min_useful_t_c: f64) -> f64 {
        let denom = min_useful_t_c - mains_t_c;
        if denom.abs() < 1e-12 {
            return 0.0;
        }
        ((t_c - mains_t_c) / denom).max(0.0)
    }

    /// State-of-charge fraction per §4.3: charge summed across nodes,
    /// normalized by `n_nodes * charge_per_node(max_t_c)`.
    pub fn soc_fraction(&self, mains_t_c: f64, min_useful_t_c: f64, max_t_c: f64) -> f64 {
        let max_charge = self.charge_per_node(max_t_c, mains_t_c, min_useful_t_c);
        if max_charge <= 0.0 {
            return 0.0;
        }
        let sum: f64 = self
            .node_temps_c
            .iter()
            .map(|&t| self.charge_per_node(t, mains_t_c, min_useful_t_c))
            .sum();
        sum / (self.n_nodes as f64 * max_charge)
    }
}

/// Average `values`, treated as `values.len()` equal bands spanning
/// `[0, 1]`, over the sub-range `[begin_frac, end_frac)`.
fn resample_value(values: &[f64], begin_frac: f64, end_frac: f64) -> f64 {
    let n = values.len() as f64;
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for (i, &v) in values.iter().enumerate() {
        let band_start = i as f64 / n;
        let band_end = (i + 1) as f64 / n;
        let overlap = band_end.min(end_frac) - band_start.max(begin_frac);
        if overlap > 0.0 {
            weighted_sum += v * overlap;
            weight_total += overlap;
        }
    }
    if weight_total > 0.0 {
        weighted_sum / weight_total
    } else {
        values[(begin_frac * n) as usize % values.len()]
    }
}

impl TankView for Tank {
    fn node_count(&self) -> usize {
        self.n_nodes
    }

    fn node_temp_c(&self, index: usize) -> f64 {
        self.node_temps_c[index]
    }

    fn setpoint_c(&self) -> f64 {
        self.setpoint_c
    }

    fn live_mains_temp_c(&self) -> Option<f64> {
        self.live_mains_temp_c
    }
}
