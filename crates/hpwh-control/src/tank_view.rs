//! Read-only view of tank state used to evaluate control predicates.
//!
//! `hpwh-control` must not depend on `hpwh-sim` (the tank implementation) to
//! keep the control logic testable in isolation and to avoid a dependency
//! cycle, since `hpwh-sim`'s heat sources own `HeatingLogic` values. Instead
//! `hpwh-sim::tank::Tank` implements this trait and every predicate here is
//! written against it.

/// Minimal read-only surface of a stratified tank that control predicates
/// need: node temperatures, the current setpoint, and the live mains
/// (inlet) temperature if one is available this step.
pub trait TankView {
    /// Number of equal-mass nodes, bottom to top.
    fn node_count(&self) -> usize;

    /// Temperature of node `index` (0 = bottom), degrees C.
    fn node_temp_c(&self, index: usize) -> f64;

    /// Current setpoint temperature, degrees C.
    fn setpoint_c(&self) -> f64;

    /// Live mains (cold inlet) temperature for this step, if known.
    fn live_mains_temp_c(&self) -> Option<f64>;
}

/// Compute the weighted mean of tank node temperatures for a resolved
/// per-node weight vector (see `Distribution::resolve`).
pub fn weighted_tank_value(tank: &dyn TankView, weights: &[f64]) -> f64 {
    debug_assert_eq!(weights.len(), tank.node_count());
    let mut acc = 0.0;
    let mut weight_sum = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        if w != 0.0 {
            acc += w * tank.node_temp_c(i);
            weight_sum += w;
        }
    }
    if weight_sum > 0.0 {
        acc / weight_sum
    } else {
        tank.node_temp_c(0)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::TankView;

    /// Simple in-memory stand-in for a tank, used by this crate's own unit
    /// tests so predicates can be exercised without `hpwh-sim`.
    pub struct FakeTank {
        pub nodes: Vec<f64>,
        pub setpoint_c: f64,
        pub mains_c: Option<f64>,
    }

    impl TankView for FakeTank {
        fn node_count(&self) -> usize {
            self.nodes.len()
        }

        fn node_temp_c(&self, index: usize) -> f64 {
            self.nodes[index]
        }

        fn setpoint_c(&self) -> f64 {
            self.setpoint_c
        }

        fn live_mains_temp_c(&self) -> Option<f64> {
            self.mains_c
        }
    }
}
