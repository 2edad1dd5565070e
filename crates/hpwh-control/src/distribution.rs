//! Weighted distributions over normalized tank height.
//!
//! A `Distribution` is used two ways in the model: as a `HeatSource`'s
//! `heat_distribution` (where to inject delivered heat) and inside a
//! `TemperatureBased` predicate (which nodes contribute to the tank-side
//! comparison value). Both resolve the same way: normalized height in
//! `[0, 1]` maps onto whichever node band it falls in for a tank of `n`
//! equal-mass nodes.

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

/// One (height, weight) control point of a distribution. Height is
/// normalized tank height in `[0, 1]`, bottom node at 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionPoint {
    pub height_fraction: f64,
    pub weight: f64,
}

/// A weighted distribution over tank height.
///
/// The two named constructors (`bottom_of_tank`, `top_of_tank`) are
/// sentinels: code that resolves a `Distribution` should special-case them
/// and read the single node directly rather than going through the general
/// resolution path (see §4.3's "Special sentinels" note).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Distribution {
    /// Concentrated entirely on the bottom node.
    BottomOfTank,
    /// Concentrated entirely on the top node.
    TopOfTank,
    /// General weighted distribution over one or more height bands.
    Weighted(Vec<DistributionPoint>),
}

impl Distribution {
    /// Build a weighted distribution from raw points, validating that the
    /// weights sum to a positive value.
    pub fn weighted(points: Vec<DistributionPoint>) -> ControlResult<Self> {
        let total: f64 = points.iter().map(|p| p.weight).sum();
        if !(total > 0.0) {
            return Err(ControlError::InvalidDistribution {
                what: format!("weights sum to {total}, expected a positive value"),
            });
        }
        Ok(Self::Weighted(points))
    }

    /// Resolve this distribution into per-node weights for a tank of
    /// `n_nodes` equal-mass nodes. The result always sums to 1.0.
    pub fn resolve(&self, n_nodes: usize) -> Vec<f64> {
        assert!(n_nodes > 0, "tank must have at least one node");
        match self {
            Distribution::BottomOfTank => {
                let mut w = vec![0.0; n_nodes];
                w[0] = 1.0;
                w
            }
            Distribution::TopOfTank => {
                let mut w = vec![0.0; n_nodes];
                w[n_nodes - 1] = 1.0;
                w
            }
            Distribution::Weighted(points) => {
                let mut w = vec![0.0; n_nodes];
                let total: f64 = points.iter().map(|p| p.weight).sum();
                if total <= 0.0 {
                    w[0] = 1.0;
                    return w;
                }
                for p in points {
                    let idx = height_to_node_index(p.height_fraction, n_nodes);
                    w[idx] += p.weight / total;
                }
                w
            }
        }
    }
}

/// Map normalized height `[0, 1]` to a node index for a tank of `n_nodes`.
fn height_to_node_index(height_fraction: f64, n_nodes: usize) -> usize {
    let h = height_fraction.clamp(0.0, 1.0);
    let idx = (h * (n_nodes - 1) as f64).round() as usize;
    idx.min(n_nodes - 1)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_points() -> impl Strategy<Value = Vec<DistributionPoint>> {
        proptest::collection::vec(
            (0.0f64..=1.0, 0.01f64..=10.0).prop_map(|(height_fraction, weight)| DistributionPoint {
                height_fraction,
                weight,
            }),
            1..8,
        )
    }

    proptest! {
        #[test]
        fn resolve_always_sums_to_one(points in arb_points(), n_nodes in 1usize..32) {
            let d = Distribution::Weighted(points);
            let w = d.resolve(n_nodes);
            prop_assert_eq!(w.len(), n_nodes);
            let sum: f64 = w.iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-9);
            prop_assert!(w.iter().all(|&x| x >= 0.0));
        }

        #[test]
        fn sentinels_always_sum_to_one(n_nodes in 1usize..32) {
            prop_assert!((Distribution::BottomOfTank.resolve(n_nodes).iter().sum::<f64>() - 1.0).abs() < 1e-12);
            prop_assert!((Distribution::TopOfTank.resolve(n_nodes).iter().sum::<f64>() - 1.0).abs() < 1e-12);
        }
    }
}
