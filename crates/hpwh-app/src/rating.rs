//! First-hour rating and a simplified 24-hour Uniform Energy Factor (UEF)
//! harness (supplement 6): standardized draw-pattern tests run against an
//! already-built model, independent of any boundary-schedule CSV files.
//!
//! Grounded on the teacher's `tf_app::run_service` orchestration shape
//! (build once, step repeatedly, summarize) with the draw pattern and
//! recovery criterion taken from `original_source/` rather than invented.

use hpwh_model::{build_hpwh, HpwhSimInput};
use hpwh_sim::{Hpwh, StepInputs};

use crate::error::AppResult;

const STEP_MINUTES: usize = 1;
const MINUTES_PER_HOUR: usize = 60;
const DEFAULT_AMBIENT_T_C: f64 = 19.7;
const DEFAULT_INLET_T_C: f64 = 14.4;
/// A first-hour-rating draw of 10.15 gal (the DOE standard single draw
/// volume) spread across one minute, matching the original's single-draw
/// first-hour-rating harness.
const FIRST_HOUR_DRAW_L: f64 = 38.4;
/// Minutes between successive draws within the first-hour test, after the
/// opening draw, per the DOE first-hour rating procedure.
const FIRST_HOUR_DRAW_INTERVAL_MIN: usize = 2;

/// Result of a first-hour rating run.
#[derive(Debug, Clone)]
pub struct FirstHourRating {
    pub draws_completed: usize,
    pub total_draw_volume_l: f64,
    pub recovered: bool,
}

/// Runs draws of [`FIRST_HOUR_DRAW_L`] every [`FIRST_HOUR_DRAW_INTERVAL_MIN`]
/// minutes for up to one hour, stopping early if the tank's outlet
/// temperature drops more than 15 F (8.3 C) below the setpoint and doesn't
/// recover before the next scheduled draw — the DOE first-hour-rating
/// termination criterion.
pub fn first_hour_rating(hpwh: &mut Hpwh) -> AppResult<FirstHourRating> {
    let setpoint_c = hpwh.tank().setpoint_c();
    let cutoff_c = setpoint_c - 8.3;

    let mut draws_completed = 0;
    let mut total_draw_volume_l = 0.0;
    let mut minute = 0;

    while minute < MINUTES_PER_HOUR {
        let is_draw_minute =
            minute == 0 || minute % FIRST_HOUR_DRAW_INTERVAL_MIN == 0;
        let draw_volume_l = if is_draw_minute { FIRST_HOUR_DRAW_L } else { 0.0 };

        let outputs = hpwh.step(StepInputs {
            draw_volume_l,
            inlet_t_c: DEFAULT_INLET_T_C,
            ambient_t_c: DEFAULT_AMBIENT_T_C,
            evaporator_t_c: DEFAULT_AMBIENT_T_C,
            ..StepInputs::default()
        })?;

        if draw_volume_l > 0.0 {
            draws_completed += 1;
            total_draw_volume_l += draw_volume_l;
            if outputs.outlet_temp_c < cutoff_c {
                return Ok(FirstHourRating {
                    draws_completed,
                    total_draw_volume_l,
                    recovered: false,
                });
            }
        }

        minute += STEP_MINUTES;
    }

    Ok(FirstHourRating {
        draws_completed,
        total_draw_volume_l,
        recovered: true,
    })
}

/// Result of a simplified 24-hour UEF run: three standard-capacity draws
/// (morning, midday, evening) followed by 24 hours of standby, reporting
/// the ratio of useful energy delivered to energy consumed.
#[derive(Debug, Clone)]
pub struct UefResult {
    pub total_energy_input_kwh: f64,
    pub total_energy_delivered_kwh: f64,
    pub uef: f64,
}

const WATER_SPECIFIC_HEAT_KJ_PER_L_C: f64 = 4.186;
const UEF_DRAW_L: f64 = 60.0;
const UEF_DRAW_MINUTES: [usize; 3] = [60, 420, 900];
const UEF_TOTAL_MINUTES: usize = 24 * MINUTES_PER_HOUR;

/// Runs a simplified 24-hour simulated-use test and reports the ratio of
/// delivered to input energy. This is a proportional simplification of the
/// original's full UEF procedure (which also accounts for tank reheat
/// timing and a first-draw recovery check); it is not a certification-grade
/// UEF calculation.
pub fn simplified_uef(hpwh: &mut Hpwh) -> AppResult<UefResult> {
    let setpoint_c = hpwh.tank().setpoint_c();
    let mut total_input_kwh = 0.0;
    let mut total_delivered_kwh = 0.0;

    for minute in 0..UEF_TOTAL_MINUTES {
        let draw_volume_l = if UEF_DRAW_MINUTES.contains(&minute) { UEF_DRAW_L } else { 0.0 };

        let outputs = hpwh.step(StepInputs {
            draw_volume_l,
            inlet_t_c: DEFAULT_INLET_T_C,
            ambient_t_c: DEFAULT_AMBIENT_T_C,
            evaporator_t_c: DEFAULT_AMBIENT_T_C,
            ..StepInputs::default()
        })?;

        total_input_kwh += outputs.total_energy_input_kwh();
        if draw_volume_l > 0.0 {
            let delivered_kj = draw_volume_l
                * WATER_SPECIFIC_HEAT_KJ_PER_L_C
                * (setpoint_c - DEFAULT_INLET_T_C).max(0.0);
            total_delivered_kwh += delivered_kj / 3600.0;
        }
    }

    let uef = if total_input_kwh > 0.0 {
        total_delivered_kwh / total_input_kwh
    } else {
        0.0
    };

    Ok(UefResult {
        total_energy_input_kwh: total_input_kwh,
        total_energy_delivered_kwh: total_delivered_kwh,
        uef,
    })
}

/// Maximum bisection iterations for [`search_for_uef`]; the UA multiplier
/// range halves each iteration, so 40 steps resolve it far past any
/// reportable precision.
const MAKE_SEARCH_MAX_ITERATIONS: usize = 40;
const MAKE_SEARCH_TOLERANCE: f64 = 1e-4;
/// Bounds on the tank-UA multiplier the search tries, relative to the base
/// model's UA. Below `MIN_UA_MULTIPLIER` a tank would have implausibly thick
/// insulation; above `MAX_UA_MULTIPLIER` standby loss would dominate input
/// energy entirely.
const MIN_UA_MULTIPLIER: f64 = 0.05;
const MAX_UA_MULTIPLIER: f64 = 20.0;

/// Result of a [`search_for_uef`] run.
#[derive(Debug, Clone)]
pub struct MakeResult {
    /// The model produced by the search, with its tank UA adjusted.
    pub input: HpwhSimInput,
    pub achieved_uef: f64,
    pub iterations: usize,
}

/// Search tank insulation (UA) for the multiplier that drives `base`'s
/// simplified UEF to `target_uef`, via bisection (spec §6 `make`
/// subcommand).
///
/// This is a deliberately narrower search than the original `makeGeneric`'s
/// multi-parameter Gauss-Newton optimizer (`test/makeGeneric.cc`), which
/// jointly fits performance-map COP coefficients. UA is the single lever
/// here because, in the simplified UEF model of [`simplified_uef`],
/// delivered energy is fixed by the draw pattern and setpoint — only
/// standby loss (and so input energy) varies with UA, giving a function
/// that is monotone in the search variable and safe to bisect. Noted as an
/// open-question resolution in `DESIGN.md` rather than guessed silently.
pub fn search_for_uef(base: &HpwhSimInput, target_uef: f64) -> AppResult<MakeResult> {
    let uef_at = |multiplier: f64| -> AppResult<f64> {
        let input = scale_tank_ua(base, multiplier);
        let mut hpwh = build_hpwh(&input)?;
        Ok(simplified_uef(&mut hpwh)?.uef)
    };

    // UEF decreases monotonically as UA (and so standby loss) increases.
    let mut lo_mult = MIN_UA_MULTIPLIER;
    let mut hi_mult = MAX_UA_MULTIPLIER;
    let mut lo_uef = uef_at(lo_mult)?;
    let hi_uef = uef_at(hi_mult)?;

    if target_uef >= lo_uef {
        let input = scale_tank_ua(base, lo_mult);
        return Ok(MakeResult {
            input,
            achieved_uef: lo_uef,
            iterations: 0,
        });
    }
    if target_uef <= hi_uef {
        let input = scale_tank_ua(base, hi_mult);
        return Ok(MakeResult {
            input,
            achieved_uef: hi_uef,
            iterations: 0,
        });
    }

    let mut mid_mult = lo_mult;
    let mut mid_uef = lo_uef;
    let mut iterations = 0;
    while iterations < MAKE_SEARCH_MAX_ITERATIONS {
        mid_mult = 0.5 * (lo_mult + hi_mult);
        mid_uef = uef_at(mid_mult)?;
        iterations += 1;

        if (mid_uef - target_uef).abs() < MAKE_SEARCH_TOLERANCE {
            break;
        }
        // UEF is decreasing in multiplier: if we overshot the target
        // (current UEF still above target) the root lies at a higher
        // multiplier, else a lower one.
        if mid_uef > target_uef {
            lo_mult = mid_mult;
            lo_uef = mid_uef;
        } else {
            hi_mult = mid_mult;
        }
    }

    Ok(MakeResult {
        input: scale_tank_ua(base, mid_mult),
        achieved_uef: mid_uef,
        iterations,
    })
}

fn scale_tank_ua(base: &HpwhSimInput, multiplier: f64) -> HpwhSimInput {
    let mut input = base.clone();
    for system in [&mut input.integrated_system, &mut input.central_system]
        .into_iter()
        .flatten()
    {
        system.tank.ua_kj_per_h_c *= multiplier;
        system.tank.fittings_ua_kj_per_h_c *= multiplier;
    }
    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use hpwh_model::Preset;

    #[test]
    fn first_hour_rating_runs_to_completion_or_cutoff() {
        let mut hpwh = Preset::Resistance50Gal.build().unwrap();
        let rating = first_hour_rating(&mut hpwh).unwrap();
        assert!(rating.draws_completed > 0);
        assert!(rating.total_draw_volume_l > 0.0);
    }

    #[test]
    fn simplified_uef_reports_a_finite_ratio() {
        let mut hpwh = Preset::Resistance50Gal.build().unwrap();
        let result = simplified_uef(&mut hpwh).unwrap();
        assert!(result.total_energy_input_kwh > 0.0);
        assert!(result.uef >= 0.0);
        assert!(result.uef.is_finite());
    }

    #[test]
    fn search_for_uef_converges_on_an_achievable_target() {
        let base = Preset::Resistance50Gal.input();
        let mut baseline_hpwh = Preset::Resistance50Gal.build().unwrap();
        let baseline_uef = simplified_uef(&mut baseline_hpwh).unwrap().uef;

        // Target a UEF comfortably below the baseline, reachable by adding
        // insulation loss (raising UA), so the search has somewhere to go.
        let target = baseline_uef * 0.8;
        let result = search_for_uef(&base, target).unwrap();

        assert!(result.iterations > 0);
        assert!(
            (result.achieved_uef - target).abs() < 0.05,
            "achieved {} vs target {target}",
            result.achieved_uef
        );
    }

    #[test]
    fn search_for_uef_clamps_to_bounds_for_unreachable_targets() {
        let base = Preset::Resistance50Gal.input();
        // No amount of added insulation loss can push UEF above 1.0 here;
        // the search should clamp to its minimum-UA bound rather than loop
        // forever.
        let result = search_for_uef(&base, 10.0).unwrap();
        assert_eq!(result.iterations, 0);
    }
}
