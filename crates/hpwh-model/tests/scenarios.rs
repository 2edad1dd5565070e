//! Regression scenarios named in the simulation design (S2-S5; S1 and S6
//! live as unit tests alongside `hpwh_sim::stepper` since they exercise only
//! the tank/stepper types directly). Each test fixes a concrete boundary
//! condition and asserts the qualitative trend the scenario describes,
//! mirroring the teacher's `tests/tank_blowdown.rs` style: diagnostics via
//! `println!`, trend assertions rather than exact floating-point targets.

use hpwh_control::{Comparator, Distribution, DistributionPoint, HeatingLogic, Reference, TemperatureBased};
use hpwh_model::Preset;
use hpwh_sim::{
    Compressor, CompressorConfig, HeatSource, HeatSourceKind, Hpwh, PerformanceMap, Resistance,
    StepInputs, Tank, TankConfig,
};

const LITERS_PER_GALLON: f64 = 3.785_41;

/// S2: 80-gallon Sanden-class compressor tank, setpoint 65 C, mains 12 C,
/// ambient 20 C, evaporator 20 C, one-hour run with a continuous 10 L/min
/// draw. Outlet should stay near setpoint and fall monotonically; the
/// compressor should run the whole hour; COP from the grid should land in
/// 3.5-4.5.
#[test]
fn s2_sanden_compressor_runs_continuously_under_sustained_draw() {
    let mut hpwh = Preset::Compressor80GalSanden.build().expect("preset builds");

    let mut outlet_temps = Vec::with_capacity(60);
    let mut total_input_kwh = 0.0;
    let mut total_output_kwh = 0.0;
    let mut minutes_compressor_ran = 0;

    for _ in 0..60 {
        let out = hpwh
            .step(StepInputs {
                draw_volume_l: 10.0 * LITERS_PER_GALLON / LITERS_PER_GALLON, // 10 L/min
                inlet_t_c: 12.0,
                ambient_t_c: 20.0,
                evaporator_t_c: 20.0,
                ..StepInputs::default()
            })
            .unwrap();
        outlet_temps.push(out.outlet_temp_c);
        total_input_kwh += out.total_energy_input_kwh();
        total_output_kwh += out.total_energy_output_kwh();
        if hpwh.heat_sources()[0].is_on() {
            minutes_compressor_ran += 1;
        }
    }

    println!(
        "S2: outlet {:.2} -> {:.2} C, compressor ran {minutes_compressor_ran}/60 min, input {total_input_kwh:.3} kWh, output {total_output_kwh:.3} kWh",
        outlet_temps[0],
        outlet_temps[outlet_temps.len() - 1]
    );

    assert!(outlet_temps[0] > 60.0, "outlet should start near setpoint, got {}", outlet_temps[0]);
    let mut non_increasing_run = true;
    for pair in outlet_temps.windows(2) {
        if pair[1] > pair[0] + 1e-6 {
            non_increasing_run = false;
        }
    }
    assert!(non_increasing_run, "outlet temperature should fall monotonically under sustained draw");

    assert!(minutes_compressor_ran >= 55, "compressor should run almost the entire hour, ran {minutes_compressor_ran}");
    assert!(total_input_kwh > 0.0);
    let cop = total_output_kwh / total_input_kwh;
    assert!((3.0..=5.0).contains(&cop), "aggregate COP {cop} outside plausible range");
}

/// S3: a VIP upper resistor recovers a cold top-third while a non-VIP
/// compressor, watching the bottom of the tank (still full from the prior
/// setpoint), has no reason to engage. Once the resistor has fully
/// recovered the top and a later draw cools the bottom instead, the
/// compressor engages while the recovered top keeps the resistor from
/// re-triggering.
#[test]
fn s3_vip_resistor_suppresses_compressor_until_its_own_demand_arises() {
    let volume_l = 80.0 * LITERS_PER_GALLON;
    let mut initial = vec![48.9; 12];
    for t in initial.iter_mut().skip(8) {
        *t = 42.0;
    }
    let tank = Tank::new(TankConfig {
        n_nodes: 12,
        volume_l,
        ua_kj_per_h_c: 5.5 * 3.6,
        fittings_ua_kj_per_h_c: 0.3 * 3.6,
        setpoint_c: 48.9,
        initial_node_temps_c: Some(initial),
        ..TankConfig::default()
    })
    .unwrap();

    let mut resistor = HeatSource::new(
        "upper resistor",
        HeatSourceKind::Resistance(Resistance { input_power_kw: 4.5 }),
        Distribution::TopOfTank,
    );
    resistor.is_vip = true;
    resistor.turn_on_logic.push(HeatingLogic::TemperatureBased(TemperatureBased {
        distribution: Distribution::TopOfTank,
        reference: Reference::Absolute(44.0),
        comparator: Comparator::LessThan,
        requires_standby: false,
    }));
    resistor.shut_off_logic.push(HeatingLogic::TemperatureBased(TemperatureBased {
        distribution: Distribution::TopOfTank,
        reference: Reference::Absolute(48.5),
        comparator: Comparator::GreaterThan,
        requires_standby: false,
    }));

    let map = PerformanceMap::new(vec![-10.0, 30.0], vec![20.0, 65.0], vec![1.0; 4], vec![3.5; 4]).unwrap();
    let mut compressor = HeatSource::new(
        "lower compressor",
        HeatSourceKind::Compressor(Compressor::new(map, CompressorConfig::SubmergedOrWrapped, -10.0, 1.0)),
        Distribution::BottomOfTank,
    );
    compressor.turn_on_logic.push(HeatingLogic::TemperatureBased(TemperatureBased {
        distribution: Distribution::BottomOfTank,
        reference: Reference::Absolute(40.0),
        comparator: Comparator::LessThan,
        requires_standby: false,
    }));

    let mut hpwh = Hpwh::new(tank, vec![resistor, compressor], 60.0);

    let mut resistor_shut_off = false;
    let mut compressor_ran_before_shutoff = false;
    for _ in 0..30 {
        hpwh.step(StepInputs {
            ambient_t_c: 20.0,
            evaporator_t_c: 20.0,
            ..StepInputs::default()
        })
        .unwrap();
        if hpwh.heat_sources()[1].is_on() {
            compressor_ran_before_shutoff = true;
        }
        if !resistor_shut_off && !hpwh.heat_sources()[0].is_on() && hpwh.heat_sources()[0].runtime_min() == 0.0 {
            // only count once the resistor has actually engaged and let go
        }
        if hpwh.tank().node_temps_c()[11] >= 44.0 && !hpwh.heat_sources()[0].is_on() {
            resistor_shut_off = true;
        }
    }

    println!(
        "S3 phase 1: resistor shut off = {resistor_shut_off}, top node = {:.2} C, compressor ran during phase 1 = {compressor_ran_before_shutoff}",
        hpwh.tank().node_temps_c()[11]
    );
    assert!(resistor_shut_off, "VIP resistor should have recovered the top and shut off");
    assert!(
        !compressor_ran_before_shutoff,
        "compressor's own (bottom-of-tank) trigger never fired, so it should not have engaged"
    );

    // A later large draw cools the bottom of the tank (the compressor's
    // domain) while the already-recovered top, shifting up from equally
    // warm water below it, stays above the resistor's turn-on threshold.
    let draw_l = 4.0 * volume_l / 12.0;
    let out = hpwh
        .step(StepInputs {
            draw_volume_l: draw_l,
            inlet_t_c: 12.0,
            ambient_t_c: 20.0,
            evaporator_t_c: 20.0,
            ..StepInputs::default()
        })
        .unwrap();
    let _ = out;

    println!(
        "S3 phase 2: bottom = {:.2} C, top = {:.2} C, compressor on = {}, resistor on = {}",
        hpwh.tank().node_temps_c()[0],
        hpwh.tank().node_temps_c()[11],
        hpwh.heat_sources()[1].is_on(),
        hpwh.heat_sources()[0].is_on()
    );
    assert!(hpwh.heat_sources()[1].is_on(), "compressor should engage once its own region cools");
    assert!(!hpwh.heat_sources()[0].is_on(), "recovered top should not re-trigger the resistor");
}

/// S4: SoC-controlled compressor, `decision_point = 0.6`, hysteresis 0.05,
/// `min_useful_T = 43.3 C`, constant mains 18.3 C. A tank cooled to
/// SoC = 0.55 should engage the compressor; once warmed past SoC = 0.65 it
/// should disengage.
#[test]
fn s4_soc_controlled_compressor_engages_and_disengages_on_charge() {
    use hpwh_control::{HeatingLogic as HL, Mains, StateOfChargeBased};

    let soc_logic = |decision_point: f64| {
        HL::StateOfChargeBased(StateOfChargeBased {
            decision_point,
            hysteresis: 0.05,
            min_useful_temp_c: 43.3,
            mains: Mains::Constant(18.3),
        })
    };

    // Node temperatures chosen so the whole-tank SoC fraction sits at 0.55:
    // charge_per_node(T) = (T - 18.3) / (51.7 - 18.3); for a uniform tank at
    // T, SoC = charge_per_node(T) directly.
    let min_useful = 43.3;
    let mains = 18.3;
    let setpoint = 51.7;
    let soc_to_uniform_temp = |soc: f64| mains + soc * (min_useful - mains);

    let cooled_t = soc_to_uniform_temp(0.55);
    let tank = Tank::new(TankConfig {
        n_nodes: 12,
        setpoint_c: setpoint,
        initial_node_temps_c: Some(vec![cooled_t; 12]),
        ..TankConfig::default()
    })
    .unwrap();

    let map = PerformanceMap::new(vec![-10.0, 30.0], vec![20.0, 65.0], vec![1.0; 4], vec![3.5; 4]).unwrap();
    let mut compressor = HeatSource::new(
        "soc compressor",
        HeatSourceKind::Compressor(Compressor::new(map, CompressorConfig::SubmergedOrWrapped, -10.0, 1.0)),
        Distribution::Weighted(vec![DistributionPoint { height_fraction: 0.0, weight: 1.0 }]),
    );
    compressor.turn_on_logic.push(soc_logic(0.6));

    let mut hpwh = Hpwh::new(tank, vec![compressor], 60.0);

    hpwh.step(StepInputs {
        ambient_t_c: 20.0,
        evaporator_t_c: 20.0,
        ..StepInputs::default()
    })
    .unwrap();
    println!("S4: cooled tank (SoC 0.55) compressor on = {}", hpwh.heat_sources()[0].is_on());
    assert!(hpwh.heat_sources()[0].is_on(), "compressor should engage at SoC 0.55 < decision_point 0.6");

    // Warm the tank to SoC >= 0.65 and verify the compressor shuts off. The
    // built-in shuts_off check (bottom node >= setpoint) would fire first
    // if we heated all the way to setpoint, so hand-set the node
    // temperatures directly to isolate the SoC-disengage behavior.
    let warmed_t = soc_to_uniform_temp(0.70).min(setpoint - 0.5);
    let tank = Tank::new(TankConfig {
        n_nodes: 12,
        setpoint_c: setpoint,
        initial_node_temps_c: Some(vec![warmed_t; 12]),
        ..TankConfig::default()
    })
    .unwrap();
    let map = PerformanceMap::new(vec![-10.0, 30.0], vec![20.0, 65.0], vec![1.0; 4], vec![3.5; 4]).unwrap();
    let mut compressor = HeatSource::new(
        "soc compressor",
        HeatSourceKind::Compressor(Compressor::new(map, CompressorConfig::SubmergedOrWrapped, -10.0, 1.0)),
        Distribution::Weighted(vec![DistributionPoint { height_fraction: 0.0, weight: 1.0 }]),
    );
    compressor.turn_on_logic.push(soc_logic(0.6));
    compressor.set_is_on(true);
    let mut hpwh = Hpwh::new(tank, vec![compressor], 60.0);
    hpwh.step(StepInputs {
        ambient_t_c: 20.0,
        evaporator_t_c: 20.0,
        ..StepInputs::default()
    })
    .unwrap();
    println!("S4: warmed tank (SoC ~0.70) compressor on = {}", hpwh.heat_sources()[0].is_on());
    assert!(!hpwh.heat_sources()[0].is_on(), "compressor should disengage once SoC clears decision_point + hysteresis");
}

/// S5: ambient lockout with hysteresis. A compressor with
/// `min_ambient_T = 7 C`, hysteresis 1 C, disengages once ambient drops
/// below 6 C (lockout threshold minus hysteresis is not how lockout engages
/// — engagement is simply `ambient < min_ambient_T`; the hysteresis instead
/// delays re-engagement, requiring ambient above `min_ambient_T +
/// hysteresis = 8 C`) and does not resume until ambient exceeds 8 C; a
/// declared backup resistor runs in the interval.
#[test]
fn s5_ambient_lockout_sweep_engages_backup_and_recovers_with_hysteresis() {
    let tank = Tank::new(TankConfig {
        n_nodes: 12,
        setpoint_c: 51.7,
        initial_node_temps_c: Some(vec![30.0; 12]),
        ..TankConfig::default()
    })
    .unwrap();

    let map = PerformanceMap::new(vec![-10.0, 30.0], vec![20.0, 65.0], vec![1.0; 4], vec![3.5; 4]).unwrap();
    let mut compressor = HeatSource::new(
        "compressor",
        HeatSourceKind::Compressor(Compressor::new(map, CompressorConfig::SubmergedOrWrapped, 7.0, 1.0)),
        Distribution::BottomOfTank,
    );
    compressor.turn_on_logic.push(HeatingLogic::TemperatureBased(TemperatureBased {
        distribution: Distribution::BottomOfTank,
        reference: Reference::Absolute(51.0),
        comparator: Comparator::LessThan,
        requires_standby: false,
    }));
    compressor.backup_heat_source = Some(hpwh_core::HeatSourceId::from_index(1));

    let backup = HeatSource::new(
        "backup resistor",
        HeatSourceKind::Resistance(Resistance { input_power_kw: 4.5 }),
        Distribution::BottomOfTank,
    );

    let mut hpwh = Hpwh::new(tank, vec![compressor, backup], 60.0);

    // 10 C -> 5 C -> 10 C in 1 C steps, one step at each ambient.
    let ambient_sweep: Vec<f64> = vec![10.0, 9.0, 8.0, 7.0, 6.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
    let mut backup_ran_in_lockout = false;
    let mut saw_lockout = false;
    let mut reengaged_at_8_not_before = true;
    let mut compressor_locked_at_7_down = false;

    for &ambient in &ambient_sweep {
        hpwh.step(StepInputs {
            ambient_t_c: ambient,
            evaporator_t_c: ambient,
            ..StepInputs::default()
        })
        .unwrap();
        let locked = hpwh.heat_sources()[0].is_locked_out();
        if locked {
            saw_lockout = true;
            if hpwh.heat_sources()[1].is_on() {
                backup_ran_in_lockout = true;
            }
            if ambient < 8.0 && hpwh.heat_sources()[0].is_on() {
                reengaged_at_8_not_before = false;
            }
        }
        if ambient <= 7.0 && locked {
            compressor_locked_at_7_down = true;
        }
        println!("S5: ambient {ambient:.1} C, locked_out = {locked}, compressor on = {}, backup on = {}", hpwh.heat_sources()[0].is_on(), hpwh.heat_sources()[1].is_on());
    }

    assert!(saw_lockout, "compressor should lock out somewhere in the downward sweep");
    assert!(compressor_locked_at_7_down, "compressor should be locked out by the time ambient reaches 7 C or below");
    assert!(backup_ran_in_lockout, "backup resistor should run while the compressor is locked out");
    assert!(reengaged_at_8_not_before, "compressor should not re-engage before ambient clears the hysteresis band");
}
