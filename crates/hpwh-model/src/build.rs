//! Resolves a parsed [`HpwhSimInput`] into a runnable [`hpwh_sim::Hpwh`].
//!
//! Cross-source links (`backup_heat_source_id` / `companion_heat_source_id`
//! / `followed_by_heat_source_id`) are stored in the schema as strings;
//! `build` resolves them to `HeatSourceId`s and rejects both unresolved
//! references and cyclic link graphs via a self-contained three-color
//! (white/gray/black) DFS (`detect_link_cycles`), rather than pulling in a
//! graph crate for what is, per source, at most three fixed-arity edges.

use std::collections::HashMap;

use hpwh_control::{
    Comparator, Distribution, DistributionPoint, HeatingLogic, Mains, Reference,
    StateOfChargeBased, TemperatureBased,
};
use hpwh_core::HeatSourceId;
use hpwh_sim::{
    Compressor, CompressorConfig, HeatSource, HeatSourceKind, Hpwh, PerformanceMap, Resistance,
    Tank, TankConfig,
};

use crate::error::{ModelError, ModelResult};
use crate::schema::{
    ComparatorDef, CompressorConfigDef, DistributionDef, HeatSourceConfig, HeatSourceTypeDef,
    HeatingLogicDef, HpwhSimInput, MainsDef, PerformanceMapDef, ReferenceDef, SystemConfig,
    SystemType,
};

/// Conventional simulation step length: one minute.
pub const DEFAULT_STEP_SECONDS: f64 = 60.0;

/// Build a fully-linked [`Hpwh`] from a parsed model.
pub fn build_hpwh(input: &HpwhSimInput) -> ModelResult<Hpwh> {
    let system = select_system(input)?;

    let tank = build_tank(input, system)?;
    let mut heat_sources: Vec<HeatSource> = system
        .heat_source_configurations
        .iter()
        .map(build_heat_source)
        .collect::<ModelResult<_>>()?;

    let id_index: HashMap<&str, usize> = system
        .heat_source_configurations
        .iter()
        .enumerate()
        .map(|(i, cfg)| (cfg.id.as_str(), i))
        .collect();
    if id_index.len() != system.heat_source_configurations.len() {
        let dup = system
            .heat_source_configurations
            .iter()
            .map(|c| c.id.clone())
            .find(|id| {
                system
                    .heat_source_configurations
                    .iter()
                    .filter(|c| &c.id == id)
                    .count()
                    > 1
            })
            .unwrap_or_default();
        return Err(ModelError::DuplicateId { id: dup });
    }

    resolve_links(system, &id_index, &mut heat_sources)?;
    detect_link_cycles(system, &id_index)?;

    Ok(Hpwh::new(tank, heat_sources, DEFAULT_STEP_SECONDS))
}

fn select_system(input: &HpwhSimInput) -> ModelResult<&SystemConfig> {
    match input.system_type {
        SystemType::Integrated => input
            .integrated_system
            .as_ref()
            .ok_or(ModelError::MissingField {
                what: "integrated_system (system_type is Integrated)",
            }),
        SystemType::Central => input
            .central_system
            .as_ref()
            .ok_or(ModelError::MissingField {
                what: "central_system (system_type is Central)",
            }),
    }
}

fn build_tank(input: &HpwhSimInput, system: &SystemConfig) -> ModelResult<Tank> {
    let n_nodes = input.number_of_nodes;
    let t = &system.tank;
    let inlet_node_index = height_fraction_to_node_index(t.inlet_height_fraction, n_nodes);
    let inlet2_node_index = height_fraction_to_node_index(t.inlet2_height_fraction, n_nodes);

    let config = TankConfig {
        n_nodes,
        volume_l: t.volume_l,
        ua_kj_per_h_c: t.ua_kj_per_h_c,
        fittings_ua_kj_per_h_c: t.fittings_ua_kj_per_h_c,
        mix_below_fraction: t.mix_below_fraction,
        do_conduction: t.do_conduction,
        do_inversion_mixing: t.do_inversion_mixing,
        heat_exchanger_effectiveness: t.heat_exchanger_effectiveness,
        inlet_node_index,
        inlet2_node_index,
        setpoint_c: input.standard_setpoint_c,
        initial_node_temps_c: t.initial_node_temps_c.clone(),
    };
    Ok(Tank::new(config)?)
}

fn height_fraction_to_node_index(height_fraction: f64, n_nodes: usize) -> usize {
    let h = height_fraction.clamp(0.0, 1.0);
    ((h * (n_nodes.max(1) - 1) as f64).round() as usize).min(n_nodes.saturating_sub(1))
}

fn build_heat_source(cfg: &HeatSourceConfig) -> ModelResult<HeatSource> {
    let kind = match &cfg.heat_source {
        HeatSourceTypeDef::Resistance { input_power_kw } => {
            HeatSourceKind::Resistance(Resistance {
                input_power_kw: *input_power_kw,
            })
        }
        HeatSourceTypeDef::Compressor {
            performance_map,
            compressor_config,
            min_ambient_t_c,
            lockout_hysteresis_c,
        } => {
            let map = build_performance_map(performance_map)?;
            let config = build_compressor_config(compressor_config);
            HeatSourceKind::Compressor(Compressor::new(
                map,
                config,
                *min_ambient_t_c,
                *lockout_hysteresis_c,
            ))
        }
    };

    let distribution = build_distribution(&cfg.heat_distribution)?;
    let mut source = HeatSource::new(
        cfg.name.clone().unwrap_or_else(|| cfg.id.clone()),
        kind,
        distribution,
    );
    source.is_vip = cfg.is_vip;
    for logic in &cfg.turn_on_logic {
        source.turn_on_logic.push(build_heating_logic(logic)?);
    }
    for logic in &cfg.shut_off_logic {
        source.shut_off_logic.push(build_heating_logic(logic)?);
    }
    if let Some(standby) = &cfg.standby_logic {
        source.standby_logic = Some(build_heating_logic(standby)?);
    }
    Ok(source)
}

fn build_performance_map(def: &PerformanceMapDef) -> ModelResult<PerformanceMap> {
    Ok(PerformanceMap::new(
        def.evaporator_axis_c.clone(),
        def.condenser_axis_c.clone(),
        def.input_power_kw.clone(),
        def.heating_capacity_kw.clone(),
    )?)
}

fn build_compressor_config(def: &CompressorConfigDef) -> CompressorConfig {
    match *def {
        CompressorConfigDef::SubmergedOrWrapped => CompressorConfig::SubmergedOrWrapped,
        CompressorConfigDef::ExternalSinglePass {
            external_inlet_node,
            external_outlet_node,
        } => CompressorConfig::ExternalSinglePass {
            external_inlet_node,
            external_outlet_node,
        },
        CompressorConfigDef::ExternalMultiPass {
            external_inlet_node,
            external_outlet_node,
        } => CompressorConfig::ExternalMultiPass {
            external_inlet_node,
            external_outlet_node,
        },
    }
}

fn build_distribution(def: &DistributionDef) -> ModelResult<Distribution> {
    Ok(match def {
        DistributionDef::BottomOfTank => Distribution::BottomOfTank,
        DistributionDef::TopOfTank => Distribution::TopOfTank,
        DistributionDef::Weighted { points } => Distribution::weighted(
            points
                .iter()
                .map(|p| DistributionPoint {
                    height_fraction: p.height_fraction,
                    weight: p.weight,
                })
                .collect(),
        )?,
    })
}

fn build_heating_logic(def: &HeatingLogicDef) -> ModelResult<HeatingLogic> {
    Ok(match def {
        HeatingLogicDef::TemperatureBased {
            distribution,
            reference,
            comparator,
            requires_standby,
        } => HeatingLogic::TemperatureBased(TemperatureBased {
            distribution: build_distribution(distribution)?,
            reference: match *reference {
                ReferenceDef::Absolute { temp_c } => Reference::Absolute(temp_c),
                ReferenceDef::Differential { below_setpoint_c } => {
                    Reference::Differential(below_setpoint_c)
                }
            },
            comparator: match comparator {
                ComparatorDef::LessThan => Comparator::LessThan,
                ComparatorDef::GreaterThan => Comparator::GreaterThan,
            },
            requires_standby: *requires_standby,
        }),
        HeatingLogicDef::StateOfChargeBased {
            decision_point,
            hysteresis,
            min_useful_temp_c,
            mains,
        } => HeatingLogic::StateOfChargeBased(StateOfChargeBased {
            decision_point: *decision_point,
            hysteresis: *hysteresis,
            min_useful_temp_c: *min_useful_temp_c,
            mains: match *mains {
                MainsDef::Live => Mains::Live,
                MainsDef::Constant { temp_c } => Mains::Constant(temp_c),
            },
        }),
    })
}

fn resolve_links(
    system: &SystemConfig,
    id_index: &HashMap<&str, usize>,
    heat_sources: &mut [HeatSource],
) -> ModelResult<()> {
    for (i, cfg) in system.heat_source_configurations.iter().enumerate() {
        heat_sources[i].backup_heat_source =
            resolve_one(&cfg.id, &cfg.backup_heat_source_id, id_index)?;
        heat_sources[i].companion_heat_source =
            resolve_one(&cfg.id, &cfg.companion_heat_source_id, id_index)?;
        heat_sources[i].followed_by_heat_source =
            resolve_one(&cfg.id, &cfg.followed_by_heat_source_id, id_index)?;
    }
    Ok(())
}

fn resolve_one(
    source_id: &str,
    target: &Option<String>,
    id_index: &HashMap<&str, usize>,
) -> ModelResult<Option<HeatSourceId>> {
    match target {
        None => Ok(None),
        Some(t) => match id_index.get(t.as_str()) {
            Some(&idx) => Ok(Some(HeatSourceId::from_index(idx as u32))),
            None => Err(ModelError::UnresolvedLink {
                source: source_id.to_string(),
                target: t.clone(),
            }),
        },
    }
}

/// DFS-based cycle detection over the combined backup/companion/follower
/// link graph. White/gray/black coloring: a gray node reached again means
/// a cycle runs through it.
fn detect_link_cycles(system: &SystemConfig, id_index: &HashMap<&str, usize>) -> ModelResult<()> {
    #[derive(Clone, Copy, PartialEq)]
    enum Color {
        White,
        Gray,
        Black,
    }

    let n = system.heat_source_configurations.len();
    let edges: Vec<Vec<usize>> = system
        .heat_source_configurations
        .iter()
        .map(|cfg| {
            [
                &cfg.backup_heat_source_id,
                &cfg.companion_heat_source_id,
                &cfg.followed_by_heat_source_id,
            ]
            .into_iter()
            .filter_map(|t| t.as_ref().and_then(|id| id_index.get(id.as_str()).copied()))
            .collect()
        })
        .collect();

    let mut color = vec![Color::White; n];

    fn visit(
        node: usize,
        edges: &[Vec<usize>],
        color: &mut [Color],
        ids: &[String],
    ) -> ModelResult<()> {
        color[node] = Color::Gray;
        for &next in &edges[node] {
            match color[next] {
                Color::White => visit(next, edges, color, ids)?,
                Color::Gray => {
                    return Err(ModelError::CyclicLinks {
                        start: ids[node].clone(),
                    })
                }
                Color::Black => {}
            }
        }
        color[node] = Color::Black;
        Ok(())
    }

    let ids: Vec<String> = system
        .heat_source_configurations
        .iter()
        .map(|c| c.id.clone())
        .collect();

    for start in 0..n {
        if color[start] == Color::White {
            visit(start, &edges, &mut color, &ids)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{HeatSourceConfig, TankDef};

    fn minimal_resistance_config(id: &str, backup: Option<&str>) -> HeatSourceConfig {
        HeatSourceConfig {
            id: id.to_string(),
            name: None,
            is_vip: false,
            heat_source: HeatSourceTypeDef::Resistance {
                input_power_kw: 4.5,
            },
            heat_distribution: DistributionDef::BottomOfTank,
            turn_on_logic: vec![HeatingLogicDef::TemperatureBased {
                distribution: DistributionDef::BottomOfTank,
                reference: ReferenceDef::Absolute { temp_c: 48.0 },
                comparator: ComparatorDef::LessThan,
                requires_standby: false,
            }],
            shut_off_logic: vec![],
            standby_logic: None,
            backup_heat_source_id: backup.map(str::to_string),
            companion_heat_source_id: None,
            followed_by_heat_source_id: None,
        }
    }

    fn base_input(sources: Vec<HeatSourceConfig>) -> HpwhSimInput {
        HpwhSimInput {
            system_type: SystemType::Integrated,
            number_of_nodes: 12,
            standard_setpoint_c: 51.7,
            fixed_volume: true,
            integrated_system: Some(SystemConfig {
                tank: TankDef {
                    volume_l: 189.3,
                    ua_kj_per_h_c: 12.6,
                    fittings_ua_kj_per_h_c: 0.0,
                    mix_below_fraction: 1.0 / 3.0,
                    heat_exchanger_effectiveness: None,
                    do_conduction: true,
                    do_inversion_mixing: true,
                    inlet_height_fraction: 0.0,
                    inlet2_height_fraction: 0.0,
                    initial_node_temps_c: None,
                },
                heat_source_configurations: sources,
            }),
            central_system: None,
        }
    }

    #[test]
    fn builds_single_resistance_source() {
        let input = base_input(vec![minimal_resistance_config("lower", None)]);
        let hpwh = build_hpwh(&input).unwrap();
        assert_eq!(hpwh.heat_sources().len(), 1);
        assert_eq!(hpwh.tank().n_nodes(), 12);
    }

    #[test]
    fn resolves_backup_link() {
        let input = base_input(vec![
            minimal_resistance_config("primary", Some("backup")),
            minimal_resistance_config("backup", None),
        ]);
        let hpwh = build_hpwh(&input).unwrap();
        assert_eq!(
            hpwh.heat_sources()[0].backup_heat_source.unwrap().index(),
            1
        );
    }

    #[test]
    fn rejects_unresolved_link() {
        let input = base_input(vec![minimal_resistance_config("primary", Some("ghost"))]);
        let err = build_hpwh(&input).unwrap_err();
        assert!(matches!(err, ModelError::UnresolvedLink { .. }));
    }

    #[test]
    fn rejects_cyclic_backup_links() {
        let input = base_input(vec![
            minimal_resistance_config("a", Some("b")),
            minimal_resistance_config("b", Some("a")),
        ]);
        let err = build_hpwh(&input).unwrap_err();
        assert!(matches!(err, ModelError::CyclicLinks { .. }));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let input = base_input(vec![
            minimal_resistance_config("dup", None),
            minimal_resistance_config("dup", None),
        ]);
        let err = build_hpwh(&input).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateId { .. }));
    }
}
