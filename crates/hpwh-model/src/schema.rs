//! `HPWHSimInput`: the JSON model schema described in spec §6.
//!
//! Mirrors the nested shape of the original `hpwh_data_model` JSON schema
//! (`HPWHSimInput` / `HeatSourceConfiguration`) closely enough that a model
//! produced by the original tooling maps onto these types field-for-field,
//! while using serde idioms (tagged enums, `#[serde(default)]`) rather than
//! the original's discriminated-union-by-string-field convention.

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

fn default_lockout_hysteresis() -> f64 {
    1.0
}

/// Top-level system configuration: an integrated unit (tank + sources in
/// one cabinet) or a central system (shared tank serving a central plant).
/// Only the named variant's payload is honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemType {
    Integrated,
    Central,
}

/// The root JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HpwhSimInput {
    pub system_type: SystemType,
    pub number_of_nodes: usize,
    pub standard_setpoint_c: f64,
    #[serde(default)]
    pub fixed_volume: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrated_system: Option<SystemConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub central_system: Option<SystemConfig>,
}

/// The nested payload shared by both `system_type` variants: one tank and
/// its heat sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    pub tank: TankDef,
    pub heat_source_configurations: Vec<HeatSourceConfig>,
}

/// JSON shape of the tank object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TankDef {
    pub volume_l: f64,
    pub ua_kj_per_h_c: f64,
    #[serde(default)]
    pub fittings_ua_kj_per_h_c: f64,
    /// `bottom_fraction_of_tank_mixing_on_draw` in the original schema.
    #[serde(default)]
    pub mix_below_fraction: f64,
    #[serde(default)]
    pub heat_exchanger_effectiveness: Option<f64>,
    #[serde(default = "default_true")]
    pub do_conduction: bool,
    #[serde(default = "default_true")]
    pub do_inversion_mixing: bool,
    /// Fractional inlet height in `[0, 1]`; converted to a node index at
    /// build time.
    #[serde(default)]
    pub inlet_height_fraction: f64,
    #[serde(default)]
    pub inlet2_height_fraction: f64,
    #[serde(default)]
    pub initial_node_temps_c: Option<Vec<f64>>,
}

/// One entry of `heat_source_configurations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatSourceConfig {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_vip: bool,
    pub heat_source: HeatSourceTypeDef,
    pub heat_distribution: DistributionDef,
    #[serde(default)]
    pub turn_on_logic: Vec<HeatingLogicDef>,
    #[serde(default)]
    pub shut_off_logic: Vec<HeatingLogicDef>,
    #[serde(default)]
    pub standby_logic: Option<HeatingLogicDef>,
    #[serde(default)]
    pub backup_heat_source_id: Option<String>,
    #[serde(default)]
    pub companion_heat_source_id: Option<String>,
    #[serde(default)]
    pub followed_by_heat_source_id: Option<String>,
}

/// The `heat_source` product/performance payload: resistance or compressor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "heat_source_type", rename_all = "snake_case")]
pub enum HeatSourceTypeDef {
    Resistance {
        input_power_kw: f64,
    },
    Compressor {
        performance_map: PerformanceMapDef,
        compressor_config: CompressorConfigDef,
        min_ambient_t_c: f64,
        #[serde(default = "default_lockout_hysteresis")]
        lockout_hysteresis_c: f64,
    },
}

/// Rectilinear performance grid, row-major over `(evaporator, condenser)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMapDef {
    pub evaporator_axis_c: Vec<f64>,
    pub condenser_axis_c: Vec<f64>,
    pub input_power_kw: Vec<f64>,
    pub heating_capacity_kw: Vec<f64>,
}

/// How a compressor's condenser couples to the tank (supplement 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompressorConfigDef {
    SubmergedOrWrapped,
    ExternalSinglePass {
        external_inlet_node: usize,
        external_outlet_node: usize,
    },
    ExternalMultiPass {
        external_inlet_node: usize,
        external_outlet_node: usize,
    },
}

/// JSON shape of `Distribution`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DistributionDef {
    BottomOfTank,
    TopOfTank,
    Weighted { points: Vec<DistributionPointDef> },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DistributionPointDef {
    pub height_fraction: f64,
    pub weight: f64,
}

/// JSON shape of `HeatingLogic`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HeatingLogicDef {
    TemperatureBased {
        distribution: DistributionDef,
        reference: ReferenceDef,
        comparator: ComparatorDef,
        #[serde(default)]
        requires_standby: bool,
    },
    StateOfChargeBased {
        decision_point: f64,
        #[serde(default)]
        hysteresis: f64,
        min_useful_temp_c: f64,
        #[serde(default)]
        mains: MainsDef,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReferenceDef {
    Absolute { temp_c: f64 },
    Differential { below_setpoint_c: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparatorDef {
    LessThan,
    GreaterThan,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MainsDef {
    Live,
    Constant { temp_c: f64 },
}

impl Default for MainsDef {
    fn default() -> Self {
        MainsDef::Live
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let input = HpwhSimInput {
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
                heat_source_configurations: vec![HeatSourceConfig {
                    id: "lower".into(),
                    name: Some("lower element".into()),
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
                    backup_heat_source_id: None,
                    companion_heat_source_id: None,
                    followed_by_heat_source_id: None,
                }],
            }),
            central_system: None,
        };

        let json = serde_json::to_string(&input).unwrap();
        let back: HpwhSimInput = serde_json::from_str(&json).unwrap();
        assert_eq!(back.number_of_nodes, 12);
        assert!(back.integrated_system.is_some());
    }
}
