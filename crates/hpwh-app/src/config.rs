//! Per-instance simulation configuration, replacing the legacy module-level
//! `DEBUG`/`TEST` flags spec §9 calls out for removal: verbosity, an
//! optional debug-output sink, and the unit mode the driver reports in.

use std::path::PathBuf;

/// How much detail a run should log, independent of the `tracing`
/// subscriber's own filter — this governs what the driver itself decides
/// to compute and emit (e.g. whether to pay for the timing instrumentation
/// in [`hpwh_core::timing`]), not the log formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

/// Units the driver reports summary figures in; the simulation core itself
/// always computes in SI regardless of this setting (spec §9: "nothing in
/// the core should call it").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitMode {
    #[default]
    UsCustomary,
    Si,
}

/// Per-instance configuration for one driver invocation.
#[derive(Debug, Clone, Default)]
pub struct SimulationConfig {
    pub verbosity: Verbosity,
    /// When set, the driver additionally appends one diagnostic line per
    /// step to this path (distinct from the results CSV), mirroring the
    /// legacy global debug-output file but scoped to a single run.
    pub debug_output_path: Option<PathBuf>,
    pub unit_mode: UnitMode,
}

impl SimulationConfig {
    pub fn is_verbose(&self) -> bool {
        matches!(self.verbosity, Verbosity::Verbose)
    }

    pub fn is_quiet(&self) -> bool {
        matches!(self.verbosity, Verbosity::Quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_normal_verbosity_us_customary() {
        let cfg = SimulationConfig::default();
        assert_eq!(cfg.verbosity, Verbosity::Normal);
        assert_eq!(cfg.unit_mode, UnitMode::UsCustomary);
        assert!(cfg.debug_output_path.is_none());
    }
}
