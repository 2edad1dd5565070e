//! Parser for `testInfo.txt`, the legacy whitespace key-value sidecar that
//! accompanies a directory of schedule CSVs (spec §6).
//!
//! Unknown keys are diagnostics, not failures: the original format grew keys
//! over many releases and a harness built against an older version should
//! not choke on a newer one. `length_of_test` is the one key without which
//! there is nothing to simulate, so its absence is fatal.

use std::path::Path;

use tracing::warn;

use crate::error::{IoError, IoResult};
use crate::units::fahrenheit_to_celsius;

/// The subset of `testInfo.txt` the driver needs to build and run a test.
#[derive(Debug, Clone, PartialEq)]
pub struct TestInfo {
    pub length_of_test_min: usize,
    pub setpoint_c: Option<f64>,
    pub do_conduction: Option<bool>,
    pub do_inversion_mixing: Option<bool>,
    pub inlet_height_fraction: Option<f64>,
    pub tank_size_l: Option<f64>,
    pub top_of_tank_limit_c: Option<f64>,
    pub use_soc: bool,
    pub initial_tank_t_c: Option<f64>,
}

/// Parse a `testInfo.txt` file. Lines are `key value` pairs (any amount of
/// whitespace between and around them); blank lines and lines starting with
/// `#` are ignored.
pub fn parse_test_info(path: &Path) -> IoResult<TestInfo> {
    let text = std::fs::read_to_string(path).map_err(|e| IoError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut length_of_test_min: Option<usize> = None;
    let mut setpoint_c = None;
    let mut do_conduction = None;
    let mut do_inversion_mixing = None;
    let mut inlet_height_fraction = None;
    let mut tank_size_l = None;
    let mut top_of_tank_limit_c = None;
    let mut use_soc = false;
    let mut initial_tank_t_c = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.splitn(2, char::is_whitespace);
        let key = parts.next().unwrap_or("").trim();
        let value = parts.next().unwrap_or("").trim();
        if key.is_empty() {
            continue;
        }

        let invalid = |value: &str| IoError::InvalidValue {
            path: path.to_path_buf(),
            key: key.to_string(),
            value: value.to_string(),
        };

        match key {
            "length_of_test" => {
                length_of_test_min =
                    Some(value.parse::<usize>().map_err(|_| invalid(value))?);
            }
            "setpoint" => {
                let f = value.parse::<f64>().map_err(|_| invalid(value))?;
                setpoint_c = Some(fahrenheit_to_celsius(f));
            }
            "doConduction" => {
                do_conduction = Some(parse_bool(value).ok_or_else(|| invalid(value))?);
            }
            "doInversionMixing" => {
                do_inversion_mixing = Some(parse_bool(value).ok_or_else(|| invalid(value))?);
            }
            "inletH" => {
                inlet_height_fraction = Some(value.parse::<f64>().map_err(|_| invalid(value))?);
            }
            "tanksize" => {
                let gal = value.parse::<f64>().map_err(|_| invalid(value))?;
                tank_size_l = Some(crate::units::gallons_to_liters(gal));
            }
            "tot_limit" => {
                let f = value.parse::<f64>().map_err(|_| invalid(value))?;
                top_of_tank_limit_c = Some(fahrenheit_to_celsius(f));
            }
            "useSoC" => {
                use_soc = parse_bool(value).ok_or_else(|| invalid(value))?;
            }
            "initialTankT_C" => {
                initial_tank_t_c = Some(value.parse::<f64>().map_err(|_| invalid(value))?);
            }
            other => {
                warn!(key = other, value, "ignoring unrecognized testInfo.txt key");
            }
        }
    }

    let length_of_test_min = length_of_test_min.ok_or_else(|| IoError::MissingKey {
        path: path.to_path_buf(),
        key: "length_of_test",
    })?;

    Ok(TestInfo {
        length_of_test_min,
        setpoint_c,
        do_conduction,
        do_inversion_mixing,
        inlet_height_fraction,
        tank_size_l,
        top_of_tank_limit_c,
        use_soc,
        initial_tank_t_c,
    })
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "true" | "True" | "TRUE" => Some(true),
        "0" | "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("testInfo.txt");
        std::fs::write(
            &path,
            "length_of_test 1440\nsetpoint 135\ndoConduction 1\ndoInversionMixing 0\n\
             inletH 0.0\ntanksize 50\ntot_limit 0\nuseSoC 0\ninitialTankT_C 51.7\n",
        )
        .unwrap();

        let info = parse_test_info(&path).unwrap();
        assert_eq!(info.length_of_test_min, 1440);
        assert!((info.setpoint_c.unwrap() - 57.22).abs() < 0.01);
        assert_eq!(info.do_conduction, Some(true));
        assert_eq!(info.do_inversion_mixing, Some(false));
        assert!(!info.use_soc);
        assert!((info.initial_tank_t_c.unwrap() - 51.7).abs() < 1e-9);
    }

    #[test]
    fn missing_length_of_test_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("testInfo.txt");
        std::fs::write(&path, "setpoint 135\n").unwrap();
        let err = parse_test_info(&path).unwrap_err();
        assert!(matches!(err, IoError::MissingKey { key: "length_of_test", .. }));
    }

    #[test]
    fn unknown_keys_are_ignored_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("testInfo.txt");
        std::fs::write(&path, "length_of_test 60\nsomeFutureKey 42\n").unwrap();
        let info = parse_test_info(&path).unwrap();
        assert_eq!(info.length_of_test_min, 60);
    }
}
