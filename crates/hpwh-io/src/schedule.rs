//! Boundary-condition schedule CSVs (spec §6): one file per channel, each
//! shaped as a `default <value>` line, a `minutes,<field>` header, and zero
//! or more `<minute>,<value>` override rows (1-indexed).

use std::path::{Path, PathBuf};

use crate::error::{IoError, IoResult};
use crate::units::{fahrenheit_to_celsius, gallons_to_liters};

/// Parse one schedule CSV into a per-minute array of `length_of_test_min`
/// raw (unconverted) values, pre-filled with the file's default and patched
/// at the 1-indexed override rows.
pub fn parse_schedule(
    path: &Path,
    field_name: &str,
    length_of_test_min: usize,
) -> IoResult<Vec<f64>> {
    let text = std::fs::read_to_string(path).map_err(|e| IoError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut lines = text.lines();

    let default_line = lines
        .next()
        .ok_or_else(|| IoError::MissingDefaultLine {
            path: path.to_path_buf(),
        })?;
    let default_value = parse_default_line(path, default_line)?;

    let header_line = lines.next().ok_or_else(|| IoError::MissingHeader {
        path: path.to_path_buf(),
    })?;
    validate_header(path, header_line, field_name)?;

    let mut schedule = vec![default_value; length_of_test_min];

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (minute, value) = parse_override_row(path, line)?;
        if minute == 0 || minute > length_of_test_min {
            return Err(IoError::OverrideOutOfRange {
                path: path.to_path_buf(),
                minute,
                length: length_of_test_min,
            });
        }
        schedule[minute - 1] = value;
    }

    Ok(schedule)
}

fn parse_default_line(path: &Path, line: &str) -> IoResult<f64> {
    let malformed = || IoError::MalformedDefaultLine {
        path: path.to_path_buf(),
        line: line.to_string(),
    };
    let mut parts = line.split_whitespace();
    if parts.next() != Some("default") {
        return Err(malformed());
    }
    let value_str = parts.next().ok_or_else(malformed)?;
    value_str.parse::<f64>().map_err(|_| malformed())
}

fn validate_header(path: &Path, line: &str, field_name: &str) -> IoResult<()> {
    let mut parts = line.split(',');
    let minutes_col = parts.next().unwrap_or("").trim();
    let field_col = parts.next().unwrap_or("").trim();
    if minutes_col != "minutes" {
        return Err(IoError::HeaderMismatch {
            path: path.to_path_buf(),
            expected: "minutes".to_string(),
            found: minutes_col.to_string(),
        });
    }
    if field_col != field_name {
        return Err(IoError::HeaderMismatch {
            path: path.to_path_buf(),
            expected: field_name.to_string(),
            found: field_col.to_string(),
        });
    }
    Ok(())
}

fn parse_override_row(path: &Path, line: &str) -> IoResult<(usize, f64)> {
    let malformed = || IoError::MalformedOverrideRow {
        path: path.to_path_buf(),
        line: line.to_string(),
    };
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(line.as_bytes());
    let record = rdr
        .records()
        .next()
        .ok_or_else(malformed)?
        .map_err(IoError::from)?;
    if record.len() != 2 {
        return Err(malformed());
    }
    let minute: usize = record[0].trim().parse().map_err(|_| malformed())?;
    let value: f64 = record[1].trim().parse().map_err(|_| malformed())?;
    Ok((minute, value))
}

/// All per-minute boundary schedules, converted into the SI units the core
/// consumes (liters, Celsius, a raw DR code), loaded from a directory of
/// per-channel CSVs named after the boundary they carry.
#[derive(Debug, Clone)]
pub struct BoundaryScheduleSet {
    pub draw_l: Vec<f64>,
    pub inlet_t_c: Vec<f64>,
    pub ambient_t_c: Vec<f64>,
    pub evaporator_t_c: Vec<f64>,
    pub dr_code: Vec<u8>,
    pub setpoint_c: Option<Vec<f64>>,
    pub soc: Option<Vec<f64>>,
}

/// Filenames the driver looks for inside a test directory.
pub struct ScheduleFileNames {
    pub draw: &'static str,
    pub inlet_t: &'static str,
    pub ambient_t: &'static str,
    pub evaporator_t: &'static str,
    pub dr: &'static str,
    pub setpoint: &'static str,
    pub soc: &'static str,
}

pub const DEFAULT_SCHEDULE_FILE_NAMES: ScheduleFileNames = ScheduleFileNames {
    draw: "drawschedule.csv",
    inlet_t: "inletTschedule.csv",
    ambient_t: "ambientTschedule.csv",
    evaporator_t: "evaporatorTschedule.csv",
    dr: "DRschedule.csv",
    setpoint: "setpointschedule.csv",
    soc: "SoCschedule.csv",
};

/// Load and unit-convert every boundary channel for a `length_of_test_min`
/// minute test. `use_soc` gates whether `SoCschedule.csv` is required.
pub fn load_boundary_schedules(
    dir: &Path,
    length_of_test_min: usize,
    use_soc: bool,
) -> IoResult<BoundaryScheduleSet> {
    let names = &DEFAULT_SCHEDULE_FILE_NAMES;

    let draw_gpm = parse_schedule(&dir.join(names.draw), "flow", length_of_test_min)?;
    let inlet_t_f = parse_schedule(&dir.join(names.inlet_t), "temperature", length_of_test_min)?;
    let ambient_t_f =
        parse_schedule(&dir.join(names.ambient_t), "temperature", length_of_test_min)?;
    let evaporator_t_f = parse_schedule(
        &dir.join(names.evaporator_t),
        "temperature",
        length_of_test_min,
    )?;
    let dr_raw = parse_schedule(&dir.join(names.dr), "OnOff", length_of_test_min)?;

    let setpoint_path = dir.join(names.setpoint);
    let setpoint_c = if setpoint_path.is_file() {
        Some(
            parse_schedule(&setpoint_path, "temperature", length_of_test_min)?
                .into_iter()
                .map(fahrenheit_to_celsius)
                .collect(),
        )
    } else {
        None
    };

    let soc_path = dir.join(names.soc);
    let soc = if use_soc {
        Some(parse_schedule(&soc_path, "temperature", length_of_test_min)?)
    } else if soc_path.is_file() {
        Some(parse_schedule(&soc_path, "temperature", length_of_test_min)?)
    } else {
        None
    };

    Ok(BoundaryScheduleSet {
        draw_l: draw_gpm.into_iter().map(gallons_to_liters).collect(),
        inlet_t_c: inlet_t_f.into_iter().map(fahrenheit_to_celsius).collect(),
        ambient_t_c: ambient_t_f
            .into_iter()
            .map(fahrenheit_to_celsius)
            .collect(),
        evaporator_t_c: evaporator_t_f
            .into_iter()
            .map(fahrenheit_to_celsius)
            .collect(),
        dr_code: dr_raw.into_iter().map(|v| v.round() as u8).collect(),
        setpoint_c,
        soc,
    })
}

/// Absolute path a schedule file would be read from; used by the driver to
/// produce a clear diagnostic before attempting to read.
pub fn schedule_path(dir: &Path, file_name: &str) -> PathBuf {
    dir.join(file_name)
}
