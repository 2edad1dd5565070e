//! Per-minute CSV results writer (spec §6): one header row, then one row
//! per step with the ambient/inlet/draw boundary, per-source input/output
//! energy, and a thermocouple reading per tank node.

use std::io::Write;
use std::path::Path;

use hpwh_sim::{Hpwh, StepInputs, StepOutputs};

use crate::error::{IoError, IoResult};
use crate::units::{celsius_to_fahrenheit, kwh_to_kj, liters_to_gallons};

/// Writes the fixed-width results CSV one row at a time, emitting the
/// header on the first call.
pub struct ResultsWriter<W: Write> {
    writer: csv::Writer<W>,
    path: String,
    n_sources: usize,
    n_nodes: usize,
    header_written: bool,
}

impl ResultsWriter<std::fs::File> {
    pub fn create(path: &Path, n_sources: usize, n_nodes: usize) -> IoResult<Self> {
        let file = std::fs::File::create(path).map_err(|e| IoError::Write {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            writer: csv::Writer::from_writer(file),
            path: path.display().to_string(),
            n_sources,
            n_nodes,
            header_written: false,
        })
    }
}

impl<W: Write> ResultsWriter<W> {
    fn write_header(&mut self, source_names: &[String]) -> IoResult<()> {
        let mut header = vec![
            "minute".to_string(),
            "Ta_C".to_string(),
            "inletT_C".to_string(),
            "draw_gal".to_string(),
        ];
        for name in source_names {
            header.push(format!("{name}_input_kJ"));
            header.push(format!("{name}_output_kJ"));
        }
        for i in 0..self.n_nodes {
            header.push(format!("T{i}_C"));
        }
        self.write_record(&header)?;
        self.header_written = true;
        Ok(())
    }

    fn write_record(&mut self, fields: &[String]) -> IoResult<()> {
        self.writer.write_record(fields).map_err(|e| IoError::Write {
            path: self.path.clone().into(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e),
        })
    }

    /// Append one minute's row. `minute` is 1-indexed, matching the
    /// schedule files' override convention.
    pub fn write_step(
        &mut self,
        minute: usize,
        inputs: &StepInputs,
        outputs: &StepOutputs,
        source_names: &[String],
        node_temps_c: &[f64],
    ) -> IoResult<()> {
        if !self.header_written {
            self.write_header(source_names)?;
        }
        debug_assert_eq!(source_names.len(), self.n_sources);
        debug_assert_eq!(node_temps_c.len(), self.n_nodes);

        let mut row = vec![
            minute.to_string(),
            format!("{:.2}", celsius_to_fahrenheit(inputs.ambient_t_c)),
            format!("{:.2}", celsius_to_fahrenheit(inputs.inlet_t_c)),
            format!("{:.4}", liters_to_gallons(inputs.draw_volume_l)),
        ];
        for (input_kwh, output_kwh) in outputs
            .per_source_energy_input_kwh
            .iter()
            .zip(&outputs.per_source_energy_output_kwh)
        {
            row.push(format!("{:.4}", kwh_to_kj(*input_kwh)));
            row.push(format!("{:.4}", kwh_to_kj(*output_kwh)));
        }
        for t in node_temps_c {
            row.push(format!("{:.2}", celsius_to_fahrenheit(*t)));
        }
        self.write_record(&row)
    }

    pub fn flush(&mut self) -> IoResult<()> {
        self.writer.flush().map_err(|e| IoError::Write {
            path: self.path.clone().into(),
            source: e,
        })
    }
}

/// Convenience names for the columns a given `Hpwh` will produce, in order.
pub fn source_names(hpwh: &Hpwh) -> Vec<String> {
    hpwh.heat_sources().iter().map(|s| s.name.clone()).collect()
}
