//! External file-format boundary: boundary-condition schedule CSVs,
//! `testInfo.txt`, the CSV results writer, and the unit conversions that
//! keep Fahrenheit/gallons out of the simulation core.

pub mod error;
pub mod results_writer;
pub mod schedule;
pub mod test_info;
pub mod units;

pub use error::{IoError, IoResult};
pub use results_writer::{source_names, ResultsWriter};
pub use schedule::{load_boundary_schedules, parse_schedule, BoundaryScheduleSet};
pub use test_info::{parse_test_info, TestInfo};
