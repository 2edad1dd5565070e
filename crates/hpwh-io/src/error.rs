//! Errors for the external file-format boundary: schedule CSVs,
//! `testInfo.txt`, and the results writer.
//!
//! All of these are spec §7 "I/O error": reported to the driver, which
//! aborts with a non-zero exit rather than retrying or recovering.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IoError {
    #[error("Failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: missing required 'default <value>' line")]
    MissingDefaultLine { path: PathBuf },

    #[error("{path}: malformed default line: {line}")]
    MalformedDefaultLine { path: PathBuf, line: String },

    #[error("{path}: missing 'minutes,<field>' header line")]
    MissingHeader { path: PathBuf },

    #[error("{path}: header field mismatch: expected '{expected}', found '{found}'")]
    HeaderMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    #[error("{path}: malformed override row: {line}")]
    MalformedOverrideRow { path: PathBuf, line: String },

    #[error("{path}: override at minute {minute} is out of range (test length {length})")]
    OverrideOutOfRange {
        path: PathBuf,
        minute: usize,
        length: usize,
    },

    #[error("{path}: missing required key '{key}'")]
    MissingKey { path: PathBuf, key: &'static str },

    #[error("{path}: invalid value for key '{key}': {value}")]
    InvalidValue {
        path: PathBuf,
        key: String,
        value: String,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type IoResult<T> = Result<T, IoError>;
