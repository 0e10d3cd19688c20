//! Error type shared by the tuning engine and its collaborators.

use thiserror::Error;

/// Main error type for schedule tuning.
#[derive(Error, Debug)]
pub enum TuneError {
    /// The three schedule vectors disagree on their length.
    #[error("Validation error: vectors dT ({dt}), A ({amplitude}) and psize ({psize}) are not the same length")]
    Validation {
        dt: usize,
        amplitude: usize,
        psize: usize,
    },

    /// A schedule value lies outside its domain.
    #[error("Domain error: {variable}[{index}] = {value} is out of range")]
    OutOfDomain {
        variable: &'static str,
        index: usize,
        value: f64,
    },

    #[error("Search interval [{lower}, {upper}] is empty")]
    EmptyInterval { lower: f64, upper: f64 },

    #[error("Unknown variable selector: {0} (expected dT, A, psize, all, both or joint)")]
    UnknownVariable(String),

    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    #[error("Parse error in {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    #[error("Solver error: {0}")]
    Solver(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TuneError {
    pub(crate) fn parse(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        TuneError::Parse {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}
