//! Error types for configuration and trace input.
//!
//! Prediction and training never fail. Errors only come from the edges of
//! the simulator: building a predictor from a bad configuration, or
//! reading a malformed trace.

use thiserror::Error;

/// An invalid predictor configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A table index, tag, or history width is out of range.
    #[error("{knob} must be between 1 and {max} bits (got {bits})")]
    WidthOutOfRange {
        knob: &'static str,
        bits: usize,
        max: usize,
    },

    /// The TAGE predictor needs at least one tagged component.
    #[error("expected between 1 and {max} tagged components (got {got})")]
    ComponentCount { got: usize, max: usize },

    /// TAGE history lengths must grow from one component to the next.
    #[error("history lengths must be strictly increasing (got {lengths:?})")]
    HistoryNotIncreasing { lengths: Vec<usize> },

    /// A TAGE history length is longer than the global history register.
    #[error("history length {len} exceeds the {max}-bit global history")]
    HistoryTooLong { len: usize, max: usize },

    /// The usefulness aging interval must be nonzero.
    #[error("the usefulness aging interval must be nonzero")]
    ZeroAgingInterval,
}

/// A failure while reading a trace.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("failed to open trace: {0}")]
    Io(#[from] std::io::Error),

    /// A line could not be read, or is not valid UTF-8.
    #[error("line {line}: failed to read trace: {source}")]
    Read {
        line: usize,
        source: std::io::Error,
    },

    /// A line has the wrong number of fields.
    #[error("line {line}: expected 2 or 7 fields (got {got})")]
    FieldCount { line: usize, got: usize },

    /// An address field is not a valid 32-bit hexadecimal value.
    #[error("line {line}: invalid address '{field}'")]
    Address { line: usize, field: String },

    /// A flag field is not '0' or '1'.
    #[error("line {line}: invalid flag '{field}' (expected 0 or 1)")]
    Flag { line: usize, field: String },
}
