//! Error types for the series diagnostics library

use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Timestamps not strictly increasing, duplicated, or values not finite
    #[error("Invalid series: {0}")]
    InvalidSeries(String),

    /// Sequence shorter than the operation requires
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Moving-average window out of range
    #[error("Invalid window size {window} for series of length {len}")]
    InvalidWindow { window: usize, len: usize },

    /// Lag out of range
    #[error("Invalid lag {lag} for series of length {len}")]
    InvalidLag { lag: usize, len: usize },

    /// Regression design matrix is rank-deficient
    #[error("Singular design matrix: {0}")]
    SingularDesign(String),

    /// Slice bounds exceed the series
    #[error("Range {start}..{end} out of bounds for series of length {len}")]
    OutOfRange { start: usize, end: usize, len: usize },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Data parsing error
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// TOML deserialization error
    #[error("TOML parse error: {0}")]
    TomlDeError(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML write error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl Error {
    /// Deterministic input-validity failure raised by the numeric core.
    ///
    /// These never succeed on retry with the same input.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidSeries(_)
                | Error::InsufficientData { .. }
                | Error::InvalidWindow { .. }
                | Error::InvalidLag { .. }
                | Error::SingularDesign(_)
                | Error::OutOfRange { .. }
        )
    }
}
