// File: crates/chart-engine/src/error.rs
// Summary: Engine error type; only caller contract violations surface as errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Threshold was neither absent, a number, nor an array of `{x, y}` points.
    #[error("invalid threshold shape: {0}")]
    InvalidThreshold(String),

    #[error("invalid frequency '{0}': expected \"<integer> <unit>\"")]
    InvalidFrequency(String),

    #[error("unknown resolution id '{0}'")]
    UnknownResolution(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
