//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An integer setting could not be parsed.
    #[error("failed to parse {name}='{value}': {source}")]
    InvalidInteger {
        name: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// A float setting could not be parsed.
    #[error("failed to parse {name}='{value}': {source}")]
    InvalidFloat {
        name: &'static str,
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    /// Compute target string is not one of `auto`, `cpu`, `cuda[:N]`, `metal[:N]`.
    #[error("invalid compute target '{value}': expected auto, cpu, cuda[:N] or metal[:N]")]
    InvalidComputeTarget { value: String },

    /// `max_length` cannot hold `[CLS]`, one token and `[SEP]`.
    #[error("max_length must be at least {min}, got {value}")]
    MaxLengthTooSmall { value: usize, min: usize },

    /// The bidirectional encoders split `hidden_size` evenly across directions.
    #[error("hidden_size must be a non-zero even number, got {value}")]
    InvalidHiddenSize { value: usize },

    #[error("dropout_prob must be in [0, 1), got {value}")]
    InvalidDropout { value: f32 },

    #[error("batch_size must be non-zero")]
    ZeroBatchSize,

    /// Specified path does not exist on the filesystem.
    #[error("path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    /// Path exists but is not a directory (when a directory was expected).
    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}
