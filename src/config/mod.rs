//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `TRIPLET_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_DROPOUT_PROB, DEFAULT_HIDDEN_SIZE, DEFAULT_MAX_LENGTH,
    MIN_MAX_LENGTH,
};

/// Where tensors and parameters live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComputeTarget {
    /// First compiled GPU backend that initialises, else CPU.
    #[default]
    Auto,
    Cpu,
    Cuda(usize),
    Metal(usize),
}

impl FromStr for ComputeTarget {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_ascii_lowercase();
        let invalid = || ConfigError::InvalidComputeTarget {
            value: s.to_string(),
        };

        let (backend, ordinal) = match value.split_once(':') {
            Some((backend, ordinal)) => {
                let ordinal: usize = ordinal.parse().map_err(|_| invalid())?;
                (backend, ordinal)
            }
            None => (value.as_str(), 0),
        };

        match backend {
            "auto" if !value.contains(':') => Ok(Self::Auto),
            "cpu" if !value.contains(':') => Ok(Self::Cpu),
            "cuda" => Ok(Self::Cuda(ordinal)),
            "metal" => Ok(Self::Metal(ordinal)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for ComputeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Cpu => write!(f, "cpu"),
            Self::Cuda(ordinal) => write!(f, "cuda:{ordinal}"),
            Self::Metal(ordinal) => write!(f, "metal:{ordinal}"),
        }
    }
}

/// Model and pipeline configuration.
///
/// Use [`ModelConfig::from_env`] to read `TRIPLET_*` overrides on top of defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Token budget per text, `[CLS]`/`[SEP]` included. Default: `128`.
    pub max_length: usize,

    /// ESIM hidden width. Default: `768`.
    pub hidden_size: usize,

    /// Dropout probability used by the classifier head in training mode. Default: `0.1`.
    pub dropout_prob: f32,

    /// Device selection. Default: [`ComputeTarget::Auto`].
    pub compute_target: ComputeTarget,

    /// Examples per batch for dataset-level prediction. Default: `32`.
    pub batch_size: usize,

    /// Checkpoint directory (`config.json` + `model.safetensors`).
    pub model_path: Option<PathBuf>,

    /// Explicit `tokenizer.json`; defaults to the one inside `model_path`.
    pub tokenizer_path: Option<PathBuf>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            hidden_size: DEFAULT_HIDDEN_SIZE,
            dropout_prob: DEFAULT_DROPOUT_PROB,
            compute_target: ComputeTarget::Auto,
            batch_size: DEFAULT_BATCH_SIZE,
            model_path: None,
            tokenizer_path: None,
        }
    }
}

impl ModelConfig {
    const ENV_MAX_LENGTH: &'static str = "TRIPLET_MAX_LENGTH";
    const ENV_HIDDEN_SIZE: &'static str = "TRIPLET_HIDDEN_SIZE";
    const ENV_DROPOUT_PROB: &'static str = "TRIPLET_DROPOUT_PROB";
    const ENV_COMPUTE_TARGET: &'static str = "TRIPLET_COMPUTE_TARGET";
    const ENV_BATCH_SIZE: &'static str = "TRIPLET_BATCH_SIZE";
    const ENV_MODEL_PATH: &'static str = "TRIPLET_MODEL_PATH";
    const ENV_TOKENIZER_PATH: &'static str = "TRIPLET_TOKENIZER_PATH";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let max_length = Self::parse_usize_from_env(Self::ENV_MAX_LENGTH, defaults.max_length)?;
        let hidden_size = Self::parse_usize_from_env(Self::ENV_HIDDEN_SIZE, defaults.hidden_size)?;
        let dropout_prob = Self::parse_f32_from_env(Self::ENV_DROPOUT_PROB, defaults.dropout_prob)?;
        let compute_target = match env::var(Self::ENV_COMPUTE_TARGET) {
            Ok(value) => value.parse()?,
            Err(_) => defaults.compute_target,
        };
        let batch_size = Self::parse_usize_from_env(Self::ENV_BATCH_SIZE, defaults.batch_size)?;
        let model_path = Self::parse_optional_path_from_env(Self::ENV_MODEL_PATH);
        let tokenizer_path = Self::parse_optional_path_from_env(Self::ENV_TOKENIZER_PATH);

        Ok(Self {
            max_length,
            hidden_size,
            dropout_prob,
            compute_target,
            batch_size,
            model_path,
            tokenizer_path,
        })
    }

    /// Validates numeric invariants and configured paths.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_length < MIN_MAX_LENGTH {
            return Err(ConfigError::MaxLengthTooSmall {
                value: self.max_length,
                min: MIN_MAX_LENGTH,
            });
        }

        if self.hidden_size == 0 || !self.hidden_size.is_multiple_of(2) {
            return Err(ConfigError::InvalidHiddenSize {
                value: self.hidden_size,
            });
        }

        if !(0.0..1.0).contains(&self.dropout_prob) {
            return Err(ConfigError::InvalidDropout {
                value: self.dropout_prob,
            });
        }

        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }

        if let Some(ref path) = self.model_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        if let Some(ref path) = self.tokenizer_path
            && !path.exists()
        {
            return Err(ConfigError::PathNotFound { path: path.clone() });
        }

        Ok(())
    }

    /// Returns the tokenizer location: the explicit path, else the model directory.
    pub fn resolved_tokenizer_path(&self) -> Option<PathBuf> {
        self.tokenizer_path
            .clone()
            .or_else(|| self.model_path.clone())
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_hidden_size(mut self, hidden_size: usize) -> Self {
        self.hidden_size = hidden_size;
        self
    }

    pub fn with_compute_target(mut self, compute_target: ComputeTarget) -> Self {
        self.compute_target = compute_target;
        self
    }

    fn parse_usize_from_env(name: &'static str, default: usize) -> Result<usize, ConfigError> {
        match env::var(name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|source| ConfigError::InvalidInteger {
                    name,
                    value,
                    source,
                }),
            Err(_) => Ok(default),
        }
    }

    fn parse_f32_from_env(name: &'static str, default: f32) -> Result<f32, ConfigError> {
        match env::var(name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|source| ConfigError::InvalidFloat {
                    name,
                    value,
                    source,
                }),
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }
}
