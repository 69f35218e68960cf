use thiserror::Error;

use crate::batch::BatchError;
use crate::config::ConfigError;
use crate::model::ModelError;
use crate::tokenizer::TokenizerError;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("tokenizer error: {0}")]
    Tokenizer(#[from] TokenizerError),

    #[error("batch error: {0}")]
    Batch(#[from] BatchError),

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("no model path configured (set TRIPLET_MODEL_PATH)")]
    MissingModelPath,

    #[error("cannot evaluate an empty dataset")]
    EmptyDataset,

    #[error("invalid model output: {reason}")]
    InvalidOutput { reason: String },
}

impl From<candle_core::Error> for PredictError {
    fn from(err: candle_core::Error) -> Self {
        PredictError::Model(ModelError::from(err))
    }
}
