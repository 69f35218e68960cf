use thiserror::Error;

use crate::tokenizer::TokenizerError;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("cannot collate an empty batch")]
    EmptyBatch,

    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),

    #[error("failed to build batch tensors: {reason}")]
    TensorFailed { reason: String },
}

impl From<candle_core::Error> for BatchError {
    fn from(err: candle_core::Error) -> Self {
        BatchError::TensorFailed {
            reason: err.to_string(),
        }
    }
}
