use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenizerError {
    #[error("tokenizer not found at path: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to load tokenizer: {reason}")]
    LoadFailed { reason: String },

    #[error("tokenization failed: {reason}")]
    TokenizationFailed { reason: String },

    /// Token has no id and the vocabulary carries no `[UNK]` fallback.
    #[error("token '{token}' is not in the vocabulary")]
    UnknownToken { token: String },

    #[error("vocabulary is missing required special token {token}")]
    MissingSpecialToken { token: &'static str },
}

impl From<std::io::Error> for TokenizerError {
    fn from(err: std::io::Error) -> Self {
        TokenizerError::LoadFailed {
            reason: err.to_string(),
        }
    }
}
