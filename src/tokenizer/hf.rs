use std::ffi::OsStr;
use std::path::Path;

use tokenizers::Tokenizer;
use tracing::{debug, info};

use super::{Tokenize, TokenizerError};
use crate::constants::{CLS_TOKEN, SEP_TOKEN, UNK_TOKEN};

/// Loads a tokenizer from a model directory or explicit tokenizer.json path.
pub fn load_tokenizer(path: &Path) -> Result<Tokenizer, TokenizerError> {
    let tokenizer_path = if path
        .file_name()
        .is_some_and(|name| name == OsStr::new("tokenizer.json"))
    {
        path.to_path_buf()
    } else if path.is_dir() {
        path.join("tokenizer.json")
    } else {
        path.parent()
            .ok_or_else(|| TokenizerError::NotFound {
                path: path.to_path_buf(),
            })?
            .join("tokenizer.json")
    };

    if !tokenizer_path.exists() {
        return Err(TokenizerError::NotFound {
            path: tokenizer_path,
        });
    }

    Tokenizer::from_file(&tokenizer_path).map_err(|e| TokenizerError::LoadFailed {
        reason: format!("{}: {}", tokenizer_path.display(), e),
    })
}

/// WordPiece-style adapter over a Hugging Face tokenizer.
///
/// Tokens are produced without the post-processor so `[CLS]`/`[SEP]` placement stays with
/// the feature builder.
pub struct HfTokenizer {
    inner: Tokenizer,
    unk_id: Option<u32>,
}

impl std::fmt::Debug for HfTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HfTokenizer")
            .field("vocab_size", &self.inner.get_vocab_size(true))
            .field("unk_id", &self.unk_id)
            .finish()
    }
}

impl HfTokenizer {
    /// Wraps a loaded tokenizer; its vocabulary must contain `[CLS]` and `[SEP]`.
    ///
    /// Truncation and padding declared in `tokenizer.json` are switched off: the feature
    /// builder owns both, and it keeps the tail of overlong text.
    pub fn new(mut inner: Tokenizer) -> Result<Self, TokenizerError> {
        for token in [CLS_TOKEN, SEP_TOKEN] {
            if inner.token_to_id(token).is_none() {
                return Err(TokenizerError::MissingSpecialToken { token });
            }
        }

        inner
            .with_truncation(None)
            .map_err(|e| TokenizerError::LoadFailed {
                reason: format!("Failed to disable truncation: {}", e),
            })?;
        inner.with_padding(None);

        let unk_id = inner.token_to_id(UNK_TOKEN);
        Ok(Self { inner, unk_id })
    }

    /// Loads `tokenizer.json` from a model directory or an explicit file path.
    pub fn from_path(path: &Path) -> Result<Self, TokenizerError> {
        let inner = load_tokenizer(path)?;
        let tokenizer = Self::new(inner)?;

        info!(
            path = %path.display(),
            vocab_size = tokenizer.inner.get_vocab_size(true),
            "Tokenizer loaded"
        );

        Ok(tokenizer)
    }

    pub fn vocab_size(&self) -> usize {
        self.inner.get_vocab_size(true)
    }
}

impl Tokenize for HfTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>, TokenizerError> {
        let encoding =
            self.inner
                .encode(text, false)
                .map_err(|e| TokenizerError::TokenizationFailed {
                    reason: e.to_string(),
                })?;

        debug!(
            text_len = text.len(),
            token_count = encoding.len(),
            "Tokenized text"
        );

        Ok(encoding.get_tokens().to_vec())
    }

    fn convert_tokens_to_ids(&self, tokens: &[String]) -> Result<Vec<u32>, TokenizerError> {
        tokens
            .iter()
            .map(|token| {
                self.inner
                    .token_to_id(token)
                    .or(self.unk_id)
                    .ok_or_else(|| TokenizerError::UnknownToken {
                        token: token.clone(),
                    })
            })
            .collect()
    }
}
