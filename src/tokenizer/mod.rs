//! Tokenizer capability consumed by the feature builder.
//!
//! - [`HfTokenizer`] adapts a Hugging Face `tokenizer.json`.
//! - `WhitespaceTokenizer` (tests / `mock` feature) splits on whitespace with hashed ids.

pub mod error;
pub mod hf;
#[cfg(any(test, feature = "mock"))]
pub mod mock;


pub use error::TokenizerError;
pub use hf::{HfTokenizer, load_tokenizer};
#[cfg(any(test, feature = "mock"))]
pub use mock::WhitespaceTokenizer;

/// Text → word pieces → vocabulary ids.
///
/// Implementations must be deterministic and know the `[CLS]` and `[SEP]` tokens.
pub trait Tokenize: Send + Sync {
    /// Splits `text` into tokens without adding special tokens.
    fn tokenize(&self, text: &str) -> Result<Vec<String>, TokenizerError>;

    /// Maps tokens (special tokens included) to vocabulary ids.
    fn convert_tokens_to_ids(&self, tokens: &[String]) -> Result<Vec<u32>, TokenizerError>;
}
