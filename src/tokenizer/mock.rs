//! Deterministic whitespace tokenizer for tests and examples (no vocabulary file needed).

use super::{Tokenize, TokenizerError};
use crate::constants::{CLS_TOKEN, PAD_ID, SEP_TOKEN, UNK_TOKEN};

/// BERT-compatible ids for the special tokens.
const UNK_ID: u32 = 100;
const CLS_ID: u32 = 101;
const SEP_ID: u32 = 102;
/// Ordinary words hash into `[FIRST_WORD_ID, vocab_size)`.
const FIRST_WORD_ID: u32 = 1000;

/// Lowercases, splits on whitespace, and maps each word to a blake3-derived id.
#[derive(Debug, Clone)]
pub struct WhitespaceTokenizer {
    vocab_size: u32,
}

impl WhitespaceTokenizer {
    pub fn new(vocab_size: u32) -> Self {
        assert!(
            vocab_size > FIRST_WORD_ID,
            "vocab_size must exceed {FIRST_WORD_ID}"
        );
        Self { vocab_size }
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size as usize
    }

    fn word_id(&self, word: &str) -> u32 {
        let digest = blake3::hash(word.as_bytes());
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&digest.as_bytes()[..4]);
        FIRST_WORD_ID + u32::from_le_bytes(bytes) % (self.vocab_size - FIRST_WORD_ID)
    }
}

impl Default for WhitespaceTokenizer {
    fn default() -> Self {
        Self::new(30_522)
    }
}

impl Tokenize for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>, TokenizerError> {
        Ok(text.split_whitespace().map(str::to_lowercase).collect())
    }

    fn convert_tokens_to_ids(&self, tokens: &[String]) -> Result<Vec<u32>, TokenizerError> {
        Ok(tokens
            .iter()
            .map(|token| match token.as_str() {
                CLS_TOKEN => CLS_ID,
                SEP_TOKEN => SEP_ID,
                UNK_TOKEN => UNK_ID,
                "[PAD]" => PAD_ID,
                word => self.word_id(word),
            })
            .collect())
    }
}
