use candle_core::{Device, Tensor};
use tracing::debug;

use crate::constants::{CLS_TOKEN, PAD_ID, SEP_TOKEN};
use crate::tokenizer::{Tokenize, TokenizerError};

/// Fixed-length model input for one text (or one text pair).
///
/// All three vectors are exactly `max_length` long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenFeature {
    pub input_ids: Vec<u32>,
    /// 1 for real tokens (special tokens included), 0 for padding.
    pub input_mask: Vec<u32>,
    /// 0 for the first segment, 1 for the optional second one.
    pub segment_ids: Vec<u32>,
}

impl TokenFeature {
    pub fn max_length(&self) -> usize {
        self.input_ids.len()
    }

    /// Number of real (unpadded) positions.
    pub fn real_len(&self) -> usize {
        self.input_mask.iter().filter(|&&m| m == 1).count()
    }

    /// Converts to `[1, max_length]` tensors on `device`.
    pub fn to_tensors(&self, device: &Device) -> candle_core::Result<FeatureTensors> {
        let len = self.max_length();
        Ok(FeatureTensors {
            input_ids: Tensor::from_slice(&self.input_ids, (1, len), device)?,
            segment_ids: Tensor::from_slice(&self.segment_ids, (1, len), device)?,
            input_mask: Tensor::from_slice(&self.input_mask, (1, len), device)?,
        })
    }
}

/// Batched `u32` feature tensors, each `[batch, max_length]`.
#[derive(Debug, Clone)]
pub struct FeatureTensors {
    pub input_ids: Tensor,
    pub segment_ids: Tensor,
    pub input_mask: Tensor,
}

/// Builds a [`TokenFeature`] for `text_a`, optionally paired with `text_b`.
///
/// Overlong input is cut from the front, so the end of each text is kept. An empty
/// `text_b` counts as absent.
///
/// # Panics
///
/// If the padded output is not exactly `max_length` long, which happens only when
/// `max_length` is smaller than the special tokens it must hold.
pub fn build_feature(
    tokenizer: &dyn Tokenize,
    text_a: &str,
    text_b: Option<&str>,
    max_length: usize,
) -> Result<TokenFeature, TokenizerError> {
    let mut tokens_a = tokenizer.tokenize(text_a)?;
    let mut tokens_b = Vec::new();

    match text_b.filter(|text| !text.is_empty()) {
        Some(text_b) => {
            tokens_b = tokenizer.tokenize(text_b)?;
            truncate_seq_pair(&mut tokens_a, &mut tokens_b, max_length.saturating_sub(3));
        }
        None => truncate_front(&mut tokens_a, max_length.saturating_sub(2)),
    }

    let mut tokens = Vec::with_capacity(max_length);
    tokens.push(CLS_TOKEN.to_string());
    tokens.append(&mut tokens_a);
    tokens.push(SEP_TOKEN.to_string());
    let mut segment_ids = vec![0u32; tokens.len()];

    if !tokens_b.is_empty() {
        segment_ids.resize(segment_ids.len() + tokens_b.len() + 1, 1);
        tokens.append(&mut tokens_b);
        tokens.push(SEP_TOKEN.to_string());
    }

    let mut input_ids = tokenizer.convert_tokens_to_ids(&tokens)?;
    let mut input_mask = vec![1u32; input_ids.len()];

    let real_len = input_ids.len();
    assert!(
        real_len <= max_length,
        "feature of {real_len} tokens does not fit max_length {max_length}"
    );

    input_ids.resize(max_length, PAD_ID);
    input_mask.resize(max_length, PAD_ID);
    segment_ids.resize(max_length, PAD_ID);

    assert_eq!(input_ids.len(), max_length);
    assert_eq!(input_mask.len(), max_length);
    assert_eq!(segment_ids.len(), max_length);

    debug!(
        real_len,
        max_length,
        paired = segment_ids.contains(&1),
        "Built token feature"
    );

    Ok(TokenFeature {
        input_ids,
        input_mask,
        segment_ids,
    })
}

/// Shrinks a token pair in place until `a.len() + b.len() <= max_total`.
///
/// One token at a time is dropped from the front of the longer sequence; on a tie `b`
/// loses the token.
pub fn truncate_seq_pair(tokens_a: &mut Vec<String>, tokens_b: &mut Vec<String>, max_total: usize) {
    let (mut len_a, mut len_b) = (tokens_a.len(), tokens_b.len());
    while len_a + len_b > max_total {
        if len_a > len_b {
            len_a -= 1;
        } else {
            len_b -= 1;
        }
    }

    truncate_front(tokens_a, len_a);
    truncate_front(tokens_b, len_b);
}

/// Keeps the last `max_len` tokens.
fn truncate_front(tokens: &mut Vec<String>, max_len: usize) {
    if tokens.len() > max_len {
        tokens.drain(..tokens.len() - max_len);
    }
}
