//! Cross-cutting, shared constants.
//!
//! Derived widths (enhancement, siamese vector) are computed from the hidden size so the
//! encoder and the classifier head can never drift apart.

/// Token budget (special tokens included) when no override is configured.
pub const DEFAULT_MAX_LENGTH: usize = 128;

/// ESIM hidden width; matches the BERT-base embedding width.
pub const DEFAULT_HIDDEN_SIZE: usize = 768;

pub const DEFAULT_DROPOUT_PROB: f32 = 0.1;

pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Smallest `max_length` that still fits `[CLS] x [SEP]`.
pub const MIN_MAX_LENGTH: usize = 3;

pub const CLS_TOKEN: &str = "[CLS]";
pub const SEP_TOKEN: &str = "[SEP]";
pub const UNK_TOKEN: &str = "[UNK]";

/// Id used to right-pad `input_ids`, `input_mask` and `segment_ids`.
pub const PAD_ID: u32 = 0;

/// Two-way decision: index 0 is "B is closer", index 1 is "C is closer".
pub const NUM_LABELS: usize = 2;

/// Value written over padded positions before a masked max.
///
/// Real activations come out of tanh/ReLU-bounded layers, so this never wins.
pub const MASKED_MAX_SENTINEL: f64 = -1e7;

/// Added to the softmax denominator of masked attention.
pub const ATTENTION_EPSILON: f64 = 1e-13;

/// Number of rows [`augment`](crate::dataset::augment) derives from one input row.
pub const AUGMENT_VARIANTS: usize = 6;

/// Width of the enhanced per-token representation `[enc, att, enc - att, enc * att]`.
pub const fn enhanced_width(hidden_size: usize) -> usize {
    4 * hidden_size
}

/// Width of a siamese vector `[avg_a, max_a, avg_b, max_b]`.
pub const fn siamese_width(hidden_size: usize) -> usize {
    4 * hidden_size
}
