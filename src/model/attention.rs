use candle_core::{D, Result, Tensor};

use crate::constants::{ATTENTION_EPSILON, MASKED_MAX_SENTINEL};

/// Softmax over the last dim of `scores` (`[batch, q, k]`), restricted to positions where
/// `mask` (`[batch, k]`) is 1.
///
/// Masked keys get exactly zero weight; rows over real keys sum to 1.
pub fn masked_softmax(scores: &Tensor, mask: &Tensor) -> Result<Tensor> {
    let mask = mask.unsqueeze(1)?;
    // 0 for real keys, -1e7 for padding.
    let bias = mask.affine(-MASKED_MAX_SENTINEL, MASKED_MAX_SENTINEL)?;
    let weights = candle_nn::ops::softmax(&scores.broadcast_add(&bias)?, D::Minus1)?;
    let weights = weights.broadcast_mul(&mask)?;
    let total = (weights.sum_keepdim(D::Minus1)? + ATTENTION_EPSILON)?;
    weights.broadcast_div(&total)
}

/// Soft alignment of two encoded sequences.
///
/// Returns `(attended_a, attended_b)`: each position of `a` as a weighted sum of `b`'s
/// real positions and vice versa. Padded query positions come back as zeros.
pub fn soft_align(
    a: &Tensor,
    a_mask: &Tensor,
    b: &Tensor,
    b_mask: &Tensor,
) -> Result<(Tensor, Tensor)> {
    let similarity = a.matmul(&b.t()?.contiguous()?)?;

    let a_to_b = masked_softmax(&similarity, b_mask)?;
    let b_to_a = masked_softmax(&similarity.t()?.contiguous()?, a_mask)?;

    let attended_a = a_to_b.matmul(b)?.broadcast_mul(&a_mask.unsqueeze(2)?)?;
    let attended_b = b_to_a.matmul(a)?.broadcast_mul(&b_mask.unsqueeze(2)?)?;

    Ok((attended_a, attended_b))
}
