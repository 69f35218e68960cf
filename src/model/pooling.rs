use candle_core::{Result, Tensor};

use crate::constants::MASKED_MAX_SENTINEL;

/// Mean over real positions: `[batch, seq_len, dim]` → `[batch, dim]`.
///
/// Every row must have at least one real position.
pub fn masked_mean(xs: &Tensor, mask: &Tensor) -> Result<Tensor> {
    let summed = xs.broadcast_mul(&mask.unsqueeze(2)?)?.sum(1)?;
    let counts = mask.sum_keepdim(1)?;
    summed.broadcast_div(&counts)
}

/// Max over real positions: `[batch, seq_len, dim]` → `[batch, dim]`.
pub fn masked_max(xs: &Tensor, mask: &Tensor) -> Result<Tensor> {
    replace_masked(xs, mask, MASKED_MAX_SENTINEL)?.max(1)
}

/// Overwrites padded positions of `xs` with `value`.
pub fn replace_masked(xs: &Tensor, mask: &Tensor, value: f64) -> Result<Tensor> {
    let mask = mask.unsqueeze(2)?;
    let fill = mask.affine(-value, value)?;
    xs.broadcast_mul(&mask)?.broadcast_add(&fill)
}
