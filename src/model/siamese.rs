use candle_core::{D, Module, Result, Tensor};
use candle_nn::{Linear, VarBuilder};
use tracing::debug;

use super::attention::soft_align;
use super::encoder::MaskedBiLstm;
use super::init::xavier_linear;
use super::pooling::{masked_max, masked_mean};
use crate::constants::{enhanced_width, siamese_width};

/// ESIM-style pair encoder shared by the A/B and A/C comparisons.
///
/// encode → align → enhance → project → compose → pool.
#[derive(Debug, Clone)]
pub struct SiameseEncoder {
    encoding: MaskedBiLstm,
    projection: Linear,
    composition: MaskedBiLstm,
    hidden_size: usize,
}

impl SiameseEncoder {
    pub fn new(embedding_dim: usize, hidden_size: usize, vb: VarBuilder) -> Result<Self> {
        Ok(Self {
            encoding: MaskedBiLstm::new(embedding_dim, hidden_size, vb.pp("encoding"))?,
            projection: xavier_linear(
                enhanced_width(hidden_size),
                hidden_size,
                vb.pp("projection"),
            )?,
            composition: MaskedBiLstm::new(hidden_size, hidden_size, vb.pp("composition"))?,
            hidden_size,
        })
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Width of the vector returned by [`encode_pair`](Self::encode_pair).
    pub fn output_dim(&self) -> usize {
        siamese_width(self.hidden_size)
    }

    /// `embedding_*`: `[batch, seq_len, embedding_dim]`; `mask_*`: `[batch, seq_len]` f32.
    ///
    /// Returns `[batch, 4 * hidden_size]` = `[avg_a, max_a, avg_b, max_b]`.
    pub fn encode_pair(
        &self,
        embedding_a: &Tensor,
        embedding_b: &Tensor,
        mask_a: &Tensor,
        mask_b: &Tensor,
    ) -> Result<Tensor> {
        let encoded_a = self.encoding.forward(embedding_a, mask_a)?;
        let encoded_b = self.encoding.forward(embedding_b, mask_b)?;

        let (attended_a, attended_b) = soft_align(&encoded_a, mask_a, &encoded_b, mask_b)?;

        let composed_a = self.compose(&encoded_a, &attended_a, mask_a)?;
        let composed_b = self.compose(&encoded_b, &attended_b, mask_b)?;

        debug!(
            dims_a = ?composed_a.dims(),
            dims_b = ?composed_b.dims(),
            "Composed siamese pair"
        );

        Tensor::cat(
            &[
                &masked_mean(&composed_a, mask_a)?,
                &masked_max(&composed_a, mask_a)?,
                &masked_mean(&composed_b, mask_b)?,
                &masked_max(&composed_b, mask_b)?,
            ],
            D::Minus1,
        )
    }

    /// `[enc, att, enc - att, enc * att]` → linear + ReLU → composition BiLSTM.
    fn compose(&self, encoded: &Tensor, attended: &Tensor, mask: &Tensor) -> Result<Tensor> {
        let enhanced = Tensor::cat(
            &[
                encoded,
                attended,
                &(encoded - attended)?,
                &(encoded * attended)?,
            ],
            D::Minus1,
        )?;
        let projected = self.projection.forward(&enhanced)?.relu()?;
        self.composition.forward(&projected, mask)
    }
}
