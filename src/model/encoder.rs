//! Length-aware bidirectional LSTM.
//!
//! Sequences are right-padded. The recurrence only advances on positions whose mask is 1,
//! so each direction sees exactly the real tokens: the backward pass starts from a zero
//! state at the last real token, as a packed sequence would. Padded outputs are zero.

use candle_core::{D, IndexOp, Result, Tensor};
use candle_nn::init::Init;
use candle_nn::rnn::{LSTM, LSTMConfig, LSTMState};
use candle_nn::{RNN, VarBuilder};

use super::init::xavier_bound;

#[derive(Debug, Clone)]
pub struct MaskedBiLstm {
    forward: LSTM,
    backward: LSTM,
    output_dim: usize,
}

impl MaskedBiLstm {
    /// `output_dim` is the concatenated width; each direction gets half.
    pub fn new(input_dim: usize, output_dim: usize, vb: VarBuilder) -> Result<Self> {
        if output_dim == 0 || !output_dim.is_multiple_of(2) {
            candle_core::bail!("bidirectional output width must be even, got {output_dim}");
        }

        let direction_dim = output_dim / 2;
        let bound = xavier_bound(input_dim, 4 * direction_dim);
        let config = || LSTMConfig {
            w_ih_init: Init::Uniform {
                lo: -bound,
                up: bound,
            },
            b_ih_init: Some(Init::Const(0.0)),
            b_hh_init: Some(Init::Const(0.0)),
            ..LSTMConfig::default()
        };

        Ok(Self {
            forward: candle_nn::lstm(input_dim, direction_dim, config(), vb.pp("forward"))?,
            backward: candle_nn::lstm(input_dim, direction_dim, config(), vb.pp("backward"))?,
            output_dim,
        })
    }

    pub fn output_dim(&self) -> usize {
        self.output_dim
    }

    /// `xs`: `[batch, seq_len, input_dim]`, `mask`: `[batch, seq_len]` (f32 0/1).
    ///
    /// Returns `[batch, seq_len, output_dim]`.
    pub fn forward(&self, xs: &Tensor, mask: &Tensor) -> Result<Tensor> {
        let forward = run_direction(&self.forward, xs, mask, false)?;
        let backward = run_direction(&self.backward, xs, mask, true)?;
        Tensor::cat(&[&forward, &backward], D::Minus1)
    }
}

fn run_direction(lstm: &LSTM, xs: &Tensor, mask: &Tensor, reverse: bool) -> Result<Tensor> {
    let (batch, seq_len, _) = xs.dims3()?;
    let mut state = lstm.zero_state(batch)?;
    let mut outputs = Vec::with_capacity(seq_len);

    let positions: Box<dyn Iterator<Item = usize>> = if reverse {
        Box::new((0..seq_len).rev())
    } else {
        Box::new(0..seq_len)
    };

    for t in positions {
        let x_t = xs.i((.., t, ..))?.contiguous()?;
        let m_t = mask.i((.., t))?.unsqueeze(1)?;

        let next = lstm.step(&x_t, &state)?;
        outputs.push(next.h().broadcast_mul(&m_t)?);

        // Padded rows keep their previous state.
        let h = blend(next.h(), state.h(), &m_t)?;
        let c = blend(next.c(), state.c(), &m_t)?;
        state = LSTMState::new(h, c);
    }

    if reverse {
        outputs.reverse();
    }
    Tensor::stack(&outputs, 1)
}

/// `mask * new + (1 - mask) * old`, with `mask` broadcast over the feature dim.
fn blend(new: &Tensor, old: &Tensor, mask: &Tensor) -> Result<Tensor> {
    let keep = mask.affine(-1.0, 1.0)?;
    new.broadcast_mul(mask)? + old.broadcast_mul(&keep)?
}
