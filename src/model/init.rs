use candle_core::Result;
use candle_nn::init::Init;
use candle_nn::{Linear, VarBuilder};

/// Xavier-uniform bound for a `fan_in × fan_out` matrix.
pub(crate) fn xavier_bound(fan_in: usize, fan_out: usize) -> f64 {
    (6.0 / (fan_in + fan_out) as f64).sqrt()
}

/// Linear layer with Xavier-uniform weights and zero bias when freshly initialised.
///
/// Checkpoint-backed builders ignore the hints and read `weight`/`bias` as stored.
pub(crate) fn xavier_linear(in_dim: usize, out_dim: usize, vb: VarBuilder) -> Result<Linear> {
    let bound = xavier_bound(in_dim, out_dim);
    let weight = vb.get_with_hints(
        (out_dim, in_dim),
        "weight",
        Init::Uniform {
            lo: -bound,
            up: bound,
        },
    )?;
    let bias = vb.get_with_hints(out_dim, "bias", Init::Const(0.0))?;
    Ok(Linear::new(weight, Some(bias)))
}
