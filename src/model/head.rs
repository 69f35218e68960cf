use std::fmt;
use std::str::FromStr;

use candle_core::{D, Module, Tensor};
use candle_nn::{Dropout, Linear, VarBuilder};

use super::error::ModelError;
use super::init::xavier_linear;
use crate::constants::{NUM_LABELS, siamese_width};

/// What [`ClassifierHead::classify`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputMode {
    /// Softmax probabilities `[batch, 2]`.
    Prob,
    /// Raw logits `[batch, 2]`.
    Logits,
    /// Mean cross-entropy against labels (scalar).
    Loss,
    /// Logits, probabilities and loss together.
    Evaluate,
}

impl OutputMode {
    pub fn requires_labels(self) -> bool {
        matches!(self, OutputMode::Loss | OutputMode::Evaluate)
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputMode::Prob => "prob",
            OutputMode::Logits => "logits",
            OutputMode::Loss => "loss",
            OutputMode::Evaluate => "evaluate",
        };
        f.write_str(name)
    }
}

impl FromStr for OutputMode {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prob" => Ok(OutputMode::Prob),
            "logits" => Ok(OutputMode::Logits),
            "loss" => Ok(OutputMode::Loss),
            "evaluate" => Ok(OutputMode::Evaluate),
            other => Err(ModelError::InvalidConfig {
                reason: format!("unknown output mode '{other}'"),
            }),
        }
    }
}

/// Classifier output, shaped by the requested [`OutputMode`].
#[derive(Debug, Clone)]
pub enum ModelOutput {
    Prob(Tensor),
    Logits(Tensor),
    Loss(Tensor),
    Evaluate {
        logits: Tensor,
        prob: Tensor,
        loss: Tensor,
    },
}

impl ModelOutput {
    pub fn mode(&self) -> OutputMode {
        match self {
            ModelOutput::Prob(_) => OutputMode::Prob,
            ModelOutput::Logits(_) => OutputMode::Logits,
            ModelOutput::Loss(_) => OutputMode::Loss,
            ModelOutput::Evaluate { .. } => OutputMode::Evaluate,
        }
    }

    pub fn prob(&self) -> Option<&Tensor> {
        match self {
            ModelOutput::Prob(prob) | ModelOutput::Evaluate { prob, .. } => Some(prob),
            _ => None,
        }
    }

    pub fn logits(&self) -> Option<&Tensor> {
        match self {
            ModelOutput::Logits(logits) | ModelOutput::Evaluate { logits, .. } => Some(logits),
            _ => None,
        }
    }

    pub fn loss(&self) -> Option<&Tensor> {
        match self {
            ModelOutput::Loss(loss) | ModelOutput::Evaluate { loss, .. } => Some(loss),
            _ => None,
        }
    }
}

/// `v_ab - v_ac` → dropout → linear(4h→h) → tanh → dropout → linear(h→2).
#[derive(Debug, Clone)]
pub struct ClassifierHead {
    dropout: Dropout,
    hidden: Linear,
    output: Linear,
}

impl ClassifierHead {
    pub fn new(hidden_size: usize, dropout_prob: f32, vb: VarBuilder) -> candle_core::Result<Self> {
        Ok(Self {
            dropout: Dropout::new(dropout_prob),
            hidden: xavier_linear(siamese_width(hidden_size), hidden_size, vb.pp("hidden"))?,
            output: xavier_linear(hidden_size, NUM_LABELS, vb.pp("output"))?,
        })
    }

    /// Two-way logits for the difference of two siamese vectors.
    pub fn logits(&self, v_ab: &Tensor, v_ac: &Tensor, train: bool) -> candle_core::Result<Tensor> {
        let diff = (v_ab - v_ac)?;
        let xs = self.dropout.forward(&diff, train)?;
        let xs = self.hidden.forward(&xs)?.tanh()?;
        let xs = self.dropout.forward(&xs, train)?;
        self.output.forward(&xs)
    }

    /// Runs the head and shapes the result per `mode`.
    ///
    /// `labels` is a `[batch]` `u32` tensor of class indices; required for
    /// [`OutputMode::Loss`] and [`OutputMode::Evaluate`].
    pub fn classify(
        &self,
        v_ab: &Tensor,
        v_ac: &Tensor,
        mode: OutputMode,
        labels: Option<&Tensor>,
        train: bool,
    ) -> Result<ModelOutput, ModelError> {
        let required_labels = || labels.ok_or(ModelError::MissingLabels { mode });
        if mode.requires_labels() {
            required_labels()?;
        }

        let logits = self.logits(v_ab, v_ac, train)?;

        let output = match mode {
            OutputMode::Prob => ModelOutput::Prob(probabilities(&logits)?),
            OutputMode::Logits => ModelOutput::Logits(logits),
            OutputMode::Loss => ModelOutput::Loss(cross_entropy(&logits, required_labels()?)?),
            OutputMode::Evaluate => ModelOutput::Evaluate {
                prob: probabilities(&logits)?,
                loss: cross_entropy(&logits, required_labels()?)?,
                logits,
            },
        };

        Ok(output)
    }
}

/// Row-wise softmax over the two classes.
pub fn probabilities(logits: &Tensor) -> candle_core::Result<Tensor> {
    candle_nn::ops::softmax(logits, D::Minus1)
}

fn cross_entropy(logits: &Tensor, labels: &Tensor) -> candle_core::Result<Tensor> {
    let labels = labels.flatten_all()?;
    candle_nn::loss::cross_entropy(&logits.reshape(((), NUM_LABELS))?, &labels)
}
