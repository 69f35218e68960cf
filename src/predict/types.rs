use serde::Serialize;

use crate::dataset::Label;

/// Class probabilities for one triplet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    /// Probability that B is closer to A.
    pub prob_b: f32,
    /// Probability that C is closer to A.
    pub prob_c: f32,
    /// The more probable side; ties go to B.
    pub choice: Label,
}

impl Prediction {
    pub fn new(prob_b: f32, prob_c: f32) -> Self {
        let choice = if prob_c > prob_b { Label::C } else { Label::B };
        Self {
            prob_b,
            prob_c,
            choice,
        }
    }

    /// Probability assigned to `label`.
    pub fn prob(&self, label: Label) -> f32 {
        match label {
            Label::B => self.prob_b,
            Label::C => self.prob_c,
        }
    }

    pub fn is_correct(&self, label: Label) -> bool {
        self.choice == label
    }
}

impl std::fmt::Display for Prediction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (B: {:.4}, C: {:.4})",
            self.choice, self.prob_b, self.prob_c
        )
    }
}

/// Aggregate metrics over a labelled dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluationSummary {
    pub examples: usize,
    /// Cross-entropy averaged over examples (not over batches).
    pub mean_loss: f32,
    /// Fraction of examples whose `choice` matches the label.
    pub accuracy: f32,
}

impl std::fmt::Display for EvaluationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} examples, mean_loss: {:.4}, accuracy: {:.4}",
            self.examples, self.mean_loss, self.accuracy
        )
    }
}
