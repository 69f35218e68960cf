use std::sync::Arc;

use candle_core::Tensor;
use tracing::{debug, info};

use crate::batch::TripletCollator;
use crate::config::ModelConfig;
use crate::dataset::{Label, TripletDataset, TripletExample};
use crate::model::{OutputMode, TripletClassifier, select_device};
use crate::tokenizer::{HfTokenizer, Tokenize};

use super::error::PredictError;
use super::types::{EvaluationSummary, Prediction};

/// Tokenizer + collator + classifier, run in inference mode.
pub struct TripletPredictor {
    collator: TripletCollator,
    classifier: TripletClassifier,
    batch_size: usize,
}

impl std::fmt::Debug for TripletPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TripletPredictor")
            .field("collator", &self.collator)
            .field("classifier", &self.classifier)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl TripletPredictor {
    /// Collates on the classifier's device using `config.max_length` and `config.batch_size`.
    pub fn new(
        tokenizer: Arc<dyn Tokenize>,
        classifier: TripletClassifier,
        config: &ModelConfig,
    ) -> Self {
        let collator = TripletCollator::new(
            tokenizer,
            config.max_length,
            classifier.device().clone(),
        );
        Self {
            collator,
            classifier,
            batch_size: config.batch_size.max(1),
        }
    }

    /// Validates `config`, picks the device, then loads the tokenizer and checkpoint.
    pub fn load(config: &ModelConfig) -> Result<Self, PredictError> {
        config.validate()?;

        let model_path = config
            .model_path
            .as_ref()
            .ok_or(PredictError::MissingModelPath)?;
        let tokenizer_path = config
            .resolved_tokenizer_path()
            .ok_or(PredictError::MissingModelPath)?;

        let device = select_device(config.compute_target)?;
        let tokenizer = HfTokenizer::from_path(&tokenizer_path)?;
        let classifier = TripletClassifier::load(model_path, config, &device)?;

        info!(
            model_path = %model_path.display(),
            tokenizer_path = %tokenizer_path.display(),
            max_length = config.max_length,
            batch_size = config.batch_size,
            "Triplet predictor ready"
        );

        Ok(Self::new(Arc::new(tokenizer), classifier, config))
    }

    pub fn classifier(&self) -> &TripletClassifier {
        &self.classifier
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Is `text_b` or `text_c` closer to `text_a`?
    pub fn predict(
        &self,
        text_a: &str,
        text_b: &str,
        text_c: &str,
    ) -> Result<Prediction, PredictError> {
        let example = TripletExample::new(text_a, text_b, text_c, Label::B);
        let mut predictions = self.predict_examples(std::slice::from_ref(&example))?;
        predictions.pop().ok_or_else(|| PredictError::InvalidOutput {
            reason: "no prediction returned for a single triplet".to_string(),
        })
    }

    /// One [`Prediction`] per example, in order. Labels are ignored.
    pub fn predict_examples(
        &self,
        examples: &[TripletExample],
    ) -> Result<Vec<Prediction>, PredictError> {
        let mut predictions = Vec::with_capacity(examples.len());

        for chunk in examples.chunks(self.batch_size) {
            let batch = self.collator.collate(chunk)?;
            let output = self.classifier.forward_batch(&batch, OutputMode::Prob)?;
            predictions.extend(rows_to_predictions(required(output.prob(), "prob")?)?);
        }

        debug!(examples = examples.len(), "Predicted triplets");
        Ok(predictions)
    }

    pub fn predict_dataset(&self, dataset: &TripletDataset) -> Result<Vec<Prediction>, PredictError> {
        self.predict_examples(dataset.examples())
    }

    /// Example-weighted mean loss and accuracy against the dataset labels.
    pub fn evaluate(&self, dataset: &TripletDataset) -> Result<EvaluationSummary, PredictError> {
        self.predict_and_evaluate(dataset).map(|(_, summary)| summary)
    }

    /// Per-example predictions plus the [`EvaluationSummary`], from a single
    /// [`OutputMode::Evaluate`] pass over the dataset.
    pub fn predict_and_evaluate(
        &self,
        dataset: &TripletDataset,
    ) -> Result<(Vec<Prediction>, EvaluationSummary), PredictError> {
        if dataset.is_empty() {
            return Err(PredictError::EmptyDataset);
        }

        let mut predictions = Vec::with_capacity(dataset.len());
        let mut total_loss = 0.0f64;
        let mut correct = 0usize;

        for chunk in dataset.batches(self.batch_size) {
            let batch = self.collator.collate(chunk)?;
            let output = self.classifier.forward_batch(&batch, OutputMode::Evaluate)?;

            let batch_loss = required(output.loss(), "loss")?.to_scalar::<f32>()?;
            total_loss += f64::from(batch_loss) * chunk.len() as f64;

            let batch_predictions = rows_to_predictions(required(output.prob(), "prob")?)?;
            correct += batch_predictions
                .iter()
                .zip(chunk)
                .filter(|(prediction, example)| prediction.is_correct(example.label))
                .count();
            predictions.extend(batch_predictions);

            debug!(batch_size = chunk.len(), batch_loss, "Evaluated batch");
        }

        let examples = dataset.len();
        let summary = EvaluationSummary {
            examples,
            mean_loss: (total_loss / examples as f64) as f32,
            accuracy: correct as f32 / examples as f32,
        };

        info!(
            examples = summary.examples,
            mean_loss = summary.mean_loss,
            accuracy = summary.accuracy,
            "Evaluation complete"
        );

        Ok((predictions, summary))
    }
}

fn required<'a>(tensor: Option<&'a Tensor>, name: &str) -> Result<&'a Tensor, PredictError> {
    tensor.ok_or_else(|| PredictError::InvalidOutput {
        reason: format!("model output has no {name}"),
    })
}

/// `[batch, 2]` probabilities → predictions.
fn rows_to_predictions(prob: &Tensor) -> Result<Vec<Prediction>, PredictError> {
    prob.to_vec2::<f32>()?
        .into_iter()
        .map(|row| match row.as_slice() {
            [prob_b, prob_c] => Ok(Prediction::new(*prob_b, *prob_c)),
            other => Err(PredictError::InvalidOutput {
                reason: format!("expected 2 class probabilities, got {}", other.len()),
            }),
        })
        .collect()
}

