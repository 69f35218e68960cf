//! Triplet text similarity classifier.
//!
//! Given an anchor text A and two candidates B and C, decide which candidate is closer
//! to A. The pipeline:
//!
//! 1. [`features`] turns each text into fixed-length `[CLS] … [SEP]` token features.
//! 2. [`dataset`] holds labelled triplets and derives label-balanced augmentations.
//! 3. [`batch`] collates triplets into `[batch, max_length]` tensors.
//! 4. [`model`] embeds each side, runs an ESIM-style siamese encoder over (A, B) and
//!    (A, C), and classifies `v_ab - v_ac` into B/C.
//! 5. [`predict`] wraps all of the above for batched inference and evaluation.
//!
//! ## Test/Mock Support
//! `WhitespaceTokenizer` and `TripletClassifier::random` are available behind
//! `#[cfg(any(test, feature = "mock"))]`.

pub mod batch;
pub mod config;
pub mod constants;
pub mod dataset;
pub mod features;
pub mod model;
pub mod predict;
pub mod tokenizer;

pub use batch::{BatchError, TripletBatch, TripletCollator};
pub use config::{ComputeTarget, ConfigError, ModelConfig};
pub use dataset::{DatasetError, Label, TripletDataset, TripletExample, TripletRecord};
pub use features::{FeatureTensors, TokenFeature, TripletFeatures, build_feature, to_three_features};
pub use model::{
    ModelError, ModelOutput, OutputMode, SiameseEncoder, TripletClassifier, select_device,
};
pub use predict::{EvaluationSummary, Prediction, PredictError, TripletPredictor};
#[cfg(any(test, feature = "mock"))]
pub use tokenizer::WhitespaceTokenizer;
pub use tokenizer::{HfTokenizer, Tokenize, TokenizerError};
