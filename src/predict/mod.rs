//! Batched inference and evaluation over triplets.
//!
//! [`TripletPredictor`] owns a [`TripletCollator`](crate::batch::TripletCollator) and a
//! [`TripletClassifier`](crate::model::TripletClassifier) and always runs with dropout off.

pub mod error;
pub mod predictor;
pub mod types;


pub use error::PredictError;
pub use predictor::TripletPredictor;
pub use types::{EvaluationSummary, Prediction};
