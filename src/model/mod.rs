//! ESIM-style triplet model.
//!
//! - [`encoder`] provides the length-aware BiLSTM used for encoding and composition.
//! - [`siamese`] compares two embedded sequences into a single `4h` vector.
//! - [`head`] turns `v_ab - v_ac` into B/C logits, probabilities or a loss.
//! - [`classifier`] wires embeddings, the siamese encoder and the head together.

/// Soft alignment and masked softmax.
pub mod attention;
/// Full triplet classifier.
pub mod classifier;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
/// Token embedding capability and the backbone word-embedding table.
pub mod embedding;
/// Masked bidirectional LSTM.
pub mod encoder;
mod error;
/// Classifier head and output modes.
pub mod head;
mod init;
/// Masked mean / max pooling.
pub mod pooling;
/// Siamese pair encoder.
pub mod siamese;

#[cfg(test)]
mod tests;

pub use attention::{masked_softmax, soft_align};
pub use classifier::TripletClassifier;
pub use device::select_device;
pub use embedding::{TokenEmbedding, WordEmbeddings};
pub use encoder::MaskedBiLstm;
pub use error::ModelError;
pub use head::{ClassifierHead, ModelOutput, OutputMode, probabilities};
pub use pooling::{masked_max, masked_mean, replace_masked};
pub use siamese::SiameseEncoder;
