//! Mini-batch collation: triplets → stacked `[batch, max_length]` tensors.

pub mod error;


pub use error::BatchError;

use std::sync::Arc;

use candle_core::{Device, Tensor};
use tracing::debug;

use crate::dataset::TripletExample;
use crate::features::{FeatureTensors, TokenFeature, to_three_features};
use crate::tokenizer::Tokenize;

/// Model-ready tensors for a batch of triplets.
#[derive(Debug, Clone)]
pub struct TripletBatch {
    pub a: FeatureTensors,
    pub b: FeatureTensors,
    pub c: FeatureTensors,
    /// `[batch]` class indices (`u32`), `B → 0`, `C → 1`.
    pub labels: Tensor,
}

impl TripletBatch {
    pub fn batch_size(&self) -> usize {
        self.labels.dims().first().copied().unwrap_or(0)
    }
}

/// Turns slices of [`TripletExample`]s into [`TripletBatch`]es on a fixed device.
///
/// Stateless between calls; every batch is encoded from scratch.
#[derive(Clone)]
pub struct TripletCollator {
    tokenizer: Arc<dyn Tokenize>,
    max_length: usize,
    device: Device,
}

impl std::fmt::Debug for TripletCollator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TripletCollator")
            .field("max_length", &self.max_length)
            .field("device", &self.device)
            .finish()
    }
}

impl TripletCollator {
    pub fn new(tokenizer: Arc<dyn Tokenize>, max_length: usize, device: Device) -> Self {
        Self {
            tokenizer,
            max_length,
            device,
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn collate(&self, batch: &[TripletExample]) -> Result<TripletBatch, BatchError> {
        if batch.is_empty() {
            return Err(BatchError::EmptyBatch);
        }

        let mut a = FeatureColumns::with_capacity(batch.len(), self.max_length);
        let mut b = FeatureColumns::with_capacity(batch.len(), self.max_length);
        let mut c = FeatureColumns::with_capacity(batch.len(), self.max_length);
        let mut labels = Vec::with_capacity(batch.len());

        for example in batch {
            let features = to_three_features(example, self.tokenizer.as_ref(), self.max_length)?;
            a.push(&features.a);
            b.push(&features.b);
            c.push(&features.c);
            labels.push(example.label.index());
        }

        debug!(
            batch_size = batch.len(),
            max_length = self.max_length,
            device = ?self.device,
            "Collated triplet batch"
        );

        Ok(TripletBatch {
            a: a.into_tensors(self.max_length, &self.device)?,
            b: b.into_tensors(self.max_length, &self.device)?,
            c: c.into_tensors(self.max_length, &self.device)?,
            labels: Tensor::from_vec(labels, batch.len(), &self.device)?,
        })
    }
}

/// Row-major buffers for one side of the triplet.
struct FeatureColumns {
    rows: usize,
    input_ids: Vec<u32>,
    segment_ids: Vec<u32>,
    input_mask: Vec<u32>,
}

impl FeatureColumns {
    fn with_capacity(rows: usize, max_length: usize) -> Self {
        Self {
            rows: 0,
            input_ids: Vec::with_capacity(rows * max_length),
            segment_ids: Vec::with_capacity(rows * max_length),
            input_mask: Vec::with_capacity(rows * max_length),
        }
    }

    fn push(&mut self, feature: &TokenFeature) {
        self.rows += 1;
        self.input_ids.extend_from_slice(&feature.input_ids);
        self.segment_ids.extend_from_slice(&feature.segment_ids);
        self.input_mask.extend_from_slice(&feature.input_mask);
    }

    fn into_tensors(self, max_length: usize, device: &Device) -> candle_core::Result<FeatureTensors> {
        let shape = (self.rows, max_length);
        Ok(FeatureTensors {
            input_ids: Tensor::from_vec(self.input_ids, shape, device)?,
            segment_ids: Tensor::from_vec(self.segment_ids, shape, device)?,
            input_mask: Tensor::from_vec(self.input_mask, shape, device)?,
        })
    }
}
