use candle_core::Device;

use super::builder::{FeatureTensors, TokenFeature, build_feature};
use crate::dataset::TripletExample;
use crate::tokenizer::{Tokenize, TokenizerError};

/// The three single-sequence features of one triplet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripletFeatures {
    pub a: TokenFeature,
    pub b: TokenFeature,
    pub c: TokenFeature,
}

impl TripletFeatures {
    pub fn to_tensors(
        &self,
        device: &Device,
    ) -> candle_core::Result<(FeatureTensors, FeatureTensors, FeatureTensors)> {
        Ok((
            self.a.to_tensors(device)?,
            self.b.to_tensors(device)?,
            self.c.to_tensors(device)?,
        ))
    }
}

/// Encodes A, B and C independently, each padded/truncated to `max_length` on its own.
pub fn to_three_features(
    example: &TripletExample,
    tokenizer: &dyn Tokenize,
    max_length: usize,
) -> Result<TripletFeatures, TokenizerError> {
    Ok(TripletFeatures {
        a: build_feature(tokenizer, &example.text_a, None, max_length)?,
        b: build_feature(tokenizer, &example.text_b, None, max_length)?,
        c: build_feature(tokenizer, &example.text_c, None, max_length)?,
    })
}
