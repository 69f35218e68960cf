use std::path::Path;
use std::sync::Arc;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::Config as BertConfig;
use tracing::{debug, info};

use super::embedding::{TokenEmbedding, WordEmbeddings};
use super::error::ModelError;
use super::head::{ClassifierHead, ModelOutput, OutputMode};
use super::siamese::SiameseEncoder;
use crate::batch::TripletBatch;
use crate::config::ModelConfig;
use crate::features::FeatureTensors;

/// Full triplet model: word embeddings → siamese encoder (A/B, A/C) → classifier head.
///
/// Checkpoint layout: the backbone word-embedding table, `esim.*` for the
/// [`SiameseEncoder`], and `classifier.*` for the [`ClassifierHead`].
#[derive(Clone)]
pub struct TripletClassifier {
    embeddings: Arc<dyn TokenEmbedding>,
    siamese: SiameseEncoder,
    head: ClassifierHead,
    device: Device,
}

impl std::fmt::Debug for TripletClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TripletClassifier")
            .field("embedding_dim", &self.embeddings.embedding_dim())
            .field("hidden_size", &self.siamese.hidden_size())
            .field("device", &self.device)
            .finish()
    }
}

impl TripletClassifier {
    /// Builds the ESIM layers under `vb` on top of an embedding capability.
    pub fn new(
        embeddings: Arc<dyn TokenEmbedding>,
        config: &ModelConfig,
        vb: VarBuilder,
    ) -> Result<Self, ModelError> {
        if config.hidden_size == 0 || !config.hidden_size.is_multiple_of(2) {
            return Err(ModelError::InvalidConfig {
                reason: format!(
                    "hidden_size must be a non-zero even number, got {}",
                    config.hidden_size
                ),
            });
        }

        let device = vb.device().clone();
        let siamese = SiameseEncoder::new(
            embeddings.embedding_dim(),
            config.hidden_size,
            vb.pp("esim"),
        )?;
        let head = ClassifierHead::new(config.hidden_size, config.dropout_prob, vb.pp("classifier"))?;

        Ok(Self {
            embeddings,
            siamese,
            head,
            device,
        })
    }

    /// Loads `config.json` + `model.safetensors` from `model_dir`.
    pub fn load<P: AsRef<Path>>(
        model_dir: P,
        config: &ModelConfig,
        device: &Device,
    ) -> Result<Self, ModelError> {
        let model_dir = model_dir.as_ref();
        if !model_dir.exists() {
            return Err(ModelError::ModelNotFound {
                path: model_dir.to_path_buf(),
            });
        }

        let config_path = model_dir.join("config.json");
        if !config_path.exists() {
            return Err(ModelError::ModelLoadFailed {
                reason: format!("Missing config.json in {}", model_dir.display()),
            });
        }

        let weights_path = model_dir.join("model.safetensors");
        if !weights_path.exists() {
            return Err(ModelError::ModelLoadFailed {
                reason: format!("Missing model.safetensors in {}", model_dir.display()),
            });
        }

        let config_content = std::fs::read_to_string(&config_path)?;
        let backbone: BertConfig =
            serde_json::from_str(&config_content).map_err(|e| ModelError::ModelLoadFailed {
                reason: format!("Failed to parse config: {}", e),
            })?;

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[&weights_path], DType::F32, device)
                .map_err(|e| ModelError::ModelLoadFailed {
                    reason: format!("Failed to map weights: {}", e),
                })?
        };

        let embeddings = WordEmbeddings::from_backbone(vb.clone(), &backbone).map_err(|e| {
            ModelError::ModelLoadFailed {
                reason: format!("Failed to load word embeddings: {}", e),
            }
        })?;

        let model = Self::new(Arc::new(embeddings), config, vb).map_err(|e| {
            ModelError::ModelLoadFailed {
                reason: format!("Failed to load ESIM layers: {}", e),
            }
        })?;

        info!(
            model_dir = %model_dir.display(),
            vocab_size = backbone.vocab_size,
            embedding_dim = backbone.hidden_size,
            hidden_size = config.hidden_size,
            "Triplet classifier loaded"
        );

        Ok(model)
    }

    /// Randomly initialised model over a fresh embedding table (no files required).
    #[cfg(any(test, feature = "mock"))]
    pub fn random(
        vocab_size: usize,
        embedding_dim: usize,
        config: &ModelConfig,
        device: &Device,
    ) -> Result<Self, ModelError> {
        let varmap = candle_nn::VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
        let embeddings = WordEmbeddings::new(vocab_size, embedding_dim, vb.pp("embeddings"))?;
        Self::new(Arc::new(embeddings), config, vb)
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn hidden_size(&self) -> usize {
        self.siamese.hidden_size()
    }

    pub fn siamese_encoder(&self) -> &SiameseEncoder {
        &self.siamese
    }

    pub fn head(&self) -> &ClassifierHead {
        &self.head
    }

    /// Embeds one side; returns `(embeddings, f32 mask)`.
    fn embed(&self, features: &FeatureTensors) -> Result<(Tensor, Tensor), ModelError> {
        let embedded = self.embeddings.embed(&features.input_ids)?;
        let mask = features.input_mask.to_dtype(DType::F32)?;
        Ok((embedded, mask))
    }

    /// Scores a batch of triplets.
    ///
    /// `train` enables dropout in the classifier head.
    pub fn forward(
        &self,
        a: &FeatureTensors,
        b: &FeatureTensors,
        c: &FeatureTensors,
        labels: Option<&Tensor>,
        mode: OutputMode,
        train: bool,
    ) -> Result<ModelOutput, ModelError> {
        if mode.requires_labels() && labels.is_none() {
            return Err(ModelError::MissingLabels { mode });
        }

        let (emb_a, mask_a) = self.embed(a)?;
        let (emb_b, mask_b) = self.embed(b)?;
        let (emb_c, mask_c) = self.embed(c)?;

        let v_ab = self.siamese.encode_pair(&emb_a, &emb_b, &mask_a, &mask_b)?;
        let v_ac = self.siamese.encode_pair(&emb_a, &emb_c, &mask_a, &mask_c)?;

        debug!(
            batch_size = v_ab.dims().first().copied().unwrap_or(0),
            %mode,
            train,
            "Triplet forward pass"
        );

        self.head.classify(&v_ab, &v_ac, mode, labels, train)
    }

    /// Inference-mode forward over a collated batch, using its labels.
    pub fn forward_batch(
        &self,
        batch: &TripletBatch,
        mode: OutputMode,
    ) -> Result<ModelOutput, ModelError> {
        self.forward(&batch.a, &batch.b, &batch.c, Some(&batch.labels), mode, false)
    }
}
