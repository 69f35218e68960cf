use candle_core::{Result, Tensor};
use candle_nn::{Embedding, Module, VarBuilder};
use candle_transformers::models::bert::Config as BertConfig;

/// Maps token ids to dense vectors.
pub trait TokenEmbedding: Send + Sync {
    /// `[batch, seq_len]` ids → `[batch, seq_len, embedding_dim]`.
    fn embed(&self, input_ids: &Tensor) -> Result<Tensor>;

    fn embedding_dim(&self) -> usize;
}

/// Where BERT-family checkpoints keep the word-embedding table.
const WORD_EMBEDDING_PREFIXES: [&str; 3] = [
    "bert.embeddings.word_embeddings",
    "roberta.embeddings.word_embeddings",
    "embeddings.word_embeddings",
];

/// The backbone's input word-embedding table; no transformer layers run.
#[derive(Debug, Clone)]
pub struct WordEmbeddings {
    table: Embedding,
    dim: usize,
}

impl WordEmbeddings {
    /// Reads (or initialises) `weight` of shape `[vocab_size, dim]` under `vb`.
    pub fn new(vocab_size: usize, dim: usize, vb: VarBuilder) -> Result<Self> {
        let table = candle_nn::embedding(vocab_size, dim, vb)?;
        Ok(Self { table, dim })
    }

    /// Finds the word-embedding table of a BERT/RoBERTa checkpoint.
    pub fn from_backbone(vb: VarBuilder, config: &BertConfig) -> Result<Self> {
        let prefix = WORD_EMBEDDING_PREFIXES
            .iter()
            .find(|prefix| vb.contains_tensor(&format!("{prefix}.weight")))
            .ok_or_else(|| {
                candle_core::Error::Msg(format!(
                    "no word embedding table found (tried {})",
                    WORD_EMBEDDING_PREFIXES.join(", ")
                ))
            })?;

        Self::new(config.vocab_size, config.hidden_size, vb.pp(*prefix))
    }
}

impl TokenEmbedding for WordEmbeddings {
    fn embed(&self, input_ids: &Tensor) -> Result<Tensor> {
        self.table.forward(input_ids)
    }

    fn embedding_dim(&self) -> usize {
        self.dim
    }
}
