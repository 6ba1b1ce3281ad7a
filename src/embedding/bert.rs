//! Sentence-transformer embeddings on a candle BERT encoder.
//!
//! Token states are mean-pooled over the attention mask and L2-normalized, which is how
//! `sentence-transformers` MiniLM/MPNet checkpoints are meant to be used.

use std::sync::Arc;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config, DTYPE};
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};
use tracing::{debug, info};

use super::config::BertEmbedderConfig;
use super::device::select_device;
use super::error::EmbeddingError;
use super::{Embedder, EmbedderFactory, Embedding, l2_normalize};

pub struct BertEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    embedding_dim: usize,
    model_name: String,
}

impl std::fmt::Debug for BertEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BertEmbedder")
            .field("model_name", &self.model_name)
            .field("device", &format!("{:?}", self.device))
            .field("embedding_dim", &self.embedding_dim)
            .finish()
    }
}

impl BertEmbedder {
    /// Loads weights, config and tokenizer from `config.model_dir`.
    pub fn load(config: &BertEmbedderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        let device = select_device(config.device)?;
        debug!(?device, "Selected compute device for embeddings");

        let raw_config = std::fs::read_to_string(config.config_path())?;
        let bert_config: Config =
            serde_json::from_str(&raw_config).map_err(|e| EmbeddingError::InvalidConfig {
                reason: format!("Failed to parse config.json: {e}"),
            })?;

        // SAFETY: the weights file is opened read-only and not modified while mapped.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[config.weights_path()], DTYPE, &device)
        }
        .map_err(|e| EmbeddingError::ModelLoadFailed {
            reason: format!("Failed to map weights: {e}"),
        })?;

        let model = if vb.contains_tensor("bert.embeddings.word_embeddings.weight") {
            BertModel::load(vb.pp("bert"), &bert_config)
        } else {
            BertModel::load(vb, &bert_config)
        }
        .map_err(|e| EmbeddingError::ModelLoadFailed {
            reason: format!("Failed to load BERT model: {e}"),
        })?;

        let tokenizer = load_tokenizer(config)?;

        info!(
            model_dir = %config.model_dir.display(),
            hidden_size = bert_config.hidden_size,
            max_seq_len = config.max_seq_len,
            "Embedding model loaded"
        );

        Ok(Self {
            model,
            tokenizer,
            device,
            embedding_dim: bert_config.hidden_size,
            model_name: config.model_name().to_string(),
        })
    }

    fn forward_pooled(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        let inputs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let encodings = self.tokenizer.encode_batch(inputs, true).map_err(|e| {
            EmbeddingError::TokenizationFailed {
                reason: e.to_string(),
            }
        })?;

        let mut ids = Vec::with_capacity(encodings.len());
        let mut masks = Vec::with_capacity(encodings.len());
        for encoding in &encodings {
            ids.push(Tensor::new(encoding.get_ids(), &self.device)?);
            masks.push(Tensor::new(encoding.get_attention_mask(), &self.device)?);
        }

        // [batch, seq_len]; padding makes every row the same length.
        let input_ids = Tensor::stack(&ids, 0)?;
        let attention_mask = Tensor::stack(&masks, 0)?;
        let token_type_ids = input_ids.zeros_like()?;

        // [batch, seq_len, hidden]
        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        let mask = attention_mask.to_dtype(DType::F32)?.unsqueeze(2)?;
        let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
        let counts = mask.sum(1)?;
        let pooled = summed.broadcast_div(&counts)?;

        let mut vectors = pooled.to_vec2::<f32>()?;
        for vector in &mut vectors {
            l2_normalize(vector);
        }
        Ok(vectors)
    }
}

impl Embedder for BertEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!(batch = texts.len(), "Running embedding forward pass");
        self.forward_pooled(texts)
    }

    fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

impl EmbedderFactory for BertEmbedderConfig {
    fn load(&self) -> Result<Arc<dyn Embedder>, EmbeddingError> {
        Ok(Arc::new(BertEmbedder::load(self)?))
    }

    fn model_name(&self) -> &str {
        BertEmbedderConfig::model_name(self)
    }
}

fn load_tokenizer(config: &BertEmbedderConfig) -> Result<Tokenizer, EmbeddingError> {
    let mut tokenizer = Tokenizer::from_file(config.tokenizer_path()).map_err(|e| {
        EmbeddingError::TokenizationFailed {
            reason: format!("Failed to load tokenizer: {e}"),
        }
    })?;

    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: config.max_seq_len,
            ..Default::default()
        }))
        .map_err(|e| EmbeddingError::TokenizationFailed {
            reason: format!("Failed to configure truncation: {e}"),
        })?;

    tokenizer.with_padding(Some(PaddingParams {
        strategy: PaddingStrategy::BatchLongest,
        ..Default::default()
    }));

    Ok(tokenizer)
}
