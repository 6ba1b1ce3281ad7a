use std::path::{Path, PathBuf};

use super::device::DevicePreference;
use super::error::EmbeddingError;

/// Default max tokens per input (sentence-transformers MiniLM models are trained at 256).
pub const DEFAULT_MAX_SEQ_LEN: usize = 256;

const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const WEIGHTS_FILE: &str = "model.safetensors";

#[derive(Debug, Clone)]
/// Configuration for [`BertEmbedder`](super::BertEmbedder).
pub struct BertEmbedderConfig {
    /// Directory holding `config.json`, `tokenizer.json` and `model.safetensors`.
    pub model_dir: PathBuf,
    /// Tokens kept per input; longer inputs are truncated.
    pub max_seq_len: usize,
    /// Which compute device to use.
    pub device: DevicePreference,
}

impl BertEmbedderConfig {
    /// Creates a config for a model directory with default limits.
    pub fn new<P: Into<PathBuf>>(model_dir: P) -> Self {
        Self {
            model_dir: model_dir.into(),
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
            device: DevicePreference::default(),
        }
    }

    /// Sets the max sequence length.
    pub fn with_max_seq_len(mut self, max_seq_len: usize) -> Self {
        self.max_seq_len = max_seq_len;
        self
    }

    /// Sets the device preference.
    pub fn with_device(mut self, device: DevicePreference) -> Self {
        self.device = device;
        self
    }

    pub fn config_path(&self) -> PathBuf {
        self.model_dir.join(CONFIG_FILE)
    }

    pub fn tokenizer_path(&self) -> PathBuf {
        self.model_dir.join(TOKENIZER_FILE)
    }

    pub fn weights_path(&self) -> PathBuf {
        self.model_dir.join(WEIGHTS_FILE)
    }

    /// Model identifier: the model directory's final component.
    pub fn model_name(&self) -> &str {
        self.model_dir
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("bert")
    }

    /// Checks that the model directory and its three files exist.
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.model_dir.as_os_str().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model_dir is required".to_string(),
            });
        }
        if self.max_seq_len == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "max_seq_len must be non-zero".to_string(),
            });
        }
        if !self.model_dir.is_dir() {
            return Err(EmbeddingError::ModelNotFound {
                path: self.model_dir.clone(),
            });
        }

        for path in [
            self.config_path(),
            self.tokenizer_path(),
            self.weights_path(),
        ] {
            require_file(&path)?;
        }

        Ok(())
    }
}

fn require_file(path: &Path) -> Result<(), EmbeddingError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(EmbeddingError::ModelLoadFailed {
            reason: format!("missing model file: {}", path.display()),
        })
    }
}
