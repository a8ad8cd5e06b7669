use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifies the backing implementation that powers an embedder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Http,
    Hash,
}

/// Static metadata describing a particular embedder instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedderInfo {
    pub provider: ProviderKind,
    pub embedding_model_id: String,
    pub dimension: usize,
    pub text_repr_version: String,
}

/// Errors that can be produced by embedder operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmbedderError {
    #[error("invalid embedder configuration: {message}")]
    InvalidConfiguration { message: String },
    #[error("input text exceeds max length of {max_length} characters, actual length: {actual_length}")]
    InputTooLong {
        max_length: usize,
        actual_length: usize,
    },
    #[error("provider failure: {message}")]
    ProviderFailure { message: String },
}

/// Core interface for all embedder implementations.
///
/// `embed_batch` must return exactly one vector per input text, in order.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError>;
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedderError>;
    fn info(&self) -> &EmbedderInfo;
}

/// Configuration for an embedding model served over HTTP.
#[derive(Debug, Clone)]
pub struct HttpEmbedderConfig {
    pub endpoint: String,
    pub auth_token: Option<String>,
    pub dimension: usize,
    pub max_input_length: usize,
    pub timeout: Duration,
    pub embedding_model_id: String,
    pub text_repr_version: String,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Embedder backed by a remote embedding service.
pub struct HttpEmbedder {
    info: EmbedderInfo,
    client: reqwest::blocking::Client,
    endpoint: String,
    auth_token: Option<String>,
    max_input_length: usize,
}

impl HttpEmbedder {
    pub fn new(config: HttpEmbedderConfig) -> Result<Self, EmbedderError> {
        validate_dimension_and_length(config.dimension, config.max_input_length)?;

        if config.endpoint.trim().is_empty() {
            return Err(EmbedderError::InvalidConfiguration {
                message: "endpoint must not be empty".into(),
            });
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| EmbedderError::ProviderFailure {
                message: format!("build HTTP client failed: {err}"),
            })?;

        let info = EmbedderInfo {
            provider: ProviderKind::Http,
            embedding_model_id: config.embedding_model_id,
            dimension: config.dimension,
            text_repr_version: config.text_repr_version,
        };

        Ok(Self {
            info,
            client,
            endpoint: config.endpoint,
            auth_token: config.auth_token,
            max_input_length: config.max_input_length,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_vectors(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedderError> {
        let mut req = self
            .client
            .post(&self.endpoint)
            .json(&EmbedRequest { inputs: texts });
        if let Some(token) = &self.auth_token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().map_err(|err| EmbedderError::ProviderFailure {
            message: format!("embedding request failed: {err}"),
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(EmbedderError::ProviderFailure {
                message: format!("embedding service returned status {status}"),
            });
        }

        let body: EmbedResponse = resp.json().map_err(|err| EmbedderError::ProviderFailure {
            message: format!("decode embedding response failed: {err}"),
        })?;

        if body.embeddings.len() != texts.len() {
            return Err(EmbedderError::ProviderFailure {
                message: format!(
                    "embedding service returned {} vectors for {} inputs",
                    body.embeddings.len(),
                    texts.len()
                ),
            });
        }

        for v in &body.embeddings {
            if v.len() != self.info.dimension {
                return Err(EmbedderError::ProviderFailure {
                    message: format!(
                        "embedding dimension {} does not match configured dimension {}",
                        v.len(),
                        self.info.dimension
                    ),
                });
            }
        }

        Ok(body.embeddings)
    }

    fn validate_lengths(&self, texts: &[&str]) -> Result<(), EmbedderError> {
        let longest = texts.iter().map(|t| t.chars().count()).max().unwrap_or(0);
        if longest > self.max_input_length {
            return Err(EmbedderError::InputTooLong {
                max_length: self.max_input_length,
                actual_length: longest,
            });
        }
        Ok(())
    }
}

impl Embedder for HttpEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
        let mut vectors = self.embed_batch(&[text])?;
        vectors
            .pop()
            .ok_or_else(|| EmbedderError::ProviderFailure {
                message: "missing embedding output".into(),
            })
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.validate_lengths(texts)?;
        self.request_vectors(texts)
    }

    fn info(&self) -> &EmbedderInfo {
        &self.info
    }
}

/// Configuration for the deterministic hash embedder.
#[derive(Debug, Clone)]
pub struct HashEmbedderConfig {
    pub dimension: usize,
    pub max_input_length: usize,
    pub embedding_model_id: String,
    pub text_repr_version: String,
}

/// Deterministic embedder that derives vectors from seeded hashes.
///
/// Intended for tests and offline runs; identical text always maps to the
/// identical vector, so similarity comparisons stay meaningful.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    info: EmbedderInfo,
    max_input_length: usize,
    base_seed: u64,
}

impl HashEmbedder {
    pub fn new(config: HashEmbedderConfig) -> Result<Self, EmbedderError> {
        validate_dimension_and_length(config.dimension, config.max_input_length)?;

        let base_seed = compute_seed(
            ProviderKind::Hash,
            &config.embedding_model_id,
            &config.text_repr_version,
        );

        let info = EmbedderInfo {
            provider: ProviderKind::Hash,
            embedding_model_id: config.embedding_model_id,
            dimension: config.dimension,
            text_repr_version: config.text_repr_version,
        };

        Ok(Self {
            info,
            max_input_length: config.max_input_length,
            base_seed,
        })
    }

    fn generate_embedding(&self, text: &str) -> Vec<f32> {
        let mut output = Vec::with_capacity(self.info.dimension);
        for index in 0..self.info.dimension {
            let mut hasher = DefaultHasher::new();
            self.base_seed.hash(&mut hasher);
            index.hash(&mut hasher);
            text.hash(&mut hasher);
            output.push(normalize_hash(hasher.finish()));
        }
        output
    }
}

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
        let actual_length = text.chars().count();
        if actual_length > self.max_input_length {
            return Err(EmbedderError::InputTooLong {
                max_length: self.max_input_length,
                actual_length,
            });
        }
        Ok(self.generate_embedding(text))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedderError> {
        texts
            .iter()
            .map(|text| self.embed(text))
            .collect::<Result<Vec<_>, _>>()
    }

    fn info(&self) -> &EmbedderInfo {
        &self.info
    }
}

fn validate_dimension_and_length(
    dimension: usize,
    max_input_length: usize,
) -> Result<(), EmbedderError> {
    if dimension == 0 {
        return Err(EmbedderError::InvalidConfiguration {
            message: "dimension must be greater than zero".into(),
        });
    }
    if max_input_length == 0 {
        return Err(EmbedderError::InvalidConfiguration {
            message: "max_input_length must be greater than zero".into(),
        });
    }
    Ok(())
}

fn compute_seed(provider: ProviderKind, embedding_model_id: &str, text_repr_version: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    provider.hash(&mut hasher);
    embedding_model_id.hash(&mut hasher);
    text_repr_version.hash(&mut hasher);
    hasher.finish()
}

fn normalize_hash(value: u64) -> f32 {
    const SCALE: f64 = 2.0;
    let normalized = (value as f64) / (u64::MAX as f64);
    (normalized * SCALE - 1.0) as f32
}
