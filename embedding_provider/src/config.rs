use std::time::Duration;

use crate::embedder::{HashEmbedderConfig, HttpEmbedderConfig};

/// Default settings shared by the service, demos and tests.
#[derive(Debug, Clone, Copy)]
pub struct EmbedderDefaults {
    pub embedding_dimension: usize,
    pub max_input_chars: usize,
    pub request_timeout_secs: u64,
    pub embedding_model_id: &'static str,
    pub text_repr_version: &'static str,
}

pub const EMBEDDER_DEFAULTS: EmbedderDefaults = EmbedderDefaults {
    embedding_dimension: 768,
    max_input_chars: 8192,
    request_timeout_secs: 30,
    embedding_model_id: "intent-embed",
    text_repr_version: "v1",
};

/// Environment variable naming the embedding service endpoint.
pub const ENV_EMBEDDING_ENDPOINT: &str = "EMBEDDING_ENDPOINT";
/// Environment variable carrying an optional bearer token.
pub const ENV_EMBEDDING_AUTH_TOKEN: &str = "EMBEDDING_AUTH_TOKEN";
/// Environment variable overriding the embedding dimension.
pub const ENV_EMBEDDING_DIMENSION: &str = "EMBEDDING_DIMENSION";

/// Build an [`HttpEmbedderConfig`] from the process environment.
///
/// Returns `None` when no endpoint is configured, so callers can fall back
/// to the deterministic provider.
pub fn http_config_from_env() -> Option<HttpEmbedderConfig> {
    let endpoint = std::env::var(ENV_EMBEDDING_ENDPOINT).ok()?;
    if endpoint.trim().is_empty() {
        return None;
    }

    let dimension = std::env::var(ENV_EMBEDDING_DIMENSION)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(EMBEDDER_DEFAULTS.embedding_dimension);

    Some(HttpEmbedderConfig {
        endpoint,
        auth_token: std::env::var(ENV_EMBEDDING_AUTH_TOKEN).ok(),
        dimension,
        max_input_length: EMBEDDER_DEFAULTS.max_input_chars,
        timeout: Duration::from_secs(EMBEDDER_DEFAULTS.request_timeout_secs),
        embedding_model_id: EMBEDDER_DEFAULTS.embedding_model_id.into(),
        text_repr_version: EMBEDDER_DEFAULTS.text_repr_version.into(),
    })
}

/// Convenience helper to build a [`HashEmbedderConfig`] from the defaults.
pub fn default_hash_config() -> HashEmbedderConfig {
    HashEmbedderConfig {
        dimension: EMBEDDER_DEFAULTS.embedding_dimension,
        max_input_length: EMBEDDER_DEFAULTS.max_input_chars,
        embedding_model_id: EMBEDDER_DEFAULTS.embedding_model_id.into(),
        text_repr_version: EMBEDDER_DEFAULTS.text_repr_version.into(),
    }
}
