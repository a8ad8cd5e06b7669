//! Document processing and retrieval service.
//!
//! Wires the injected collaborators (blob fetcher, layout extractor,
//! embedder) to the segmentation pipeline and the SQLite store. No
//! ambient globals: every collaborator arrives through `new`.

use std::path::PathBuf;

use doc_segmenter::builder::BuildError;
use doc_segmenter::{
    ChunkBuilder, FallbackPolicy, LayoutError, LayoutExtractor, Segmenter, TitleClassifier,
    TitlePolicy, UntitledPolicy,
};
use embedding_provider::embedder::Embedder;
use intent_model::{ChunkRecord, RankedAnswer};
use intent_store::{rank, ChunkFilter, RetrievalPolicy, SimilarityMetric, SqliteRepo, StoreError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

pub mod blob;

pub use blob::{BlobFetcher, FetchError, FsBlobFetcher};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),
    #[error("embedding error: {0}")]
    Embed(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("io error: {0}")]
    Io(String),
}

impl From<BuildError> for ServiceError {
    fn from(err: BuildError) -> Self {
        ServiceError::Embed(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub db_path: PathBuf,
    pub heading_font_prefix: String,
    pub title_policy: TitlePolicy,
    pub untitled_policy: UntitledPolicy,
    pub fallback_policy: FallbackPolicy,
    /// Intents answered with a canned repeat response.
    pub repeat_intents: Vec<String>,
    /// Records per insert transaction.
    pub insert_batch_size: usize,
    pub metric: SimilarityMetric,
    pub top_k: usize,
    pub threshold: Option<f32>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("target/demo/intents.db"),
            heading_font_prefix: "Calibri-Bold".to_string(),
            title_policy: TitlePolicy::StrictCamelCase,
            untitled_policy: UntitledPolicy::Drop,
            fallback_policy: FallbackPolicy::DemoteToPlainIntent,
            repeat_intents: Vec::new(),
            insert_batch_size: 50,
            metric: SimilarityMetric::Cosine,
            top_k: 3,
            threshold: Some(0.7),
        }
    }
}

/// Environment variable naming the SQLite database path.
pub const ENV_DB_PATH: &str = "INTENT_DB_PATH";
/// Environment variable overriding the heading font prefix.
pub const ENV_HEADING_FONT_PREFIX: &str = "HEADING_FONT_PREFIX";
/// Environment variable selecting the title policy (`strict`/`loose`).
pub const ENV_TITLE_POLICY: &str = "TITLE_POLICY";
/// Environment variable with the comma-separated repeat intents.
pub const ENV_REPEAT_INTENTS: &str = "REPEAT_INTENTS";
/// Environment variable overriding the retrieval result cap.
pub const ENV_SEARCH_TOP_K: &str = "SEARCH_TOP_K";
/// Environment variable overriding the similarity threshold.
pub const ENV_SEARCH_THRESHOLD: &str = "SEARCH_THRESHOLD";

impl ServiceConfig {
    /// Defaults overridden by the process environment (and a `.env` file
    /// when present).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var(ENV_DB_PATH) {
            cfg.db_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var(ENV_HEADING_FONT_PREFIX) {
            cfg.heading_font_prefix = v;
        }
        if let Ok(v) = std::env::var(ENV_TITLE_POLICY) {
            if v.eq_ignore_ascii_case("loose") {
                cfg.title_policy = TitlePolicy::CamelCaseOrSingleWord;
            }
        }
        if let Ok(v) = std::env::var(ENV_REPEAT_INTENTS) {
            cfg.repeat_intents = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Ok(v) = std::env::var(ENV_SEARCH_TOP_K) {
            if let Ok(k) = v.parse::<usize>() {
                cfg.top_k = k;
            }
        }
        if let Ok(v) = std::env::var(ENV_SEARCH_THRESHOLD) {
            if let Ok(t) = v.parse::<f32>() {
                cfg.threshold = Some(t);
            }
        }
        cfg
    }
}

pub struct IntentService {
    cfg: ServiceConfig,
    fetcher: Box<dyn BlobFetcher>,
    extractor: Box<dyn LayoutExtractor>,
    embedder: Box<dyn Embedder>,
    segmenter: Segmenter,
    builder: ChunkBuilder,
}

impl IntentService {
    pub fn new(
        cfg: ServiceConfig,
        fetcher: Box<dyn BlobFetcher>,
        extractor: Box<dyn LayoutExtractor>,
        embedder: Box<dyn Embedder>,
    ) -> Result<Self, ServiceError> {
        // Ensure DB dir exists
        if let Some(dir) = cfg.db_path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| ServiceError::Io(e.to_string()))?;
        }

        let classifier = TitleClassifier::new(cfg.title_policy, cfg.heading_font_prefix.clone());
        let segmenter = Segmenter::new(classifier, cfg.untitled_policy, cfg.fallback_policy);
        let builder = ChunkBuilder::new(cfg.repeat_intents.iter().map(String::as_str));

        Ok(Self {
            cfg,
            fetcher,
            extractor,
            embedder,
            segmenter,
            builder,
        })
    }

    fn open_repo(&self) -> Result<SqliteRepo, ServiceError> {
        Ok(SqliteRepo::open(&self.cfg.db_path)?)
    }

    /// Fetch, segment, embed and persist one document; returns the chunk
    /// count. Reprocessing replaces: the previous rows for the same
    /// document/topic/channel key are deleted before the new insert. An
    /// embedding failure aborts before anything is deleted or written.
    pub fn process_document(
        &self,
        document_name: &str,
        topic: &str,
        channel: &str,
    ) -> Result<usize, ServiceError> {
        let span = info_span!("process_document", document = %document_name, topic, channel);
        let _guard = span.enter();

        let bytes = self.fetcher.fetch_bytes(document_name)?;
        let pages = self.extractor.extract_layout(&bytes)?;
        let paragraphs = self.segmenter.walk(&pages);
        debug!(paragraphs = paragraphs.len(), "document segmented");

        let records = self
            .builder
            .build(&paragraphs, document_name, topic, channel, self.embedder.as_ref())?;

        let mut repo = self.open_repo()?;
        let removed =
            repo.delete_where(&ChunkFilter::for_document(document_name, topic, channel))?;
        if removed > 0 {
            debug!(removed, "replaced previous rows");
        }
        for batch in records.chunks(self.cfg.insert_batch_size.max(1)) {
            repo.insert_chunks(batch)?;
        }

        info!(chunks = records.len(), "document processed");
        Ok(records.len())
    }

    /// Embed the question and rank the stored candidates for the
    /// topic/channel scope. No match is an empty vec, never an error.
    pub fn search(
        &self,
        question: &str,
        topic: &str,
        channel: &str,
    ) -> Result<Vec<RankedAnswer>, ServiceError> {
        let query = self
            .embedder
            .embed(question)
            .map_err(|e| ServiceError::Embed(e.to_string()))?;

        let filter = ChunkFilter {
            topic: Some(topic.to_string()),
            channel: Some(channel.to_string()),
            ..ChunkFilter::default()
        };
        let candidates = self.open_repo()?.candidates(&filter)?;
        debug!(candidates = candidates.len(), "ranking candidates");

        let policy = RetrievalPolicy::TopK {
            top_k: self.cfg.top_k,
            threshold: self.cfg.threshold,
        };
        Ok(rank(&query, &candidates, self.cfg.metric, policy))
    }

    /// Direct exact-match path for callers that already know the intent;
    /// bypasses embeddings and the ranker entirely.
    pub fn lookup(
        &self,
        intent: &str,
        sub_intent: Option<&str>,
        topic: Option<&str>,
        channel: Option<&str>,
    ) -> Result<Option<ChunkRecord>, ServiceError> {
        let filter = ChunkFilter {
            topic: topic.map(str::to_string),
            channel: channel.map(str::to_string),
            ..ChunkFilter::default()
        };
        Ok(self.open_repo()?.lookup_exact(intent, sub_intent, &filter)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_round_trips_through_serde() {
        let cfg = ServiceConfig {
            repeat_intents: vec!["BeneficiosDeLaModalidadCuarenta".to_string()],
            title_policy: TitlePolicy::CamelCaseOrSingleWord,
            threshold: None,
            ..ServiceConfig::default()
        };

        let json = serde_json::to_string(&cfg).expect("serialize");
        let back: ServiceConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.repeat_intents, cfg.repeat_intents);
        assert_eq!(back.title_policy, cfg.title_policy);
        assert_eq!(back.threshold, None);
        assert_eq!(back.insert_batch_size, cfg.insert_batch_size);
    }

    // Single test for both parse outcomes: env vars are process-global, so
    // set/remove stays confined to one test body.
    #[test]
    fn malformed_threshold_env_keeps_the_default() {
        std::env::set_var(ENV_SEARCH_THRESHOLD, "not-a-number");
        let cfg = ServiceConfig::from_env();
        assert_eq!(cfg.threshold, ServiceConfig::default().threshold);

        std::env::set_var(ENV_SEARCH_THRESHOLD, "0.85");
        let cfg = ServiceConfig::from_env();
        assert_eq!(cfg.threshold, Some(0.85));

        std::env::remove_var(ENV_SEARCH_THRESHOLD);
    }
}
