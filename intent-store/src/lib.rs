//! SQLite-backed chunk store plus the in-memory similarity ranker.
//!
//! The store only ever sees parameterized SQL; filter values are bound,
//! never interpolated. Embeddings are persisted as little-endian f32
//! blobs and ranked in memory after a filtered candidate fetch.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod ranker;
pub mod sqlite_repo;

pub use ranker::{rank, RetrievalPolicy, SimilarityMetric};
pub use sqlite_repo::SqliteRepo;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Conjunctive filter over stored chunks. `None` fields do not constrain.
///
/// Values are compared against the store's normalized comparison keys, so
/// callers may pass any casing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkFilter {
    pub document_name: Option<String>,
    pub topic: Option<String>,
    pub channel: Option<String>,
    pub intent: Option<String>,
    pub sub_intent: Option<String>,
}

impl ChunkFilter {
    /// Scope used by the replace-on-reprocess delete.
    pub fn for_document(document_name: &str, topic: &str, channel: &str) -> Self {
        Self {
            document_name: Some(document_name.to_string()),
            topic: Some(topic.to_string()),
            channel: Some(channel.to_string()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.document_name.is_none()
            && self.topic.is_none()
            && self.channel.is_none()
            && self.intent.is_none()
            && self.sub_intent.is_none()
    }
}
