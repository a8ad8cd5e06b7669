use std::collections::HashSet;

use embedding_provider::embedder::{Embedder, EmbedderError};
use intent_model::{ChunkRecord, ParagraphRecord};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("embedding paragraph {index} failed: {source}")]
    Embedding {
        index: u32,
        #[source]
        source: EmbedderError,
    },
}

/// Lowercase-and-trim used for every comparison key (ids, filters, the
/// repeat set). Display values keep their original case on the record.
pub fn normalize_key(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Attaches embeddings and caller-supplied metadata to segmented
/// paragraphs, producing the persisted chunk records.
#[derive(Debug, Clone, Default)]
pub struct ChunkBuilder {
    repeat_intents: HashSet<String>,
}

impl ChunkBuilder {
    /// `repeat_intents` are the intents answered with a canned repeat
    /// response. Stored lowercased; membership checks use the normalized
    /// intent key.
    pub fn new<I, S>(repeat_intents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            repeat_intents: repeat_intents
                .into_iter()
                .map(|s| normalize_key(s.as_ref()))
                .collect(),
        }
    }

    /// Build one record per paragraph, numbering chunks globally across
    /// the document. Any embedding failure aborts the whole document so a
    /// partial run never reaches the store.
    pub fn build(
        &self,
        paragraphs: &[ParagraphRecord],
        document_name: &str,
        topic: &str,
        channel: &str,
        embedder: &dyn Embedder,
    ) -> Result<Vec<ChunkRecord>, BuildError> {
        let topic_key = normalize_key(topic);
        let channel_key = normalize_key(channel);
        let document_key = normalize_key(document_name);

        let mut records = Vec::with_capacity(paragraphs.len());
        for (i, paragraph) in paragraphs.iter().enumerate() {
            let chunk_index = i as u32;
            let text = paragraph.text.trim();
            let embedding = embedder.embed(text).map_err(|source| BuildError::Embedding {
                index: chunk_index,
                source,
            })?;

            let intent_key = normalize_key(&paragraph.intent);
            let id = match &paragraph.sub_intent {
                Some(sub) => format!(
                    "{topic_key}_{intent_key}_{sub}_{document_key}_chunk_{chunk_index}"
                ),
                None => format!("{topic_key}_{intent_key}_{document_key}_chunk_{chunk_index}"),
            };

            records.push(ChunkRecord {
                id,
                document_name: document_name.to_string(),
                topic: topic_key.clone(),
                channel: channel_key.clone(),
                chunk_index,
                text: text.to_string(),
                intent: paragraph.intent.clone(),
                sub_intent: paragraph.sub_intent.clone(),
                is_transactional: false,
                is_repeat: self.repeat_intents.contains(&intent_key),
                embedding,
            });
        }

        debug!(document = %document_name, chunks = records.len(), "chunk records built");
        Ok(records)
    }
}
