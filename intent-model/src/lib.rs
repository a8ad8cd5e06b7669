//! Shared models used across crates.

use serde::{Deserialize, Serialize};

/// An atomic styled text run, as produced by the upstream layout extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Raw text content of the run.
    pub text: String,
    /// Whether the run is rendered bold.
    #[serde(default)]
    pub is_bold: bool,
    /// Font family name; may be empty when the extractor omits it.
    #[serde(default)]
    pub font_name: String,
}

impl Span {
    pub fn new(text: impl Into<String>, is_bold: bool, font_name: impl Into<String>) -> Self {
        Self { text: text.into(), is_bold, font_name: font_name.into() }
    }
}

/// An ordered sequence of spans rendered on the same visual line.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    pub fn new(spans: Vec<Span>) -> Self {
        Self { spans }
    }

    /// Space-joined, trimmed concatenation of the non-empty span texts.
    pub fn joined_text(&self) -> String {
        let mut out = String::new();
        for span in &self.spans {
            let t = span.text.trim();
            if t.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(t);
        }
        out
    }
}

/// A layout block: an ordered group of lines.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Block {
    pub lines: Vec<Line>,
}

/// One page of the source document, in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Page {
    pub blocks: Vec<Block>,
}

/// Structured decomposition of a raw title line.
///
/// Invariant: `intent` always matches the strict CamelCase grammar
/// (`UpperCamel(UpperCamel)*`, no separators).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleLabel {
    /// CamelCase head, case preserved.
    pub intent: String,
    /// Lowercased tail after the underscore, when present.
    pub sub_intent: Option<String>,
    /// The original matched string.
    pub raw: String,
}

/// Sentinel label applied when body text accumulates before any title.
pub const UNCATEGORIZED_INTENT: &str = "uncategorized";

/// One labeled paragraph emitted by the segmenter walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphRecord {
    pub intent: String,
    pub sub_intent: Option<String>,
    /// Body text; adjacent lines under the same label are space-joined.
    pub text: String,
    /// Position among the paragraphs of this document.
    pub order_index: u32,
}

/// The persisted unit of retrievable text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Deterministic id, unique within one processing run.
    pub id: String,
    pub document_name: String,
    pub topic: String,
    pub channel: String,
    /// Global position within the document (not reset per insert batch).
    pub chunk_index: u32,
    /// Trimmed paragraph text.
    pub text: String,
    /// Display-cased intent as it appeared in the title.
    pub intent: String,
    pub sub_intent: Option<String>,
    #[serde(default)]
    pub is_transactional: bool,
    /// True iff the normalized intent belongs to the configured repeat set.
    #[serde(default)]
    pub is_repeat: bool,
    /// Fixed-length embedding vector.
    pub embedding: Vec<f32>,
}

/// Retrieval-side view of a stored chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityCandidate {
    pub text: String,
    pub document_name: String,
    pub embedding: Vec<f32>,
}

/// One ranked retrieval result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedAnswer {
    pub text: String,
    pub document_name: String,
    /// Cosine similarity in [-1, 1], or a non-negative Euclidean distance.
    pub similarity: f32,
}
