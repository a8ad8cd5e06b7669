use intent_model::{Block, Line, Page, Span};
use serde::Deserialize;
use thiserror::Error;

/// Bold bit in the extractor's span flags (bit 4).
const BOLD_FLAG: u32 = 16;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("malformed layout payload: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Seam to the upstream layout extraction collaborator.
///
/// The core never parses raw PDF bytes itself; implementations translate
/// whatever the extractor produced into the ordered page/block/line model.
pub trait LayoutExtractor: Send + Sync {
    fn extract_layout(&self, bytes: &[u8]) -> Result<Vec<Page>, LayoutError>;
}

// Wire shape of the extractor dump: pages -> blocks -> lines -> spans.
// Blocks without lines (images, drawings) simply deserialize empty.

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    pages: Vec<RawPage>,
}

#[derive(Debug, Deserialize)]
struct RawPage {
    #[serde(default)]
    blocks: Vec<RawBlock>,
}

#[derive(Debug, Deserialize)]
struct RawBlock {
    #[serde(default)]
    lines: Vec<RawLine>,
}

#[derive(Debug, Deserialize)]
struct RawLine {
    #[serde(default)]
    spans: Vec<RawSpan>,
}

#[derive(Debug, Deserialize)]
struct RawSpan {
    #[serde(default)]
    text: String,
    #[serde(default)]
    font: String,
    #[serde(default)]
    flags: u32,
}

/// Parses the JSON page dump emitted by the layout extraction collaborator.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLayoutExtractor;

impl JsonLayoutExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl LayoutExtractor for JsonLayoutExtractor {
    fn extract_layout(&self, bytes: &[u8]) -> Result<Vec<Page>, LayoutError> {
        let raw: RawDocument = serde_json::from_slice(bytes)?;
        let pages = raw
            .pages
            .into_iter()
            .map(|page| Page {
                blocks: page
                    .blocks
                    .into_iter()
                    .map(|block| Block {
                        lines: block
                            .lines
                            .into_iter()
                            .map(|line| Line {
                                spans: line
                                    .spans
                                    .into_iter()
                                    .map(|span| Span {
                                        text: span.text,
                                        is_bold: span.flags & BOLD_FLAG != 0,
                                        font_name: span.font,
                                    })
                                    .collect(),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();
        Ok(pages)
    }
}
