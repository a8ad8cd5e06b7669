use intent_model::{Page, ParagraphRecord, UNCATEGORIZED_INTENT};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::label;
use crate::title::TitleClassifier;

/// What to do with body lines that appear before any title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UntitledPolicy {
    /// Never emit paragraphs with no label.
    #[default]
    Drop,
    /// Accumulate under the `uncategorized` sentinel.
    Uncategorized,
}

/// What to do with a styled title line whose text fails the label grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FallbackPolicy {
    /// Use the raw text as the intent, with no sub-intent.
    #[default]
    DemoteToPlainIntent,
    /// Reject the line as a title and treat it as body text.
    TreatAsBody,
}

/// Stateful per-document walk over the layout lines.
///
/// State is local to one `walk` call; nothing leaks across documents.
#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    classifier: TitleClassifier,
    untitled: UntitledPolicy,
    fallback: FallbackPolicy,
}

impl Segmenter {
    pub fn new(
        classifier: TitleClassifier,
        untitled: UntitledPolicy,
        fallback: FallbackPolicy,
    ) -> Self {
        Self {
            classifier,
            untitled,
            fallback,
        }
    }

    /// Walk the document in page, block, line order and emit labeled
    /// paragraphs. Adjacent body lines under the same active label merge
    /// into one record; a title line always closes the open record, so two
    /// non-adjacent regions sharing a label stay separate records.
    pub fn walk(&self, pages: &[Page]) -> Vec<ParagraphRecord> {
        let mut out: Vec<ParagraphRecord> = Vec::new();
        // (intent, sub_intent) of the active context, if any.
        let mut current: Option<(String, Option<String>)> = None;
        // Handle to the record currently accepting appended text.
        let mut open: Option<usize> = None;

        for page in pages {
            for block in &page.blocks {
                for line in &block.lines {
                    let joined = line.joined_text();
                    if joined.is_empty() {
                        // Skipped entirely; does not reset context.
                        continue;
                    }

                    if self.classifier.is_title(line) {
                        match label::normalize(&joined) {
                            Ok(label) => {
                                debug!(intent = %label.intent, sub_intent = ?label.sub_intent, "title detected");
                                current = Some((label.intent, label.sub_intent));
                                open = None;
                                continue;
                            }
                            Err(_) => match self.fallback {
                                FallbackPolicy::DemoteToPlainIntent => {
                                    debug!(raw = %joined, "title demoted to plain intent");
                                    current = Some((joined.clone(), None));
                                    open = None;
                                    continue;
                                }
                                FallbackPolicy::TreatAsBody => {
                                    // Falls through to body handling below.
                                }
                            },
                        }
                    }

                    if current.is_none() {
                        match self.untitled {
                            UntitledPolicy::Drop => continue,
                            UntitledPolicy::Uncategorized => {
                                current = Some((UNCATEGORIZED_INTENT.to_string(), None));
                            }
                        }
                    }
                    let Some((intent, sub_intent)) = current.clone() else {
                        continue;
                    };

                    if let Some(idx) = open {
                        let record = &mut out[idx];
                        if record.intent == intent && record.sub_intent == sub_intent {
                            record.text.push(' ');
                            record.text.push_str(&joined);
                            continue;
                        }
                    }

                    let order_index = out.len() as u32;
                    out.push(ParagraphRecord {
                        intent,
                        sub_intent,
                        text: joined,
                        order_index,
                    });
                    open = Some(out.len() - 1);
                }
            }
        }

        out
    }
}
