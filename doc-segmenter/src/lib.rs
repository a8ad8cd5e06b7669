//! Turns a page-layout token stream into labeled, embeddable paragraphs.
//!
//! The walk is stateful per document: the title classifier decides which
//! lines open a new label context, the label normalizer parses the
//! `Intent_subintent` convention, and the segmenter merges adjacent body
//! lines under the active label. The chunk builder then attaches
//! embeddings and caller-supplied metadata.

pub mod builder;
pub mod label;
pub mod layout;
pub mod segmenter;
pub mod title;

pub use builder::{ChunkBuilder, BuildError};
pub use label::{normalize, LabelError};
pub use layout::{JsonLayoutExtractor, LayoutError, LayoutExtractor};
pub use segmenter::{FallbackPolicy, Segmenter, UntitledPolicy};
pub use title::{TitleClassifier, TitlePolicy};
