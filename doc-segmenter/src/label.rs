use std::sync::OnceLock;

use intent_model::TitleLabel;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LabelError {
    #[error("title '{raw}' does not match the Intent_subintent convention")]
    InvalidFormat { raw: String },
}

fn label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // CamelCase head, optional single underscore plus lowercase tail.
    RE.get_or_init(|| {
        Regex::new(r"^([A-Z][a-z]+(?:[A-Z][a-z]+)*)(?:_([a-z0-9_]+))?$").expect("valid regex")
    })
}

fn single_word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z]+$").expect("valid regex"))
}

/// Parse a detected title into its structured `(intent, sub_intent)` key.
///
/// Pure function. The CamelCase head keeps its case; the tail is
/// lowercased. Fails when the head is not valid CamelCase, even if an
/// underscore and tail are present.
pub fn normalize(raw: &str) -> Result<TitleLabel, LabelError> {
    let trimmed = raw.trim();
    let caps = label_re()
        .captures(trimmed)
        .ok_or_else(|| LabelError::InvalidFormat { raw: raw.to_string() })?;

    let intent = caps
        .get(1)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| LabelError::InvalidFormat { raw: raw.to_string() })?;
    let sub_intent = caps.get(2).map(|m| m.as_str().to_lowercase());

    Ok(TitleLabel {
        intent,
        sub_intent,
        raw: trimmed.to_string(),
    })
}

/// True when `text` matches the full `Intent_subintent` label shape.
pub(crate) fn matches_label_shape(text: &str) -> bool {
    label_re().is_match(text.trim())
}

/// True when `text` is a single alphabetic token (early-variant fallback).
pub(crate) fn matches_single_word(text: &str) -> bool {
    single_word_re().is_match(text.trim())
}
