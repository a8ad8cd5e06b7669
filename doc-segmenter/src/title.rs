use intent_model::Line;
use serde::{Deserialize, Serialize};

use crate::label;

/// Accepted title shapes. Generations are selectable, never merged: the
/// loose single-word shape widens the false-positive rate and is only for
/// deployments whose documents predate the labeling convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TitlePolicy {
    /// CamelCase head with optional `_subintent` tail.
    StrictCamelCase,
    /// Strict shape, falling back to any single alphabetic token.
    CamelCaseOrSingleWord,
}

/// Decides whether a line is a section title or body text.
///
/// Style alone is unreliable (body text can be bold for emphasis) and
/// shape alone is unreliable (body words can be capitalized), so a line
/// must pass both gates.
#[derive(Debug, Clone)]
pub struct TitleClassifier {
    policy: TitlePolicy,
    heading_font_prefix: String,
}

impl Default for TitleClassifier {
    fn default() -> Self {
        Self::new(TitlePolicy::StrictCamelCase, "Calibri-Bold")
    }
}

impl TitleClassifier {
    pub fn new(policy: TitlePolicy, heading_font_prefix: impl Into<String>) -> Self {
        Self {
            policy,
            heading_font_prefix: heading_font_prefix.into(),
        }
    }

    /// Style gate then shape gate. An empty joined text is never a title.
    pub fn is_title(&self, line: &Line) -> bool {
        let joined = line.joined_text();
        if joined.is_empty() {
            return false;
        }

        let styled = line.spans.iter().any(|span| {
            span.is_bold
                && !span.text.trim().is_empty()
                && span.font_name.starts_with(&self.heading_font_prefix)
        });
        if !styled {
            return false;
        }

        match self.policy {
            TitlePolicy::StrictCamelCase => label::matches_label_shape(&joined),
            TitlePolicy::CamelCaseOrSingleWord => {
                label::matches_label_shape(&joined) || label::matches_single_word(&joined)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intent_model::Span;

    fn bold_line(text: &str) -> Line {
        Line::new(vec![Span::new(text, true, "Calibri-Bold")])
    }

    fn body_line(text: &str) -> Line {
        Line::new(vec![Span::new(text, false, "Calibri")])
    }

    #[test]
    fn bold_heading_font_and_camel_case_is_a_title() {
        let classifier = TitleClassifier::default();
        assert!(classifier.is_title(&bold_line("BeneficiosDeLaModalidadCuarenta_pago")));
        assert!(classifier.is_title(&bold_line("Afiliacion")));
    }

    #[test]
    fn style_without_shape_is_not_a_title() {
        let classifier = TitleClassifier::default();
        assert!(!classifier.is_title(&bold_line("El beneficio se paga mensualmente.")));
        assert!(!classifier.is_title(&bold_line("MAYUSCULAS")));
    }

    #[test]
    fn shape_without_style_is_not_a_title() {
        let classifier = TitleClassifier::default();
        assert!(!classifier.is_title(&body_line("Afiliacion_requisitos")));

        // Bold but wrong font family.
        let wrong_font = Line::new(vec![Span::new("Afiliacion", true, "Arial-Bold")]);
        assert!(!classifier.is_title(&wrong_font));
    }

    #[test]
    fn single_word_policy_accepts_loose_tokens() {
        let strict = TitleClassifier::default();
        let loose = TitleClassifier::new(TitlePolicy::CamelCaseOrSingleWord, "Calibri-Bold");
        let token = bold_line("beneficios");
        assert!(!strict.is_title(&token));
        assert!(loose.is_title(&token));
    }

    #[test]
    fn empty_joined_text_is_never_a_title() {
        let classifier = TitleClassifier::default();
        let blank = Line::new(vec![Span::new("   ", true, "Calibri-Bold")]);
        assert!(!classifier.is_title(&blank));
        assert!(!classifier.is_title(&Line::default()));
    }
}
