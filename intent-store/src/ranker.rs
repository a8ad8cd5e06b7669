use intent_model::{RankedAnswer, SimilarityCandidate};
use serde::{Deserialize, Serialize};

/// Distance function used to compare the question against candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SimilarityMetric {
    /// Higher is better, range [-1, 1]. Zero when either norm is zero.
    #[default]
    Cosine,
    /// Lower is better, non-negative.
    Euclidean,
}

/// How many ranked answers to keep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RetrievalPolicy {
    /// The single best candidate, always returned when any exist.
    BestOnly,
    /// Up to `top_k` candidates; `threshold` drops weak matches
    /// (strictly better-than, in the metric's direction).
    TopK { top_k: usize, threshold: Option<f32> },
}

/// Score, order and cut the candidate set.
///
/// The sort is stable: candidates with equal scores keep their incoming
/// order, which is the store's document/chunk order.
pub fn rank(
    query: &[f32],
    candidates: &[SimilarityCandidate],
    metric: SimilarityMetric,
    policy: RetrievalPolicy,
) -> Vec<RankedAnswer> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<RankedAnswer> = candidates
        .iter()
        .map(|c| RankedAnswer {
            text: c.text.clone(),
            document_name: c.document_name.clone(),
            similarity: score(metric, query, &c.embedding),
        })
        .collect();

    match metric {
        SimilarityMetric::Cosine => {
            scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        }
        SimilarityMetric::Euclidean => {
            scored.sort_by(|a, b| a.similarity.total_cmp(&b.similarity));
        }
    }

    match policy {
        RetrievalPolicy::BestOnly => {
            scored.truncate(1);
            scored
        }
        RetrievalPolicy::TopK { top_k, threshold } => {
            if let Some(t) = threshold {
                scored.retain(|a| match metric {
                    SimilarityMetric::Cosine => a.similarity > t,
                    SimilarityMetric::Euclidean => a.similarity < t,
                });
            }
            scored.truncate(top_k);
            scored
        }
    }
}

fn score(metric: SimilarityMetric, a: &[f32], b: &[f32]) -> f32 {
    // A dimension mismatch can only come from mixed-provider rows; such
    // candidates never win.
    if a.len() != b.len() {
        return match metric {
            SimilarityMetric::Cosine => 0.0,
            SimilarityMetric::Euclidean => f32::INFINITY,
        };
    }
    match metric {
        SimilarityMetric::Cosine => cosine_similarity(a, b),
        SimilarityMetric::Euclidean => euclidean_distance(a, b),
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}
