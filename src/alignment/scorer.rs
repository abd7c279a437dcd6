/*!
 * Pairwise cost between a script line and a subtitle cue.
 *
 * The cost blends a normalized Levenshtein distance over the normalized text
 * with the cosine distance of the two embeddings. It is bounded to [0, 1],
 * symmetric, and lower is better.
 */

use serde::{Deserialize, Serialize};

use super::text_unit::TextUnit;

/// Which similarity metric the scorer applies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScoringStrategy {
    /// Normalized edit distance only
    Lexical,

    /// Weighted edit distance plus embedding cosine distance
    Blended {
        lexical_weight: f64,
        semantic_weight: f64,
    },
}

/// Stateless scorer for pairs of text units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityScorer {
    strategy: ScoringStrategy,
}

impl Default for SimilarityScorer {
    fn default() -> Self {
        Self::blended(0.5, 0.5)
    }
}

impl SimilarityScorer {
    pub fn new(strategy: ScoringStrategy) -> Self {
        Self { strategy }
    }

    /// Pick the strategy for a weight split; a zero semantic weight is plain lexical scoring
    pub fn blended(lexical_weight: f64, semantic_weight: f64) -> Self {
        if semantic_weight <= 0.0 {
            return Self::new(ScoringStrategy::Lexical);
        }
        Self::new(ScoringStrategy::Blended {
            lexical_weight,
            semantic_weight,
        })
    }

    pub fn strategy(&self) -> ScoringStrategy {
        self.strategy
    }

    /// Cost of pairing `a` with `b`, in [0, 1]
    pub fn cost(&self, a: &TextUnit, b: &TextUnit) -> f64 {
        let lexical = lexical_distance(&a.normalized_text, &b.normalized_text);

        let cost = match self.strategy {
            ScoringStrategy::Lexical => lexical,
            ScoringStrategy::Blended {
                lexical_weight,
                semantic_weight,
            } => match semantic_distance(a, b) {
                Some(semantic) => lexical_weight * lexical + semantic_weight * semantic,
                // Missing embeddings hand the semantic share over to the lexical term
                None => (lexical_weight + semantic_weight) * lexical,
            },
        };

        cost.clamp(0.0, 1.0)
    }
}

/// Levenshtein distance divided by the longer length (at least 1)
pub fn lexical_distance(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count()).max(1);
    levenshtein_distance(a, b) as f64 / max_len as f64
}

/// `1 - cos(a, b)` clamped to [0, 1], or `None` when either embedding is unusable
fn semantic_distance(a: &TextUnit, b: &TextUnit) -> Option<f64> {
    let a = a.embedding.as_deref()?;
    let b = b.embedding.as_deref()?;
    let similarity = cosine_similarity(a, b)?;
    Some((1.0 - similarity.clamp(0.0, 1.0)).clamp(0.0, 1.0))
}

/// Cosine similarity of two vectors; `None` for mismatched lengths or zero norms
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.is_empty() || a.len() != b.len() {
        return None;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    // Rounding in the quotient would otherwise leave a vector slightly off itself
    if a == b {
        return Some(1.0);
    }

    Some(dot / (norm_a * norm_b).sqrt())
}

/// Calculate Levenshtein distance between two strings
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut prev_row: Vec<usize> = (0..=b_len).collect();
    let mut curr_row: Vec<usize> = vec![0; b_len + 1];

    for i in 1..=a_len {
        curr_row[0] = i;

        for j in 1..=b_len {
            let substitution = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { 1 };

            curr_row[j] = (prev_row[j] + 1)
                .min(curr_row[j - 1] + 1)
                .min(prev_row[j - 1] + substitution);
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_len]
}
