//! Sparse term-frequency embeddings.
//!
//! An "embedding" here is a [`TermVector`]: lowercase terms mapped to their
//! L2-normalized frequency, truncated to the [`MAX_TERMS`] strongest terms.
//! There is no model and no dense vector; two texts are close when they use
//! the same vocabulary.
//!
//! # Pipeline
//!
//! 1. Lowercase.
//! 2. Replace every non-word character (not alphanumeric, not `_`) with a space.
//! 3. Split on whitespace.
//! 4. Drop tokens of two characters or fewer and [`STOPWORDS`].
//! 5. Count frequencies, divide by the Euclidean norm.
//! 6. Keep the top [`MAX_TERMS`] by weight; ties keep first-seen order.
//!
//! # Example
//!
//! ```rust
//! use context_index_core::embedding::{embed, keywords};
//!
//! let v = embed("Rust rust borrow checker");
//! assert!(v["rust"] > v["borrow"]);
//! assert_eq!(keywords("Rust rust borrow checker")[0], "rust");
//! ```

use std::collections::HashMap;

use crate::models::TermVector;

/// Maximum number of terms retained in an embedding.
pub const MAX_TERMS: usize = 100;

/// Maximum number of keywords derived from an embedding.
pub const MAX_KEYWORDS: usize = 10;

/// Tokens at or below this many characters are discarded.
pub const MIN_TOKEN_CHARS: usize = 2;

/// Common English function words that carry no retrieval signal.
pub const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her", "was",
    "one", "our", "out", "has", "have", "this", "that", "with", "from", "they", "will", "would",
    "there", "their", "what", "which", "when", "where", "who", "been", "were", "into", "than",
];

/// Split text into lowercase word tokens, without filtering.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().map(str::to_string).collect()
}

fn is_indexable(token: &str) -> bool {
    token.chars().count() > MIN_TOKEN_CHARS && !STOPWORDS.contains(&token)
}

/// Terms with their normalized weights, strongest first.
///
/// Both [`embed`] and [`keywords`] are views of this ranking.
pub fn ranked_terms(text: &str) -> Vec<(String, f64)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, u32> = HashMap::new();

    for token in tokenize(text) {
        if !is_indexable(&token) {
            continue;
        }
        let count = counts.entry(token.clone()).or_insert(0);
        if *count == 0 {
            order.push(token);
        }
        *count += 1;
    }

    let norm = counts
        .values()
        .map(|&c| f64::from(c) * f64::from(c))
        .sum::<f64>()
        .sqrt();
    if norm == 0.0 {
        return Vec::new();
    }

    let mut ranked: Vec<(String, f64)> = order
        .into_iter()
        .map(|term| {
            let weight = f64::from(counts[&term]) / norm;
            (term, weight)
        })
        .collect();

    // Stable sort keeps first-seen order among equal weights.
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(MAX_TERMS);
    ranked
}

/// Build the sparse, L2-normalized term vector for `text`.
pub fn embed(text: &str) -> TermVector {
    ranked_terms(text).into_iter().collect()
}

/// The strongest [`MAX_KEYWORDS`] terms of `text`, strongest first.
pub fn keywords(text: &str) -> Vec<String> {
    ranked_terms(text)
        .into_iter()
        .take(MAX_KEYWORDS)
        .map(|(term, _)| term)
        .collect()
}

/// Embedding and keywords in a single pass.
pub fn embed_with_keywords(text: &str) -> (TermVector, Vec<String>) {
    let ranked = ranked_terms(text);
    let keywords = ranked
        .iter()
        .take(MAX_KEYWORDS)
        .map(|(term, _)| term.clone())
        .collect();
    (ranked.into_iter().collect(), keywords)
}

/// Euclidean norm of a term vector.
pub fn magnitude(v: &TermVector) -> f64 {
    v.values().map(|w| w * w).sum::<f64>().sqrt()
}
