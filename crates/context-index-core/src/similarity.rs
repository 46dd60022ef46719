//! Similarity between sparse term vectors.
//!
//! [`cosine_similarity`] works over the union of keys (absent keys weigh
//! zero), so only shared terms contribute to the dot product.
//! [`similarity`] adds a flat bonus for each query term that appears
//! verbatim in the candidate, then clamps to `1.0`.

use crate::embedding::magnitude;
use crate::models::TermVector;

/// Bonus added per query term found in the candidate vector.
pub const EXACT_MATCH_BOOST: f64 = 0.1;

/// Cosine similarity of two term vectors, `0.0` if either is empty.
///
/// Symmetric in its arguments.
pub fn cosine_similarity(a: &TermVector, b: &TermVector) -> f64 {
    let mag_a = magnitude(a);
    let mag_b = magnitude(b);
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: f64 = small
        .iter()
        .filter_map(|(term, wa)| large.get(term).map(|wb| wa * wb))
        .sum();

    dot / (mag_a * mag_b)
}

/// Cosine similarity of `query` against `candidate`, boosted by exact
/// query-term hits in `candidate` and clamped to `[0, 1]`.
pub fn similarity<S: AsRef<str>>(
    query: &TermVector,
    candidate: &TermVector,
    query_terms: &[S],
) -> f64 {
    let base = cosine_similarity(query, candidate);
    let hits = query_terms
        .iter()
        .filter(|t| candidate.contains_key(&t.as_ref().to_lowercase()))
        .count();
    (base + EXACT_MATCH_BOOST * hits as f64).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::embed;

    #[test]
    fn test_identical_vectors() {
        let v = embed("incremental indexing of meeting notes");
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
        assert!((similarity::<&str>(&v, &v, &[]) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_symmetric_base_score() {
        let a = embed("rust ownership borrow checker lifetimes");
        let b = embed("borrow checker errors confuse rust beginners");
        let ab = cosine_similarity(&a, &b);
        assert!(ab > 0.0);
        assert!((ab - cosine_similarity(&b, &a)).abs() < 1e-12);
    }

    #[test]
    fn test_disjoint_vectors() {
        let a = embed("gardening tomatoes");
        let b = embed("compiler optimizations");
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_empty_vector() {
        let a = embed("");
        let b = embed("anything here");
        assert_eq!(cosine_similarity(&a, &b), 0.0);
        assert_eq!(cosine_similarity(&b, &a), 0.0);
    }

    #[test]
    fn test_exact_match_boost() {
        let q = embed("quick fox");
        let c = embed("The quick brown fox jumps over lazy dog repeatedly");
        let base = cosine_similarity(&q, &c);
        let boosted = similarity(&q, &c, &["quick", "FOX", "missing"]);
        assert!((boosted - (base + 0.2)).abs() < 1e-9);
    }

    #[test]
    fn test_boost_clamped() {
        let v = embed("alpha beta gamma");
        let boosted = similarity(&v, &v, &["alpha", "beta", "gamma"]);
        assert_eq!(boosted, 1.0);
    }
}
