//! Multi-factor ranking over the in-memory index.
//!
//! [`rank`] is pure: it reads the index and usage counters and returns
//! scored results. Caching and analytics side effects belong to
//! [`ContextEngine`](crate::engine::ContextEngine).
//!
//! # Scoring
//!
//! 1. Embed the query; collect lowercase whitespace tokens longer than two
//!    characters for exact-match and keyword boosts.
//! 2. Drop chunks failing the source / type / date filters.
//! 3. Drop chunks whose boosted similarity is below `threshold`.
//! 4. `relevance = min(similarity × recency × interaction × keyword_boost × 100, 100)`.
//! 5. Sort by relevance (desc), indexed time (desc), id (asc).
//! 6. Truncate to `limit`.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::embedding::{embed, MIN_TOKEN_CHARS};
use crate::models::{Chunk, IndexDocument, Metadata, UsageRecord};
use crate::similarity::similarity;

/// Default number of results returned by a search.
pub const DEFAULT_LIMIT: usize = 10;

/// Default minimum boosted similarity for a chunk to qualify.
pub const DEFAULT_THRESHOLD: f64 = 0.3;

/// Upper bound of the relevance scale.
pub const MAX_RELEVANCE: f64 = 100.0;

/// Inclusive bounds on a chunk's `indexed_at`. Either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| ts >= s) && self.end.map_or(true, |e| ts <= e)
    }
}

/// Search filters and limits.
///
/// ```rust
/// use context_index_core::SearchOptions;
///
/// let opts = SearchOptions::default().source("notes").limit(3);
/// assert_eq!(opts.limit, 3);
/// assert_eq!(opts.threshold, 0.3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Only chunks with this origin tag.
    pub source: Option<String>,
    /// Only chunks with this content type.
    pub content_type: Option<String>,
    /// Maximum number of results.
    pub limit: usize,
    /// Minimum boosted similarity, in `[0, 1]`.
    pub threshold: f64,
    pub date_range: Option<DateRange>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            source: None,
            content_type: None,
            limit: DEFAULT_LIMIT,
            threshold: DEFAULT_THRESHOLD,
            date_range: None,
        }
    }
}

impl SearchOptions {
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    fn admits(&self, chunk: &Chunk) -> bool {
        if let Some(ref src) = self.source {
            if &chunk.source != src {
                return false;
            }
        }
        if let Some(ref ty) = self.content_type {
            if &chunk.content_type != ty {
                return false;
            }
        }
        self.date_range.map_or(true, |r| r.contains(chunk.indexed_at))
    }
}

/// The factors that produced a result's relevance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// Cosine similarity plus exact-match boost, clamped to `1.0`.
    pub similarity: f64,
    pub recency: f64,
    pub interaction: f64,
    pub keyword_boost: f64,
}

/// A ranked chunk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub id: String,
    pub source: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub content: String,
    pub keywords: Vec<String>,
    pub metadata: Metadata,
    pub indexed_at: DateTime<Utc>,
    /// Relevance in `[0, 100]`.
    pub relevance: f64,
    pub explain: ScoreBreakdown,
}

/// Lowercase whitespace-separated query tokens longer than two characters.
///
/// Punctuation is kept, unlike [`tokenize`](crate::embedding::tokenize).
pub fn query_tokens(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|t| t.chars().count() > MIN_TOKEN_CHARS)
        .map(str::to_string)
        .collect()
}

/// Step-function age weighting: 1.0 under a day, 0.9 under a week, 0.7
/// under 30 days, 0.5 under 90 days, 0.3 beyond.
pub fn recency_factor(age: Duration) -> f64 {
    if age < Duration::days(1) {
        1.0
    } else if age < Duration::days(7) {
        0.9
    } else if age < Duration::days(30) {
        0.7
    } else if age < Duration::days(90) {
        0.5
    } else {
        0.3
    }
}

/// `1 + log10(clicks + 1) × 0.3`.
pub fn interaction_factor(clicks: u64) -> f64 {
    1.0 + ((clicks as f64) + 1.0).log10() * 0.3
}

/// `1 + 0.1 × (keywords that contain, or are contained in, any query token)`.
///
/// Substring matching runs both ways, so short tokens can match inside
/// unrelated longer keywords.
pub fn keyword_boost<K: AsRef<str>, T: AsRef<str>>(keywords: &[K], tokens: &[T]) -> f64 {
    let matches = keywords
        .iter()
        .filter(|kw| {
            let kw = kw.as_ref();
            tokens.iter().any(|t| {
                let t = t.as_ref();
                kw.contains(t) || t.contains(kw)
            })
        })
        .count();
    1.0 + 0.1 * matches as f64
}

/// Score every chunk of `index` against `query` and return the top results.
///
/// Returns an empty list for a blank query.
pub fn rank(
    index: &IndexDocument,
    usage: &HashMap<String, UsageRecord>,
    query: &str,
    options: &SearchOptions,
    now: DateTime<Utc>,
) -> Vec<SearchResult> {
    rank_where(index, usage, query, options, now, |_| true)
}

/// [`rank`] with an extra caller-supplied chunk predicate.
pub fn rank_where<F>(
    index: &IndexDocument,
    usage: &HashMap<String, UsageRecord>,
    query: &str,
    options: &SearchOptions,
    now: DateTime<Utc>,
    mut keep: F,
) -> Vec<SearchResult>
where
    F: FnMut(&Chunk) -> bool,
{
    if query.trim().is_empty() {
        return Vec::new();
    }

    let query_vec = embed(query);
    let tokens = query_tokens(query);

    let mut results: Vec<SearchResult> = index
        .chunks
        .iter()
        .filter(|c| options.admits(c) && keep(*c))
        .filter_map(|chunk| {
            let sim = similarity(&query_vec, &chunk.embedding, &tokens);
            if sim < options.threshold {
                return None;
            }

            let recency = recency_factor(now - chunk.indexed_at);
            let clicks = usage.get(&chunk.id).map_or(0, |u| u.clicks);
            let interaction = interaction_factor(clicks);
            let kw_boost = keyword_boost(&chunk.keywords, &tokens);
            let relevance =
                (sim * recency * interaction * kw_boost * MAX_RELEVANCE).min(MAX_RELEVANCE);

            Some(SearchResult {
                id: chunk.id.clone(),
                source: chunk.source.clone(),
                content_type: chunk.content_type.clone(),
                content: chunk.content.clone(),
                keywords: chunk.keywords.clone(),
                metadata: chunk.metadata.clone(),
                indexed_at: chunk.indexed_at,
                relevance,
                explain: ScoreBreakdown {
                    similarity: sim,
                    recency,
                    interaction,
                    keyword_boost: kw_boost,
                },
            })
        })
        .collect();

    results.sort_by(|a, b| {
        b.relevance
            .partial_cmp(&a.relevance)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.indexed_at.cmp(&a.indexed_at))
            .then(a.id.cmp(&b.id))
    });
    results.truncate(options.limit);
    results
}
