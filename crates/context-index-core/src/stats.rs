//! Index statistics.
//!
//! [`compute`] never fails. Each figure is derived independently, so a
//! partially inconsistent analytics document (usage for chunks that no
//! longer exist, say) yields partial statistics instead of an error.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{AnalyticsDocument, IndexDocument};

/// How many entries the top-N lists hold.
pub const TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermCount {
    pub term: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkUsage {
    pub id: String,
    pub source: String,
    pub clicks: u64,
    pub times_used: u64,
}

/// Snapshot of index size, usage, and cache occupancy.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndexStats {
    pub total_chunks: usize,
    pub total_links: usize,
    pub chunks_by_source: BTreeMap<String, usize>,
    pub chunks_by_type: BTreeMap<String, usize>,
    pub total_searches: usize,
    pub top_search_terms: Vec<TermCount>,
    pub most_used: Vec<ChunkUsage>,
    pub cache_entries: usize,
    pub cache_capacity: usize,
    /// Cache occupancy divided by total searches. An approximation, not a
    /// measured hit ratio.
    pub cache_hit_rate: f64,
    /// Length of the index snapshot as compact JSON, 0 if it cannot be encoded.
    pub estimated_size_bytes: usize,
    pub last_update: Option<DateTime<Utc>>,
}

/// Derive statistics from the current documents and cache occupancy.
pub fn compute(
    index: &IndexDocument,
    analytics: &AnalyticsDocument,
    cache_entries: usize,
    cache_capacity: usize,
) -> IndexStats {
    let mut chunks_by_source = BTreeMap::new();
    let mut chunks_by_type = BTreeMap::new();
    for chunk in &index.chunks {
        *chunks_by_source.entry(chunk.source.clone()).or_insert(0) += 1;
        *chunks_by_type.entry(chunk.content_type.clone()).or_insert(0) += 1;
    }

    let top_search_terms = analytics
        .top_terms(TOP_N)
        .into_iter()
        .map(|(term, count)| TermCount { term, count })
        .collect();

    let mut most_used: Vec<ChunkUsage> = analytics
        .context_usage
        .iter()
        .filter(|(_, u)| u.clicks > 0 || u.times_used > 0)
        .filter_map(|(id, u)| {
            index.chunk(id).map(|c| ChunkUsage {
                id: id.clone(),
                source: c.source.clone(),
                clicks: u.clicks,
                times_used: u.times_used,
            })
        })
        .collect();
    most_used.sort_by(|a, b| {
        b.clicks
            .cmp(&a.clicks)
            .then(b.times_used.cmp(&a.times_used))
            .then_with(|| a.id.cmp(&b.id))
    });
    most_used.truncate(TOP_N);

    let total_searches = analytics.searches.len();
    let cache_hit_rate = if total_searches > 0 {
        cache_entries as f64 / total_searches as f64
    } else {
        0.0
    };

    let estimated_size_bytes = serde_json::to_vec(index).map(|v| v.len()).unwrap_or(0);

    IndexStats {
        total_chunks: index.chunks.len(),
        total_links: index.links.len(),
        chunks_by_source,
        chunks_by_type,
        total_searches,
        top_search_terms,
        most_used,
        cache_entries,
        cache_capacity,
        cache_hit_rate,
        estimated_size_bytes,
        last_update: index.metadata.last_update,
    }
}
