//! Usage and search analytics.
//!
//! Thin operations over [`AnalyticsDocument`]: the search log, popular-term
//! counters, and per-chunk usage records. Ranking reads click counts from
//! here; statistics read everything.

use chrono::{DateTime, Utc};

use crate::models::{AnalyticsDocument, SearchLogEntry, UsageRecord};

impl AnalyticsDocument {
    /// Append a search to the log and bump the counter of every token.
    pub fn record_search<T: AsRef<str>>(
        &mut self,
        query: &str,
        source: Option<&str>,
        tokens: &[T],
        result_count: usize,
        now: DateTime<Utc>,
    ) {
        self.searches.push(SearchLogEntry {
            query: query.to_string(),
            timestamp: now,
            source: source.map(str::to_string),
            result_count,
        });
        for token in tokens {
            *self
                .popular_terms
                .entry(token.as_ref().to_string())
                .or_insert(0) += 1;
        }
    }

    /// Start tracking a freshly indexed chunk with zeroed counters.
    pub fn track(&mut self, chunk_id: &str) {
        self.context_usage
            .entry(chunk_id.to_string())
            .or_default();
    }

    /// Count a click on `chunk_id`.
    pub fn record_click(&mut self, chunk_id: &str, now: DateTime<Utc>) {
        let usage = self
            .context_usage
            .entry(chunk_id.to_string())
            .or_default();
        usage.clicks += 1;
        usage.last_accessed = Some(now);
    }

    /// Count one use of `chunk_id` as context for `consumer`.
    pub fn record_use(&mut self, chunk_id: &str, consumer: &str, now: DateTime<Utc>) {
        let usage = self
            .context_usage
            .entry(chunk_id.to_string())
            .or_default();
        usage.times_used += 1;
        usage.last_accessed = Some(now);
        if !usage.sources.iter().any(|s| s == consumer) {
            usage.sources.push(consumer.to_string());
        }
    }

    pub fn forget(&mut self, chunk_id: &str) -> Option<UsageRecord> {
        self.context_usage.remove(chunk_id)
    }

    pub fn clicks(&self, chunk_id: &str) -> u64 {
        self.context_usage.get(chunk_id).map_or(0, |u| u.clicks)
    }

    /// The `n` most frequent search terms, most frequent first (ties by term).
    pub fn top_terms(&self, n: usize) -> Vec<(String, u64)> {
        let mut terms: Vec<(String, u64)> = self
            .popular_terms
            .iter()
            .map(|(t, c)| (t.clone(), *c))
            .collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        terms.truncate(n);
        terms
    }
}
