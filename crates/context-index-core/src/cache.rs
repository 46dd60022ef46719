//! Bounded LRU cache of search results.
//!
//! Keys are a canonical JSON serialization of the search parameters, so two
//! searches hit the same entry exactly when their normalized parameters
//! match. Writes to the index never invalidate entries; only
//! [`QueryCache::clear`] does.

use std::num::NonZeroUsize;

use lru::LruCache;
use serde::Serialize;

use crate::search::{DateRange, SearchOptions, SearchResult};

/// Canonical cache key for a search.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

#[derive(Serialize)]
struct KeyParts<'a> {
    query: String,
    source: Option<&'a str>,
    #[serde(rename = "type")]
    content_type: Option<&'a str>,
    limit: usize,
    threshold: f64,
    date_range: Option<&'a DateRange>,
}

impl CacheKey {
    /// Build the key for `query` under `options`. The query is trimmed and
    /// lowercased.
    pub fn new(query: &str, options: &SearchOptions) -> Self {
        let parts = KeyParts {
            query: query.trim().to_lowercase(),
            source: options.source.as_deref(),
            content_type: options.content_type.as_deref(),
            limit: options.limit,
            threshold: options.threshold,
            date_range: options.date_range.as_ref(),
        };
        // Serializing plain strings and numbers cannot fail; fall back to
        // Debug formatting rather than panic.
        let encoded = serde_json::to_string(&parts).unwrap_or_else(|_| format!("{:?}", options));
        Self(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// LRU cache mapping [`CacheKey`]s to result lists.
pub struct QueryCache {
    entries: LruCache<CacheKey, Vec<SearchResult>>,
}

impl QueryCache {
    /// A cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(cap),
        }
    }

    /// Look up `key`, promoting it to most-recently-used.
    pub fn get(&mut self, key: &CacheKey) -> Option<&Vec<SearchResult>> {
        self.entries.get(key)
    }

    /// Insert `results`, evicting the least-recently-used entry when full.
    pub fn set(&mut self, key: CacheKey, results: Vec<SearchResult>) {
        self.entries.put(key, results);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }
}
