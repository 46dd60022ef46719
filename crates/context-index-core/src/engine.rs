//! The context engine: one owner for the index, analytics, and cache.
//!
//! A [`ContextEngine`] is constructed once per [`Store`] and loads both
//! snapshots at startup. Every mutating call rewrites the affected
//! snapshot(s) before returning. Store failures never fail the call: they
//! are logged, kept in [`ContextEngine::last_store_error`], and the
//! in-memory state stays authoritative.
//!
//! Mutating methods take `&mut self`, so a single engine has exactly one
//! writer at a time. Hosts sharing an engine across tasks wrap it in a
//! mutex.

use chrono::Utc;
use tracing::{debug, warn};

use crate::cache::{CacheKey, QueryCache};
use crate::chunk::chunk_text;
use crate::config::EngineConfig;
use crate::embedding::embed_with_keywords;
use crate::linker::link_new_chunks;
use crate::models::{AnalyticsDocument, Chunk, IndexDocument, Link, Metadata};
use crate::search::{query_tokens, rank, rank_where, SearchOptions, SearchResult};
use crate::stats::{self, IndexStats};
use crate::store::{Store, StoreError};

/// What a single [`ContextEngine::index`] call added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexOutcome {
    pub chunks: Vec<Chunk>,
    /// Links discovered for the new chunks.
    pub links: Vec<Link>,
}

/// A chunk reached from another through a [`Link`].
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedChunk {
    pub link_id: String,
    pub strength: f64,
    pub shared_keywords: Vec<String>,
    pub chunk: Chunk,
}

pub struct ContextEngine<S: Store> {
    store: S,
    config: EngineConfig,
    index: IndexDocument,
    analytics: AnalyticsDocument,
    cache: QueryCache,
    last_store_error: Option<StoreError>,
}

impl<S: Store> ContextEngine<S> {
    /// Load both snapshots from `store`. Missing snapshots start empty;
    /// corrupt ones are logged and reset to empty.
    pub async fn open(store: S, config: EngineConfig) -> Self {
        let mut last_store_error = None;

        let index = match store.load_index().await {
            Ok(doc) => doc.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "index snapshot unreadable, starting empty");
                last_store_error = Some(e);
                IndexDocument::default()
            }
        };

        let analytics = match store.load_analytics().await {
            Ok(doc) => doc.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "analytics snapshot unreadable, starting empty");
                last_store_error = Some(e);
                AnalyticsDocument::default()
            }
        };

        debug!(
            chunks = index.chunks.len(),
            links = index.links.len(),
            "context engine opened"
        );

        Self {
            cache: QueryCache::new(config.cache_capacity),
            store,
            config,
            index,
            analytics,
            last_store_error,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn index_document(&self) -> &IndexDocument {
        &self.index
    }

    pub fn analytics(&self) -> &AnalyticsDocument {
        &self.analytics
    }

    pub fn chunk(&self, id: &str) -> Option<&Chunk> {
        self.index.chunk(id)
    }

    /// The most recent store failure, if any.
    pub fn last_store_error(&self) -> Option<&StoreError> {
        self.last_store_error.as_ref()
    }

    pub fn take_store_error(&mut self) -> Option<StoreError> {
        self.last_store_error.take()
    }

    /// Search options carrying this engine's configured defaults.
    pub fn default_options(&self) -> SearchOptions {
        SearchOptions::default()
            .limit(self.config.search_limit)
            .threshold(self.config.search_threshold)
    }

    /// Chunk, embed, and append `content`, then auto-link the new chunks.
    ///
    /// Blank content is ignored and yields an empty outcome.
    pub async fn index(
        &mut self,
        source: &str,
        content_type: &str,
        content: &str,
        metadata: Metadata,
    ) -> IndexOutcome {
        if content.trim().is_empty() {
            return IndexOutcome::default();
        }

        let now = Utc::now();
        let millis = now.timestamp_millis();
        let pieces = chunk_text(
            content,
            self.config.chunk_target_chars,
            self.config.chunk_overlap_chars,
        );

        let mut new_ids = Vec::with_capacity(pieces.len());
        let mut seq = 0usize;
        for piece in pieces {
            let mut id = chunk_id(source, content_type, millis, seq);
            while self.index.contains(&id) {
                seq += 1;
                id = chunk_id(source, content_type, millis, seq);
            }
            seq += 1;

            let (embedding, keywords) = embed_with_keywords(&piece);
            self.index.chunks.push(Chunk {
                id: id.clone(),
                source: source.to_string(),
                content_type: content_type.to_string(),
                content: piece,
                embedding,
                keywords,
                metadata: metadata.clone(),
                indexed_at: now,
            });
            self.index
                .sources
                .entry(source.to_string())
                .or_default()
                .push(id.clone());
            self.analytics.track(&id);
            new_ids.push(id);
        }

        let links = link_new_chunks(
            &mut self.index,
            &new_ids,
            self.config.min_shared_keywords,
            now,
        );
        self.index.touch(now);

        debug!(
            source,
            content_type,
            chunks = new_ids.len(),
            links = links.len(),
            "indexed content"
        );

        self.persist_index().await;
        self.persist_analytics().await;

        let chunks = new_ids
            .iter()
            .filter_map(|id| self.index.chunk(id).cloned())
            .collect();
        IndexOutcome { chunks, links }
    }

    /// Ranked search with caching and analytics.
    ///
    /// A cache hit returns the stored list as-is, relevance values
    /// included, without touching analytics.
    pub async fn search(&mut self, query: &str, options: &SearchOptions) -> Vec<SearchResult> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        let key = CacheKey::new(query, options);
        if let Some(hit) = self.cache.get(&key) {
            debug!(query, results = hit.len(), "query cache hit");
            return hit.clone();
        }

        let now = Utc::now();
        let results = rank(
            &self.index,
            &self.analytics.context_usage,
            query,
            options,
            now,
        );

        let tokens = query_tokens(query);
        self.analytics.record_search(
            query,
            options.source.as_deref(),
            &tokens,
            results.len(),
            now,
        );
        debug!(query, results = results.len(), "search");

        self.persist_analytics().await;
        self.cache.set(key, results.clone());
        results
    }

    /// Top results for `query`, recording that `consumer` used each one.
    pub async fn active_context(&mut self, query: &str, consumer: &str) -> Vec<SearchResult> {
        let options = SearchOptions::default()
            .limit(self.config.context_limit)
            .threshold(self.config.context_threshold);
        let results = self.search(query, &options).await;
        if results.is_empty() {
            return results;
        }

        let now = Utc::now();
        for result in &results {
            // Cached results can name chunks deleted since.
            if self.index.contains(&result.id) {
                self.analytics.record_use(&result.id, consumer, now);
            }
        }
        self.persist_analytics().await;
        results
    }

    /// Count a click on `chunk_id`. Unknown ids are ignored.
    pub async fn record_interaction(&mut self, chunk_id: &str) -> bool {
        if !self.index.contains(chunk_id) {
            debug!(chunk_id, "interaction for unknown chunk ignored");
            return false;
        }
        self.analytics.record_click(chunk_id, Utc::now());
        self.persist_analytics().await;
        true
    }

    /// Chunks from other sources related to `recent_terms`.
    ///
    /// Without usable terms, the most popular search terms stand in.
    /// Read-only: neither the cache nor analytics is touched.
    pub fn smart_suggestions<T: AsRef<str>>(
        &self,
        current_source: &str,
        recent_terms: &[T],
    ) -> Vec<SearchResult> {
        let mut terms: Vec<String> = recent_terms
            .iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if terms.is_empty() {
            terms = self
                .analytics
                .top_terms(5)
                .into_iter()
                .map(|(term, _)| term)
                .collect();
        }

        let options = SearchOptions::default()
            .limit(self.config.suggestion_limit)
            .threshold(self.config.suggestion_threshold);
        rank_where(
            &self.index,
            &self.analytics.context_usage,
            &terms.join(" "),
            &options,
            Utc::now(),
            |c| c.source != current_source,
        )
    }

    /// Chunks linked to `chunk_id`, strongest link first.
    pub fn linked_sources(&self, chunk_id: &str) -> Vec<LinkedChunk> {
        let mut linked: Vec<LinkedChunk> = self
            .index
            .links
            .iter()
            .filter_map(|link| {
                let other = link.other(chunk_id)?;
                let chunk = self.index.chunk(other)?;
                Some(LinkedChunk {
                    link_id: link.id.clone(),
                    strength: link.strength,
                    shared_keywords: link.shared_keywords.clone(),
                    chunk: chunk.clone(),
                })
            })
            .collect();
        linked.sort_by(|a, b| {
            b.strength
                .partial_cmp(&a.strength)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk.id.cmp(&b.chunk.id))
        });
        linked
    }

    /// Remove one chunk with its links and usage record.
    pub async fn delete_chunk(&mut self, chunk_id: &str) -> bool {
        if !self.remove_chunk(chunk_id) {
            return false;
        }
        self.index.touch(Utc::now());
        self.persist_index().await;
        self.persist_analytics().await;
        true
    }

    /// Remove every chunk ingested under the `source` tag.
    pub async fn delete_source(&mut self, source: &str) -> usize {
        let ids: Vec<String> = self
            .index
            .chunks
            .iter()
            .filter(|c| c.source == source)
            .map(|c| c.id.clone())
            .collect();
        let removed = ids.iter().filter(|id| self.remove_chunk(id)).count();
        if removed > 0 {
            self.index.touch(Utc::now());
            self.persist_index().await;
            self.persist_analytics().await;
        }
        removed
    }

    pub fn stats(&self) -> IndexStats {
        stats::compute(
            &self.index,
            &self.analytics,
            self.cache.len(),
            self.cache.capacity(),
        )
    }

    /// Drop every chunk, link, analytics record, and cache entry.
    pub async fn clear(&mut self) {
        self.index = IndexDocument::default();
        self.analytics = AnalyticsDocument::default();
        self.cache.clear();
        self.index.touch(Utc::now());
        self.persist_index().await;
        self.persist_analytics().await;
    }

    fn remove_chunk(&mut self, chunk_id: &str) -> bool {
        let Some(pos) = self.index.chunks.iter().position(|c| c.id == chunk_id) else {
            return false;
        };
        self.index.chunks.remove(pos);
        for ids in self.index.sources.values_mut() {
            ids.retain(|id| id != chunk_id);
        }
        self.index.sources.retain(|_, ids| !ids.is_empty());
        self.index.links.retain(|l| !l.touches(chunk_id));
        self.analytics.forget(chunk_id);
        true
    }

    async fn persist_index(&mut self) {
        let result = self.store.save_index(&self.index).await;
        self.absorb(result);
    }

    async fn persist_analytics(&mut self) {
        let result = self.store.save_analytics(&self.analytics).await;
        self.absorb(result);
    }

    fn absorb(&mut self, result: Result<(), StoreError>) {
        if let Err(e) = result {
            warn!(error = %e, "store write failed, keeping in-memory state");
            self.last_store_error = Some(e);
        }
    }
}

fn chunk_id(source: &str, content_type: &str, millis: i64, seq: usize) -> String {
    format!("{}_{}_{}_{}", source, content_type, millis, seq)
}
