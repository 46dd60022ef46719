//! Engine tuning parameters, decoupled from application config.

use crate::chunk::{DEFAULT_OVERLAP_CHARS, DEFAULT_TARGET_CHARS};
use crate::search::{DEFAULT_LIMIT, DEFAULT_THRESHOLD};

/// Knobs for a [`ContextEngine`](crate::engine::ContextEngine).
///
/// `Default` reproduces the reference constants.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Chunk window size in characters.
    pub chunk_target_chars: usize,
    /// Characters shared between consecutive chunks.
    pub chunk_overlap_chars: usize,
    /// Default result limit for [`search`](crate::engine::ContextEngine::search).
    pub search_limit: usize,
    /// Default similarity threshold for searches.
    pub search_threshold: f64,
    /// Result limit for active context retrieval.
    pub context_limit: usize,
    /// Similarity threshold for active context retrieval.
    pub context_threshold: f64,
    /// Result limit for smart suggestions.
    pub suggestion_limit: usize,
    /// Similarity threshold for smart suggestions.
    pub suggestion_threshold: f64,
    /// Query cache capacity (entries).
    pub cache_capacity: usize,
    /// Minimum shared keywords before two chunks are linked.
    pub min_shared_keywords: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_target_chars: DEFAULT_TARGET_CHARS,
            chunk_overlap_chars: DEFAULT_OVERLAP_CHARS,
            search_limit: DEFAULT_LIMIT,
            search_threshold: DEFAULT_THRESHOLD,
            context_limit: 5,
            context_threshold: 0.2,
            suggestion_limit: 5,
            suggestion_threshold: 0.1,
            cache_capacity: 100,
            min_shared_keywords: 3,
        }
    }
}
