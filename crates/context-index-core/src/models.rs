//! Core data models persisted by Context Index.
//!
//! Two documents make up the durable state: the [`IndexDocument`] (chunks,
//! per-source groupings, links) and the [`AnalyticsDocument`] (search log,
//! popular terms, per-chunk usage). Both serialize with camelCase field
//! names so snapshots stay readable by other tooling.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current on-disk version of the index document.
pub const INDEX_VERSION: u32 = 1;

/// Sparse term → weight map. Sorted so snapshots diff cleanly.
pub type TermVector = BTreeMap<String, f64>;

/// Opaque caller-supplied key/value metadata attached to a chunk.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A retrievable unit of indexed text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    /// `source_type_timestamp_sequence`.
    pub id: String,
    /// Origin tag (e.g. `"notes"`, `"chat"`).
    pub source: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub content: String,
    pub embedding: TermVector,
    /// Top terms by weight, strongest first.
    pub keywords: Vec<String>,
    #[serde(default)]
    pub metadata: Metadata,
    pub indexed_at: DateTime<Utc>,
}

/// An undirected relationship between two chunks that share keywords.
///
/// Stored with the orientation chosen at discovery time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: String,
    pub from: String,
    pub to: String,
    /// `|shared| / max(|keywords_from|, |keywords_to|)`, in `[0, 1]`.
    pub strength: f64,
    pub shared_keywords: Vec<String>,
    pub discovered_at: DateTime<Utc>,
}

impl Link {
    /// Whether `chunk_id` is either endpoint.
    pub fn touches(&self, chunk_id: &str) -> bool {
        self.from == chunk_id || self.to == chunk_id
    }

    /// The endpoint opposite `chunk_id`, if `chunk_id` is an endpoint.
    pub fn other(&self, chunk_id: &str) -> Option<&str> {
        if self.from == chunk_id {
            Some(&self.to)
        } else if self.to == chunk_id {
            Some(&self.from)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndexMetadata {
    pub last_update: Option<DateTime<Utc>>,
    pub total_chunks: usize,
    pub total_links: usize,
}

/// The full index snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndexDocument {
    pub version: u32,
    pub chunks: Vec<Chunk>,
    /// Source tag → ids of the chunks ingested under it.
    pub sources: BTreeMap<String, Vec<String>>,
    pub links: Vec<Link>,
    pub metadata: IndexMetadata,
}

impl Default for IndexDocument {
    fn default() -> Self {
        Self {
            version: INDEX_VERSION,
            chunks: Vec::new(),
            sources: BTreeMap::new(),
            links: Vec::new(),
            metadata: IndexMetadata::default(),
        }
    }
}

impl IndexDocument {
    pub fn chunk(&self, id: &str) -> Option<&Chunk> {
        self.chunks.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.chunk(id).is_some()
    }

    /// Re-derive the summary counters after a mutation.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.metadata.last_update = Some(now);
        self.metadata.total_chunks = self.chunks.len();
        self.metadata.total_links = self.links.len();
    }
}

/// Per-chunk consumption counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UsageRecord {
    pub clicks: u64,
    pub times_used: u64,
    pub last_accessed: Option<DateTime<Utc>>,
    /// Contexts that have consumed this chunk, in first-use order.
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchLogEntry {
    pub query: String,
    pub timestamp: DateTime<Utc>,
    pub source: Option<String>,
    pub result_count: usize,
}

/// The analytics snapshot. Missing sections load as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsDocument {
    pub searches: Vec<SearchLogEntry>,
    pub popular_terms: HashMap<String, u64>,
    pub context_usage: HashMap<String, UsageRecord>,
}
