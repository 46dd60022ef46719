//! # Context Index Core
//!
//! Storage-agnostic logic for Context Index: data models, chunking, sparse
//! term embeddings, similarity scoring, ranking, auto-linking, the query
//! cache, usage analytics, statistics, and the [`store::Store`] trait.
//!
//! This crate contains no filesystem I/O and no runtime. Hosts supply a
//! [`store::Store`] implementation and drive a [`ContextEngine`].
//!
//! ```text
//!  index ─▶ chunk ─▶ embed ─▶ append ─▶ link ─▶ store
//!  search ─▶ cache? ─▶ rank ─▶ analytics ─▶ cache ─▶ store
//! ```

pub mod analytics;
pub mod cache;
pub mod chunk;
pub mod config;
pub mod embedding;
pub mod engine;
pub mod linker;
pub mod models;
pub mod search;
pub mod similarity;
pub mod stats;
pub mod store;

pub use config::EngineConfig;
pub use engine::{ContextEngine, IndexOutcome, LinkedChunk};
pub use search::{DateRange, ScoreBreakdown, SearchOptions, SearchResult};
pub use stats::IndexStats;
pub use store::{Store, StoreError};
