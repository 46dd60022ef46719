//! # Context Index
//!
//! A local content index for AI tools: text goes in, gets chunked and
//! embedded as sparse term vectors, and is auto-linked to related chunks.
//! Searches are ranked by similarity, recency, and past usage.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────────────┐   ┌──────────────┐
//! │ files / CLI │──▶│ ContextEngine (core) │──▶│ JsonFileStore│
//! │   (ctxi)    │   │ chunk·embed·link·rank│   │ index.json   │
//! └─────────────┘   └──────────────────────┘   │ analytics.json│
//!                                              └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! ctxi ingest ./docs --source docs      # index a directory
//! ctxi search "deployment runbook"      # ranked search
//! ctxi context "deployment" --source chat
//! ctxi stats
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`file_store`] | JSON snapshot persistence |
//! | [`ingest`] | Directory ingestion |
//! | [`search`] | Search, context, and suggestion output |
//! | [`links`] | Linked-chunk output |
//! | [`stats`] | Statistics output |

pub mod config;
pub mod file_store;
pub mod ingest;
pub mod links;
pub mod search;
pub mod stats;

use context_index_core::ContextEngine;

use crate::config::Config;
use crate::file_store::JsonFileStore;

/// Open the engine backed by the configured storage directory.
pub async fn open_engine(config: &Config) -> ContextEngine<JsonFileStore> {
    let store = JsonFileStore::new(config.storage.dir.clone());
    ContextEngine::open(store, config.engine()).await
}
