//! Storage abstraction for Context Index.
//!
//! The [`Store`] trait persists the two snapshot documents the engine owns:
//! the [`IndexDocument`] and the [`AnalyticsDocument`]. Both are always
//! written whole; there is no incremental log.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.
//!
//! # Operations
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`load_index`](Store::load_index) | Read the index snapshot, `None` if absent |
//! | [`save_index`](Store::save_index) | Overwrite the index snapshot |
//! | [`load_analytics`](Store::load_analytics) | Read the analytics snapshot, `None` if absent |
//! | [`save_analytics`](Store::save_analytics) | Overwrite the analytics snapshot |

pub mod memory;

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{AnalyticsDocument, IndexDocument};

/// Which snapshot an error concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Index,
    Analytics,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Index => f.write_str("index"),
            DocumentKind::Analytics => f.write_str("analytics"),
        }
    }
}

/// Errors raised by [`Store`] implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing medium failed.
    #[error("I/O error on {kind} snapshot: {source}")]
    Io {
        kind: DocumentKind,
        #[source]
        source: std::io::Error,
    },
    /// A snapshot exists but cannot be parsed.
    #[error("Corrupt {kind} snapshot: {reason}")]
    Corrupt { kind: DocumentKind, reason: String },
    /// A snapshot could not be encoded.
    #[error("Failed to encode {kind} snapshot: {source}")]
    Encode {
        kind: DocumentKind,
        #[source]
        source: serde_json::Error,
    },
    /// Backend-specific failure.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Abstract snapshot storage for a [`ContextEngine`](crate::engine::ContextEngine).
///
/// Loading a snapshot that was never written returns `Ok(None)`; loading
/// one that cannot be parsed returns [`StoreError::Corrupt`]. The engine
/// treats both as "start empty".
#[async_trait]
pub trait Store: Send + Sync {
    async fn load_index(&self) -> Result<Option<IndexDocument>, StoreError>;

    async fn save_index(&self, index: &IndexDocument) -> Result<(), StoreError>;

    async fn load_analytics(&self) -> Result<Option<AnalyticsDocument>, StoreError>;

    async fn save_analytics(&self, analytics: &AnalyticsDocument) -> Result<(), StoreError>;
}

/// Parse a JSON snapshot, mapping failures to [`StoreError::Corrupt`].
pub fn decode<T: serde::de::DeserializeOwned>(
    kind: DocumentKind,
    raw: &str,
) -> Result<T, StoreError> {
    serde_json::from_str(raw).map_err(|e| StoreError::Corrupt {
        kind,
        reason: e.to_string(),
    })
}

/// Encode a snapshot as pretty-printed JSON.
pub fn encode<T: serde::Serialize>(kind: DocumentKind, doc: &T) -> Result<String, StoreError> {
    serde_json::to_string_pretty(doc).map_err(|source| StoreError::Encode { kind, source })
}
