//! In-memory [`Store`] implementation for testing and embedded hosts.
//!
//! Snapshots are kept as JSON text behind `std::sync::RwLock`, so they go
//! through the same encode/decode path as a file-backed store. Tests can
//! plant raw (even corrupt) snapshots and simulate write failures.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::models::{AnalyticsDocument, IndexDocument};

use super::{decode, encode, DocumentKind, Store, StoreError};

/// In-memory store.
#[derive(Default)]
pub struct InMemoryStore {
    index: RwLock<Option<String>>,
    analytics: RwLock<Option<String>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose snapshots start as the given raw text.
    pub fn with_raw(index: Option<&str>, analytics: Option<&str>) -> Self {
        Self {
            index: RwLock::new(index.map(str::to_string)),
            analytics: RwLock::new(analytics.map(str::to_string)),
            ..Self::default()
        }
    }

    /// Make every subsequent save fail with [`StoreError::Unavailable`].
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn raw_index(&self) -> Option<String> {
        read_slot(&self.index)
    }

    pub fn raw_analytics(&self) -> Option<String> {
        read_slot(&self.analytics)
    }

    fn write(&self, slot: &RwLock<Option<String>>, text: String) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        let mut guard = slot
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        *guard = Some(text);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn read_slot(slot: &RwLock<Option<String>>) -> Option<String> {
    slot.read().ok().and_then(|g| g.clone())
}

#[async_trait]
impl Store for InMemoryStore {
    async fn load_index(&self) -> Result<Option<IndexDocument>, StoreError> {
        read_slot(&self.index)
            .map(|raw| decode(DocumentKind::Index, &raw))
            .transpose()
    }

    async fn save_index(&self, index: &IndexDocument) -> Result<(), StoreError> {
        let text = encode(DocumentKind::Index, index)?;
        self.write(&self.index, text)
    }

    async fn load_analytics(&self) -> Result<Option<AnalyticsDocument>, StoreError> {
        read_slot(&self.analytics)
            .map(|raw| decode(DocumentKind::Analytics, &raw))
            .transpose()
    }

    async fn save_analytics(&self, analytics: &AnalyticsDocument) -> Result<(), StoreError> {
        let text = encode(DocumentKind::Analytics, analytics)?;
        self.write(&self.analytics, text)
    }
}
