//! JSON-file implementation of the core [`Store`] trait.
//!
//! Keeps `index.json` and `analytics.json` side by side in one directory.
//! Each save writes a sibling `*.tmp` file and renames it over the target,
//! so a snapshot on disk is always either the previous or the new version.

use async_trait::async_trait;
use context_index_core::models::{AnalyticsDocument, IndexDocument};
use context_index_core::store::{decode, encode, DocumentKind, Store, StoreError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const INDEX_FILE: &str = "index.json";
pub const ANALYTICS_FILE: &str = "analytics.json";

pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// A store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, kind: DocumentKind) -> PathBuf {
        match kind {
            DocumentKind::Index => self.dir.join(INDEX_FILE),
            DocumentKind::Analytics => self.dir.join(ANALYTICS_FILE),
        }
    }

    async fn read(&self, kind: DocumentKind) -> Result<Option<String>, StoreError> {
        match tokio::fs::read_to_string(self.path_for(kind)).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { kind, source }),
        }
    }

    async fn write(&self, kind: DocumentKind, text: String) -> Result<(), StoreError> {
        let io = |source| StoreError::Io { kind, source };

        tokio::fs::create_dir_all(&self.dir).await.map_err(io)?;
        let target = self.path_for(kind);
        let tmp = target.with_extension("json.tmp");
        tokio::fs::write(&tmp, text.as_bytes()).await.map_err(io)?;
        tokio::fs::rename(&tmp, &target).await.map_err(io)?;

        debug!(path = %target.display(), bytes = text.len(), "snapshot written");
        Ok(())
    }
}

#[async_trait]
impl Store for JsonFileStore {
    async fn load_index(&self) -> Result<Option<IndexDocument>, StoreError> {
        self.read(DocumentKind::Index)
            .await?
            .map(|raw| decode(DocumentKind::Index, &raw))
            .transpose()
    }

    async fn save_index(&self, index: &IndexDocument) -> Result<(), StoreError> {
        let text = encode(DocumentKind::Index, index)?;
        self.write(DocumentKind::Index, text).await
    }

    async fn load_analytics(&self) -> Result<Option<AnalyticsDocument>, StoreError> {
        self.read(DocumentKind::Analytics)
            .await?
            .map(|raw| decode(DocumentKind::Analytics, &raw))
            .transpose()
    }

    async fn save_analytics(&self, analytics: &AnalyticsDocument) -> Result<(), StoreError> {
        let text = encode(DocumentKind::Analytics, analytics)?;
        self.write(DocumentKind::Analytics, text).await
    }
}
