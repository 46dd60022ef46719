//! Directory ingestion.
//!
//! Walks a directory with `walkdir`, filters paths through `globset`
//! include/exclude patterns, and indexes each matching file as one call to
//! [`ContextEngine::index`]. Files are visited in sorted relative-path order
//! so repeated runs produce the same chunk ordering.

use anyhow::{bail, Result};
use context_index_core::models::Metadata;
use context_index_core::{ContextEngine, Store};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::IngestConfig;

/// A file selected for indexing.
#[derive(Debug, Clone)]
pub struct FileItem {
    pub path: PathBuf,
    /// Path relative to the walk root, `/`-separated on every platform.
    pub relative: String,
    /// Lowercased extension, or `"text"` when the file has none.
    pub content_type: String,
    pub body: String,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct IngestSummary {
    pub files: usize,
    pub skipped: usize,
    pub chunks: usize,
    pub links: usize,
}

/// Collect every file under `root` accepted by the configured globs.
///
/// Files that are not valid UTF-8 are skipped with a warning.
pub fn scan_directory(root: &Path, config: &IngestConfig) -> Result<Vec<FileItem>> {
    if !root.is_dir() {
        bail!("Ingest root is not a directory: {}", root.display());
    }

    let include_set = build_globset(&config.include_globs)?;

    let mut default_excludes = vec![
        "**/.git/**".to_string(),
        "**/target/**".to_string(),
        "**/node_modules/**".to_string(),
    ];
    default_excludes.extend(config.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut items = Vec::new();

    let walker = WalkDir::new(root).follow_links(config.follow_symlinks);
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().replace('\\', "/");

        if exclude_set.is_match(&rel_str) || !include_set.is_match(&rel_str) {
            continue;
        }

        let body = match std::fs::read_to_string(path) {
            Ok(body) => body,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable file");
                continue;
            }
        };

        items.push(FileItem {
            path: path.to_path_buf(),
            content_type: content_type_for(path),
            relative: rel_str,
            body,
        });
    }

    items.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(items)
}

/// Index every file under `root` with the given source tag.
pub async fn ingest_directory<S: Store>(
    engine: &mut ContextEngine<S>,
    root: &Path,
    source: &str,
    config: &IngestConfig,
) -> Result<IngestSummary> {
    let items = scan_directory(root, config)?;
    let mut summary = IngestSummary::default();

    for item in items {
        let mut metadata = Metadata::new();
        metadata.insert("path".to_string(), Value::String(item.relative.clone()));
        metadata.insert(
            "file".to_string(),
            Value::String(item.path.display().to_string()),
        );

        let outcome = engine
            .index(source, &item.content_type, &item.body, metadata)
            .await;
        if outcome.chunks.is_empty() {
            debug!(path = %item.relative, "empty file skipped");
            summary.skipped += 1;
            continue;
        }
        summary.files += 1;
        summary.chunks += outcome.chunks.len();
        summary.links += outcome.links.len();
    }

    Ok(summary)
}

/// Print an ingest summary in the same shape as the other commands.
pub async fn run_ingest<S: Store>(
    engine: &mut ContextEngine<S>,
    root: &Path,
    source: &str,
    config: &IngestConfig,
) -> Result<()> {
    let summary = ingest_directory(engine, root, source, config).await?;
    println!("ingest {}", root.display());
    println!("  files indexed: {}", summary.files);
    if summary.skipped > 0 {
        println!("  files skipped (empty): {}", summary.skipped);
    }
    println!("  chunks written: {}", summary.chunks);
    println!("  links discovered: {}", summary.links);
    Ok(())
}

fn content_type_for(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| "text".to_string())
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
