//! TOML configuration for the `ctxi` binary.
//!
//! Every section is optional. Missing keys fall back to the engine's
//! built-in defaults, so an empty file (or `[storage]` alone) is valid.
//!
//! ```toml
//! [storage]
//! dir = "./data"
//!
//! [chunking]
//! target_chars = 500
//! overlap_chars = 50
//!
//! [retrieval]
//! limit = 10
//! threshold = 0.3
//!
//! [ingest]
//! include_globs = ["**/*.md", "**/*.txt"]
//! ```

use anyhow::{bail, Context, Result};
use context_index_core::chunk::{DEFAULT_OVERLAP_CHARS, DEFAULT_TARGET_CHARS};
use context_index_core::EngineConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub linking: LinkingConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding `index.json` and `analytics.json`.
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
        }
    }
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("./data")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_target_chars")]
    pub target_chars: usize,
    #[serde(default = "default_overlap_chars")]
    pub overlap_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            target_chars: default_target_chars(),
            overlap_chars: default_overlap_chars(),
        }
    }
}

fn default_target_chars() -> usize {
    DEFAULT_TARGET_CHARS
}
fn default_overlap_chars() -> usize {
    DEFAULT_OVERLAP_CHARS
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_context_limit")]
    pub context_limit: usize,
    #[serde(default = "default_context_threshold")]
    pub context_threshold: f64,
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,
    #[serde(default = "default_suggestion_threshold")]
    pub suggestion_threshold: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            threshold: default_threshold(),
            context_limit: default_context_limit(),
            context_threshold: default_context_threshold(),
            suggestion_limit: default_suggestion_limit(),
            suggestion_threshold: default_suggestion_threshold(),
        }
    }
}

fn default_limit() -> usize {
    EngineConfig::default().search_limit
}
fn default_threshold() -> f64 {
    EngineConfig::default().search_threshold
}
fn default_context_limit() -> usize {
    EngineConfig::default().context_limit
}
fn default_context_threshold() -> f64 {
    EngineConfig::default().context_threshold
}
fn default_suggestion_limit() -> usize {
    EngineConfig::default().suggestion_limit
}
fn default_suggestion_threshold() -> f64 {
    EngineConfig::default().suggestion_threshold
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
        }
    }
}

fn default_cache_capacity() -> usize {
    EngineConfig::default().cache_capacity
}

#[derive(Debug, Deserialize, Clone)]
pub struct LinkingConfig {
    #[serde(default = "default_min_shared_keywords")]
    pub min_shared_keywords: usize,
}

impl Default for LinkingConfig {
    fn default() -> Self {
        Self {
            min_shared_keywords: default_min_shared_keywords(),
        }
    }
}

fn default_min_shared_keywords() -> usize {
    EngineConfig::default().min_shared_keywords
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
        }
    }
}

fn default_include_globs() -> Vec<String> {
    vec!["**/*.md".to_string(), "**/*.txt".to_string()]
}

impl Config {
    /// Engine tunables derived from this file.
    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            chunk_target_chars: self.chunking.target_chars,
            chunk_overlap_chars: self.chunking.overlap_chars,
            search_limit: self.retrieval.limit,
            search_threshold: self.retrieval.threshold,
            context_limit: self.retrieval.context_limit,
            context_threshold: self.retrieval.context_threshold,
            suggestion_limit: self.retrieval.suggestion_limit,
            suggestion_threshold: self.retrieval.suggestion_threshold,
            cache_capacity: self.cache.capacity,
            min_shared_keywords: self.linking.min_shared_keywords,
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.chunking.target_chars == 0 {
        bail!("chunking.target_chars must be > 0");
    }
    if config.chunking.overlap_chars >= config.chunking.target_chars {
        bail!("chunking.overlap_chars must be smaller than chunking.target_chars");
    }

    let r = &config.retrieval;
    if r.limit == 0 || r.context_limit == 0 || r.suggestion_limit == 0 {
        bail!("retrieval limits must be >= 1");
    }
    for (name, value) in [
        ("threshold", r.threshold),
        ("context_threshold", r.context_threshold),
        ("suggestion_threshold", r.suggestion_threshold),
    ] {
        if !(0.0..=1.0).contains(&value) {
            bail!("retrieval.{} must be in [0.0, 1.0]", name);
        }
    }

    if config.cache.capacity == 0 {
        bail!("cache.capacity must be >= 1");
    }
    if config.linking.min_shared_keywords == 0 {
        bail!("linking.min_shared_keywords must be >= 1");
    }
    Ok(())
}
