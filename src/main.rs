//! # Context Index CLI (`ctxi`)
//!
//! The `ctxi` binary drives a [`ContextEngine`] backed by JSON snapshots in
//! the configured storage directory.
//!
//! ## Usage
//!
//! ```bash
//! ctxi --config ./config/ctxi.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ctxi index <file>` | Index one file |
//! | `ctxi ingest <dir>` | Index every matching file under a directory |
//! | `ctxi search "<query>"` | Ranked search |
//! | `ctxi context "<query>" --source <tag>` | Context retrieval with usage tracking |
//! | `ctxi click <id>` | Record an interaction with a chunk |
//! | `ctxi suggest --source <tag> [terms...]` | Related chunks from other sources |
//! | `ctxi links <id>` | Chunks linked to a chunk |
//! | `ctxi delete <id>` / `ctxi delete --source <tag>` | Remove chunks |
//! | `ctxi stats` | Index and usage statistics |
//! | `ctxi clear` | Wipe the index and analytics |
//!
//! Logs go to stderr and are filtered by `RUST_LOG` (default `warn`).

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use context_index::config;
use context_index::file_store::JsonFileStore;
use context_index::search::SearchArgs;
use context_index::{ingest, links, open_engine, search, stats};
use context_index_core::models::Metadata;
use context_index_core::ContextEngine;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Context Index CLI: a local content index with auto-linking and
/// usage-aware retrieval.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/ctxi.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "ctxi",
    about = "Context Index: a local content index with auto-linking and usage-aware retrieval",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/ctxi.toml")]
    config: PathBuf,

    /// Log debug output to stderr (overrides `RUST_LOG`).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a single file.
    Index {
        file: PathBuf,

        /// Source tag recorded on every chunk.
        #[arg(long, default_value = "manual")]
        source: String,

        /// Content type. Defaults to the file extension, or `text`.
        #[arg(long = "type")]
        content_type: Option<String>,
    },

    /// Index every file under a directory that matches `[ingest]` globs.
    Ingest {
        dir: PathBuf,

        /// Source tag recorded on every chunk.
        #[arg(long, default_value = "filesystem")]
        source: String,
    },

    /// Ranked search over indexed chunks.
    Search {
        query: String,

        /// Only chunks with this source tag.
        #[arg(long)]
        source: Option<String>,

        /// Only chunks with this content type.
        #[arg(long = "type")]
        content_type: Option<String>,

        /// Maximum number of results.
        #[arg(long)]
        limit: Option<usize>,

        /// Minimum similarity in [0, 1].
        #[arg(long)]
        threshold: Option<f64>,

        /// Only chunks indexed on or after this date (YYYY-MM-DD).
        #[arg(long)]
        since: Option<String>,

        /// Only chunks indexed on or before this date (YYYY-MM-DD).
        #[arg(long)]
        until: Option<String>,

        /// Show how each relevance score was composed.
        #[arg(long)]
        explain: bool,
    },

    /// Retrieve context for a consumer and record the usage.
    Context {
        query: String,

        /// The consuming context (e.g. `chat`, `canvas`).
        #[arg(long)]
        source: String,
    },

    /// Record that a chunk was clicked.
    Click { id: String },

    /// Suggest chunks from other sources related to recent terms.
    Suggest {
        /// The source to exclude from suggestions.
        #[arg(long)]
        source: String,

        /// Recent terms. Popular search terms are used when omitted.
        terms: Vec<String>,
    },

    /// Show a chunk and the chunks linked to it.
    Links { id: String },

    /// Delete one chunk, or every chunk of a source tag.
    Delete {
        /// Chunk id to delete.
        #[arg(conflicts_with = "source", required_unless_present = "source")]
        id: Option<String>,

        /// Delete every chunk with this source tag.
        #[arg(long)]
        source: Option<String>,
    },

    /// Print index and usage statistics.
    Stats,

    /// Delete all chunks, links, and analytics.
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cfg = config::load_config(&cli.config)?;
    let mut engine = open_engine(&cfg).await;
    // Load problems were already logged and the affected snapshot reset.
    if let Some(e) = engine.take_store_error() {
        debug!(error = %e, "continuing with reset snapshot");
    }

    match cli.command {
        Commands::Index {
            file,
            source,
            content_type,
        } => {
            run_index(&mut engine, &file, &source, content_type).await?;
        }
        Commands::Ingest { dir, source } => {
            ingest::run_ingest(&mut engine, &dir, &source, &cfg.ingest).await?;
        }
        Commands::Search {
            query,
            source,
            content_type,
            limit,
            threshold,
            since,
            until,
            explain,
        } => {
            let args = SearchArgs {
                source,
                content_type,
                limit,
                threshold,
                since,
                until,
                explain,
            };
            search::run_search(&mut engine, &query, &args).await?;
        }
        Commands::Context { query, source } => {
            search::run_context(&mut engine, &query, &source).await?;
        }
        Commands::Click { id } => {
            if !engine.record_interaction(&id).await {
                bail!("Chunk not found: {}", id);
            }
            println!("Recorded interaction with {}", id);
        }
        Commands::Suggest { source, terms } => {
            search::run_suggest(&engine, &source, &terms)?;
        }
        Commands::Links { id } => {
            links::run_links(&engine, &id)?;
        }
        Commands::Delete { id, source } => match (id, source) {
            (Some(id), _) => {
                if !engine.delete_chunk(&id).await {
                    bail!("Chunk not found: {}", id);
                }
                println!("Deleted chunk {}", id);
            }
            (None, Some(source)) => {
                let removed = engine.delete_source(&source).await;
                println!("Deleted {} chunks from source '{}'", removed, source);
            }
            (None, None) => bail!("Specify a chunk id or --source"),
        },
        Commands::Stats => {
            stats::run_stats(&engine)?;
        }
        Commands::Clear => {
            engine.clear().await;
            println!("Index cleared.");
        }
    }

    finish(&mut engine)
}

async fn run_index(
    engine: &mut ContextEngine<JsonFileStore>,
    file: &Path,
    source: &str,
    content_type: Option<String>,
) -> Result<()> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let content_type = content_type.unwrap_or_else(|| {
        file.extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| "text".to_string())
    });

    let mut metadata = Metadata::new();
    metadata.insert(
        "file".to_string(),
        serde_json::Value::String(file.display().to_string()),
    );

    let outcome = engine.index(source, &content_type, &content, metadata).await;
    if outcome.chunks.is_empty() {
        println!("Nothing to index: {} is empty.", file.display());
        return Ok(());
    }

    println!("index {}", file.display());
    println!("  chunks written: {}", outcome.chunks.len());
    println!("  links discovered: {}", outcome.links.len());
    for chunk in &outcome.chunks {
        println!("  id: {}", chunk.id);
    }
    Ok(())
}

/// Surface a persistence failure from the command as a non-zero exit.
fn finish(engine: &mut ContextEngine<JsonFileStore>) -> Result<()> {
    match engine.take_store_error() {
        Some(e) => Err(anyhow::Error::new(e).context("Failed to save snapshot")),
        None => Ok(()),
    }
}
