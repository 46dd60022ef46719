//! Index statistics and health overview.
//!
//! Prints what the engine reports from [`ContextEngine::stats`] together
//! with the on-disk size of the snapshot files. Used by `ctxi stats` to
//! confirm that ingestion and searches are landing where expected.

use anyhow::Result;
use context_index_core::store::DocumentKind;
use context_index_core::ContextEngine;

use crate::file_store::JsonFileStore;

/// Run the stats command against a file-backed engine.
pub fn run_stats(engine: &ContextEngine<JsonFileStore>) -> Result<()> {
    let stats = engine.stats();
    let store = engine.store();

    let file_size = |kind| {
        std::fs::metadata(store.path_for(kind))
            .map(|m| m.len())
            .unwrap_or(0)
    };
    let on_disk = file_size(DocumentKind::Index) + file_size(DocumentKind::Analytics);

    println!("Context Index — Stats");
    println!("=====================");
    println!();
    println!("  Storage:     {}", store.dir().display());
    println!("  On disk:     {}", format_bytes(on_disk));
    println!(
        "  Index size:  {} (estimated)",
        format_bytes(stats.estimated_size_bytes as u64)
    );
    println!(
        "  Last update: {}",
        stats
            .last_update
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string())
    );
    println!();
    println!("  Chunks:      {}", stats.total_chunks);
    println!("  Links:       {}", stats.total_links);
    println!("  Searches:    {}", stats.total_searches);
    println!(
        "  Cache:       {} / {} (hit rate ~{:.0}%)",
        stats.cache_entries,
        stats.cache_capacity,
        stats.cache_hit_rate * 100.0
    );

    if !stats.chunks_by_source.is_empty() {
        println!();
        println!("  By source:");
        println!("  {:<24} {:>8}", "SOURCE", "CHUNKS");
        println!("  {}", "-".repeat(33));
        for (source, count) in &stats.chunks_by_source {
            println!("  {:<24} {:>8}", source, count);
        }
    }

    if !stats.chunks_by_type.is_empty() {
        println!();
        println!("  By type:");
        for (content_type, count) in &stats.chunks_by_type {
            println!("  {:<24} {:>8}", content_type, count);
        }
    }

    if !stats.top_search_terms.is_empty() {
        println!();
        println!("  Top search terms:");
        for t in &stats.top_search_terms {
            println!("  {:<24} {:>8}", t.term, t.count);
        }
    }

    if !stats.most_used.is_empty() {
        println!();
        println!("  Most used:");
        println!("  {:<40} {:>6} {:>6}", "CHUNK", "CLICKS", "USED");
        for u in &stats.most_used {
            println!("  {:<40} {:>6} {:>6}", u.id, u.clicks, u.times_used);
        }
    }

    println!();
    Ok(())
}

/// Format a byte count as a human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
