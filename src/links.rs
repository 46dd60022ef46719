//! `ctxi links <chunk-id>`: show one chunk and every chunk linked to it.

use anyhow::{bail, Result};
use context_index_core::{ContextEngine, Store};

pub fn run_links<S: Store>(engine: &ContextEngine<S>, chunk_id: &str) -> Result<()> {
    let chunk = match engine.chunk(chunk_id) {
        Some(c) => c,
        None => bail!("Chunk not found: {}", chunk_id),
    };

    println!("--- Chunk ---");
    println!("id:       {}", chunk.id);
    println!("source:   {}", chunk.source);
    println!("type:     {}", chunk.content_type);
    println!("indexed:  {}", chunk.indexed_at.to_rfc3339());
    println!("keywords: {}", chunk.keywords.join(", "));
    println!();
    println!("{}", chunk.content);
    println!();

    let linked = engine.linked_sources(chunk_id);
    println!("--- Links ({}) ---", linked.len());
    for l in &linked {
        println!("[{:.2}] {} / {}", l.strength, l.chunk.source, l.chunk.id);
        println!("    shared: {}", l.shared_keywords.join(", "));
    }

    Ok(())
}
