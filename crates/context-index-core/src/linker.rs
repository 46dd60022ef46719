//! Keyword-overlap auto-linking.
//!
//! After each ingestion batch, every new chunk is compared with every chunk
//! in the index (other new chunks included, itself excluded). Two chunks
//! sharing at least `min_shared` keywords are linked with
//! `strength = |shared| / max(|keywords_a|, |keywords_b|)`.
//!
//! A pair is linked at most once regardless of orientation: the endpoints
//! of every existing link are checked in both orientations before a link is
//! created. Chunks without keywords never link, whatever the threshold.
//!
//! Cost is O(new × total) keyword intersections per batch, which is fine for
//! a local index but grows quadratically with bulk ingestion.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::models::{Chunk, IndexDocument, Link};

/// Link id for the ordered pair `(from, to)`.
///
/// Ids containing `--` can produce the same link id for different pairs, so
/// duplicate detection compares endpoints, never ids.
pub fn link_id(from: &str, to: &str) -> String {
    format!("{}--{}", from, to)
}

/// Keywords of `a` that also appear in `b`, in `a`'s order.
pub fn shared_keywords(a: &Chunk, b: &Chunk) -> Vec<String> {
    a.keywords
        .iter()
        .filter(|kw| b.keywords.contains(kw))
        .cloned()
        .collect()
}

/// Discover links for `new_ids` against the whole index and append them.
///
/// Returns the links created by this call.
pub fn link_new_chunks(
    index: &mut IndexDocument,
    new_ids: &[String],
    min_shared: usize,
    now: DateTime<Utc>,
) -> Vec<Link> {
    let min_shared = min_shared.max(1);
    let mut known: HashSet<(String, String)> = index
        .links
        .iter()
        .map(|l| (l.from.clone(), l.to.clone()))
        .collect();
    let mut created = Vec::new();

    for new_id in new_ids {
        let Some(chunk) = index.chunk(new_id) else {
            continue;
        };

        for other in &index.chunks {
            if other.id == chunk.id {
                continue;
            }

            let shared = shared_keywords(chunk, other);
            if shared.len() < min_shared {
                continue;
            }

            let forward = (chunk.id.clone(), other.id.clone());
            let reverse = (other.id.clone(), chunk.id.clone());
            if known.contains(&forward) || known.contains(&reverse) {
                continue;
            }

            let denom = chunk.keywords.len().max(other.keywords.len());
            if denom == 0 {
                continue;
            }
            let strength = shared.len() as f64 / denom as f64;

            known.insert(forward);
            created.push(Link {
                id: link_id(&chunk.id, &other.id),
                from: chunk.id.clone(),
                to: other.id.clone(),
                strength,
                shared_keywords: shared,
                discovered_at: now,
            });
        }
    }

    tracing::debug!(new = new_ids.len(), links = created.len(), "auto-link pass");
    index.links.extend(created.iter().cloned());
    created
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::embed_with_keywords;
    use crate::models::Metadata;

    fn chunk(id: &str, content: &str) -> Chunk {
        let (embedding, keywords) = embed_with_keywords(content);
        Chunk {
            id: id.to_string(),
            source: "doc".to_string(),
            content_type: "text".to_string(),
            content: content.to_string(),
            embedding,
            keywords,
            metadata: Metadata::new(),
            indexed_at: Utc::now(),
        }
    }

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_links_chunks_with_shared_keywords() {
        let mut index = IndexDocument::default();
        index.chunks.push(chunk("a", "The quick brown fox jumps over lazy dog repeatedly"));
        index.chunks.push(chunk("b", "A quick brown fox often jumps high"));

        let created = link_new_chunks(&mut index, &ids(&["a", "b"]), 3, Utc::now());
        assert_eq!(created.len(), 1);
        assert_eq!(index.links.len(), 1);

        let link = &index.links[0];
        assert_eq!((link.from.as_str(), link.to.as_str()), ("a", "b"));
        assert_eq!(link.shared_keywords, vec!["quick", "brown", "fox", "jumps"]);
        // a has 8 keywords, b has 6.
        assert!((link.strength - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_zero_threshold_never_links_keywordless_chunks() {
        let mut index = IndexDocument::default();
        index.chunks.push(chunk("a", "the and for"));
        index.chunks.push(chunk("b", "the was with"));
        assert!(index.chunks.iter().all(|c| c.keywords.is_empty()));

        let created = link_new_chunks(&mut index, &ids(&["a", "b"]), 0, Utc::now());
        assert!(created.is_empty());
        assert!(index.links.is_empty());

        index.chunks.push(chunk("c", "quick brown fox"));
        index.chunks.push(chunk("d", "slow red fox"));
        let created = link_new_chunks(&mut index, &ids(&["c", "d"]), 0, Utc::now());
        // Threshold 0 behaves as 1: one shared keyword links, none does not.
        assert_eq!(created.len(), 1);
        assert!(index.links.iter().all(|l| l.strength.is_finite()));
    }

    #[test]
    fn test_separator_in_ids_does_not_hide_links() {
        let mut index = IndexDocument::default();
        index.chunks.push(chunk("a", "alpha beta gamma delta"));
        index.chunks.push(chunk("b--c", "alpha beta gamma delta"));
        index.chunks.push(chunk("a--b", "alpha beta gamma delta"));
        index.chunks.push(chunk("c", "alpha beta gamma delta"));

        link_new_chunks(&mut index, &ids(&["a", "b--c", "a--b", "c"]), 3, Utc::now());
        // Every one of the six pairs is linked, including ("a", "b--c") and
        // ("a--b", "c") whose ids read the same.
        assert_eq!(index.links.len(), 6);
        assert!(index.links.iter().any(|l| l.from == "a" && l.to == "b--c"));
        assert!(index.links.iter().any(|l| l.from == "a--b" && l.to == "c"));
    }

    #[test]
    fn test_unrelated_chunk_not_linked() {
        let mut index = IndexDocument::default();
        index.chunks.push(chunk("a", "The quick brown fox jumps over lazy dog repeatedly"));
        index.chunks.push(chunk("b", "A quick brown fox often jumps high"));
        link_new_chunks(&mut index, &ids(&["a", "b"]), 3, Utc::now());

        index.chunks.push(chunk("c", "Quarterly budget review for the finance team"));
        let created = link_new_chunks(&mut index, &ids(&["c"]), 3, Utc::now());
        assert!(created.is_empty());
        assert_eq!(index.links.len(), 1);
    }

    #[test]
    fn test_relinking_does_not_duplicate() {
        let mut index = IndexDocument::default();
        index.chunks.push(chunk("a", "alpha beta gamma delta"));
        index.chunks.push(chunk("b", "alpha beta gamma epsilon"));
        link_new_chunks(&mut index, &ids(&["a"]), 3, Utc::now());
        assert_eq!(index.links.len(), 1);

        let created = link_new_chunks(&mut index, &ids(&["b", "a"]), 3, Utc::now());
        assert!(created.is_empty());
        assert_eq!(index.links.len(), 1);
    }

    #[test]
    fn test_below_minimum_not_linked() {
        let mut index = IndexDocument::default();
        index.chunks.push(chunk("a", "alpha beta gamma"));
        index.chunks.push(chunk("b", "alpha beta omega"));
        assert!(link_new_chunks(&mut index, &ids(&["a", "b"]), 3, Utc::now()).is_empty());
        assert_eq!(link_new_chunks(&mut index, &ids(&["a", "b"]), 2, Utc::now()).len(), 1);
    }
}
