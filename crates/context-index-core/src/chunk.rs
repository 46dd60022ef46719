//! Sentence-aware sliding-window chunker.
//!
//! Splits content into overlapping windows of roughly `target_chars`
//! characters. A window that would end mid-sentence is stretched to the
//! next `". "` terminator when one appears within [`SENTENCE_LOOKAHEAD`]
//! characters, so chunks tend to end on a sentence boundary.
//!
//! # Algorithm
//!
//! 1. Content of at most `target_chars` characters is returned as-is.
//! 2. Otherwise a window `[start, start + target_chars)` is cut.
//! 3. If a `". "` begins within the lookahead past the window end, the
//!    window is extended to include the period.
//! 4. The next window starts `target_chars - overlap_chars` characters
//!    later, so neighbours share `overlap_chars` characters of context.
//! 5. Whitespace-only windows are dropped; chunking stops once a window
//!    reaches the end of the content.
//!
//! Lengths are counted in `char`s so multi-byte text is never split inside
//! a code point.
//!
//! # Example
//!
//! ```rust
//! use context_index_core::chunk::chunk_text;
//!
//! let chunks = chunk_text("A short note.", 500, 50);
//! assert_eq!(chunks, vec!["A short note.".to_string()]);
//! ```

/// Default window size in characters.
pub const DEFAULT_TARGET_CHARS: usize = 500;

/// Default number of characters shared by consecutive windows.
pub const DEFAULT_OVERLAP_CHARS: usize = 50;

/// How far past a window's nominal end a sentence terminator may be.
pub const SENTENCE_LOOKAHEAD: usize = 100;

/// Split `content` into overlapping, sentence-aware chunks.
///
/// # Guarantees
///
/// - `content` no longer than `target_chars` yields exactly `[content]`.
/// - No chunk is longer than `target_chars + SENTENCE_LOOKAHEAD` characters.
/// - Chunk `i` starts at character `i * (target_chars - overlap_chars)`.
/// - No returned chunk is blank (beyond the single-chunk case).
pub fn chunk_text(content: &str, target_chars: usize, overlap_chars: usize) -> Vec<String> {
    let target = target_chars.max(1);
    let chars: Vec<char> = content.chars().collect();

    if chars.len() <= target {
        return vec![content.to_string()];
    }

    let step = target.saturating_sub(overlap_chars).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let mut end = (start + target).min(chars.len());
        if end < chars.len() {
            if let Some(period) = find_sentence_end(&chars, end) {
                end = period + 1;
            }
        }

        let piece: String = chars[start..end].iter().collect();
        if !piece.trim().is_empty() {
            chunks.push(piece);
        }

        if end >= chars.len() {
            break;
        }
        start += step;
    }

    chunks
}

/// Index of the first `.` followed by a space at or after `from`, if it
/// lies within the lookahead window.
fn find_sentence_end(chars: &[char], from: usize) -> Option<usize> {
    let last = chars.len().saturating_sub(1);
    (from..last)
        .take(SENTENCE_LOOKAHEAD)
        .find(|&i| chars[i] == '.' && chars[i + 1] == ' ')
}
