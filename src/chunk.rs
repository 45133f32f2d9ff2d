//! Fixed-size overlapping text chunker.
//!
//! Splits document text into character-offset chunks: chunk `i` starts at
//! offset `i * (size - overlap)` and runs for at most `size` characters.
//! Boundaries are purely positional, not semantic. Offsets count Unicode
//! scalar values, so slicing never lands inside a UTF-8 code point.
//!
//! Pure and deterministic: identical input and parameters always produce
//! an identical chunk sequence.

use anyhow::Result;

use crate::models::Chunk;

/// Split `text` into overlapping chunks of at most `size` characters, with
/// `overlap` characters shared between consecutive chunks. Empty text
/// produces an empty sequence.
///
/// `overlap >= size` would never advance the start offset and is rejected
/// as a configuration error, as is `size == 0`.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Result<Vec<Chunk>> {
    if size == 0 {
        anyhow::bail!("chunk size must be > 0");
    }
    if overlap >= size {
        anyhow::bail!(
            "chunk overlap ({}) must be smaller than chunk size ({})",
            overlap,
            size
        );
    }

    // Byte offset of every char boundary, plus the end of the string.
    let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    boundaries.push(text.len());
    let n_chars = boundaries.len() - 1;

    let stride = size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0usize;
    while start < n_chars {
        let end = (start + size).min(n_chars);
        chunks.push(Chunk {
            index: chunks.len(),
            text: text[boundaries[start]..boundaries[end]].to_string(),
        });
        start += stride;
    }
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_no_chunks() {
        let chunks = chunk_text("", 800, 200).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn short_text_single_chunk() {
        let chunks = chunk_text("Hello, world!", 800, 200).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].text, "Hello, world!");
    }

    #[test]
    fn thousand_chars_two_chunks() {
        // 1000 chars, size 800, overlap 200 -> [0, 800) and [600, 1000).
        let text: String = (0..1000).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let chunks = chunk_text(&text, 800, 200).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, text[0..800]);
        assert_eq!(chunks[1].text, text[600..1000]);
    }

    #[test]
    fn chunk_count_matches_stride() {
        // One chunk per start offset i * stride below len.
        for len in [0usize, 1, 599, 600, 601, 800, 801, 1400, 1401, 5000] {
            let text = "x".repeat(len);
            let chunks = chunk_text(&text, 800, 200).unwrap();
            let expected = len.div_ceil(600);
            assert_eq!(chunks.len(), expected, "len = {}", len);
            assert!(chunks.iter().all(|c| !c.text.is_empty()));
        }
    }

    #[test]
    fn overlap_region_repeats() {
        let text: String = (0..1000).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let chunks = chunk_text(&text, 800, 200).unwrap();
        // Last 200 chars of chunk 0 equal the first 200 of chunk 1.
        assert_eq!(chunks[0].text[600..800], chunks[1].text[0..200]);
    }

    #[test]
    fn removing_overlaps_reconstructs_text() {
        let text: String = (0..2500).map(|i| char::from(b'A' + (i % 26) as u8)).collect();
        let chunks = chunk_text(&text, 800, 200).unwrap();
        let mut rebuilt = chunks[0].text.clone();
        for c in &chunks[1..] {
            let skip: String = c.text.chars().skip(200).collect();
            rebuilt.push_str(&skip);
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let text = "héllo wörld ".repeat(100);
        let chunks = chunk_text(&text, 50, 10).unwrap();
        let total_chars = text.chars().count();
        assert_eq!(chunks[0].text.chars().count(), 50);
        assert!(chunks.iter().all(|c| !c.text.is_empty()));
        // Stride covers the whole text.
        let last = chunks.last().unwrap();
        assert!(text.ends_with(&last.text));
        assert_eq!((chunks.len() - 1) * 40 + last.text.chars().count(), total_chars);
    }

    #[test]
    fn deterministic() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(40);
        let a = chunk_text(&text, 100, 25).unwrap();
        let b = chunk_text(&text, 100, 25).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn indices_are_contiguous() {
        let text = "y".repeat(4000);
        let chunks = chunk_text(&text, 800, 200).unwrap();
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.index, i);
        }
    }

    #[test]
    fn invalid_parameters_rejected() {
        assert!(chunk_text("abc", 0, 0).is_err());
        assert!(chunk_text("abc", 100, 100).is_err());
        assert!(chunk_text("abc", 100, 150).is_err());
    }
}
