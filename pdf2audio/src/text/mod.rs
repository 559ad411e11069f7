//! Text processing for TTS: layout cleanup and sentence-aware chunking.

pub mod chunker;
pub mod normalizer;

pub use chunker::{DEFAULT_MAX_LENGTH, split_text};
pub use normalizer::normalize;

/// Length of `text` in characters, the unit every text limit is expressed in.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// A chunk of normalized text ready for synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Position of this chunk in the text
    pub index: usize,
    /// The text content
    pub text: String,
}

impl TextChunk {
    /// Create a new text chunk.
    pub fn new(index: usize, text: String) -> Self {
        Self { index, text }
    }
}

/// Split already-normalized text into indexed chunks of at most `max_length`
/// characters (a single oversized sentence excepted).
pub fn chunk_normalized(normalized: &str, max_length: usize) -> Vec<TextChunk> {
    split_text(normalized, max_length)
        .into_iter()
        .enumerate()
        .map(|(index, text)| TextChunk::new(index, text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_chunk_creation() {
        let chunk = TextChunk::new(1, "Hello world".to_string());
        assert_eq!(chunk.index, 1);
        assert_eq!(chunk.text, "Hello world");
    }

    #[test]
    fn test_char_len_counts_characters() {
        assert_eq!(char_len("héllo"), 5);
        assert_eq!(char_len("日本語"), 3);
    }

    #[test]
    fn test_chunk_normalized_indexes_in_order() {
        let text = normalize("First sentence here.\nSecond sentence here. Third sentence here.");
        let chunks = chunk_normalized(&text, 25);
        assert_eq!(chunks.len(), 3);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
        }
        assert_eq!(chunks[1].text, "Second sentence here.");
    }
}
