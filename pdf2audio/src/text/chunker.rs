//! Sentence-aware text chunking under a per-request character budget.

use super::char_len;
use once_cell::sync::Lazy;
use regex::Regex;

/// Default maximum chunk size in characters.
pub const DEFAULT_MAX_LENGTH: usize = 4000;

/// A sentence terminator followed by whitespace.
static SENTENCE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]\s+").expect("sentence boundary pattern should compile"));

/// Split text into sentences, each keeping its terminator.
///
/// The whitespace after a terminator is dropped; a trailing fragment without
/// a terminator is kept as the last sentence.
pub fn split_into_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for boundary in SENTENCE_BOUNDARY.find_iter(text) {
        // Terminators are single-byte ASCII.
        let end = boundary.start() + 1;
        sentences.push(&text[start..end]);
        start = boundary.end();
    }

    if start < text.len() {
        sentences.push(&text[start..]);
    }

    sentences
}

/// Split text into chunks of at most `max_length` characters.
///
/// Text that already fits is returned unchanged as a single chunk. Otherwise
/// consecutive sentences are packed greedily, joined by single spaces. A
/// sentence longer than `max_length` is never cut: it becomes a chunk of its
/// own, since splitting mid-sentence garbles the synthesized prosody.
pub fn split_text(text: &str, max_length: usize) -> Vec<String> {
    if char_len(text) <= max_length {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in split_into_sentences(text) {
        let sentence_len = char_len(sentence);

        if current.is_empty() {
            current.push_str(sentence);
            current_len = sentence_len;
        } else if current_len + 1 + sentence_len <= max_length {
            current.push(' ');
            current.push_str(sentence);
            current_len += 1 + sentence_len;
        } else {
            chunks.push(std::mem::replace(&mut current, sentence.to_string()));
            current_len = sentence_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    log::debug!("Split {} characters into {} chunks", char_len(text), chunks.len());
    chunks
}
