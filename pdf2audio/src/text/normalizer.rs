//! Cleanup of text produced by document extraction.
//!
//! Layout extraction tends to glue words together across line and column
//! breaks ("endOf the line", "ends.Next") and leaves hard line breaks in the
//! middle of sentences. The rules here run in a fixed order:
//!
//! 1. space between a lowercase letter and a following uppercase letter
//! 2. space between a sentence terminator (`.`, `!`, `?`) and a following letter
//! 3. collapse every whitespace run, line breaks included, to one space
//! 4. trim both ends
//!
//! Collapsing runs last so the spaces inserted by 1 and 2 never count as runs.

use once_cell::sync::Lazy;
use regex::Regex;

static CASE_TRANSITION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\p{Ll})(\p{Lu})").expect("case transition pattern should compile"));

static TERMINATOR_LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([.!?])(\p{L})").expect("terminator pattern should compile"));

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern should compile"));

/// Clean extracted text for TTS processing. Never fails; empty in, empty out.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = CASE_TRANSITION.replace_all(text, "$1 $2");
    let text = TERMINATOR_LETTER.replace_all(&text, "$1 $2");
    let text = WHITESPACE_RUN.replace_all(&text, " ");

    text.trim().to_string()
}
