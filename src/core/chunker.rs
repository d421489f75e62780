//! Sentence-aligned text segmentation

use once_cell::sync::Lazy;
use regex::Regex;

/// Default upper bound for a translation chunk, in characters
pub const DEFAULT_MAX_CHUNK_LENGTH: usize = 450;

/// A run of non-terminators closed by terminators, or a trailing run without one
static SENTENCE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^.!?]*[.!?]+|[^.!?]+").expect("Invalid sentence regex"));

static WHITESPACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Replace every whitespace run with one space and trim
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_REGEX.replace_all(text, " ").trim().to_string()
}

/// Normalize text before chunking.
///
/// Collapses whitespace runs to a single space, puts one space after any
/// sentence terminator directly followed by another character, then trims.
pub fn clean_text(text: &str) -> String {
    let collapsed = collapse_whitespace(text);

    let mut cleaned = String::with_capacity(collapsed.len());
    let mut chars = collapsed.chars().peekable();
    while let Some(c) = chars.next() {
        cleaned.push(c);
        if is_terminator(c) {
            if let Some(next) = chars.peek() {
                if !next.is_whitespace() {
                    cleaned.push(' ');
                }
            }
        }
    }

    cleaned.trim().to_string()
}

/// Sentence units of `text`, trimmed, empty units dropped
pub fn split_sentences(text: &str) -> Vec<&str> {
    SENTENCE_REGEX
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split text into ordered chunks of at most `max_length` characters.
///
/// Sentences are packed greedily and never split, so a sentence longer than
/// `max_length` becomes a chunk of its own.
pub fn split_into_chunks(text: &str, max_length: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in split_sentences(text) {
        let sentence_len = sentence.chars().count();
        let separator = usize::from(!current.is_empty());

        if current_len + separator + sentence_len <= max_length {
            if separator == 1 {
                current.push(' ');
            }
            current.push_str(sentence);
            current_len += separator + sentence_len;
        } else {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            current.push_str(sentence);
            current_len = sentence_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Split text into pieces of at most `max_length` characters, preferring to
/// break at the last space before the limit.
///
/// Used for summarization input, where sentence boundaries matter less than
/// keeping whole words.
pub fn split_by_length(text: &str, max_length: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut pieces = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        while start < chars.len() && chars[start] == ' ' {
            start += 1;
        }
        if start == chars.len() {
            break;
        }

        let mut end = (start + max_length.max(1)).min(chars.len());

        if end < chars.len() {
            if let Some(space) = (start + 1..=end).rev().find(|&i| chars[i] == ' ') {
                end = space;
            }
        }

        let piece: String = chars[start..end].iter().collect();
        let piece = piece.trim();
        if !piece.is_empty() {
            pieces.push(piece.to_string());
        }
        start = end;
    }

    pieces
}
