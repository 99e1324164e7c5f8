//! Splitting text into request-sized chunks
//!
//! Google's endpoint rejects long inputs, so text is cut at sentence
//! punctuation first, then at word boundaries, and only as a last resort in
//! the middle of a word. Adjacent pieces are merged back while they fit.

use once_cell::sync::Lazy;
use regex::Regex;

/// A run of text ending in sentence punctuation, or a trailing run without any
static SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^.!?;:]*[.!?;:]+|[^.!?;:]+").expect("valid segment pattern"));

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split `text` into chunks of at most `max_chars` characters
///
/// Whitespace is collapsed; blank input yields no chunks.
pub fn split_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut pieces = Vec::new();
    for m in SEGMENT.find_iter(&normalized) {
        let segment = m.as_str().trim();
        if segment.is_empty() {
            continue;
        }

        if char_len(segment) <= max_chars {
            pieces.push(segment.to_string());
        } else {
            split_words(segment, max_chars, &mut pieces);
        }
    }

    merge(pieces, max_chars)
}

fn split_words(segment: &str, max_chars: usize, out: &mut Vec<String>) {
    let mut current = String::new();

    for word in segment.split(' ') {
        if char_len(word) > max_chars {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            let chars: Vec<char> = word.chars().collect();
            out.extend(chars.chunks(max_chars).map(|c| c.iter().collect::<String>()));
            continue;
        }

        if !current.is_empty() && char_len(&current) + 1 + char_len(word) > max_chars {
            out.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        out.push(current);
    }
}

fn merge(pieces: Vec<String>, max_chars: usize) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();

    for piece in pieces {
        match chunks.last_mut() {
            Some(last) if char_len(last) + 1 + char_len(&piece) <= max_chars => {
                last.push(' ');
                last.push_str(&piece);
            }
            _ => chunks.push(piece),
        }
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        assert_eq!(
            split_chunks("Hello world.  How are\nyou?", 100),
            vec!["Hello world. How are you?"]
        );
    }

    #[test]
    fn test_blank_text() {
        assert!(split_chunks("", 100).is_empty());
        assert!(split_chunks("  \n\t ", 100).is_empty());
    }

    #[test]
    fn test_splits_at_sentences() {
        assert_eq!(
            split_chunks("Hello world. How are you?", 12),
            vec!["Hello world.", "How are you?"]
        );
    }

    #[test]
    fn test_splits_at_words() {
        assert_eq!(
            split_chunks("one two three four", 9),
            vec!["one two", "three", "four"]
        );
    }

    #[test]
    fn test_hard_splits_long_words() {
        assert_eq!(split_chunks("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let chunks = split_chunks("café café", 9);
        assert_eq!(chunks, vec!["café café"]);
    }

    #[test]
    fn test_chunks_respect_limit() {
        let text = "The quick brown fox jumps over the lazy dog; it was not amused. \
                    Then again, nobody asked the dog what it thought about any of this!";
        for chunk in split_chunks(text, 30) {
            assert!(chunk.chars().count() <= 30, "chunk too long: {:?}", chunk);
        }
    }
}
