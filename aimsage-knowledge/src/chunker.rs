//! Byte-bounded, sentence-aware text chunking.
//!
//! Embedding requests have a payload size ceiling, so long documents are cut
//! into chunks of at most `max_bytes` UTF-8 bytes along sentence boundaries,
//! with a configurable byte overlap carried between consecutive chunks for
//! local-context continuity.

/// Fragments longer than `max_bytes` are force-split into slices of this many
/// characters (characters, not bytes), bypassing the overlap logic.
const FORCED_SLICE_CHARS: usize = 1000;

/// Split `text` into chunks of at most `max_bytes` UTF-8 bytes.
///
/// Sentences are cut on terminal punctuation (`. 。 ! ！ ? ？`) and newlines,
/// and every fragment gets a `.` re-appended regardless of its original
/// terminator. A single fragment longer than `max_bytes` is force-split into
/// fixed-size character slices. Never returns an empty list for non-empty
/// input; a text that already fits is returned as the sole chunk, verbatim.
pub fn chunk_text(text: &str, max_bytes: usize, overlap_bytes: usize) -> Vec<String> {
    if text.len() <= max_bytes {
        return vec![text.to_string()];
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();

    for fragment in text.split(is_sentence_delimiter) {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            continue;
        }
        let sentence = format!("{fragment}.");

        if sentence.len() > max_bytes {
            flush(&mut chunks, &mut current);
            chunks.extend(slice_chars(&sentence, FORCED_SLICE_CHARS));
            continue;
        }

        if !current.is_empty() && current.len() + 1 + sentence.len() > max_bytes {
            let tail = trailing_bytes(&current, overlap_bytes).to_string();
            flush(&mut chunks, &mut current);
            // Seed the overlap only when it leaves room for the sentence,
            // keeping every emitted chunk within max_bytes.
            if !tail.is_empty() && tail.len() + 1 + sentence.len() <= max_bytes {
                current = tail;
            }
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&sentence);
    }

    flush(&mut chunks, &mut current);

    if chunks.is_empty() {
        // Nothing but delimiters/whitespace: fall back to forced slicing.
        chunks = slice_chars(text, FORCED_SLICE_CHARS);
        if chunks.is_empty() {
            chunks.push(String::new());
        }
    }

    chunks
}

fn is_sentence_delimiter(c: char) -> bool {
    matches!(c, '.' | '。' | '!' | '！' | '?' | '？' | '\n')
}

fn flush(chunks: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
    current.clear();
}

/// Successive `n`-character slices of `text`, trimmed, empties dropped.
fn slice_chars(text: &str, n: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(n)
        .map(|slice| slice.iter().collect::<String>().trim().to_string())
        .filter(|slice| !slice.is_empty())
        .collect()
}

/// The trailing `n` bytes of `s`, nudged forward to a char boundary.
fn trailing_bytes(s: &str, n: usize) -> &str {
    if s.len() <= n {
        return s;
    }
    let mut start = s.len() - n;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}
