//! Splitting long text into pieces the synthesizer handles safely.
//!
//! Lengths are counted in `char`s, so a split never lands inside a code point.

use std::sync::OnceLock;

use regex::Regex;

/// Longest text submitted to the engine as one part.
pub const MAX_CHUNK_CHARS: usize = 4000;

/// Slice length used when the text has no sentence punctuation at all.
pub const FALLBACK_CHUNK_CHARS: usize = 3000;

const TERMINALS: [char; 3] = ['.', '!', '?'];

fn sentence_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // A run of ordinary text with its closing punctuation ("Really?!" stays whole),
    // or a bare run of punctuation at the very start of the text.
    RE.get_or_init(|| Regex::new(r"[^.!?]+[.!?]*|[.!?]+").expect("valid sentence regex"))
}

/// Split `text` into ordered chunks of at most [`MAX_CHUNK_CHARS`] characters.
///
/// Text that already fits is returned as a single, untouched chunk. Longer
/// text is packed greedily sentence by sentence; concatenating the result
/// gives back the original text. A single sentence longer than the limit is
/// kept whole. Text without any `.`, `!` or `?` is cut into
/// [`FALLBACK_CHUNK_CHARS`]-sized slices instead.
pub fn split(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    if text.chars().count() <= MAX_CHUNK_CHARS {
        return vec![text.to_string()];
    }

    let mut chunks = if text.contains(TERMINALS) {
        pack_sentences(text)
    } else {
        log::debug!("No sentence punctuation found, slicing text into fixed-size chunks");
        slice_fixed(text, FALLBACK_CHUNK_CHARS)
    };

    chunks.retain(|chunk| !chunk.trim().is_empty());
    log::debug!("Split {} characters into {} chunks", text.chars().count(), chunks.len());
    chunks
}

fn pack_sentences(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for sentence in sentence_pattern().find_iter(text).map(|m| m.as_str()) {
        let len = sentence.chars().count();
        if len > MAX_CHUNK_CHARS {
            log::warn!(
                "Sentence of {len} characters exceeds the {MAX_CHUNK_CHARS}-character chunk limit; \
                 submitting it whole"
            );
        }

        if current_len > 0 && current_len + len > MAX_CHUNK_CHARS {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.push_str(sentence);
        current_len += len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn slice_fixed(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(size).map(|c| c.iter().collect()).collect()
}
