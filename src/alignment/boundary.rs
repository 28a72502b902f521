use lazy_static::lazy_static;
use regex::Regex;

use crate::alignment::reference::ReferenceDocument;

const SENTENCE_TERMINATORS: &[char] = &['.', '!', '?', ':', ';'];
const CLOSING_QUOTES: &[char] = &['"', '\u{201d}', '\u{2019}'];
const TRAILING_PUNCT: &[char] = &[',', '\u{2014}', '\u{2013}', '-', '\u{201c}', '\u{2018}', '\''];
const QUOTE_CHARS: &[char] = &[
    '"', '\'', '\u{201c}', '\u{201d}', '\u{2018}', '\u{2019}',
];

lazy_static! {
    static ref NEWLINE_RUN_RE: Regex = Regex::new(r"\n{2,}").unwrap();
}

/// Project a normalized-reference span onto the raw reference and widen it to
/// enclosing word boundaries, absorbing the punctuation and quotes that
/// normalization stripped. Returns raw byte offsets, end exclusive.
pub(crate) fn expand_span(
    reference: &ReferenceDocument,
    norm_start: usize,
    norm_end: usize,
) -> Option<(usize, usize)> {
    let raw = reference.raw();
    let map = reference.position_map();
    if norm_start >= norm_end || norm_end > map.len() {
        return None;
    }

    let mut start = map[norm_start];
    // Inclusive position of the last mapped character.
    let mut end = map[norm_end - 1];

    // Widen left to the start of the word the span begins in.
    while let Some(prev) = prev_char(raw, start) {
        if prev.is_alphanumeric() {
            start -= prev.len_utf8();
        } else {
            break;
        }
    }

    // Back off whitespace the map may have landed on.
    while end > start {
        match char_at(raw, end) {
            Some(c) if c.is_whitespace() => {
                let prev = prev_char(raw, end)?;
                end -= prev.len_utf8();
            }
            _ => break,
        }
    }

    // Widen right to the end of the word the span stops in.
    if char_at(raw, end).is_some_and(char::is_alphanumeric) {
        loop {
            let cur_len = char_at(raw, end)?.len_utf8();
            match char_at(raw, end + cur_len) {
                Some(next) if next.is_alphanumeric() => end += cur_len,
                _ => break,
            }
        }
    }

    // Absorb trailing punctuation up to a sentence boundary. Whitespace stops
    // the walk, so the expansion never crosses a paragraph break.
    loop {
        let cur_len = char_at(raw, end)?.len_utf8();
        let Some(next) = char_at(raw, end + cur_len) else {
            break;
        };
        if SENTENCE_TERMINATORS.contains(&next) {
            end += cur_len;
            let next_len = next.len_utf8();
            if char_at(raw, end + next_len).is_some_and(|c| CLOSING_QUOTES.contains(&c)) {
                end += next_len;
            }
            break;
        } else if CLOSING_QUOTES.contains(&next) {
            end += cur_len;
            let next_len = next.len_utf8();
            if char_at(raw, end + next_len).is_some_and(|c| SENTENCE_TERMINATORS.contains(&c)) {
                end += next_len;
            }
            break;
        } else if TRAILING_PUNCT.contains(&next) {
            end += cur_len;
        } else {
            break;
        }
    }

    // Pull in opening quotes sitting immediately before the span.
    while let Some(prev) = prev_char(raw, start) {
        if QUOTE_CHARS.contains(&prev) {
            start -= prev.len_utf8();
        } else {
            break;
        }
    }

    let end_exclusive = end + char_at(raw, end)?.len_utf8();
    Some((start, end_exclusive))
}

/// Expanded raw-reference slice for a normalized span, cleaned for use as a
/// segment's corrected text. `None` when the span resolves to nothing usable.
pub(crate) fn extract_span(
    reference: &ReferenceDocument,
    norm_start: usize,
    norm_end: usize,
) -> Option<String> {
    let (start, end) = expand_span(reference, norm_start, norm_end)?;
    let slice = reference.raw()[start..end].trim();
    if slice.is_empty() {
        return None;
    }
    Some(NEWLINE_RUN_RE.replace_all(slice, "\n").into_owned())
}

fn prev_char(s: &str, index: usize) -> Option<char> {
    s[..index].chars().next_back()
}

fn char_at(s: &str, index: usize) -> Option<char> {
    if index >= s.len() {
        return None;
    }
    s[index..].chars().next()
}
