/// Produce the comparison form of `text` plus a map back into it.
///
/// The normalized form is lowercase, whitespace runs collapse to single
/// spaces, and punctuation is dropped except apostrophes flanked by
/// alphanumerics (normalized to `'`). `map[i]` is the byte offset in `text`
/// of the character that produced normalized byte `i`; the map is total and
/// non-decreasing.
pub fn normalize(text: &str) -> (String, Vec<usize>) {
    let mut normalized = String::with_capacity(text.len());
    let mut map = Vec::with_capacity(text.len());
    let mut pending_space: Option<usize> = None;
    let mut prev_alnum = false;

    let mut chars = text.char_indices().peekable();
    while let Some((offset, ch)) = chars.next() {
        if ch.is_whitespace() {
            if !normalized.is_empty() && pending_space.is_none() {
                pending_space = Some(offset);
            }
            prev_alnum = false;
            continue;
        }

        if ch.is_alphanumeric() {
            if let Some(space_offset) = pending_space.take() {
                normalized.push(' ');
                map.push(space_offset);
            }
            for lower in ch.to_lowercase() {
                normalized.push(lower);
                for _ in 0..lower.len_utf8() {
                    map.push(offset);
                }
            }
            prev_alnum = true;
            continue;
        }

        if (ch == '\'' || ch == '\u{2019}') && prev_alnum {
            let next_is_alnum = chars
                .peek()
                .map_or(false, |&(_, next)| next.is_alphanumeric());
            if next_is_alnum {
                normalized.push('\'');
                map.push(offset);
                prev_alnum = false;
                continue;
            }
        }

        // Remaining punctuation vanishes without introducing a word break,
        // so hyphenated words collapse into one token.
        prev_alnum = false;
    }

    debug_assert_eq!(normalized.len(), map.len());
    (normalized, map)
}

/// Largest byte index `<= index` that lands on a char boundary of `s`.
pub(crate) fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut index = index;
    while !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_collapses_whitespace() {
        let (normalized, _) = normalize("Hello   World\n\tAgain");
        assert_eq!(normalized, "hello world again");
    }

    #[test]
    fn strips_punctuation_without_word_breaks() {
        let (normalized, _) = normalize("Shakespeare, Plato. I loved King Lear.\"");
        assert_eq!(normalized, "shakespeare plato i loved king lear");
    }

    #[test]
    fn hyphenated_words_join() {
        let (normalized, _) = normalize("well-known");
        assert_eq!(normalized, "wellknown");
    }

    #[test]
    fn internal_apostrophes_survive() {
        let (normalized, _) = normalize("Don't stop");
        assert_eq!(normalized, "don't stop");
    }

    #[test]
    fn curly_apostrophe_normalizes_to_straight() {
        let (normalized, _) = normalize("don\u{2019}t");
        assert_eq!(normalized, "don't");
    }

    #[test]
    fn edge_apostrophes_dropped() {
        let (normalized, _) = normalize("'tis the rockers' way");
        assert_eq!(normalized, "tis the rockers way");
    }

    #[test]
    fn leading_and_trailing_whitespace_trimmed() {
        let (normalized, map) = normalize("  spaced out  ");
        assert_eq!(normalized, "spaced out");
        assert_eq!(map.len(), normalized.len());
    }

    #[test]
    fn map_points_back_to_original_bytes() {
        let text = "A, b!";
        let (normalized, map) = normalize(text);
        assert_eq!(normalized, "a b");
        // 'a' from byte 0, the space from the whitespace at byte 2, 'b' from byte 3.
        assert_eq!(map, vec![0, 2, 3]);
    }

    #[test]
    fn map_is_total_and_non_decreasing() {
        let text = "It's a \u{201c}test\u{201d} \u{2014} of Mapping, N\u{00b0} 9!";
        let (normalized, map) = normalize(text);
        assert_eq!(map.len(), normalized.len());
        for pair in map.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        for &offset in &map {
            assert!(offset < text.len());
            assert!(text.is_char_boundary(offset));
        }
    }

    #[test]
    fn multibyte_characters_map_per_byte() {
        let text = "caf\u{e9} bar";
        let (normalized, map) = normalize(text);
        assert_eq!(normalized, "caf\u{e9} bar");
        // The two bytes of 'é' both map to its original offset.
        assert_eq!(map[3], 3);
        assert_eq!(map[4], 3);
    }

    #[test]
    fn empty_and_punctuation_only_inputs() {
        assert_eq!(normalize(""), (String::new(), Vec::new()));
        let (normalized, map) = normalize("... !!! ---");
        assert!(normalized.is_empty());
        assert!(map.is_empty());
    }

    #[test]
    fn floor_char_boundary_backs_off_multibyte() {
        let s = "a\u{e9}b";
        assert_eq!(floor_char_boundary(s, 2), 1);
        assert_eq!(floor_char_boundary(s, 3), 3);
        assert_eq!(floor_char_boundary(s, 10), s.len());
    }
}
