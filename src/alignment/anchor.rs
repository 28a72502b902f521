use crate::alignment::normalize::floor_char_boundary;
use crate::alignment::similarity::similarity_ratio;
use crate::types::{MatchCandidate, MatchMethod};

/// Minimum sliding-window ratio for the fuzzy locator to report a position.
pub(crate) const FUZZY_ACCEPT_RATIO: f64 = 0.80;
const FUZZY_EARLY_EXIT_RATIO: f64 = 0.95;
/// Occurrence scores within this distance count as ties.
const SCORE_TIE_EPSILON: f64 = 0.01;
const WORD_BOUNDARY_BONUS: f64 = 0.02;
const REFINE_BACKWARD_BYTES: usize = 30;
const REFINE_FORWARD_BYTES: usize = 60;

/// Exact-anchor search inside `reference[window_start..window_end]`.
///
/// Anchor word counts are tried in the given order; the first count whose
/// anchor occurs in the window wins. An anchor occurring more than once is
/// disambiguated by scoring a comparable-length slice at each occurrence.
pub(crate) fn find_exact_anchor(
    segment: &str,
    reference: &str,
    window_start: usize,
    window_end: usize,
    anchor_lengths: &[usize],
) -> Option<MatchCandidate> {
    let words: Vec<&str> = segment.split(' ').filter(|w| !w.is_empty()).collect();
    if words.is_empty() || window_start >= window_end {
        return None;
    }
    let window = &reference[window_start..window_end];

    let mut tried: Vec<usize> = Vec::with_capacity(anchor_lengths.len());
    for &requested in anchor_lengths {
        let take = requested.min(words.len());
        if take == 0 || tried.contains(&take) {
            continue;
        }
        tried.push(take);

        let anchor = words[..take].join(" ");
        let positions = find_all(window, &anchor);
        if positions.is_empty() {
            continue;
        }

        let start = if positions.len() == 1 {
            positions[0]
        } else {
            best_occurrence(segment, reference, window_start, &positions, window_start)
        };
        tracing::debug!(
            anchor = anchor.as_str(),
            anchor_words = take,
            occurrences = positions.len(),
            offset = window_start + start,
            "anchor located in search window"
        );
        return Some(MatchCandidate {
            anchor_len: take,
            start: window_start + start,
            end: None,
            score: None,
            method: MatchMethod::Anchor(take),
        });
    }
    None
}

/// Every occurrence of `needle` in `haystack`, overlapping occurrences included.
fn find_all(haystack: &str, needle: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut from = 0usize;
    while from < haystack.len() {
        let Some(found) = haystack[from..].find(needle) else {
            break;
        };
        let at = from + found;
        positions.push(at);
        let step = haystack[at..].chars().next().map_or(1, char::len_utf8);
        from = at + step;
    }
    positions
}

/// Pick the occurrence whose following reference slice reads most like the
/// segment; ties go to the occurrence nearest `hint`.
fn best_occurrence(
    segment: &str,
    reference: &str,
    window_start: usize,
    positions: &[usize],
    hint: usize,
) -> usize {
    let compare_len = if segment.len() < 10 { 50 } else { segment.len() };
    let mut best_score = 0.0f64;
    let mut best_pos = positions[0];
    for &pos in positions {
        let test_start = window_start + pos;
        let test_end = floor_char_boundary(reference, (test_start + compare_len).min(reference.len()));
        let score = similarity_ratio(segment, &reference[test_start..test_end]);
        if score > best_score + SCORE_TIE_EPSILON {
            best_score = score;
            best_pos = pos;
        } else if (score - best_score).abs() <= SCORE_TIE_EPSILON {
            let current_distance = (window_start + pos).abs_diff(hint);
            let best_distance = (window_start + best_pos).abs_diff(hint);
            if current_distance < best_distance {
                best_score = score;
                best_pos = pos;
            }
        }
    }
    best_pos
}

/// Sliding-window fuzzy locator, used only when every exact anchor fails.
///
/// A strided coarse scan finds the best-scoring window position; if it clears
/// [`FUZZY_ACCEPT_RATIO`], a refinement pass around it picks the exact span.
/// The returned candidate carries its resolved end and score.
pub(crate) fn find_fuzzy(
    segment: &str,
    reference: &str,
    window_start: usize,
    window_end: usize,
) -> Option<MatchCandidate> {
    if window_start >= window_end {
        return None;
    }
    let window = &reference[window_start..window_end];
    let (coarse_pos, coarse_score) = sliding_window_scan(segment, window)?;
    tracing::debug!(
        offset = window_start + coarse_pos,
        score = format!("{coarse_score:.3}"),
        "fuzzy coarse scan accepted"
    );

    let seg_len = segment.len();
    let abs_start = window_start + coarse_pos;
    let refine_lo = abs_start.saturating_sub(REFINE_BACKWARD_BYTES).max(window_start);
    let refine_hi = (abs_start + REFINE_FORWARD_BYTES).min(window_end);
    let min_len = (seg_len * 9 / 10).max(1);
    let max_len = seg_len * 11 / 10;

    let mut best_ratio = 0.0f64;
    let mut best_start = abs_start;
    let mut best_end = floor_char_boundary(reference, (abs_start + seg_len).min(reference.len()));
    for test_start in refine_lo..refine_hi {
        if !reference.is_char_boundary(test_start) {
            continue;
        }
        let at_word_boundary =
            test_start == 0 || reference[..test_start].ends_with(' ');
        for test_len in min_len..=max_len {
            let test_end = test_start + test_len;
            if test_end > reference.len() {
                break;
            }
            if !reference.is_char_boundary(test_end) {
                continue;
            }
            let mut ratio = similarity_ratio(segment, &reference[test_start..test_end]);
            if at_word_boundary {
                ratio += WORD_BOUNDARY_BONUS;
            }
            if ratio > best_ratio {
                best_ratio = ratio;
                best_start = test_start;
                best_end = test_end;
            }
        }
    }

    Some(MatchCandidate {
        anchor_len: 0,
        start: best_start,
        end: Some(best_end),
        score: Some(best_ratio.min(1.0)),
        method: MatchMethod::Fuzzy,
    })
}

fn sliding_window_scan(segment: &str, region: &str) -> Option<(usize, f64)> {
    let seg_len = segment.len();
    if seg_len == 0 || region.len() < seg_len {
        return None;
    }
    let step = (seg_len / 10).max(1);
    let window_len = if seg_len < 50 {
        seg_len * 12 / 10
    } else {
        seg_len * 115 / 100
    };

    let mut best_score = 0.0f64;
    let mut best_pos = None;
    let mut at = 0usize;
    while at + seg_len <= region.len() {
        if region.is_char_boundary(at) {
            let end = floor_char_boundary(region, (at + window_len).min(region.len()));
            let score = similarity_ratio(segment, &region[at..end]);
            if score > best_score {
                best_score = score;
                best_pos = Some(at);
                if score >= FUZZY_EARLY_EXIT_RATIO {
                    return Some((at, score));
                }
            }
        }
        at += step;
    }

    match best_pos {
        Some(pos) if best_score >= FUZZY_ACCEPT_RATIO => Some((pos, best_score)),
        _ => None,
    }
}
