use crate::alignment::boundary::extract_span;
use crate::alignment::cursor::AlignmentCursor;
use crate::alignment::normalize::{floor_char_boundary, normalize};
use crate::alignment::reference::ReferenceDocument;
use crate::config::CorrectorConfig;
use crate::error::CorrectionError;
use crate::pipeline::traits::{AnchorLocator, SimilarityScorer};
use crate::types::{CorrectionStats, MatchMethod, Segment, SegmentOutcome};

/// Span end search reaches at most this many segment-lengths past the anchor.
const END_SEARCH_FACTOR: usize = 3;

pub struct SubtitleCorrector {
    config: CorrectorConfig,
    reference: ReferenceDocument,
    anchor_locator: Box<dyn AnchorLocator>,
    scorer: Box<dyn SimilarityScorer>,
}

pub(crate) struct SubtitleCorrectorParts {
    pub config: CorrectorConfig,
    pub reference: ReferenceDocument,
    pub anchor_locator: Box<dyn AnchorLocator>,
    pub scorer: Box<dyn SimilarityScorer>,
}

impl SubtitleCorrector {
    pub(crate) fn from_parts(parts: SubtitleCorrectorParts) -> Self {
        Self {
            config: parts.config,
            reference: parts.reference,
            anchor_locator: parts.anchor_locator,
            scorer: parts.scorer,
        }
    }

    pub fn config(&self) -> &CorrectorConfig {
        &self.config
    }

    pub fn reference(&self) -> &ReferenceDocument {
        &self.reference
    }

    /// Start a correction pass. The session owns the alignment cursor; feed it
    /// segments in increasing index order.
    pub fn session(&self) -> CorrectionSession<'_> {
        CorrectionSession {
            corrector: self,
            cursor: AlignmentCursor::new(),
            last_index: None,
            total: 0,
            matched: 0,
            fuzzy: 0,
        }
    }

    /// Correct every segment in place and return aggregate statistics.
    ///
    /// Segment order is validated before the first segment is touched, so a
    /// non-monotonic input fails without partial output.
    pub fn correct_all(
        &self,
        segments: &mut [Segment],
    ) -> Result<CorrectionStats, CorrectionError> {
        validate_segment_order(segments)?;
        let mut session = self.session();
        for segment in segments.iter_mut() {
            session.correct_segment(segment)?;
        }
        Ok(session.finish())
    }
}

fn validate_segment_order(segments: &[Segment]) -> Result<(), CorrectionError> {
    for pair in segments.windows(2) {
        if pair[1].index <= pair[0].index {
            return Err(CorrectionError::invalid_input(format!(
                "segment indices must be strictly increasing: {} is followed by {}",
                pair[0].index, pair[1].index
            )));
        }
    }
    Ok(())
}

/// One pass over a segment sequence, carrying the cursor between segments.
pub struct CorrectionSession<'a> {
    corrector: &'a SubtitleCorrector,
    cursor: AlignmentCursor,
    last_index: Option<u32>,
    total: usize,
    matched: usize,
    fuzzy: usize,
}

impl CorrectionSession<'_> {
    pub fn correct_segment(
        &mut self,
        segment: &mut Segment,
    ) -> Result<SegmentOutcome, CorrectionError> {
        if let Some(last) = self.last_index {
            if segment.index <= last {
                return Err(CorrectionError::invalid_input(format!(
                    "segment indices must be strictly increasing: {} is followed by {}",
                    last, segment.index
                )));
            }
        }
        self.last_index = Some(segment.index);
        self.total += 1;

        let outcome = self.align(segment);
        if let SegmentOutcome::Corrected { method, .. } = outcome {
            self.matched += 1;
            if method == MatchMethod::Fuzzy {
                self.fuzzy += 1;
            }
        }
        Ok(outcome)
    }

    pub fn finish(self) -> CorrectionStats {
        CorrectionStats {
            total: self.total,
            matched_count: self.matched,
            fuzzy_count: self.fuzzy,
            correction_rate: if self.total == 0 {
                0.0
            } else {
                self.matched as f64 / self.total as f64
            },
        }
    }

    fn align(&mut self, segment: &mut Segment) -> SegmentOutcome {
        segment.corrected_text = segment.original_text.clone();
        segment.matched = false;
        segment.score = 0.0;
        segment.method = None;

        let (segment_normalized, _) = normalize(&segment.original_text);
        if segment_normalized.is_empty() {
            return SegmentOutcome::NotFound;
        }

        let reference = &self.corrector.reference;
        let reference_normalized = reference.normalized();
        let window_start = self.cursor.reference_offset();
        if window_start >= reference_normalized.len() {
            tracing::debug!(
                segment = segment.index,
                "cursor exhausted the reference; segment left unmatched"
            );
            return SegmentOutcome::NotFound;
        }
        let window_end = floor_char_boundary(
            reference_normalized,
            (window_start + self.corrector.config.window_size).min(reference_normalized.len()),
        );

        let Some(candidate) = self.corrector.anchor_locator.locate(
            &segment_normalized,
            reference,
            window_start,
            window_end,
        ) else {
            tracing::debug!(segment = segment.index, "no candidate in search window");
            return SegmentOutcome::NotFound;
        };

        let (span_end, score) = match (candidate.end, candidate.score) {
            (Some(end), Some(score)) => (end, score),
            _ => self.resolve_span_end(&segment_normalized, candidate.start, candidate.anchor_len),
        };
        let score = score.clamp(0.0, 1.0);
        segment.score = score;

        if score < self.corrector.config.threshold {
            tracing::debug!(
                segment = segment.index,
                score = format!("{score:.3}"),
                threshold = self.corrector.config.threshold,
                "candidate below threshold"
            );
            return SegmentOutcome::BelowThreshold { score };
        }

        let Some(corrected) = extract_span(reference, candidate.start, span_end) else {
            tracing::debug!(
                segment = segment.index,
                "matched span produced no usable reference text"
            );
            return SegmentOutcome::NotFound;
        };

        if candidate.method == MatchMethod::Fuzzy {
            tracing::warn!(
                segment = segment.index,
                score = format!("{score:.3}"),
                "correction accepted via fuzzy locator"
            );
        }
        tracing::debug!(
            segment = segment.index,
            method = candidate.method.label(),
            score = format!("{score:.3}"),
            span_start = candidate.start,
            span_end,
            "segment corrected"
        );

        segment.corrected_text = corrected;
        segment.matched = true;
        segment.method = Some(candidate.method);
        self.cursor.advance(span_end);
        SegmentOutcome::Corrected {
            method: candidate.method,
            score,
        }
    }

    /// Resolve where the matched span ends and how well it scores.
    ///
    /// An end anchor (the segment's last `anchor_len` words) is searched first
    /// within [`END_SEARCH_FACTOR`] segment-lengths of the start; failing
    /// that, every span length within ±50% of the segment length is scored
    /// and the best one wins.
    fn resolve_span_end(
        &self,
        segment_normalized: &str,
        start: usize,
        anchor_len: usize,
    ) -> (usize, f64) {
        let reference_normalized = self.corrector.reference.normalized();
        let scorer = &self.corrector.scorer;
        let segment_len = segment_normalized.len();
        let search_cap = floor_char_boundary(
            reference_normalized,
            (start + segment_len * END_SEARCH_FACTOR).min(reference_normalized.len()),
        );

        let words: Vec<&str> = segment_normalized.split(' ').collect();
        let take = anchor_len.clamp(1, words.len());
        let end_anchor = words[words.len() - take..].join(" ");
        if let Some(found) = reference_normalized[start..search_cap].find(&end_anchor) {
            let end = start + found + end_anchor.len();
            let score = scorer.ratio(segment_normalized, &reference_normalized[start..end]);
            return (end, score);
        }

        let min_len = (segment_len / 2).max(1);
        let max_len = (segment_len * 3 / 2).min(reference_normalized.len() - start);
        let mut best_score = 0.0f64;
        let mut best_end =
            floor_char_boundary(reference_normalized, (start + segment_len).min(reference_normalized.len()));
        for length in min_len..=max_len {
            let end = start + length;
            if !reference_normalized.is_char_boundary(end) {
                continue;
            }
            let score = scorer.ratio(segment_normalized, &reference_normalized[start..end]);
            if score > best_score {
                best_score = score;
                best_end = end;
            }
        }
        (best_end, best_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::builder::SubtitleCorrectorBuilder;

    const REFERENCE: &str = "It was a long road. Eventually Woz came to the same conclusion: \
he agreed with the plan. The reading list grew. \"Shakespeare, Plato. I loved King Lear.\" \
Nothing else mattered after that winter.";

    fn corrector(threshold: f64) -> SubtitleCorrector {
        let config = CorrectorConfig {
            threshold,
            ..CorrectorConfig::default()
        };
        SubtitleCorrectorBuilder::new(config)
            .build(REFERENCE)
            .unwrap()
    }

    fn segments() -> Vec<Segment> {
        vec![
            Segment::new(1, "00:00:01,000", "00:00:03,000", "It was a long road"),
            Segment::new(
                2,
                "00:00:03,200",
                "00:00:06,000",
                "eventually woz came to the same conclusion",
            ),
            Segment::new(
                3,
                "00:00:06,200",
                "00:00:09,000",
                "Shakespeare, Plato, I loved King Lear.",
            ),
        ]
    }

    #[test]
    fn corrects_segments_and_reports_stats() {
        let corrector = corrector(0.65);
        let mut segments = segments();
        let stats = corrector.correct_all(&mut segments).unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.matched_count, 3);
        assert_eq!(stats.fuzzy_count, 0);
        assert!((stats.correction_rate - 1.0).abs() < 1e-9);

        assert_eq!(segments[0].corrected_text, "It was a long road.");
        assert_eq!(
            segments[2].corrected_text,
            "\"Shakespeare, Plato. I loved King Lear.\""
        );
        for segment in &segments {
            assert!(segment.matched);
            assert!(segment.score >= 0.65);
        }
    }

    #[test]
    fn timestamps_never_change() {
        let corrector = corrector(0.65);
        let mut corrected = segments();
        corrector.correct_all(&mut corrected).unwrap();
        for (before, after) in segments().iter().zip(&corrected) {
            assert_eq!(before.start_time, after.start_time);
            assert_eq!(before.end_time, after.end_time);
            assert_eq!(before.index, after.index);
        }
    }

    #[test]
    fn runs_are_idempotent() {
        let corrector = corrector(0.65);
        let mut first = segments();
        let stats_first = corrector.correct_all(&mut first).unwrap();
        let mut second = first.clone();
        let stats_second = corrector.correct_all(&mut second).unwrap();
        assert_eq!(first, second);
        assert_eq!(stats_first, stats_second);
    }

    #[test]
    fn unmatched_segment_preserved_and_cursor_held() {
        let corrector = corrector(0.65);
        let mut segments = vec![
            Segment::new(1, "00:00:01,000", "00:00:02,000", "waz came to the same conclusion"),
            Segment::new(2, "00:00:02,200", "00:00:04,000", "It was a long road"),
        ];
        let stats = corrector.correct_all(&mut segments).unwrap();
        // The misrecognized first word defeats every exact anchor.
        assert!(!segments[0].matched);
        assert_eq!(segments[0].corrected_text, segments[0].original_text);
        assert_eq!(segments[0].score, 0.0);
        // The cursor did not move, so the next segment still matches from the top.
        assert!(segments[1].matched);
        assert_eq!(segments[1].corrected_text, "It was a long road.");
        assert_eq!(stats.matched_count, 1);
    }

    #[test]
    fn fuzzy_fallback_recovers_bad_first_word() {
        let config = CorrectorConfig {
            fuzzy_fallback: true,
            ..CorrectorConfig::default()
        };
        let corrector = SubtitleCorrectorBuilder::new(config).build(REFERENCE).unwrap();
        let mut segments = vec![Segment::new(
            1,
            "00:00:01,000",
            "00:00:02,000",
            "waz came to the same conclusion",
        )];
        let stats = corrector.correct_all(&mut segments).unwrap();
        assert_eq!(stats.matched_count, 1);
        assert_eq!(stats.fuzzy_count, 1);
        assert_eq!(segments[0].method, Some(MatchMethod::Fuzzy));
        assert!(segments[0].corrected_text.contains("came to the same conclusion"));
    }

    #[test]
    fn exact_match_scores_one_and_accepts_at_threshold_one() {
        let corrector = corrector(1.0);
        let mut segments = vec![Segment::new(
            1,
            "00:00:01,000",
            "00:00:02,000",
            "eventually woz came to the same conclusion",
        )];
        corrector.correct_all(&mut segments).unwrap();
        assert!(segments[0].matched);
        assert!((segments[0].score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn threshold_boundary_accepts_at_equal_rejects_above() {
        // Work out the candidate's actual ratio, then pin thresholds around it.
        let probe = corrector(0.0);
        let mut segments = vec![Segment::new(
            1,
            "00:00:01,000",
            "00:00:02,000",
            "it was a long toad",
        )];
        probe.correct_all(&mut segments).unwrap();
        let ratio = segments[0].score;
        assert!(ratio > 0.0 && ratio < 1.0);

        let accept = corrector(ratio);
        let mut at_threshold = vec![Segment::new(
            1,
            "00:00:01,000",
            "00:00:02,000",
            "it was a long toad",
        )];
        accept.correct_all(&mut at_threshold).unwrap();
        assert!(at_threshold[0].matched);

        let reject = corrector((ratio + 1e-6).min(1.0));
        let mut above_threshold = vec![Segment::new(
            1,
            "00:00:01,000",
            "00:00:02,000",
            "it was a long toad",
        )];
        reject.correct_all(&mut above_threshold).unwrap();
        assert!(!above_threshold[0].matched);
        assert!((above_threshold[0].score - ratio).abs() < 1e-9);
    }

    #[test]
    fn accepted_offsets_are_monotonic() {
        let corrector = corrector(0.5);
        let mut session = corrector.session();
        let mut previous_offset = 0usize;
        for (i, text) in [
            "It was a long road",
            "eventually woz came to the same conclusion",
            "the reading list grew",
        ]
        .iter()
        .enumerate()
        {
            let mut segment = Segment::new(i as u32 + 1, "00:00:00,000", "00:00:00,500", *text);
            session.correct_segment(&mut segment).unwrap();
            assert!(session.cursor.reference_offset() >= previous_offset);
            previous_offset = session.cursor.reference_offset();
        }
    }

    #[test]
    fn non_monotonic_indices_abort_without_mutation() {
        let corrector = corrector(0.65);
        let mut segments = vec![
            Segment::new(2, "00:00:01,000", "00:00:02,000", "It was a long road"),
            Segment::new(1, "00:00:02,200", "00:00:04,000", "the reading list grew"),
        ];
        let err = corrector.correct_all(&mut segments).unwrap_err();
        assert!(matches!(err, CorrectionError::InvalidInput { .. }));
        for segment in &segments {
            assert!(!segment.matched);
            assert_eq!(segment.corrected_text, segment.original_text);
        }
    }

    #[test]
    fn empty_segment_text_is_not_found() {
        let corrector = corrector(0.0);
        let mut segments = vec![Segment::new(1, "00:00:01,000", "00:00:02,000", "...")];
        let stats = corrector.correct_all(&mut segments).unwrap();
        assert_eq!(stats.matched_count, 0);
        assert_eq!(segments[0].corrected_text, "...");
    }

    #[test]
    fn session_rejects_duplicate_index() {
        let corrector = corrector(0.65);
        let mut session = corrector.session();
        let mut a = Segment::new(5, "00:00:01,000", "00:00:02,000", "It was a long road");
        session.correct_segment(&mut a).unwrap();
        let mut b = Segment::new(5, "00:00:02,200", "00:00:03,000", "the reading list grew");
        assert!(session.correct_segment(&mut b).is_err());
    }
}
