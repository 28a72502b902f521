/// One timestamped subtitle entry.
///
/// Timecodes are opaque to the engine and are never rewritten; only
/// `corrected_text`, `matched` and `score` change during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub index: u32,
    pub start_time: String,
    pub end_time: String,
    pub original_text: String,
    pub corrected_text: String,
    pub matched: bool,
    /// Similarity ratio in [0, 1] of the best candidate span, 0 when none.
    pub score: f64,
    pub method: Option<MatchMethod>,
}

impl Segment {
    pub fn new(
        index: u32,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let text = text.into();
        Self {
            index,
            start_time: start_time.into(),
            end_time: end_time.into(),
            corrected_text: text.clone(),
            original_text: text,
            matched: false,
            score: 0.0,
            method: None,
        }
    }
}

/// How an accepted span was located in the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMethod {
    /// Exact search for the first `n` words of the segment.
    Anchor(usize),
    /// Sliding-window scan after every exact anchor failed.
    Fuzzy,
}

impl MatchMethod {
    pub fn label(&self) -> String {
        match self {
            Self::Anchor(words) => format!("anchor-{words}"),
            Self::Fuzzy => "fuzzy".to_string(),
        }
    }
}

/// Candidate position inside the normalized reference text.
///
/// `end` and `score` are filled by the fuzzy locator, which resolves the full
/// span itself; exact-anchor candidates leave them for the engine to resolve.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    pub anchor_len: usize,
    pub start: usize,
    pub end: Option<usize>,
    pub score: Option<f64>,
    pub method: MatchMethod,
}

/// Aggregate outcome of one correction run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CorrectionStats {
    pub total: usize,
    pub matched_count: usize,
    pub fuzzy_count: usize,
    pub correction_rate: f64,
}

/// Per-segment outcome, reported to callers driving segments one at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentOutcome {
    Corrected { method: MatchMethod, score: f64 },
    BelowThreshold { score: f64 },
    NotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_segment_starts_uncorrected() {
        let segment = Segment::new(1, "00:00:01,000", "00:00:02,500", "hello there");
        assert_eq!(segment.corrected_text, segment.original_text);
        assert!(!segment.matched);
        assert_eq!(segment.score, 0.0);
        assert!(segment.method.is_none());
    }

    #[test]
    fn method_labels() {
        assert_eq!(MatchMethod::Anchor(3).label(), "anchor-3");
        assert_eq!(MatchMethod::Fuzzy.label(), "fuzzy");
    }
}
