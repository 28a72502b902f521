use crate::alignment::anchor::{find_exact_anchor, find_fuzzy};
use crate::alignment::reference::ReferenceDocument;
use crate::alignment::similarity::similarity_ratio;
use crate::config::CorrectorConfig;
use crate::pipeline::traits::{AnchorLocator, SimilarityScorer};
use crate::types::MatchCandidate;

/// Default locator: exact descending-length anchors inside the cursor-bounded
/// window, with an optional sliding-window fuzzy pass when they all miss.
pub struct WindowedAnchorLocator {
    anchor_lengths: Vec<usize>,
    fuzzy_fallback: bool,
}

impl WindowedAnchorLocator {
    pub fn new(anchor_lengths: Vec<usize>, fuzzy_fallback: bool) -> Self {
        Self {
            anchor_lengths,
            fuzzy_fallback,
        }
    }

    pub fn from_config(config: &CorrectorConfig) -> Self {
        Self::new(config.anchor_lengths.clone(), config.fuzzy_fallback)
    }
}

impl AnchorLocator for WindowedAnchorLocator {
    fn locate(
        &self,
        segment_normalized: &str,
        reference: &ReferenceDocument,
        window_start: usize,
        window_end: usize,
    ) -> Option<MatchCandidate> {
        if let Some(candidate) = find_exact_anchor(
            segment_normalized,
            reference.normalized(),
            window_start,
            window_end,
            &self.anchor_lengths,
        ) {
            return Some(candidate);
        }
        if self.fuzzy_fallback {
            return find_fuzzy(
                segment_normalized,
                reference.normalized(),
                window_start,
                window_end,
            );
        }
        None
    }
}

/// Default scorer: longest-common-block ratio over normalized bytes.
pub struct BlockMatchScorer;

impl SimilarityScorer for BlockMatchScorer {
    fn ratio(&self, a: &str, b: &str) -> f64 {
        similarity_ratio(a, b)
    }
}
