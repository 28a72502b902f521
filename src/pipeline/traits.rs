use crate::alignment::reference::ReferenceDocument;
use crate::types::MatchCandidate;

pub trait AnchorLocator: Send + Sync {
    /// Find a candidate position for `segment_normalized` inside
    /// `reference.normalized()[window_start..window_end]`.
    fn locate(
        &self,
        segment_normalized: &str,
        reference: &ReferenceDocument,
        window_start: usize,
        window_end: usize,
    ) -> Option<MatchCandidate>;
}

pub trait SimilarityScorer: Send + Sync {
    /// Similarity ratio of two normalized strings, in [0, 1].
    fn ratio(&self, a: &str, b: &str) -> f64;
}
