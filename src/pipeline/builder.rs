use crate::alignment::reference::ReferenceDocument;
use crate::config::CorrectorConfig;
use crate::error::CorrectionError;
use crate::pipeline::defaults::{BlockMatchScorer, WindowedAnchorLocator};
use crate::pipeline::runtime::{SubtitleCorrector, SubtitleCorrectorParts};
use crate::pipeline::traits::{AnchorLocator, SimilarityScorer};

pub struct SubtitleCorrectorBuilder {
    config: CorrectorConfig,
    anchor_locator: Option<Box<dyn AnchorLocator>>,
    scorer: Option<Box<dyn SimilarityScorer>>,
}

impl SubtitleCorrectorBuilder {
    pub fn new(config: CorrectorConfig) -> Self {
        Self {
            config,
            anchor_locator: None,
            scorer: None,
        }
    }

    pub fn with_anchor_locator(mut self, anchor_locator: Box<dyn AnchorLocator>) -> Self {
        self.anchor_locator = Some(anchor_locator);
        self
    }

    pub fn with_scorer(mut self, scorer: Box<dyn SimilarityScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    /// Validate the configuration, normalize the reference once, and assemble
    /// the corrector. Fails before any segment is processed.
    pub fn build(self, reference_text: &str) -> Result<SubtitleCorrector, CorrectionError> {
        self.config.validate()?;
        let reference = ReferenceDocument::new(reference_text)?;
        let anchor_locator = self
            .anchor_locator
            .unwrap_or_else(|| Box::new(WindowedAnchorLocator::from_config(&self.config)));
        Ok(SubtitleCorrector::from_parts(SubtitleCorrectorParts {
            reference,
            anchor_locator,
            scorer: self.scorer.unwrap_or_else(|| Box::new(BlockMatchScorer)),
            config: self.config,
        }))
    }
}
