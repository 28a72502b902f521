pub mod alignment;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod srt;
pub mod types;

pub use alignment::cursor::AlignmentCursor;
pub use alignment::reference::ReferenceDocument;
pub use config::CorrectorConfig;
pub use error::CorrectionError;
pub use pipeline::builder::SubtitleCorrectorBuilder;
pub use pipeline::runtime::{CorrectionSession, SubtitleCorrector};
pub use pipeline::traits::{AnchorLocator, SimilarityScorer};
pub use types::{CorrectionStats, MatchCandidate, MatchMethod, Segment, SegmentOutcome};
