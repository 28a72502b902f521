use crate::error::CorrectionError;

#[derive(Debug, Clone)]
pub struct CorrectorConfig {
    /// Minimum similarity ratio for a correction to be accepted.
    pub threshold: f64,
    /// Size in bytes of the normalized-reference search window per segment.
    pub window_size: usize,
    /// Word counts tried, in order, when building the exact start anchor.
    pub anchor_lengths: Vec<usize>,
    /// Enable the sliding-window fuzzy locator when every exact anchor fails.
    pub fuzzy_fallback: bool,
}

impl CorrectorConfig {
    pub const DEFAULT_THRESHOLD: f64 = 0.65;
    pub const DEFAULT_WINDOW_SIZE: usize = 3_000;
    pub const DEFAULT_ANCHOR_LENGTHS: [usize; 3] = [3, 2, 1];

    pub fn validate(&self) -> Result<(), CorrectionError> {
        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(CorrectionError::invalid_config(format!(
                "threshold must be within [0.0, 1.0], got {}",
                self.threshold
            )));
        }
        if self.window_size == 0 {
            return Err(CorrectionError::invalid_config(
                "window_size must be non-zero",
            ));
        }
        if self.anchor_lengths.is_empty() {
            return Err(CorrectionError::invalid_config(
                "anchor_lengths must not be empty",
            ));
        }
        if self.anchor_lengths.contains(&0) {
            return Err(CorrectionError::invalid_config(
                "anchor_lengths must not contain zero",
            ));
        }
        Ok(())
    }
}

impl Default for CorrectorConfig {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
            window_size: Self::DEFAULT_WINDOW_SIZE,
            anchor_lengths: Self::DEFAULT_ANCHOR_LENGTHS.to_vec(),
            fuzzy_fallback: false,
        }
    }
}
