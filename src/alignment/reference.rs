use crate::alignment::normalize::normalize;
use crate::error::CorrectionError;

/// The trusted reference text, normalized once at engine start.
#[derive(Debug, Clone)]
pub struct ReferenceDocument {
    raw: String,
    normalized: String,
    position_map: Vec<usize>,
}

impl ReferenceDocument {
    pub fn new(raw: impl Into<String>) -> Result<Self, CorrectionError> {
        let raw = raw.into();
        let (normalized, position_map) = normalize(&raw);
        if normalized.is_empty() {
            return Err(CorrectionError::invalid_input(
                "reference document contains no comparable text",
            ));
        }
        Ok(Self {
            raw,
            normalized,
            position_map,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Maps each normalized byte offset to the raw byte offset it came from.
    pub(crate) fn position_map(&self) -> &[usize] {
        &self.position_map
    }
}
