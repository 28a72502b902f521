use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use subalign_rs::{CorrectionStats, Segment};

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub generated_at: String,
    pub srt_path: String,
    pub reference_path: String,
    pub threshold: f64,
    pub window_size: usize,
    pub fuzzy_fallback: bool,
    pub total: usize,
    pub matched_count: usize,
    pub fuzzy_count: usize,
    pub correction_rate: f64,
    pub segments: Vec<SegmentRow>,
}

#[derive(Debug, Serialize)]
pub struct SegmentRow {
    pub index: u32,
    pub matched: bool,
    pub score: f64,
    pub method: Option<String>,
    pub changed: bool,
}

pub struct RunContext<'a> {
    pub srt_path: &'a Path,
    pub reference_path: &'a Path,
    pub threshold: f64,
    pub window_size: usize,
    pub fuzzy_fallback: bool,
}

pub fn build_report(
    context: &RunContext<'_>,
    segments: &[Segment],
    stats: &CorrectionStats,
) -> RunReport {
    RunReport {
        generated_at: Utc::now().to_rfc3339(),
        srt_path: context.srt_path.display().to_string(),
        reference_path: context.reference_path.display().to_string(),
        threshold: context.threshold,
        window_size: context.window_size,
        fuzzy_fallback: context.fuzzy_fallback,
        total: stats.total,
        matched_count: stats.matched_count,
        fuzzy_count: stats.fuzzy_count,
        correction_rate: stats.correction_rate,
        segments: segments
            .iter()
            .map(|segment| SegmentRow {
                index: segment.index,
                matched: segment.matched,
                score: segment.score,
                method: segment.method.map(|m| m.label()),
                changed: segment.corrected_text != segment.original_text,
            })
            .collect(),
    }
}

pub fn write_report(path: &Path, report: &RunReport) -> Result<(), String> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|err| format!("serializing run report: {err}"))?;
    std::fs::write(path, json)
        .map_err(|err| format!("writing run report to {}: {err}", path.display()))
}
