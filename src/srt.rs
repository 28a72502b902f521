//! SRT container parsing and formatting.
//!
//! Blocks are a numeric index line, a `HH:MM:SS,mmm --> HH:MM:SS,mmm`
//! timecode line, and one or more text lines, separated by blank lines.
//! Timecodes are carried as opaque strings and written back byte-for-byte.

use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::CorrectionError;
use crate::types::Segment;

lazy_static! {
    static ref TIMECODE_RE: Regex = Regex::new(
        r"^(\d{2}:\d{2}:\d{2},\d{3})\s*-->\s*(\d{2}:\d{2}:\d{2},\d{3})$"
    )
    .unwrap();
}

pub fn parse_srt(content: &str) -> Result<Vec<Segment>, CorrectionError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let content = content.replace("\r\n", "\n");

    let mut segments = Vec::new();
    for block in content.split("\n\n").map(str::trim).filter(|b| !b.is_empty()) {
        let mut lines = block.lines();
        let index_line = lines.next().unwrap_or_default().trim();
        let index: u32 = index_line.parse().map_err(|_| {
            CorrectionError::invalid_input(format!(
                "subtitle block {} has a non-numeric index line: {index_line:?}",
                segments.len() + 1
            ))
        })?;

        let timecode_line = lines.next().unwrap_or_default().trim();
        let captures = TIMECODE_RE.captures(timecode_line).ok_or_else(|| {
            CorrectionError::invalid_input(format!(
                "subtitle {index} has a malformed timecode line: {timecode_line:?}"
            ))
        })?;
        let start_time = captures[1].to_string();
        let end_time = captures[2].to_string();

        let text = lines.collect::<Vec<_>>().join("\n");
        let text = text.trim();
        if text.is_empty() {
            return Err(CorrectionError::invalid_input(format!(
                "subtitle {index} has no text lines"
            )));
        }

        segments.push(Segment::new(index, start_time, end_time, text));
    }

    if segments.is_empty() {
        return Err(CorrectionError::invalid_input(
            "no subtitle blocks found in input",
        ));
    }
    Ok(segments)
}

pub fn format_srt(segments: &[Segment]) -> String {
    let mut out = String::new();
    for segment in segments {
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            segment.index, segment.start_time, segment.end_time, segment.corrected_text
        ));
    }
    out
}

pub fn read_srt_file(path: &Path) -> Result<Vec<Segment>, CorrectionError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CorrectionError::io("reading subtitle file", e))?;
    parse_srt(&content)
}

pub fn write_srt_file(path: &Path, segments: &[Segment]) -> Result<(), CorrectionError> {
    std::fs::write(path, format_srt(segments))
        .map_err(|e| CorrectionError::io("writing subtitle file", e))
}
