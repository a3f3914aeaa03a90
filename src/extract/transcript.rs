use std::fs;
use std::path::Path;

use regex::Regex;

use crate::error::{ClipError, ClipResult};
use crate::models::TranscriptSegment;

/// Parser for time-aligned SRT transcripts sitting next to the source video.
pub struct SrtTranscriptParser {
    time_pattern: Regex,
    tag_pattern: Regex,
}

impl SrtTranscriptParser {
    pub fn new() -> Self {
        Self {
            time_pattern: Regex::new(
                r"(\d{2}):(\d{2}):(\d{2})[,.](\d{3}) --> (\d{2}):(\d{2}):(\d{2})[,.](\d{3})",
            )
            .unwrap(),
            // Styling tags like <font ...> and <i> carry no spoken content.
            tag_pattern: Regex::new(r"<[^>]+>").unwrap(),
        }
    }

    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> ClipResult<Vec<TranscriptSegment>> {
        let content = fs::read_to_string(path.as_ref()).map_err(|err| {
            ClipError::Input(format!(
                "failed to read transcript {}: {err}",
                path.as_ref().display()
            ))
        })?;
        self.parse_content(&content)
    }

    pub fn parse_content(&self, content: &str) -> ClipResult<Vec<TranscriptSegment>> {
        let mut segments = Vec::new();

        for block in content.replace("\r\n", "\n").split("\n\n") {
            if block.trim().is_empty() {
                continue;
            }
            if let Some(segment) = self.parse_block(block) {
                segments.push(segment);
            }
        }

        segments.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

        // Clamp any encoder sloppiness so downstream code can rely on the
        // non-overlap invariant.
        for i in 1..segments.len() {
            let prev_end = segments[i - 1].end_time;
            if segments[i].start_time < prev_end {
                segments[i].start_time = prev_end;
            }
        }
        segments.retain(|segment| segment.end_time > segment.start_time);

        Ok(segments)
    }

    fn parse_block(&self, block: &str) -> Option<TranscriptSegment> {
        let lines: Vec<&str> = block.lines().collect();
        if lines.len() < 2 {
            return None;
        }

        // First line is the cue index; the timecode may be on line one or two
        // depending on whether the index is present.
        let (time_line_idx, caps) = if let Some(caps) = self.time_pattern.captures(lines[0]) {
            (0, caps)
        } else if lines.len() >= 2 {
            (1, self.time_pattern.captures(lines[1])?)
        } else {
            return None;
        };

        let start_time = timecode_secs(&caps, 1)?;
        let end_time = timecode_secs(&caps, 5)?;

        let raw_text = lines[time_line_idx + 1..].join(" ");
        let text = self
            .tag_pattern
            .replace_all(&raw_text, "")
            .trim()
            .to_string();
        if text.is_empty() {
            return None;
        }

        Some(TranscriptSegment {
            start_time,
            end_time,
            text,
            confidence: 1.0,
        })
    }
}

impl Default for SrtTranscriptParser {
    fn default() -> Self {
        Self::new()
    }
}

fn timecode_secs(caps: &regex::Captures<'_>, base: usize) -> Option<f64> {
    let h: f64 = caps[base].parse().ok()?;
    let m: f64 = caps[base + 1].parse().ok()?;
    let s: f64 = caps[base + 2].parse().ok()?;
    let ms: f64 = caps[base + 3].parse().ok()?;
    Some(h * 3600.0 + m * 60.0 + s + ms / 1000.0)
}
