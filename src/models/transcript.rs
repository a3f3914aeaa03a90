use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One spoken segment of the source video's transcript.
///
/// Segments are ordered, non-overlapping, and immutable once extraction has
/// produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptSegment {
    /// Seconds from the start of the source.
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
    /// Transcription confidence in [0, 1].
    pub confidence: f64,
}

/// A single sampled frame written to the discovery call's scratch area.
#[derive(Debug, Clone)]
pub struct FrameSample {
    /// Seconds from the start of the source.
    pub timestamp: f64,
    pub path: PathBuf,
}
