pub mod probe;
pub mod transcript;

use std::path::{Path, PathBuf};

use uuid::Uuid;

pub use probe::{MediaProbe, SourceInfo};
pub use transcript::SrtTranscriptParser;

use crate::config::StudioConfig;
use crate::error::{ClipError, ClipResult};
use crate::models::{FrameSample, TranscriptSegment};
use crate::{log_info, log_warn};

const ENABLE_LOGS: bool = true;

/// Everything discovery needs from one pass over the source.
pub struct FeatureBundle {
    pub source: SourceInfo,
    pub segments: Vec<TranscriptSegment>,
    pub frames: Vec<FrameSample>,
}

/// Samples frames and loads the time-aligned transcript for a source video.
///
/// Transcription itself happens outside this crate; the extractor consumes
/// the SRT sidecar the transcription step leaves next to the source (or an
/// explicitly configured transcript path).
pub struct FeatureExtractor {
    probe: MediaProbe,
    parser: SrtTranscriptParser,
    scratch_dir: PathBuf,
    frame_interval_secs: f64,
    transcript_path: Option<PathBuf>,
}

impl FeatureExtractor {
    pub fn new(config: &StudioConfig) -> Self {
        Self {
            probe: MediaProbe::new(config.ffmpeg_path.clone(), config.ffprobe_path.clone()),
            parser: SrtTranscriptParser::new(),
            scratch_dir: config.scratch_dir.clone(),
            frame_interval_secs: config.frame_interval_secs,
            transcript_path: None,
        }
    }

    /// Use an explicit transcript file instead of the `<source>.srt` sidecar.
    pub fn with_transcript_path(mut self, path: PathBuf) -> Self {
        self.transcript_path = Some(path);
        self
    }

    pub fn extract(&self, source: &Path) -> ClipResult<FeatureBundle> {
        let info = self.probe.probe(source)?;
        if !info.has_audio {
            return Err(ClipError::Input(format!(
                "{} has no decodable audio track",
                source.display()
            )));
        }

        let transcript_path = match &self.transcript_path {
            Some(path) => path.clone(),
            None => source.with_extension("srt"),
        };
        let segments = self.parser.parse_file(&transcript_path)?;
        if segments.is_empty() {
            return Err(ClipError::Input(format!(
                "transcript {} contains no spoken segments",
                transcript_path.display()
            )));
        }

        // Frames are an optional signal; sampling failure degrades discovery
        // instead of aborting it.
        let frame_dir = self
            .scratch_dir
            .join("frames")
            .join(Uuid::new_v4().to_string());
        let frames = match self
            .probe
            .sample_frames(source, &frame_dir, self.frame_interval_secs)
        {
            Ok(frames) => frames,
            Err(err) => {
                log_warn!("frame sampling failed for {}: {err}", source.display());
                Vec::new()
            }
        };

        log_info!(
            "extracted {} transcript segments and {} frames from {}",
            segments.len(),
            frames.len(),
            source.display()
        );

        Ok(FeatureBundle {
            source: info,
            segments,
            frames,
        })
    }
}
