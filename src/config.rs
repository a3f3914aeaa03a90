use std::env;
use std::path::PathBuf;

use crate::render::RenderStyle;

/// Studio-level configuration: tool locations, working directories, and the
/// orchestrator's scheduling knobs.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    /// Scratch area for sampled frames and intermediate render files.
    pub scratch_dir: PathBuf,
    /// Finished clip artifacts live here until cleanup removes them.
    pub output_dir: PathBuf,
    /// Seconds between sampled frames during discovery.
    pub frame_interval_secs: f64,
    /// Fixed size of the render worker pool, independent of operation size.
    pub worker_count: usize,
    /// Extra attempts after the first failure of a retryable job.
    pub max_retries: u32,
    /// Base delay for exponential retry backoff.
    pub backoff_base_secs: f64,
    pub style: RenderStyle,
}

impl Default for StudioConfig {
    fn default() -> Self {
        let scratch_dir = env::temp_dir().join("clipcast");
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            output_dir: scratch_dir.join("clips"),
            scratch_dir,
            frame_interval_secs: 10.0,
            worker_count: 4,
            max_retries: 2,
            backoff_base_secs: 2.0,
            style: RenderStyle::default(),
        }
    }
}
