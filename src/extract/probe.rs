use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{ClipError, ClipResult};
use crate::models::FrameSample;

/// Container-level facts about a source video.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub duration_secs: f64,
    pub width: i64,
    pub height: i64,
    pub has_audio: bool,
}

/// Thin wrapper over ffprobe/ffmpeg for discovery-time inspection.
pub struct MediaProbe {
    ffmpeg_path: PathBuf,
    ffprobe_path: PathBuf,
}

impl MediaProbe {
    pub fn new(ffmpeg_path: PathBuf, ffprobe_path: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
        }
    }

    /// Probe the source with ffprobe. An unreadable file or a file with no
    /// video stream is an input error.
    pub fn probe(&self, input: &Path) -> ClipResult<SourceInfo> {
        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(input)
            .output()
            .map_err(|err| ClipError::Input(format!("failed to execute ffprobe: {err}")))?;

        if !output.status.success() {
            return Err(ClipError::Input(format!(
                "ffprobe could not read {}: {}",
                input.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let json: serde_json::Value = serde_json::from_slice(&output.stdout)
            .map_err(|err| ClipError::Input(format!("unparseable ffprobe output: {err}")))?;

        let streams = json["streams"].as_array().cloned().unwrap_or_default();
        let video = streams
            .iter()
            .find(|s| s["codec_type"].as_str() == Some("video"))
            .ok_or_else(|| {
                ClipError::Input(format!("no video stream in {}", input.display()))
            })?;
        let has_audio = streams
            .iter()
            .any(|s| s["codec_type"].as_str() == Some("audio"));

        let duration_secs = json["format"]["duration"]
            .as_str()
            .and_then(|d| d.parse::<f64>().ok())
            .unwrap_or(0.0);

        Ok(SourceInfo {
            duration_secs,
            width: video["width"].as_i64().unwrap_or(0),
            height: video["height"].as_i64().unwrap_or(0),
            has_audio,
        })
    }

    /// Sample one downscaled frame every `interval_secs` into `out_dir`.
    ///
    /// The caller owns the scratch files; they are not tracked past the
    /// discovery call that requested them.
    pub fn sample_frames(
        &self,
        input: &Path,
        out_dir: &Path,
        interval_secs: f64,
    ) -> ClipResult<Vec<FrameSample>> {
        std::fs::create_dir_all(out_dir)?;
        let pattern = out_dir.join("frame_%04d.jpg");

        let status = Command::new(&self.ffmpeg_path)
            .arg("-i")
            .arg(input)
            .args([
                "-vf",
                &format!("fps=1/{interval_secs},scale=320:180"),
                "-q:v",
                "3",
                "-y",
            ])
            .arg(&pattern)
            .status()
            .map_err(|err| ClipError::Input(format!("failed to execute ffmpeg: {err}")))?;

        if !status.success() {
            return Err(ClipError::Input("ffmpeg frame sampling failed".into()));
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(out_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with("frame_") && name.ends_with(".jpg") {
                names.push(entry.path());
            }
        }
        names.sort();

        let samples = names
            .into_iter()
            .enumerate()
            .map(|(index, path)| FrameSample {
                timestamp: index as f64 * interval_secs,
                path,
            })
            .collect();

        Ok(samples)
    }
}
