mod ffmpeg;
pub mod style;
pub mod subtitles;

use std::fs;
use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

pub use style::{CaptionStyle, CtaStyle, FitMode, RenderStyle};
pub use subtitles::{build_ass_document, plan_caption_lines, CaptionLine};

use crate::config::StudioConfig;
use crate::error::ProviderError;
use crate::localize::LocalizedCopy;
use crate::log_info;

const ENABLE_LOGS: bool = true;

/// Everything needed to render one (moment, language) clip.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub source: PathBuf,
    pub start_time: f64,
    pub end_time: f64,
    pub copy: LocalizedCopy,
    pub output_path: PathBuf,
}

/// Clip production seam: reframe, caption burn, CTA, one finished file.
///
/// Implementations must be deterministic for identical inputs and must never
/// leave a partial file at the requested output path — that is what makes a
/// failed job safe to retry.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, request: &RenderRequest) -> Result<PathBuf, ProviderError>;
}

/// ffmpeg-backed renderer. Intermediate segments live in a per-invocation
/// scratch directory; the final concat is staged as `<output>.part` and
/// renamed into place only on success.
#[derive(Clone)]
pub struct ClipRenderer {
    ffmpeg_path: PathBuf,
    scratch_dir: PathBuf,
    style: RenderStyle,
}

impl ClipRenderer {
    pub fn new(config: &StudioConfig) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            scratch_dir: config.scratch_dir.clone(),
            style: config.style.clone(),
        }
    }

    fn render_blocking(&self, request: &RenderRequest) -> anyhow::Result<PathBuf> {
        let duration = request.end_time - request.start_time;
        let work_dir = self
            .scratch_dir
            .join("renders")
            .join(Uuid::new_v4().to_string());
        fs::create_dir_all(&work_dir)?;
        if let Some(parent) = request.output_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let lines = plan_caption_lines(&request.copy.caption, &self.style.caption, duration);
        let ass_path = match build_ass_document(
            &lines,
            &self.style.caption,
            self.style.target_width,
            self.style.target_height,
        ) {
            Some(document) => {
                let path = work_dir.join("captions.ass");
                fs::write(&path, document)?;
                Some(path)
            }
            None => None,
        };

        let body_path = work_dir.join("body.mp4");
        ffmpeg::cut_and_reframe(
            &self.ffmpeg_path,
            &request.source,
            &body_path,
            request.start_time,
            request.end_time,
            &self.style,
            ass_path.as_deref(),
            request.copy.narration_ref.as_deref(),
        )?;

        let cta_path = work_dir.join("cta.mp4");
        ffmpeg::render_cta_card(&self.ffmpeg_path, &cta_path, &self.style)?;

        // A leftover .part from a failed attempt is discarded, never resumed.
        let staged = request.output_path.with_extension("mp4.part");
        if staged.exists() {
            fs::remove_file(&staged)?;
        }
        ffmpeg::concat_segments(&self.ffmpeg_path, &body_path, &cta_path, &staged)?;
        fs::rename(&staged, &request.output_path)?;

        let _ = fs::remove_dir_all(&work_dir);

        log_info!(
            "rendered {:.1}s clip to {}",
            duration,
            request.output_path.display()
        );
        Ok(request.output_path.clone())
    }
}

#[async_trait]
impl Renderer for ClipRenderer {
    async fn render(&self, request: &RenderRequest) -> Result<PathBuf, ProviderError> {
        let renderer = self.clone();
        let request = request.clone();
        tokio::task::spawn_blocking(move || {
            renderer
                .render_blocking(&request)
                .map_err(classify_render_error)
        })
        .await
        .map_err(|err| ProviderError::Transient(format!("render worker join failed: {err}")))?
    }
}

/// Filesystem trouble is worth retrying; an ffmpeg failure is deterministic
/// for the same inputs, so retrying it would only repeat the failure.
fn classify_render_error(err: anyhow::Error) -> ProviderError {
    let is_io = err
        .chain()
        .any(|cause| cause.downcast_ref::<std::io::Error>().is_some());
    if is_io {
        ProviderError::Transient(format!("{err:#}"))
    } else {
        ProviderError::Terminal(format!("{err:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_io_failures_classify_as_transient() {
        let io_err = anyhow::Error::from(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk hiccup",
        ));
        assert!(classify_render_error(io_err).is_transient());
        assert!(!classify_render_error(anyhow!("ffmpeg: bad filter")).is_transient());
    }
}
