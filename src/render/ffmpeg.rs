use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{anyhow, Result};

use crate::render::style::{FitMode, RenderStyle};

/// Build the reframe filtergraph for one clip.
///
/// `Cover` center-crops into the vertical frame; `BlurPad` letterboxes the
/// full frame over a blurred, zoomed copy of itself. The subtitle burn is
/// appended to whichever chain is chosen.
pub(super) fn build_reframe_filter(style: &RenderStyle, ass_path: Option<&Path>) -> String {
    let w = style.target_width;
    let h = style.target_height;

    let mut filter = match style.fit {
        FitMode::Cover => format!(
            "scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h},setsar=1"
        ),
        FitMode::BlurPad => format!(
            "split=2[bg][fg];\
             [bg]scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h},boxblur=24:4[blurred];\
             [fg]scale={w}:{h}:force_original_aspect_ratio=decrease[inset];\
             [blurred][inset]overlay=(W-w)/2:(H-h)/2,setsar=1"
        ),
    };

    if let Some(path) = ass_path {
        let escaped = escape_filter_path(path);
        filter.push_str(&format!(",subtitles=filename='{escaped}':charenc=UTF-8"));
    }

    filter
}

/// Cut `[start, end)` out of the source, reframe, and burn captions.
///
/// When a narration reference is present its audio replaces the source audio
/// (the localized voice-over is the clip's voice).
pub(super) fn cut_and_reframe(
    ffmpeg: &Path,
    source: &Path,
    output: &Path,
    start_secs: f64,
    end_secs: f64,
    style: &RenderStyle,
    ass_path: Option<&Path>,
    narration_ref: Option<&str>,
) -> Result<()> {
    let duration = end_secs - start_secs;
    if duration < 0.1 {
        return Err(anyhow!("clip range is too short to render"));
    }

    let filter = build_reframe_filter(style, ass_path);

    let mut cmd = Command::new(ffmpeg);
    cmd.arg("-y")
        .arg("-ss")
        .arg(format!("{start_secs:.3}"))
        .arg("-t")
        .arg(format!("{duration:.3}"))
        .arg("-i")
        .arg(source);
    if let Some(narration) = narration_ref {
        cmd.arg("-i").arg(narration);
    }
    // The graph has one input and one output, so it rides on -vf and the
    // stream maps below stay in charge of selection.
    cmd.arg("-vf").arg(&filter);
    cmd.arg("-map").arg("0:v:0");
    if narration_ref.is_some() {
        cmd.arg("-map").arg("1:a:0").arg("-shortest");
    } else {
        cmd.arg("-map").arg("0:a:0");
    }
    cmd.args([
        "-c:v",
        "libx264",
        "-preset",
        "veryfast",
        "-crf",
        "20",
        "-pix_fmt",
        "yuv420p",
        "-c:a",
        "aac",
        "-b:a",
        "160k",
        "-movflags",
        "+faststart",
    ])
    .arg(output);

    run_ffmpeg(cmd)
}

/// Render the trailing call-to-action card: a solid background with centered
/// text and silent audio, so concat sees matching streams.
pub(super) fn render_cta_card(ffmpeg: &Path, output: &Path, style: &RenderStyle) -> Result<()> {
    let cta = &style.cta;
    if cta.duration_secs <= 0.0 {
        return Err(anyhow!("CTA duration must be positive"));
    }

    let color_source = format!(
        "color=c=0x{}:s={}x{}:d={:.3}",
        cta.background_color.trim_start_matches('#'),
        style.target_width,
        style.target_height,
        cta.duration_secs,
    );
    let drawtext = format!(
        "drawtext=text='{}':fontcolor=white:fontsize={}:x=(w-text_w)/2:y=(h-text_h)/2",
        escape_drawtext(&cta.text),
        cta.font_size,
    );

    let mut cmd = Command::new(ffmpeg);
    cmd.arg("-y")
        .args(["-f", "lavfi", "-i"])
        .arg(&color_source)
        .args(["-f", "lavfi", "-i", "anullsrc=r=48000:cl=stereo"])
        .arg("-vf")
        .arg(&drawtext)
        .arg("-t")
        .arg(format!("{:.3}", cta.duration_secs))
        .args([
            "-c:v",
            "libx264",
            "-preset",
            "veryfast",
            "-pix_fmt",
            "yuv420p",
            "-c:a",
            "aac",
            "-shortest",
        ])
        .arg(output);

    run_ffmpeg(cmd)
}

/// Concatenate the clip body and the CTA card into the final artifact.
pub(super) fn concat_segments(ffmpeg: &Path, body: &Path, cta: &Path, output: &Path) -> Result<()> {
    let mut cmd = Command::new(ffmpeg);
    cmd.arg("-y")
        .arg("-i")
        .arg(body)
        .arg("-i")
        .arg(cta)
        .args([
            "-filter_complex",
            "[0:v][0:a][1:v][1:a]concat=n=2:v=1:a=1[v][a]",
            "-map",
            "[v]",
            "-map",
            "[a]",
            "-c:v",
            "libx264",
            "-preset",
            "veryfast",
            "-pix_fmt",
            "yuv420p",
            "-c:a",
            "aac",
            "-movflags",
            "+faststart",
        ])
        .arg(output);

    run_ffmpeg(cmd)
}

fn run_ffmpeg(mut cmd: Command) -> Result<()> {
    let output = cmd
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|err| anyhow!("failed to start ffmpeg: {err}"))?;

    if output.status.success() {
        return Ok(());
    }

    // Surface only the tail of stderr; ffmpeg front-loads pages of banner.
    let stderr = String::from_utf8_lossy(&output.stderr);
    let mut tail: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .rev()
        .take(4)
        .collect();
    tail.reverse();
    if tail.is_empty() {
        Err(anyhow!("ffmpeg exited with an error"))
    } else {
        Err(anyhow!("ffmpeg: {}", tail.join(" | ")))
    }
}

fn escape_filter_path(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    let mut escaped = String::with_capacity(normalized.len() + 12);
    for ch in normalized.chars() {
        match ch {
            ':' => escaped.push_str("\\:"),
            '\'' => escaped.push_str("\\'"),
            ',' => escaped.push_str("\\,"),
            ';' => escaped.push_str("\\;"),
            '[' => escaped.push_str("\\["),
            ']' => escaped.push_str("\\]"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// drawtext treats `:`/`'`/`\`/`%` as syntax; apostrophes become typographic
/// so the text survives without a quoting ladder.
fn escape_drawtext(text: &str) -> String {
    text.replace('\\', "")
        .replace('\'', "\u{2019}")
        .replace(':', "\\:")
        .replace('%', "\\%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_cover_filter_crops_to_target() {
        let style = RenderStyle::default();
        let filter = build_reframe_filter(&style, None);
        assert!(filter.contains("crop=1080:1920"));
        assert!(!filter.contains("subtitles"));
    }

    #[test]
    fn test_blur_pad_filter_overlays_inset() {
        let style = RenderStyle {
            fit: FitMode::BlurPad,
            ..Default::default()
        };
        let filter = build_reframe_filter(&style, None);
        assert!(filter.contains("boxblur"));
        assert!(filter.contains("overlay=(W-w)/2:(H-h)/2"));
    }

    #[test]
    fn test_subtitle_path_is_escaped_into_filter() {
        let style = RenderStyle::default();
        let path = PathBuf::from("/tmp/it's, a [dir]/caps.ass");
        let filter = build_reframe_filter(&style, Some(&path));
        assert!(filter.contains("subtitles=filename="));
        assert!(filter.contains("\\'"));
        assert!(filter.contains("\\["));
    }

    #[test]
    fn test_drawtext_escaping() {
        assert_eq!(escape_drawtext("don't: 100%"), "don\u{2019}t\\: 100\\%");
    }
}
