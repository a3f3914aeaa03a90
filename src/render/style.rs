use serde::{Deserialize, Serialize};

/// How a landscape source becomes a 9:16 frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FitMode {
    /// Center-crop to fill the vertical frame.
    Cover,
    /// Letterbox the full frame over a blurred, zoomed copy of itself.
    BlurPad,
}

/// Caption burn-in profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionStyle {
    pub font_family: String,
    pub font_size: u32,
    /// Hex RGB, e.g. "FFFFFF".
    pub primary_color: String,
    pub outline_color: String,
    pub outline_width: f64,
    /// Distance from the bottom edge, in pixels.
    pub margin_bottom: u32,
    pub max_chars_per_line: u32,
    /// Seconds each caption line stays on screen.
    pub secs_per_line: f64,
    pub all_caps: bool,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font_family: "Arial".into(),
            font_size: 64,
            primary_color: "FFFFFF".into(),
            outline_color: "000000".into(),
            outline_width: 3.0,
            margin_bottom: 220,
            max_chars_per_line: 24,
            secs_per_line: 2.4,
            all_caps: false,
        }
    }
}

/// Trailing call-to-action card appended after the clip body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CtaStyle {
    pub text: String,
    pub duration_secs: f64,
    pub font_size: u32,
    /// Hex RGB background of the card.
    pub background_color: String,
}

impl Default for CtaStyle {
    fn default() -> Self {
        Self {
            text: "Follow for more".into(),
            duration_secs: 2.5,
            font_size: 72,
            background_color: "101010".into(),
        }
    }
}

/// Full output style: target geometry, reframe strategy, caption and CTA
/// profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderStyle {
    pub target_width: u32,
    pub target_height: u32,
    pub fit: FitMode,
    pub caption: CaptionStyle,
    pub cta: CtaStyle,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            target_width: 1080,
            target_height: 1920,
            fit: FitMode::Cover,
            caption: CaptionStyle::default(),
            cta: CtaStyle::default(),
        }
    }
}
