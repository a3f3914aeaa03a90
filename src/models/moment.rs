use serde::{Deserialize, Serialize};

/// Signals aggregated over one candidate window, fed to the scorer.
#[derive(Debug, Clone, Default)]
pub struct WindowFeatures {
    pub word_count: usize,
    /// Words per second of window duration.
    pub speech_density: f64,
    pub hook_marker_count: usize,
    pub emotion_marker_count: usize,
    pub question_count: usize,
    /// A question in the first half followed by declarative material after it.
    pub has_payoff: bool,
    pub mean_confidence: f64,
    /// Sampled frames that fall inside the window.
    pub frame_count: usize,
}

/// A scoring candidate: a time window anchored to utterance boundaries.
///
/// Ephemeral — consumed by scoring and selection, then discarded.
#[derive(Debug, Clone)]
pub struct CandidateWindow {
    pub start_time: f64,
    pub end_time: f64,
    /// Full transcript text inside the window.
    pub text: String,
    pub features: WindowFeatures,
}

impl CandidateWindow {
    pub fn duration_secs(&self) -> f64 {
        (self.end_time - self.start_time).max(0.0)
    }

    pub fn overlaps(&self, other: &CandidateWindow) -> bool {
        self.start_time < other.end_time && other.start_time < self.end_time
    }
}

/// A selected, scored clip candidate returned from discovery.
///
/// `index` is the identifier clients use to select moments for rendering; it
/// is stable within one discovery call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Moment {
    pub index: usize,
    pub start_time: f64,
    pub end_time: f64,
    /// Score in [0, 10].
    pub score: f64,
    pub hook: String,
    pub caption: String,
}

impl Moment {
    pub fn duration_secs(&self) -> f64 {
        (self.end_time - self.start_time).max(0.0)
    }

    pub fn overlaps(&self, other: &Moment) -> bool {
        self.start_time < other.end_time && other.start_time < self.end_time
    }
}
