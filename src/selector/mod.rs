pub mod config;
pub mod scoring;
pub mod select;
pub mod windows;

use std::sync::Arc;

pub use config::SelectorConfig;
pub use scoring::{HeuristicScorer, MomentScorer, RemoteScorer, ScoredWindow};
pub use select::select_moments;
pub use windows::build_candidate_windows;

use crate::error::{ClipError, ClipResult};
use crate::models::{FrameSample, Moment, TranscriptSegment};
use crate::log_warn;

const ENABLE_LOGS: bool = true;

/// Turns a transcript (plus optional frame samples) into the ranked moment
/// list returned to the caller.
pub struct MomentSelector {
    config: SelectorConfig,
    scorer: Arc<dyn MomentScorer>,
}

impl MomentSelector {
    pub fn new(config: SelectorConfig, scorer: Arc<dyn MomentScorer>) -> Self {
        Self { config, scorer }
    }

    /// Window, score, and greedily select up to `count` non-overlapping
    /// moments. `max_duration` overrides the configured ceiling per call.
    pub async fn discover(
        &self,
        segments: &[TranscriptSegment],
        frames: &[FrameSample],
        count: usize,
        max_duration_secs: Option<f64>,
    ) -> ClipResult<Vec<Moment>> {
        let mut config = self.config.clone();
        if let Some(max) = max_duration_secs {
            config.max_duration_secs = max;
            config.min_duration_secs = config.min_duration_secs.min(max);
        }

        let candidates = build_candidate_windows(segments, frames, &config);
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        let candidate_count = candidates.len();

        let mut scored = Vec::with_capacity(candidate_count);
        let mut last_error = None;
        for window in candidates {
            match self.scorer.score(&window).await {
                Ok(result) => scored.push((window, result)),
                Err(err) => {
                    log_warn!(
                        "scoring failed for window [{:.1}s, {:.1}s): {err}",
                        window.start_time,
                        window.end_time
                    );
                    last_error = Some(err);
                }
            }
        }

        // Individual scoring failures just drop that candidate; a provider
        // that failed every single call is a discovery failure.
        if scored.is_empty() {
            if let Some(err) = last_error {
                return Err(ClipError::Input(format!(
                    "scoring failed for all {candidate_count} candidate windows: {err}"
                )));
            }
        }

        Ok(select_moments(scored, count))
    }
}
