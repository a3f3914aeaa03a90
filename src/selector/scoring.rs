use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::models::CandidateWindow;
use crate::selector::config::SelectorConfig;

/// Words that tend to open a clip people keep watching.
const HOOK_MARKERS: &[&str] = &[
    "secret", "never", "nobody", "mistake", "why", "how", "truth", "biggest", "stop", "worst",
    "best", "free", "proven", "actually", "reason", "wrong",
];

const EMOTION_MARKERS: &[&str] = &[
    "amazing", "incredible", "insane", "crazy", "love", "hate", "shocking", "unbelievable",
    "terrified", "obsessed", "beautiful", "disaster", "wild",
];

pub fn count_hook_markers(text: &str) -> usize {
    count_markers(text, HOOK_MARKERS)
}

pub fn count_emotion_markers(text: &str) -> usize {
    count_markers(text, EMOTION_MARKERS)
}

fn count_markers(text: &str, markers: &[&str]) -> usize {
    text.split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|word| markers.contains(&word.as_str()))
        .count()
}

/// What a scoring capability returns for one candidate window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredWindow {
    /// Scalar in [0, 10].
    pub score: f64,
    pub hook: String,
    pub caption: String,
}

/// Scoring seam. The reference pipeline delegates this judgment to an
/// external reasoning provider, so it stays swappable behind one call.
#[async_trait]
pub trait MomentScorer: Send + Sync {
    async fn score(&self, window: &CandidateWindow) -> Result<ScoredWindow, ProviderError>;
}

/// Local scorer blending the window's transcript-derived signals into a
/// single scalar. Weights come from the selector config.
pub struct HeuristicScorer {
    config: SelectorConfig,
}

impl HeuristicScorer {
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    fn blend(&self, window: &CandidateWindow) -> f64 {
        let features = &window.features;

        let hook_signal = (features.hook_marker_count as f64 / 3.0).min(1.0);
        let emotion_signal = (features.emotion_marker_count as f64 / 3.0).min(1.0);
        let structure_signal = 0.5 * (features.question_count > 0) as u8 as f64
            + 0.5 * features.has_payoff as u8 as f64;
        // ~3.5 words/sec is brisk, engaged speech; slower trails off.
        let density_signal = (features.speech_density / 3.5).min(1.0);

        let blended = self.config.weight_hook * hook_signal
            + self.config.weight_emotion * emotion_signal
            + self.config.weight_structure * structure_signal
            + self.config.weight_density * density_signal;

        // Low-confidence transcription drags the score rather than zeroing it.
        let confidence_factor = 0.5 + 0.5 * features.mean_confidence.clamp(0.0, 1.0);

        (blended * confidence_factor * 10.0).clamp(0.0, 10.0)
    }
}

#[async_trait]
impl MomentScorer for HeuristicScorer {
    async fn score(&self, window: &CandidateWindow) -> Result<ScoredWindow, ProviderError> {
        Ok(ScoredWindow {
            score: self.blend(window),
            hook: pick_hook(&window.text),
            caption: pick_caption(&window.text),
        })
    }
}

/// First sentence carrying a hook marker or a question; falls back to the
/// opening sentence.
fn pick_hook(text: &str) -> String {
    let sentences = split_sentences(text);
    let chosen = sentences
        .iter()
        .find(|sentence| sentence.contains('?') || count_hook_markers(sentence) > 0)
        .or_else(|| sentences.first())
        .cloned()
        .unwrap_or_default();
    truncate_chars(&chosen, 90)
}

fn pick_caption(text: &str) -> String {
    let sentences = split_sentences(text);
    let mut caption = String::new();
    for sentence in sentences {
        if !caption.is_empty() && caption.chars().count() + sentence.chars().count() > 140 {
            break;
        }
        if !caption.is_empty() {
            caption.push(' ');
        }
        caption.push_str(&sentence);
    }
    truncate_chars(&caption, 160)
}

fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?' | '…') {
            let trimmed = current.trim().to_string();
            if !trimmed.is_empty() {
                sentences.push(trimmed);
            }
            current.clear();
        }
    }
    let trimmed = current.trim().to_string();
    if !trimmed.is_empty() {
        sentences.push(trimmed);
    }
    sentences
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Remote scoring provider: one JSON call per window against an external
/// reasoning endpoint.
pub struct RemoteScorer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScoreRequest<'a> {
    text: &'a str,
    start_time: f64,
    end_time: f64,
    word_count: usize,
    question_count: usize,
}

impl RemoteScorer {
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
        }
    }
}

#[async_trait]
impl MomentScorer for RemoteScorer {
    async fn score(&self, window: &CandidateWindow) -> Result<ScoredWindow, ProviderError> {
        let request = ScoreRequest {
            text: &window.text,
            start_time: window.start_time,
            end_time: window.end_time,
            word_count: window.features.word_count,
            question_count: window.features.question_count,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| ProviderError::Transient(format!("scoring request failed: {err}")))?;

        let status = response.status();
        if status.is_server_error() || status.as_u16() == 429 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Transient(format!(
                "scoring provider error ({status}): {body}"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Terminal(format!(
                "scoring provider rejected request ({status}): {body}"
            )));
        }

        let mut scored: ScoredWindow = response
            .json()
            .await
            .map_err(|err| ProviderError::Transient(format!("unparseable scoring reply: {err}")))?;
        scored.score = scored.score.clamp(0.0, 10.0);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WindowFeatures;

    fn window(text: &str, features: WindowFeatures) -> CandidateWindow {
        CandidateWindow {
            start_time: 0.0,
            end_time: 30.0,
            text: text.to_string(),
            features,
        }
    }

    #[test]
    fn test_marker_counting_ignores_punctuation_and_case() {
        assert_eq!(count_hook_markers("Why? The TRUTH, nobody knows."), 3);
        assert_eq!(count_emotion_markers("plain words only"), 0);
    }

    #[tokio::test]
    async fn test_hooky_window_outscores_flat_window() {
        let scorer = HeuristicScorer::new(SelectorConfig::default());

        let hooky = window(
            "Why does nobody talk about this mistake? Because the truth is uncomfortable.",
            WindowFeatures {
                word_count: 13,
                speech_density: 3.0,
                hook_marker_count: 3,
                emotion_marker_count: 1,
                question_count: 1,
                has_payoff: true,
                mean_confidence: 0.95,
                frame_count: 2,
            },
        );
        let flat = window(
            "And then we moved on to the next item on the list.",
            WindowFeatures {
                word_count: 12,
                speech_density: 1.2,
                hook_marker_count: 0,
                emotion_marker_count: 0,
                question_count: 0,
                has_payoff: false,
                mean_confidence: 0.95,
                frame_count: 2,
            },
        );

        let hooky_score = scorer.score(&hooky).await.unwrap();
        let flat_score = scorer.score(&flat).await.unwrap();

        assert!(hooky_score.score > flat_score.score);
        assert!(hooky_score.score <= 10.0);
        assert!(flat_score.score >= 0.0);
    }

    #[tokio::test]
    async fn test_hook_prefers_question_sentence() {
        let scorer = HeuristicScorer::new(SelectorConfig::default());
        let w = window(
            "Some setup first. Why does this matter? Here is the answer.",
            WindowFeatures::default(),
        );
        let scored = scorer.score(&w).await.unwrap();
        assert_eq!(scored.hook, "Why does this matter?");
    }
}
