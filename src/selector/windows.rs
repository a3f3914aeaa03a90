use crate::models::{CandidateWindow, FrameSample, TranscriptSegment, WindowFeatures};
use crate::selector::config::SelectorConfig;
use crate::selector::scoring::{count_emotion_markers, count_hook_markers};

/// A sentence-complete span of speech. Window edges only ever land on
/// utterance boundaries, so no clip starts or ends mid-thought.
#[derive(Debug, Clone)]
pub struct Utterance {
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
    pub confidence: f64,
}

/// Merge transcript segments into utterances: a segment that does not end in
/// terminal punctuation is folded into its successor.
pub fn build_utterances(segments: &[TranscriptSegment]) -> Vec<Utterance> {
    let mut utterances = Vec::new();
    let mut current: Option<Utterance> = None;

    for segment in segments {
        match &mut current {
            Some(utterance) => {
                utterance.text.push(' ');
                utterance.text.push_str(segment.text.trim());
                utterance.end_time = segment.end_time;
                // Running mean keeps the confidence roughly per-word fair.
                utterance.confidence = (utterance.confidence + segment.confidence) / 2.0;
            }
            None => {
                current = Some(Utterance {
                    start_time: segment.start_time,
                    end_time: segment.end_time,
                    text: segment.text.trim().to_string(),
                    confidence: segment.confidence,
                });
            }
        }

        if ends_sentence(&segment.text) {
            if let Some(utterance) = current.take() {
                utterances.push(utterance);
            }
        }
    }

    // Trailing speech without closing punctuation still forms an utterance.
    if let Some(utterance) = current {
        utterances.push(utterance);
    }

    utterances
}

fn ends_sentence(text: &str) -> bool {
    matches!(
        text.trim_end().chars().last(),
        Some('.') | Some('!') | Some('?') | Some('…')
    )
}

/// Slide duration-bounded windows across the utterance timeline.
///
/// Start anchors advance by at least the configured stride; for each anchor,
/// one candidate is emitted per utterance-aligned end point whose duration
/// falls inside `[min_duration, max_duration]`.
pub fn build_candidate_windows(
    segments: &[TranscriptSegment],
    frames: &[FrameSample],
    config: &SelectorConfig,
) -> Vec<CandidateWindow> {
    let utterances = build_utterances(segments);
    if utterances.is_empty() {
        return Vec::new();
    }

    let mut windows = Vec::new();
    let mut last_anchor = f64::NEG_INFINITY;

    for start_idx in 0..utterances.len() {
        let anchor = &utterances[start_idx];
        if anchor.start_time - last_anchor < config.stride_secs {
            continue;
        }
        last_anchor = anchor.start_time;

        for end_idx in start_idx..utterances.len() {
            let duration = utterances[end_idx].end_time - anchor.start_time;
            if duration > config.max_duration_secs {
                break;
            }
            if duration < config.min_duration_secs {
                continue;
            }
            windows.push(make_window(
                &utterances[start_idx..=end_idx],
                frames,
            ));
        }
    }

    windows
}

fn make_window(span: &[Utterance], frames: &[FrameSample]) -> CandidateWindow {
    let start_time = span[0].start_time;
    let end_time = span[span.len() - 1].end_time;
    let text = span
        .iter()
        .map(|utterance| utterance.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let duration = (end_time - start_time).max(f64::EPSILON);
    let word_count = text.split_whitespace().count();
    let question_count = text.matches('?').count();

    let mean_confidence = span
        .iter()
        .map(|utterance| utterance.confidence)
        .sum::<f64>()
        / span.len() as f64;

    let frame_count = frames
        .iter()
        .filter(|frame| frame.timestamp >= start_time && frame.timestamp < end_time)
        .count();

    let features = WindowFeatures {
        word_count,
        speech_density: word_count as f64 / duration,
        hook_marker_count: count_hook_markers(&text),
        emotion_marker_count: count_emotion_markers(&text),
        question_count,
        has_payoff: has_payoff(&text),
        mean_confidence,
        frame_count,
    };

    CandidateWindow {
        start_time,
        end_time,
        text,
        features,
    }
}

/// Question raised early, answered late: a '?' in the first half of the text
/// with declarative material after the last question.
fn has_payoff(text: &str) -> bool {
    let Some(last_question) = text.rfind('?') else {
        return false;
    };
    let first_question = text.find('?').unwrap_or(last_question);
    let followup = text[last_question + 1..].trim();
    first_question < text.len() / 2 && followup.split_whitespace().count() >= 4
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: f64, end: f64, text: &str) -> TranscriptSegment {
        TranscriptSegment {
            start_time: start,
            end_time: end,
            text: text.to_string(),
            confidence: 0.9,
        }
    }

    #[test]
    fn test_utterances_merge_until_terminal_punctuation() {
        let segments = vec![
            seg(0.0, 2.0, "So here is the thing"),
            seg(2.0, 4.0, "nobody ever tells you."),
            seg(4.0, 6.0, "It matters!"),
        ];

        let utterances = build_utterances(&segments);
        assert_eq!(utterances.len(), 2);
        assert_eq!(
            utterances[0].text,
            "So here is the thing nobody ever tells you."
        );
        assert!((utterances[0].end_time - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_edges_align_to_utterance_boundaries() {
        let segments = vec![
            seg(0.0, 6.0, "First complete sentence right here."),
            seg(6.0, 13.0, "Second complete sentence follows now."),
            seg(13.0, 21.0, "Third one closes out the block."),
        ];
        let config = SelectorConfig {
            min_duration_secs: 10.0,
            max_duration_secs: 25.0,
            stride_secs: 1.0,
            ..Default::default()
        };

        let windows = build_candidate_windows(&segments, &[], &config);
        assert!(!windows.is_empty());

        let boundaries: Vec<f64> = vec![0.0, 6.0, 13.0, 21.0];
        for window in &windows {
            assert!(boundaries.iter().any(|b| (b - window.start_time).abs() < 1e-9));
            assert!(boundaries.iter().any(|b| (b - window.end_time).abs() < 1e-9));
            assert!(window.duration_secs() >= config.min_duration_secs);
            assert!(window.duration_secs() <= config.max_duration_secs);
        }
    }

    #[test]
    fn test_no_windows_from_empty_transcript() {
        let windows = build_candidate_windows(&[], &[], &SelectorConfig::default());
        assert!(windows.is_empty());
    }

    #[test]
    fn test_payoff_detection() {
        assert!(has_payoff(
            "Why does this keep happening? Because the default settings are wrong for you."
        ));
        assert!(!has_payoff("No questions in this one at all."));
    }
}
