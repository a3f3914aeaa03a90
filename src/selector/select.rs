use crate::models::{CandidateWindow, Moment};
use crate::selector::scoring::ScoredWindow;

/// Greedy non-overlap selection over scored candidates.
///
/// Highest score wins each round and evicts every candidate intersecting its
/// time range; ties break by earlier start so results are reproducible.
/// Returns fewer than `count` moments when the timeline cannot supply them —
/// under-fulfillment is a normal outcome, never padded.
pub fn select_moments(scored: Vec<(CandidateWindow, ScoredWindow)>, count: usize) -> Vec<Moment> {
    let mut remaining: Vec<(CandidateWindow, ScoredWindow)> = scored
        .into_iter()
        .filter(|(window, _)| window.duration_secs() > 0.0)
        .collect();

    remaining.sort_by(|(wa, sa), (wb, sb)| {
        sb.score
            .total_cmp(&sa.score)
            .then(wa.start_time.total_cmp(&wb.start_time))
    });

    let mut selected = Vec::new();
    while selected.len() < count && !remaining.is_empty() {
        let (window, scored) = remaining.remove(0);
        remaining.retain(|(other, _)| !other.overlaps(&window));
        selected.push((window, scored));
    }

    selected
        .into_iter()
        .enumerate()
        .map(|(index, (window, scored))| Moment {
            index,
            start_time: window.start_time,
            end_time: window.end_time,
            score: scored.score,
            hook: scored.hook,
            caption: scored.caption,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WindowFeatures;

    fn candidate(start: f64, end: f64, score: f64) -> (CandidateWindow, ScoredWindow) {
        (
            CandidateWindow {
                start_time: start,
                end_time: end,
                text: String::new(),
                features: WindowFeatures::default(),
            },
            ScoredWindow {
                score,
                hook: format!("hook {start}"),
                caption: format!("caption {start}"),
            },
        )
    }

    #[test]
    fn test_selected_moments_never_overlap() {
        let scored = vec![
            candidate(0.0, 30.0, 9.0),
            candidate(20.0, 50.0, 8.5),
            candidate(60.0, 90.0, 7.0),
            candidate(80.0, 110.0, 6.0),
        ];

        let moments = select_moments(scored, 4);
        assert_eq!(moments.len(), 2);
        for pair in moments.windows(2) {
            assert!(!pair[0].overlaps(&pair[1]));
        }
    }

    #[test]
    fn test_order_is_descending_score_with_stable_reindex() {
        let scored = vec![
            candidate(100.0, 130.0, 5.0),
            candidate(0.0, 30.0, 9.0),
            candidate(50.0, 80.0, 7.0),
        ];

        let moments = select_moments(scored, 3);
        assert_eq!(moments.len(), 3);
        assert!(moments[0].score >= moments[1].score);
        assert!(moments[1].score >= moments[2].score);
        for (i, moment) in moments.iter().enumerate() {
            assert_eq!(moment.index, i);
        }
    }

    #[test]
    fn test_ties_break_by_earlier_start() {
        let scored = vec![candidate(40.0, 60.0, 8.0), candidate(0.0, 20.0, 8.0)];

        let moments = select_moments(scored, 2);
        assert!((moments[0].start_time - 0.0).abs() < 1e-9);
        assert!((moments[1].start_time - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_under_fulfillment_returns_what_exists() {
        // Two disjoint high scorers, everything else overlapping them.
        let scored = vec![
            candidate(0.0, 30.0, 9.5),
            candidate(10.0, 40.0, 9.0),
            candidate(35.0, 65.0, 8.8),
            candidate(50.0, 80.0, 2.0),
        ];

        let moments = select_moments(scored, 3);
        assert!(moments.len() < 3);
        assert_eq!(moments.len(), 2);
        for moment in &moments {
            assert!(moment.duration_secs() > 0.0);
        }
    }

    #[test]
    fn test_zero_duration_candidates_are_discarded() {
        let scored = vec![candidate(10.0, 10.0, 9.9), candidate(0.0, 20.0, 1.0)];
        let moments = select_moments(scored, 2);
        assert_eq!(moments.len(), 1);
        assert!((moments[0].score - 1.0).abs() < 1e-9);
    }
}
