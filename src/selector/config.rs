/// Tunable thresholds for moment discovery.
#[derive(Debug, Clone)]
pub struct SelectorConfig {
    /// Shortest clip worth publishing.
    pub min_duration_secs: f64,
    /// Longest clip allowed (platform short-form ceiling).
    pub max_duration_secs: f64,
    /// Minimum spacing between consecutive window start anchors.
    pub stride_secs: f64,

    /// Heuristic scoring weights
    pub weight_hook: f64,
    pub weight_emotion: f64,
    pub weight_structure: f64,
    pub weight_density: f64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            min_duration_secs: 12.0,
            max_duration_secs: 60.0,
            stride_secs: 5.0,
            weight_hook: 0.35,
            weight_emotion: 0.25,
            weight_structure: 0.20,
            weight_density: 0.20,
        }
    }
}
