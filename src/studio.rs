use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::StudioConfig;
use crate::error::{ClipError, ClipResult};
use crate::extract::FeatureExtractor;
use crate::localize::Localizer;
use crate::models::{Moment, OperationSnapshot, Session};
use crate::orchestrator::{Artifact, BatchController, OperationRegistry};
use crate::render::{ClipRenderer, Renderer};
use crate::selector::{HeuristicScorer, MomentScorer, MomentSelector, SelectorConfig};
use crate::log_info;

const ENABLE_LOGS: bool = true;

/// Moments from the most recent discovery; submit resolves indexes against
/// this set.
struct DiscoveryState {
    source: Option<PathBuf>,
    moments: Vec<Moment>,
}

/// Top-level facade wiring the extractor, selector, capability providers,
/// and batch orchestrator together.
///
/// All collaborators are handed in explicitly — the registry included — so
/// there is no hidden process-wide state; two studios in one process are
/// fully independent.
pub struct ClipStudio {
    extractor: Arc<FeatureExtractor>,
    selector: MomentSelector,
    controller: BatchController,
    registry: OperationRegistry,
    discovered: Mutex<DiscoveryState>,
}

impl ClipStudio {
    pub fn new(
        config: StudioConfig,
        selector_config: SelectorConfig,
        scorer: Arc<dyn MomentScorer>,
        localizer: Arc<dyn Localizer>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        let registry = OperationRegistry::new();
        let controller =
            BatchController::new(registry.clone(), localizer, renderer, &config);

        Self {
            extractor: Arc::new(FeatureExtractor::new(&config)),
            selector: MomentSelector::new(selector_config, scorer),
            controller,
            registry,
            discovered: Mutex::new(DiscoveryState {
                source: None,
                moments: Vec::new(),
            }),
        }
    }

    /// Studio with the built-in heuristic scorer and ffmpeg renderer; only
    /// localization still needs an external provider.
    pub fn with_local_pipeline(config: StudioConfig, localizer: Arc<dyn Localizer>) -> Self {
        let selector_config = SelectorConfig::default();
        let scorer = Arc::new(HeuristicScorer::new(selector_config.clone()));
        let renderer = Arc::new(ClipRenderer::new(&config));
        Self::new(config, selector_config, scorer, localizer, renderer)
    }

    /// Find up to `count` ranked, non-overlapping moments in the source.
    ///
    /// Synchronous from the caller's point of view: returns once scoring and
    /// selection are complete. The returned indexes are the handles `submit`
    /// accepts until the next discovery replaces them.
    pub async fn discover(
        &self,
        source: &Path,
        count: usize,
        max_duration_secs: Option<f64>,
    ) -> ClipResult<Vec<Moment>> {
        let extractor = self.extractor.clone();
        let source_buf = source.to_path_buf();
        let bundle = tokio::task::spawn_blocking(move || extractor.extract(&source_buf))
            .await
            .map_err(|err| ClipError::Input(format!("extraction task failed: {err}")))??;

        let moments = self
            .selector
            .discover(&bundle.segments, &bundle.frames, count, max_duration_secs)
            .await?;

        // Sampled frames are scratch owned by this discovery call; scoring is
        // done with them now.
        for frame in &bundle.frames {
            let _ = std::fs::remove_file(&frame.path);
            if let Some(dir) = frame.path.parent() {
                let _ = std::fs::remove_dir(dir);
            }
        }

        log_info!(
            "discovery found {} moments in {}",
            moments.len(),
            source.display()
        );

        let mut state = self.discovered.lock().await;
        state.source = Some(source.to_path_buf());
        state.moments = moments.clone();
        Ok(moments)
    }

    /// Queue one render job per (moment, language) pair; returns the
    /// operation id immediately while rendering proceeds on the pool.
    pub async fn submit(
        &self,
        moment_indexes: &[usize],
        languages: &[String],
        session_id: Option<String>,
    ) -> ClipResult<String> {
        let (source, selected) = {
            let state = self.discovered.lock().await;
            let source = state.source.clone().ok_or_else(|| {
                ClipError::Validation("no discovery has run in this studio".into())
            })?;
            let selected = moment_indexes
                .iter()
                .map(|&index| {
                    state
                        .moments
                        .iter()
                        .find(|moment| moment.index == index)
                        .cloned()
                        .ok_or_else(|| {
                            ClipError::Validation(format!("unknown moment index {index}"))
                        })
                })
                .collect::<ClipResult<Vec<Moment>>>()?;
            (source, selected)
        };

        self.controller
            .create_operation(&source, &selected, languages, session_id)
            .await
    }

    /// Poll an operation. Always succeeds for a known id; job-level errors
    /// are data in the snapshot, not call failures.
    pub async fn status(&self, operation_id: &str) -> ClipResult<OperationSnapshot> {
        self.controller.status(operation_id).await
    }

    /// Retrieve a finished clip for a succeeded job.
    pub async fn fetch(&self, operation_id: &str, job_id: &str) -> ClipResult<Artifact> {
        self.controller.fetch(operation_id, job_id).await
    }

    /// Drop an operation's tracked state and unretrieved artifacts.
    pub async fn cleanup(&self, operation_id: &str) -> ClipResult<()> {
        self.controller.cleanup(operation_id).await
    }

    pub async fn create_session(&self, voice_reference: Option<String>) -> Session {
        self.registry.create_session(voice_reference).await
    }

    pub async fn get_session(&self, session_id: &str) -> ClipResult<Session> {
        self.registry.get_session(session_id).await
    }

    /// Stop the worker pool. In-flight renders finish first.
    pub async fn shutdown(&self) {
        self.controller.shutdown().await;
    }
}
