use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::StudioConfig;
use crate::error::{ClipError, ClipResult};
use crate::localize::Localizer;
use crate::models::{Moment, Operation, OperationSnapshot, RenderJob};
use crate::orchestrator::registry::{JobRenderPlan, OperationContext, OperationRegistry};
use crate::orchestrator::worker::{render_worker, WorkerContext};
use crate::orchestrator::JobTicket;
use crate::render::Renderer;
use crate::log_info;

const ENABLE_LOGS: bool = true;

/// Handle to one retrievable output clip.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub operation_id: String,
    pub job_id: String,
    pub path: PathBuf,
}

impl Artifact {
    /// Read the clip bytes. A file that disappeared between fetch and read
    /// reports as gone, not as an IO failure.
    pub async fn read(&self) -> ClipResult<Vec<u8>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(ClipError::Gone(
                format!("artifact {} no longer exists", self.path.display()),
            )),
            Err(err) => Err(ClipError::Io(err)),
        }
    }
}

/// Owns the Operation/RenderJob lifecycle: fans submissions out into the
/// shared job queue, answers status polls from the registry, and tears state
/// down on cleanup.
///
/// The worker pool has a fixed size regardless of how many operations are in
/// flight, which caps concurrent provider and ffmpeg load.
#[derive(Clone)]
pub struct BatchController {
    registry: OperationRegistry,
    queue_tx: mpsc::UnboundedSender<JobTicket>,
    workers: Arc<Mutex<Vec<JoinHandle<()>>>>,
    cancel_token: CancellationToken,
    output_dir: PathBuf,
}

impl BatchController {
    pub fn new(
        registry: OperationRegistry,
        localizer: Arc<dyn Localizer>,
        renderer: Arc<dyn Renderer>,
        config: &StudioConfig,
    ) -> Self {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let queue_rx = Arc::new(Mutex::new(queue_rx));
        let cancel_token = CancellationToken::new();

        let context = WorkerContext {
            registry: registry.clone(),
            localizer,
            renderer,
            queue_tx: queue_tx.clone(),
            max_retries: config.max_retries,
            backoff_base_secs: config.backoff_base_secs,
        };

        let worker_count = config.worker_count.max(1);
        let workers = (0..worker_count)
            .map(|worker_id| {
                tokio::spawn(render_worker(
                    worker_id,
                    context.clone(),
                    queue_rx.clone(),
                    cancel_token.clone(),
                ))
            })
            .collect();
        log_info!("started {worker_count} render workers");

        Self {
            registry,
            queue_tx,
            workers: Arc::new(Mutex::new(workers)),
            cancel_token,
            output_dir: config.output_dir.clone(),
        }
    }

    /// Create one operation with a job per (moment, language) pair and queue
    /// every job. Returns immediately; rendering proceeds on the pool.
    pub async fn create_operation(
        &self,
        source: &Path,
        moments: &[Moment],
        languages: &[String],
        session_id: Option<String>,
    ) -> ClipResult<String> {
        if moments.is_empty() {
            return Err(ClipError::Validation("no moments selected".into()));
        }
        if languages.is_empty() {
            return Err(ClipError::Validation("no target languages".into()));
        }

        let voice_reference = match &session_id {
            Some(id) => self.registry.get_session(id).await?.voice_reference,
            None => None,
        };

        let operation_id = Uuid::new_v4().to_string();
        let mut seen: HashSet<(usize, String)> = HashSet::new();
        let mut jobs = Vec::new();
        let mut plans = HashMap::new();

        for moment in moments {
            for language in languages {
                if !seen.insert((moment.index, language.clone())) {
                    return Err(ClipError::Validation(format!(
                        "duplicate job for moment {} in '{language}'",
                        moment.index
                    )));
                }
                let job_id = Uuid::new_v4().to_string();
                let output_path = self
                    .output_dir
                    .join(&operation_id)
                    .join(format!("moment{}_{language}.mp4", moment.index));
                plans.insert(
                    job_id.clone(),
                    JobRenderPlan {
                        moment: moment.clone(),
                        output_path,
                    },
                );
                jobs.push(RenderJob::new(job_id, moment.index, language.clone()));
            }
        }

        let tickets: Vec<JobTicket> = jobs
            .iter()
            .map(|job| JobTicket {
                operation_id: operation_id.clone(),
                job_id: job.job_id.clone(),
            })
            .collect();

        let operation = Operation {
            operation_id: operation_id.clone(),
            session_id,
            jobs,
            created_at: Utc::now(),
        };
        let context = OperationContext {
            source: source.to_path_buf(),
            voice_reference,
            jobs: plans,
        };
        self.registry.insert_operation(operation, context).await;

        for ticket in tickets {
            // Send only fails once shutdown dropped the workers; the jobs
            // then sit queued, which status reports truthfully.
            let _ = self.queue_tx.send(ticket);
        }

        log_info!(
            "operation {operation_id} queued {} render jobs",
            moments.len() * languages.len()
        );
        Ok(operation_id)
    }

    /// Freshly derived status for polling. Never blocks on rendering.
    pub async fn status(&self, operation_id: &str) -> ClipResult<OperationSnapshot> {
        self.registry.snapshot(operation_id).await
    }

    /// Artifact handle for a succeeded job.
    pub async fn fetch(&self, operation_id: &str, job_id: &str) -> ClipResult<Artifact> {
        let path = self.registry.artifact_path(operation_id, job_id).await?;
        if !path.exists() {
            return Err(ClipError::Gone(format!(
                "artifact for job {job_id} was removed"
            )));
        }
        Ok(Artifact {
            operation_id: operation_id.to_string(),
            job_id: job_id.to_string(),
            path,
        })
    }

    /// Remove tracked state and any unretrieved artifacts. Idempotent; a
    /// second call or an unknown id acks without side effects. Jobs still in
    /// flight finish first and their results are discarded on completion.
    pub async fn cleanup(&self, operation_id: &str) -> ClipResult<()> {
        let artifacts = self.registry.cleanup(operation_id).await;
        for path in &artifacts {
            let _ = tokio::fs::remove_file(path).await;
        }
        // The per-operation directory goes too once its files are gone.
        let _ = tokio::fs::remove_dir(self.output_dir.join(operation_id)).await;
        if !artifacts.is_empty() {
            log_info!(
                "cleanup removed {} artifacts for operation {operation_id}",
                artifacts.len()
            );
        }
        Ok(())
    }

    /// Stop accepting queued work and wait for idle workers to exit. Jobs
    /// already being rendered run to completion first.
    pub async fn shutdown(&self) {
        self.cancel_token.cancel();
        let mut workers = self.workers.lock().await;
        for handle in workers.drain(..) {
            let _ = handle.await;
        }
    }
}
