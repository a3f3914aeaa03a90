use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{ClipError, ClipResult};
use crate::models::{JobStatus, Moment, Operation, OperationSnapshot, Session};
use crate::orchestrator::JobTicket;

/// Render inputs that travel with an operation but are not part of the poll
/// payload.
#[derive(Debug, Clone)]
pub struct OperationContext {
    pub source: PathBuf,
    pub voice_reference: Option<String>,
    /// Moment and final output path per job id.
    pub jobs: HashMap<String, JobRenderPlan>,
}

#[derive(Debug, Clone)]
pub struct JobRenderPlan {
    pub moment: Moment,
    pub output_path: PathBuf,
}

/// Everything a worker needs to own one claimed job.
#[derive(Debug, Clone)]
pub struct ClaimedJob {
    pub operation_id: String,
    pub job_id: String,
    pub language: String,
    pub attempt: u32,
    pub source: PathBuf,
    pub voice_reference: Option<String>,
    pub moment: Moment,
    pub output_path: PathBuf,
}

struct OperationRecord {
    operation: Operation,
    context: OperationContext,
    /// Cleanup was requested. The record stays as a tombstone so later
    /// fetches can distinguish Gone from never-existed, but status reads
    /// treat it as removed.
    deleted: bool,
}

struct RegistryInner {
    operations: HashMap<String, OperationRecord>,
    sessions: HashMap<String, Session>,
}

/// In-process Operation/RenderJob registry.
///
/// The only shared mutable structure in the orchestrator. Every method takes
/// the lock for one short mutation or read — status transitions are
/// compare-and-set against the expected current state, and no lock is ever
/// held across an await on provider work, so polling never blocks on
/// rendering.
#[derive(Clone)]
pub struct OperationRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(RegistryInner {
                operations: HashMap::new(),
                sessions: HashMap::new(),
            })),
        }
    }

    pub async fn create_session(&self, voice_reference: Option<String>) -> Session {
        let session = Session {
            session_id: Uuid::new_v4().to_string(),
            voice_reference,
            created_at: Utc::now(),
        };
        let mut inner = self.inner.lock().await;
        inner
            .sessions
            .insert(session.session_id.clone(), session.clone());
        session
    }

    pub async fn get_session(&self, session_id: &str) -> ClipResult<Session> {
        let inner = self.inner.lock().await;
        inner
            .sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| ClipError::NotFound(format!("unknown session {session_id}")))
    }

    pub async fn insert_operation(&self, operation: Operation, context: OperationContext) {
        let mut inner = self.inner.lock().await;
        inner.operations.insert(
            operation.operation_id.clone(),
            OperationRecord {
                operation,
                context,
                deleted: false,
            },
        );
    }

    /// Fresh status snapshot; the aggregate is derived from job states at
    /// read time, never cached.
    pub async fn snapshot(&self, operation_id: &str) -> ClipResult<OperationSnapshot> {
        let inner = self.inner.lock().await;
        let record = inner
            .operations
            .get(operation_id)
            .filter(|record| !record.deleted)
            .ok_or_else(|| ClipError::NotFound(format!("unknown operation {operation_id}")))?;
        Ok(OperationSnapshot::from_operation(&record.operation))
    }

    /// Compare-and-set `Queued → Running`. Returns `None` when the job is no
    /// longer claimable (already owned, finished, or its operation was
    /// cleaned up) — the caller just drops the ticket.
    pub(crate) async fn claim_job(&self, ticket: &JobTicket) -> Option<ClaimedJob> {
        let mut inner = self.inner.lock().await;
        let record = inner.operations.get_mut(&ticket.operation_id)?;
        if record.deleted {
            return None;
        }
        let plan = record.context.jobs.get(&ticket.job_id)?.clone();
        let source = record.context.source.clone();
        let voice_reference = record.context.voice_reference.clone();

        let job = record
            .operation
            .jobs
            .iter_mut()
            .find(|job| job.job_id == ticket.job_id)?;
        if job.status != JobStatus::Queued {
            return None;
        }
        job.status = JobStatus::Running;

        Some(ClaimedJob {
            operation_id: ticket.operation_id.clone(),
            job_id: ticket.job_id.clone(),
            language: job.language.clone(),
            attempt: job.attempt,
            source,
            voice_reference,
            moment: plan.moment,
            output_path: plan.output_path,
        })
    }

    /// `Running → Succeeded`. Returns true when the artifact must be
    /// discarded because cleanup arrived while the job was in flight.
    pub(crate) async fn complete_job(&self, ticket: &JobTicket, output_path: PathBuf) -> bool {
        let mut inner = self.inner.lock().await;
        let Some(record) = inner.operations.get_mut(&ticket.operation_id) else {
            return true;
        };
        if let Some(job) = record
            .operation
            .jobs
            .iter_mut()
            .find(|job| job.job_id == ticket.job_id && job.status == JobStatus::Running)
        {
            job.status = JobStatus::Succeeded;
            job.output_path = Some(output_path);
            job.error = None;
        }
        record.deleted
    }

    /// `Running → Failed`, terminally.
    pub(crate) async fn fail_job(&self, ticket: &JobTicket, error: String) {
        let mut inner = self.inner.lock().await;
        if let Some(record) = inner.operations.get_mut(&ticket.operation_id) {
            if let Some(job) = record
                .operation
                .jobs
                .iter_mut()
                .find(|job| job.job_id == ticket.job_id && job.status == JobStatus::Running)
            {
                job.status = JobStatus::Failed;
                job.error = Some(error);
            }
        }
    }

    /// `Running → Queued` with the attempt counter bumped, ahead of a retry.
    /// Returns false when the operation was cleaned up mid-flight; the job is
    /// failed in place and must not be requeued.
    pub(crate) async fn requeue_job(&self, ticket: &JobTicket, error: String) -> bool {
        let mut inner = self.inner.lock().await;
        let Some(record) = inner.operations.get_mut(&ticket.operation_id) else {
            return false;
        };
        let Some(job) = record
            .operation
            .jobs
            .iter_mut()
            .find(|job| job.job_id == ticket.job_id && job.status == JobStatus::Running)
        else {
            return false;
        };
        if record.deleted {
            job.status = JobStatus::Failed;
            job.error = Some(format!("abandoned by cleanup after: {error}"));
            return false;
        }
        job.status = JobStatus::Queued;
        job.attempt += 1;
        job.error = Some(error);
        true
    }

    /// Tombstone the operation and hand back the artifact paths that can be
    /// removed right now. Idempotent: a second call, or a call for an unknown
    /// id, returns an empty list.
    pub async fn cleanup(&self, operation_id: &str) -> Vec<PathBuf> {
        let mut inner = self.inner.lock().await;
        let Some(record) = inner.operations.get_mut(operation_id) else {
            return Vec::new();
        };
        if record.deleted {
            return Vec::new();
        }
        record.deleted = true;
        record
            .operation
            .jobs
            .iter()
            .filter_map(|job| job.output_path.clone())
            .collect()
    }

    /// Resolve a succeeded job's artifact path for retrieval.
    pub async fn artifact_path(&self, operation_id: &str, job_id: &str) -> ClipResult<PathBuf> {
        let inner = self.inner.lock().await;
        let record = inner
            .operations
            .get(operation_id)
            .ok_or_else(|| ClipError::NotFound(format!("unknown operation {operation_id}")))?;

        let job = record
            .operation
            .jobs
            .iter()
            .find(|job| job.job_id == job_id)
            .ok_or_else(|| ClipError::NotFound(format!("unknown job {job_id}")))?;

        if record.deleted {
            return if job.status == JobStatus::Succeeded {
                Err(ClipError::Gone(format!(
                    "artifact for job {job_id} was cleaned up"
                )))
            } else {
                Err(ClipError::NotFound(format!("job {job_id} never succeeded")))
            };
        }

        match (&job.status, &job.output_path) {
            (JobStatus::Succeeded, Some(path)) => Ok(path.clone()),
            _ => Err(ClipError::NotFound(format!(
                "job {job_id} has not succeeded (status: {})",
                job.status.as_str()
            ))),
        }
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RenderJob;

    async fn seed_operation(registry: &OperationRegistry) -> (String, String) {
        let operation_id = "op-1".to_string();
        let job_id = "job-1".to_string();
        let moment = Moment {
            index: 0,
            start_time: 0.0,
            end_time: 20.0,
            score: 8.0,
            hook: "hook".into(),
            caption: "caption".into(),
        };
        let operation = Operation {
            operation_id: operation_id.clone(),
            session_id: None,
            jobs: vec![RenderJob::new(job_id.clone(), 0, "en".into())],
            created_at: Utc::now(),
        };
        let mut jobs = HashMap::new();
        jobs.insert(
            job_id.clone(),
            JobRenderPlan {
                moment,
                output_path: PathBuf::from("/tmp/out.mp4"),
            },
        );
        let context = OperationContext {
            source: PathBuf::from("/tmp/source.mp4"),
            voice_reference: None,
            jobs,
        };
        registry.insert_operation(operation, context).await;
        (operation_id, job_id)
    }

    #[tokio::test]
    async fn test_claim_is_exclusive() {
        let registry = OperationRegistry::new();
        let (operation_id, job_id) = seed_operation(&registry).await;
        let ticket = JobTicket {
            operation_id,
            job_id,
        };

        assert!(registry.claim_job(&ticket).await.is_some());
        // Second claim loses the compare-and-set.
        assert!(registry.claim_job(&ticket).await.is_none());
    }

    #[tokio::test]
    async fn test_cleanup_is_idempotent() {
        let registry = OperationRegistry::new();
        let (operation_id, job_id) = seed_operation(&registry).await;
        let ticket = JobTicket {
            operation_id: operation_id.clone(),
            job_id,
        };
        registry.claim_job(&ticket).await.unwrap();
        registry
            .complete_job(&ticket, PathBuf::from("/tmp/out.mp4"))
            .await;

        let first = registry.cleanup(&operation_id).await;
        assert_eq!(first.len(), 1);
        let second = registry.cleanup(&operation_id).await;
        assert!(second.is_empty());
        assert!(registry.cleanup("never-existed").await.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_semantics_across_lifecycle() {
        let registry = OperationRegistry::new();
        let (operation_id, job_id) = seed_operation(&registry).await;
        let ticket = JobTicket {
            operation_id: operation_id.clone(),
            job_id: job_id.clone(),
        };

        // Queued job: nothing to fetch yet.
        assert!(matches!(
            registry.artifact_path(&operation_id, &job_id).await,
            Err(ClipError::NotFound(_))
        ));

        registry.claim_job(&ticket).await.unwrap();
        registry
            .complete_job(&ticket, PathBuf::from("/tmp/out.mp4"))
            .await;
        assert!(registry.artifact_path(&operation_id, &job_id).await.is_ok());

        registry.cleanup(&operation_id).await;
        assert!(matches!(
            registry.artifact_path(&operation_id, &job_id).await,
            Err(ClipError::Gone(_))
        ));
        assert!(matches!(
            registry.snapshot(&operation_id).await,
            Err(ClipError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_cleanup_midflight_discards_result() {
        let registry = OperationRegistry::new();
        let (operation_id, job_id) = seed_operation(&registry).await;
        let ticket = JobTicket {
            operation_id: operation_id.clone(),
            job_id,
        };

        registry.claim_job(&ticket).await.unwrap();
        registry.cleanup(&operation_id).await;

        // The in-flight job finishes, but its artifact must be discarded.
        assert!(
            registry
                .complete_job(&ticket, PathBuf::from("/tmp/out.mp4"))
                .await
        );
    }
}
