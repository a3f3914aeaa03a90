use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum JobStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
        }
    }

    /// Terminal states never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

/// One (moment, language) render task with its own state machine:
/// `queued → running → {succeeded | failed}`.
///
/// A failed attempt on a transient provider error goes back to `Queued` with
/// `attempt` incremented, up to the retry budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderJob {
    pub job_id: String,
    pub moment_index: usize,
    pub language: String,
    pub status: JobStatus,
    pub attempt: u32,
    pub output_path: Option<PathBuf>,
    pub error: Option<String>,
}

impl RenderJob {
    pub fn new(job_id: String, moment_index: usize, language: String) -> Self {
        Self {
            job_id,
            moment_index,
            language,
            status: JobStatus::Queued,
            attempt: 0,
            output_path: None,
            error: None,
        }
    }
}

/// A batch unit grouping every render job submitted together.
///
/// Owns its jobs exclusively; jobs never outlive their operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub operation_id: String,
    pub session_id: Option<String>,
    pub jobs: Vec<RenderJob>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AggregateStatus {
    Queued,
    Running,
    Completed,
    CompletedWithErrors,
    Failed,
}

impl AggregateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateStatus::Queued => "queued",
            AggregateStatus::Running => "running",
            AggregateStatus::Completed => "completed",
            AggregateStatus::CompletedWithErrors => "completed_with_errors",
            AggregateStatus::Failed => "failed",
        }
    }
}

/// Derive the operation-level status from its job states.
///
/// This is a pure function recomputed on every read; the aggregate is never
/// stored, so it cannot drift from the jobs.
pub fn derive_aggregate(jobs: &[RenderJob]) -> AggregateStatus {
    let fresh_queued = jobs
        .iter()
        .all(|job| job.status == JobStatus::Queued && job.attempt == 0);
    if fresh_queued {
        return AggregateStatus::Queued;
    }

    // A queued job with attempt > 0 is a retryable failure pending retry.
    let any_pending = jobs
        .iter()
        .any(|job| matches!(job.status, JobStatus::Queued | JobStatus::Running));
    if any_pending {
        return AggregateStatus::Running;
    }

    let succeeded = jobs
        .iter()
        .filter(|job| job.status == JobStatus::Succeeded)
        .count();
    if succeeded == jobs.len() {
        AggregateStatus::Completed
    } else if succeeded == 0 {
        AggregateStatus::Failed
    } else {
        AggregateStatus::CompletedWithErrors
    }
}

/// One job row in a status snapshot. `output_ref` is only present once the
/// job has succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderJobRow {
    pub job_id: String,
    pub moment_index: usize,
    pub language: String,
    pub status: JobStatus,
    pub attempt: u32,
    pub output_ref: Option<String>,
    pub error: Option<String>,
}

impl From<&RenderJob> for RenderJobRow {
    fn from(job: &RenderJob) -> Self {
        Self {
            job_id: job.job_id.clone(),
            moment_index: job.moment_index,
            language: job.language.clone(),
            status: job.status,
            attempt: job.attempt,
            output_ref: job
                .output_path
                .as_ref()
                .map(|path| path.display().to_string()),
            error: job.error.clone(),
        }
    }
}

/// Poll payload returned from status reads: the derived aggregate plus one
/// row per job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSnapshot {
    pub operation_id: String,
    pub session_id: Option<String>,
    pub aggregate_status: AggregateStatus,
    pub created_at: DateTime<Utc>,
    pub jobs: Vec<RenderJobRow>,
}

impl OperationSnapshot {
    pub fn from_operation(operation: &Operation) -> Self {
        Self {
            operation_id: operation.operation_id.clone(),
            session_id: operation.session_id.clone(),
            aggregate_status: derive_aggregate(&operation.jobs),
            created_at: operation.created_at,
            jobs: operation.jobs.iter().map(RenderJobRow::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(status: JobStatus, attempt: u32) -> RenderJob {
        RenderJob {
            job_id: "j".into(),
            moment_index: 0,
            language: "en".into(),
            status,
            attempt,
            output_path: None,
            error: None,
        }
    }

    #[test]
    fn test_all_queued_is_queued() {
        let jobs = vec![job(JobStatus::Queued, 0), job(JobStatus::Queued, 0)];
        assert_eq!(derive_aggregate(&jobs), AggregateStatus::Queued);
    }

    #[test]
    fn test_pending_retry_counts_as_running() {
        // One job succeeded, one was requeued after a transient failure.
        let jobs = vec![job(JobStatus::Succeeded, 0), job(JobStatus::Queued, 1)];
        assert_eq!(derive_aggregate(&jobs), AggregateStatus::Running);
    }

    #[test]
    fn test_any_running_is_running() {
        let jobs = vec![job(JobStatus::Running, 0), job(JobStatus::Queued, 0)];
        assert_eq!(derive_aggregate(&jobs), AggregateStatus::Running);
    }

    #[test]
    fn test_all_succeeded_is_completed() {
        let jobs = vec![job(JobStatus::Succeeded, 0), job(JobStatus::Succeeded, 1)];
        assert_eq!(derive_aggregate(&jobs), AggregateStatus::Completed);
    }

    #[test]
    fn test_mixed_terminal_is_completed_with_errors() {
        let jobs = vec![job(JobStatus::Succeeded, 0), job(JobStatus::Failed, 2)];
        let aggregate = derive_aggregate(&jobs);
        assert_eq!(aggregate, AggregateStatus::CompletedWithErrors);
        assert_eq!(aggregate.as_str(), "completed_with_errors");
    }

    #[test]
    fn test_all_failed_is_failed() {
        let jobs = vec![job(JobStatus::Failed, 0), job(JobStatus::Failed, 2)];
        assert_eq!(derive_aggregate(&jobs), AggregateStatus::Failed);
    }
}
