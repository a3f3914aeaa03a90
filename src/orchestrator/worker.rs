use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::error::ProviderError;
use crate::localize::{LocalizeRequest, Localizer};
use crate::orchestrator::registry::{ClaimedJob, OperationRegistry};
use crate::orchestrator::JobTicket;
use crate::render::{RenderRequest, Renderer};
use crate::{log_info, log_warn};

const ENABLE_LOGS: bool = true;

/// Shared state handed to every worker in the pool.
#[derive(Clone)]
pub(super) struct WorkerContext {
    pub registry: OperationRegistry,
    pub localizer: Arc<dyn Localizer>,
    pub renderer: Arc<dyn Renderer>,
    /// Send half of the shared queue, used to schedule delayed retries.
    pub queue_tx: mpsc::UnboundedSender<JobTicket>,
    pub max_retries: u32,
    pub backoff_base_secs: f64,
}

/// One render worker: drains the shared queue until cancelled.
///
/// A worker owns the job it claimed for the job's full duration; all state
/// transitions for that job go through the registry's compare-and-set calls.
/// Cancellation is only observed between jobs — an in-flight render runs to
/// completion, and a cleanup that raced it discards the result.
pub(super) async fn render_worker(
    worker_id: usize,
    ctx: WorkerContext,
    queue_rx: Arc<Mutex<mpsc::UnboundedReceiver<JobTicket>>>,
    cancel_token: CancellationToken,
) {
    loop {
        let ticket = {
            let mut rx = queue_rx.lock().await;
            tokio::select! {
                ticket = rx.recv() => match ticket {
                    Some(ticket) => ticket,
                    None => break,
                },
                _ = cancel_token.cancelled() => break,
            }
        };

        let Some(claim) = ctx.registry.claim_job(&ticket).await else {
            // Already owned, already finished, or cleaned up underneath us.
            continue;
        };

        log_info!(
            "worker {worker_id} rendering job {} ({} / attempt {})",
            claim.job_id,
            claim.language,
            claim.attempt
        );
        process_job(&ctx, &ticket, claim).await;
    }

    log_info!("render worker {worker_id} shutting down");
}

async fn process_job(ctx: &WorkerContext, ticket: &JobTicket, claim: ClaimedJob) {
    let localize_request = LocalizeRequest {
        hook: claim.moment.hook.clone(),
        caption: claim.moment.caption.clone(),
        target_language: claim.language.clone(),
        voice_reference: claim.voice_reference.clone(),
    };

    let copy = match ctx.localizer.translate(&localize_request).await {
        Ok(copy) => copy,
        Err(err) => {
            settle_failure(ctx, ticket, claim.attempt, err).await;
            return;
        }
    };

    let render_request = RenderRequest {
        source: claim.source.clone(),
        start_time: claim.moment.start_time,
        end_time: claim.moment.end_time,
        copy,
        output_path: claim.output_path.clone(),
    };

    match ctx.renderer.render(&render_request).await {
        Ok(output_path) => {
            let discard = ctx.registry.complete_job(ticket, output_path.clone()).await;
            if discard {
                // Cleanup won the race; the finished artifact is unwanted.
                let _ = tokio::fs::remove_file(&output_path).await;
                log_info!(
                    "discarded cleaned-up artifact for job {} ({})",
                    ticket.job_id,
                    output_path.display()
                );
            }
        }
        Err(err) => settle_failure(ctx, ticket, claim.attempt, err).await,
    }
}

/// Route a provider failure: transient errors requeue with backoff until the
/// retry budget runs out, terminal errors fail the job in place. Either way
/// sibling jobs are untouched.
async fn settle_failure(
    ctx: &WorkerContext,
    ticket: &JobTicket,
    attempt: u32,
    err: ProviderError,
) {
    if !err.is_transient() {
        log_warn!("job {} failed terminally: {err}", ticket.job_id);
        ctx.registry.fail_job(ticket, err.to_string()).await;
        return;
    }

    if attempt >= ctx.max_retries {
        log_warn!(
            "job {} exhausted {} retries: {err}",
            ticket.job_id,
            ctx.max_retries
        );
        ctx.registry
            .fail_job(ticket, format!("retries exhausted: {err}"))
            .await;
        return;
    }

    if !ctx.registry.requeue_job(ticket, err.to_string()).await {
        return;
    }

    let delay = backoff_delay(ctx.backoff_base_secs, attempt);
    log_warn!(
        "job {} hit a transient failure, retrying in {:.1}s (attempt {} of {}): {err}",
        ticket.job_id,
        delay.as_secs_f64(),
        attempt + 1,
        ctx.max_retries
    );

    // The retry sleeps on its own task so it never holds a worker slot.
    let queue_tx = ctx.queue_tx.clone();
    let ticket = ticket.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let _ = queue_tx.send(ticket);
    });
}

/// Exponential backoff with ±20% jitter so synchronized failures fan out.
fn backoff_delay(base_secs: f64, attempt: u32) -> Duration {
    let exponential = base_secs * 2_f64.powi(attempt as i32);
    let jitter = rand::thread_rng().gen_range(0.8..1.2);
    Duration::from_secs_f64((exponential * jitter).max(0.05))
}
