//! The worker loop: one job at a time, acknowledged unconditionally.

use std::sync::Arc;

use tracing::{error, info, warn};
use uproc_db::StatusStore;
use uproc_models::JobRequest;
use uproc_queue::JobQueue;

use crate::error::{WorkerError, WorkerResult};
use crate::pipeline::{self, PipelineContext};
use crate::source::Video;

/// Status recorded after a fully successful run.
const STATUS_TRANSCODED: &str = "transcoded";
/// Status recorded after any terminal per-job failure.
const STATUS_ERROR: &str = "error";

/// How long one consume call blocks waiting for a delivery.
const CONSUME_BLOCK_MS: u64 = 5_000;

/// Sequential job executor.
///
/// Consumes a single delivery, runs it end to end, acknowledges it
/// whatever the outcome, and only then asks for the next one. A job is
/// consumed exactly once; a failed job is not retried.
pub struct Executor {
    queue: JobQueue,
    status: Arc<dyn StatusStore>,
    ctx: PipelineContext,
    consumer_name: String,
}

impl Executor {
    pub fn new(queue: JobQueue, status: Arc<dyn StatusStore>, ctx: PipelineContext) -> Self {
        Self {
            queue,
            status,
            ctx,
            consumer_name: format!("uproc-worker-{}", uuid::Uuid::new_v4()),
        }
    }

    /// Run until the queue fails. Queue errors are fatal; everything
    /// that goes wrong inside a job is contained to that job.
    pub async fn run(&self) -> WorkerResult<()> {
        self.queue.init().await?;
        info!("Worker {} waiting for jobs", self.consumer_name);

        loop {
            let deliveries = self
                .queue
                .consume(&self.consumer_name, CONSUME_BLOCK_MS, 1)
                .await?;

            for delivery in deliveries {
                handle_payload(self.status.as_ref(), &self.ctx, &delivery.payload).await;
                self.queue.ack(&delivery.message_id).await?;
            }
        }
    }
}

/// Process one payload end to end. Never returns an error: per-job
/// failures end in an error status, and the caller acknowledges the
/// delivery either way.
pub async fn handle_payload(status: &dyn StatusStore, ctx: &PipelineContext, payload: &[u8]) {
    let request = match JobRequest::from_payload(payload).map_err(WorkerError::InvalidPayload) {
        Ok(request) => request,
        Err(e) => {
            // No identity to record a status against.
            error!("Error receiving job: {}", e);
            return;
        }
    };

    let id = request.id.clone();
    if let Err(e) = status.set_original_url(&id, &request.url).await {
        warn!("Couldn't record original URL for {}: {}", id, e);
    }

    let mut video = match Video::resolve(request) {
        Ok(video) => video,
        Err(e) => {
            fail_job(status, &id, &e).await;
            return;
        }
    };

    info!("Processing job {} from {} source", id, video.source());

    match pipeline::process(ctx, &mut video).await {
        Ok(()) => {
            if let Err(e) = status.set_status(&id, STATUS_TRANSCODED).await {
                error!("Error saving status of {}: {}", id, e);
            }
            if let Err(e) = status.save_duration(&id, video.request.duration).await {
                error!("Error saving duration of {}: {}", id, e);
            }
            info!("Done processing job {}", id);
        }
        Err(e) => fail_job(status, &id, &e).await,
    }
}

async fn fail_job(status: &dyn StatusStore, id: &str, err: &WorkerError) {
    error!("Error processing job {}: {}", id, err);
    if let Err(e) = status.set_status(id, STATUS_ERROR).await {
        error!("Error saving status of {}: {}", id, e);
    }
}
