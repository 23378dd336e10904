//! Background job scheduler.
//!
//! Registers the fixed-interval dispatch job that drains the queue to the
//! collector.

use std::sync::Arc;
use std::time::Duration;

use harmwatch_buffer::FileStore;
use harmwatch_dispatch::{BatchDispatcher, TickOutcome};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the scheduler.
///
/// The returned [`JobScheduler`] must be kept alive for the lifetime of the
/// process; dropping it stops the dispatch job.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    dispatcher: Arc<BatchDispatcher<FileStore>>,
    interval: Duration,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_dispatch_job(&scheduler, dispatcher, interval).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the dispatch job, firing every `interval` regardless of whether
/// the previous send finished. Overlapping ticks are skipped by the
/// dispatcher itself.
async fn register_dispatch_job(
    scheduler: &JobScheduler,
    dispatcher: Arc<BatchDispatcher<FileStore>>,
    interval: Duration,
) -> Result<(), JobSchedulerError> {
    let batch_size = dispatcher.batch_size();
    let job = Job::new_repeated_async(interval, move |_uuid, _lock| {
        let dispatcher = Arc::clone(&dispatcher);
        Box::pin(async move {
            run_dispatch_tick(&dispatcher).await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(
        interval_secs = interval.as_secs(),
        batch_size,
        "scheduler: dispatch job registered"
    );
    Ok(())
}

async fn run_dispatch_tick(dispatcher: &BatchDispatcher<FileStore>) {
    match dispatcher.tick().await {
        Ok(TickOutcome::Delivered { count }) => {
            tracing::info!(count, "scheduler: dispatch tick delivered batch");
        }
        Ok(TickOutcome::Requeued { count, error }) => {
            tracing::warn!(count, error = %error, "scheduler: batch requeued for next tick");
        }
        Ok(TickOutcome::Idle | TickOutcome::Skipped) => {}
        Err(e) => {
            tracing::error!(error = %e, "scheduler: dispatch tick failed");
        }
    }
}
