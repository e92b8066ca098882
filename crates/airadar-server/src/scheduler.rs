//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring trend detection job.

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::detection::DetectionRunner;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process. Dropping it shuts down all scheduled jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the cron expression is invalid, or the scheduler fails to start.
pub async fn build_scheduler(
    runner: DetectionRunner,
    cron: &str,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_detection_job(&scheduler, runner, cron).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the trend detection job on `cron` (six fields, seconds first).
///
/// Each run detects trends and alerts on the qualifying ones. A run that
/// fires while another detection is in flight is skipped.
async fn register_detection_job(
    scheduler: &JobScheduler,
    runner: DetectionRunner,
    cron: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let runner = runner.clone();

        Box::pin(async move {
            tracing::info!("scheduler: starting trend detection run");
            runner.detect_and_alert().await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron, "scheduler: trend detection job registered");
    Ok(())
}
