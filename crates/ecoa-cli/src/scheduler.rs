//! Fixed-interval trigger for the full ingestion job.

use std::sync::Arc;
use std::time::Duration;

use ecoa_pipeline::Orchestrator;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts a scheduler that runs the full job every `interval`.
///
/// The returned handle must be kept alive; dropping it stops the job.
/// Runs may overlap when one takes longer than `interval`.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    orchestrator: Orchestrator,
    interval: Duration,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    let orchestrator = Arc::new(orchestrator);

    let job = Job::new_repeated_async(interval, move |_uuid, _lock| {
        let orchestrator = Arc::clone(&orchestrator);

        Box::pin(async move {
            tracing::info!("scheduler: starting ingestion run");
            let summary = orchestrator.run_scraping_job().await;
            tracing::info!(
                status = ?summary.status,
                found = summary.articles_found,
                stored = summary.articles_stored,
                failed = summary.articles_failed,
                "scheduler: ingestion run complete"
            );
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;
    Ok(scheduler)
}
