use super::{DBClient, PostExt};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

impl DBClient {
    /// Periodically rebuild every post's comment list from `comments.post_id`.
    ///
    /// Repairs ids left behind or never added when a comment create/delete was
    /// interrupted between its two writes. Returns the running scheduler, which
    /// must be kept alive.
    pub async fn start_reconcile_task(&self, cron: &str) -> Result<JobScheduler, JobSchedulerError> {
        let sched = JobScheduler::new().await?;
        let db_client = self.clone();

        let job = Job::new_async(cron, move |uuid, _l| {
            let db_client = db_client.clone();
            Box::pin(async move {
                tracing::debug!(job = %uuid, "Running comment reconciliation");

                match db_client.reconcile_comment_refs().await {
                    Ok(0) => tracing::debug!(job = %uuid, "Comment lists already consistent"),
                    Ok(repaired) => {
                        tracing::warn!(job = %uuid, repaired, "Repaired drifted comment lists")
                    }
                    Err(e) => tracing::error!(job = %uuid, "Comment reconciliation failed: {}", e),
                }
            })
        })?;

        sched.add(job).await?;
        //It doesn't block.
        sched.start().await?;

        tracing::info!(cron, "Comment reconciliation scheduled");
        Ok(sched)
    }
}
