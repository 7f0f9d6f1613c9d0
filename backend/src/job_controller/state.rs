//! Tracks background generation jobs started from the GUI.
//!
//! - `JobsState`: clonable, shared registry of every job's status, injected
//!   into the Actix application in `main.rs`.
//! - `JobUpdate`: a status change sent by a running job.
//! - `start_job_updater`: the single task that applies `JobUpdate`s to the
//!   registry; jobs never write the map themselves. Finished jobs are dropped
//!   once they are older than the retention period.

use common::jobs::JobStatus;
use log::debug;
use std::time::{Duration, Instant};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, RwLock};

/// Capacity of the update channel between running jobs and the updater.
pub const UPDATE_CHANNEL_CAPACITY: usize = 100;

/// How long a completed or failed job stays pollable.
pub const JOB_RETENTION: Duration = Duration::from_secs(60 * 60);

#[derive(Clone)]
pub struct JobsState {
    /// Job id -> latest status. Read by the status endpoint, written only by
    /// `start_job_updater` (and by scheduling, which inserts `Pending`).
    pub jobs: Arc<RwLock<HashMap<String, JobStatus>>>,

    /// Sender handed to running jobs for their progress and final status.
    pub tx: mpsc::Sender<JobUpdate>,
}

impl JobsState {
    /// Creates an empty registry and the receiver to pass to `start_job_updater`.
    pub fn new() -> (Self, mpsc::Receiver<JobUpdate>) {
        let (tx, rx) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);
        let state = JobsState {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            tx,
        };
        (state, rx)
    }
}

/// A status update for one background job.
#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
}

/// Applies every received `JobUpdate` to the shared registry until all
/// senders are dropped.
pub async fn start_job_updater(state: JobsState, rx: mpsc::Receiver<JobUpdate>) {
    run_job_updater(state, rx, JOB_RETENTION).await;
}

/// Same as `start_job_updater`, but finished jobs are removed on the first
/// update received at least `retention` after they finished.
pub async fn run_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>, retention: Duration) {
    let mut finished: HashMap<String, Instant> = HashMap::new();

    while let Some(update) = rx.recv().await {
        let mut jobs = state.jobs.write().await;
        if matches!(update.status, JobStatus::Completed(_) | JobStatus::Failed(_)) {
            finished.insert(update.job_id.clone(), Instant::now());
        }
        jobs.insert(update.job_id, update.status);

        finished.retain(|job_id, at| {
            if at.elapsed() < retention {
                return true;
            }
            debug!("Dropping finished job {}", job_id);
            jobs.remove(job_id);
            false
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn updater_keeps_the_latest_status() {
        let (state, rx) = JobsState::new();
        let updater = tokio::spawn(start_job_updater(state.clone(), rx));

        state
            .tx
            .send(JobUpdate {
                job_id: "job".to_string(),
                status: JobStatus::InProgress {
                    completed: 1,
                    total: 2,
                    current: "TXN-001.pdf".to_string(),
                },
            })
            .await
            .unwrap();
        state
            .tx
            .send(JobUpdate {
                job_id: "job".to_string(),
                status: JobStatus::Failed("boom".to_string()),
            })
            .await
            .unwrap();

        // The updater's own state keeps a sender alive, so poll instead of joining.
        for _ in 0..100 {
            if matches!(state.jobs.read().await.get("job"), Some(JobStatus::Failed(_))) {
                break;
            }
            tokio::task::yield_now().await;
        }
        updater.abort();

        let jobs = state.jobs.read().await;
        assert!(matches!(jobs.get("job"), Some(JobStatus::Failed(msg)) if msg == "boom"));
    }

    #[tokio::test]
    async fn finished_jobs_expire_after_retention() {
        let (state, rx) = JobsState::new();
        {
            let mut jobs = state.jobs.write().await;
            jobs.insert("done".to_string(), JobStatus::Pending);
            jobs.insert("running".to_string(), JobStatus::Pending);
        }
        let updater = tokio::spawn(run_job_updater(state.clone(), rx, Duration::ZERO));

        state
            .tx
            .send(JobUpdate {
                job_id: "done".to_string(),
                status: JobStatus::Failed("boom".to_string()),
            })
            .await
            .unwrap();
        state
            .tx
            .send(JobUpdate {
                job_id: "running".to_string(),
                status: JobStatus::InProgress {
                    completed: 1,
                    total: 3,
                    current: "TXN-001.pdf".to_string(),
                },
            })
            .await
            .unwrap();

        // Updates are applied in order, so once "running" moved on, "done" was handled.
        for _ in 0..100 {
            if matches!(state.jobs.read().await.get("running"), Some(JobStatus::InProgress { .. })) {
                break;
            }
            tokio::task::yield_now().await;
        }
        updater.abort();

        let jobs = state.jobs.read().await;
        assert!(!jobs.contains_key("done"));
        assert!(matches!(jobs.get("running"), Some(JobStatus::InProgress { completed: 1, .. })));
    }
}
