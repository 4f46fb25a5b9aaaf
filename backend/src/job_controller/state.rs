//! Tracks the state of in-flight and finished batch jobs.
//!
//! A batch runs outside the request/response cycle that started it, so its
//! status lives in a shared registry that clients poll. The pieces are:
//! - `JobsState`: a clonable, thread-safe map from job id to `JobStatus`,
//!   injected into the Actix application state in `main.rs`.
//! - `JobUpdate`: a message a background run sends to change a job's status.
//! - `start_job_updater`: the long-running task that drains `JobUpdate`
//!   messages from an MPSC channel into the shared map.
//!
//! Runs never write the map directly; pushing updates through the channel
//! keeps a single writer and lets a run report progress without holding the
//! registry lock.

use common::jobs::JobStatus;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, RwLock};

/// A thread-safe, shareable registry of batch job statuses.
#[derive(Clone)]
pub struct JobsState {
    /// Job id to current status; the single source of truth for the
    /// status endpoint.
    pub jobs: Arc<RwLock<HashMap<String, JobStatus>>>,
    /// Sender side of the updater channel.
    pub tx: mpsc::Sender<JobUpdate>,
}

impl JobsState {
    pub fn new(tx: mpsc::Sender<JobUpdate>) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            tx,
        }
    }

    /// Registers a freshly scheduled job as `Pending`.
    pub async fn register(&self, job_id: &str) {
        self.jobs
            .write()
            .await
            .insert(job_id.to_string(), JobStatus::Pending);
    }

    /// Current status of a job, if the id is known.
    pub async fn get(&self, job_id: &str) -> Option<JobStatus> {
        self.jobs.read().await.get(job_id).cloned()
    }
}

/// A status change for one batch job, sent by a background run.
#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
}

/// Drains the updater channel, applying each change to the shared map.
///
/// Spawned once at startup (see `main.rs`) and runs for the server's
/// lifetime; it ends only when every sender has been dropped.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        let mut jobs = state.jobs.write().await;
        jobs.insert(update.job_id, update.status);
    }
}
