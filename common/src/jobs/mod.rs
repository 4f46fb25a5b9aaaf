use crate::model::batch::{BatchSummary, ProgressSnapshot};
use serde::{Deserialize, Serialize};

/// Status of one batch job as seen by polling clients.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum JobStatus {
    /// Accepted and registered, not yet picked up by the run loop.
    Pending,
    /// Running; carries the most recent progress snapshot.
    InProgress(ProgressSnapshot),
    /// Terminal: every item was attempted exactly once.
    Completed(BatchSummary),
    /// Terminal: the job ended without producing a summary.
    Failed(String),
}
