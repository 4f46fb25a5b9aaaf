//! Sequential batch execution over a snapshot of selected items.
//!
//! One orchestrator drives at most one batch at a time. A run walks its
//! snapshot strictly in order, invokes the supplied mutation for each key,
//! records the per-item outcome, and emits a progress snapshot before every
//! dispatch. A failing item never stops the rest of the batch: the caller
//! receives a terminal job whose summary tallies successes and failures.
//!
//! The run is deliberately single-file: no fan-out, and a fixed pacing
//! sleep between consecutive items so the downstream service is never
//! hammered with back-to-back calls.

use common::model::batch::{BatchJob, BatchKind, BatchState, ItemOutcome, ProgressSnapshot};
use common::model::item::ItemKey;
use futures_util::FutureExt;
use log::debug;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors the orchestrator raises itself. Per-item failures never surface
/// here; they are recorded in the job's outcomes and the run keeps going.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    /// Another batch is already running on this orchestrator.
    #[error("a batch operation is already running")]
    Busy,
    /// The submitted snapshot contained no items.
    #[error("cannot start a batch operation on an empty selection")]
    EmptySelection,
}

/// Drives batch runs one at a time, with a fixed pacing delay between
/// consecutive item mutations.
pub struct BatchOrchestrator {
    running: Arc<AtomicBool>,
    pacing: Duration,
}

/// Holds the orchestrator's single-run slot. Dropping it releases the slot,
/// so the lock cannot leak even if the driving future is torn down mid-run.
struct RunSlot {
    running: Arc<AtomicBool>,
}

impl Drop for RunSlot {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

/// An acquired run: the job snapshot plus exclusive ownership of the run
/// slot until `execute` returns the terminal job.
pub struct PendingRun {
    job: BatchJob,
    pacing: Duration,
    _slot: RunSlot,
}

impl BatchOrchestrator {
    pub fn new(pacing: Duration) -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            pacing,
        }
    }

    /// Validates the snapshot and claims the single-run slot.
    ///
    /// Rejects an empty snapshot with `EmptySelection` before the slot is
    /// even consulted, and a concurrent submission with `Busy`. Neither
    /// path touches the state of an in-flight run.
    pub fn begin(&self, kind: BatchKind, items: Vec<ItemKey>) -> Result<PendingRun, BatchError> {
        if items.is_empty() {
            return Err(BatchError::EmptySelection);
        }
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(BatchError::Busy);
        }
        Ok(PendingRun {
            job: BatchJob::new(kind, items),
            pacing: self.pacing,
            _slot: RunSlot {
                running: Arc::clone(&self.running),
            },
        })
    }

    /// Runs a whole batch in one call: claim the slot, execute every item,
    /// return the terminal job.
    pub async fn run<M, Fut, E, P>(
        &self,
        kind: BatchKind,
        items: Vec<ItemKey>,
        mutate: M,
        progress: P,
    ) -> Result<BatchJob, BatchError>
    where
        M: Fn(ItemKey) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: fmt::Display,
        P: FnMut(ProgressSnapshot),
    {
        Ok(self.begin(kind, items)?.execute(mutate, progress).await)
    }
}

impl PendingRun {
    /// Number of items this run will attempt.
    pub fn total(&self) -> usize {
        self.job.items.len()
    }

    /// Executes the batch: strictly in snapshot order, one item at a time,
    /// sleeping the pacing delay between consecutive dispatches.
    ///
    /// Every failure mode of the mutation — an error return or a panic
    /// inside the future — becomes that item's recorded outcome, and the
    /// loop always reaches the last item. There is no retry of failed items
    /// and no rollback of succeeded ones.
    ///
    /// Progress is emitted before each dispatch, so an observer can tell
    /// which item is in flight; `completed` counts items attempted so far.
    pub async fn execute<M, Fut, E, P>(mut self, mutate: M, mut progress: P) -> BatchJob
    where
        M: Fn(ItemKey) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: fmt::Display,
        P: FnMut(ProgressSnapshot),
    {
        self.job.state = BatchState::Running;
        let total = self.job.items.len();

        for index in 0..total {
            let key = self.job.items[index].clone();
            progress(ProgressSnapshot {
                total: total as u32,
                completed: self.job.current as u32,
                label: format!("processing {} of {}", index + 1, total),
            });

            let outcome = match AssertUnwindSafe(mutate(key.clone())).catch_unwind().await {
                Ok(Ok(())) => ItemOutcome::Succeeded,
                Ok(Err(err)) => ItemOutcome::Failed(err.to_string()),
                Err(_) => ItemOutcome::Failed("mutation panicked".to_string()),
            };
            if let ItemOutcome::Failed(reason) = &outcome {
                debug!("item {} failed: {}", key, reason);
            }
            self.job.record(key, outcome);

            if index + 1 < total {
                tokio::time::sleep(self.pacing).await;
            }
        }

        self.job.state = BatchState::Completed;
        self.job
    }
}
