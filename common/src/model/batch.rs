use crate::model::item::ItemKey;
use serde::{Deserialize, Serialize};

/// Which single-item mutation a batch applies to every selected record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchKind {
    /// Create the certificate artifact for a line item.
    Generate,
    /// Create it again; the downstream service invalidates the previous
    /// artifact and its URL.
    Regenerate,
    /// Remove the certificate record.
    Delete,
}

impl std::fmt::Display for BatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            BatchKind::Generate => "generate",
            BatchKind::Regenerate => "regenerate",
            BatchKind::Delete => "delete",
        })
    }
}

/// Progress of a running batch, emitted before each item is dispatched.
///
/// Purely observational: nothing in the run loop reads it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub total: u32,
    /// Items attempted so far, not items known to have succeeded.
    pub completed: u32,
    pub label: String,
}

/// Terminal tally of one batch run. `succeeded + failed == total` once the
/// run has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub succeeded: u32,
    pub failed: u32,
    pub total: u32,
}

/// How a single item ended up. The failure text is display-only; nothing
/// branches on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemOutcome {
    Succeeded,
    Failed(String),
}

/// Outcome record for one item within a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub key: ItemKey,
    pub outcome: ItemOutcome,
}

/// Lifecycle of a batch job. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchState {
    Idle,
    Running,
    Completed,
}

/// One run of the orchestrator over a fixed item sequence.
///
/// Owned exclusively by the orchestrator while it runs and discarded once
/// its summary has been delivered; never persisted. `items` is the snapshot
/// taken at submit time — the live selection may change underneath without
/// affecting an in-flight run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchJob {
    pub kind: BatchKind,
    pub items: Vec<ItemKey>,
    pub state: BatchState,
    /// Number of items attempted so far.
    pub current: usize,
    /// One record per attempted item, in processing order.
    pub outcomes: Vec<ItemRecord>,
}

impl BatchJob {
    pub fn new(kind: BatchKind, items: Vec<ItemKey>) -> Self {
        Self {
            kind,
            items,
            state: BatchState::Idle,
            current: 0,
            outcomes: Vec::new(),
        }
    }

    /// Records the outcome of the item just attempted.
    pub fn record(&mut self, key: ItemKey, outcome: ItemOutcome) {
        self.outcomes.push(ItemRecord { key, outcome });
        self.current = self.outcomes.len();
    }

    /// Folds the recorded outcomes into the terminal tally.
    pub fn summary(&self) -> BatchSummary {
        let succeeded = self
            .outcomes
            .iter()
            .filter(|r| matches!(r.outcome, ItemOutcome::Succeeded))
            .count() as u32;
        let failed = self.outcomes.len() as u32 - succeeded;
        BatchSummary {
            succeeded,
            failed,
            total: self.items.len() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: u32) -> ItemKey {
        ItemKey::new("ord-1", format!("li-{n}"))
    }

    #[test]
    fn record_keeps_processing_order_and_counts_attempts() {
        let mut job = BatchJob::new(BatchKind::Generate, vec![key(1), key(2)]);
        assert_eq!(job.current, 0);

        job.record(key(1), ItemOutcome::Succeeded);
        job.record(key(2), ItemOutcome::Failed("timeout".to_string()));

        assert_eq!(job.current, 2);
        assert_eq!(job.outcomes[0].key, key(1));
        assert_eq!(job.outcomes[1].key, key(2));
    }

    #[test]
    fn summary_is_a_fold_over_outcomes() {
        let mut job = BatchJob::new(BatchKind::Delete, vec![key(1), key(2), key(3)]);
        job.record(key(1), ItemOutcome::Succeeded);
        job.record(key(2), ItemOutcome::Failed("timeout".to_string()));
        job.record(key(3), ItemOutcome::Succeeded);

        let summary = job.summary();
        assert_eq!(
            summary,
            BatchSummary {
                succeeded: 2,
                failed: 1,
                total: 3
            }
        );
        assert_eq!(summary.succeeded + summary.failed, summary.total);
    }
}
