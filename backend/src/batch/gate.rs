//! Pre-flight confirmation for destructive or resource-creating batches.

use common::model::batch::BatchKind;
use common::model::item::ItemKey;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
    /// Arming was attempted with nothing selected.
    #[error("cannot start a batch operation on an empty selection")]
    EmptySelection,
    /// Confirmation was attempted with nothing armed.
    #[error("no batch operation is awaiting confirmation")]
    NothingPending,
}

/// Two-step gate in front of every batch: a non-empty selection snapshot is
/// armed first, then explicitly confirmed. Deleting and regenerating are
/// irreversible, so no job may exist until `confirm` has handed back the
/// armed snapshot.
///
/// The gate is a small state machine: empty (awaiting a selection), armed
/// (awaiting confirmation), and confirmed — which consumes the armed
/// snapshot and resets the gate.
#[derive(Debug, Default)]
pub struct ConfirmationGate {
    pending: Option<(BatchKind, Vec<ItemKey>)>,
}

impl ConfirmationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the gate with the snapshot to run. An empty snapshot is
    /// rejected here, before any job exists.
    pub fn arm(&mut self, kind: BatchKind, items: Vec<ItemKey>) -> Result<(), GateError> {
        if items.is_empty() {
            return Err(GateError::EmptySelection);
        }
        self.pending = Some((kind, items));
        Ok(())
    }

    /// The explicit confirmation step: hands back the armed snapshot and
    /// resets the gate.
    pub fn confirm(&mut self) -> Result<(BatchKind, Vec<ItemKey>), GateError> {
        self.pending.take().ok_or(GateError::NothingPending)
    }

    /// Abandons whatever was armed.
    pub fn dismiss(&mut self) {
        self.pending = None;
    }

    pub fn awaiting_confirmation(&self) -> bool {
        self.pending.is_some()
    }
}
