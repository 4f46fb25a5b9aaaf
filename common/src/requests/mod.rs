use crate::model::batch::BatchKind;
use crate::model::item::ItemKey;
use serde::{Deserialize, Serialize};

/// Request payload for the batch start endpoint.
///
/// `confirmed` carries the caller's explicit confirmation step. A submit
/// without it is rejected before any job is created; the batch kinds are
/// destructive or resource-creating, so the extra friction is deliberate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartBatchRequest {
    pub kind: BatchKind,
    pub items: Vec<ItemKey>,
    pub confirmed: bool,
}
