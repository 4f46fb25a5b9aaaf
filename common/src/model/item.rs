use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one certificate record: the order it belongs to plus the line
/// item within that order.
///
/// The two parts are kept as separate fields. Equality and hashing always
/// compare both, so two distinct records can never alias each other the way
/// joined strings can (`("a", "b:c")` vs `("a:b", "c")`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey {
    pub order_id: String,
    pub line_item_id: String,
}

impl ItemKey {
    pub fn new(order_id: impl Into<String>, line_item_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            line_item_id: line_item_id.into(),
        }
    }
}

impl fmt::Display for ItemKey {
    /// Display form is for labels and log lines only, never for identity.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.order_id, self.line_item_id)
    }
}
