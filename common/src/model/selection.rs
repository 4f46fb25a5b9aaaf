use crate::model::item::ItemKey;
use serde::{Deserialize, Serialize};

/// The set of certificate records a caller has picked for the next batch
/// operation.
///
/// Keys keep the order in which they were selected, and `snapshot` hands
/// that order to a batch run unchanged. All operations are total: toggling,
/// replacing and clearing never fail, and none of them touches the network.
///
/// The set is expected to be cleared by its owner after a batch completes
/// successfully, and again whenever the visible item list changes shape
/// (e.g. after a refresh), so a stale key can never be submitted.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SelectionSet {
    keys: Vec<ItemKey>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership of `key`: absent keys are added at the end, present
    /// keys are removed.
    pub fn toggle(&mut self, key: ItemKey) {
        match self.keys.iter().position(|k| k == &key) {
            Some(idx) => {
                self.keys.remove(idx);
            }
            None => self.keys.push(key),
        }
    }

    /// Replaces the selection with exactly `visible`, in the given order.
    /// Duplicate keys in the input are collapsed.
    pub fn select_all(&mut self, visible: &[ItemKey]) {
        self.keys.clear();
        for key in visible {
            if !self.keys.contains(key) {
                self.keys.push(key.clone());
            }
        }
    }

    /// Empties the selection unconditionally.
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn contains(&self, key: &ItemKey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Ordered copy of the current selection. A batch run owns its snapshot,
    /// so later changes to the live set cannot reach an in-flight run.
    pub fn snapshot(&self) -> Vec<ItemKey> {
        self.keys.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: u32) -> ItemKey {
        ItemKey::new("ord-1", format!("li-{n}"))
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut set = SelectionSet::new();
        set.toggle(key(1));
        assert!(set.contains(&key(1)));
        assert_eq!(set.len(), 1);

        set.toggle(key(1));
        assert!(!set.contains(&key(1)));
        assert!(set.is_empty());
    }

    #[test]
    fn toggle_never_duplicates() {
        let mut set = SelectionSet::new();
        set.toggle(key(1));
        set.toggle(key(2));
        set.toggle(key(1));
        set.toggle(key(1));
        assert_eq!(set.snapshot(), vec![key(2), key(1)]);
    }

    #[test]
    fn select_all_replaces_previous_selection() {
        let mut set = SelectionSet::new();
        set.toggle(key(9));
        set.select_all(&[key(1), key(2), key(2), key(3)]);
        assert_eq!(set.snapshot(), vec![key(1), key(2), key(3)]);
    }

    #[test]
    fn clear_empties_unconditionally() {
        let mut set = SelectionSet::new();
        set.select_all(&[key(1), key(2)]);
        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    fn snapshot_is_detached_from_the_live_set() {
        let mut set = SelectionSet::new();
        set.select_all(&[key(1), key(2)]);
        let snapshot = set.snapshot();
        set.toggle(key(3));
        set.clear();
        assert_eq!(snapshot, vec![key(1), key(2)]);
    }
}
