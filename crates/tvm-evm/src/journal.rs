//! Map with an append-only undo journal and nested checkpoints.
//!
//! Every write records the key and the value it replaced (or its absence).
//! A checkpoint is the journal length at the time it was taken plus its
//! position in the stack of open checkpoints, so taking one is O(1) and
//! reverting costs O(writes since).
//!
//! Checkpoints must be closed innermost-first, exactly once. Closing a
//! checkpoint that is not the innermost open one panics.

use std::collections::HashMap;
use std::hash::Hash;

/// Handle returned by [`JournaledMap::snapshot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    id: u64,
    depth: usize,
    journal_len: usize,
}

impl Checkpoint {
    /// Nesting depth of the checkpoint (1 for the outermost)
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Journal length when the checkpoint was taken
    pub fn journal_len(&self) -> usize {
        self.journal_len
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenCheckpoint {
    id: u64,
    journal_len: usize,
}

/// Key/value map whose writes can be undone back to a checkpoint
#[derive(Debug, Clone)]
pub struct JournaledMap<K, V> {
    entries: HashMap<K, V>,
    journal: Vec<(K, Option<V>)>,
    checkpoints: Vec<OpenCheckpoint>,
    next_id: u64,
}

impl<K, V> Default for JournaledMap<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            journal: Vec::new(),
            checkpoints: Vec::new(),
            next_id: 0,
        }
    }
}

impl<K, V> JournaledMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone + PartialEq,
{
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a key without touching the journal
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Write a value, journaling what it replaces.
    ///
    /// Nothing is journaled while no checkpoint is open.
    pub fn insert(&mut self, key: K, value: V) {
        let previous = self.entries.insert(key.clone(), value);
        if self.checkpoints.is_empty() || previous.as_ref() == self.entries.get(&key) {
            return;
        }
        self.journal.push((key, previous));
    }

    /// Open a checkpoint
    pub fn snapshot(&mut self) -> Checkpoint {
        let id = self.next_id;
        self.next_id += 1;
        let journal_len = self.journal.len();
        self.checkpoints.push(OpenCheckpoint { id, journal_len });
        Checkpoint {
            id,
            depth: self.checkpoints.len(),
            journal_len,
        }
    }

    /// Undo every write made since `checkpoint` and close it.
    ///
    /// # Panics
    ///
    /// Panics if `checkpoint` is not the innermost open checkpoint.
    pub fn revert(&mut self, checkpoint: Checkpoint) {
        let journal_len = self.close(checkpoint);
        while self.journal.len() > journal_len {
            let Some((key, previous)) = self.journal.pop() else {
                break;
            };
            match previous {
                Some(value) => {
                    self.entries.insert(key, value);
                }
                None => {
                    self.entries.remove(&key);
                }
            }
        }
    }

    /// Keep every write made since `checkpoint` and close it.
    ///
    /// Undo records stay in the journal while an enclosing checkpoint is
    /// open.
    ///
    /// # Panics
    ///
    /// Panics if `checkpoint` is not the innermost open checkpoint.
    pub fn commit(&mut self, checkpoint: Checkpoint) {
        self.close(checkpoint);
        if self.checkpoints.is_empty() {
            self.journal.clear();
        }
    }

    /// Drop every entry, the journal and all open checkpoints
    pub fn clear(&mut self) {
        self.entries.clear();
        self.journal.clear();
        self.checkpoints.clear();
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no live entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of undo records
    pub fn journal_len(&self) -> usize {
        self.journal.len()
    }

    /// Number of open checkpoints
    pub fn depth(&self) -> usize {
        self.checkpoints.len()
    }

    /// Iterate over live entries in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter()
    }

    /// Pop the innermost open checkpoint, returning the journal length it
    /// recorded
    fn close(&mut self, checkpoint: Checkpoint) -> usize {
        let innermost = self.checkpoints.last().map(|open| open.id);
        assert!(
            innermost == Some(checkpoint.id) && self.checkpoints.len() == checkpoint.depth,
            "stale or out-of-order checkpoint (depth {}, open {})",
            checkpoint.depth,
            self.checkpoints.len()
        );
        let journal_len = self
            .checkpoints
            .pop()
            .map_or(checkpoint.journal_len, |open| open.journal_len);
        debug_assert!(self.journal.len() >= journal_len);
        journal_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get() {
        let mut map = JournaledMap::new();
        assert_eq!(map.get(&1), None);
        map.insert(1, 10);
        assert_eq!(map.get(&1), Some(&10));
        assert_eq!(map.len(), 1);
        assert!(!map.is_empty());
    }

    #[test]
    fn test_get_never_inserts() {
        let map: JournaledMap<u8, u8> = JournaledMap::new();
        assert_eq!(map.get(&7), None);
        assert!(map.is_empty());
        assert_eq!(map.journal_len(), 0);
    }

    #[test]
    fn test_revert_restores_absence() {
        let mut map = JournaledMap::new();
        let cp = map.snapshot();
        map.insert(1, 10);
        map.insert(1, 11);
        map.revert(cp);
        assert_eq!(map.get(&1), None);
        assert!(map.is_empty());
        assert_eq!(map.journal_len(), 0);
    }

    #[test]
    fn test_revert_restores_previous_value() {
        let mut map = JournaledMap::new();
        map.insert(1, 10);
        let cp = map.snapshot();
        map.insert(1, 20);
        map.insert(2, 30);
        map.revert(cp);
        assert_eq!(map.get(&1), Some(&10));
        assert_eq!(map.get(&2), None);
    }

    #[test]
    fn test_nested_inner_revert_outer_commit() {
        let mut map = JournaledMap::new();
        let outer = map.snapshot();
        map.insert(1, 1);
        let inner = map.snapshot();
        map.insert(1, 2);
        map.insert(2, 2);
        map.revert(inner);
        assert_eq!(map.get(&1), Some(&1));
        assert_eq!(map.get(&2), None);
        map.commit(outer);
        assert_eq!(map.get(&1), Some(&1));
        assert_eq!(map.journal_len(), 0);
        assert_eq!(map.depth(), 0);
    }

    #[test]
    fn test_inner_commit_then_outer_revert() {
        let mut map = JournaledMap::new();
        let outer = map.snapshot();
        let inner = map.snapshot();
        map.insert(1, 5);
        map.commit(inner);
        // The outer checkpoint can still undo the inner write
        assert_eq!(map.journal_len(), 1);
        map.revert(outer);
        assert_eq!(map.get(&1), None);
    }

    #[test]
    fn test_identical_write_not_journaled() {
        let mut map = JournaledMap::new();
        let _cp = map.snapshot();
        map.insert(1, 5);
        assert_eq!(map.journal_len(), 1);
        map.insert(1, 5);
        assert_eq!(map.journal_len(), 1);
    }

    #[test]
    fn test_no_journal_without_checkpoint() {
        let mut map = JournaledMap::new();
        map.insert(1, 5);
        map.insert(1, 6);
        assert_eq!(map.journal_len(), 0);
        assert_eq!(map.get(&1), Some(&6));
    }

    #[test]
    fn test_clear() {
        let mut map = JournaledMap::new();
        let _cp = map.snapshot();
        map.insert(1, 1);
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.journal_len(), 0);
        assert_eq!(map.depth(), 0);
    }

    #[test]
    fn test_checkpoint_accessors() {
        let mut map = JournaledMap::new();
        let a = map.snapshot();
        map.insert(1, 1);
        let b = map.snapshot();
        assert_eq!(a.depth(), 1);
        assert_eq!(b.depth(), 2);
        assert_eq!(a.journal_len(), 0);
        assert_eq!(b.journal_len(), 1);
        map.commit(b);
        map.commit(a);
    }

    #[test]
    fn test_revert_stops_at_recorded_position() {
        let mut map = JournaledMap::new();
        let _outer = map.snapshot();
        map.insert(1, 1);
        let inner = map.snapshot();
        map.insert(2, 2);

        // Same id and depth as `inner`, taken before any write
        let mut other: JournaledMap<u8, u8> = JournaledMap::new();
        let _ = other.snapshot();
        let lookalike = other.snapshot();
        assert_eq!(lookalike.depth(), inner.depth());
        assert_ne!(lookalike.journal_len(), inner.journal_len());

        map.revert(lookalike);
        assert_eq!(map.get(&2), None);
        assert_eq!(map.get(&1), Some(&1));
        assert_eq!(map.journal_len(), 1);
    }

    #[test]
    #[should_panic(expected = "stale or out-of-order checkpoint")]
    fn test_stale_checkpoint_panics() {
        let mut map: JournaledMap<u8, u8> = JournaledMap::new();
        let cp = map.snapshot();
        map.commit(cp);
        map.revert(cp);
    }

    #[test]
    #[should_panic(expected = "stale or out-of-order checkpoint")]
    fn test_stale_checkpoint_same_position_panics() {
        let mut map: JournaledMap<u8, u8> = JournaledMap::new();
        let first = map.snapshot();
        map.revert(first);
        let _second = map.snapshot();
        // Same depth and journal length as `second`, but already closed
        map.revert(first);
    }

    #[test]
    #[should_panic(expected = "stale or out-of-order checkpoint")]
    fn test_out_of_order_checkpoint_panics() {
        let mut map: JournaledMap<u8, u8> = JournaledMap::new();
        let outer = map.snapshot();
        let _inner = map.snapshot();
        map.commit(outer);
    }
}
