//! Insert Engine - leaf insertion, splits and root growth.
//!
//! Splits happen bottom-up: the leaf takes the new entry first, and if it
//! then holds `order` keys it is split and a separator is pushed into the
//! parent, which may overflow and split in turn.
//!
//! ```text
//! order 3, leaf overflow:
//!
//!   [10 20 30]          →       [20]
//!                              /    \
//!                          [10]    [20 30]
//! ```

use crate::common::config::NOT_FOUND;
use crate::common::{Error, NodeOffset, Result};
use crate::storage::node::NodeType;

use super::bplus_tree::BPlusTree;
use super::stats::TreeStats;

impl BPlusTree {
    /// Insert a new key.
    ///
    /// Keys are unique: inserting an existing key is an error, never an
    /// overwrite.
    ///
    /// # Errors
    /// - `Error::InvalidValue` if `value` is `-1`
    /// - `Error::DuplicateKey` if `key` is already present
    /// - `Error::ArenaExhausted` if a fixed arena cannot fit the nodes the
    ///   insert would allocate
    ///
    /// All three are detected before anything is written, so a failed
    /// insert leaves the tree exactly as it was.
    pub fn insert(&mut self, key: i32, value: i64) -> Result<()> {
        if value == NOT_FOUND {
            return Err(Error::InvalidValue(value));
        }

        let Some(leaf) = self.find_leaf(key)? else {
            return self.insert_first(key, value);
        };

        let index = match self.node(leaf)?.search(key)? {
            Ok(_) => return Err(Error::DuplicateKey(key)),
            Err(index) => index,
        };

        self.reserve_splits(leaf)?;

        self.node_mut(leaf)?.insert_entry(index, key, value)?;
        self.len += 1;

        if self.node(leaf)?.key_count() == self.layout.order() {
            self.split_leaf(leaf)?;
        }
        Ok(())
    }

    /// First insert: the root leaf is created with a single entry.
    fn insert_first(&mut self, key: i32, value: i64) -> Result<()> {
        let root = self.allocate_node(NodeType::Leaf, NodeOffset::NONE)?;
        self.node_mut(root)?.insert_entry(0, key, value)?;
        self.root = root;
        self.len = 1;

        tracing::debug!(root = %root, "created root leaf");
        Ok(())
    }

    /// Make sure the arena can fit every node this insert will allocate.
    ///
    /// A node splits exactly when it is already full before receiving one
    /// more entry, so the count is the run of full nodes from `leaf`
    /// upwards, plus one for a new root if that run reaches the root.
    fn reserve_splits(&self, leaf: NodeOffset) -> Result<()> {
        let max_keys = self.layout.max_keys();
        let mut needed = 0;
        let mut current = leaf;

        loop {
            let node = self.node(current)?;
            if node.key_count() < max_keys {
                break;
            }
            needed += 1;
            match node.parent().get() {
                Some(parent) => current = parent,
                None => {
                    needed += 1;
                    break;
                }
            }
        }

        let bytes = needed * self.layout.record_size();
        if !self.arena.can_allocate(bytes) {
            tracing::warn!(
                nodes = needed,
                bytes,
                available = self.arena.available(),
                "insert refused: arena cannot fit the required splits"
            );
            return Err(Error::ArenaExhausted {
                requested: bytes,
                available: self.arena.available(),
            });
        }
        Ok(())
    }

    /// Split an overflowing leaf.
    ///
    /// Entries `[mid, order)` move to a new right sibling, which is linked
    /// into the leaf chain after `leaf`. Its first key is copied up as the
    /// separator.
    fn split_leaf(&mut self, leaf: NodeOffset) -> Result<()> {
        let mid = self.layout.order() / 2;
        let (entries, parent, next) = {
            let node = self.node(leaf)?;
            (node.entries()?, node.parent(), node.next_leaf()?)
        };

        let sibling = self.allocate_node(NodeType::Leaf, parent)?;
        {
            let mut right = self.node_mut(sibling)?;
            right.set_entries(&entries[mid..])?;
            right.set_next_leaf(next)?;
        }
        {
            let mut left = self.node_mut(leaf)?;
            left.set_key_count(mid)?;
            left.set_next_leaf(sibling)?;
        }

        let separator = entries[mid].0;
        TreeStats::bump(&self.stats.leaf_splits);
        tracing::debug!(leaf = %leaf, sibling = %sibling, separator, "split leaf");

        self.insert_into_parent(leaf, separator, sibling)
    }

    /// Split an overflowing internal node.
    ///
    /// The key at `mid` moves up (it is not kept in either half); keys
    /// `[mid+1, order)` and children `[mid+1, order]` move to a new right
    /// sibling, and those children are re-parented.
    fn split_internal(&mut self, node: NodeOffset) -> Result<()> {
        let mid = self.layout.order() / 2;
        let (keys, children, parent) = {
            let view = self.node(node)?;
            (view.keys()?, view.children()?, view.parent())
        };

        let sibling = self.allocate_node(NodeType::Internal, parent)?;
        self.node_mut(sibling)?
            .set_separators(&keys[mid + 1..], &children[mid + 1..])?;
        self.node_mut(node)?.set_key_count(mid)?;

        for &child in &children[mid + 1..] {
            self.set_parent(child, sibling)?;
        }

        let separator = keys[mid];
        TreeStats::bump(&self.stats.internal_splits);
        tracing::debug!(node = %node, sibling = %sibling, separator, "split internal node");

        self.insert_into_parent(node, separator, sibling)
    }

    /// Hook a freshly split-off `right` into the parent of `left`.
    fn insert_into_parent(
        &mut self,
        left: NodeOffset,
        separator: i32,
        right: NodeOffset,
    ) -> Result<()> {
        let Some(parent) = self.parent_of(left)? else {
            return self.grow_root(left, separator, right);
        };

        let index = self.child_index(parent, left)?;
        self.node_mut(parent)?
            .insert_separator(index, separator, right)?;
        self.set_parent(right, parent)?;

        if self.node(parent)?.key_count() == self.layout.order() {
            self.split_internal(parent)?;
        }
        Ok(())
    }

    /// The root split: put a new root with one separator above both halves.
    fn grow_root(&mut self, left: NodeOffset, separator: i32, right: NodeOffset) -> Result<()> {
        let root = self.allocate_node(NodeType::Internal, NodeOffset::NONE)?;
        self.node_mut(root)?
            .set_separators(&[separator], &[left, right])?;
        self.set_parent(left, root)?;
        self.set_parent(right, root)?;
        self.root = root;

        TreeStats::bump(&self.stats.root_grows);
        tracing::debug!(root = %root, separator, "grew new root");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_rejects_sentinel_value() {
        let mut tree = BPlusTree::new(3, None).unwrap();
        assert_eq!(tree.insert(1, -1), Err(Error::InvalidValue(-1)));
        assert!(tree.is_empty());
        assert_eq!(tree.arena_used(), 0);
    }

    #[test]
    fn test_insert_rejects_duplicate() {
        let mut tree = BPlusTree::new(3, None).unwrap();
        tree.insert(7, 70).unwrap();

        assert_eq!(tree.insert(7, 71), Err(Error::DuplicateKey(7)));
        assert_eq!(tree.search(7).unwrap(), 70);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_leaf_split_order_3() {
        let mut tree = BPlusTree::new(3, None).unwrap();
        for key in [10, 20, 30] {
            tree.insert(key, key as i64).unwrap();
        }

        let root = tree.node(tree.root_offset().unwrap()).unwrap();
        assert!(!root.is_leaf());
        assert_eq!(root.keys().unwrap(), vec![20]);

        let left = tree.node(root.child(0).unwrap()).unwrap();
        let right = tree.node(root.child(1).unwrap()).unwrap();
        assert_eq!(left.keys().unwrap(), vec![10]);
        assert_eq!(right.keys().unwrap(), vec![20, 30]);
        assert_eq!(left.next_leaf().unwrap(), root.child(1).unwrap());
        assert!(right.next_leaf().unwrap().is_none());
    }

    #[test]
    fn test_internal_split_promotes_middle_key() {
        // order 3, ascending keys: the root splits once five keys are in.
        let mut tree = BPlusTree::new(3, None).unwrap();
        for key in 0..5 {
            tree.insert(key, key as i64).unwrap();
        }

        assert_eq!(tree.height().unwrap(), 3);
        let root = tree.node(tree.root_offset().unwrap()).unwrap();
        assert_eq!(root.keys().unwrap(), vec![2]);

        let left = tree.node(root.child(0).unwrap()).unwrap();
        let right = tree.node(root.child(1).unwrap()).unwrap();
        assert_eq!(left.keys().unwrap(), vec![1]);
        assert_eq!(right.keys().unwrap(), vec![3]);

        // Promoted key lives in neither half; both halves point back up.
        let root_offset = tree.root_offset().unwrap();
        assert_eq!(left.parent(), root_offset);
        assert_eq!(right.parent(), root_offset);

        let snapshot = tree.stats().snapshot();
        assert_eq!(snapshot.internal_splits, 1);
        assert_eq!(snapshot.root_grows, 2);
    }

    #[test]
    fn test_split_reparents_moved_children() {
        let mut tree = BPlusTree::new(3, None).unwrap();
        for key in 0..20 {
            tree.insert(key, key as i64).unwrap();
        }
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_insert_descending() {
        let mut tree = BPlusTree::new(4, None).unwrap();
        for key in (0..100).rev() {
            tree.insert(key, key as i64 * 2).unwrap();
        }

        tree.check_invariants().unwrap();
        for key in 0..100 {
            assert_eq!(tree.search(key).unwrap(), key as i64 * 2);
        }
    }

    #[test]
    fn test_extreme_keys() {
        let mut tree = BPlusTree::new(3, None).unwrap();
        for key in [i32::MIN, i32::MAX, 0, -1, 1] {
            tree.insert(key, 1).unwrap();
        }

        tree.check_invariants().unwrap();
        assert!(tree.contains_key(i32::MIN).unwrap());
        assert!(tree.contains_key(i32::MAX).unwrap());
    }

    #[test]
    fn test_exhaustion_leaves_tree_unchanged() {
        let order = 3;
        let record = BPlusTree::new(order, None).unwrap().record_size();
        // Room for the root leaf and one split sibling, but not a new root.
        let mut tree = BPlusTree::new(order, Some(record * 2)).unwrap();

        tree.insert(1, 10).unwrap();
        tree.insert(2, 20).unwrap();
        let used = tree.arena_used();

        let err = tree.insert(3, 30).unwrap_err();
        assert!(matches!(err, Error::ArenaExhausted { .. }));

        assert_eq!(tree.arena_used(), used);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.search(3).unwrap(), NOT_FOUND);
        assert_eq!(tree.height().unwrap(), 1);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_insert_many() {
        let mut tree = BPlusTree::new(5, None).unwrap();
        tree.insert_many((0..50).map(|k| (k, k as i64 + 1000))).unwrap();

        assert_eq!(tree.len(), 50);
        assert_eq!(tree.search(49).unwrap(), 1049);
    }

    #[test]
    fn test_insert_many_stops_at_first_error() {
        let mut tree = BPlusTree::new(5, None).unwrap();
        let err = tree
            .insert_many(vec![(1, 1), (2, 2), (1, 3), (4, 4)])
            .unwrap_err();

        assert_eq!(err, Error::DuplicateKey(1));
        assert_eq!(tree.len(), 2);
        assert!(!tree.contains_key(4).unwrap());
    }
}
