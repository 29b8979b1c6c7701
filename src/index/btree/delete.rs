//! Delete Engine - leaf removal and underflow repair.
//!
//! After a removal, a non-root node left with fewer than `min_keys` keys is
//! repaired in this order of preference:
//!
//! 1. borrow one entry from the left sibling, if it can spare one
//! 2. borrow one entry from the right sibling, if it can spare one
//! 3. merge with a sibling (left preferred) and repair the parent, which
//!    just lost a separator
//!
//! Merged-away records are left in the arena, unreachable.

use crate::common::{Error, NodeOffset, Result};

use super::bplus_tree::BPlusTree;
use super::stats::TreeStats;

impl BPlusTree {
    /// Remove `key` from the tree.
    ///
    /// # Errors
    /// - `Error::KeyNotFound` if `key` is absent. Nothing is modified.
    pub fn delete(&mut self, key: i32) -> Result<()> {
        let leaf = self.find_leaf(key)?.ok_or(Error::KeyNotFound(key))?;
        let index = match self.node(leaf)?.search(key)? {
            Ok(index) => index,
            Err(_) => return Err(Error::KeyNotFound(key)),
        };

        self.node_mut(leaf)?.remove_entry(index)?;
        self.len -= 1;

        self.rebalance(leaf)
    }

    /// Repair `node` if it has underflowed, then walk up as merges require.
    fn rebalance(&mut self, node: NodeOffset) -> Result<()> {
        let min_keys = self.layout.min_keys();
        let (parent, key_count) = {
            let view = self.node(node)?;
            (view.parent(), view.key_count())
        };

        // The root has no lower bound, but an empty internal root must go.
        let Some(parent) = parent.get() else {
            return self.shrink_root();
        };
        if key_count >= min_keys {
            return Ok(());
        }

        let siblings = self.siblings(parent, node)?;

        if let Some(left) = siblings.left {
            if self.node(left)?.key_count() > min_keys {
                return self.borrow_from_left(parent, siblings.index, node, left);
            }
        }
        if let Some(right) = siblings.right {
            if self.node(right)?.key_count() > min_keys {
                return self.borrow_from_right(parent, siblings.index, node, right);
            }
        }

        match (siblings.left, siblings.right) {
            (Some(left), _) => self.merge(parent, siblings.index - 1, left, node)?,
            (None, Some(right)) => self.merge(parent, siblings.index, node, right)?,
            (None, None) => {
                return Err(Error::InvariantViolated {
                    offset: parent,
                    reason: "internal node with a single child".to_string(),
                })
            }
        }

        self.rebalance(parent)
    }

    /// Move the last entry of `left` to the front of `node`.
    ///
    /// `index` is `node`'s slot in `parent`; the separator between the two
    /// is `keys[index - 1]`.
    fn borrow_from_left(
        &mut self,
        parent: NodeOffset,
        index: usize,
        node: NodeOffset,
        left: NodeOffset,
    ) -> Result<()> {
        let separator_index = index - 1;

        if self.node(node)?.is_leaf() {
            let (key, value) = {
                let mut sibling = self.node_mut(left)?;
                let last = sibling.key_count() - 1;
                sibling.remove_entry(last)?
            };
            self.node_mut(node)?.insert_entry(0, key, value)?;
            // The borrowed key is now the smallest key right of the separator.
            self.node_mut(parent)?.set_key(separator_index, key)?;
        } else {
            let separator = self.node(parent)?.key(separator_index)?;
            let (last_key, last_child) = {
                let mut sibling = self.node_mut(left)?;
                let count = sibling.key_count();
                let view = sibling.as_node();
                let taken = (view.key(count - 1)?, view.child(count)?);
                sibling.set_key_count(count - 1)?;
                taken
            };
            // The old separator comes down, the sibling's last key goes up.
            self.node_mut(node)?.push_front(separator, last_child)?;
            self.set_parent(last_child, node)?;
            self.node_mut(parent)?.set_key(separator_index, last_key)?;
        }

        TreeStats::bump(&self.stats.borrows);
        tracing::debug!(node = %node, sibling = %left, "borrowed from left sibling");
        Ok(())
    }

    /// Move the first entry of `right` to the end of `node`.
    ///
    /// The separator between the two is `keys[index]` in `parent`.
    fn borrow_from_right(
        &mut self,
        parent: NodeOffset,
        index: usize,
        node: NodeOffset,
        right: NodeOffset,
    ) -> Result<()> {
        if self.node(node)?.is_leaf() {
            let (key, value) = self.node_mut(right)?.remove_entry(0)?;
            let end = self.node(node)?.key_count();
            self.node_mut(node)?.insert_entry(end, key, value)?;

            let new_first = self.node(right)?.key(0)?;
            self.node_mut(parent)?.set_key(index, new_first)?;
        } else {
            let separator = self.node(parent)?.key(index)?;
            let (first_key, first_child) = self.node_mut(right)?.pop_front()?;
            let end = self.node(node)?.key_count();
            self.node_mut(node)?
                .insert_separator(end, separator, first_child)?;
            self.set_parent(first_child, node)?;
            self.node_mut(parent)?.set_key(index, first_key)?;
        }

        TreeStats::bump(&self.stats.borrows);
        tracing::debug!(node = %node, sibling = %right, "borrowed from right sibling");
        Ok(())
    }

    /// Fold `right` into `left` and drop `right` from `parent`.
    ///
    /// `separator_index` is the parent key between the two. For internal
    /// nodes that key comes down between the halves; for leaves it is
    /// simply discarded and the leaf chain skips over `right`.
    fn merge(
        &mut self,
        parent: NodeOffset,
        separator_index: usize,
        left: NodeOffset,
        right: NodeOffset,
    ) -> Result<()> {
        if self.node(left)?.is_leaf() {
            let (right_entries, right_next) = {
                let view = self.node(right)?;
                (view.entries()?, view.next_leaf()?)
            };
            let mut entries = self.node(left)?.entries()?;
            entries.extend(right_entries);

            let mut merged = self.node_mut(left)?;
            merged.set_entries(&entries)?;
            merged.set_next_leaf(right_next)?;
        } else {
            let separator = self.node(parent)?.key(separator_index)?;
            let (right_keys, right_children) = {
                let view = self.node(right)?;
                (view.keys()?, view.children()?)
            };
            let (mut keys, mut children) = {
                let view = self.node(left)?;
                (view.keys()?, view.children()?)
            };
            keys.push(separator);
            keys.extend(right_keys);
            children.extend(right_children.iter().copied());

            self.node_mut(left)?.set_separators(&keys, &children)?;
            for child in right_children {
                self.set_parent(child, left)?;
            }
        }

        let (_, removed) = self.node_mut(parent)?.remove_separator(separator_index)?;
        debug_assert_eq!(removed, right);

        TreeStats::bump(&self.stats.merges);
        tracing::debug!(left = %left, right = %right, parent = %parent, "merged siblings");
        Ok(())
    }

    /// Replace an empty internal root with its only child.
    fn shrink_root(&mut self) -> Result<()> {
        let root = self.root;
        let child = {
            let view = self.node(root)?;
            if view.is_leaf() || view.key_count() > 0 {
                return Ok(());
            }
            view.child(0)?
        };

        self.set_parent(child, NodeOffset::NONE)?;
        self.root = child;

        TreeStats::bump(&self.stats.root_shrinks);
        tracing::debug!(old_root = %root, new_root = %child, "shrank root");
        Ok(())
    }
}
