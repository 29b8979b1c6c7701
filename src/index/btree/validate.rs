//! Whole-tree structural checks.

use crate::common::{Error, NodeOffset, Result};

use super::bplus_tree::BPlusTree;

fn violation(offset: NodeOffset, reason: impl Into<String>) -> Error {
    Error::InvariantViolated {
        offset,
        reason: reason.into(),
    }
}

/// What the depth-first pass collects on the way down.
#[derive(Default)]
struct Walk {
    leaves: Vec<NodeOffset>,
    leaf_depth: Option<usize>,
    keys: usize,
    visited: usize,
}

impl BPlusTree {
    /// Verify every structural invariant of the tree.
    ///
    /// Checks, for every node reachable from the root:
    /// - keys strictly ascending and inside the range its ancestors allow
    /// - at most `max_keys` keys, and at least `min_keys` unless it is the root
    /// - the parent field names the node that actually points to it
    /// - all leaves at the same depth
    ///
    /// and for the tree as a whole that the leaf chain visits exactly the
    /// leaves in key order and that `len` matches the stored keys.
    ///
    /// # Errors
    /// - `Error::InvariantViolated` naming the first offending node
    /// - any decode error hit while reading a record
    pub fn check_invariants(&self) -> Result<()> {
        let Some(root) = self.root.get() else {
            if self.len != 0 {
                return Err(violation(
                    NodeOffset::NONE,
                    format!("no root but len is {}", self.len),
                ));
            }
            return Ok(());
        };

        if self.node(root)?.parent().is_some() {
            return Err(violation(root, "root has a parent"));
        }

        let mut walk = Walk::default();
        self.check_subtree(root, None, None, 0, &mut walk)?;

        if walk.keys != self.len {
            return Err(violation(
                root,
                format!("tree holds {} keys but len is {}", walk.keys, self.len),
            ));
        }

        self.check_leaf_chain(&walk.leaves)
    }

    fn check_subtree(
        &self,
        offset: NodeOffset,
        lower: Option<i32>,
        upper: Option<i32>,
        depth: usize,
        walk: &mut Walk,
    ) -> Result<()> {
        walk.visited += 1;
        if walk.visited > self.node_capacity() {
            return Err(violation(offset, "node reachable more than once"));
        }

        let node = self.node(offset)?;
        let count = node.key_count();
        let is_root = offset == self.root;

        if count > self.layout.max_keys() {
            return Err(violation(
                offset,
                format!("{} keys exceeds max {}", count, self.layout.max_keys()),
            ));
        }
        if !is_root && count < self.layout.min_keys() {
            return Err(violation(
                offset,
                format!("{} keys is below min {}", count, self.layout.min_keys()),
            ));
        }

        let keys = node.keys()?;
        if keys.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(violation(offset, format!("keys not ascending: {:?}", keys)));
        }
        if let (Some(lower), Some(&first)) = (lower, keys.first()) {
            if first < lower {
                return Err(violation(offset, format!("key {} below bound {}", first, lower)));
            }
        }
        if let (Some(upper), Some(&last)) = (upper, keys.last()) {
            if last >= upper {
                return Err(violation(offset, format!("key {} not below bound {}", last, upper)));
            }
        }

        if node.is_leaf() {
            match walk.leaf_depth {
                Some(expected) if expected != depth => {
                    return Err(violation(
                        offset,
                        format!("leaf at depth {} but others at {}", depth, expected),
                    ));
                }
                _ => walk.leaf_depth = Some(depth),
            }
            walk.leaves.push(offset);
            walk.keys += count;
            return Ok(());
        }

        if count == 0 {
            return Err(violation(offset, "internal node with no keys"));
        }

        let children = node.children()?;
        for (index, &child) in children.iter().enumerate() {
            let parent = self.node(child)?.parent();
            if parent != offset {
                return Err(violation(
                    child,
                    format!("parent field is {} but {} points here", parent, offset),
                ));
            }

            let child_lower = if index == 0 { lower } else { Some(keys[index - 1]) };
            let child_upper = if index == count { upper } else { Some(keys[index]) };
            self.check_subtree(child, child_lower, child_upper, depth + 1, walk)?;
        }
        Ok(())
    }

    fn check_leaf_chain(&self, leaves: &[NodeOffset]) -> Result<()> {
        let mut previous_key: Option<i32> = None;

        for (position, &leaf) in leaves.iter().enumerate() {
            let node = self.node(leaf)?;
            let expected_next = leaves.get(position + 1).copied().unwrap_or(NodeOffset::NONE);
            let next = node.next_leaf()?;
            if next != expected_next {
                return Err(violation(
                    leaf,
                    format!("next leaf is {} but expected {}", next, expected_next),
                ));
            }

            for key in node.keys()? {
                if previous_key.is_some_and(|previous| previous >= key) {
                    return Err(violation(leaf, format!("leaf chain not ascending at {}", key)));
                }
                previous_key = Some(key);
            }
        }
        Ok(())
    }
}
