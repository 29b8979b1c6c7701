//! Tree Navigator - root-to-leaf descent and parent/sibling lookup.

use crate::common::{Error, NodeOffset, Result};

use super::bplus_tree::BPlusTree;

/// Position of a node among its parent's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Siblings {
    /// Slot of the node in the parent's `children`.
    pub index: usize,
    /// Child immediately to the left, if any.
    pub left: Option<NodeOffset>,
    /// Child immediately to the right, if any.
    pub right: Option<NodeOffset>,
}

impl BPlusTree {
    /// Find the leaf whose key range covers `key`.
    ///
    /// At each internal node, descends into the first child whose separator
    /// is greater than `key`, or the last child if there is none. Returns
    /// `None` only before the first insert.
    ///
    /// # Errors
    /// Corruption-class errors, including `InvariantViolated` if the descent
    /// visits more nodes than the arena holds (a cycle).
    pub fn find_leaf(&self, key: i32) -> Result<Option<NodeOffset>> {
        let Some(mut current) = self.root.get() else {
            return Ok(None);
        };

        let limit = self.node_capacity();
        for _ in 0..=limit {
            let node = self.node(current)?;
            if node.is_leaf() {
                return Ok(Some(current));
            }
            let index = node.child_index_for(key)?;
            let child = node.child(index)?;
            tracing::trace!(node = %current, index, child = %child, "descend");
            current = child;
        }

        Err(Error::InvariantViolated {
            offset: current,
            reason: format!("descent did not reach a leaf within {} nodes", limit),
        })
    }

    /// Leftmost leaf, where the leaf chain starts.
    pub(crate) fn first_leaf(&self) -> Result<Option<NodeOffset>> {
        self.find_leaf(i32::MIN)
    }

    /// Parent of `node`, or `None` if it is the root.
    pub fn parent_of(&self, node: NodeOffset) -> Result<Option<NodeOffset>> {
        Ok(self.node(node)?.parent().get())
    }

    /// Locate `child` among `parent`'s children and report its neighbours.
    ///
    /// # Errors
    /// - `Error::InvariantViolated` if `child` is not in `parent`
    pub fn siblings(&self, parent: NodeOffset, child: NodeOffset) -> Result<Siblings> {
        let index = self.child_index(parent, child)?;
        let node = self.node(parent)?;

        let left = if index > 0 {
            Some(node.child(index - 1)?)
        } else {
            None
        };
        let right = if index < node.key_count() {
            Some(node.child(index + 1)?)
        } else {
            None
        };

        Ok(Siblings { index, left, right })
    }

    /// Slot of `child` in `parent`'s children.
    pub(crate) fn child_index(&self, parent: NodeOffset, child: NodeOffset) -> Result<usize> {
        let node = self.node(parent)?;
        for index in 0..=node.key_count() {
            if node.child(index)? == child {
                return Ok(index);
            }
        }

        Err(Error::InvariantViolated {
            offset: child,
            reason: format!("not among the children of its parent {}", parent),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with_keys(order: usize, keys: impl IntoIterator<Item = i32>) -> BPlusTree {
        let mut tree = BPlusTree::new(order, None).unwrap();
        for key in keys {
            tree.insert(key, key as i64 * 10).unwrap();
        }
        tree
    }

    #[test]
    fn test_find_leaf_empty_tree() {
        let tree = BPlusTree::new(3, None).unwrap();
        assert_eq!(tree.find_leaf(7).unwrap(), None);
    }

    #[test]
    fn test_find_leaf_single_leaf() {
        let tree = tree_with_keys(4, [1, 2]);
        let root = tree.root_offset().unwrap();

        assert_eq!(tree.find_leaf(-100).unwrap(), Some(root));
        assert_eq!(tree.find_leaf(100).unwrap(), Some(root));
    }

    #[test]
    fn test_find_leaf_routes_equal_keys_right() {
        // order 3: [0] [1, 2] under root [1]
        let tree = tree_with_keys(3, 0..3);
        let root = tree.root_offset().unwrap();
        let root_node = tree.node(root).unwrap();
        assert_eq!(root_node.keys().unwrap(), vec![1]);

        let left = root_node.child(0).unwrap();
        let right = root_node.child(1).unwrap();
        assert_eq!(tree.find_leaf(0).unwrap(), Some(left));
        assert_eq!(tree.find_leaf(1).unwrap(), Some(right));
        assert_eq!(tree.find_leaf(2).unwrap(), Some(right));
    }

    #[test]
    fn test_parent_of() {
        let tree = tree_with_keys(3, 0..3);
        let root = tree.root_offset().unwrap();
        let leaf = tree.find_leaf(0).unwrap().unwrap();

        assert_eq!(tree.parent_of(root).unwrap(), None);
        assert_eq!(tree.parent_of(leaf).unwrap(), Some(root));
    }

    #[test]
    fn test_siblings() {
        // order 4 with 0..9: root [2, 4, 6] over four leaves
        let tree = tree_with_keys(4, 0..9);
        let root = tree.root_offset().unwrap();
        assert_eq!(tree.node(root).unwrap().keys().unwrap(), vec![2, 4, 6]);
        let children = tree.node(root).unwrap().children().unwrap();
        assert_eq!(children.len(), 4);

        let first = tree.siblings(root, children[0]).unwrap();
        assert_eq!(first.index, 0);
        assert_eq!(first.left, None);
        assert_eq!(first.right, Some(children[1]));

        let last_index = children.len() - 1;
        let last = tree.siblings(root, children[last_index]).unwrap();
        assert_eq!(last.index, last_index);
        assert_eq!(last.left, Some(children[last_index - 1]));
        assert_eq!(last.right, None);
    }

    #[test]
    fn test_siblings_of_stranger() {
        let tree = tree_with_keys(3, 0..3);
        let root = tree.root_offset().unwrap();

        let err = tree.siblings(root, root).unwrap_err();
        assert!(matches!(err, Error::InvariantViolated { .. }));
    }
}
