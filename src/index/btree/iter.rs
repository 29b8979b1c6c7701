//! Ordered scans over the leaf chain and a breadth-first node walk.

use std::collections::VecDeque;
use std::ops::{Bound, RangeBounds};

use crate::common::{Error, NodeOffset, Result};
use crate::storage::node::NodeType;

use super::bplus_tree::BPlusTree;

/// Iterator over `(key, value)` pairs in ascending key order.
///
/// Created by [`BPlusTree::range`] and [`BPlusTree::iter`]. It follows the
/// leaf chain, so after the first leaf no internal node is read. A record
/// that fails to decode is yielded once as an error and ends the scan.
pub struct Range<'a> {
    tree: &'a BPlusTree,
    leaf: NodeOffset,
    index: usize,
    end: Bound<i32>,
    /// Leaves still allowed before the chain is declared cyclic.
    hops_left: usize,
    done: bool,
}

impl<'a> Range<'a> {
    fn empty(tree: &'a BPlusTree) -> Self {
        Self {
            tree,
            leaf: NodeOffset::NONE,
            index: 0,
            end: Bound::Unbounded,
            hops_left: 0,
            done: true,
        }
    }

    fn fail(&mut self, err: Error) -> Option<Result<(i32, i64)>> {
        self.done = true;
        Some(Err(err))
    }

    fn before_end(&self, key: i32) -> bool {
        match self.end {
            Bound::Included(end) => key <= end,
            Bound::Excluded(end) => key < end,
            Bound::Unbounded => true,
        }
    }
}

impl Iterator for Range<'_> {
    type Item = Result<(i32, i64)>;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        while !self.done {
            if self.leaf.is_none() {
                self.done = true;
                break;
            }

            let node = match tree.node(self.leaf) {
                Ok(node) => node,
                Err(err) => return self.fail(err),
            };

            if self.index >= node.key_count() {
                let next = match node.next_leaf() {
                    Ok(next) => next,
                    Err(err) => return self.fail(err),
                };
                if self.hops_left == 0 {
                    let offset = self.leaf;
                    return self.fail(Error::InvariantViolated {
                        offset,
                        reason: "leaf chain does not terminate".to_string(),
                    });
                }
                self.hops_left -= 1;
                self.leaf = next;
                self.index = 0;
                continue;
            }

            let entry = node
                .key(self.index)
                .and_then(|key| Ok((key, node.value(self.index)?)));
            let (key, value) = match entry {
                Ok(entry) => entry,
                Err(err) => return self.fail(err),
            };

            if !self.before_end(key) {
                self.done = true;
                break;
            }
            self.index += 1;
            return Some(Ok((key, value)));
        }
        None
    }
}

/// Summary of one node, as yielded by [`BPlusTree::traverse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    pub offset: NodeOffset,
    pub node_type: NodeType,
    /// Distance from the root; the root is at depth 0.
    pub depth: usize,
    pub keys: Vec<i32>,
}

/// Breadth-first walk of every node reachable from the root.
///
/// Created by [`BPlusTree::traverse`]. Bounded by the number of records in
/// the arena, so a corrupted child link cannot make it loop forever.
pub struct Traverse<'a> {
    tree: &'a BPlusTree,
    queue: VecDeque<(NodeOffset, usize)>,
    visits_left: usize,
}

impl Traverse<'_> {
    fn visit(&mut self, offset: NodeOffset, depth: usize) -> Result<NodeInfo> {
        let tree = self.tree;
        let node = tree.node(offset)?;
        if !node.is_leaf() {
            for child in node.children()? {
                self.queue.push_back((child, depth + 1));
            }
        }
        Ok(NodeInfo {
            offset,
            node_type: node.node_type(),
            depth,
            keys: node.keys()?,
        })
    }
}

impl Iterator for Traverse<'_> {
    type Item = Result<NodeInfo>;

    fn next(&mut self) -> Option<Self::Item> {
        let (offset, depth) = self.queue.pop_front()?;

        if self.visits_left == 0 {
            self.queue.clear();
            return Some(Err(Error::InvariantViolated {
                offset,
                reason: "more reachable nodes than records in the arena".to_string(),
            }));
        }
        self.visits_left -= 1;

        let info = self.visit(offset, depth);

        if info.is_err() {
            self.queue.clear();
        }
        Some(info)
    }
}

impl BPlusTree {
    /// Scan the pairs whose keys fall in `bounds`, in ascending order.
    ///
    /// # Example
    /// ```
    /// use arena_bptree::BPlusTree;
    ///
    /// let mut tree = BPlusTree::new(3, None).unwrap();
    /// for key in 0..10 {
    ///     tree.insert(key, key as i64 * 100).unwrap();
    /// }
    ///
    /// let keys: Vec<i32> = tree
    ///     .range(3..6)
    ///     .unwrap()
    ///     .map(|entry| entry.unwrap().0)
    ///     .collect();
    /// assert_eq!(keys, vec![3, 4, 5]);
    /// ```
    ///
    /// # Errors
    /// Only corruption-class errors from the initial descent.
    pub fn range<R>(&self, bounds: R) -> Result<Range<'_>>
    where
        R: RangeBounds<i32>,
    {
        let start = bounds.start_bound().cloned();
        let end = bounds.end_bound().cloned();

        let probe = match start {
            Bound::Included(key) | Bound::Excluded(key) => key,
            Bound::Unbounded => i32::MIN,
        };
        let leaf = match start {
            Bound::Unbounded => self.first_leaf()?,
            _ => self.find_leaf(probe)?,
        };
        let Some(leaf) = leaf else {
            return Ok(Range::empty(self));
        };

        let index = match (start, self.node(leaf)?.search(probe)?) {
            (Bound::Excluded(_), Ok(found)) => found + 1,
            (_, Ok(found)) => found,
            (_, Err(insert_at)) => insert_at,
        };

        Ok(Range {
            tree: self,
            leaf,
            index,
            end,
            hops_left: self.node_capacity(),
            done: false,
        })
    }

    /// Scan every pair in ascending key order.
    pub fn iter(&self) -> Result<Range<'_>> {
        self.range(..)
    }

    /// Walk every reachable node breadth-first, root first.
    ///
    /// Each call starts a fresh walk. Meant for diagnostics; the engines
    /// never use it.
    pub fn traverse(&self) -> Traverse<'_> {
        let mut queue = VecDeque::new();
        if let Some(root) = self.root.get() {
            queue.push_back((root, 0));
        }
        Traverse {
            tree: self,
            queue,
            visits_left: self.node_capacity(),
        }
    }
}
