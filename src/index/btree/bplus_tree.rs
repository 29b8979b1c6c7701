//! The tree handle: construction, lookups and node access.
//!
//! Mutation lives in the engine modules (`insert`, `delete`), descent in
//! `navigator`. They all reach node records through the helpers here.

use std::fmt;

use crate::common::config::NOT_FOUND;
use crate::common::{Error, NodeOffset, Result, TreeConfig};
use crate::storage::node::{Node, NodeLayout, NodeMut, NodeType};
use crate::storage::Arena;

use super::stats::TreeStats;

/// A B+Tree of `i32` keys and `i64` values stored in an [`Arena`].
///
/// # Architecture
/// ```text
/// ┌──────────────────────────────────────────────────────────────┐
/// │                         BPlusTree                            │
/// │   root: NodeOffset ──┐                                       │
/// │                      ▼                                       │
/// │  ┌──────────────────────────────────────────────────────┐   │
/// │  │ Arena                                                │   │
/// │  │ [leaf][leaf][internal][leaf][internal][leaf] ...     │   │
/// │  │   ▲      │                                           │   │
/// │  │   └──────┘ next_leaf / parent / children by offset   │   │
/// │  └──────────────────────────────────────────────────────┘   │
/// └──────────────────────────────────────────────────────────────┘
/// ```
///
/// The tree owns its arena and is the only holder of the root offset.
/// Mutating operations take `&mut self`, so the borrow checker enforces the
/// single-writer rule; there is no internal locking.
///
/// # Example
/// ```
/// use arena_bptree::BPlusTree;
///
/// let mut tree = BPlusTree::new(4, None).unwrap();
/// tree.insert(10, 100).unwrap();
/// tree.insert(5, 50).unwrap();
///
/// assert_eq!(tree.search(10).unwrap(), 100);
/// assert_eq!(tree.search(7).unwrap(), -1);
///
/// tree.delete(10).unwrap();
/// assert_eq!(tree.get(10).unwrap(), None);
/// ```
pub struct BPlusTree {
    /// Backing storage for every node record.
    pub(crate) arena: Arena,

    /// Field positions for this tree's order.
    pub(crate) layout: NodeLayout,

    /// Current root, or `NONE` before the first insert.
    pub(crate) root: NodeOffset,

    /// Number of stored keys.
    pub(crate) len: usize,

    pub(crate) stats: TreeStats,
}

impl BPlusTree {
    /// Create an empty tree.
    ///
    /// # Arguments
    /// * `order` - Maximum children per internal node (at least 3)
    /// * `capacity` - Fixed arena size in bytes, or `None` to grow on demand
    ///
    /// # Errors
    /// - `Error::InvalidOrder` if `order < 3` or its node record is too large
    ///   to address
    /// - `Error::InvalidCapacity` if `capacity` cannot hold one node record
    /// - `Error::CapacityTooLarge` if `capacity` exceeds `MAX_ARENA_BYTES`
    pub fn new(order: usize, capacity: Option<usize>) -> Result<Self> {
        Self::from_config(TreeConfig { order, capacity })
    }

    /// Create an empty tree from a [`TreeConfig`].
    ///
    /// # Errors
    /// Same as [`BPlusTree::new`].
    pub fn from_config(config: TreeConfig) -> Result<Self> {
        config.validate()?;
        let layout = NodeLayout::new(config.order);

        let arena = match config.capacity {
            Some(capacity) => {
                let required = layout.record_size();
                if capacity < required {
                    return Err(Error::InvalidCapacity { capacity, required });
                }
                Arena::with_capacity(capacity)?
            }
            None => Arena::unbounded(),
        };

        tracing::debug!(
            order = config.order,
            capacity = ?config.capacity,
            record_size = layout.record_size(),
            "created tree"
        );

        Ok(Self {
            arena,
            layout,
            root: NodeOffset::NONE,
            len: 0,
            stats: TreeStats::new(),
        })
    }

    // ========================================================================
    // Public API: Lookups
    // ========================================================================

    /// Look up `key`, returning its value or `-1` if absent.
    ///
    /// `-1` can never be a stored value, so the sentinel is unambiguous.
    /// Prefer [`get`](Self::get) in new code.
    ///
    /// # Errors
    /// Only corruption-class errors (see [`Error::is_corruption`]).
    pub fn search(&self, key: i32) -> Result<i64> {
        Ok(self.get(key)?.unwrap_or(NOT_FOUND))
    }

    /// Look up `key`.
    pub fn get(&self, key: i32) -> Result<Option<i64>> {
        let Some(leaf) = self.find_leaf(key)? else {
            return Ok(None);
        };

        let node = self.node(leaf)?;
        match node.search(key)? {
            Ok(index) => Ok(Some(node.value(index)?)),
            Err(_) => Ok(None),
        }
    }

    pub fn contains_key(&self, key: i32) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    // ========================================================================
    // Public API: Bulk
    // ========================================================================

    /// Insert every pair from `items`, in iteration order.
    ///
    /// Stops at the first failure. Pairs inserted before the failing one
    /// stay in the tree.
    pub fn insert_many<I>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = (i32, i64)>,
    {
        for (key, value) in items {
            self.insert(key, value)?;
        }
        Ok(())
    }

    // ========================================================================
    // Public API: Info
    // ========================================================================

    /// Number of stored keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.layout.order()
    }

    /// Fewest keys a non-root node may hold.
    #[inline]
    pub fn min_keys(&self) -> usize {
        self.layout.min_keys()
    }

    /// Most keys any node holds between operations.
    #[inline]
    pub fn max_keys(&self) -> usize {
        self.layout.max_keys()
    }

    /// Offset of the root record, or `None` before the first insert.
    pub fn root_offset(&self) -> Option<NodeOffset> {
        self.root.get()
    }

    /// Bytes of arena taken by each node record.
    pub fn record_size(&self) -> usize {
        self.layout.record_size()
    }

    /// Bytes handed out by the arena, including orphaned records.
    pub fn arena_used(&self) -> usize {
        self.arena.used()
    }

    /// Fixed arena size, or `None` if the arena grows.
    pub fn arena_capacity(&self) -> Option<usize> {
        self.arena.capacity()
    }

    /// Structural counters.
    pub fn stats(&self) -> &TreeStats {
        &self.stats
    }

    /// Number of levels from root to leaves. 0 before the first insert.
    pub fn height(&self) -> Result<usize> {
        let mut height = 0;
        let mut current = self.root;
        while current.is_some() {
            height += 1;
            let node = self.node(current)?;
            if node.is_leaf() {
                break;
            }
            current = node.child(0)?;
        }
        Ok(height)
    }

    /// Upper bound on reachable nodes: every record ever allocated.
    pub(crate) fn node_capacity(&self) -> usize {
        self.arena.used() / self.layout.record_size()
    }

    // ========================================================================
    // Internal: Node access
    // ========================================================================

    /// Read-only accessor for the record at `offset`.
    pub(crate) fn node(&self, offset: NodeOffset) -> Result<Node<'_>> {
        let data = self.arena.view(offset, self.layout.record_size())?;
        Node::new(self.layout, data)
    }

    /// Mutable accessor for the record at `offset`.
    pub(crate) fn node_mut(&mut self, offset: NodeOffset) -> Result<NodeMut<'_>> {
        let data = self.arena.view_mut(offset, self.layout.record_size())?;
        NodeMut::new(self.layout, data)
    }

    /// Carve a new, empty record out of the arena.
    pub(crate) fn allocate_node(
        &mut self,
        node_type: NodeType,
        parent: NodeOffset,
    ) -> Result<NodeOffset> {
        let size = self.layout.record_size();
        let offset = self.arena.allocate(size)?;
        NodeMut::init(self.layout, self.arena.view_mut(offset, size)?, node_type, parent);
        TreeStats::bump(&self.stats.nodes_allocated);
        Ok(offset)
    }

    pub(crate) fn set_parent(&mut self, child: NodeOffset, parent: NodeOffset) -> Result<()> {
        self.node_mut(child)?.set_parent(parent);
        Ok(())
    }
}

impl fmt::Debug for BPlusTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BPlusTree")
            .field("order", &self.order())
            .field("len", &self.len)
            .field("root", &self.root)
            .field("arena_used", &self.arena.used())
            .field("arena_capacity", &self.arena.capacity())
            .finish()
    }
}
