//! Field positions of leaf and internal records for a given order.

use crate::common::config::{KEY_SIZE, NODE_HEADER_SIZE, OFFSET_SIZE, VALUE_SIZE};
use crate::common::{Error, Result};

/// Byte layout of node records for order `m`.
///
/// Arrays are sized for `m` keys, one more than a node may hold at rest,
/// so a node can take the overflowing entry before it is split.
///
/// # Leaf record
/// ```text
/// ┌────────┬──────────────────┬──────────────────┬───────────┐
/// │ header │ keys: [i32; m]   │ values: [i64; m] │ next: i32 │
/// │ 9      │ 4m               │ 8m               │ 4         │
/// └────────┴──────────────────┴──────────────────┴───────────┘
/// ```
///
/// # Internal record
/// ```text
/// ┌────────┬──────────────────┬──────────────────────┐
/// │ header │ keys: [i32; m]   │ children: [i32; m+1] │
/// │ 9      │ 4m               │ 4(m+1)               │
/// └────────┴──────────────────┴──────────────────────┘
/// ```
///
/// Both kinds are stored in slots of [`record_size`](Self::record_size)
/// bytes, the larger of the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeLayout {
    order: usize,
}

impl NodeLayout {
    /// Layout for `order`. The order is validated by the tree config.
    pub fn new(order: usize) -> Self {
        Self { order }
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Most keys a node holds once an operation completes.
    #[inline]
    pub fn max_keys(&self) -> usize {
        self.order - 1
    }

    /// Fewest keys a non-root node may hold: `ceil(m/2) - 1`.
    #[inline]
    pub fn min_keys(&self) -> usize {
        self.order.div_ceil(2) - 1
    }

    /// Number of key (and value) slots in a record.
    #[inline]
    pub fn key_slots(&self) -> usize {
        self.order
    }

    /// Number of child slots in an internal record.
    #[inline]
    pub fn child_slots(&self) -> usize {
        self.order + 1
    }

    pub fn leaf_size(&self) -> usize {
        NODE_HEADER_SIZE + self.order * (KEY_SIZE + VALUE_SIZE) + OFFSET_SIZE
    }

    pub fn internal_size(&self) -> usize {
        NODE_HEADER_SIZE + self.order * KEY_SIZE + (self.order + 1) * OFFSET_SIZE
    }

    /// Slot size handed out by the arena for every node.
    pub fn record_size(&self) -> usize {
        self.leaf_size().max(self.internal_size())
    }

    /// Record size for `order`, or `None` if it does not fit in a `usize`.
    ///
    /// [`record_size`](Self::record_size) assumes an order that passed this.
    pub fn checked_record_size(order: usize) -> Option<usize> {
        let leaf = order
            .checked_mul(KEY_SIZE + VALUE_SIZE)?
            .checked_add(NODE_HEADER_SIZE + OFFSET_SIZE)?;
        let internal = order
            .checked_mul(KEY_SIZE)?
            .checked_add(order.checked_add(1)?.checked_mul(OFFSET_SIZE)?)?
            .checked_add(NODE_HEADER_SIZE)?;
        Some(leaf.max(internal))
    }

    // ========================================================================
    // Field positions
    // ========================================================================

    /// Position of `keys[index]`. Same for leaves and internal nodes.
    pub fn key_pos(&self, index: usize) -> Result<usize> {
        check_index(index, self.key_slots())?;
        Ok(self.keys_start() + index * KEY_SIZE)
    }

    /// Position of `values[index]` in a leaf.
    pub fn value_pos(&self, index: usize) -> Result<usize> {
        check_index(index, self.key_slots())?;
        Ok(self.values_start() + index * VALUE_SIZE)
    }

    /// Position of `children[index]` in an internal node.
    pub fn child_pos(&self, index: usize) -> Result<usize> {
        check_index(index, self.child_slots())?;
        Ok(self.children_start() + index * OFFSET_SIZE)
    }

    /// Position of the next-leaf offset.
    pub fn next_leaf_pos(&self) -> usize {
        self.values_start() + self.order * VALUE_SIZE
    }

    #[inline]
    pub(crate) fn keys_start(&self) -> usize {
        NODE_HEADER_SIZE
    }

    #[inline]
    pub(crate) fn values_start(&self) -> usize {
        self.keys_start() + self.order * KEY_SIZE
    }

    // Children sit where a leaf keeps its values.
    #[inline]
    pub(crate) fn children_start(&self) -> usize {
        self.keys_start() + self.order * KEY_SIZE
    }
}

#[inline]
fn check_index(index: usize, len: usize) -> Result<()> {
    if index >= len {
        return Err(Error::IndexOutOfBounds { index, len });
    }
    Ok(())
}
