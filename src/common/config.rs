//! Configuration constants and tree construction settings.

use super::error::{Error, Result};
use crate::storage::node::NodeLayout;
use crate::storage::MAX_ARENA_BYTES;

// ============================================================================
// FIELD WIDTHS
// ============================================================================

/// Width of the node type tag.
pub const TYPE_SIZE: usize = 1;

/// Width of the key count field (u32).
pub const KEY_COUNT_SIZE: usize = 4;

/// Width of a stored offset (parent, child, next leaf).
///
/// Offsets are `i32` so that `-1` can mark "none" in the same field.
pub const OFFSET_SIZE: usize = 4;

/// Width of a key (i32).
pub const KEY_SIZE: usize = 4;

/// Width of a value (i64).
pub const VALUE_SIZE: usize = 8;

/// Size of the header shared by leaf and internal records.
///
/// # Layout (9 bytes)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       1     node_type (NodeType as u8)
/// 1       4     key_count (u32, little-endian)
/// 5       4     parent (i32, little-endian, -1 = root)
/// ```
pub const NODE_HEADER_SIZE: usize = TYPE_SIZE + KEY_COUNT_SIZE + OFFSET_SIZE;

// ============================================================================
// SENTINELS
// ============================================================================

/// Stored offset meaning "no node" (no parent, no next leaf, no root).
pub const NULL_OFFSET: i32 = -1;

/// Value returned by `search` for an absent key.
///
/// Because it doubles as the "not found" signal, it can never be stored.
pub const NOT_FOUND: i64 = -1;

// ============================================================================
// ORDER
// ============================================================================

/// Smallest supported order. Below this a split cannot leave both halves
/// populated.
pub const MIN_ORDER: usize = 3;

/// Order used by [`TreeConfig::default`].
pub const DEFAULT_ORDER: usize = 3;

/// Settings for constructing a [`BPlusTree`](crate::BPlusTree).
///
/// # Example
/// ```
/// use arena_bptree::TreeConfig;
///
/// let config = TreeConfig::new(4).with_capacity(64 * 1024);
/// assert_eq!(config.order, 4);
/// assert_eq!(config.capacity, Some(64 * 1024));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeConfig {
    /// Maximum children per internal node. Nodes hold at most `order - 1` keys.
    pub order: usize,
    /// Fixed arena size in bytes, or `None` for a growing arena.
    pub capacity: Option<usize>,
}

impl TreeConfig {
    /// Config with the given order and an unbounded arena.
    pub fn new(order: usize) -> Self {
        Self {
            order,
            capacity: None,
        }
    }

    /// Use a fixed-capacity arena of `bytes` bytes.
    pub fn with_capacity(mut self, bytes: usize) -> Self {
        self.capacity = Some(bytes);
        self
    }

    /// Check the order. Capacity is checked against the record size when the
    /// tree is built, since that depends on the order.
    ///
    /// # Errors
    /// - `Error::InvalidOrder` if `order < MIN_ORDER`, or if one node record
    ///   for this order would not fit in the largest possible arena
    pub fn validate(&self) -> Result<()> {
        if self.order < MIN_ORDER {
            return Err(Error::InvalidOrder(self.order));
        }
        match NodeLayout::checked_record_size(self.order) {
            Some(size) if size <= MAX_ARENA_BYTES => Ok(()),
            _ => Err(Error::InvalidOrder(self.order)),
        }
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ORDER)
    }
}
