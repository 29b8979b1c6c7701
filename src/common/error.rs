//! Error types for arena-bptree.

use thiserror::Error;

use super::NodeOffset;
use crate::storage::node::NodeType;

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors the tree, its codec and its arena can report.
///
/// The variants fall into three groups:
/// - configuration: `InvalidOrder`, `InvalidCapacity`, `CapacityTooLarge`
/// - operation preconditions: `DuplicateKey`, `InvalidValue`, `KeyNotFound`
/// - resources and structure: `ArenaExhausted` plus the corruption class
///   (see [`Error::is_corruption`])
///
/// Precondition errors are always raised before the tree is touched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Order must be at least 3, and one record of that order must fit
    /// in an arena addressable by `i32` offsets.
    #[error("invalid order {0}: must be at least 3 and small enough for one node record to be addressable")]
    InvalidOrder(usize),

    /// Fixed arena capacity cannot hold even one node record.
    #[error("invalid capacity {capacity} bytes: at least {required} bytes required")]
    InvalidCapacity { capacity: usize, required: usize },

    /// Fixed arena capacity is larger than an `i32` offset can address.
    #[error("invalid capacity {capacity} bytes: at most {max} bytes addressable")]
    CapacityTooLarge { capacity: usize, max: usize },

    /// Key is already present. Inserts never overwrite.
    #[error("duplicate key {0}")]
    DuplicateKey(i32),

    /// Value collides with the `-1` not-found sentinel.
    #[error("invalid value {0}: -1 is reserved as the not-found sentinel")]
    InvalidValue(i64),

    /// Delete of a key that is not in the tree.
    #[error("key {0} not found")]
    KeyNotFound(i32),

    /// Arena cannot satisfy an allocation.
    #[error("arena exhausted: requested {requested} bytes, {available} available")]
    ArenaExhausted { requested: usize, available: usize },

    /// Offset is negative or past the arena high-water mark.
    #[error("invalid offset {0}")]
    InvalidOffset(NodeOffset),

    /// Array index outside a node's key/value/child slots.
    #[error("index {index} out of bounds for {len} slots")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Header tag byte is not a known node type.
    #[error("invalid node type tag {0:#04x}")]
    InvalidNodeType(u8),

    /// Leaf-only field read on an internal node, or vice versa.
    #[error("expected {expected:?} node, found {found:?}")]
    NodeTypeMismatch { expected: NodeType, found: NodeType },

    /// Structural check failed.
    #[error("invariant violated at {offset}: {reason}")]
    InvariantViolated { offset: NodeOffset, reason: String },
}

impl Error {
    /// True for errors that mean the arena or tree structure is damaged,
    /// or the engine has a defect. These are not caller mistakes and
    /// should not be retried.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Error::InvalidOffset(_)
                | Error::IndexOutOfBounds { .. }
                | Error::InvalidNodeType(_)
                | Error::NodeTypeMismatch { .. }
                | Error::InvariantViolated { .. }
        )
    }
}
