//! Node offset type.

use std::fmt;

use super::config::NULL_OFFSET;

/// Byte offset of a node record inside the arena.
///
/// Offsets are the tree's only form of pointer: parents, children and the
/// leaf chain all refer to each other by offset. They are stable for the
/// life of the arena since records are never moved.
///
/// The on-record encoding is `i32`, with `-1` as the "no node" sentinel.
///
/// # Example
/// ```
/// use arena_bptree::NodeOffset;
///
/// let offset = NodeOffset::new(128);
/// assert!(offset.is_some());
/// assert!(NodeOffset::NONE.is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeOffset(pub i32);

impl NodeOffset {
    /// "No node": root's parent, last leaf's successor, empty tree's root.
    pub const NONE: NodeOffset = NodeOffset(NULL_OFFSET);

    /// Create a new NodeOffset.
    #[inline]
    pub fn new(offset: i32) -> Self {
        NodeOffset(offset)
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }

    #[inline]
    pub fn is_some(&self) -> bool {
        !self.is_none()
    }

    /// `None` for the sentinel, `Some(self)` otherwise.
    #[inline]
    pub fn get(self) -> Option<NodeOffset> {
        if self.is_none() {
            None
        } else {
            Some(self)
        }
    }

    /// Offset as an arena index. `None` for negative offsets.
    #[inline]
    pub fn as_index(&self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl fmt::Display for NodeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::NONE {
            write!(f, "Node(NONE)")
        } else {
            write!(f, "Node({})", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_offset_none() {
        assert!(NodeOffset::NONE.is_none());
        assert_eq!(NodeOffset::NONE.0, -1);
        assert_eq!(NodeOffset::NONE.get(), None);
        assert_eq!(NodeOffset::NONE.as_index(), None);
    }

    #[test]
    fn test_node_offset_some() {
        let offset = NodeOffset::new(0);
        assert!(offset.is_some());
        assert_eq!(offset.get(), Some(offset));
        assert_eq!(offset.as_index(), Some(0));
    }

    #[test]
    fn test_negative_offset_has_no_index() {
        assert_eq!(NodeOffset::new(-12).as_index(), None);
    }

    #[test]
    fn test_node_offset_display() {
        assert_eq!(format!("{}", NodeOffset::new(42)), "Node(42)");
        assert_eq!(format!("{}", NodeOffset::NONE), "Node(NONE)");
    }
}
