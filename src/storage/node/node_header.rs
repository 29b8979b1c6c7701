//! Node header and type tag.
//!
//! Every node record starts with a [`NodeHeader`]:
//! - [`NodeType`] tag, the only thing that decides leaf vs internal
//! - key count
//! - parent offset

use crate::common::config::{KEY_COUNT_SIZE, NODE_HEADER_SIZE, TYPE_SIZE};
use crate::common::{Error, NodeOffset, Result};

/// Kind of node stored in a record.
///
/// Uses `#[repr(u8)]` so the tag is exactly one byte on the record. Zero is
/// deliberately not a valid tag: a freshly zeroed slot that was never
/// initialized reads back as `InvalidNodeType(0)`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// Holds keys and values, linked to the next leaf.
    Leaf = 1,
    /// Holds separator keys and child offsets.
    Internal = 2,
}

impl NodeType {
    /// Decode a tag byte.
    ///
    /// # Errors
    /// - `Error::InvalidNodeType` for anything but 1 or 2
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            1 => Ok(NodeType::Leaf),
            2 => Ok(NodeType::Internal),
            other => Err(Error::InvalidNodeType(other)),
        }
    }
}

/// Metadata at the start of every node record.
///
/// # Layout (9 bytes)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       1     node_type (NodeType as u8)
/// 1       4     key_count (u32, little-endian)
/// 5       4     parent (i32, little-endian, -1 = none)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHeader {
    pub node_type: NodeType,
    pub key_count: u32,
    pub parent: NodeOffset,
}

impl NodeHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = NODE_HEADER_SIZE;

    /// Offset of each field within the header.
    pub const OFFSET_NODE_TYPE: usize = 0;
    pub const OFFSET_KEY_COUNT: usize = TYPE_SIZE;
    pub const OFFSET_PARENT: usize = TYPE_SIZE + KEY_COUNT_SIZE;

    /// Header for an empty node.
    pub fn new(node_type: NodeType, parent: NodeOffset) -> Self {
        Self {
            node_type,
            key_count: 0,
            parent,
        }
    }

    /// Read a header from the beginning of a record.
    ///
    /// # Errors
    /// - `Error::InvalidNodeType` if the tag byte is unknown
    ///
    /// # Panics
    /// Panics if `data.len() < NodeHeader::SIZE`.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        assert!(data.len() >= Self::SIZE, "buffer too small for NodeHeader");

        let node_type = NodeType::from_u8(data[Self::OFFSET_NODE_TYPE])?;
        let key_count = read_u32(data, Self::OFFSET_KEY_COUNT);
        let parent = NodeOffset::new(read_i32(data, Self::OFFSET_PARENT));

        Ok(Self {
            node_type,
            key_count,
            parent,
        })
    }

    /// Write this header to the beginning of a record.
    ///
    /// # Panics
    /// Panics if `data.len() < NodeHeader::SIZE`.
    pub fn write_to(&self, data: &mut [u8]) {
        assert!(data.len() >= Self::SIZE, "buffer too small for NodeHeader");

        data[Self::OFFSET_NODE_TYPE] = self.node_type as u8;
        write_u32(data, Self::OFFSET_KEY_COUNT, self.key_count);
        write_i32(data, Self::OFFSET_PARENT, self.parent.0);
    }
}

// ============================================================================
// Little-endian field helpers
// ============================================================================

#[inline]
pub(crate) fn read_u32(data: &[u8], pos: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&data[pos..pos + 4]);
    u32::from_le_bytes(buf)
}

#[inline]
pub(crate) fn read_i32(data: &[u8], pos: usize) -> i32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&data[pos..pos + 4]);
    i32::from_le_bytes(buf)
}

#[inline]
pub(crate) fn read_i64(data: &[u8], pos: usize) -> i64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&data[pos..pos + 8]);
    i64::from_le_bytes(buf)
}

#[inline]
pub(crate) fn write_u32(data: &mut [u8], pos: usize, value: u32) {
    data[pos..pos + 4].copy_from_slice(&value.to_le_bytes());
}

#[inline]
pub(crate) fn write_i32(data: &mut [u8], pos: usize, value: i32) {
    data[pos..pos + 4].copy_from_slice(&value.to_le_bytes());
}

#[inline]
pub(crate) fn write_i64(data: &mut [u8], pos: usize, value: i64) {
    data[pos..pos + 8].copy_from_slice(&value.to_le_bytes());
}

// ============================================================================
// TESTS
// ============================================================================
