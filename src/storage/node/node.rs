//! Typed accessors over a node record.
//!
//! [`Node`] reads and [`NodeMut`] writes the fields of one record slot.
//! The header tag is decoded once when the accessor is built and then
//! checked by every leaf-only or internal-only field access.

use crate::common::config::{KEY_SIZE, NULL_OFFSET, OFFSET_SIZE, VALUE_SIZE};
use crate::common::{Error, NodeOffset, Result};

use super::node_header::{
    read_i32, read_i64, read_u32, write_i32, write_i64, write_u32, NodeHeader, NodeType,
};
use super::node_layout::NodeLayout;

/// Read-only view of a node record.
#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    layout: NodeLayout,
    data: &'a [u8],
    node_type: NodeType,
}

impl<'a> Node<'a> {
    /// Wrap a record slot.
    ///
    /// # Errors
    /// - `Error::InvalidNodeType` if the slot holds no initialized record
    ///
    /// # Panics
    /// Panics if `data` is shorter than `layout.record_size()`.
    pub fn new(layout: NodeLayout, data: &'a [u8]) -> Result<Self> {
        assert!(data.len() >= layout.record_size(), "slot too small for node");
        let node_type = NodeType::from_u8(data[NodeHeader::OFFSET_NODE_TYPE])?;
        Ok(Self {
            layout,
            data,
            node_type,
        })
    }

    #[inline]
    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.node_type == NodeType::Leaf
    }

    #[inline]
    pub fn key_count(&self) -> usize {
        read_u32(self.data, NodeHeader::OFFSET_KEY_COUNT) as usize
    }

    #[inline]
    pub fn parent(&self) -> NodeOffset {
        NodeOffset::new(read_i32(self.data, NodeHeader::OFFSET_PARENT))
    }

    pub fn key(&self, index: usize) -> Result<i32> {
        Ok(read_i32(self.data, self.layout.key_pos(index)?))
    }

    /// `values[index]` of a leaf.
    pub fn value(&self, index: usize) -> Result<i64> {
        self.expect(NodeType::Leaf)?;
        Ok(read_i64(self.data, self.layout.value_pos(index)?))
    }

    /// `children[index]` of an internal node.
    pub fn child(&self, index: usize) -> Result<NodeOffset> {
        self.expect(NodeType::Internal)?;
        Ok(NodeOffset::new(read_i32(
            self.data,
            self.layout.child_pos(index)?,
        )))
    }

    /// Successor in the leaf chain.
    pub fn next_leaf(&self) -> Result<NodeOffset> {
        self.expect(NodeType::Leaf)?;
        Ok(NodeOffset::new(read_i32(
            self.data,
            self.layout.next_leaf_pos(),
        )))
    }

    /// The first `key_count` keys.
    pub fn keys(&self) -> Result<Vec<i32>> {
        (0..self.key_count()).map(|i| self.key(i)).collect()
    }

    /// The first `key_count` key/value pairs of a leaf.
    pub fn entries(&self) -> Result<Vec<(i32, i64)>> {
        (0..self.key_count())
            .map(|i| Ok((self.key(i)?, self.value(i)?)))
            .collect()
    }

    /// The first `key_count + 1` children of an internal node.
    pub fn children(&self) -> Result<Vec<NodeOffset>> {
        (0..=self.key_count()).map(|i| self.child(i)).collect()
    }

    /// Binary search over the stored keys.
    ///
    /// `Ok(Ok(i))` if `keys[i] == key`, `Ok(Err(i))` with the insertion
    /// point otherwise, mirroring `slice::binary_search`.
    pub fn search(&self, key: i32) -> Result<std::result::Result<usize, usize>> {
        let (mut lo, mut hi) = (0, self.key_count());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let probe = self.key(mid)?;
            if probe == key {
                return Ok(Ok(mid));
            }
            if probe < key {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        Ok(Err(lo))
    }

    /// Child slot to descend into for `key`: the first `i` with
    /// `key < keys[i]`, or `key_count` if there is none.
    pub fn child_index_for(&self, key: i32) -> Result<usize> {
        Ok(match self.search(key)? {
            // Equal keys live in the right-hand subtree.
            Ok(i) => i + 1,
            Err(i) => i,
        })
    }

    fn expect(&self, expected: NodeType) -> Result<()> {
        if self.node_type != expected {
            return Err(Error::NodeTypeMismatch {
                expected,
                found: self.node_type,
            });
        }
        Ok(())
    }
}

/// Mutable view of a node record.
#[derive(Debug)]
pub struct NodeMut<'a> {
    layout: NodeLayout,
    data: &'a mut [u8],
    node_type: NodeType,
}

impl<'a> NodeMut<'a> {
    /// Wrap an initialized record slot.
    ///
    /// # Errors
    /// - `Error::InvalidNodeType` if the slot holds no initialized record
    pub fn new(layout: NodeLayout, data: &'a mut [u8]) -> Result<Self> {
        let node_type = Node::new(layout, data)?.node_type();
        Ok(Self {
            layout,
            data,
            node_type,
        })
    }

    /// Format a slot as an empty node.
    ///
    /// Leaves start with no successor in the chain.
    ///
    /// # Panics
    /// Panics if `data` is shorter than `layout.record_size()`.
    pub fn init(
        layout: NodeLayout,
        data: &'a mut [u8],
        node_type: NodeType,
        parent: NodeOffset,
    ) -> Self {
        assert!(data.len() >= layout.record_size(), "slot too small for node");
        data.fill(0);
        NodeHeader::new(node_type, parent).write_to(data);
        if node_type == NodeType::Leaf {
            write_i32(data, layout.next_leaf_pos(), NULL_OFFSET);
        }
        Self {
            layout,
            data,
            node_type,
        }
    }

    /// Reborrow as a read-only view.
    pub fn as_node(&self) -> Node<'_> {
        Node {
            layout: self.layout,
            data: &*self.data,
            node_type: self.node_type,
        }
    }

    #[inline]
    pub fn key_count(&self) -> usize {
        self.as_node().key_count()
    }

    /// # Errors
    /// - `Error::IndexOutOfBounds` if `count` exceeds the key slots
    pub fn set_key_count(&mut self, count: usize) -> Result<()> {
        if count > self.layout.key_slots() {
            return Err(Error::IndexOutOfBounds {
                index: count,
                len: self.layout.key_slots(),
            });
        }
        write_u32(self.data, NodeHeader::OFFSET_KEY_COUNT, count as u32);
        Ok(())
    }

    pub fn set_parent(&mut self, parent: NodeOffset) {
        write_i32(self.data, NodeHeader::OFFSET_PARENT, parent.0);
    }

    pub fn set_key(&mut self, index: usize, key: i32) -> Result<()> {
        let pos = self.layout.key_pos(index)?;
        write_i32(self.data, pos, key);
        Ok(())
    }

    pub fn set_value(&mut self, index: usize, value: i64) -> Result<()> {
        self.as_node().expect(NodeType::Leaf)?;
        let pos = self.layout.value_pos(index)?;
        write_i64(self.data, pos, value);
        Ok(())
    }

    pub fn set_child(&mut self, index: usize, child: NodeOffset) -> Result<()> {
        self.as_node().expect(NodeType::Internal)?;
        let pos = self.layout.child_pos(index)?;
        write_i32(self.data, pos, child.0);
        Ok(())
    }

    pub fn set_next_leaf(&mut self, next: NodeOffset) -> Result<()> {
        self.as_node().expect(NodeType::Leaf)?;
        let pos = self.layout.next_leaf_pos();
        write_i32(self.data, pos, next.0);
        Ok(())
    }

    // ========================================================================
    // Leaf edits
    // ========================================================================

    /// Insert a pair at `index`, shifting later pairs right.
    ///
    /// # Errors
    /// - `Error::IndexOutOfBounds` if the node has no free slot or
    ///   `index > key_count`
    pub fn insert_entry(&mut self, index: usize, key: i32, value: i64) -> Result<()> {
        self.as_node().expect(NodeType::Leaf)?;
        let count = self.key_count();
        self.check_insert(index, count)?;

        let keys = self.layout.keys_start();
        let values = self.layout.values_start();
        shift_right(self.data, keys, KEY_SIZE, index, count);
        shift_right(self.data, values, VALUE_SIZE, index, count);

        self.set_key(index, key)?;
        self.set_value(index, value)?;
        self.set_key_count(count + 1)
    }

    /// Remove and return the pair at `index`, shifting later pairs left.
    pub fn remove_entry(&mut self, index: usize) -> Result<(i32, i64)> {
        let count = self.key_count();
        check_occupied(index, count)?;
        let node = self.as_node();
        let removed = (node.key(index)?, node.value(index)?);

        let keys = self.layout.keys_start();
        let values = self.layout.values_start();
        shift_left(self.data, keys, KEY_SIZE, index, count);
        shift_left(self.data, values, VALUE_SIZE, index, count);

        self.set_key_count(count - 1)?;
        Ok(removed)
    }

    /// Replace the whole contents of a leaf.
    pub fn set_entries(&mut self, entries: &[(i32, i64)]) -> Result<()> {
        self.set_key_count(entries.len())?;
        for (i, &(key, value)) in entries.iter().enumerate() {
            self.set_key(i, key)?;
            self.set_value(i, value)?;
        }
        Ok(())
    }

    // ========================================================================
    // Internal edits
    // ========================================================================

    /// Insert `key` at `index` and `child` at `index + 1`: `child` becomes
    /// the subtree directly right of `key`.
    pub fn insert_separator(&mut self, index: usize, key: i32, child: NodeOffset) -> Result<()> {
        self.as_node().expect(NodeType::Internal)?;
        let count = self.key_count();
        self.check_insert(index, count)?;

        let keys = self.layout.keys_start();
        let children = self.layout.children_start();
        shift_right(self.data, keys, KEY_SIZE, index, count);
        shift_right(self.data, children, OFFSET_SIZE, index + 1, count + 1);

        self.set_key(index, key)?;
        self.set_child(index + 1, child)?;
        self.set_key_count(count + 1)
    }

    /// Remove `keys[index]` and `children[index + 1]`, returning both.
    pub fn remove_separator(&mut self, index: usize) -> Result<(i32, NodeOffset)> {
        let count = self.key_count();
        check_occupied(index, count)?;
        let node = self.as_node();
        let removed = (node.key(index)?, node.child(index + 1)?);

        let keys = self.layout.keys_start();
        let children = self.layout.children_start();
        shift_left(self.data, keys, KEY_SIZE, index, count);
        shift_left(self.data, children, OFFSET_SIZE, index + 1, count + 1);

        self.set_key_count(count - 1)?;
        Ok(removed)
    }

    /// Prepend `key` and `child` so that `child` becomes `children[0]` and
    /// `key` separates it from the old first child.
    pub fn push_front(&mut self, key: i32, child: NodeOffset) -> Result<()> {
        self.as_node().expect(NodeType::Internal)?;
        let count = self.key_count();
        self.check_insert(0, count)?;

        let keys = self.layout.keys_start();
        let children = self.layout.children_start();
        shift_right(self.data, keys, KEY_SIZE, 0, count);
        shift_right(self.data, children, OFFSET_SIZE, 0, count + 1);

        self.set_key(0, key)?;
        self.set_child(0, child)?;
        self.set_key_count(count + 1)
    }

    /// Remove `keys[0]` and `children[0]`, returning both.
    pub fn pop_front(&mut self) -> Result<(i32, NodeOffset)> {
        let count = self.key_count();
        check_occupied(0, count)?;
        let node = self.as_node();
        let removed = (node.key(0)?, node.child(0)?);

        let keys = self.layout.keys_start();
        let children = self.layout.children_start();
        shift_left(self.data, keys, KEY_SIZE, 0, count);
        shift_left(self.data, children, OFFSET_SIZE, 0, count + 1);

        self.set_key_count(count - 1)?;
        Ok(removed)
    }

    /// Replace the whole contents of an internal node.
    ///
    /// `children` must hold exactly one more entry than `keys`.
    pub fn set_separators(&mut self, keys: &[i32], children: &[NodeOffset]) -> Result<()> {
        if children.len() != keys.len() + 1 {
            return Err(Error::IndexOutOfBounds {
                index: children.len(),
                len: keys.len() + 1,
            });
        }
        self.set_key_count(keys.len())?;
        for (i, &key) in keys.iter().enumerate() {
            self.set_key(i, key)?;
        }
        for (i, &child) in children.iter().enumerate() {
            self.set_child(i, child)?;
        }
        Ok(())
    }

    fn check_insert(&self, index: usize, count: usize) -> Result<()> {
        if count >= self.layout.key_slots() {
            return Err(Error::IndexOutOfBounds {
                index: count,
                len: self.layout.key_slots(),
            });
        }
        if index > count {
            return Err(Error::IndexOutOfBounds {
                index,
                len: count + 1,
            });
        }
        Ok(())
    }
}

#[inline]
fn check_occupied(index: usize, count: usize) -> Result<()> {
    if index >= count {
        return Err(Error::IndexOutOfBounds { index, len: count });
    }
    Ok(())
}

/// Move elements `[index, len)` of a fixed-width array one slot right.
/// The caller guarantees slot `len` exists.
fn shift_right(data: &mut [u8], base: usize, width: usize, index: usize, len: usize) {
    if index < len {
        let src = base + index * width..base + len * width;
        data.copy_within(src, base + (index + 1) * width);
    }
}

/// Move elements `[index + 1, len)` of a fixed-width array one slot left,
/// overwriting element `index`.
fn shift_left(data: &mut [u8], base: usize, width: usize, index: usize, len: usize) {
    if index + 1 < len {
        let src = base + (index + 1) * width..base + len * width;
        data.copy_within(src, base + index * width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(layout: NodeLayout) -> Vec<u8> {
        vec![0u8; layout.record_size()]
    }

    // --- Header access ---

    #[test]
    fn test_uninitialized_slot_is_rejected() {
        let layout = NodeLayout::new(3);
        let data = slot(layout);
        assert_eq!(
            Node::new(layout, &data).unwrap_err(),
            Error::InvalidNodeType(0)
        );
    }

    #[test]
    fn test_init_leaf() {
        let layout = NodeLayout::new(3);
        let mut data = slot(layout);
        let node = NodeMut::init(layout, &mut data, NodeType::Leaf, NodeOffset::new(64));

        let view = node.as_node();
        assert!(view.is_leaf());
        assert_eq!(view.key_count(), 0);
        assert_eq!(view.parent(), NodeOffset::new(64));
        assert!(view.next_leaf().unwrap().is_none());
    }

    #[test]
    fn test_type_mismatch() {
        let layout = NodeLayout::new(3);
        let mut data = slot(layout);
        let mut node = NodeMut::init(layout, &mut data, NodeType::Internal, NodeOffset::NONE);

        assert_eq!(
            node.as_node().value(0),
            Err(Error::NodeTypeMismatch {
                expected: NodeType::Leaf,
                found: NodeType::Internal
            })
        );
        assert!(node.set_next_leaf(NodeOffset::new(0)).is_err());
        assert!(node.insert_entry(0, 1, 1).is_err());
    }

    // --- Leaf edits ---

    #[test]
    fn test_insert_entry_keeps_order() {
        let layout = NodeLayout::new(4);
        let mut data = slot(layout);
        let mut node = NodeMut::init(layout, &mut data, NodeType::Leaf, NodeOffset::NONE);

        node.insert_entry(0, 20, 200).unwrap();
        node.insert_entry(0, 10, 100).unwrap();
        node.insert_entry(2, 30, 300).unwrap();
        node.insert_entry(1, 15, 150).unwrap();

        assert_eq!(
            node.as_node().entries().unwrap(),
            vec![(10, 100), (15, 150), (20, 200), (30, 300)]
        );
    }

    #[test]
    fn test_insert_entry_into_full_node_fails() {
        let layout = NodeLayout::new(3);
        let mut data = slot(layout);
        let mut node = NodeMut::init(layout, &mut data, NodeType::Leaf, NodeOffset::NONE);

        // Three slots: room for the overflowing entry, not a fourth.
        for k in 0..3 {
            node.insert_entry(k as usize, k, k as i64).unwrap();
        }
        assert_eq!(
            node.insert_entry(3, 3, 3),
            Err(Error::IndexOutOfBounds { index: 3, len: 3 })
        );
    }

    #[test]
    fn test_remove_entry() {
        let layout = NodeLayout::new(4);
        let mut data = slot(layout);
        let mut node = NodeMut::init(layout, &mut data, NodeType::Leaf, NodeOffset::NONE);
        node.set_entries(&[(1, 10), (2, 20), (3, 30)]).unwrap();

        assert_eq!(node.remove_entry(1).unwrap(), (2, 20));
        assert_eq!(node.as_node().entries().unwrap(), vec![(1, 10), (3, 30)]);
        assert_eq!(node.remove_entry(1).unwrap(), (3, 30));
        assert_eq!(node.remove_entry(0).unwrap(), (1, 10));
        assert_eq!(node.key_count(), 0);
        assert!(node.remove_entry(0).is_err());
    }

    #[test]
    fn test_search() {
        let layout = NodeLayout::new(5);
        let mut data = slot(layout);
        let mut node = NodeMut::init(layout, &mut data, NodeType::Leaf, NodeOffset::NONE);
        node.set_entries(&[(10, 1), (20, 2), (30, 3)]).unwrap();
        let view = node.as_node();

        assert_eq!(view.search(20).unwrap(), Ok(1));
        assert_eq!(view.search(5).unwrap(), Err(0));
        assert_eq!(view.search(25).unwrap(), Err(2));
        assert_eq!(view.search(99).unwrap(), Err(3));
    }

    // --- Internal edits ---

    fn internal(layout: NodeLayout, data: &mut [u8]) -> NodeMut<'_> {
        let mut node = NodeMut::init(layout, data, NodeType::Internal, NodeOffset::NONE);
        node.set_separators(
            &[10, 20],
            &[NodeOffset::new(0), NodeOffset::new(100), NodeOffset::new(200)],
        )
        .unwrap();
        node
    }

    #[test]
    fn test_child_index_for() {
        let layout = NodeLayout::new(4);
        let mut data = slot(layout);
        let node = internal(layout, &mut data);
        let view = node.as_node();

        assert_eq!(view.child_index_for(5).unwrap(), 0);
        assert_eq!(view.child_index_for(10).unwrap(), 1);
        assert_eq!(view.child_index_for(15).unwrap(), 1);
        assert_eq!(view.child_index_for(20).unwrap(), 2);
        assert_eq!(view.child_index_for(i32::MAX).unwrap(), 2);
    }

    #[test]
    fn test_insert_and_remove_separator() {
        let layout = NodeLayout::new(4);
        let mut data = slot(layout);
        let mut node = internal(layout, &mut data);

        node.insert_separator(1, 15, NodeOffset::new(150)).unwrap();
        let view = node.as_node();
        assert_eq!(view.keys().unwrap(), vec![10, 15, 20]);
        assert_eq!(
            view.children().unwrap(),
            vec![
                NodeOffset::new(0),
                NodeOffset::new(100),
                NodeOffset::new(150),
                NodeOffset::new(200)
            ]
        );

        assert_eq!(
            node.remove_separator(0).unwrap(),
            (10, NodeOffset::new(100))
        );
        let view = node.as_node();
        assert_eq!(view.keys().unwrap(), vec![15, 20]);
        assert_eq!(
            view.children().unwrap(),
            vec![NodeOffset::new(0), NodeOffset::new(150), NodeOffset::new(200)]
        );
    }

    #[test]
    fn test_push_and_pop_front() {
        let layout = NodeLayout::new(4);
        let mut data = slot(layout);
        let mut node = internal(layout, &mut data);

        node.push_front(5, NodeOffset::new(50)).unwrap();
        assert_eq!(node.as_node().keys().unwrap(), vec![5, 10, 20]);
        assert_eq!(node.as_node().child(0).unwrap(), NodeOffset::new(50));
        assert_eq!(node.as_node().child(1).unwrap(), NodeOffset::new(0));

        assert_eq!(node.pop_front().unwrap(), (5, NodeOffset::new(50)));
        assert_eq!(node.as_node().keys().unwrap(), vec![10, 20]);
        assert_eq!(node.as_node().child(0).unwrap(), NodeOffset::new(0));
    }

    #[test]
    fn test_set_separators_requires_extra_child() {
        let layout = NodeLayout::new(4);
        let mut data = slot(layout);
        let mut node = NodeMut::init(layout, &mut data, NodeType::Internal, NodeOffset::NONE);

        assert!(node.set_separators(&[1, 2], &[NodeOffset::new(0)]).is_err());
    }
}
