//! arena-bptree - An order-configurable B+Tree stored as binary node records
//! in an append-only arena.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          BPlusTree                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │            Engines (index/btree/)                        │   │
//! │  │   Insert: split leaf → split internal → grow root       │   │
//! │  │   Delete: borrow left/right → merge → shrink root       │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │            Navigator (index/btree/navigator)             │   │
//! │  │       root-to-leaf descent, parent and sibling lookup    │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │            Node Codec (storage/node/)                    │   │
//! │  │   [type|key_count|parent] keys values next | children    │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │            Arena (storage/)                              │   │
//! │  │     append-only bytes, nodes addressed by offset         │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (NodeOffset, Error, config)
//! - [`storage`] - The arena and the node record format
//! - [`index`] - The B+Tree and its engines
//!
//! # Quick Start
//! ```
//! use arena_bptree::{BPlusTree, NOT_FOUND};
//!
//! let mut tree = BPlusTree::new(3, None).unwrap();
//! tree.insert(10, 100).unwrap();
//! tree.insert(20, 200).unwrap();
//! tree.insert(5, 50).unwrap();
//!
//! assert_eq!(tree.search(20).unwrap(), 200);
//! assert_eq!(tree.search(99).unwrap(), NOT_FOUND);
//!
//! tree.delete(20).unwrap();
//! assert_eq!(tree.len(), 2);
//! ```

pub mod common;
pub mod index;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::{DEFAULT_ORDER, MIN_ORDER, NOT_FOUND};
pub use common::{Error, NodeOffset, Result, TreeConfig};

pub use index::{BPlusTree, NodeInfo, Range, Traverse, TreeStats, TreeStatsSnapshot};
pub use storage::node::NodeType;
