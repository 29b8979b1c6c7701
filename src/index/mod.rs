//! Index structures.

pub mod btree;

pub use btree::{BPlusTree, NodeInfo, Range, Siblings, Traverse, TreeStats, TreeStatsSnapshot};
