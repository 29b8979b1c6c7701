//! Arena-backed B+Tree.
//!
//! - [`bplus_tree`] - the tree handle, lookups and node access
//! - [`navigator`] - descent and parent/sibling lookup
//! - [`insert`] - insertion with leaf and internal splits
//! - [`delete`] - deletion with borrow, merge and root shrink
//! - [`iter`] - range scans and the diagnostic walk
//! - [`validate`] - structural checks
//! - [`stats`] - structural counters

pub mod bplus_tree;
pub mod delete;
pub mod insert;
pub mod iter;
pub mod navigator;
pub mod stats;
pub mod validate;

pub use bplus_tree::BPlusTree;
pub use iter::{NodeInfo, Range, Traverse};
pub use navigator::Siblings;
pub use stats::{TreeStats, TreeStatsSnapshot};
