//! Structural statistics for a B+Tree.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the structural changes a tree has gone through.
///
/// Counters are atomic so they can be read through `&BPlusTree` while the
/// engines bump them; `Ordering::Relaxed` is enough since no counter is
/// used to synchronize with another.
///
/// # Example
/// ```
/// use arena_bptree::BPlusTree;
///
/// let mut tree = BPlusTree::new(3, None).unwrap();
/// for key in 0..3 {
///     tree.insert(key, key as i64).unwrap();
/// }
/// let snapshot = tree.stats().snapshot();
/// assert_eq!(snapshot.leaf_splits, 1);
/// assert_eq!(snapshot.root_grows, 1);
/// ```
#[derive(Debug)]
pub struct TreeStats {
    /// Leaves split because they reached `order` keys.
    pub leaf_splits: AtomicU64,

    /// Internal nodes split because they reached `order` keys.
    pub internal_splits: AtomicU64,

    /// Underflows resolved by taking an entry from a sibling.
    pub borrows: AtomicU64,

    /// Underflows resolved by merging two siblings.
    pub merges: AtomicU64,

    /// New roots created above a split root.
    pub root_grows: AtomicU64,

    /// Empty internal roots replaced by their only child.
    pub root_shrinks: AtomicU64,

    /// Node records carved out of the arena.
    pub nodes_allocated: AtomicU64,
}

impl TreeStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self {
            leaf_splits: AtomicU64::new(0),
            internal_splits: AtomicU64::new(0),
            borrows: AtomicU64::new(0),
            merges: AtomicU64::new(0),
            root_grows: AtomicU64::new(0),
            root_shrinks: AtomicU64::new(0),
            nodes_allocated: AtomicU64::new(0),
        }
    }

    #[inline]
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a non-atomic copy of the counters.
    pub fn snapshot(&self) -> TreeStatsSnapshot {
        TreeStatsSnapshot {
            leaf_splits: self.leaf_splits.load(Ordering::Relaxed),
            internal_splits: self.internal_splits.load(Ordering::Relaxed),
            borrows: self.borrows.load(Ordering::Relaxed),
            merges: self.merges.load(Ordering::Relaxed),
            root_grows: self.root_grows.load(Ordering::Relaxed),
            root_shrinks: self.root_shrinks.load(Ordering::Relaxed),
            nodes_allocated: self.nodes_allocated.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.leaf_splits.store(0, Ordering::Relaxed);
        self.internal_splits.store(0, Ordering::Relaxed);
        self.borrows.store(0, Ordering::Relaxed);
        self.merges.store(0, Ordering::Relaxed);
        self.root_grows.store(0, Ordering::Relaxed);
        self.root_shrinks.store(0, Ordering::Relaxed);
        self.nodes_allocated.store(0, Ordering::Relaxed);
    }
}

impl Default for TreeStats {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time copy of [`TreeStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeStatsSnapshot {
    pub leaf_splits: u64,
    pub internal_splits: u64,
    pub borrows: u64,
    pub merges: u64,
    pub root_grows: u64,
    pub root_shrinks: u64,
    pub nodes_allocated: u64,
}

impl TreeStatsSnapshot {
    /// Total splits of either kind.
    pub fn splits(&self) -> u64 {
        self.leaf_splits + self.internal_splits
    }

    /// Node records no longer reachable from the root.
    ///
    /// Every merge strands exactly one record, since the arena never frees.
    pub fn orphaned_nodes(&self) -> u64 {
        self.merges + self.root_shrinks
    }
}

impl fmt::Display for TreeStatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ splits: {} ({} leaf, {} internal), borrows: {}, merges: {}, \
             root grows: {}, root shrinks: {}, nodes: {} }}",
            self.splits(),
            self.leaf_splits,
            self.internal_splits,
            self.borrows,
            self.merges,
            self.root_grows,
            self.root_shrinks,
            self.nodes_allocated
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = TreeStats::new();
        assert_eq!(stats.snapshot(), TreeStatsSnapshot::default());
    }

    #[test]
    fn test_stats_bump_and_reset() {
        let stats = TreeStats::new();
        TreeStats::bump(&stats.leaf_splits);
        TreeStats::bump(&stats.leaf_splits);
        TreeStats::bump(&stats.internal_splits);
        TreeStats::bump(&stats.merges);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.splits(), 3);
        assert_eq!(snapshot.merges, 1);

        stats.reset();
        assert_eq!(stats.snapshot().splits(), 0);
    }

    #[test]
    fn test_orphaned_nodes() {
        let snapshot = TreeStatsSnapshot {
            merges: 4,
            root_shrinks: 1,
            ..Default::default()
        };
        assert_eq!(snapshot.orphaned_nodes(), 5);
    }

    #[test]
    fn test_stats_display() {
        let snapshot = TreeStatsSnapshot {
            leaf_splits: 5,
            internal_splits: 2,
            merges: 1,
            ..Default::default()
        };
        let display = format!("{}", snapshot);

        assert!(display.contains("splits: 7"));
        assert!(display.contains("5 leaf"));
        assert!(display.contains("merges: 1"));
    }
}
