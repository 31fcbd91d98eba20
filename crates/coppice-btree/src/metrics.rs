//! Per-tree operation counters.
//!
//! Plain fields rather than atomics: a tree is single-threaded by
//! contract, and multiple trees with different degrees coexist in one
//! process, so global counters would conflate them.

use std::fmt;

/// Counters for one tree's structural activity since construction (or the
/// last [`reset`](crate::Tree::reset_metrics)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeMetrics {
    /// Entries inserted (excludes rejected duplicates and assigns).
    pub inserts: u64,
    /// Values overwritten in place by an assign variant.
    pub assigns: u64,
    /// Entries removed.
    pub erases: u64,
    /// Node splits, root splits included.
    pub splits: u64,
    /// Sibling merges.
    pub merges: u64,
    /// Rotations pulling slack from a left sibling.
    pub borrows_left: u64,
    /// Rotations pulling slack from a right sibling.
    pub borrows_right: u64,
    /// Times the tree grew a new root (height + 1).
    pub root_grows: u64,
    /// Times an emptied root collapsed into its child (height - 1).
    pub root_shrinks: u64,
}

impl fmt::Display for TreeMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "btree_inserts={} btree_assigns={} btree_erases={} btree_splits={} \
             btree_merges={} btree_borrows_left={} btree_borrows_right={} \
             btree_root_grows={} btree_root_shrinks={}",
            self.inserts,
            self.assigns,
            self.erases,
            self.splits,
            self.merges,
            self.borrows_left,
            self.borrows_right,
            self.root_grows,
            self.root_shrinks,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_all_zero() {
        assert_eq!(TreeMetrics::default(), TreeMetrics { ..Default::default() });
        assert_eq!(TreeMetrics::default().inserts, 0);
    }

    #[test]
    fn display_is_a_single_labelled_line() {
        let metrics = TreeMetrics {
            inserts: 10,
            splits: 2,
            root_grows: 1,
            ..Default::default()
        };
        let line = metrics.to_string();
        assert!(line.contains("btree_inserts=10"));
        assert!(line.contains("btree_splits=2"));
        assert!(line.contains("btree_root_grows=1"));
        assert!(!line.contains('\n'));
    }
}
