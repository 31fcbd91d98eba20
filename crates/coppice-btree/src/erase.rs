//! Erase engine: leaf removal, predecessor swap for internal hits, and
//! upward rebalancing by borrow or merge.
//!
//! An internal hit is reduced to a leaf removal by swapping the doomed
//! entry with its in-order predecessor (the last entry of the left
//! subtree's rightmost leaf). The leaf may then underflow; rebalancing
//! walks the recorded path back toward the root, at each level pulling
//! slack from a sibling when one has it and merging with the separator
//! otherwise. A root left empty by a merge collapses into its sole child.

use std::mem;
use std::ops::RangeBounds;

use coppice_error::{CoppiceError, Result};
use coppice_types::NodeId;

use crate::cmp::Comparator;
use crate::iter::Cursor;
use crate::path::PathFrame;
use crate::search::NodeSearch;
use crate::store::NodeStore;
use crate::tree::Tree;

impl<K, V, C: Comparator<K>, S: NodeStore<K, V>> Tree<K, V, C, S> {
    /// Remove the entry for `key` and return a cursor at its in-order
    /// successor (the end cursor if the removed entry was last).
    pub fn erase(&mut self, key: &K) -> Result<Cursor<'_, K, V, C, S>> {
        let (removed_key, _) = self.erase_entry(key)?;
        // The key is gone, so its lower bound is the old successor.
        Ok(self.lower_bound(&removed_key))
    }

    /// Remove the entry for `key` and return its value.
    pub fn remove(&mut self, key: &K) -> Result<V> {
        Ok(self.erase_entry(key)?.1)
    }

    /// Remove the entry for `key` and return the stored key and value.
    pub fn remove_entry(&mut self, key: &K) -> Result<(K, V)> {
        self.erase_entry(key)
    }

    /// Remove every entry whose key falls within `range`. Returns how many
    /// entries were removed.
    pub fn erase_range(&mut self, range: impl RangeBounds<K>) -> Result<usize>
    where
        K: Clone,
    {
        let doomed: Vec<K> = self.range(range).map(|(key, _)| key.clone()).collect();
        for key in &doomed {
            self.remove(key)?;
        }
        Ok(doomed.len())
    }

    /// Drop every entry for which `keep` returns false. Returns how many
    /// entries were removed.
    pub fn retain(&mut self, mut keep: impl FnMut(&K, &V) -> bool) -> Result<usize>
    where
        K: Clone,
    {
        let doomed: Vec<K> = self
            .iter()
            .filter(|(key, value)| !keep(key, value))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &doomed {
            self.remove(key)?;
        }
        Ok(doomed.len())
    }

    fn erase_entry(&mut self, key: &K) -> Result<(K, V)> {
        let (mut frames, search) = self.locate_path(key);
        let NodeSearch::Found(entry_index) = search else {
            return Err(CoppiceError::KeyNotFound);
        };
        let Some(hit) = frames.last().copied() else {
            return Err(CoppiceError::KeyNotFound);
        };

        let removed = if self.store.node(hit.node).is_leaf() {
            self.store.node_mut(hit.node).entries.remove(entry_index)
        } else {
            // Internal hit: swap in the predecessor from the rightmost
            // leaf of the left subtree, turning this into a leaf removal.
            let mut current = self.store.node(hit.node).children[entry_index];
            loop {
                let block = self.store.node(current);
                if block.is_leaf() {
                    break;
                }
                frames.push(PathFrame {
                    node: current,
                    index: block.entries.len(),
                });
                current = block.children[block.entries.len()];
            }
            let Some(predecessor) = self.store.node_mut(current).entries.pop() else {
                return Err(CoppiceError::internal("predecessor leaf is empty"));
            };
            frames.push(PathFrame {
                node: current,
                index: 0,
            });
            mem::replace(
                &mut self.store.node_mut(hit.node).entries[entry_index],
                predecessor,
            )
        };

        self.len -= 1;
        self.metrics.erases += 1;

        if self.len == 0 {
            if let Some(root) = self.root.take() {
                self.store.release_node(root);
            }
            return Ok(removed);
        }
        self.rebalance_upward(frames);
        Ok(removed)
    }

    /// Walk the removal path bottom-up, fixing any node that fell below
    /// minimum occupancy, then collapse the root if a merge emptied it.
    fn rebalance_upward(&mut self, mut frames: Vec<PathFrame>) {
        let min_keys = self.degree.min_keys();
        while frames.len() > 1 {
            let child = frames[frames.len() - 1];
            if self.store.node(child.node).entries.len() >= min_keys {
                break;
            }
            frames.pop();
            let parent = frames[frames.len() - 1];
            self.fix_underflow(parent.node, parent.index);
        }

        let Some(root) = self.root else { return };
        let root_block = self.store.node(root);
        if root_block.entries.is_empty() && !root_block.children.is_empty() {
            let new_root = root_block.children[0];
            self.store.release_node(root);
            self.root = Some(new_root);
            self.metrics.root_shrinks += 1;
            self.log_debug(|| format!("root collapsed into node {new_root}"));
        }
    }

    /// Restore minimum occupancy at `children[child_index]` of `parent`:
    /// rotate from a sibling with slack, otherwise merge through the
    /// separator.
    fn fix_underflow(&mut self, parent: NodeId, child_index: usize) {
        let min_keys = self.degree.min_keys();
        let parent_block = self.store.node(parent);
        let left = (child_index > 0).then(|| parent_block.children[child_index - 1]);
        let right =
            (child_index < parent_block.entries.len()).then(|| parent_block.children[child_index + 1]);

        if let Some(left) = left {
            if self.store.node(left).entries.len() > min_keys {
                self.borrow_from_left(parent, child_index, left);
                return;
            }
        }
        if let Some(right) = right {
            if self.store.node(right).entries.len() > min_keys {
                self.borrow_from_right(parent, child_index, right);
                return;
            }
        }
        // Both siblings (or the only one) sit at minimum: merge.
        let left_index = if left.is_some() {
            child_index - 1
        } else {
            child_index
        };
        self.merge_children(parent, left_index);
    }

    /// Rotate one entry clockwise: the left sibling's last entry replaces
    /// the separator, which drops into the underfull node.
    fn borrow_from_left(&mut self, parent: NodeId, child_index: usize, left: NodeId) {
        let current = self.store.node(parent).children[child_index];
        let (entry, moved_child) = {
            let block = self.store.node_mut(left);
            let last = block.entries.len() - 1;
            (block.entries.remove(last), block.children.pop())
        };
        let separator = mem::replace(&mut self.store.node_mut(parent).entries[child_index - 1], entry);
        let block = self.store.node_mut(current);
        block.entries.insert(0, separator);
        if let Some(child) = moved_child {
            block.children.insert(0, child);
        }
        self.metrics.borrows_left += 1;
        self.log_debug(|| format!("borrowed from left sibling {left} into node {current}"));
    }

    /// Rotate one entry counter-clockwise: the right sibling's first entry
    /// replaces the separator, which drops into the underfull node.
    fn borrow_from_right(&mut self, parent: NodeId, child_index: usize, right: NodeId) {
        let current = self.store.node(parent).children[child_index];
        let (entry, moved_child) = {
            let block = self.store.node_mut(right);
            let child = if block.children.is_empty() {
                None
            } else {
                Some(block.children.remove(0))
            };
            (block.entries.remove(0), child)
        };
        let separator = mem::replace(&mut self.store.node_mut(parent).entries[child_index], entry);
        let block = self.store.node_mut(current);
        block.entries.push(separator);
        if let Some(child) = moved_child {
            block.children.push(child);
        }
        self.metrics.borrows_right += 1;
        self.log_debug(|| format!("borrowed from right sibling {right} into node {current}"));
    }

    /// Fold `children[left_index + 1]` and the separator between them into
    /// `children[left_index]`, releasing the right node.
    fn merge_children(&mut self, parent: NodeId, left_index: usize) {
        let (separator, right_id, left_id) = {
            let block = self.store.node_mut(parent);
            let separator = block.entries.remove(left_index);
            let right_id = block.children.remove(left_index + 1);
            (separator, right_id, block.children[left_index])
        };
        let right = self.store.release_node(right_id);
        let block = self.store.node_mut(left_id);
        block.entries.push(separator);
        block.entries.extend(right.entries);
        block.children.extend(right.children);
        self.metrics.merges += 1;
        self.log_debug(|| format!("merged node {right_id} into node {left_id}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coppice_types::MinDegree;

    fn tree_with(keys: impl IntoIterator<Item = i32>) -> Tree<i32, i32> {
        let mut tree = Tree::with_min_degree(MinDegree::MIN);
        for key in keys {
            tree.insert(key, key * 10).expect("unbounded store");
        }
        tree
    }

    fn keys(tree: &Tree<i32, i32>) -> Vec<i32> {
        tree.iter().map(|(&key, _)| key).collect()
    }

    #[test]
    fn remove_missing_key_reports_not_found() {
        let mut tree = tree_with([1, 2, 3]);
        assert!(matches!(tree.remove(&9), Err(CoppiceError::KeyNotFound)));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn remove_returns_the_stored_value() {
        let mut tree = tree_with(1..=10);
        assert_eq!(tree.remove(&7).expect("present"), 70);
        assert_eq!(tree.len(), 9);
        assert!(!tree.contains_key(&7));
    }

    #[test]
    fn remove_entry_returns_key_and_value() {
        let mut tree = tree_with([5]);
        assert_eq!(tree.remove_entry(&5).expect("present"), (5, 50));
        assert!(tree.is_empty());
    }

    #[test]
    fn erase_returns_cursor_at_the_successor() {
        let mut tree = tree_with(1..=8);
        let cursor = tree.erase(&4).expect("present");
        assert_eq!(cursor.key(), Some(&5));

        let cursor = tree.erase(&8).expect("present");
        assert!(cursor.is_end(), "erasing the last entry yields the end cursor");
    }

    #[test]
    fn internal_hit_swaps_in_the_predecessor() {
        // Ascending inserts at degree 2 leave 3 as a root separator.
        let mut tree = tree_with(1..=7);
        let root = tree.root.expect("non-empty");
        assert!(
            !tree.store().node(root).is_leaf(),
            "tree must be tall enough for an internal hit"
        );
        tree.remove(&3).expect("present");
        assert_eq!(keys(&tree), vec![1, 2, 4, 5, 6, 7]);
    }

    #[test]
    fn draining_everything_frees_all_nodes() {
        let mut tree = tree_with(1..=50);
        for key in 1..=50 {
            tree.remove(&key).expect("present");
        }
        assert!(tree.is_empty());
        assert_eq!(tree.store().live_nodes(), 0, "no node may leak");
        assert!(tree.metrics().root_shrinks > 0, "height must have come down");
    }

    #[test]
    fn reverse_drain_exercises_left_borrows() {
        let mut tree = tree_with(1..=50);
        for key in (1..=50).rev() {
            tree.remove(&key).expect("present");
        }
        assert!(tree.is_empty());
        assert!(tree.metrics().borrows_left > 0);
    }

    #[test]
    fn erase_range_removes_exactly_the_span() {
        let mut tree = tree_with(1..=20);
        let removed = tree.erase_range(5..=10).expect("all present");
        assert_eq!(removed, 6);
        assert_eq!(
            keys(&tree),
            vec![1, 2, 3, 4, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20]
        );
    }

    #[test]
    fn erase_range_on_an_empty_span_is_a_no_op() {
        let mut tree = tree_with(1..=5);
        assert_eq!(tree.erase_range(10..20).expect("nothing to do"), 0);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn retain_keeps_matching_entries() {
        let mut tree = tree_with(1..=10);
        let removed = tree.retain(|key, _| key % 2 == 0).expect("all removable");
        assert_eq!(removed, 5);
        assert_eq!(keys(&tree), vec![2, 4, 6, 8, 10]);
    }
}
