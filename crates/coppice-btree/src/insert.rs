//! Insert engine: leaf insertion, split propagation, root growth.
//!
//! Splits allocate before they move: the new sibling (and, for a root
//! split, the new root) must exist before any entry leaves the overfull
//! node, so a failed allocation leaves every stored entry in place and
//! readable — the node merely stays one entry over `max_keys`, still
//! fully ordered.

use std::mem;

use coppice_error::{CoppiceError, Result};
use coppice_types::NodeId;

use crate::cmp::Comparator;
use crate::iter::Cursor;
use crate::path::PathFrame;
use crate::search::NodeSearch;
use crate::store::NodeStore;
use crate::tree::Tree;

impl<K, V, C: Comparator<K>, S: NodeStore<K, V>> Tree<K, V, C, S> {
    /// Insert `key → value`. If an equivalent key already exists the tree
    /// is untouched and the existing entry is returned with `false`;
    /// otherwise the cursor points at the fresh entry and the flag is
    /// `true`.
    pub fn insert(&mut self, key: K, value: V) -> Result<(Cursor<'_, K, V, C, S>, bool)> {
        let (frames, search) = self.locate_path(&key);
        if search.is_found() {
            return Ok((Cursor::from_frames(self, frames), false));
        }
        let frames = self.insert_at(frames, key, value)?;
        Ok((Cursor::from_frames(self, frames), true))
    }

    /// Insert `key → value`, overwriting the value in place if the key is
    /// already present (no structural change, no rebalancing). Returns the
    /// previous value when one was replaced.
    pub fn insert_or_assign(
        &mut self,
        key: K,
        value: V,
    ) -> Result<(Cursor<'_, K, V, C, S>, Option<V>)> {
        let (frames, search) = self.locate_path(&key);
        if let (NodeSearch::Found(index), Some(frame)) = (search, frames.last()) {
            let slot = &mut self.store.node_mut(frame.node).entries[index].1;
            let previous = mem::replace(slot, value);
            self.metrics.assigns += 1;
            return Ok((Cursor::from_frames(self, frames), Some(previous)));
        }
        let frames = self.insert_at(frames, key, value)?;
        Ok((Cursor::from_frames(self, frames), None))
    }

    /// A view into the slot for `key`, occupied or vacant. The value for a
    /// vacant slot is constructed only if an insert actually happens.
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V, C, S> {
        let (frames, search) = self.locate_path(&key);
        match (search, frames.last().copied()) {
            (NodeSearch::Found(_), Some(frame)) => {
                Entry::Occupied(OccupiedEntry { tree: self, frame })
            }
            _ => Entry::Vacant(VacantEntry { tree: self, key }),
        }
    }

    /// Place a new entry at the vacant position described by `frames`
    /// (from `locate_path`), then restore occupancy bounds by splitting
    /// upward. Returns the path to the entry's final resting place.
    pub(crate) fn insert_at(
        &mut self,
        mut frames: Vec<PathFrame>,
        key: K,
        value: V,
    ) -> Result<Vec<PathFrame>> {
        let Some(leaf) = frames.last().copied() else {
            // Empty tree: the first entry gets a fresh root leaf.
            let root = self.store.allocate_node()?;
            self.store.node_mut(root).entries.push((key, value));
            self.root = Some(root);
            self.len = 1;
            self.metrics.inserts += 1;
            return Ok(vec![PathFrame {
                node: root,
                index: 0,
            }]);
        };

        self.store
            .node_mut(leaf.node)
            .entries
            .insert(leaf.index, (key, value));
        self.len += 1;
        self.metrics.inserts += 1;

        let max_keys = self.degree.max_keys();
        let mut level = frames.len() - 1;
        while self.store.node(frames[level].node).entries.len() > max_keys {
            if level == 0 {
                self.split_root(&mut frames)?;
                break; // the new root holds exactly one entry
            }
            self.split_child(&mut frames, level)?;
            level -= 1;
        }
        Ok(frames)
    }

    /// Split the non-root node at `frames[level]`, promoting its median
    /// into the parent, and re-point the tracked path through the split.
    fn split_child(&mut self, frames: &mut Vec<PathFrame>, level: usize) -> Result<()> {
        let right = self.store.allocate_node()?;
        let node = frames[level].node;
        let (median, mid) = self.carve_right_half(node, right);

        let parent = frames[level - 1];
        {
            let block = self.store.node_mut(parent.node);
            block.entries.insert(parent.index, median);
            block.children.insert(parent.index + 1, right);
        }
        self.metrics.splits += 1;
        self.log_debug(|| {
            format!("split node {node}: new sibling {right}, median promoted into node {}", parent.node)
        });

        // Ancestor frames record child slots (left keeps 0..=mid), the top
        // frame an entry index; one shift formula covers both, and the
        // promoted median itself moves the tracked position up a level.
        let index = frames[level].index;
        if index == mid && level == frames.len() - 1 {
            frames.truncate(level);
        } else if index > mid {
            frames[level] = PathFrame {
                node: right,
                index: index - mid - 1,
            };
            frames[level - 1].index = parent.index + 1;
        }
        Ok(())
    }

    /// Split the root: both the sibling and the replacement root are
    /// allocated before any content moves.
    fn split_root(&mut self, frames: &mut Vec<PathFrame>) -> Result<()> {
        let right = self.store.allocate_node()?;
        let new_root = match self.store.allocate_node() {
            Ok(handle) => handle,
            Err(err) => {
                self.store.release_node(right);
                return Err(err);
            }
        };
        let old_root = frames[0].node;
        let (median, mid) = self.carve_right_half(old_root, right);
        {
            let block = self.store.node_mut(new_root);
            block.entries.push(median);
            block.children.push(old_root);
            block.children.push(right);
        }
        self.root = Some(new_root);
        self.metrics.splits += 1;
        self.metrics.root_grows += 1;
        self.log_debug(|| {
            format!("root split: node {old_root} and sibling {right} under new root {new_root}")
        });

        let index = frames[0].index;
        if index == mid && frames.len() == 1 {
            frames[0] = PathFrame {
                node: new_root,
                index: 0,
            };
        } else if index > mid {
            frames[0] = PathFrame {
                node: right,
                index: index - mid - 1,
            };
            frames.insert(
                0,
                PathFrame {
                    node: new_root,
                    index: 1,
                },
            );
        } else {
            frames.insert(
                0,
                PathFrame {
                    node: new_root,
                    index: 0,
                },
            );
        }
        Ok(())
    }

    /// Move everything strictly after the median of `node` into the empty
    /// node `right`; returns the median entry and its former index.
    fn carve_right_half(&mut self, node: NodeId, right: NodeId) -> ((K, V), usize) {
        let (median, mid, spill_entries, spill_children) = {
            let block = self.store.node_mut(node);
            let mid = block.entries.len() / 2;
            let spill_entries: Vec<(K, V)> = block.entries.drain(mid + 1..).collect();
            let median = block.entries.remove(mid);
            let spill_children: Vec<NodeId> = if block.children.is_empty() {
                Vec::new()
            } else {
                block.children.drain(mid + 1..).collect()
            };
            (median, mid, spill_entries, spill_children)
        };
        let block = self.store.node_mut(right);
        block.entries.extend(spill_entries);
        block.children.extend(spill_children);
        (median, mid)
    }
}

/// A view into one slot of the tree, occupied or vacant.
///
/// This is the construct-at-most-once insertion surface: the closure
/// passed to [`Entry::or_insert_with`] runs only when the slot is vacant
/// and the insert goes through.
#[derive(Debug)]
pub enum Entry<'a, K, V, C = crate::NaturalOrder, S = crate::SlabNodeStore<K, V>> {
    /// The key is present.
    Occupied(OccupiedEntry<'a, K, V, C, S>),
    /// The key is absent.
    Vacant(VacantEntry<'a, K, V, C, S>),
}

impl<'a, K, V, C: Comparator<K>, S: NodeStore<K, V>> Entry<'a, K, V, C, S> {
    /// The value in place, inserting `default` if the slot is vacant.
    pub fn or_insert(self, default: V) -> Result<&'a mut V> {
        match self {
            Self::Occupied(occupied) => Ok(occupied.into_mut()),
            Self::Vacant(vacant) => vacant.insert(default),
        }
    }

    /// The value in place, inserting `default()` if the slot is vacant.
    /// The closure does not run for an occupied slot.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> Result<&'a mut V> {
        match self {
            Self::Occupied(occupied) => Ok(occupied.into_mut()),
            Self::Vacant(vacant) => vacant.insert(default()),
        }
    }

    /// Run `apply` on the value if the slot is occupied, then hand the
    /// entry back for chaining.
    #[must_use]
    pub fn and_modify(mut self, apply: impl FnOnce(&mut V)) -> Self {
        if let Self::Occupied(occupied) = &mut self {
            apply(occupied.get_mut());
        }
        self
    }

    /// The key this entry refers to.
    #[must_use]
    pub fn key(&self) -> &K {
        match self {
            Self::Occupied(occupied) => occupied.key(),
            Self::Vacant(vacant) => vacant.key(),
        }
    }
}

/// An occupied slot: direct access to the stored entry.
#[derive(Debug)]
pub struct OccupiedEntry<'a, K, V, C = crate::NaturalOrder, S = crate::SlabNodeStore<K, V>> {
    tree: &'a mut Tree<K, V, C, S>,
    frame: PathFrame,
}

impl<'a, K, V, C: Comparator<K>, S: NodeStore<K, V>> OccupiedEntry<'a, K, V, C, S> {
    /// The stored key.
    #[must_use]
    pub fn key(&self) -> &K {
        &self.tree.store.node(self.frame.node).entries[self.frame.index].0
    }

    /// Borrow the stored value.
    #[must_use]
    pub fn get(&self) -> &V {
        &self.tree.store.node(self.frame.node).entries[self.frame.index].1
    }

    /// Mutably borrow the stored value.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self
            .tree
            .store
            .node_mut(self.frame.node)
            .entries[self.frame.index]
            .1
    }

    /// Convert into a value borrow outliving this view.
    #[must_use]
    pub fn into_mut(self) -> &'a mut V {
        let Self { tree, frame } = self;
        &mut tree.store.node_mut(frame.node).entries[frame.index].1
    }

    /// Replace the stored value, returning the old one.
    pub fn insert(&mut self, value: V) -> V {
        self.tree.metrics.assigns += 1;
        mem::replace(self.get_mut(), value)
    }
}

/// A vacant slot holding the key it was probed with.
#[derive(Debug)]
pub struct VacantEntry<'a, K, V, C = crate::NaturalOrder, S = crate::SlabNodeStore<K, V>> {
    tree: &'a mut Tree<K, V, C, S>,
    key: K,
}

impl<'a, K, V, C: Comparator<K>, S: NodeStore<K, V>> VacantEntry<'a, K, V, C, S> {
    /// The key that would be inserted.
    #[must_use]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Insert `value` under the held key and borrow it back.
    pub fn insert(self, value: V) -> Result<&'a mut V> {
        let Self { tree, key } = self;
        let (frames, _) = tree.locate_path(&key);
        let frames = tree.insert_at(frames, key, value)?;
        let Some(frame) = frames.last().copied() else {
            return Err(CoppiceError::internal("insert produced an empty path"));
        };
        Ok(&mut tree.store.node_mut(frame.node).entries[frame.index].1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coppice_types::MinDegree;

    #[test]
    fn duplicate_insert_keeps_the_original_value() {
        let mut tree = Tree::new();
        let (_, inserted) = tree.insert(1, "first").expect("unbounded store");
        assert!(inserted);
        let (cursor, inserted) = tree.insert(1, "second").expect("unbounded store");
        assert!(!inserted);
        assert_eq!(cursor.value(), Some(&"first"));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn insert_or_assign_replaces_and_returns_previous() {
        let mut tree = Tree::new();
        let (_, previous) = tree.insert_or_assign(1, "v1").expect("unbounded store");
        assert_eq!(previous, None);
        let (cursor, previous) = tree.insert_or_assign(1, "v2").expect("unbounded store");
        assert_eq!(previous, Some("v1"));
        assert_eq!(cursor.value(), Some(&"v2"));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.metrics().assigns, 1);
    }

    #[test]
    fn insert_cursor_lands_on_the_new_entry_across_splits() {
        // Degree 2: every fourth insert into one node forces a split, so
        // the returned cursor has to be re-pointed through the shuffle.
        let mut tree = Tree::with_min_degree(MinDegree::MIN);
        for key in 0..64 {
            let (cursor, inserted) = tree.insert(key, key * 10).expect("unbounded store");
            assert!(inserted);
            assert_eq!(cursor.key(), Some(&key), "cursor lost the entry at {key}");
            assert_eq!(cursor.value(), Some(&(key * 10)));
        }
        assert_eq!(tree.len(), 64);
    }

    #[test]
    fn split_boundary_promotes_exactly_one_median() {
        // Degree 3: max_keys = 5. The sixth insert splits the root.
        let degree = MinDegree::new(3).expect("valid degree");
        let mut tree = Tree::with_min_degree(degree);
        for key in 1..=5 {
            tree.insert(key, ()).expect("unbounded store");
        }
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.metrics().splits, 0);

        tree.insert(6, ()).expect("unbounded store");
        assert_eq!(tree.height(), 2);
        assert_eq!(tree.metrics().splits, 1);
        assert_eq!(tree.metrics().root_grows, 1);

        let root = tree.root.expect("non-empty");
        let root_block = tree.store.node(root);
        assert_eq!(root_block.entry_count(), 1, "exactly one promoted median");
        for &child in root_block.child_ids() {
            assert!(
                tree.store.node(child).entry_count() >= degree.min_keys(),
                "split halves must satisfy min occupancy"
            );
        }
    }

    #[test]
    fn entry_or_insert_constructs_at_most_once() {
        let mut tree = Tree::new();
        let value = tree.entry(7).or_insert_with(|| vec![1, 2]).expect("unbounded store");
        value.push(3);
        assert_eq!(tree.get(&7), Some(&vec![1, 2, 3]));

        // Occupied: the closure must not run.
        tree.entry(7)
            .or_insert_with(|| panic!("slot is occupied"))
            .expect("no insert happens");
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn entry_and_modify_touches_only_occupied_slots() {
        let mut tree = Tree::new();
        tree.insert(1, 10).expect("unbounded store");

        tree.entry(1).and_modify(|v| *v += 1).or_insert(0).expect("occupied");
        assert_eq!(tree.get(&1), Some(&11));

        tree.entry(2).and_modify(|v| *v += 1).or_insert(100).expect("vacant insert");
        assert_eq!(tree.get(&2), Some(&100));
    }

    #[test]
    fn entry_key_is_visible_before_any_insert() {
        let mut tree: Tree<i32, ()> = Tree::new();
        assert_eq!(*tree.entry(5).key(), 5);
        assert!(tree.is_empty(), "inspecting a vacant entry inserts nothing");
    }

    #[test]
    fn occupied_entry_insert_swaps_the_value() {
        let mut tree = Tree::new();
        tree.insert(1, "old").expect("unbounded store");
        match tree.entry(1) {
            Entry::Occupied(mut occupied) => {
                assert_eq!(occupied.insert("new"), "old");
                assert_eq!(occupied.get(), &"new");
            }
            Entry::Vacant(_) => panic!("key 1 is present"),
        }
    }
}
