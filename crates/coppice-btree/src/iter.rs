//! Cursors and iterators.
//!
//! All shared-borrow traversal is path-stack walking (`path.rs`); nothing
//! here materializes the tree. The two exceptions are [`IterMut`], which
//! collects one pointer per entry up front so yielded `&mut V` borrows can
//! outlive the iterator's own reborrows, and [`IntoIter`], which drains
//! owned nodes into a vector.

use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ops::{Bound, RangeBounds};

use coppice_types::NodeId;

use crate::cmp::{Comparator, NaturalOrder};
use crate::node::Node;
use crate::path::{PathFrame, descend_first, descend_last, frames_equal, step_next, step_prev};
use crate::store::{NodeStore, SlabNodeStore};
use crate::tree::Tree;

/// A bidirectional position in a tree: either on an entry or at the end
/// sentinel one past the last entry.
///
/// A cursor borrows the tree and is invalidated by the borrow checker on
/// any mutation, so it can never dangle. Equality is positional: same tree,
/// same node identity, same in-node index — or both at the sentinel.
pub struct Cursor<'a, K, V, C = NaturalOrder, S = SlabNodeStore<K, V>> {
    tree: &'a Tree<K, V, C, S>,
    frames: Vec<PathFrame>,
}

impl<'a, K, V, C, S: NodeStore<K, V>> Cursor<'a, K, V, C, S> {
    pub(crate) fn from_frames(tree: &'a Tree<K, V, C, S>, frames: Vec<PathFrame>) -> Self {
        Self { tree, frames }
    }

    pub(crate) fn end(tree: &'a Tree<K, V, C, S>) -> Self {
        Self {
            tree,
            frames: Vec::new(),
        }
    }

    /// Whether this cursor sits at the end sentinel.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.frames.is_empty()
    }

    /// The key under the cursor, unless at the sentinel.
    #[must_use]
    pub fn key(&self) -> Option<&'a K> {
        self.key_value().map(|(key, _)| key)
    }

    /// The value under the cursor, unless at the sentinel.
    #[must_use]
    pub fn value(&self) -> Option<&'a V> {
        self.key_value().map(|(_, value)| value)
    }

    /// The entry under the cursor, unless at the sentinel.
    #[must_use]
    pub fn key_value(&self) -> Option<(&'a K, &'a V)> {
        let frame = self.frames.last()?;
        let (key, value) = &self.tree.store.node(frame.node).entries[frame.index];
        Some((key, value))
    }

    /// Advance to the next entry in key order. From the last entry this
    /// reaches the sentinel; from the sentinel it stays put.
    pub fn move_next(&mut self) {
        step_next(&self.tree.store, &mut self.frames);
    }

    /// Step back to the previous entry. From the sentinel this lands on
    /// the last entry; from the first entry it reaches the sentinel.
    pub fn move_prev(&mut self) {
        step_prev(&self.tree.store, self.tree.root, &mut self.frames);
    }
}

impl<K, V, C, S> Clone for Cursor<'_, K, V, C, S> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            frames: self.frames.clone(),
        }
    }
}

impl<K, V, C, S> PartialEq for Cursor<'_, K, V, C, S> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && frames_equal(&self.frames, &other.frames)
    }
}

impl<K, V, C, S> fmt::Debug for Cursor<'_, K, V, C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.frames.last() {
            Some(frame) => f
                .debug_struct("Cursor")
                .field("node", &frame.node)
                .field("index", &frame.index)
                .finish(),
            None => f.write_str("Cursor(end)"),
        }
    }
}

impl<K, V, C: Comparator<K>, S: NodeStore<K, V>> Tree<K, V, C, S> {
    /// Iterate entries in key order.
    pub fn iter(&self) -> Iter<'_, K, V, C, S> {
        let mut front = Vec::new();
        let mut back = Vec::new();
        if let Some(root) = self.root {
            descend_first(&self.store, root, &mut front);
            descend_last(&self.store, root, &mut back);
        }
        Iter {
            tree: self,
            front,
            back,
            remaining: self.len,
        }
    }

    /// Iterate keys in order.
    pub fn keys(&self) -> Keys<'_, K, V, C, S> {
        Keys { inner: self.iter() }
    }

    /// Iterate values in key order.
    pub fn values(&self) -> Values<'_, K, V, C, S> {
        Values { inner: self.iter() }
    }

    /// Iterate entries in key order with mutable access to the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let mut slots: Vec<(*const K, *mut V)> = Vec::with_capacity(self.len);
        if let Some(root) = self.root {
            // In-order walk; `step` counts children already descended, so
            // entry `step - 1` is due whenever `step > 0`.
            let mut stack: Vec<(NodeId, usize)> = vec![(root, 0)];
            while let Some((node, step)) = stack.pop() {
                if self.store.node(node).is_leaf() {
                    for (key, value) in &mut self.store.node_mut(node).entries {
                        slots.push((std::ptr::from_ref(key), std::ptr::from_mut(value)));
                    }
                    continue;
                }
                if step > 0 && step - 1 < self.store.node(node).entries.len() {
                    let (key, value) = &mut self.store.node_mut(node).entries[step - 1];
                    slots.push((std::ptr::from_ref(key), std::ptr::from_mut(value)));
                }
                let block = self.store.node(node);
                if step < block.children.len() {
                    let child = block.children[step];
                    stack.push((node, step + 1));
                    stack.push((child, 0));
                }
            }
        }
        debug_assert_eq!(slots.len(), self.len, "walk must visit every entry once");
        IterMut {
            slots: slots.into_iter(),
            _marker: PhantomData,
        }
    }

    /// Iterate values in key order with mutable access.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Iterate the entries whose keys fall within `range`, in key order.
    ///
    /// # Panics
    ///
    /// Panics if the range's start is greater than its end under this
    /// tree's comparator, or if both are equal and excluded.
    pub fn range(&self, range: impl RangeBounds<K>) -> RangeIter<'_, K, V, C, S> {
        if let (
            Bound::Included(start) | Bound::Excluded(start),
            Bound::Included(end) | Bound::Excluded(end),
        ) = (range.start_bound(), range.end_bound())
        {
            assert!(
                !self.comparator.less(end, start),
                "range start is greater than range end"
            );
            if let (Bound::Excluded(start), Bound::Excluded(end)) =
                (range.start_bound(), range.end_bound())
            {
                assert!(
                    self.comparator.less(start, end),
                    "range start and end are equal and excluded"
                );
            }
        }

        let front = match range.start_bound() {
            Bound::Included(key) => self.lower_bound(key).frames,
            Bound::Excluded(key) => self.upper_bound(key).frames,
            Bound::Unbounded => {
                let mut frames = Vec::new();
                if let Some(root) = self.root {
                    descend_first(&self.store, root, &mut frames);
                }
                frames
            }
        };
        let end = match range.end_bound() {
            Bound::Included(key) => self.upper_bound(key).frames,
            Bound::Excluded(key) => self.lower_bound(key).frames,
            Bound::Unbounded => Vec::new(),
        };
        RangeIter {
            tree: self,
            front,
            end,
        }
    }
}

/// Borrowing in-order iterator over entries.
pub struct Iter<'a, K, V, C = NaturalOrder, S = SlabNodeStore<K, V>> {
    tree: &'a Tree<K, V, C, S>,
    front: Vec<PathFrame>,
    back: Vec<PathFrame>,
    remaining: usize,
}

impl<'a, K, V, C, S: NodeStore<K, V>> Iterator for Iter<'a, K, V, C, S> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let frame = self.front.last()?;
        let (key, value) = &self.tree.store.node(frame.node).entries[frame.index];
        step_next(&self.tree.store, &mut self.front);
        self.remaining -= 1;
        Some((key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, C, S: NodeStore<K, V>> DoubleEndedIterator for Iter<'_, K, V, C, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let frame = self.back.last()?;
        let (key, value) = &self.tree.store.node(frame.node).entries[frame.index];
        step_prev(&self.tree.store, self.tree.root, &mut self.back);
        self.remaining -= 1;
        Some((key, value))
    }
}

impl<K, V, C, S: NodeStore<K, V>> ExactSizeIterator for Iter<'_, K, V, C, S> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V, C, S: NodeStore<K, V>> FusedIterator for Iter<'_, K, V, C, S> {}

impl<K, V, C, S> Clone for Iter<'_, K, V, C, S> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            front: self.front.clone(),
            back: self.back.clone(),
            remaining: self.remaining,
        }
    }
}

impl<K, V, C, S> fmt::Debug for Iter<'_, K, V, C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("remaining", &self.remaining)
            .finish_non_exhaustive()
    }
}

/// Borrowing in-order iterator over keys.
pub struct Keys<'a, K, V, C = NaturalOrder, S = SlabNodeStore<K, V>> {
    inner: Iter<'a, K, V, C, S>,
}

impl<'a, K, V, C, S: NodeStore<K, V>> Iterator for Keys<'a, K, V, C, S> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, C, S: NodeStore<K, V>> DoubleEndedIterator for Keys<'_, K, V, C, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

impl<K, V, C, S: NodeStore<K, V>> ExactSizeIterator for Keys<'_, K, V, C, S> {}
impl<K, V, C, S: NodeStore<K, V>> FusedIterator for Keys<'_, K, V, C, S> {}

impl<K, V, C, S> Clone for Keys<'_, K, V, C, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Borrowing in-order iterator over values.
pub struct Values<'a, K, V, C = NaturalOrder, S = SlabNodeStore<K, V>> {
    inner: Iter<'a, K, V, C, S>,
}

impl<'a, K, V, C, S: NodeStore<K, V>> Iterator for Values<'a, K, V, C, S> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, C, S: NodeStore<K, V>> DoubleEndedIterator for Values<'_, K, V, C, S> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V, C, S: NodeStore<K, V>> ExactSizeIterator for Values<'_, K, V, C, S> {}
impl<K, V, C, S: NodeStore<K, V>> FusedIterator for Values<'_, K, V, C, S> {}

impl<K, V, C, S> Clone for Values<'_, K, V, C, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// In-order iterator over entries with mutable value access.
///
/// Pointers to every entry are collected up front under the exclusive
/// borrow; yielding then never reborrows the tree, so the `&mut V` items
/// can all be live at once.
pub struct IterMut<'a, K, V> {
    slots: std::vec::IntoIter<(*const K, *mut V)>,
    _marker: PhantomData<(&'a K, &'a mut V)>,
}

impl<'a, K: 'a, V: 'a> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let (key, value) = self.slots.next()?;
        // SAFETY: each pointer pair was collected exactly once from a
        // distinct live entry while the tree was exclusively borrowed for
        // 'a, so these reborrows are unique and outlive the iterator.
        unsafe { Some((&*key, &mut *value)) }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl<'a, K: 'a, V: 'a> DoubleEndedIterator for IterMut<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let (key, value) = self.slots.next_back()?;
        // SAFETY: as in `next`.
        unsafe { Some((&*key, &mut *value)) }
    }
}

impl<'a, K: 'a, V: 'a> ExactSizeIterator for IterMut<'a, K, V> {}
impl<'a, K: 'a, V: 'a> FusedIterator for IterMut<'a, K, V> {}

/// In-order iterator over values with mutable access.
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K: 'a, V: 'a> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, K: 'a, V: 'a> DoubleEndedIterator for ValuesMut<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<'a, K: 'a, V: 'a> ExactSizeIterator for ValuesMut<'a, K, V> {}
impl<'a, K: 'a, V: 'a> FusedIterator for ValuesMut<'a, K, V> {}

/// Forward iterator over the entries within a key range.
pub struct RangeIter<'a, K, V, C = NaturalOrder, S = SlabNodeStore<K, V>> {
    tree: &'a Tree<K, V, C, S>,
    front: Vec<PathFrame>,
    end: Vec<PathFrame>,
}

impl<'a, K, V, C, S: NodeStore<K, V>> Iterator for RangeIter<'a, K, V, C, S> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if frames_equal(&self.front, &self.end) {
            return None;
        }
        let frame = self.front.last()?;
        let (key, value) = &self.tree.store.node(frame.node).entries[frame.index];
        step_next(&self.tree.store, &mut self.front);
        Some((key, value))
    }
}

impl<K, V, C, S: NodeStore<K, V>> FusedIterator for RangeIter<'_, K, V, C, S> {}

impl<K, V, C, S> Clone for RangeIter<'_, K, V, C, S> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            front: self.front.clone(),
            end: self.end.clone(),
        }
    }
}

/// Owning in-order iterator; nodes are drained and released as the tree is
/// consumed.
pub struct IntoIter<K, V> {
    entries: std::vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K, V, C: Comparator<K>, S: NodeStore<K, V>> IntoIterator for Tree<K, V, C, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(mut self) -> IntoIter<K, V> {
        enum Pending<K, V> {
            Node(Node<K, V>),
            Entry((K, V)),
        }

        let mut out = Vec::with_capacity(self.len);
        let mut stack = Vec::new();
        if let Some(root) = self.root.take() {
            stack.push(Pending::Node(self.store.release_node(root)));
        }
        while let Some(item) = stack.pop() {
            match item {
                Pending::Entry(entry) => out.push(entry),
                Pending::Node(mut node) => {
                    if node.children.is_empty() {
                        out.append(&mut node.entries);
                        continue;
                    }
                    // LIFO: the leftmost child drains first, then the entry
                    // separating it from the rest of this node.
                    let child = node.children.remove(0);
                    if node.entries.is_empty() {
                        stack.push(Pending::Node(self.store.release_node(child)));
                    } else {
                        let entry = node.entries.remove(0);
                        stack.push(Pending::Node(node));
                        stack.push(Pending::Entry(entry));
                        stack.push(Pending::Node(self.store.release_node(child)));
                    }
                }
            }
        }
        self.len = 0;
        IntoIter {
            entries: out.into_iter(),
        }
    }
}

impl<'a, K, V, C: Comparator<K>, S: NodeStore<K, V>> IntoIterator for &'a Tree<K, V, C, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, C, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, C: Comparator<K>, S: NodeStore<K, V>> IntoIterator for &'a mut Tree<K, V, C, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, C: Comparator<K>, S: NodeStore<K, V>> Extend<(K, V)> for Tree<K, V, C, S> {
    /// Insert every pair in order; duplicates keep the first-seen value.
    ///
    /// # Panics
    ///
    /// Panics if the node store refuses an allocation mid-stream — `Extend`
    /// has no error channel, and silently dropping the tail would corrupt
    /// the caller's view of what got in. Use [`Tree::insert`] directly when
    /// allocation failure must be recoverable.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            if let Err(err) = self.insert(key, value) {
                panic!("extend aborted: {err}");
            }
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for Tree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for Tree<K, V> {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
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

    #[test]
    fn iter_yields_sorted_pairs_and_exact_size() {
        let tree = tree_with([5, 1, 4, 2, 3]);
        let mut iter = tree.iter();
        assert_eq!(iter.len(), 5);
        assert_eq!(iter.next(), Some((&1, &10)));
        assert_eq!(iter.len(), 4);
        let rest: Vec<i32> = iter.map(|(&key, _)| key).collect();
        assert_eq!(rest, vec![2, 3, 4, 5]);
    }

    #[test]
    fn iter_rev_yields_descending_order() {
        let tree = tree_with(1..=20);
        let reversed: Vec<i32> = tree.iter().rev().map(|(&key, _)| key).collect();
        assert_eq!(reversed, (1..=20).rev().collect::<Vec<_>>());
    }

    #[test]
    fn iter_ends_meet_without_overlap() {
        let tree = tree_with(1..=5);
        let mut iter = tree.iter();
        assert_eq!(iter.next().map(|(&key, _)| key), Some(1));
        assert_eq!(iter.next_back().map(|(&key, _)| key), Some(5));
        assert_eq!(iter.next().map(|(&key, _)| key), Some(2));
        assert_eq!(iter.next_back().map(|(&key, _)| key), Some(4));
        assert_eq!(iter.next().map(|(&key, _)| key), Some(3));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn keys_and_values_track_iteration_order() {
        let tree = tree_with([3, 1, 2]);
        let keys: Vec<i32> = tree.keys().copied().collect();
        let values: Vec<i32> = tree.values().copied().collect();
        assert_eq!(keys, vec![1, 2, 3]);
        assert_eq!(values, vec![10, 20, 30]);
    }

    #[test]
    fn iter_mut_edits_every_value_in_place() {
        let mut tree = tree_with(1..=30);
        for (&key, value) in tree.iter_mut() {
            *value += key;
        }
        for (&key, &value) in &tree {
            assert_eq!(value, key * 10 + key);
        }
    }

    #[test]
    fn iter_mut_borrows_can_all_be_live_at_once() {
        let mut tree = tree_with([1, 2, 3]);
        let borrowed: Vec<&mut i32> = tree.values_mut().collect();
        for value in borrowed {
            *value = 0;
        }
        assert!(tree.values().all(|&value| value == 0));
    }

    #[test]
    fn range_honors_every_bound_shape() {
        let tree = tree_with(1..=10);
        let keys = |iter: RangeIter<'_, i32, i32>| -> Vec<i32> {
            iter.map(|(&key, _)| key).collect()
        };
        assert_eq!(keys(tree.range(3..7)), vec![3, 4, 5, 6]);
        assert_eq!(keys(tree.range(3..=7)), vec![3, 4, 5, 6, 7]);
        assert_eq!(keys(tree.range(..4)), vec![1, 2, 3]);
        assert_eq!(keys(tree.range(8..)), vec![8, 9, 10]);
        assert_eq!(keys(tree.range(..)), (1..=10).collect::<Vec<_>>());
        assert_eq!(
            keys(tree.range((Bound::Excluded(3), Bound::Included(5)))),
            vec![4, 5]
        );
        assert!(keys(tree.range(20..30)).is_empty());
    }

    #[test]
    fn range_between_existing_keys_is_empty_not_wrong() {
        let tree = tree_with([10, 20, 30]);
        let keys: Vec<i32> = tree.range(11..20).map(|(&key, _)| key).collect();
        assert!(keys.is_empty());
    }

    #[test]
    #[should_panic(expected = "range start is greater than range end")]
    fn inverted_range_panics() {
        let tree = tree_with(1..=5);
        let _ = tree.range(4..2);
    }

    #[test]
    #[should_panic(expected = "range start and end are equal and excluded")]
    fn doubly_excluded_point_range_panics() {
        let tree = tree_with(1..=5);
        let _ = tree.range((Bound::Excluded(3), Bound::Excluded(3)));
    }

    #[test]
    fn cursor_walks_forward_and_back() {
        let tree = tree_with(1..=9);
        let mut cursor = tree.find(&4);
        assert_eq!(cursor.key(), Some(&4));
        cursor.move_next();
        assert_eq!(cursor.key(), Some(&5));
        cursor.move_prev();
        cursor.move_prev();
        assert_eq!(cursor.key(), Some(&3));
    }

    #[test]
    fn cursor_wraps_through_the_sentinel() {
        let tree = tree_with([1, 2]);
        let mut cursor = tree.find(&2);
        cursor.move_next();
        assert!(cursor.is_end());
        cursor.move_next();
        assert!(cursor.is_end(), "the sentinel absorbs forward steps");
        cursor.move_prev();
        assert_eq!(cursor.key(), Some(&2), "prev from the sentinel is the last entry");
    }

    #[test]
    fn cursor_equality_is_positional() {
        let tree = tree_with(1..=5);
        assert_eq!(tree.find(&3), tree.lower_bound(&3));
        assert_ne!(tree.find(&3), tree.find(&4));

        let mut walked_off = tree.last();
        walked_off.move_next();
        assert_eq!(tree.find(&99), walked_off, "both sit at the sentinel");

        let other = tree_with(1..=5);
        assert_ne!(tree.find(&3), other.find(&3), "different trees never compare equal");
    }

    #[test]
    fn into_iter_drains_in_order_with_owned_values() {
        let mut tree: Tree<i32, String> = Tree::with_min_degree(MinDegree::MIN);
        for key in [4, 1, 3, 2, 5] {
            tree.insert(key, format!("v{key}")).expect("unbounded store");
        }
        let drained: Vec<(i32, String)> = tree.into_iter().collect();
        assert_eq!(
            drained,
            vec![
                (1, "v1".to_owned()),
                (2, "v2".to_owned()),
                (3, "v3".to_owned()),
                (4, "v4".to_owned()),
                (5, "v5".to_owned()),
            ]
        );
    }

    #[test]
    fn into_iter_is_double_ended() {
        let tree = tree_with(1..=6);
        let mut iter = tree.into_iter();
        assert_eq!(iter.next(), Some((1, 10)));
        assert_eq!(iter.next_back(), Some((6, 60)));
        assert_eq!(iter.len(), 4);
    }

    #[test]
    fn extend_and_collect_build_equivalent_trees() {
        let collected: Tree<i32, i32> = (1..=8).map(|key| (key, key)).collect();
        let mut extended = Tree::new();
        extended.extend((1..=8).map(|key| (key, key)));
        assert_eq!(collected.len(), 8);
        assert!(collected.iter().eq(extended.iter()));
    }

    #[test]
    fn extend_keeps_first_seen_duplicate() {
        let mut tree = Tree::new();
        tree.extend([(1, "a"), (1, "b")]);
        assert_eq!(tree.get(&1), Some(&"a"));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn from_array_collects_in_key_order() {
        let tree = Tree::from([(3, 'c'), (1, 'a'), (2, 'b')]);
        let pairs: Vec<(i32, char)> = tree.iter().map(|(&key, &value)| (key, value)).collect();
        assert_eq!(pairs, vec![(1, 'a'), (2, 'b'), (3, 'c')]);
    }
}
