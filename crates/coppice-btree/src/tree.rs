//! The tree itself: ownership, construction, and the lookup engine.
//!
//! Mutation lives next door — the insert engine in `insert.rs`, the erase
//! engine in `erase.rs` — but every public operation starts here, by
//! building a descent path with [`Tree::locate_path`] and handing it to
//! whichever engine consumes it.

use std::fmt;
use std::marker::PhantomData;

use coppice_error::{CoppiceError, Result};
use coppice_log::{Logger, Severity};
use coppice_types::{MinDegree, NodeId};

use crate::cmp::{Comparator, NaturalOrder};
use crate::iter::Cursor;
use crate::metrics::TreeMetrics;
use crate::path::{MAX_DEPTH, PathFrame, descend_first, descend_last, step_next};
use crate::search::{NodeSearch, locate_in_node};
use crate::store::{NodeStore, SlabNodeStore};

/// An ordered map backed by a B-tree of fixed minimum degree.
///
/// Every node except the root holds between `t - 1` and `2t - 1` entries
/// for the configured degree `t`; the root may hold fewer. Lookup, insert,
/// and erase are logarithmic in the entry count. The tree is
/// single-threaded by contract: it holds no internal lock, and callers
/// sharing one across threads must serialize access externally.
///
/// Keys are only ever handed out behind `&K`; all mutable access is
/// value-only, so an entry's ordering position cannot be corrupted through
/// this API.
pub struct Tree<K, V, C = NaturalOrder, S = SlabNodeStore<K, V>> {
    pub(crate) root: Option<NodeId>,
    pub(crate) len: usize,
    pub(crate) degree: MinDegree,
    pub(crate) comparator: C,
    pub(crate) store: S,
    pub(crate) logger: Option<Logger>,
    pub(crate) metrics: TreeMetrics,
    // The store owns the entries; tie K and V to the tree's type anyway.
    marker: PhantomData<(K, V)>,
}

impl<K: Ord, V> Tree<K, V> {
    /// An empty tree with the default minimum degree and natural key order.
    #[must_use]
    pub fn new() -> Self {
        Self::with_min_degree(MinDegree::DEFAULT)
    }

    /// An empty tree with the given minimum degree.
    #[must_use]
    pub fn with_min_degree(degree: MinDegree) -> Self {
        Self::with_parts(degree, NaturalOrder, SlabNodeStore::new(degree), None)
    }
}

impl<K, V, C: Comparator<K>> Tree<K, V, C> {
    /// An empty tree ordered by `comparator`, with the default degree.
    #[must_use]
    pub fn with_comparator(comparator: C) -> Self {
        Self::with_parts(
            MinDegree::DEFAULT,
            comparator,
            SlabNodeStore::new(MinDegree::DEFAULT),
            None,
        )
    }
}

impl<K, V, C: Comparator<K>, S: NodeStore<K, V>> Tree<K, V, C, S> {
    /// Assemble a tree from explicit collaborators.
    #[must_use]
    pub fn with_parts(degree: MinDegree, comparator: C, store: S, logger: Option<Logger>) -> Self {
        Self {
            root: None,
            len: 0,
            degree,
            comparator,
            store,
            logger,
            metrics: TreeMetrics::default(),
            marker: PhantomData,
        }
    }

    /// Attach a diagnostic logger; structural events (splits, merges,
    /// borrows, root transitions) are reported at debug severity. Purely
    /// observational — no operation's result depends on it.
    pub fn attach_logger(&mut self, logger: Logger) {
        self.logger = Some(logger);
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The configured minimum degree.
    #[must_use]
    pub fn min_degree(&self) -> MinDegree {
        self.degree
    }

    /// The node store (for allocator statistics and invariant checks).
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The comparator this tree orders by.
    #[must_use]
    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Number of levels from root to leaf (0 when empty). Every leaf sits
    /// at the same depth, so the leftmost spine measures the whole tree.
    #[must_use]
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;
        while let Some(node) = current {
            height += 1;
            current = self.store.node(node).children.first().copied();
        }
        height
    }

    /// Snapshot the operation counters.
    #[must_use]
    pub fn metrics(&self) -> TreeMetrics {
        self.metrics
    }

    /// Zero the operation counters.
    pub fn reset_metrics(&mut self) {
        self.metrics = TreeMetrics::default();
    }

    pub(crate) fn log_debug(&self, message: impl FnOnce() -> String) {
        if let Some(logger) = &self.logger {
            if logger.enabled(Severity::Debug) {
                logger.debug(&message());
            }
        }
    }

    /// Build the full descent path from the root to the node that holds —
    /// or should hold — `key`, plus the search outcome at the final node.
    ///
    /// A `Found` result stops at the node containing the key, which may be
    /// internal; a `Vacant` result always terminates at a leaf, with the
    /// insertion index recorded in the top frame. An empty tree yields an
    /// empty path and `Vacant(0)`.
    pub(crate) fn locate_path(&self, key: &K) -> (Vec<PathFrame>, NodeSearch) {
        let mut frames = Vec::new();
        let Some(mut current) = self.root else {
            return (frames, NodeSearch::Vacant(0));
        };
        loop {
            debug_assert!(frames.len() < MAX_DEPTH, "descent depth out of bounds");
            let node = self.store.node(current);
            let search = locate_in_node(&self.comparator, &node.entries, key);
            match search {
                NodeSearch::Found(index) => {
                    frames.push(PathFrame {
                        node: current,
                        index,
                    });
                    return (frames, search);
                }
                NodeSearch::Vacant(index) => {
                    frames.push(PathFrame {
                        node: current,
                        index,
                    });
                    if node.is_leaf() {
                        return (frames, search);
                    }
                    current = node.children[index];
                }
            }
        }
    }

    /// Cursor over the entry for `key`, or the end sentinel if absent.
    pub fn find(&self, key: &K) -> Cursor<'_, K, V, C, S> {
        let (frames, search) = self.locate_path(key);
        if search.is_found() {
            Cursor::from_frames(self, frames)
        } else {
            Cursor::end(self)
        }
    }

    /// Whether an entry for `key` exists.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        let (_, search) = self.locate_path(key);
        search.is_found()
    }

    /// Borrow the value for `key`, if present.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.get_key_value(key).map(|(_, value)| value)
    }

    /// Borrow the entry for `key`, if present.
    #[must_use]
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let (frames, search) = self.locate_path(key);
        match (search, frames.last()) {
            (NodeSearch::Found(index), Some(frame)) => {
                let (key, value) = &self.store.node(frame.node).entries[index];
                Some((key, value))
            }
            _ => None,
        }
    }

    /// Mutably borrow the value for `key`, if present.
    #[must_use]
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let (frames, search) = self.locate_path(key);
        match (search, frames.last()) {
            (NodeSearch::Found(index), Some(frame)) => {
                Some(&mut self.store.node_mut(frame.node).entries[index].1)
            }
            _ => None,
        }
    }

    /// Borrow the value for `key`, or fail with
    /// [`CoppiceError::KeyNotFound`].
    pub fn at(&self, key: &K) -> Result<&V> {
        self.get(key).ok_or(CoppiceError::KeyNotFound)
    }

    /// Mutably borrow the value for `key`, or fail with
    /// [`CoppiceError::KeyNotFound`].
    pub fn at_mut(&mut self, key: &K) -> Result<&mut V> {
        self.get_mut(key).ok_or(CoppiceError::KeyNotFound)
    }

    /// Cursor on the first entry not less than `key` (end sentinel if all
    /// entries are smaller).
    pub fn lower_bound(&self, key: &K) -> Cursor<'_, K, V, C, S> {
        let (mut frames, search) = self.locate_path(key);
        if !search.is_found() {
            // The leaf's insertion index is already "first greater within
            // this node"; past the last entry, the answer lives in an
            // ancestor whose recorded child slot is its next entry slot.
            while let Some(frame) = frames.last() {
                if frame.index < self.store.node(frame.node).entries.len() {
                    break;
                }
                frames.pop();
            }
        }
        Cursor::from_frames(self, frames)
    }

    /// Cursor on the first entry strictly greater than `key`.
    pub fn upper_bound(&self, key: &K) -> Cursor<'_, K, V, C, S> {
        let (mut frames, search) = self.locate_path(key);
        if search.is_found() {
            step_next(&self.store, &mut frames);
        } else {
            while let Some(frame) = frames.last() {
                if frame.index < self.store.node(frame.node).entries.len() {
                    break;
                }
                frames.pop();
            }
        }
        Cursor::from_frames(self, frames)
    }

    /// Cursor on the smallest entry (end sentinel when empty).
    pub fn first(&self) -> Cursor<'_, K, V, C, S> {
        let mut frames = Vec::new();
        if let Some(root) = self.root {
            descend_first(&self.store, root, &mut frames);
        }
        Cursor::from_frames(self, frames)
    }

    /// Cursor on the largest entry (end sentinel when empty).
    pub fn last(&self) -> Cursor<'_, K, V, C, S> {
        let mut frames = Vec::new();
        if let Some(root) = self.root {
            descend_last(&self.store, root, &mut frames);
        }
        Cursor::from_frames(self, frames)
    }

    /// The smallest entry, if any.
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.first().key_value()
    }

    /// The largest entry, if any.
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.last().key_value()
    }

    /// Release every node and return to the freshly-constructed state,
    /// counters included. Iterative — no recursion on tree height.
    pub fn clear(&mut self) {
        self.metrics = TreeMetrics::default();
        let Some(root) = self.root.take() else {
            return;
        };
        let mut pending = vec![root];
        while let Some(handle) = pending.pop() {
            let node = self.store.release_node(handle);
            pending.extend(node.children);
        }
        self.len = 0;
    }
}

impl<K: Ord, V> Default for Tree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C, S> Clone for Tree<K, V, C, S>
where
    K: Clone,
    V: Clone,
    C: Comparator<K> + Clone,
    S: NodeStore<K, V> + Clone,
{
    /// Structural deep copy: the clone owns a cloned store, so the two
    /// trees share no node, and handles remain valid within each copy.
    fn clone(&self) -> Self {
        Self {
            root: self.root,
            len: self.len,
            degree: self.degree,
            comparator: self.comparator.clone(),
            store: self.store.clone(),
            logger: self.logger.clone(),
            metrics: self.metrics,
            marker: PhantomData,
        }
    }
}

impl<K, V, C, S> fmt::Debug for Tree<K, V, C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("len", &self.len)
            .field("degree", &self.degree)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}
