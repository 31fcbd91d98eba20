//! A single B-tree node: sorted entries plus child handles.

use coppice_types::NodeId;

/// A variable-occupancy node block.
///
/// Entries are `(key, value)` pairs kept strictly sorted under the tree's
/// comparator. Leaves have no children; internal nodes have exactly
/// `entries.len() + 1` children, with everything under `children[i]`
/// sorting before `entries[i]` and everything under `children[i + 1]`
/// after it. Occupancy bounds are the tree's concern, not the node's —
/// a node will happily hold one entry past `max_keys` while a split is
/// in flight.
#[derive(Debug, Clone)]
pub struct Node<K, V> {
    pub(crate) entries: Vec<(K, V)>,
    pub(crate) children: Vec<NodeId>,
}

impl<K, V> Node<K, V> {
    /// An empty leaf with no reserved capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            children: Vec::new(),
        }
    }

    /// An empty leaf with room for a transiently overfull node, so in-node
    /// edits up to a split never reallocate.
    #[must_use]
    pub fn with_capacity(max_keys: usize) -> Self {
        Self {
            entries: Vec::with_capacity(max_keys + 1),
            children: Vec::with_capacity(max_keys + 2),
        }
    }

    /// Number of entries currently held.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Whether this node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// The child handles, left to right (empty for leaves).
    #[must_use]
    pub fn child_ids(&self) -> &[NodeId] {
        &self.children
    }

    /// The keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(key, _)| key)
    }
}

impl<K, V> Default for Node<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
