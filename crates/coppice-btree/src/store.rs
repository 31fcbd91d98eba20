//! The node allocation seam.
//!
//! The tree never owns node memory directly; it asks a [`NodeStore`] for
//! handles and dereferences them on demand. The default implementation,
//! [`SlabNodeStore`], backs nodes with a [`coppice_arena::Slab`]. The trait
//! exists so tests can interpose — inject allocation failures, count
//! traffic — without touching the engines.

use coppice_arena::{Slab, SlabStats};
use coppice_error::Result;
use coppice_log::Logger;
use coppice_types::{MinDegree, NodeId};

use crate::node::Node;

/// Allocates, resolves, and releases node blocks by stable handle.
///
/// A handle returned by `allocate_node` stays valid until the matching
/// `release_node`. Resolving or releasing a stale handle is a caller bug
/// and panics (the slab-indexing convention); the tree never retains a
/// handle past its release, so those panics are unreachable through the
/// public tree API. Allocation failure is a real runtime condition and is
/// reported as an error.
pub trait NodeStore<K, V> {
    /// Allocate a fresh empty node and return its handle.
    fn allocate_node(&mut self) -> Result<NodeId>;

    /// Release the node at `handle`, returning the evicted block.
    ///
    /// Panics if the handle is stale.
    fn release_node(&mut self, handle: NodeId) -> Node<K, V>;

    /// Borrow the node at `handle`. Panics if the handle is stale.
    fn node(&self, handle: NodeId) -> &Node<K, V>;

    /// Mutably borrow the node at `handle`. Panics if the handle is stale.
    fn node_mut(&mut self, handle: NodeId) -> &mut Node<K, V>;

    /// Number of currently allocated nodes.
    fn live_nodes(&self) -> usize;
}

/// The default store: an arena slab of nodes, pre-sized for the tree's
/// degree so a node's in-place edits never reallocate.
#[derive(Debug, Clone)]
pub struct SlabNodeStore<K, V> {
    slab: Slab<Node<K, V>>,
    degree: MinDegree,
}

impl<K, V> SlabNodeStore<K, V> {
    /// A store for trees of the given minimum degree.
    #[must_use]
    pub fn new(degree: MinDegree) -> Self {
        Self {
            slab: Slab::new(),
            degree,
        }
    }

    /// A store refusing to hold more than `limit` live nodes; allocation
    /// past the limit fails with a resource-exhaustion error.
    #[must_use]
    pub fn with_capacity_limit(degree: MinDegree, limit: usize) -> Self {
        Self {
            slab: Slab::with_capacity_limit(limit),
            degree,
        }
    }

    /// Route arena allocation/release diagnostics to `logger`.
    #[must_use]
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.slab = self.slab.with_logger(logger);
        self
    }

    /// Snapshot the underlying arena counters.
    #[must_use]
    pub fn stats(&self) -> SlabStats {
        self.slab.stats()
    }
}

impl<K, V> NodeStore<K, V> for SlabNodeStore<K, V> {
    fn allocate_node(&mut self) -> Result<NodeId> {
        self.slab.insert(Node::with_capacity(self.degree.max_keys()))
    }

    fn release_node(&mut self, handle: NodeId) -> Node<K, V> {
        self.slab.remove(handle)
    }

    fn node(&self, handle: NodeId) -> &Node<K, V> {
        self.slab.get(handle)
    }

    fn node_mut(&mut self, handle: NodeId) -> &mut Node<K, V> {
        self.slab.get_mut(handle)
    }

    fn live_nodes(&self) -> usize {
        self.slab.len()
    }
}
