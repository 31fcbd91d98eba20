//! Coppice: an ordered in-memory map on a B-tree of configurable minimum
//! degree, with bidirectional cursors, custom comparators, pluggable node
//! storage, and optional severity-routed diagnostics.
//!
//! This crate is the public face of the workspace; the pieces live in
//! `coppice-btree` (the tree and its cursors), `coppice-arena` (the slab
//! allocator behind the default node store), `coppice-log` (diagnostics),
//! and `coppice-types`/`coppice-error` (shared vocabulary).
//!
//! ```
//! use coppice::{MinDegree, Tree};
//!
//! let mut tree = Tree::with_min_degree(MinDegree::MIN);
//! for (key, name) in [(3, "three"), (1, "one"), (2, "two")] {
//!     tree.insert(key, name)?;
//! }
//!
//! assert_eq!(tree.get(&2), Some(&"two"));
//! assert_eq!(tree.first_key_value(), Some((&1, &"one")));
//!
//! let mut cursor = tree.lower_bound(&2);
//! assert_eq!(cursor.key(), Some(&2));
//! cursor.move_next();
//! assert_eq!(cursor.key(), Some(&3));
//!
//! let names: Vec<&str> = tree.values().copied().collect();
//! assert_eq!(names, ["one", "two", "three"]);
//! # Ok::<(), coppice::CoppiceError>(())
//! ```

pub use coppice_arena::{Slab, SlabStats};
pub use coppice_btree::{
    Comparator, Cursor, Entry, IntoIter, Iter, IterMut, Keys, NaturalOrder, Node, NodeSearch,
    NodeStore, OccupiedEntry, RangeIter, SlabNodeStore, Tree, TreeMetrics, VacantEntry, Values,
    ValuesMut, locate_in_node,
};
pub use coppice_error::{CoppiceError, ErrorKind, Result};
pub use coppice_log::{
    ConsoleSink, FileSink, LineFormat, LogSink, Logger, LoggerBuilder, MemorySink, Severity,
    TracingSink,
};
pub use coppice_types::{MinDegree, NodeId};
