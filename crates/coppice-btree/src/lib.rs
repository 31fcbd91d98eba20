//! Ordered map on a B-tree of configurable minimum degree, with stable
//! cursor positions, pluggable node storage, and custom key comparators.
//!
//! [`Tree`] is the entry point. Positions are [`Cursor`]s built on a
//! path-stack descent; node storage goes through the [`NodeStore`] trait,
//! with [`SlabNodeStore`] as the default slab-backed implementation.

pub mod cmp;
mod erase;
mod insert;
pub mod iter;
pub mod metrics;
pub mod node;
mod path;
pub mod search;
pub mod store;
pub mod tree;


pub use cmp::{Comparator, NaturalOrder};
pub use insert::{Entry, OccupiedEntry, VacantEntry};
pub use iter::{Cursor, IntoIter, Iter, IterMut, Keys, RangeIter, Values, ValuesMut};
pub use metrics::TreeMetrics;
pub use node::Node;
pub use search::{NodeSearch, locate_in_node};
pub use store::{NodeStore, SlabNodeStore};
pub use tree::Tree;
