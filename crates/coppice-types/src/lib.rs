//! Shared newtypes used across the coppice workspace.
//!
//! These wrap the raw integers that cross crate boundaries — arena slot
//! handles and the tree's minimum-degree parameter — so that a handle can
//! never be confused with a length or an index, and invalid configurations
//! are unrepresentable.

use std::fmt;
use std::num::NonZeroU32;

/// An opaque handle to a node slot in an arena.
///
/// Handles are 1-based (handle 0 does not exist), so `Option<NodeId>` is the
/// same size as a bare `u32`. A handle stays valid until the slot it names is
/// explicitly released; the arena may then reuse it for a later allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct NodeId(NonZeroU32);

impl NodeId {
    /// The first handle an empty arena hands out.
    pub const FIRST: Self = Self(NonZeroU32::MIN);

    /// Create a handle from a raw u32.
    ///
    /// Returns `None` if `n` is 0 (handle 0 does not exist).
    #[inline]
    pub const fn new(n: u32) -> Option<Self> {
        match NonZeroU32::new(n) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Create a handle addressing the zero-based slot `index`.
    ///
    /// Returns `None` when the index does not fit the handle space.
    #[inline]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index >= u32::MAX as usize {
            return None;
        }
        match NonZeroU32::new(index as u32 + 1) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// The zero-based slot index this handle addresses.
    #[inline]
    pub const fn index(self) -> usize {
        self.0.get() as usize - 1
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for NodeId {
    type Error = InvalidNodeId;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidNodeId)
    }
}

/// Error returned when attempting to create a `NodeId` from 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidNodeId;

impl fmt::Display for InvalidNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("node handle cannot be zero")
    }
}

impl std::error::Error for InvalidNodeId {}

/// The minimum degree `t` of a B-tree.
///
/// Every node except the root holds between `t - 1` and `2t - 1` entries;
/// the root may hold between 0 and `2t - 1`. Must be at least 2 (a degree-1
/// tree could hold zero-entry nodes) and at most [`MinDegree::MAX`], which
/// keeps a single node's width sane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MinDegree(u32);

impl MinDegree {
    /// Smallest permitted degree: 2 (node occupancy 1..=3).
    pub const MIN: Self = Self(2);

    /// Default degree: 5 (node occupancy 4..=9).
    pub const DEFAULT: Self = Self(5);

    /// Largest permitted degree.
    pub const MAX: Self = Self(1 << 20);

    /// Create a new minimum degree, validating `2 <= t <= MAX`.
    pub const fn new(t: u32) -> Option<Self> {
        if t < Self::MIN.0 || t > Self::MAX.0 {
            None
        } else {
            Some(Self(t))
        }
    }

    /// Get the raw degree `t`.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Minimum entry count for a non-root node: `t - 1`.
    #[inline]
    pub const fn min_keys(self) -> usize {
        self.0 as usize - 1
    }

    /// Maximum entry count for any node: `2t - 1`.
    #[inline]
    pub const fn max_keys(self) -> usize {
        2 * self.0 as usize - 1
    }
}

impl Default for MinDegree {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for MinDegree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for MinDegree {
    type Error = InvalidMinDegree;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidMinDegree(value))
    }
}

/// Error returned when attempting to create a `MinDegree` outside `2..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidMinDegree(pub u32);

impl fmt::Display for InvalidMinDegree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "minimum degree must be in 2..={}, got {}", MinDegree::MAX.0, self.0)
    }
}

impl std::error::Error for InvalidMinDegree {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_rejects_zero() {
        assert_eq!(NodeId::new(0), None);
        assert_eq!(NodeId::try_from(0), Err(InvalidNodeId));
    }

    #[test]
    fn node_id_round_trips_raw_value() {
        let id = NodeId::new(7).expect("7 is a valid handle");
        assert_eq!(id.get(), 7);
        assert_eq!(id.to_string(), "7");
    }

    #[test]
    fn node_id_index_mapping_is_one_based() {
        let id = NodeId::from_index(0).expect("index 0 maps to handle 1");
        assert_eq!(id.get(), 1);
        assert_eq!(id.index(), 0);

        let id = NodeId::from_index(41).expect("index 41 maps to handle 42");
        assert_eq!(id.get(), 42);
        assert_eq!(id.index(), 41);
    }

    #[test]
    fn node_id_from_index_rejects_overflow() {
        assert_eq!(NodeId::from_index(u32::MAX as usize), None);
    }

    #[test]
    fn option_node_id_has_no_size_overhead() {
        assert_eq!(
            std::mem::size_of::<Option<NodeId>>(),
            std::mem::size_of::<u32>()
        );
    }

    #[test]
    fn min_degree_validates_range() {
        assert_eq!(MinDegree::new(0), None);
        assert_eq!(MinDegree::new(1), None);
        assert!(MinDegree::new(2).is_some());
        assert!(MinDegree::new(MinDegree::MAX.get()).is_some());
        assert_eq!(MinDegree::new(MinDegree::MAX.get() + 1), None);
    }

    #[test]
    fn min_degree_occupancy_bounds() {
        let t3 = MinDegree::new(3).expect("degree 3 is valid");
        assert_eq!(t3.min_keys(), 2);
        assert_eq!(t3.max_keys(), 5);

        let t2 = MinDegree::MIN;
        assert_eq!(t2.min_keys(), 1);
        assert_eq!(t2.max_keys(), 3);
    }

    #[test]
    fn min_degree_default_matches_documented_value() {
        assert_eq!(MinDegree::default(), MinDegree::DEFAULT);
        assert_eq!(MinDegree::DEFAULT.get(), 5);
    }

    #[test]
    fn min_degree_try_from_reports_offending_value() {
        let err = MinDegree::try_from(1).expect_err("degree 1 is invalid");
        assert_eq!(err, InvalidMinDegree(1));
        assert!(err.to_string().contains("got 1"));
    }
}
