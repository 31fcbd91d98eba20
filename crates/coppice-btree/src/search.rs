//! In-node search primitive.

use std::cmp::Ordering;

use crate::cmp::Comparator;

/// Outcome of searching one node's sorted entries for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeSearch {
    /// An equivalent key is present at this entry index.
    Found(usize),
    /// No equivalent key; this is the index it would be inserted at —
    /// equivalently, the count of entries strictly less than the key.
    Vacant(usize),
}

impl NodeSearch {
    /// The entry index (exact position or insertion point).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Found(index) | Self::Vacant(index) => index,
        }
    }

    /// Whether an equivalent key was present.
    #[must_use]
    pub const fn is_found(self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Binary-search one node's entries for `key` under `comparator`.
///
/// Comparator calls are the only observable work; no side effects.
pub fn locate_in_node<K, V, C: Comparator<K>>(
    comparator: &C,
    entries: &[(K, V)],
    key: &K,
) -> NodeSearch {
    let mut lo = 0usize;
    let mut hi = entries.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        match comparator.ordering(&entries[mid].0, key) {
            Ordering::Less => lo = mid + 1,
            Ordering::Greater => hi = mid,
            Ordering::Equal => return NodeSearch::Found(mid),
        }
    }
    NodeSearch::Vacant(lo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmp::NaturalOrder;

    fn entries(keys: &[i32]) -> Vec<(i32, ())> {
        keys.iter().map(|&k| (k, ())).collect()
    }

    #[test]
    fn empty_node_yields_vacant_zero() {
        let entries: Vec<(i32, ())> = Vec::new();
        assert_eq!(
            locate_in_node(&NaturalOrder, &entries, &7),
            NodeSearch::Vacant(0)
        );
    }

    #[test]
    fn exact_hits_at_every_position() {
        let entries = entries(&[10, 20, 30, 40, 50]);
        for (index, &(key, ())) in entries.iter().enumerate() {
            assert_eq!(
                locate_in_node(&NaturalOrder, &entries, &key),
                NodeSearch::Found(index)
            );
        }
    }

    #[test]
    fn vacant_index_counts_strictly_smaller_entries() {
        let entries = entries(&[10, 20, 30]);
        assert_eq!(
            locate_in_node(&NaturalOrder, &entries, &5),
            NodeSearch::Vacant(0)
        );
        assert_eq!(
            locate_in_node(&NaturalOrder, &entries, &15),
            NodeSearch::Vacant(1)
        );
        assert_eq!(
            locate_in_node(&NaturalOrder, &entries, &25),
            NodeSearch::Vacant(2)
        );
        assert_eq!(
            locate_in_node(&NaturalOrder, &entries, &35),
            NodeSearch::Vacant(3)
        );
    }

    #[test]
    fn custom_comparator_drives_the_search() {
        // Descending order: the comparator is the sole ordering authority.
        let descending = |a: &i32, b: &i32| b < a;
        let entries = entries(&[30, 20, 10]);
        assert_eq!(
            locate_in_node(&descending, &entries, &20),
            NodeSearch::Found(1)
        );
        assert_eq!(
            locate_in_node(&descending, &entries, &25),
            NodeSearch::Vacant(1)
        );
    }

    #[test]
    fn accessors_expose_index_and_hit() {
        assert_eq!(NodeSearch::Found(3).index(), 3);
        assert_eq!(NodeSearch::Vacant(3).index(), 3);
        assert!(NodeSearch::Found(0).is_found());
        assert!(!NodeSearch::Vacant(0).is_found());
    }
}
