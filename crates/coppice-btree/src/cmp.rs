//! Key ordering seam.
//!
//! The tree never compares keys directly; every ordering decision goes
//! through a [`Comparator`] supplied at construction. The default,
//! [`NaturalOrder`], defers to the key type's `Ord`. Any
//! `Fn(&K, &K) -> bool` strict-less predicate also works via the blanket
//! impl, so a closure is enough for custom orders.

use std::cmp::Ordering;

/// A strict weak order over keys: `less(a, b)` is true iff `a` sorts
/// strictly before `b`.
///
/// Two keys are *equivalent* when neither sorts before the other; the tree
/// treats equivalent keys as equal. The predicate must be irreflexive and
/// transitive — a comparator that is not a strict weak order makes lookup
/// results meaningless (not checked).
pub trait Comparator<K> {
    /// Whether `a` sorts strictly before `b`.
    fn less(&self, a: &K, b: &K) -> bool;

    /// Derive a total [`Ordering`] from two `less` calls.
    fn ordering(&self, a: &K, b: &K) -> Ordering {
        if self.less(a, b) {
            Ordering::Less
        } else if self.less(b, a) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

/// The default comparator: the key type's own `Ord`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<K: Ord> Comparator<K> for NaturalOrder {
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        a < b
    }

    #[inline]
    fn ordering(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

impl<K, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> bool,
{
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        self(a, b)
    }
}
