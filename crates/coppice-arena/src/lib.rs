//! Slab arena: a growable slot table addressed by stable [`NodeId`] handles.
//!
//! Released slots join an intrusive free list and are reused before the
//! table grows, so a long-lived arena under churn stays compact and handles
//! are recycled in LIFO order. A handle is valid from the `insert` that
//! returned it until the matching `remove`; the arena never moves a value
//! between slots.
//!
//! Access contract, in the style of slab containers: [`Slab::get`],
//! [`Slab::get_mut`], and [`Slab::remove`] panic on a vacant or
//! out-of-range handle, because a stale handle is a caller bug. The `try_`
//! variants exist for the places where absence is an expected answer.
//! Allocation failure (a configured capacity limit) and free-list
//! corruption are real runtime conditions and come back as errors.

use std::fmt;

use coppice_error::{CoppiceError, Result};
use coppice_log::Logger;
use coppice_types::NodeId;

// ── Stats ────────────────────────────────────────────────────────────────

/// Snapshot of arena counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlabStats {
    /// Total successful allocations.
    pub allocations_total: u64,
    /// Total releases (including those performed by `clear`).
    pub releases_total: u64,
    /// Currently occupied slots.
    pub live: usize,
    /// Highest occupancy ever observed.
    pub high_water: usize,
}

impl fmt::Display for SlabStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arena_allocs={} arena_releases={} arena_live={} arena_high_water={}",
            self.allocations_total, self.releases_total, self.live, self.high_water,
        )
    }
}

// ── Slab ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Slot<T> {
    Occupied(T),
    Vacant { next_free: Option<NodeId> },
}

/// A growable slab of `T` with stable handles and slot reuse.
#[derive(Clone)]
pub struct Slab<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<NodeId>,
    live: usize,
    capacity_limit: Option<usize>,
    allocations_total: u64,
    releases_total: u64,
    high_water: usize,
    logger: Option<Logger>,
}

impl<T> Slab<T> {
    /// An empty arena with no capacity limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            live: 0,
            capacity_limit: None,
            allocations_total: 0,
            releases_total: 0,
            high_water: 0,
            logger: None,
        }
    }

    /// An empty arena with `capacity` slots pre-reserved.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slab = Self::new();
        slab.slots.reserve(capacity);
        slab
    }

    /// An empty arena refusing to hold more than `limit` live values.
    ///
    /// Exceeding the limit makes `insert` return
    /// [`CoppiceError::CapacityExhausted`] while leaving the arena
    /// untouched.
    #[must_use]
    pub fn with_capacity_limit(limit: usize) -> Self {
        let mut slab = Self::new();
        slab.capacity_limit = Some(limit);
        slab
    }

    /// Attach a diagnostic logger; allocations and releases are reported
    /// at trace severity.
    #[must_use]
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Store `value`, reusing a released slot when one is available.
    pub fn insert(&mut self, value: T) -> Result<NodeId> {
        if let Some(limit) = self.capacity_limit {
            if self.live >= limit {
                return Err(CoppiceError::CapacityExhausted { capacity: limit });
            }
        }

        let handle = match self.free_head {
            Some(handle) => {
                let slot = self.slots.get_mut(handle.index()).ok_or_else(|| {
                    CoppiceError::arena_corrupt(format!("free head {handle} is out of range"))
                })?;
                match slot {
                    Slot::Occupied(_) => {
                        return Err(CoppiceError::arena_corrupt(format!(
                            "free head {handle} points at an occupied slot"
                        )));
                    }
                    Slot::Vacant { next_free } => {
                        self.free_head = *next_free;
                    }
                }
                *slot = Slot::Occupied(value);
                handle
            }
            None => {
                let handle = NodeId::from_index(self.slots.len()).ok_or_else(|| {
                    CoppiceError::arena_corrupt("slot index space exhausted".to_owned())
                })?;
                self.slots.push(Slot::Occupied(value));
                handle
            }
        };

        self.live += 1;
        self.allocations_total += 1;
        self.high_water = self.high_water.max(self.live);
        tracing::trace!(handle = handle.get(), live = self.live, "arena insert");
        if let Some(logger) = &self.logger {
            logger.trace(&format!("allocated slot {handle} (live {})", self.live));
        }
        Ok(handle)
    }

    /// Release the slot at `handle` and return its value.
    ///
    /// Panics if the handle is vacant or out of range.
    pub fn remove(&mut self, handle: NodeId) -> T {
        match self.try_remove(handle) {
            Some(value) => value,
            None => panic!("stale arena handle {handle}: slot is vacant or out of range"),
        }
    }

    /// Release the slot at `handle`, or `None` if it is not occupied.
    pub fn try_remove(&mut self, handle: NodeId) -> Option<T> {
        let next_free = self.free_head;
        let slot = self.slots.get_mut(handle.index())?;
        match std::mem::replace(slot, Slot::Vacant { next_free }) {
            Slot::Occupied(value) => {
                self.free_head = Some(handle);
                self.live -= 1;
                self.releases_total += 1;
                tracing::trace!(handle = handle.get(), live = self.live, "arena remove");
                if let Some(logger) = &self.logger {
                    logger.trace(&format!("released slot {handle} (live {})", self.live));
                }
                Some(value)
            }
            original @ Slot::Vacant { .. } => {
                // Not ours to free; undo the speculative replace.
                *slot = original;
                None
            }
        }
    }

    /// Borrow the value at `handle`.
    ///
    /// Panics if the handle is vacant or out of range.
    #[must_use]
    pub fn get(&self, handle: NodeId) -> &T {
        match self.try_get(handle) {
            Some(value) => value,
            None => panic!("stale arena handle {handle}: slot is vacant or out of range"),
        }
    }

    /// Mutably borrow the value at `handle`.
    ///
    /// Panics if the handle is vacant or out of range.
    #[must_use]
    pub fn get_mut(&mut self, handle: NodeId) -> &mut T {
        match self.try_get_mut(handle) {
            Some(value) => value,
            None => panic!("stale arena handle {handle}: slot is vacant or out of range"),
        }
    }

    /// Borrow the value at `handle`, or `None` if the slot is not occupied.
    #[must_use]
    pub fn try_get(&self, handle: NodeId) -> Option<&T> {
        match self.slots.get(handle.index()) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    /// Mutably borrow the value at `handle`, or `None` if the slot is not
    /// occupied.
    #[must_use]
    pub fn try_get_mut(&mut self, handle: NodeId) -> Option<&mut T> {
        match self.slots.get_mut(handle.index()) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    /// Whether `handle` names an occupied slot.
    #[must_use]
    pub fn contains(&self, handle: NodeId) -> bool {
        self.try_get(handle).is_some()
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether no slot is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Total slots in the table, occupied or vacant.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// The configured live-value limit, if any.
    #[must_use]
    pub fn capacity_limit(&self) -> Option<usize> {
        self.capacity_limit
    }

    /// Release every occupied slot and drop the slot table.
    pub fn clear(&mut self) {
        self.releases_total += self.live as u64;
        tracing::trace!(released = self.live, "arena clear");
        if let Some(logger) = &self.logger {
            logger.trace(&format!("cleared arena (released {})", self.live));
        }
        self.slots.clear();
        self.free_head = None;
        self.live = 0;
    }

    /// Snapshot the arena counters.
    #[must_use]
    pub fn stats(&self) -> SlabStats {
        SlabStats {
            allocations_total: self.allocations_total,
            releases_total: self.releases_total,
            live: self.live,
            high_water: self.high_water,
        }
    }

    /// Iterate over occupied slots in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            if let Slot::Occupied(value) = slot {
                NodeId::from_index(index).map(|handle| (handle, value))
            } else {
                None
            }
        })
    }
}

impl<T> Default for Slab<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Slab<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slab")
            .field("live", &self.live)
            .field("capacity", &self.slots.len())
            .field("capacity_limit", &self.capacity_limit)
            .finish()
    }
}
