#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod error;

pub mod hash;

/// An integer-keyed hash table using hopscotch hashing.
///
/// Every entry lives within a fixed-size neighborhood of its home bucket, and
/// each bucket carries a bitmask recording which neighborhood slots hold its
/// entries, so lookups never scan past the neighborhood.
pub mod hopscotch;

/// An integer-keyed hash table using robin hood hashing.
///
/// Linear probing where an inserted entry takes the slot of any resident that
/// sits closer to its own home, with backward-shift deletion.
pub mod robin_hood;

#[cfg(any(test, feature = "stats"))]
pub mod stats;

#[cfg(test)]
mod tests;

use core::fmt;

pub use error::ConfigError;
pub use hash::Fnv1State;
pub use hash::ModuloState;
pub use hopscotch::HopscotchTable;
pub use robin_hood::RobinHoodTable;

/// Number of slots a table gets when built through `Default` or
/// `FromIterator`.
pub const DEFAULT_CAPACITY: usize = 16;

/// The operations both tables support, so a client can pick an engine at
/// construction and drive it through one interface.
///
/// # Examples
///
/// ```rust
/// use hop_hood::HopscotchTable;
/// use hop_hood::IntMap;
/// use hop_hood::RobinHoodTable;
///
/// fn fill<M: IntMap<u64>>(map: &mut M) {
///     for key in 0..100 {
///         map.set(key, key * 10);
///     }
/// }
///
/// let mut hop = HopscotchTable::new(16, 4);
/// let mut hood = RobinHoodTable::new(16, 0.5);
/// fill(&mut hop);
/// fill(&mut hood);
/// assert_eq!(hop.get(42), Some(&420));
/// assert_eq!(hood.get(42), Some(&420));
/// ```
pub trait IntMap<V> {
    /// Inserts or overwrites `key`, returning the previous value if the key
    /// was present.
    fn set(&mut self, key: u64, value: V) -> Option<V>;

    /// Returns the value stored for `key`.
    fn get(&self, key: u64) -> Option<&V>;

    /// Removes `key`, returning its value. Does nothing if the key is absent.
    fn delete(&mut self, key: u64) -> Option<V>;

    /// Calls `visit` for each entry in physical slot order until it returns
    /// `false`.
    fn range<F>(&self, visit: F)
    where
        F: FnMut(u64, &V) -> bool;

    /// Yields a view of every slot, occupied or empty, in physical order.
    fn slots<'a>(&'a self) -> impl Iterator<Item = SlotView<'a, V>>
    where
        V: 'a;

    /// Number of live entries.
    fn len(&self) -> usize;

    /// Number of slots in the backing array.
    fn capacity(&self) -> usize;

    /// Returns `true` if the table holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `key` is present.
    fn contains_key(&self, key: u64) -> bool {
        self.get(key).is_some()
    }

    /// Writes one line per slot to stdout.
    #[cfg(feature = "std")]
    fn print(&self)
    where
        V: fmt::Debug;
}

/// A single physical slot as seen by [`IntMap::slots`].
pub enum SlotView<'a, V> {
    /// Nothing is stored in this slot.
    Empty,
    /// The slot holds an entry.
    Occupied {
        /// The entry's key.
        key: u64,
        /// The entry's value.
        value: &'a V,
        /// How many slots (circularly) the entry sits past its home bucket.
        displacement: usize,
    },
}

impl<V> SlotView<'_, V> {
    /// Returns `true` if the slot holds an entry.
    pub fn is_occupied(&self) -> bool {
        matches!(self, SlotView::Occupied { .. })
    }

    /// The entry's displacement from its home bucket, if the slot is
    /// occupied.
    pub fn displacement(&self) -> Option<usize> {
        match self {
            SlotView::Empty => None,
            SlotView::Occupied { displacement, .. } => Some(*displacement),
        }
    }
}

impl<V> Clone for SlotView<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for SlotView<'_, V> {}

impl<V: fmt::Debug> fmt::Debug for SlotView<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotView::Empty => f.write_str("empty"),
            SlotView::Occupied {
                key,
                value,
                displacement,
            } => write!(f, "{key} => {value:?} (+{displacement})"),
        }
    }
}
