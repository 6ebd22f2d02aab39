use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::BuildHasher;

use crate::ConfigError;
use crate::DEFAULT_CAPACITY;
use crate::IntMap;
use crate::SlotView;
use crate::hash::ModuloState;
use crate::hash::home_bucket;

/// Load factor used by `Default`, `FromIterator`, and in place of a NaN.
pub const DEFAULT_LOAD_FACTOR: f64 = 0.5;

/// Smallest accepted load factor. Smaller values are raised to this.
pub const MIN_LOAD_FACTOR: f64 = 0.01;

#[derive(Clone)]
struct Entry<V> {
    key: u64,
    value: V,
    /// Distance from the home bucket to the slot holding this entry.
    offset: usize,
}

fn empty_slots<V>(capacity: usize) -> Vec<Option<Entry<V>>> {
    let mut slots = Vec::with_capacity(capacity);
    slots.resize_with(capacity, || None);
    slots
}

/// A hash table mapping `u64` keys to `V` using robin hood hashing.
///
/// Collisions are resolved by linear probing from the home bucket
/// `hash(key) % capacity`. While probing, an entry that has travelled
/// further from its home than the resident it meets takes that resident's
/// slot, and the resident continues probing in its place. This keeps probe
/// lengths even and lets lookups stop as soon as they meet a resident closer
/// to home than the key being searched for.
///
/// Deleting an entry shifts the following run of displaced entries back by
/// one slot, so no tombstones are left behind.
///
/// The table doubles whenever an insertion brings `len / capacity` up to the
/// load factor.
///
/// # Examples
///
/// ```rust
/// use hop_hood::RobinHoodTable;
///
/// let mut table = RobinHoodTable::new(16, 0.5);
/// for key in 0..5 {
///     table.set(key, key);
/// }
/// table.delete(3);
///
/// assert_eq!(table.get(3), None);
/// assert_eq!(table.get(4), Some(&4));
/// assert_eq!(table.len(), 4);
/// ```
#[derive(Clone)]
pub struct RobinHoodTable<V, S = ModuloState> {
    slots: Vec<Option<Entry<V>>>,
    populated: usize,
    load_factor: f64,
    hash_builder: S,
}

impl<V> RobinHoodTable<V> {
    /// Creates a table with `capacity` slots that grows once
    /// `len >= capacity * load_factor`, using `key % capacity` as the home
    /// bucket.
    ///
    /// Out-of-range parameters are corrected rather than rejected: the load
    /// factor is clamped to `[MIN_LOAD_FACTOR, 1.0]` (NaN becomes
    /// [`DEFAULT_LOAD_FACTOR`]) and a zero capacity becomes one slot. Use
    /// [`try_new`](Self::try_new) to reject them instead.
    pub fn new(capacity: usize, load_factor: f64) -> Self {
        Self::with_hasher(capacity, load_factor, ModuloState)
    }

    /// Like [`new`](Self::new), but fails on a zero capacity or an
    /// out-of-range load factor.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hop_hood::ConfigError;
    /// use hop_hood::RobinHoodTable;
    ///
    /// assert!(RobinHoodTable::<u32>::try_new(16, 0.9).is_ok());
    /// assert_eq!(
    ///     RobinHoodTable::<u32>::try_new(16, 1.5).err(),
    ///     Some(ConfigError::LoadFactor(1.5))
    /// );
    /// ```
    pub fn try_new(capacity: usize, load_factor: f64) -> Result<Self, ConfigError> {
        Self::try_with_hasher(capacity, load_factor, ModuloState)
    }
}

impl<V, S> RobinHoodTable<V, S>
where
    S: BuildHasher,
{
    /// Creates a table that picks home buckets with `hash_builder`.
    ///
    /// Parameters are corrected the same way as in [`RobinHoodTable::new`].
    pub fn with_hasher(capacity: usize, load_factor: f64, hash_builder: S) -> Self {
        let load_factor = if load_factor.is_nan() {
            DEFAULT_LOAD_FACTOR
        } else {
            load_factor.clamp(MIN_LOAD_FACTOR, 1.0)
        };

        Self {
            slots: empty_slots(capacity.max(1)),
            populated: 0,
            load_factor,
            hash_builder,
        }
    }

    /// Creates a table that picks home buckets with `hash_builder`, rejecting
    /// out-of-range parameters.
    pub fn try_with_hasher(
        capacity: usize,
        load_factor: f64,
        hash_builder: S,
    ) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if !(MIN_LOAD_FACTOR..=1.0).contains(&load_factor) {
            return Err(ConfigError::LoadFactor(load_factor));
        }
        Ok(Self::with_hasher(capacity, load_factor, hash_builder))
    }

    /// Returns the number of entries in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table contains no entries.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of slots in the backing array.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the load factor, after clamping.
    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    /// Returns the table's hashing strategy.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    #[inline(always)]
    fn home(&self, key: u64) -> usize {
        home_bucket(&self.hash_builder, key, self.slots.len())
    }

    #[inline(always)]
    fn over_load_factor(&self) -> bool {
        self.populated as f64 >= self.slots.len() as f64 * self.load_factor
    }

    fn find_index(&self, key: u64) -> Option<usize> {
        if self.populated == 0 {
            return None;
        }

        let capacity = self.slots.len();
        let mut index = self.home(key);
        let mut expected = 0;
        while let Some(resident) = &self.slots[index] {
            // Every entry past a richer resident is richer still, so the key
            // cannot be further along.
            if expected > resident.offset {
                return None;
            }
            if expected == resident.offset && resident.key == key {
                return Some(index);
            }
            index = (index + 1) % capacity;
            expected += 1;
        }

        None
    }

    /// Returns the value stored for `key`.
    pub fn get(&self, key: u64) -> Option<&V> {
        let index = self.find_index(key)?;
        self.slots[index].as_ref().map(|entry| &entry.value)
    }

    /// Returns a mutable reference to the value stored for `key`.
    pub fn get_mut(&mut self, key: u64) -> Option<&mut V> {
        let index = self.find_index(key)?;
        self.slots[index].as_mut().map(|entry| &mut entry.value)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: u64) -> bool {
        self.find_index(key).is_some()
    }

    /// Inserts `value` under `key`.
    ///
    /// If the key is already present its value is replaced in place and the
    /// old value returned. Otherwise the entry probes forward from its home,
    /// displacing any resident that is closer to its own home, and the table
    /// grows if the insertion reaches the load factor.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hop_hood::RobinHoodTable;
    ///
    /// let mut table = RobinHoodTable::new(16, 0.5);
    /// assert_eq!(table.set(4, 1), None);
    /// assert_eq!(table.set(4, 2), Some(1));
    /// assert_eq!(table.set(4, 3), Some(2));
    /// assert_eq!(table.get(4), Some(&3));
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn set(&mut self, key: u64, value: V) -> Option<V> {
        let previous = self.place(Entry {
            key,
            value,
            offset: 0,
        });

        if previous.is_none() && self.over_load_factor() {
            self.grow();
        }

        previous
    }

    /// Probes for `candidate`'s slot, swapping it with any resident that is
    /// closer to home. Returns the old value if the key was already present.
    fn place(&mut self, mut candidate: Entry<V>) -> Option<V> {
        let capacity = self.slots.len();
        let mut index = self.home(candidate.key);

        while let Some(resident) = &mut self.slots[index] {
            if candidate.offset > resident.offset {
                core::mem::swap(&mut candidate, resident);
            } else if candidate.offset == resident.offset && candidate.key == resident.key {
                return Some(core::mem::replace(&mut resident.value, candidate.value));
            }
            index = (index + 1) % capacity;
            candidate.offset += 1;
        }

        self.slots[index] = Some(candidate);
        self.populated += 1;
        None
    }

    /// Doubles the slot array (more than once if needed to get back under
    /// the load factor) and reinserts every entry from offset zero.
    #[cold]
    fn grow(&mut self) {
        let mut capacity = self.slots.len();
        loop {
            capacity = capacity.checked_mul(2).expect("capacity overflow");
            if (self.populated as f64) < capacity as f64 * self.load_factor {
                break;
            }
        }

        let old = core::mem::replace(&mut self.slots, empty_slots(capacity));
        self.populated = 0;
        for entry in old.into_iter().flatten() {
            let previous = self.place(Entry { offset: 0, ..entry });
            debug_assert!(previous.is_none());
        }
    }

    /// Removes `key` and returns its value, or `None` if it was absent.
    ///
    /// The run of displaced entries after the removed one is shifted back a
    /// slot, stopping at an empty slot or an entry already at its home.
    pub fn delete(&mut self, key: u64) -> Option<V> {
        let index = self.find_index(key)?;
        let removed = self.slots[index].take()?;
        self.populated -= 1;
        self.shift_back(index);
        Some(removed.value)
    }

    fn shift_back(&mut self, mut hole: usize) {
        let capacity = self.slots.len();
        loop {
            let next = (hole + 1) % capacity;
            let Some(mut entry) = self.slots[next].take_if(|entry| entry.offset > 0) else {
                break;
            };
            entry.offset -= 1;
            self.slots[hole] = Some(entry);
            hole = next;
        }
    }

    /// Removes every entry, keeping the current capacity.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.populated = 0;
    }

    /// Calls `visit` for each entry in slot order, stopping as soon as it
    /// returns `false`.
    pub fn range(&self, mut visit: impl FnMut(u64, &V) -> bool) {
        for (key, value) in self.iter() {
            if !visit(key, value) {
                return;
            }
        }
    }

    /// Returns an iterator over `(key, &value)` pairs in slot order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            slots: self.slots.iter(),
            remaining: self.populated,
        }
    }

    /// Yields a view of every slot, occupied or empty, in slot order.
    pub fn slots(&self) -> impl Iterator<Item = SlotView<'_, V>> {
        self.slots.iter().map(|slot| match slot {
            None => SlotView::Empty,
            Some(entry) => SlotView::Occupied {
                key: entry.key,
                value: &entry.value,
                displacement: entry.offset,
            },
        })
    }

    /// Writes one line per slot to stdout: the entry and its offset, or
    /// `empty`.
    #[cfg(feature = "std")]
    pub fn print(&self)
    where
        V: Debug,
    {
        for (index, slot) in self.slots.iter().enumerate() {
            match slot {
                Some(entry) => println!(
                    "{index:>6} {} => {:?} (offset {})",
                    entry.key, entry.value, entry.offset
                ),
                None => println!("{index:>6} empty"),
            }
        }
    }

    /// Counts entries by their distance from their home bucket.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> crate::stats::ProbeHistogram {
        crate::stats::ProbeHistogram::from_slots(self.slots())
    }

    /// Returns occupancy and displacement statistics for the table.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> crate::stats::DebugStats {
        crate::stats::DebugStats::from_slots(
            self.slots(),
            self.slots.len() * core::mem::size_of::<Option<Entry<V>>>(),
        )
    }
}

impl<V, S> IntMap<V> for RobinHoodTable<V, S>
where
    S: BuildHasher,
{
    fn set(&mut self, key: u64, value: V) -> Option<V> {
        RobinHoodTable::set(self, key, value)
    }

    fn get(&self, key: u64) -> Option<&V> {
        RobinHoodTable::get(self, key)
    }

    fn delete(&mut self, key: u64) -> Option<V> {
        RobinHoodTable::delete(self, key)
    }

    fn range<F>(&self, visit: F)
    where
        F: FnMut(u64, &V) -> bool,
    {
        RobinHoodTable::range(self, visit)
    }

    fn slots<'a>(&'a self) -> impl Iterator<Item = SlotView<'a, V>>
    where
        V: 'a,
    {
        RobinHoodTable::slots(self)
    }

    fn len(&self) -> usize {
        self.populated
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[cfg(feature = "std")]
    fn print(&self)
    where
        V: Debug,
    {
        RobinHoodTable::print(self)
    }
}

impl<V, S> Debug for RobinHoodTable<V, S>
where
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RobinHoodTable")
            .field("populated", &self.populated)
            .field("capacity", &self.slots.len())
            .field("load_factor", &self.load_factor)
            .field("slots", &SlotsDebug(&self.slots))
            .finish()
    }
}

/// Renders each slot as `key => value +offset`, or `..` when empty.
struct SlotsDebug<'a, V>(&'a [Option<Entry<V>>]);

impl<V: Debug> Debug for SlotsDebug<'_, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(self.0.iter().map(|slot| SlotDebug(slot.as_ref())))
            .finish()
    }
}

struct SlotDebug<'a, V>(Option<&'a Entry<V>>);

impl<V: Debug> Debug for SlotDebug<'_, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.0 {
            Some(entry) => write!(f, "{} => {:?} +{}", entry.key, entry.value, entry.offset),
            None => f.write_str(".."),
        }
    }
}

impl<V, S> Default for RobinHoodTable<V, S>
where
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR, S::default())
    }
}

impl<V, S> Extend<(u64, V)> for RobinHoodTable<V, S>
where
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (u64, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<V, S> FromIterator<(u64, V)> for RobinHoodTable<V, S>
where
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (u64, V)>>(iter: I) -> Self {
        let mut table = Self::default();
        table.extend(iter);
        table
    }
}

/// An iterator over the entries of a [`RobinHoodTable`] in slot order.
///
/// Created by [`RobinHoodTable::iter`].
pub struct Iter<'a, V> {
    slots: core::slice::Iter<'a, Option<Entry<V>>>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (u64, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let item = self
            .slots
            .by_ref()
            .find_map(|slot| slot.as_ref().map(|entry| (entry.key, &entry.value)));
        if item.is_some() {
            self.remaining -= 1;
        }
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<'a, V, S> IntoIterator for &'a RobinHoodTable<V, S>
where
    S: BuildHasher,
{
    type Item = (u64, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
