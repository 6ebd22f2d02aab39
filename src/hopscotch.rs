use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::BuildHasher;

use crate::ConfigError;
use crate::DEFAULT_CAPACITY;
use crate::IntMap;
use crate::SlotView;
use crate::hash::ModuloState;
use crate::hash::home_bucket;

/// Widest neighborhood a bucket's hop mask can describe.
pub const MAX_HOP_RANGE: usize = u64::BITS as usize;

/// Neighborhood size used by `Default` and `FromIterator`.
pub const DEFAULT_MAX_DIST: usize = 32;

#[derive(Clone)]
struct Bucket<V> {
    /// Bit `max_dist - 1 - d` is set when the slot `d` places after this one
    /// holds an entry whose home is this bucket.
    hop: u64,
    entry: Option<(u64, V)>,
}

impl<V> Bucket<V> {
    const EMPTY: Self = Bucket {
        hop: 0,
        entry: None,
    };
}

fn empty_buckets<V>(capacity: usize) -> Vec<Bucket<V>> {
    let mut buckets = Vec::with_capacity(capacity);
    buckets.resize_with(capacity, || Bucket::EMPTY);
    buckets
}

/// A hash table mapping `u64` keys to `V` using hopscotch hashing.
///
/// A key's home bucket is `hash(key) % capacity` (with the default
/// [`ModuloState`], simply `key % capacity`). The entry is stored at most
/// `max_dist - 1` slots after its home, wrapping around the end of the slot
/// array, and the home bucket's hop mask records exactly which of those slots
/// hold its entries. Lookups only inspect slots whose bit is set.
///
/// When no empty slot can be brought into a key's neighborhood, or the table
/// is full, the slot array doubles in size and every entry is reinserted.
///
/// # Examples
///
/// ```rust
/// use hop_hood::HopscotchTable;
///
/// let mut table = HopscotchTable::new(16, 4);
/// table.set(3, "three");
/// table.set(19, "nineteen"); // same home bucket as 3
///
/// assert_eq!(table.get(3), Some(&"three"));
/// assert_eq!(table.get(19), Some(&"nineteen"));
/// assert_eq!(table.delete(3), Some("three"));
/// assert_eq!(table.get(3), None);
/// ```
#[derive(Clone)]
pub struct HopscotchTable<V, S = ModuloState> {
    buckets: Vec<Bucket<V>>,
    max_dist: usize,
    populated: usize,
    hash_builder: S,
}

impl<V> HopscotchTable<V> {
    /// Creates a table with `capacity` slots and neighborhoods of `max_dist`
    /// slots, using `key % capacity` as the home bucket.
    ///
    /// Out-of-range parameters are corrected rather than rejected: `max_dist`
    /// is clamped to `1..=64` and a zero capacity becomes one slot. Use
    /// [`try_new`](Self::try_new) to reject them instead.
    pub fn new(capacity: usize, max_dist: usize) -> Self {
        Self::with_hasher(capacity, max_dist, ModuloState)
    }

    /// Like [`new`](Self::new), but fails on a zero capacity or a `max_dist`
    /// outside `1..=64`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hop_hood::ConfigError;
    /// use hop_hood::HopscotchTable;
    ///
    /// assert!(HopscotchTable::<u32>::try_new(16, 8).is_ok());
    /// assert_eq!(
    ///     HopscotchTable::<u32>::try_new(16, 65).err(),
    ///     Some(ConfigError::MaxDist(65))
    /// );
    /// ```
    pub fn try_new(capacity: usize, max_dist: usize) -> Result<Self, ConfigError> {
        Self::try_with_hasher(capacity, max_dist, ModuloState)
    }
}

impl<V, S> HopscotchTable<V, S>
where
    S: BuildHasher,
{
    /// Creates a table that picks home buckets with `hash_builder`.
    ///
    /// Parameters are corrected the same way as in
    /// [`HopscotchTable::new`].
    pub fn with_hasher(capacity: usize, max_dist: usize, hash_builder: S) -> Self {
        Self {
            buckets: empty_buckets(capacity.max(1)),
            max_dist: max_dist.clamp(1, MAX_HOP_RANGE),
            populated: 0,
            hash_builder,
        }
    }

    /// Creates a table that picks home buckets with `hash_builder`, rejecting
    /// out-of-range parameters.
    pub fn try_with_hasher(
        capacity: usize,
        max_dist: usize,
        hash_builder: S,
    ) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if !(1..=MAX_HOP_RANGE).contains(&max_dist) {
            return Err(ConfigError::MaxDist(max_dist));
        }
        Ok(Self::with_hasher(capacity, max_dist, hash_builder))
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
        self.buckets.len()
    }

    /// Returns the neighborhood size, after clamping.
    pub fn max_dist(&self) -> usize {
        self.max_dist
    }

    /// Returns the table's hashing strategy.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    #[inline(always)]
    fn home(&self, key: u64) -> usize {
        home_bucket(&self.hash_builder, key, self.buckets.len())
    }

    /// Circular distance walking forward from `from` to `to`.
    #[inline(always)]
    fn distance(&self, from: usize, to: usize) -> usize {
        let capacity = self.buckets.len();
        (to + capacity - from) % capacity
    }

    #[inline(always)]
    fn hop_bit(&self, offset: usize) -> u64 {
        debug_assert!(offset < self.max_dist);
        1 << (self.max_dist - 1 - offset)
    }

    fn find_index(&self, key: u64) -> Option<usize> {
        if self.populated == 0 {
            return None;
        }

        let capacity = self.buckets.len();
        let home = self.home(key);
        let mut hop = self.buckets[home].hop;
        // Lowest bit first, which is the farthest offset first.
        while hop != 0 {
            let bit = hop.trailing_zeros() as usize;
            hop &= hop - 1;

            let index = (home + self.max_dist - 1 - bit) % capacity;
            if let Some((stored, _)) = &self.buckets[index].entry
                && *stored == key
            {
                return Some(index);
            }
        }

        None
    }

    /// Returns the value stored for `key`.
    pub fn get(&self, key: u64) -> Option<&V> {
        let index = self.find_index(key)?;
        self.buckets[index].entry.as_ref().map(|(_, value)| value)
    }

    /// Returns a mutable reference to the value stored for `key`.
    pub fn get_mut(&mut self, key: u64) -> Option<&mut V> {
        let index = self.find_index(key)?;
        self.buckets[index].entry.as_mut().map(|(_, value)| value)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: u64) -> bool {
        self.find_index(key).is_some()
    }

    /// Inserts `value` under `key`.
    ///
    /// If the key is already present its value is replaced in place and the
    /// old value returned; nothing moves. Otherwise the entry is placed in
    /// the nearest empty slot, hopping that slot back toward the home bucket
    /// when it starts out beyond the neighborhood, and the table grows if
    /// that fails.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hop_hood::HopscotchTable;
    ///
    /// let mut table = HopscotchTable::new(16, 8);
    /// assert_eq!(table.set(4, 1), None);
    /// assert_eq!(table.set(4, 2), Some(1));
    /// assert_eq!(table.get(4), Some(&2));
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn set(&mut self, key: u64, value: V) -> Option<V> {
        if let Some(slot) = self.get_mut(key) {
            return Some(core::mem::replace(slot, value));
        }

        self.insert_absent(key, value);
        None
    }

    fn insert_absent(&mut self, key: u64, value: V) {
        loop {
            if self.populated < self.buckets.len() {
                let home = self.home(key);
                if let Some(index) = self.claim_slot(home) {
                    self.occupy(home, index, key, value);
                    return;
                }
            }

            self.grow();
        }
    }

    /// Finds an empty slot within `home`'s neighborhood, relocating other
    /// entries to make one if needed. Returns `None` if no slot can be made
    /// available without growing.
    fn claim_slot(&mut self, home: usize) -> Option<usize> {
        let capacity = self.buckets.len();
        let mut free = (0..capacity)
            .map(|step| (home + step) % capacity)
            .find(|&index| self.buckets[index].entry.is_none())?;

        // Each hop moves `free` strictly closer to `home`, so this ends.
        while self.distance(home, free) >= self.max_dist {
            free = self.hop_closer(free)?;
        }

        Some(free)
    }

    /// Moves some entry that sits before `free`, and whose home is close
    /// enough to also reach `free`, into `free`. Returns the slot it vacated.
    ///
    /// Owners are tried from the farthest back (`max_dist - 1` slots) to the
    /// nearest, and within an owner its nearest entry first, so the vacated
    /// slot lands as far back as possible.
    fn hop_closer(&mut self, free: usize) -> Option<usize> {
        let capacity = self.buckets.len();
        debug_assert!(capacity > self.max_dist);

        for back in (1..self.max_dist).rev() {
            let owner = (free + capacity - back) % capacity;
            let hop = self.buckets[owner].hop;

            for offset in 0..back {
                let old_bit = self.hop_bit(offset);
                if hop & old_bit == 0 {
                    continue;
                }

                let from = (owner + offset) % capacity;
                let moved = self.buckets[from].entry.take();
                debug_assert!(moved.is_some());
                debug_assert!(self.buckets[free].entry.is_none());
                self.buckets[free].entry = moved;

                let new_bit = self.hop_bit(back);
                let owner_bucket = &mut self.buckets[owner];
                owner_bucket.hop = (owner_bucket.hop & !old_bit) | new_bit;

                return Some(from);
            }
        }

        None
    }

    fn occupy(&mut self, home: usize, index: usize, key: u64, value: V) {
        debug_assert!(self.buckets[index].entry.is_none());
        let bit = self.hop_bit(self.distance(home, index));
        debug_assert_eq!(self.buckets[home].hop & bit, 0);

        self.buckets[index].entry = Some((key, value));
        self.buckets[home].hop |= bit;
        self.populated += 1;
    }

    /// Doubles the slot array and reinserts every entry, doubling again for
    /// as long as some entry cannot be placed.
    #[cold]
    fn grow(&mut self) {
        let mut pending = self.take_entries();
        let mut capacity = self.buckets.len();

        loop {
            capacity = capacity.checked_mul(2).expect("capacity overflow");
            self.buckets = empty_buckets(capacity);

            if self.reinsert(&mut pending) {
                return;
            }

            pending.extend(self.take_entries());
        }
    }

    /// Places every entry of `pending` without growing. On failure the entry
    /// that could not be placed is left in `pending`.
    fn reinsert(&mut self, pending: &mut Vec<(u64, V)>) -> bool {
        while let Some((key, value)) = pending.pop() {
            let home = self.home(key);
            match self.claim_slot(home) {
                Some(index) => self.occupy(home, index, key, value),
                None => {
                    pending.push((key, value));
                    return false;
                }
            }
        }

        true
    }

    fn take_entries(&mut self) -> Vec<(u64, V)> {
        let mut entries = Vec::with_capacity(self.populated);
        for bucket in &mut self.buckets {
            bucket.hop = 0;
            entries.extend(bucket.entry.take());
        }
        self.populated = 0;
        entries
    }

    /// Removes `key` and returns its value, or `None` if it was absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hop_hood::HopscotchTable;
    ///
    /// let mut table = HopscotchTable::new(16, 8);
    /// table.set(7, 'x');
    /// assert_eq!(table.delete(7), Some('x'));
    /// assert_eq!(table.delete(7), None);
    /// assert!(table.is_empty());
    /// ```
    pub fn delete(&mut self, key: u64) -> Option<V> {
        let index = self.find_index(key)?;
        let home = self.home(key);
        let bit = self.hop_bit(self.distance(home, index));

        self.buckets[home].hop &= !bit;
        self.populated -= 1;
        self.buckets[index].entry.take().map(|(_, value)| value)
    }

    /// Removes every entry, keeping the current capacity.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            *bucket = Bucket::EMPTY;
        }
        self.populated = 0;
    }

    /// Calls `visit` for each entry in slot order, stopping as soon as it
    /// returns `false`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hop_hood::HopscotchTable;
    ///
    /// let mut table = HopscotchTable::new(16, 8);
    /// for key in 0..10 {
    ///     table.set(key, key);
    /// }
    ///
    /// let mut seen = 0;
    /// table.range(|_, _| {
    ///     seen += 1;
    ///     seen < 3
    /// });
    /// assert_eq!(seen, 3);
    /// ```
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
            buckets: self.buckets.iter(),
            remaining: self.populated,
        }
    }

    /// Yields a view of every slot, occupied or empty, in slot order.
    pub fn slots(&self) -> impl Iterator<Item = SlotView<'_, V>> {
        self.buckets
            .iter()
            .enumerate()
            .map(|(index, bucket)| match &bucket.entry {
                None => SlotView::Empty,
                Some((key, value)) => SlotView::Occupied {
                    key: *key,
                    value,
                    displacement: self.distance(self.home(*key), index),
                },
            })
    }

    /// Returns the hop mask stored at `index`, or `None` if `index` is out of
    /// bounds.
    pub fn hop_mask(&self, index: usize) -> Option<u64> {
        self.buckets.get(index).map(|bucket| bucket.hop)
    }

    /// Writes one line per slot to stdout: the slot's hop mask, then its
    /// entry or `empty`.
    #[cfg(feature = "std")]
    pub fn print(&self)
    where
        V: Debug,
    {
        let width = self.max_dist;
        for (index, bucket) in self.buckets.iter().enumerate() {
            match &bucket.entry {
                Some((key, value)) => {
                    println!("{index:>6} {:0width$b} {key} => {value:?}", bucket.hop)
                }
                None => println!("{index:>6} {:0width$b} empty", bucket.hop),
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
            self.buckets.len() * core::mem::size_of::<Bucket<V>>(),
        )
    }
}

impl<V, S> IntMap<V> for HopscotchTable<V, S>
where
    S: BuildHasher,
{
    fn set(&mut self, key: u64, value: V) -> Option<V> {
        HopscotchTable::set(self, key, value)
    }

    fn get(&self, key: u64) -> Option<&V> {
        HopscotchTable::get(self, key)
    }

    fn delete(&mut self, key: u64) -> Option<V> {
        HopscotchTable::delete(self, key)
    }

    fn range<F>(&self, visit: F)
    where
        F: FnMut(u64, &V) -> bool,
    {
        HopscotchTable::range(self, visit)
    }

    fn slots<'a>(&'a self) -> impl Iterator<Item = SlotView<'a, V>>
    where
        V: 'a,
    {
        HopscotchTable::slots(self)
    }

    fn len(&self) -> usize {
        self.populated
    }

    fn capacity(&self) -> usize {
        self.buckets.len()
    }

    #[cfg(feature = "std")]
    fn print(&self)
    where
        V: Debug,
    {
        HopscotchTable::print(self)
    }
}

impl<V, S> Debug for HopscotchTable<V, S>
where
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HopscotchTable")
            .field("populated", &self.populated)
            .field("capacity", &self.buckets.len())
            .field("max_dist", &self.max_dist)
            .field(
                "slots",
                &BucketsDebug {
                    buckets: &self.buckets,
                    width: self.max_dist,
                },
            )
            .finish()
    }
}

/// Renders each bucket as its hop mask followed by `key => value`, or `..`
/// when the slot is empty.
struct BucketsDebug<'a, V> {
    buckets: &'a [Bucket<V>],
    width: usize,
}

impl<V: Debug> Debug for BucketsDebug<'_, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(self.buckets.iter().map(|bucket| BucketDebug {
                bucket,
                width: self.width,
            }))
            .finish()
    }
}

struct BucketDebug<'a, V> {
    bucket: &'a Bucket<V>,
    width: usize,
}

impl<V: Debug> Debug for BucketDebug<'_, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let width = self.width;
        write!(f, "{:0width$b} ", self.bucket.hop)?;
        match &self.bucket.entry {
            Some((key, value)) => write!(f, "{key} => {value:?}"),
            None => f.write_str(".."),
        }
    }
}

impl<V, S> Default for HopscotchTable<V, S>
where
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(DEFAULT_CAPACITY, DEFAULT_MAX_DIST, S::default())
    }
}

impl<V, S> Extend<(u64, V)> for HopscotchTable<V, S>
where
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (u64, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<V, S> FromIterator<(u64, V)> for HopscotchTable<V, S>
where
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (u64, V)>>(iter: I) -> Self {
        let mut table = Self::default();
        table.extend(iter);
        table
    }
}

/// An iterator over the entries of a [`HopscotchTable`] in slot order.
///
/// Created by [`HopscotchTable::iter`].
pub struct Iter<'a, V> {
    buckets: core::slice::Iter<'a, Bucket<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (u64, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let item = self
            .buckets
            .by_ref()
            .find_map(|bucket| bucket.entry.as_ref().map(|(key, value)| (*key, value)));
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

impl<'a, V, S> IntoIterator for &'a HopscotchTable<V, S>
where
    S: BuildHasher,
{
    type Item = (u64, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use core::hash::BuildHasherDefault;

    use rand::Rng;
    use rand::SeedableRng;
    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use rand::rngs::SmallRng;
    use siphasher::sip::SipHasher;

    use super::*;

    /// Checks the neighborhood bound and that hop masks and occupied slots
    /// describe each other exactly.
    fn assert_invariants<V, S: BuildHasher>(table: &HopscotchTable<V, S>) {
        let capacity = table.buckets.len();
        let mut occupied = 0;

        for (index, bucket) in table.buckets.iter().enumerate() {
            if let Some((key, _)) = &bucket.entry {
                occupied += 1;
                let home = table.home(*key);
                let offset = table.distance(home, index);
                assert!(
                    offset < table.max_dist,
                    "key {key} sits {offset} slots from home {home}"
                );
                assert_ne!(
                    table.buckets[home].hop & table.hop_bit(offset),
                    0,
                    "key {key} at {index} missing from hop mask of {home}"
                );
            }

            for offset in 0..table.max_dist.min(capacity) {
                if bucket.hop & table.hop_bit(offset) == 0 {
                    continue;
                }
                let slot = (index + offset) % capacity;
                let (key, _) = table.buckets[slot]
                    .entry
                    .as_ref()
                    .unwrap_or_else(|| panic!("bucket {index} marks empty slot {slot}"));
                assert_eq!(table.home(*key), index);
            }

            // Bits past the capacity can never be valid.
            for offset in capacity..table.max_dist {
                assert_eq!(bucket.hop & table.hop_bit(offset), 0);
            }
        }

        assert_eq!(occupied, table.populated);
    }

    #[test]
    fn collision_scenario() {
        let mut table = HopscotchTable::new(16, 4);
        let keys = [1u64, 2, 3, 4, 5, 3 + 16];
        let values = [1, 2, 3, 4, 5, 6];
        for (&key, &value) in keys.iter().zip(values.iter()) {
            table.set(key, value);
            assert_invariants(&table);
        }

        for (&key, &value) in keys.iter().zip(values.iter()) {
            assert_eq!(table.get(key), Some(&value), "{table:#?}");
        }
        assert_eq!(table.len(), 6);
        assert_eq!(table.capacity(), 16);
    }

    #[test]
    fn max_dist_is_clamped() {
        let table: HopscotchTable<u8> = HopscotchTable::new(8, 100);
        assert_eq!(table.max_dist(), 64);
        let table: HopscotchTable<u8> = HopscotchTable::new(8, 0);
        assert_eq!(table.max_dist(), 1);
        let table: HopscotchTable<u8> = HopscotchTable::new(0, 4);
        assert_eq!(table.capacity(), 1);
    }

    #[test]
    fn strict_constructor_rejects() {
        assert_eq!(
            HopscotchTable::<u8>::try_new(0, 4).err(),
            Some(ConfigError::ZeroCapacity)
        );
        assert_eq!(
            HopscotchTable::<u8>::try_new(16, 0).err(),
            Some(ConfigError::MaxDist(0))
        );
        assert_eq!(
            HopscotchTable::<u8>::try_new(16, 65).err(),
            Some(ConfigError::MaxDist(65))
        );
        let table = HopscotchTable::<u8>::try_new(16, 64).unwrap();
        assert_eq!(table.max_dist(), 64);
    }

    #[test]
    fn hop_mask_records_offsets() {
        let mut table = HopscotchTable::new(16, 4);
        table.set(3, ());
        table.set(19, ());
        table.set(35, ());
        // Offsets 0, 1 and 2 from bucket 3 map to bits 3, 2 and 1.
        assert_eq!(table.hop_mask(3), Some(0b1110));
        assert_eq!(table.hop_mask(4), Some(0));

        table.delete(19);
        assert_eq!(table.hop_mask(3), Some(0b1010));
        assert_eq!(table.hop_mask(16), None);
        assert_invariants(&table);
    }

    #[test]
    fn relocates_into_neighborhood() {
        // Keys 0..3 fill slots 0..3 at home; 16 and 17 then spill past the
        // neighborhood of bucket 0 and 1 and force hops.
        let mut table = HopscotchTable::new(16, 4);
        for key in [0u64, 1, 2, 3, 16, 17, 4, 5] {
            table.set(key, key * 100);
            assert_invariants(&table);
        }

        for key in [0u64, 1, 2, 3, 16, 17, 4, 5] {
            assert_eq!(table.get(key), Some(&(key * 100)));
        }
    }

    #[test]
    fn crowded_home_forces_growth() {
        let mut table = HopscotchTable::new(16, 2);
        // Three keys share home 0 but only two fit in its neighborhood.
        for key in [0u64, 16, 32] {
            table.set(key, key);
            assert_invariants(&table);
        }

        assert!(table.capacity() > 16);
        for key in [0u64, 16, 32] {
            assert_eq!(table.get(key), Some(&key));
        }
    }

    #[test]
    fn wraps_around_the_end() {
        let mut table = HopscotchTable::new(8, 4);
        for key in [7u64, 15, 23] {
            table.set(key, key);
            assert_invariants(&table);
        }
        assert_eq!(table.capacity(), 8);
        assert_eq!(table.hop_mask(7), Some(0b1110));
        for key in [7u64, 15, 23] {
            assert_eq!(table.get(key), Some(&key));
        }

        assert_eq!(table.delete(15), Some(15));
        assert_invariants(&table);
        assert_eq!(table.get(23), Some(&23));
    }

    #[test]
    fn full_table_grows() {
        let mut table = HopscotchTable::new(4, 64);
        for key in 0..4u64 {
            table.set(key, key);
        }
        assert_eq!(table.capacity(), 4);

        table.set(4, 4);
        assert_eq!(table.capacity(), 8);
        assert_invariants(&table);
        for key in 0..5u64 {
            assert_eq!(table.get(key), Some(&key));
        }
    }

    #[test]
    fn delete_then_reinsert() {
        let mut table = HopscotchTable::new(16, 4);
        for key in 0..5u64 {
            table.set(key, key);
        }
        assert_eq!(table.delete(3), Some(3));
        assert_eq!(table.delete(3), None);
        assert_eq!(table.len(), 4);
        assert_eq!(table.get(3), None);
        for key in [0u64, 1, 2, 4] {
            assert_eq!(table.get(key), Some(&key));
        }

        table.set(3, 33);
        assert_eq!(table.get(3), Some(&33));
        assert_eq!(table.len(), 5);
        assert_invariants(&table);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut table = HopscotchTable::new(4, 4);
        table.extend((0..20u64).map(|k| (k, k)));
        let capacity = table.capacity();

        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.capacity(), capacity);
        assert_eq!(table.get(5), None);
        assert_invariants(&table);

        table.set(5, 5);
        assert_eq!(table.get(5), Some(&5));
    }

    #[test]
    fn slots_report_displacement() {
        let mut table = HopscotchTable::new(8, 4);
        table.set(1, 'a');
        table.set(9, 'b');

        let slots = table.slots().collect::<Vec<_>>();
        assert_eq!(slots.len(), 8);
        assert_eq!(slots[1].displacement(), Some(0));
        assert_eq!(slots[2].displacement(), Some(1));
        assert!(!slots[0].is_occupied());

        let hist = table.probe_histogram();
        assert_eq!(hist.bins(), &[1, 1]);
    }

    #[test]
    fn random_keys_with_sip_hasher() {
        let seed = OsRng.try_next_u64().unwrap();
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut table: HopscotchTable<u64, BuildHasherDefault<SipHasher>> =
            HopscotchTable::with_hasher(16, 8, BuildHasherDefault::default());
        let mut model = hashbrown::HashMap::new();

        for _ in 0..20_000 {
            let key = rng.random_range(0..5_000u64);
            if rng.random_bool(0.3) {
                assert_eq!(table.delete(key), model.remove(&key), "seed {seed}");
            } else {
                let value = rng.random::<u64>();
                assert_eq!(table.set(key, value), model.insert(key, value), "seed {seed}");
            }
        }

        assert_invariants(&table);
        assert_eq!(table.len(), model.len());
        for (key, value) in &model {
            assert_eq!(table.get(*key), Some(value), "seed {seed}");
        }
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn strided_keys_stay_in_neighborhood() {
        // Multiples of 16 share a home bucket until the table is large
        // enough to tell them apart.
        let mut table = HopscotchTable::new(16, 4);
        let keys = (0..2_000u64).map(|k| k * 16).collect::<Vec<_>>();
        for &key in &keys {
            table.set(key, key);
        }

        assert_invariants(&table);
        for &key in &keys {
            assert_eq!(table.get(key), Some(&key));
        }
    }

    #[test]
    fn debug_output_lists_slots() {
        let mut table = HopscotchTable::new(2, 2);
        table.set(1, "one");
        assert_eq!(
            alloc::format!("{table:?}"),
            "HopscotchTable { populated: 1, capacity: 2, max_dist: 2, \
             slots: [00 .., 10 1 => \"one\"] }"
        );
        assert_eq!(table.iter().collect::<Vec<_>>(), vec![(1, &"one")]);
    }
}
