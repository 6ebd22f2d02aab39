//! Hashing strategies for mapping a `u64` key onto a home bucket.
//!
//! Both tables reduce `hash(key)` modulo their capacity. Which hash is used is
//! a type parameter (`S: BuildHasher`), so the strategy is fixed when the
//! table is constructed:
//!
//! - [`ModuloState`] (the default) hashes a key to itself, giving the home
//!   bucket `key % capacity`. This is cheap and keeps sequential keys in
//!   sequential slots, but keys sharing a common factor with the capacity
//!   collide heavily.
//! - [`Fnv1State`] runs 64-bit FNV-1 over the key's little-endian bytes.
//! - [`RandomState`] is a seeded general purpose hasher (`foldhash` when the
//!   `foldhash` feature is enabled, otherwise the standard library's).

use core::hash::BuildHasher;
use core::hash::Hasher;

/// Builds [`IdentityHasher`]s, making the home bucket `key % capacity`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModuloState;

impl BuildHasher for ModuloState {
    type Hasher = IdentityHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        IdentityHasher::default()
    }
}

/// A hasher whose output for a single `u64` is that `u64`.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityHasher {
    hash: u64,
}

impl Hasher for IdentityHasher {
    #[inline(always)]
    fn finish(&self) -> u64 {
        self.hash
    }

    fn write(&mut self, bytes: &[u8]) {
        // Byte-wise input only shows up for non-u64 writes; shift it in
        // little-endian order so short writes still land on distinct values.
        for (i, &byte) in bytes.iter().enumerate() {
            self.hash ^= (byte as u64) << ((i % 8) * 8);
        }
    }

    #[inline(always)]
    fn write_u64(&mut self, i: u64) {
        self.hash = i;
    }
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Builds [`Fnv1Hasher`]s.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fnv1State;

impl BuildHasher for Fnv1State {
    type Hasher = Fnv1Hasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        Fnv1Hasher::default()
    }
}

/// 64-bit FNV-1 (multiply, then xor) hasher.
#[derive(Clone, Copy, Debug)]
pub struct Fnv1Hasher {
    hash: u64,
}

impl Default for Fnv1Hasher {
    fn default() -> Self {
        Self {
            hash: FNV_OFFSET_BASIS,
        }
    }
}

impl Hasher for Fnv1Hasher {
    #[inline(always)]
    fn finish(&self) -> u64 {
        self.hash
    }

    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.hash = self.hash.wrapping_mul(FNV_PRIME);
            self.hash ^= byte as u64;
        }
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.write(&i.to_le_bytes());
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// A seeded, well-distributed hashing strategy.
        pub type RandomState = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// A seeded, well-distributed hashing strategy.
        pub type RandomState = std::collections::hash_map::RandomState;
    }
}

/// Maps `key` to a bucket index in `0..capacity`.
#[inline(always)]
pub(crate) fn home_bucket<S: BuildHasher>(hash_builder: &S, key: u64, capacity: usize) -> usize {
    debug_assert!(capacity > 0);
    (hash_builder.hash_one(key) % capacity as u64) as usize
}
