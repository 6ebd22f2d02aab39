//! Behavior every `IntMap` implementation must share, run against both
//! engines.

use alloc::vec::Vec;

use hashbrown::HashMap as ModelMap;
use hashbrown::HashSet;
use rand::Rng;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;

use crate::HopscotchTable;
use crate::IntMap;
use crate::RobinHoodTable;
use crate::SlotView;

fn hopscotch() -> HopscotchTable<u64> {
    HopscotchTable::new(16, 8)
}

fn robin_hood() -> RobinHoodTable<u64> {
    RobinHoodTable::new(16, 0.5)
}

/// Runs a generic test body once per engine.
macro_rules! for_each_engine {
    ($($name:ident => $body:ident),* $(,)?) => {
        mod hopscotch_engine {
            use super::*;
            $(
                #[test]
                fn $name() {
                    $body(hopscotch());
                }
            )*
        }

        mod robin_hood_engine {
            use super::*;
            $(
                #[test]
                fn $name() {
                    $body(robin_hood());
                }
            )*
        }
    };
}

fn collect_keys<M: IntMap<u64>>(map: &M) -> Vec<u64> {
    let mut keys = Vec::new();
    map.range(|key, _| {
        keys.push(key);
        true
    });
    keys
}

fn assert_no_duplicates<M: IntMap<u64>>(map: &M) {
    let keys = collect_keys(map);
    let unique = keys.iter().copied().collect::<HashSet<_>>();
    assert_eq!(keys.len(), unique.len(), "duplicate keys in {keys:?}");
    assert_eq!(keys.len(), map.len());
}

fn colliding_keys<M: IntMap<u64>>(mut map: M) {
    let keys = [1u64, 2, 3, 4, 5, 3 + 16];
    let values = [1u64, 2, 3, 4, 5, 6];
    for (&key, &value) in keys.iter().zip(values.iter()) {
        map.set(key, value);
    }

    for (&key, &value) in keys.iter().zip(values.iter()) {
        assert_eq!(map.get(key), Some(&value), "key {key}");
    }
    assert_no_duplicates(&map);
}

fn repeated_key<M: IntMap<u64>>(mut map: M) {
    assert_eq!(map.set(4, 1), None);
    assert_eq!(map.set(4, 2), Some(1));
    assert_eq!(map.set(4, 3), Some(2));

    assert_eq!(map.get(4), Some(&3));
    assert_eq!(map.len(), 1);
    assert_no_duplicates(&map);
}

fn delete_key<M: IntMap<u64>>(mut map: M) {
    for key in 0..5u64 {
        map.set(key, key);
    }

    assert_eq!(map.delete(3), Some(3));
    assert_eq!(map.get(3), None);
    assert!(!map.contains_key(3));
    for key in [0u64, 1, 2, 4] {
        assert_eq!(map.get(key), Some(&key));
    }
    assert_eq!(map.len(), 4);
}

fn delete_absent_is_noop<M: IntMap<u64>>(mut map: M) {
    assert_eq!(map.delete(42), None);
    assert!(map.is_empty());

    map.set(1, 1);
    assert_eq!(map.delete(17), None);
    assert_eq!(map.delete(42), None);
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(1), Some(&1));
}

fn sequential_keys<M: IntMap<u64>>(mut map: M) {
    let n = 100_000u64;
    for key in 0..n {
        map.set(key, key);
    }

    assert_eq!(map.len(), n as usize);
    for key in 0..n {
        assert_eq!(map.get(key), Some(&key), "key {key}");
    }
    assert_eq!(map.get(n), None);
}

fn random_keys<M: IntMap<u64>>(mut map: M) {
    let mut rng = OsRng;
    let seed = rng.try_next_u64().unwrap();
    let mut rng = SmallRng::seed_from_u64(seed);

    // Keys are bounded so the modulo hash never needs a table as large as
    // the key space.
    let pairs = (0..100_000)
        .map(|_| (rng.random_range(0..1u64 << 24), rng.random::<u64>()))
        .collect::<Vec<_>>();
    let mut model = ModelMap::new();
    for &(key, value) in &pairs {
        map.set(key, value);
        model.insert(key, value);
    }

    assert_eq!(map.len(), model.len(), "seed {seed}");
    for (key, value) in &model {
        assert_eq!(map.get(*key), Some(value), "seed {seed}, key {key}");
    }
    assert_no_duplicates(&map);
}

fn growth_preserves_contents<M: IntMap<u64>>(mut map: M) {
    let initial = map.capacity();
    let mut key = 0u64;
    while map.capacity() == initial {
        map.set(key, key * 3);
        key += 1;
    }
    // Overwrite a few after growth so the latest value must win.
    for k in 0..key.min(4) {
        map.set(k, k + 1_000);
    }

    assert_eq!(map.len(), key as usize);
    for k in 0..key {
        let expected = if k < 4 { k + 1_000 } else { k * 3 };
        assert_eq!(map.get(k), Some(&expected));
    }
    assert_no_duplicates(&map);
}

fn mixed_operations_match_model<M: IntMap<u64>>(mut map: M) {
    let mut rng = OsRng;
    let seed = rng.try_next_u64().unwrap();
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut model = ModelMap::new();

    for _ in 0..50_000 {
        let key = rng.random_range(0..2_048u64);
        match rng.random_range(0..4) {
            0 => assert_eq!(map.delete(key), model.remove(&key), "seed {seed}"),
            1 => assert_eq!(map.get(key), model.get(&key), "seed {seed}"),
            _ => {
                let value = rng.random::<u64>();
                assert_eq!(map.set(key, value), model.insert(key, value), "seed {seed}");
            }
        }
    }

    assert_eq!(map.len(), model.len(), "seed {seed}");
    assert_no_duplicates(&map);
}

fn range_stops_early<M: IntMap<u64>>(mut map: M) {
    for key in 0..10u64 {
        map.set(key, key);
    }

    let mut visited = 0;
    map.range(|_, _| {
        visited += 1;
        visited < 4
    });
    assert_eq!(visited, 4);

    let mut all = 0;
    map.range(|_, _| {
        all += 1;
        true
    });
    assert_eq!(all, 10);
}

fn range_follows_slot_order<M: IntMap<u64>>(mut map: M) {
    for key in [9u64, 3, 14, 0] {
        map.set(key, key);
    }

    let from_slots = map
        .slots()
        .filter_map(|slot| match slot {
            SlotView::Occupied { key, .. } => Some(key),
            SlotView::Empty => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(collect_keys(&map), from_slots);
    assert_eq!(from_slots, [0, 3, 9, 14]);
    assert_eq!(map.slots().count(), map.capacity());
}

fn print_smoke<M: IntMap<u64>>(mut map: M) {
    for key in [1u64, 17, 33] {
        map.set(key, key);
    }
    #[cfg(feature = "std")]
    map.print();
    assert_eq!(map.slots().filter(|slot| slot.is_occupied()).count(), 3);
}

for_each_engine! {
    scenario_colliding_keys => colliding_keys,
    scenario_repeated_key => repeated_key,
    scenario_delete_key => delete_key,
    delete_absent => delete_absent_is_noop,
    scenario_sequential_keys => sequential_keys,
    scenario_random_keys => random_keys,
    growth => growth_preserves_contents,
    mixed_operations => mixed_operations_match_model,
    range_early_exit => range_stops_early,
    range_order => range_follows_slot_order,
    print => print_smoke,
}

#[cfg(any(feature = "foldhash", feature = "std"))]
#[test]
fn random_state_spreads_strided_keys() {
    use crate::hash::RandomState;

    let mut hopscotch: HopscotchTable<u64, RandomState> = HopscotchTable::default();
    let mut robin_hood: RobinHoodTable<u64, RandomState> = RobinHoodTable::default();

    // Under the modulo hash every one of these keys would share bucket 0 of
    // a small table.
    for key in (0..10_000u64).map(|k| k * 1024) {
        hopscotch.set(key, key);
        robin_hood.set(key, key);
    }
    for key in (0..10_000u64).map(|k| k * 1024) {
        assert_eq!(hopscotch.get(key), Some(&key));
        assert_eq!(robin_hood.get(key), Some(&key));
    }
    assert_no_duplicates(&hopscotch);
    assert_no_duplicates(&robin_hood);
}
