use std::time::Instant;

use clap::Parser;
use clap::ValueEnum;
use hop_hood::HopscotchTable;
use hop_hood::IntMap;
use hop_hood::RobinHoodTable;
use hop_hood::hopscotch::DEFAULT_MAX_DIST;
use hop_hood::robin_hood::DEFAULT_LOAD_FACTOR;
use hop_hood::stats::DebugStats;
use hop_hood::stats::ProbeHistogram;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Engine {
    Hopscotch,
    RobinHood,
}

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'e', long = "engine", value_enum, default_value_t = Engine::RobinHood)]
    engine: Engine,

    #[arg(short = 'c', long = "capacity", default_value_t = 16)]
    capacity: usize,

    #[arg(short = 'd', long = "max_dist", default_value_t = DEFAULT_MAX_DIST)]
    max_dist: usize,

    #[arg(short = 'l', long = "load_factor", default_value_t = DEFAULT_LOAD_FACTOR)]
    load_factor: f64,

    #[arg(short = 'n', long = "count", default_value_t = 100_000)]
    count: u64,
}

/// A table the demo can run workloads against and report on.
trait Inspect: IntMap<u64> {
    fn probe_histogram(&self) -> ProbeHistogram;
    fn debug_stats(&self) -> DebugStats;
}

impl Inspect for HopscotchTable<u64> {
    fn probe_histogram(&self) -> ProbeHistogram {
        HopscotchTable::probe_histogram(self)
    }

    fn debug_stats(&self) -> DebugStats {
        HopscotchTable::debug_stats(self)
    }
}

impl Inspect for RobinHoodTable<u64> {
    fn probe_histogram(&self) -> ProbeHistogram {
        RobinHoodTable::probe_histogram(self)
    }

    fn debug_stats(&self) -> DebugStats {
        RobinHoodTable::debug_stats(self)
    }
}

fn colliding_keys<M: Inspect>(mut map: M) {
    let keys = [1u64, 2, 3, 4, 5, 3 + 16];
    let values = [1u64, 2, 3, 4, 5, 6];
    for (&key, &value) in keys.iter().zip(values.iter()) {
        map.set(key, value);
    }
    map.print();

    for (&key, &value) in keys.iter().zip(values.iter()) {
        assert_eq!(map.get(key), Some(&value), "key {key}");
    }
}

fn repeated_key<M: Inspect>(mut map: M) {
    for value in 1..=3 {
        map.set(4, value);
    }
    map.print();
    assert_eq!(map.get(4), Some(&3));
}

fn delete_key<M: Inspect>(mut map: M) {
    for key in 0..5 {
        map.set(key, key);
    }
    map.print();
    println!();

    map.delete(3);
    map.print();
    assert_eq!(map.get(3), None);
}

fn timed_workload<M: Inspect>(mut map: M, pairs: &[(u64, u64)]) {
    let start = Instant::now();
    for &(key, value) in pairs {
        map.set(key, value);
    }
    println!("set cost: {:?}", start.elapsed());

    // Later duplicates overwrite earlier ones.
    let start = Instant::now();
    for &(key, _) in pairs {
        assert!(map.get(key).is_some(), "key {key} missing");
    }
    println!("get cost: {:?}", start.elapsed());

    println!(
        "{} entries in {} slots ({:.2}% full)",
        map.len(),
        map.capacity(),
        map.len() as f64 / map.capacity() as f64 * 100.0
    );
    map.probe_histogram().print();
    map.debug_stats().print();
}

fn run<M: Inspect>(args: &Args, make: impl Fn() -> M) {
    println!("--- colliding keys ---");
    colliding_keys(make());

    println!("--- repeated key ---");
    repeated_key(make());

    println!("--- delete key ---");
    delete_key(make());

    println!("--- {} sequential keys ---", args.count);
    let sequential = (0..args.count).map(|k| (k, k)).collect::<Vec<_>>();
    timed_workload(make(), &sequential);

    println!("--- {} random keys ---", args.count);
    let mut rng = SmallRng::from_os_rng();
    // The modulo hash needs a table spanning the key range, so keep keys
    // within a small multiple of the count.
    let key_space = args.count.saturating_mul(16).max(1);
    let random = (0..args.count)
        .map(|_| (rng.random_range(0..key_space), rng.random::<u64>()))
        .collect::<Vec<_>>();
    timed_workload(make(), &random);
}

fn main() {
    let args = Args::parse();

    match args.engine {
        Engine::Hopscotch => {
            println!(
                "hopscotch table: capacity {}, max_dist {}",
                args.capacity, args.max_dist
            );
            run(&args, || HopscotchTable::new(args.capacity, args.max_dist));
        }
        Engine::RobinHood => {
            println!(
                "robin hood table: capacity {}, load factor {}",
                args.capacity, args.load_factor
            );
            run(&args, || RobinHoodTable::new(args.capacity, args.load_factor));
        }
    }
}
