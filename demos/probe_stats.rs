use clap::Parser;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use shift_hash::DefaultHashSet;
use shift_hash::LoadFactor;
use shift_hash::Natural;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1 << 16)]
    target_capacity: usize,

    /// Load factor in percent.
    #[arg(short = 'l', long = "load_factor", default_value_t = 75)]
    load_factor: u8,

    /// Remove/insert pairs to run after the initial fill.
    #[arg(short = 'r', long = "churn_rounds", default_value_t = 1_000_000)]
    churn_rounds: usize,

    #[arg(short = 's', long = "seed", default_value_t = 0x5eed)]
    seed: u64,
}

fn main() {
    let args = Args::parse();

    let load_factor = match LoadFactor::from_percent(args.load_factor) {
        Ok(load_factor) => load_factor,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let mut set: DefaultHashSet<u64> =
        DefaultHashSet::with_config(args.target_capacity, load_factor, Natural::default());
    let capacity = set.capacity();
    let fill = load_factor.max_len(capacity);
    if fill == 0 {
        eprintln!("capacity {capacity} at {}% holds no keys", load_factor.percent());
        std::process::exit(2);
    }

    println!(
        "Capacity {capacity}, load factor {}%, filling to {fill} keys",
        load_factor.percent()
    );

    let mut rng = SmallRng::seed_from_u64(args.seed);
    let mut live: Vec<u64> = Vec::with_capacity(fill);
    while live.len() < fill {
        let key = rng.random();
        if set.insert(key) {
            live.push(key);
        }
    }

    println!("After fill:");
    set.probe_stats().print();

    for _ in 0..args.churn_rounds {
        let slot = rng.random_range(0..live.len());
        set.remove(&live[slot]);
        loop {
            let key = rng.random();
            if set.insert(key) {
                live[slot] = key;
                break;
            }
        }
    }

    println!("After {} churn rounds:", args.churn_rounds);
    set.probe_stats().print();
    assert_eq!(set.capacity(), capacity, "churn at constant size must not grow");
}
