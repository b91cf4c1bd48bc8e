//! Recall Bench - compares cached and uncached services on synthetic load

mod workload;

use std::time::{Duration, Instant};

use anyhow::{ensure, Result};
use clap::{Parser, Subcommand};
use recallkit::{AdjustingTree, KeyedCache, DEFAULT_CAPACITY};
use recallsvc::{fib_iterative, memo_fib, RangeSumService};
use tracing::info;

use crate::workload::{Query, Workload};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Range sums with point updates, with and without an LRU cache
    Range {
        /// Array length
        #[arg(short = 'n', long, default_value_t = 100_000)]
        size: usize,

        /// Number of queries (range or update, 50/50)
        #[arg(short, long, default_value_t = 50_000)]
        queries: usize,

        /// Cache capacity (number of ranges)
        #[arg(short, long, default_value_t = DEFAULT_CAPACITY)]
        capacity: usize,

        /// Largest generated array value
        #[arg(long, default_value_t = 1000)]
        max_value: i64,

        /// Workload RNG seed
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },

    /// Fibonacci: iterative vs splay-tree vs LRU memoization
    Fib {
        /// Largest n measured
        #[arg(long, default_value_t = 950)]
        max_n: u64,

        /// Distance between measured n values
        #[arg(long, default_value_t = 50)]
        step: u64,

        /// Repetitions averaged per measurement
        #[arg(short, long, default_value_t = 200)]
        repeat: u32,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!("Starting Recall Bench v{}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::Range {
            size,
            queries,
            capacity,
            max_value,
            seed,
        } => run_range(size, queries, capacity, max_value, seed),
        Command::Fib { max_n, step, repeat } => run_fib(max_n, step, repeat),
    }
}

fn run_range(size: usize, queries: usize, capacity: usize, max_value: i64, seed: u64) -> Result<()> {
    ensure!(size > 0, "array size must be positive");
    ensure!(max_value > 0, "max value must be positive");

    info!("Array size: {}", size);
    info!("Queries: {}", queries);
    info!("Cache capacity: {}", capacity);

    let workload = Workload::generate(size, queries, max_value, seed);
    info!("Generated {} range queries", workload.range_queries());

    let mut plain = RangeSumService::new(workload.values.clone());
    let (plain_answers, plain_time) = replay(&mut plain, &workload.queries)?;

    let mut cached = RangeSumService::with_capacity(workload.values.clone(), capacity)?;
    let (cached_answers, cached_time) = replay(&mut cached, &workload.queries)?;

    ensure!(
        plain_answers == cached_answers,
        "cached and uncached range sums diverged"
    );

    println!("Without cache: {:.3} s", plain_time.as_secs_f64());
    println!("With LRU cache: {:.3} s", cached_time.as_secs_f64());
    if let Some(cache) = cached.cache() {
        let stats = cache.stats();
        println!(
            "Cache: {} hits, {} misses ({:.1}% hit ratio), {} evictions, {} invalidated",
            stats.hits(),
            stats.misses(),
            stats.hit_ratio() * 100.0,
            stats.evictions(),
            stats.invalidations(),
        );
    }
    Ok(())
}

fn replay(svc: &mut RangeSumService, queries: &[Query]) -> Result<(Vec<i64>, Duration)> {
    let mut answers = Vec::new();
    let start = Instant::now();
    for query in queries {
        match *query {
            Query::Range { left, right } => answers.push(svc.range_sum(left, right)?),
            Query::Update { index, value } => svc.update(index, value)?,
        }
    }
    Ok((answers, start.elapsed()))
}

fn run_fib(max_n: u64, step: u64, repeat: u32) -> Result<()> {
    ensure!(step > 0, "step must be positive");
    ensure!(repeat > 0, "repeat must be positive");

    info!("Measuring n = 0..={} step {}, {} repetitions", max_n, step, repeat);

    println!("{:<10} {:<22} {:<22} {:<22}", "n", "Iterative (s)", "Splay Tree (s)", "LRU Cache (s)");
    println!("{}", "-".repeat(78));

    for n in (0..=max_n).step_by(step as usize) {
        let iterative = mean_time(repeat, || Ok(fib_iterative(n)))?;
        let splay = mean_time(repeat, || {
            let mut tree = AdjustingTree::new();
            Ok(memo_fib(n, &mut tree))
        })?;
        let lru = mean_time(repeat, || {
            let mut cache = KeyedCache::new(DEFAULT_CAPACITY)?;
            Ok(memo_fib(n, &mut cache))
        })?;

        println!(
            "{:<10} {:<22.8e} {:<22.8e} {:<22.8e}",
            n,
            iterative.as_secs_f64(),
            splay.as_secs_f64(),
            lru.as_secs_f64()
        );
    }
    Ok(())
}

/// Mean wall-clock time of `repeat` runs of `f`
fn mean_time<F, T>(repeat: u32, mut f: F) -> Result<Duration>
where
    F: FnMut() -> recallkit::Result<T>,
{
    let start = Instant::now();
    for _ in 0..repeat {
        std::hint::black_box(f()?);
    }
    Ok(start.elapsed() / repeat)
}
