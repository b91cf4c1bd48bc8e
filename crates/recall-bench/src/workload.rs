//! Synthetic range-sum workloads

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// One request against the range-sum service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    /// Inclusive range sum
    Range { left: usize, right: usize },
    /// Point write
    Update { index: usize, value: i64 },
}

/// Random array plus a random query stream over it
pub struct Workload {
    pub values: Vec<i64>,
    pub queries: Vec<Query>,
}

impl Workload {
    /// Generate `size` values in `1..=max_value` and `queries` requests,
    /// each a range query or an update with equal probability.
    pub fn generate(size: usize, queries: usize, max_value: i64, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let values = (0..size).map(|_| rng.gen_range(1..=max_value)).collect();
        let queries = (0..queries)
            .map(|_| {
                if rng.gen_bool(0.5) {
                    let left = rng.gen_range(0..size);
                    let right = rng.gen_range(left..size);
                    Query::Range { left, right }
                } else {
                    Query::Update {
                        index: rng.gen_range(0..size),
                        value: rng.gen_range(1..=max_value),
                    }
                }
            })
            .collect();

        Self { values, queries }
    }

    /// Number of range queries in the stream
    pub fn range_queries(&self) -> usize {
        self.queries
            .iter()
            .filter(|q| matches!(q, Query::Range { .. }))
            .count()
    }
}
