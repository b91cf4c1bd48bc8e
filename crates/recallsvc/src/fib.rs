//! Memoized Fibonacci over any [`MemoStore`]

use std::mem;

use num_bigint::BigUint;
use recallkit::MemoStore;
use tracing::debug;

/// Index whose Fibonacci value is still owed once a sub-result arrives
enum Pending {
    /// Waiting for Fibonacci(`k - 1`)
    MinusOne(u64),
    /// Holding Fibonacci(`k - 1`), waiting for Fibonacci(`k - 2`)
    MinusTwo(u64, BigUint),
}

/// Compute Fibonacci(`n`) memoized in `store`.
///
/// Evaluation follows the recursive definition exactly: `n` is looked up,
/// and on a miss Fibonacci(`n - 1`) is fully evaluated before
/// Fibonacci(`n - 2`) is looked up, each result being stored before it is
/// used. A heap-allocated stack of pending indices replaces the call stack,
/// so `n` is bounded only by memory.
///
/// A [`KeyedCache`](recallkit::KeyedCache) store needs a capacity of at
/// least 3 to keep this linear: with fewer slots the just-stored
/// Fibonacci(`k - 1`) evicts Fibonacci(`k - 2`) and the lookups blow up
/// exponentially.
pub fn memo_fib<S>(n: u64, store: &mut S) -> BigUint
where
    S: MemoStore<u64, BigUint> + ?Sized,
{
    let mut pending: Vec<Pending> = Vec::new();
    let mut next = n;

    loop {
        let mut value = loop {
            if let Some(value) = store.lookup(&next) {
                break value;
            }
            if next < 2 {
                let value = BigUint::from(next);
                store.store(next, value.clone());
                break value;
            }
            pending.push(Pending::MinusOne(next));
            next -= 1;
        };

        loop {
            match pending.pop() {
                None => return value,
                Some(Pending::MinusOne(k)) => {
                    pending.push(Pending::MinusTwo(k, value));
                    next = k - 2;
                    break;
                }
                Some(Pending::MinusTwo(k, minus_one)) => {
                    value += minus_one;
                    store.store(k, value.clone());
                }
            }
        }
    }
}

/// Uncached iterative Fibonacci(`n`)
pub fn fib_iterative(n: u64) -> BigUint {
    let mut a = BigUint::from(0u32);
    let mut b = BigUint::from(1u32);
    for _ in 0..n {
        let next = &a + &b;
        a = mem::replace(&mut b, next);
    }
    a
}

/// Fibonacci service owning its memo store
pub struct MemoFibService<S> {
    store: S,
}

impl<S> MemoFibService<S>
where
    S: MemoStore<u64, BigUint>,
{
    /// Create a service memoizing into `store`
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Fibonacci(`n`), reusing and extending the memo store
    pub fn fib(&mut self, n: u64) -> BigUint {
        let value = memo_fib(n, &mut self.store);
        debug!(n, bits = value.bits(), "fibonacci resolved");
        value
    }

    /// Get the memo store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the service, returning the memo store
    pub fn into_store(self) -> S {
        self.store
    }
}
